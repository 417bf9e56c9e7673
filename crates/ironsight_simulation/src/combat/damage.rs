//! Damage/recovery нотификации Health ledger + death marker
//!
//! Любая мутация Health идёт через `apply_damage` / `apply_recovery` —
//! так каждая мутация гарантированно публикует event (at-least-once,
//! даже для amount = 0 или уже мёртвого ledger).

use bevy::prelude::*;
use crate::components::{Health, HealthChange, Player};

/// Событие: ledger получил урон (current уже обновлён)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct Damaged {
    pub entity: Entity,
    /// Запрошенный урон (до clamp)
    pub amount: u32,
    pub current: u32,
    pub max: u32,
    /// Кто нанёс (владелец оружия), None для environment
    pub source: Option<Entity>,
}

impl Damaged {
    pub fn is_lethal(&self) -> bool {
        self.current == 0
    }
}

/// Событие: ledger восстановлен
#[derive(Event, Debug, Clone, PartialEq)]
pub struct Recovered {
    pub entity: Entity,
    pub amount: u32,
    pub current: u32,
    pub max: u32,
}

/// Событие: entity умер (публикуется listener'ом, не ledger'ом)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв (Health == 0 и смерть обработана)
#[derive(Component, Debug)]
pub struct Dead;

/// applyDamage + damaged event
pub fn apply_damage(
    entity: Entity,
    health: &mut Health,
    amount: u32,
    source: Option<Entity>,
    events: &mut EventWriter<Damaged>,
) -> HealthChange {
    let change = health.apply_damage(amount);

    events.write(Damaged {
        entity,
        amount,
        current: health.current,
        max: health.max,
        source,
    });

    change
}

/// applyRecovery + recovered event
pub fn apply_recovery(
    entity: Entity,
    health: &mut Health,
    amount: u32,
    events: &mut EventWriter<Recovered>,
) -> HealthChange {
    let change = health.apply_recovery(amount);

    events.write(Recovered {
        entity,
        amount,
        current: health.current,
        max: health.max,
    });

    change
}

/// Система: смерть игрока
///
/// Listener Damaged → Dead marker + EntityDied (game-over логика снаружи).
/// Смерть врагов обрабатывает AI (`ai::systems::death`).
pub fn detect_player_death(
    mut commands: Commands,
    mut damaged: EventReader<Damaged>,
    players: Query<(), (With<Player>, Without<Dead>)>,
    mut died: EventWriter<EntityDied>,
) {
    // Commands отложены — два lethal события за tick не должны дать две смерти
    let mut handled: Vec<Entity> = Vec::new();

    for event in damaged.read() {
        if !event.is_lethal() || players.get(event.entity).is_err() || handled.contains(&event.entity) {
            continue;
        }
        handled.push(event.entity);

        commands.entity(event.entity).insert(Dead);
        died.write(EntityDied {
            entity: event.entity,
            killer: event.source,
        });

        crate::log_info(&format!(
            "☠️ Player {:?} killed by {:?}",
            event.entity, event.source
        ));
    }
}
