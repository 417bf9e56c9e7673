//! Item System — pickups на уровне
//!
//! # Архитектура
//!
//! **Pickup** — компонент предмета (kind + amount + скорость вращения):
//! - Health → `apply_recovery` на ledger игрока (только если не full)
//! - Ammo → патроны в экипированное оружие (только если магазин конечный и не full)
//!
//! Контакт приходит от physics layer как `PickupTouched` (trigger volume снаружи).
//! Подбирает только игрок. Использованный pickup удаляется, неподходящий остаётся лежать.

use bevy::prelude::*;

use crate::combat::{apply_recovery, AmmoChanged, CombatFeedback, Loadout, Recovered, SfxKind, Weapon};
use crate::components::{Health, Player};
use crate::SimulationSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickupKind {
    Health,
    Ammo,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Pickup {
    pub kind: PickupKind,
    pub amount: u32,
    /// Градусы в секунду вокруг вертикальной оси
    pub spin_speed: f32,
}

impl Pickup {
    pub fn health(amount: u32) -> Self {
        Self {
            kind: PickupKind::Health,
            amount,
            spin_speed: 30.0,
        }
    }

    pub fn ammo(amount: u32) -> Self {
        Self {
            kind: PickupKind::Ammo,
            amount,
            spin_speed: 30.0,
        }
    }
}

impl Default for Pickup {
    fn default() -> Self {
        Self::health(10)
    }
}

/// Событие: кто-то вошёл в trigger volume pickup'а
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupTouched {
    pub pickup: Entity,
    pub toucher: Entity,
}

/// Событие: pickup использован (и удалён)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupCollected {
    pub pickup: Entity,
    pub collector: Entity,
    pub kind: PickupKind,
}

/// System: PickupTouched → recovery / ammo
pub fn collect_pickups(
    mut commands: Commands,
    mut touches: EventReader<PickupTouched>,
    pickups: Query<(&Pickup, &Transform)>,
    mut players: Query<(&mut Health, Option<&Loadout>), With<Player>>,
    mut weapons: Query<&mut Weapon>,
    mut recovered: EventWriter<Recovered>,
    mut ammo_events: EventWriter<AmmoChanged>,
    mut collected: EventWriter<PickupCollected>,
    mut feedback: CombatFeedback,
) {
    // despawn отложен — второй touch того же pickup в этом tick игнорируем
    let mut consumed: Vec<Entity> = Vec::new();

    for touch in touches.read() {
        if consumed.contains(&touch.pickup) {
            continue;
        }

        let Ok((pickup, transform)) = pickups.get(touch.pickup) else {
            continue;
        };
        let Ok((mut health, loadout)) = players.get_mut(touch.toucher) else {
            continue;
        };

        let used = match pickup.kind {
            PickupKind::Health => {
                if health.is_full() {
                    false
                } else {
                    apply_recovery(touch.toucher, &mut health, pickup.amount, &mut recovered);
                    feedback.sound(SfxKind::PickupHealth, transform.translation);
                    true
                }
            }
            PickupKind::Ammo => {
                let Some(weapon_entity) = loadout.and_then(Loadout::equipped_weapon) else {
                    continue;
                };
                let Ok(mut weapon) = weapons.get_mut(weapon_entity) else {
                    continue;
                };

                if weapon.is_full() {
                    false
                } else {
                    weapon.add_ammo(pickup.amount);
                    ammo_events.write(AmmoChanged::of(weapon_entity, &weapon));
                    feedback.sound(SfxKind::PickupAmmo, transform.translation);
                    true
                }
            }
        };

        if !used {
            continue;
        }

        consumed.push(touch.pickup);
        commands.entity(touch.pickup).despawn();
        collected.write(PickupCollected {
            pickup: touch.pickup,
            collector: touch.toucher,
            kind: pickup.kind,
        });

        crate::log(&format!(
            "📦 {:?} pickup {:?} (+{}) collected by {:?}",
            pickup.kind, touch.pickup, pickup.amount, touch.toucher
        ));
    }
}

/// System: вращение pickup'ов вокруг Y
pub fn spin_pickups(mut pickups: Query<(&Pickup, &mut Transform)>, time: Res<Time>) {
    let delta = time.delta_secs();
    for (pickup, mut transform) in pickups.iter_mut() {
        transform.rotate_y(pickup.spin_speed.to_radians() * delta);
    }
}

/// Item Plugin
pub struct ItemPlugin;

impl Plugin for ItemPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PickupTouched>()
            .add_event::<PickupCollected>();

        app.add_systems(
            FixedUpdate,
            (
                collect_pickups.in_set(SimulationSet::Resolution),
                spin_pickups.in_set(SimulationSet::Cleanup),
            ),
        );
    }
}
