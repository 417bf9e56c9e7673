//! Enemy Roster: реестр живых врагов
//!
//! - порядок = порядок спавна, без дубликатов
//! - count не хранится, вычисляется из списка
//! - каждая мутация сразу публикует RosterCountChanged (win condition слушает снаружи)
//! - урон врагам идёт через roster (hit impact эффект + apply_damage)

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;

use crate::ai::{ChaseTarget, Enemy, EnemyBrain, EnemyDeathFinished, FireCadence};
use crate::combat::{apply_damage, surface_orientation, CombatFeedback, Damaged, EffectKind, Loadout, Weapon, WeaponOwner};
use crate::components::{Animator, Health, HealthChange, MovementCommand, NavAgent};
use crate::config::SimulationConfig;
use crate::SimulationSet;

/// Событие: размер roster после мутации
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterCountChanged {
    pub count: usize,
}

/// Запрос спавна врага
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SpawnEnemy {
    pub position: Vec3,
    pub rotation: Quat,
    /// Кого преследовать (обычно игрок)
    pub target: Option<Entity>,
    /// None = `SimulationConfig::enemy.start_alert`
    pub start_alert: Option<bool>,
}

impl SpawnEnemy {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            target: None,
            start_alert: None,
        }
    }

    pub fn facing(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn chasing(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }

    pub fn alert(mut self, start_alert: bool) -> Self {
        self.start_alert = Some(start_alert);
        self
    }
}

/// Попадание по врагу (для roster damage path)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyHit {
    pub enemy: Entity,
    pub amount: u32,
    pub source: Option<Entity>,
    pub point: Vec3,
    pub normal: Vec3,
}

#[derive(Resource, Debug, Default)]
pub struct EnemyRoster {
    enemies: Vec<Entity>,
}

impl EnemyRoster {
    pub fn count(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn contains(&self, enemy: Entity) -> bool {
        self.enemies.contains(&enemy)
    }

    /// Живые враги в порядке спавна
    pub fn enemies(&self) -> &[Entity] {
        &self.enemies
    }

    /// false — уже в roster (нотификации нет)
    pub fn register(&mut self, enemy: Entity, counts: &mut EventWriter<RosterCountChanged>) -> bool {
        if self.contains(enemy) {
            return false;
        }

        self.enemies.push(enemy);
        counts.write(RosterCountChanged { count: self.count() });
        true
    }

    /// false — не было в roster (нотификации нет)
    pub fn remove(&mut self, enemy: Entity, counts: &mut EventWriter<RosterCountChanged>) -> bool {
        let Some(index) = self.enemies.iter().position(|e| *e == enemy) else {
            return false;
        };

        self.enemies.remove(index);
        counts.write(RosterCountChanged { count: self.count() });
        true
    }

    /// Damage path врага: hit impact эффект + apply_damage
    ///
    /// None — entity не в roster (урон не применяется).
    pub fn damage(
        &self,
        hit: EnemyHit,
        health: &mut Health,
        feedback: &mut CombatFeedback,
        damaged: &mut EventWriter<Damaged>,
    ) -> Option<HealthChange> {
        if !self.contains(hit.enemy) {
            crate::log(&format!("Hit on {:?} ignored: not in roster", hit.enemy));
            return None;
        }

        feedback.effect(EffectKind::HitImpact, hit.point, surface_orientation(hit.normal));
        Some(apply_damage(hit.enemy, health, hit.amount, hit.source, damaged))
    }
}

/// Форма hit collider врага (капсула ~1.8m)
pub fn enemy_collider() -> Collider {
    Collider::capsule_y(0.5, 0.4)
}

/// System: SpawnEnemy → entity врага + его оружие, регистрация в roster
pub fn spawn_enemies(
    mut commands: Commands,
    mut requests: EventReader<SpawnEnemy>,
    mut roster: ResMut<EnemyRoster>,
    config: Res<SimulationConfig>,
    mut counts: EventWriter<RosterCountChanged>,
) {
    for request in requests.read() {
        let defaults = &config.enemy;
        let stats = Enemy {
            speed: defaults.speed,
            engagement_range: defaults.engagement_range,
            eye_height: defaults.eye_height,
            fire_interval: defaults.fire_interval,
        };
        let start_alert = request.start_alert.unwrap_or(defaults.start_alert);

        let enemy = commands
            .spawn((
                Transform::from_translation(request.position).with_rotation(request.rotation),
                stats,
                EnemyBrain::new(start_alert),
                Health::new(defaults.max_health),
                NavAgent::new(stats.speed, stats.engagement_range),
                MovementCommand::Idle,
                Animator::default(),
                FireCadence::default(),
                enemy_collider(),
            ))
            .id();

        if let Some(target) = request.target {
            commands.entity(enemy).insert(ChaseTarget(target));
        }

        let weapon = commands
            .spawn((Weapon::enemy_rifle(), WeaponOwner(enemy), Animator::default()))
            .id();
        commands.entity(enemy).insert(Loadout::new(vec![weapon]));

        roster.register(enemy, &mut counts);

        crate::log_info(&format!(
            "🧟 Enemy {:?} spawned at {:?} (alert: {}, roster: {})",
            enemy,
            request.position,
            start_alert,
            roster.count()
        ));
    }
}

/// System: EnemyDeathFinished → убрать из roster, удалить врага и его оружие
pub fn despawn_finished_enemies(
    mut commands: Commands,
    mut finished: EventReader<EnemyDeathFinished>,
    mut roster: ResMut<EnemyRoster>,
    loadouts: Query<&Loadout>,
    mut counts: EventWriter<RosterCountChanged>,
) {
    for event in finished.read() {
        if !roster.remove(event.entity, &mut counts) {
            continue;
        }

        if let Ok(loadout) = loadouts.get(event.entity) {
            for weapon in &loadout.slots {
                commands.entity(*weapon).despawn();
            }
        }
        commands.entity(event.entity).despawn();

        crate::log_info(&format!(
            "🗑️ Enemy {:?} removed (roster: {})",
            event.entity,
            roster.count()
        ));
    }
}

/// Roster Plugin
///
/// Спавн в начале tick (до AI), удаление в конце (после death sequence).
pub struct RosterPlugin;

impl Plugin for RosterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EnemyRoster>()
            .add_event::<RosterCountChanged>()
            .add_event::<SpawnEnemy>();

        app.add_systems(
            FixedUpdate,
            (
                spawn_enemies.in_set(SimulationSet::Spawn),
                despawn_finished_enemies.in_set(SimulationSet::Cleanup),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    fn roster_world() -> World {
        let mut world = World::new();
        world.init_resource::<EnemyRoster>();
        world.init_resource::<Events<RosterCountChanged>>();
        world
    }

    fn counts(world: &World) -> Vec<usize> {
        let events = world.resource::<Events<RosterCountChanged>>();
        events.iter_current_update_events().map(|e| e.count).collect()
    }

    #[test]
    fn test_register_publishes_post_mutation_count() {
        let mut world = roster_world();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();

        world
            .run_system_once(move |mut roster: ResMut<EnemyRoster>, mut counts: EventWriter<RosterCountChanged>| {
                assert!(roster.register(a, &mut counts));
                assert!(roster.register(b, &mut counts));
                // Дубликат — без нотификации
                assert!(!roster.register(a, &mut counts));
            })
            .expect("system runs");

        assert_eq!(counts(&world), vec![1, 2]);
        assert_eq!(world.resource::<EnemyRoster>().enemies(), &[a, b]);
    }

    #[test]
    fn test_remove_publishes_once() {
        let mut world = roster_world();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();

        world
            .run_system_once(move |mut roster: ResMut<EnemyRoster>, mut counts: EventWriter<RosterCountChanged>| {
                roster.register(a, &mut counts);
                roster.register(b, &mut counts);
                assert!(roster.remove(a, &mut counts));
                assert!(!roster.remove(a, &mut counts));
            })
            .expect("system runs");

        assert_eq!(counts(&world), vec![1, 2, 1]);
        assert_eq!(world.resource::<EnemyRoster>().enemies(), &[b]);
    }
}
