//! Enemy brain systems (perception, alert loop, chase, death topple).

use bevy::prelude::*;

use crate::ai::{
    BrainActuators, BrainSenses, BrainSignal, BrainTuning, ChaseTarget, Enemy, EnemyAlerted, EnemyBrain,
    EnemyDeathFinished,
};
use crate::combat::Dead;
use crate::components::{Animator, MovementCommand, NavAgent};
use crate::config::SimulationConfig;

/// Система: один tick brain'а каждого врага
///
/// Цель без Transform (despawn) или с `Dead` маркером = цели нет.
/// Порядок между врагами не важен: brain читает только свою entity + цель.
pub fn tick_enemy_brains(
    mut enemies: Query<(
        Entity,
        &Enemy,
        &mut EnemyBrain,
        &mut Transform,
        &mut MovementCommand,
        &mut Animator,
        &NavAgent,
        Option<&ChaseTarget>,
    )>,
    targets: Query<&Transform, (Without<Enemy>, Without<Dead>)>,
    config: Res<SimulationConfig>,
    time: Res<Time>,
    mut alerted: EventWriter<EnemyAlerted>,
    mut finished: EventWriter<EnemyDeathFinished>,
) {
    let delta = time.delta_secs();

    for (entity, enemy, mut brain, mut transform, mut movement, mut animator, nav, chase_target) in enemies.iter_mut() {
        let target_entity = chase_target.map(|t| t.0);
        let target = target_entity
            .and_then(|t| targets.get(t).ok())
            .map(|t| t.translation);

        let tuning = BrainTuning {
            engagement_range: enemy.engagement_range,
            chase_poll_interval: config.chase_poll_interval,
            topple_duration: config.death_topple_duration,
        };
        let senses = BrainSenses {
            position: transform.translation,
            rotation: transform.rotation,
            target,
            nav,
        };
        let mut body = BrainActuators {
            movement: &mut movement,
            animator: &mut animator,
            rotation: &mut transform.rotation,
        };

        let Some(signal) = brain.tick(delta, &tuning, &senses, &mut body) else {
            continue;
        };

        match signal {
            BrainSignal::Alerted => {
                alerted.write(EnemyAlerted {
                    entity,
                    target: target_entity,
                });
                crate::log(&format!("👁️ Enemy {:?}: target spotted → Alert", entity));
            }
            BrainSignal::ChaseStarted => {
                crate::log(&format!("🏃 Enemy {:?}: out of range → Pursuing", entity));
            }
            BrainSignal::Arrived => {
                crate::log(&format!("📍 Enemy {:?}: arrived → Alert", entity));
            }
            BrainSignal::Engaged => {
                crate::log(&format!("🔫 Enemy {:?}: in range → Engaging", entity));
            }
            BrainSignal::DeathFinished => {
                finished.write(EnemyDeathFinished { entity });
                crate::log(&format!("⚰️ Enemy {:?}: death sequence finished", entity));
            }
        }
    }
}
