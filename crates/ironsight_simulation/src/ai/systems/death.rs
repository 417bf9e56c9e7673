//! Enemy death listener.

use bevy::prelude::*;
use bevy_rapier3d::prelude::ColliderDisabled;

use crate::ai::{BrainActuators, Enemy, EnemyBrain};
use crate::combat::{CombatFeedback, Damaged, Dead, EntityDied, Loadout, SfxKind, Weapon};
use crate::components::{AnimFlag, Animator, MovementCommand};

/// Система: lethal Damaged → смерть врага
///
/// Brain сам гарантирует "ровно один раз": `begin_death` false для уже мёртвого,
/// поэтому два lethal события за один tick дают одну death sequence.
/// Hit detection выключается сразу (`ColliderDisabled`), roster удалит entity
/// после падения (EnemyDeathFinished). Оружие из loadout деактивируется
/// в тот же tick: незавершённый reload/swap не доиграет.
pub fn enemy_death_listener(
    mut commands: Commands,
    mut damaged: EventReader<Damaged>,
    mut enemies: Query<
        (&mut EnemyBrain, &mut Transform, &mut MovementCommand, &mut Animator, Option<&Loadout>),
        With<Enemy>,
    >,
    mut weapons: Query<(&mut Weapon, &mut Animator), Without<Enemy>>,
    mut died: EventWriter<EntityDied>,
    mut feedback: CombatFeedback,
) {
    for event in damaged.read() {
        if !event.is_lethal() {
            continue;
        }

        let Ok((mut brain, mut transform, mut movement, mut animator, loadout)) = enemies.get_mut(event.entity) else {
            continue;
        };

        let current = transform.rotation;
        let position = transform.translation;
        let mut body = BrainActuators {
            movement: &mut movement,
            animator: &mut animator,
            rotation: &mut transform.rotation,
        };

        if !brain.begin_death(current, &mut body) {
            continue;
        }

        for slot in loadout.map(|l| l.slots.as_slice()).unwrap_or_default() {
            let Ok((mut weapon, mut weapon_animator)) = weapons.get_mut(*slot) else {
                continue;
            };
            if weapon.deactivate() {
                crate::log(&format!("{} ({:?}): pending wait cancelled by owner death", weapon.name, slot));
            }
            weapon_animator.set_flag(AnimFlag::Attack, false);
        }

        commands.entity(event.entity).insert((ColliderDisabled, Dead));
        died.write(EntityDied {
            entity: event.entity,
            killer: event.source,
        });
        feedback.sound(SfxKind::EnemyDeath, position);

        crate::log_info(&format!(
            "💀 Enemy {:?} killed by {:?}",
            event.entity, event.source
        ));
    }
}
