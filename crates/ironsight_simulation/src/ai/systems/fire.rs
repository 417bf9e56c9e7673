//! Enemy fire cadence (Engaging → WeaponIntent).

use bevy::prelude::*;

use crate::ai::{ChaseTarget, Enemy, EnemyBrain, EnemyState, FireCadence};
use crate::combat::{Aim, Loadout, Weapon, WeaponAction, WeaponIntent};

/// System: AI weapon fire intent
///
/// Только в Engaging. Раз в `fire_interval`:
/// - есть патроны → Attack, луч из глаз в цель
/// - магазин пуст → Reload
///
/// Пока оружие не Idle intent не шлём, и cadence не перезапускается:
/// первый выстрел после reload уходит сразу.
pub fn ai_weapon_fire_intent(
    mut enemies: Query<(Entity, &Enemy, &EnemyBrain, &Transform, &Loadout, &mut FireCadence, Option<&ChaseTarget>)>,
    weapons: Query<&Weapon>,
    targets: Query<&Transform, Without<Enemy>>,
    time: Res<Time>,
    mut intents: EventWriter<WeaponIntent>,
) {
    let delta = time.delta_secs();

    for (entity, enemy, brain, transform, loadout, mut cadence, chase_target) in enemies.iter_mut() {
        if !matches!(brain.state, EnemyState::Engaging) {
            continue;
        }
        cadence.tick(delta);

        let Some(target) = chase_target.and_then(|t| targets.get(t.0).ok()) else {
            continue;
        };

        let Some(weapon_entity) = loadout.equipped_weapon() else {
            continue;
        };
        let Ok(weapon) = weapons.get(weapon_entity) else {
            continue;
        };

        // Занятое оружие (reload/swap) не тратит окно стрельбы
        if !weapon.is_idle() || !cadence.ready(enemy.fire_interval) {
            continue;
        }

        let action = if weapon.has_ammo() {
            let origin = transform.translation + Vec3::Y * enemy.eye_height;
            WeaponAction::Attack {
                aim: Some(Aim {
                    origin,
                    direction: target.translation - origin,
                }),
            }
        } else {
            WeaponAction::Reload
        };

        intents.write(WeaponIntent {
            weapon: weapon_entity,
            action,
        });

        crate::log(&format!("Enemy {:?}: {:?} with {}", entity, action, weapon.name));
    }
}
