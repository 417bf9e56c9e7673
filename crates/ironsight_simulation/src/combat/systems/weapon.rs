//! Weapon systems: intents → state transitions, reload/swap waits.

use bevy::prelude::*;

use crate::combat::effects::{CombatFeedback, SfxKind};
use crate::combat::weapon::{
    Aim, AmmoChanged, AttackFired, FireOutcome, Loadout, ReloadOutcome, ShotFired, WaitCompleted, Weapon,
    WeaponAction, WeaponIntent, WeaponOwner,
};
use crate::components::{AnimFlag, AnimFloat, AnimTrigger, Animator};
use crate::config::SimulationConfig;

/// System: обработка WeaponIntent
///
/// Один intent = одна попытка. Отклонённые запросы (не Idle, полный магазин,
/// swap во время swap, swap на оружие другого владельца) — no-op с debug логом, инварианты не трогаются.
pub fn process_weapon_intents(
    mut intents: EventReader<WeaponIntent>,
    mut weapons: Query<(&mut Weapon, &mut Animator, Option<&WeaponOwner>)>,
    owners: Query<&Transform>,
    config: Res<SimulationConfig>,
    mut shots: EventWriter<ShotFired>,
    mut fired: EventWriter<AttackFired>,
    mut feedback: CombatFeedback,
) {
    for intent in intents.read() {
        // Swap target валидируем до mutable borrow текущего оружия.
        // Target должен принадлежать тому же владельцу (или оба без владельца)
        let swap_target_ready = match intent.action {
            WeaponAction::Swap { to } => {
                let source_owner = weapons
                    .get(intent.weapon)
                    .ok()
                    .and_then(|(_, _, owner)| owner.map(|o| o.0));
                to != intent.weapon
                    && weapons
                        .get(to)
                        .map(|(target, _, owner)| {
                            !target.is_active() && owner.map(|o| o.0) == source_owner
                        })
                        .unwrap_or(false)
            }
            _ => false,
        };

        let Ok((mut weapon, mut animator, owner)) = weapons.get_mut(intent.weapon) else {
            crate::log(&format!("⚠️ WeaponIntent for missing weapon {:?}", intent.weapon));
            continue;
        };
        let owner = owner.map(|o| o.0);

        match intent.action {
            WeaponAction::Attack { aim } => {
                let aim = aim.or_else(|| {
                    let transform = owners.get(owner?).ok()?;
                    Some(Aim {
                        origin: transform.translation,
                        direction: *transform.forward(),
                    })
                });

                let Some(aim) = aim else {
                    crate::log(&format!(
                        "Weapon {:?}: attack without aim and without owner transform, ignored",
                        intent.weapon
                    ));
                    continue;
                };

                match weapon.try_fire() {
                    FireOutcome::Fired => {
                        animator.set_flag(AnimFlag::Attack, weapon.attack_animation_allowed());

                        shots.write(ShotFired {
                            weapon: intent.weapon,
                            shooter: owner,
                            origin: aim.origin,
                            direction: aim.direction,
                            range: weapon.range,
                            damage: weapon.damage,
                        });
                        fired.write(AttackFired {
                            weapon: intent.weapon,
                            owner,
                            remaining_ammo: (!weapon.is_unlimited()).then_some(weapon.current_ammo),
                        });

                        if let Some(sfx) = weapon.fire_sfx {
                            feedback.sound(sfx, aim.origin);
                        }
                        if let Some(effect) = weapon.muzzle_effect {
                            let facing = aim.direction.normalize_or(Vec3::NEG_Z);
                            feedback.effect(effect, aim.origin, Quat::from_rotation_arc(Vec3::NEG_Z, facing));
                        }
                    }
                    FireOutcome::Empty => {
                        animator.set_flag(AnimFlag::Attack, false);
                        feedback.sound(SfxKind::DryFire, aim.origin);
                        crate::log(&format!("{} ({:?}): magazine empty", weapon.name, intent.weapon));
                    }
                    FireOutcome::Refused => {
                        crate::log(&format!(
                            "{} ({:?}): fire refused in {:?}",
                            weapon.name, intent.weapon, weapon.state
                        ));
                    }
                }
            }

            WeaponAction::CeaseFire => {
                animator.set_flag(AnimFlag::Attack, false);
            }

            WeaponAction::Reload => match weapon.begin_reload(config.reload_settle) {
                ReloadOutcome::Started => {
                    animator.set_flag(AnimFlag::Attack, false);
                    animator.trigger(AnimTrigger::Reload);
                    crate::log(&format!(
                        "🔄 {} ({:?}): reloading {}/{}",
                        weapon.name, intent.weapon, weapon.current_ammo, weapon.magazine_capacity
                    ));
                }
                ReloadOutcome::AlreadyFull => {
                    crate::log(&format!("{} ({:?}): reload skipped, magazine full", weapon.name, intent.weapon));
                }
                ReloadOutcome::Refused => {
                    crate::log(&format!(
                        "{} ({:?}): reload refused in {:?}",
                        weapon.name, intent.weapon, weapon.state
                    ));
                }
            },

            WeaponAction::Swap { to } => {
                if !swap_target_ready {
                    crate::log(&format!(
                        "{} ({:?}): swap to {:?} refused (target missing, active or foreign)",
                        weapon.name, intent.weapon, to
                    ));
                    continue;
                }

                if weapon.begin_swap(to, config.swap_settle) {
                    animator.set_flag(AnimFlag::Attack, false);
                    animator.trigger(AnimTrigger::Change);
                    crate::log(&format!("🔀 {} ({:?}): swapping to {:?}", weapon.name, intent.weapon, to));
                } else {
                    crate::log(&format!(
                        "{} ({:?}): swap refused in {:?}",
                        weapon.name, intent.weapon, weapon.state
                    ));
                }
            }

            WeaponAction::Locomotion { walk, running } => {
                animator.set_float(AnimFloat::Walk, walk);
                animator.set_flag(AnimFlag::Run, running);
            }

            WeaponAction::Aim(aiming) => {
                animator.set_flag(AnimFlag::Aiming, aiming);
            }
        }
    }
}

/// System: reload/swap ожидания (poll позы раз в tick)
///
/// Swap завершается в две фазы: сначала собираем завершённые,
/// потом активируем `next` (нельзя держать два `&mut Weapon` одновременно).
pub fn tick_weapon_waits(
    mut weapons: Query<(Entity, &mut Weapon, &Animator, Option<&WeaponOwner>)>,
    mut loadouts: Query<&mut Loadout>,
    time: Res<Time>,
    mut ammo_events: EventWriter<AmmoChanged>,
) {
    let delta = time.delta_secs();
    let mut activations: Vec<(Entity, Entity, Option<Entity>)> = Vec::new();

    for (entity, mut weapon, animator, owner) in weapons.iter_mut() {
        match weapon.tick_wait(delta, &animator.status()) {
            Some(WaitCompleted::Reloaded) => {
                ammo_events.write(AmmoChanged::of(entity, &weapon));
                crate::log(&format!(
                    "✅ {} ({:?}): reloaded {}/{}",
                    weapon.name, entity, weapon.current_ammo, weapon.magazine_capacity
                ));
            }
            Some(WaitCompleted::Swapped { next }) => {
                activations.push((entity, next, owner.map(|o| o.0)));
            }
            None => {}
        }
    }

    for (from, next, owner) in activations {
        let Ok((_, mut weapon, _, _)) = weapons.get_mut(next) else {
            crate::log_warning(&format!("Swap {:?} → {:?}: target weapon vanished", from, next));
            continue;
        };

        if !weapon.is_active() {
            weapon.activate();
        }

        if let Some(owner) = owner {
            if let Ok(mut loadout) = loadouts.get_mut(owner) {
                loadout.equip(next);
            }
        }

        crate::log(&format!("🔀 Swap complete: {:?} → {} ({:?})", from, weapon.name, next));
    }
}
