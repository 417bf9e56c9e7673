//! Tests for weapon systems (intents → transitions → events).

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use std::time::Duration;

    use crate::combat::effects::{EffectPlayed, EffectPools, PlaySfx, SfxKind, SoundBank};
    use crate::combat::systems::{process_weapon_intents, tick_weapon_waits};
    use crate::combat::{
        Aim, AmmoChanged, AttackFired, Loadout, ShotFired, Weapon, WeaponAction, WeaponIntent, WeaponOwner,
        WeaponState,
    };
    use crate::components::{AnimFlag, AnimPose, AnimRequest, AnimTrigger, Animator};
    use crate::config::SimulationConfig;
    use crate::headless::{EventLog, RecordEvents};
    use crate::DeterministicRng;

    const DT: f32 = 1.0 / 60.0;

    /// App без MinimalPlugins: Time двигаем руками, чтобы delta была ровно DT
    fn weapon_app() -> App {
        let mut app = App::new();
        app.insert_resource(SimulationConfig::default())
            .insert_resource(DeterministicRng::new(7))
            .init_resource::<Time>()
            .init_resource::<SoundBank>()
            .init_resource::<EffectPools>()
            .add_event::<WeaponIntent>()
            .add_event::<ShotFired>()
            .add_event::<AttackFired>()
            .add_event::<AmmoChanged>()
            .add_event::<PlaySfx>()
            .add_event::<EffectPlayed>()
            .record_events::<ShotFired>()
            .record_events::<AttackFired>()
            .record_events::<AmmoChanged>()
            .record_events::<PlaySfx>()
            .add_systems(Update, (process_weapon_intents, tick_weapon_waits).chain());
        app
    }

    fn step(app: &mut App, intents: &[WeaponIntent]) {
        for intent in intents {
            app.world_mut().send_event(*intent);
        }
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(DT));
        app.update();
    }

    fn spawn_weapon(app: &mut App, weapon: Weapon) -> Entity {
        app.world_mut().spawn((weapon, Animator::default())).id()
    }

    fn weapon(app: &App, entity: Entity) -> &Weapon {
        app.world().get::<Weapon>(entity).expect("weapon exists")
    }

    fn aimed_attack(weapon: Entity) -> WeaponIntent {
        WeaponIntent {
            weapon,
            action: WeaponAction::Attack {
                aim: Some(Aim {
                    origin: Vec3::new(0.0, 1.5, 0.0),
                    direction: Vec3::NEG_Z,
                }),
            },
        }
    }

    fn report_pose(app: &mut App, entity: Entity, pose: AnimPose, progress: f32) {
        app.world_mut()
            .get_mut::<Animator>(entity)
            .expect("animator exists")
            .report(pose, progress);
    }

    #[test]
    fn test_reload_publishes_single_ammo_changed_after_pose_ends() {
        let mut app = weapon_app();
        let rifle = spawn_weapon(&mut app, Weapon::enemy_rifle().with_ammo(1));

        step(&mut app, &[WeaponIntent { weapon: rifle, action: WeaponAction::Reload }]);

        assert!(matches!(weapon(&app, rifle).state, WeaponState::Reloading(_)));
        let animator = app.world().get::<Animator>(rifle).unwrap();
        assert!(animator.pending().contains(&AnimRequest::Trigger(AnimTrigger::Reload)));

        // Reload поза играет — магазин не трогаем
        for _ in 0..20 {
            report_pose(&mut app, rifle, AnimPose::Reload, 0.5);
            step(&mut app, &[]);
        }
        assert!(app.world().resource::<EventLog<AmmoChanged>>().is_empty());
        assert_eq!(weapon(&app, rifle).current_ammo, 1);

        report_pose(&mut app, rifle, AnimPose::Reload, 1.0);
        step(&mut app, &[]);

        let log = app.world().resource::<EventLog<AmmoChanged>>();
        assert_eq!(log.len(), 1);
        assert_eq!(log.events[0].current, 6);
        assert_eq!(log.events[0].capacity, 6);
        assert!(weapon(&app, rifle).is_idle());

        for _ in 0..5 {
            step(&mut app, &[]);
        }
        assert_eq!(app.world().resource::<EventLog<AmmoChanged>>().len(), 1);
    }

    #[test]
    fn test_empty_magazine_dry_fires_without_ray() {
        let mut app = weapon_app();
        let mut animator = Animator::default();
        animator.set_flag(AnimFlag::Attack, true);
        let rifle = app
            .world_mut()
            .spawn((Weapon::enemy_rifle().with_ammo(0), animator))
            .id();

        step(&mut app, &[aimed_attack(rifle)]);

        assert!(app.world().resource::<EventLog<ShotFired>>().is_empty());
        assert!(app.world().resource::<EventLog<AttackFired>>().is_empty());
        assert!(!app.world().get::<Animator>(rifle).unwrap().flag(AnimFlag::Attack));

        let sounds = app.world().resource::<EventLog<PlaySfx>>();
        assert!(sounds.events.iter().any(|s| s.kind == SfxKind::DryFire));
        assert!(weapon(&app, rifle).is_idle());
    }

    #[test]
    fn test_unlimited_weapon_always_fires() {
        let mut app = weapon_app();
        let pistol = spawn_weapon(&mut app, Weapon::pistol());

        for _ in 0..5 {
            step(&mut app, &[aimed_attack(pistol)]);
        }

        assert_eq!(app.world().resource::<EventLog<ShotFired>>().len(), 5);
        let fired = app.world().resource::<EventLog<AttackFired>>();
        assert!(fired.events.iter().all(|e| e.remaining_ammo.is_none()));
        assert_eq!(weapon(&app, pistol).current_ammo, 0);
        assert!(app.world().get::<Animator>(pistol).unwrap().flag(AnimFlag::Attack));
    }

    #[test]
    fn test_attack_consumes_one_round_and_reports_remaining() {
        let mut app = weapon_app();
        let rifle = spawn_weapon(&mut app, Weapon::rifle());

        step(&mut app, &[aimed_attack(rifle)]);

        let shots = app.world().resource::<EventLog<ShotFired>>();
        assert_eq!(shots.len(), 1);
        assert_eq!(shots.events[0].damage, 25);
        assert_eq!(shots.events[0].range, 100.0);

        let fired = app.world().resource::<EventLog<AttackFired>>();
        assert_eq!(fired.events[0].remaining_ammo, Some(29));
        assert_eq!(weapon(&app, rifle).current_ammo, 29);
    }

    #[test]
    fn test_fire_refused_while_reloading() {
        let mut app = weapon_app();
        let rifle = spawn_weapon(&mut app, Weapon::rifle().with_ammo(2));

        step(
            &mut app,
            &[
                WeaponIntent { weapon: rifle, action: WeaponAction::Reload },
                aimed_attack(rifle),
            ],
        );

        assert!(app.world().resource::<EventLog<ShotFired>>().is_empty());
        assert_eq!(weapon(&app, rifle).current_ammo, 2);
    }

    #[test]
    fn test_attack_without_aim_uses_owner_forward() {
        let mut app = weapon_app();
        let owner = app
            .world_mut()
            .spawn(Transform::from_xyz(1.0, 0.0, 2.0))
            .id();
        let pistol = app
            .world_mut()
            .spawn((Weapon::pistol(), Animator::default(), WeaponOwner(owner)))
            .id();

        step(&mut app, &[WeaponIntent { weapon: pistol, action: WeaponAction::Attack { aim: None } }]);

        let shots = app.world().resource::<EventLog<ShotFired>>();
        assert_eq!(shots.len(), 1);
        assert_eq!(shots.events[0].shooter, Some(owner));
        assert_eq!(shots.events[0].origin, Vec3::new(1.0, 0.0, 2.0));
        assert!(shots.events[0].direction.abs_diff_eq(Vec3::NEG_Z, 1e-5));
    }

    #[test]
    fn test_swap_activates_next_and_equips_it() {
        let mut app = weapon_app();
        let owner = app.world_mut().spawn(Transform::default()).id();
        let pistol = app
            .world_mut()
            .spawn((Weapon::pistol(), Animator::default(), WeaponOwner(owner)))
            .id();
        let rifle = app
            .world_mut()
            .spawn((Weapon::rifle().holstered(), Animator::default(), WeaponOwner(owner)))
            .id();
        app.world_mut()
            .entity_mut(owner)
            .insert(Loadout::new(vec![pistol, rifle]));

        step(&mut app, &[WeaponIntent { weapon: pistol, action: WeaponAction::Swap { to: rifle } }]);
        assert!(matches!(weapon(&app, pistol).state, WeaponState::Swapping { .. }));

        // Второй swap во время swap — игнорируется
        step(&mut app, &[WeaponIntent { weapon: pistol, action: WeaponAction::Swap { to: rifle } }]);

        // Change поза не репортится (Idle) → конец после settle
        for _ in 0..30 {
            step(&mut app, &[]);
        }

        assert_eq!(weapon(&app, pistol).state, WeaponState::Inactive);
        assert!(weapon(&app, rifle).is_idle());
        let loadout = app.world().get::<Loadout>(owner).unwrap();
        assert_eq!(loadout.equipped_weapon(), Some(rifle));

        // Убранное оружие не стреляет
        step(&mut app, &[aimed_attack(pistol)]);
        assert!(app.world().resource::<EventLog<ShotFired>>().is_empty());
    }

    #[test]
    fn test_swap_to_active_weapon_refused() {
        let mut app = weapon_app();
        let pistol = spawn_weapon(&mut app, Weapon::pistol());
        let rifle = spawn_weapon(&mut app, Weapon::rifle());

        step(
            &mut app,
            &[
                WeaponIntent { weapon: pistol, action: WeaponAction::Swap { to: rifle } },
                WeaponIntent { weapon: pistol, action: WeaponAction::Swap { to: pistol } },
            ],
        );

        assert!(weapon(&app, pistol).is_idle());
        assert!(weapon(&app, rifle).is_idle());
    }

    #[test]
    fn test_swap_to_other_owners_weapon_refused() {
        let mut app = weapon_app();
        let arm = |app: &mut App| {
            let owner = app.world_mut().spawn(Transform::default()).id();
            let active = app
                .world_mut()
                .spawn((Weapon::pistol(), Animator::default(), WeaponOwner(owner)))
                .id();
            let holstered = app
                .world_mut()
                .spawn((Weapon::rifle().holstered(), Animator::default(), WeaponOwner(owner)))
                .id();
            app.world_mut()
                .entity_mut(owner)
                .insert(Loadout::new(vec![active, holstered]));
            (owner, active, holstered)
        };
        let (first, first_pistol, _) = arm(&mut app);
        let (second, second_pistol, second_rifle) = arm(&mut app);

        step(
            &mut app,
            &[WeaponIntent { weapon: first_pistol, action: WeaponAction::Swap { to: second_rifle } }],
        );
        for _ in 0..30 {
            step(&mut app, &[]);
        }

        assert!(weapon(&app, first_pistol).is_idle());
        assert_eq!(weapon(&app, second_rifle).state, WeaponState::Inactive);
        assert!(weapon(&app, second_pistol).is_idle());
        let first_loadout = app.world().get::<Loadout>(first).unwrap();
        assert_eq!(first_loadout.equipped_weapon(), Some(first_pistol));
        assert!(!first_loadout.slots.contains(&second_rifle));
        let second_loadout = app.world().get::<Loadout>(second).unwrap();
        assert_eq!(second_loadout.equipped_weapon(), Some(second_pistol));
    }
}
