//! Combat module: Health ledger events, hit resolution, weapon fire-control
//!
//! Поток данных:
//! WeaponIntent → process_weapon_intents → ShotFired → resolve_shots (HitResolver)
//! → apply_damage → Damaged → listeners (AI death, player death)
//!
//! Presentation (анимации, звук, частицы) — снаружи:
//! - Animator requests/status (components::animation)
//! - PlaySfx / EffectPlayed events

use bevy::prelude::*;

pub mod damage;
pub mod effects;
pub mod hit_resolver;
pub mod systems;
pub mod weapon;


// Re-export основных типов
pub use damage::{apply_damage, apply_recovery, detect_player_death, Damaged, Dead, EntityDied, Recovered};
pub use effects::{
    play_effect, play_sfx, CombatFeedback, EffectHandle, EffectKind, EffectPlayed, EffectPools, PlaySfx, SfxKind,
    SoundBank,
};
pub use hit_resolver::{surface_orientation, HitKind, HitOutcome, HitResolver, RayContact};
pub use weapon::{
    Aim, AmmoChanged, AttackFired, FireOutcome, Loadout, ReloadOutcome, ShotFired, Weapon, WeaponAction,
    WeaponIntent, WeaponOwner, WeaponState,
};

use crate::SimulationSet;

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate.
///
/// Порядок выполнения:
/// 1. process_weapon_intents — fire / reload / swap / animation параметры
/// 2. tick_weapon_waits — reload и swap ожидания позы
/// 3. resolve_shots — лучи через HitResolver → урон / impact эффекты
/// 4. detect_player_death — Damaged (lethal) → Dead + EntityDied
/// 5. tick_effect_pools — playback эффектов (освобождение instance)
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<Damaged>()
            .add_event::<Recovered>()
            .add_event::<EntityDied>()
            .add_event::<WeaponIntent>()
            .add_event::<ShotFired>()
            .add_event::<AttackFired>()
            .add_event::<AmmoChanged>()
            .add_event::<PlaySfx>()
            .add_event::<EffectPlayed>();

        app.init_resource::<EffectPools>().init_resource::<SoundBank>();

        app.add_systems(
            FixedUpdate,
            (
                (systems::process_weapon_intents, systems::tick_weapon_waits)
                    .chain()
                    .in_set(SimulationSet::Weapons),
                systems::resolve_shots.in_set(SimulationSet::Resolution),
                detect_player_death.in_set(SimulationSet::Reactions),
                effects::tick_effect_pools.in_set(SimulationSet::Cleanup),
            ),
        );
    }
}
