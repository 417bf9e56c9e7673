//! Enemy AI module
//!
//! Explicit FSM на каждого врага: Dormant → Alert → {Pursuing, Engaging} → Dead.
//! Brain читает только свою entity и Transform цели (ChaseTarget),
//! пишет MovementCommand / Animator / rotation.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use events::*;

use crate::SimulationSet;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. tick_enemy_brains — perception / alert loop / chase / падение трупа
/// 2. ai_weapon_fire_intent — Engaging → WeaponIntent (до weapon систем)
/// 3. enemy_death_listener — lethal Damaged → cancel + death sequence (после resolve_shots)
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EnemyDeathFinished>()
            .add_event::<EnemyAlerted>();

        app.add_systems(
            FixedUpdate,
            (
                (systems::tick_enemy_brains, systems::ai_weapon_fire_intent)
                    .chain()
                    .in_set(SimulationSet::Ai),
                systems::enemy_death_listener.in_set(SimulationSet::Reactions),
            ),
        );
    }
}
