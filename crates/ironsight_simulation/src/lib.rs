//! IRONSIGHT Simulation Core
//!
//! Combat-resolution ядро FPS на Bevy 0.16 (headless ECS):
//! - Health ledger + damage/recovery нотификации
//! - Hit resolver (ray → player / enemy / world)
//! - Weapon fire-control (ammo, reload, swap)
//! - Enemy brain FSM (perception, chase, engage, death)
//! - Enemy roster (spawn / despawn / count)
//!
//! Рендер, navmesh, проигрывание анимаций и звука — снаружи, через
//! компоненты-контракты (NavAgent, Animator) и события.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod headless;
pub mod item_system;
pub mod logger;
pub mod recorder;
pub mod roster;

// Re-export базовых компонентов для удобства
pub use ai::{AIPlugin, ChaseTarget, Enemy, EnemyBrain, EnemyDeathFinished, EnemyState};
pub use combat::{
    AmmoChanged, AttackFired, CombatPlugin, Damaged, Dead, EntityDied, Loadout, Recovered, Weapon, WeaponAction,
    WeaponIntent, WeaponOwner,
};
pub use components::*;
pub use config::{ConfigError, SimulationConfig};
pub use headless::{EventLog, HeadlessAnimationPlugin, HeadlessNavigationPlugin, RecordEvents};
pub use item_system::{ItemPlugin, Pickup, PickupKind, PickupTouched};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use recorder::{RecorderControl, RecorderPlugin, RecordingTick, TimeRecorder};
pub use roster::{EnemyRoster, RosterCountChanged, RosterPlugin, SpawnEnemy};

/// Фазы simulation tick (FixedUpdate), выполняются строго по порядку
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Спавн врагов, recorder
    Spawn,
    /// Enemy brains + fire intents
    Ai,
    /// Навигация (headless stand-in или внешний navmesh)
    Navigation,
    /// Weapon intents, reload/swap waits
    Weapons,
    /// Лучи, pickups → мутации Health
    Resolution,
    /// Listeners Damaged → смерть
    Reactions,
    /// Удаление трупов, эффекты, вращение pickups
    Cleanup,
    /// Presenter отчитывает позы (headless stand-in)
    Presentation,
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Config берётся из уже вставленного `SimulationConfig` (иначе default).
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SimulationConfig>()
            .cloned()
            .unwrap_or_default();

        app
            // Fixed timestep для simulation tick (60Hz по умолчанию)
            .insert_resource(Time::<Fixed>::from_hz(config.tick_hz))
            .insert_resource(config)
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Spawn,
                    SimulationSet::Ai,
                    SimulationSet::Navigation,
                    SimulationSet::Weapons,
                    SimulationSet::Resolution,
                    SimulationSet::Reactions,
                    SimulationSet::Cleanup,
                    SimulationSet::Presentation,
                )
                    .chain(),
            )
            // Подсистемы
            .add_plugins((CombatPlugin, AIPlugin, RosterPlugin, ItemPlugin, RecorderPlugin));

        // Детерминистичный RNG (seed по умолчанию, если app не задал свой)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Только runtime (MinimalPlugins + RNG). Симуляцию добавляет вызывающий:
/// `app.add_plugins((SimulationPlugin, HeadlessNavigationPlugin, HeadlessAnimationPlugin))`.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot компонентов T для сравнения детерминизма
///
/// Порядок — по Entity index, формат — Debug (достаточно для равенства прогонов).
pub fn world_snapshot<T>(world: &mut World) -> Vec<u8>
where
    T: Component + std::fmt::Debug,
{
    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();
    entities.sort_by_key(|(entity, _)| entity.index());

    let mut snapshot = Vec::new();
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
