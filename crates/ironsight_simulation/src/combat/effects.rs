//! Cosmetic эффекты (particles) и one-shot звуки
//!
//! Effect pools:
//! - пул на каждый EffectKind
//! - acquire = первый не играющий instance, иначе новый в конец пула
//! - instance никогда не "возвращается" явно — свободен когда доиграл
//! - пул не сжимается (ограничен на практике одновременным использованием)
//!
//! Presentation читает `EffectPlayed` и (пере)запускает свой particle node
//! для handle. Звук — `PlaySfx` с уже выбранным вариантом клипа.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::Rng;
use std::collections::HashMap;

use crate::config::{EffectLifetimes, SimulationConfig};
use crate::DeterministicRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    MuzzleFlash,
    /// Попадание по врагу
    HitImpact,
    /// Попадание в static world (ориентирован по нормали)
    SurfaceImpact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectHandle {
    pub kind: EffectKind,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectInstance {
    pub position: Vec3,
    pub orientation: Quat,
    pub elapsed: f32,
    pub lifetime: f32,
}

impl EffectInstance {
    pub fn is_playing(&self) -> bool {
        self.elapsed < self.lifetime
    }
}

/// Событие: instance пула (пере)запущен
#[derive(Event, Debug, Clone, Copy)]
pub struct EffectPlayed {
    pub handle: EffectHandle,
    pub position: Vec3,
    pub orientation: Quat,
}

/// Init через `FromWorld`: lifetimes берутся из `SimulationConfig`
#[derive(Resource, Debug)]
pub struct EffectPools {
    pools: HashMap<EffectKind, Vec<EffectInstance>>,
    lifetimes: HashMap<EffectKind, f32>,
}

impl FromWorld for EffectPools {
    fn from_world(world: &mut World) -> Self {
        match world.get_resource::<SimulationConfig>() {
            Some(config) => Self::new(&config.effects),
            None => Self::new(&EffectLifetimes::default()),
        }
    }
}

impl EffectPools {
    pub fn new(lifetimes: &EffectLifetimes) -> Self {
        let lifetimes = HashMap::from([
            (EffectKind::MuzzleFlash, lifetimes.muzzle_flash),
            (EffectKind::HitImpact, lifetimes.hit_impact),
            (EffectKind::SurfaceImpact, lifetimes.surface_impact),
        ]);

        Self {
            pools: HashMap::new(),
            lifetimes,
        }
    }

    /// Найти idle instance или аллоцировать новый
    pub fn spawn_or_reuse(&mut self, kind: EffectKind, position: Vec3, orientation: Quat) -> EffectHandle {
        let lifetime = self.lifetimes.get(&kind).copied().unwrap_or(0.5);
        let pool = self.pools.entry(kind).or_default();

        let fresh = EffectInstance {
            position,
            orientation,
            elapsed: 0.0,
            lifetime,
        };

        let index = match pool.iter().position(|instance| !instance.is_playing()) {
            Some(index) => {
                pool[index] = fresh;
                index
            }
            None => {
                pool.push(fresh);
                pool.len() - 1
            }
        };

        EffectHandle { kind, index }
    }

    pub fn tick(&mut self, delta: f32) {
        for instance in self.pools.values_mut().flatten() {
            if instance.is_playing() {
                instance.elapsed += delta;
            }
        }
    }

    pub fn get(&self, handle: EffectHandle) -> Option<&EffectInstance> {
        self.pools.get(&handle.kind)?.get(handle.index)
    }

    pub fn pool_size(&self, kind: EffectKind) -> usize {
        self.pools.get(&kind).map_or(0, Vec::len)
    }

    pub fn playing_count(&self, kind: EffectKind) -> usize {
        self.pools
            .get(&kind)
            .map_or(0, |pool| pool.iter().filter(|i| i.is_playing()).count())
    }
}

/// spawn_or_reuse + EffectPlayed event
pub fn play_effect(
    pools: &mut EffectPools,
    events: &mut EventWriter<EffectPlayed>,
    kind: EffectKind,
    position: Vec3,
    orientation: Quat,
) -> EffectHandle {
    let handle = pools.spawn_or_reuse(kind, position, orientation);
    events.write(EffectPlayed {
        handle,
        position,
        orientation,
    });
    handle
}

/// Система: продвинуть playback всех instance
pub fn tick_effect_pools(mut pools: ResMut<EffectPools>, time: Res<Time>) {
    pools.tick(time.delta_secs());
}

// ============================================================================
// Sound
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SfxKind {
    PistolFire,
    RifleFire,
    EnemyRifleFire,
    DryFire,
    PickupHealth,
    PickupAmmo,
    EnemyDeath,
}

/// Событие: проиграть one-shot клип в позиции
#[derive(Event, Debug, Clone, PartialEq)]
pub struct PlaySfx {
    pub kind: SfxKind,
    pub clip: String,
    pub position: Vec3,
}

/// Библиотека клипов: 1..N вариантов на SfxKind (случайный выбор при проигрывании)
#[derive(Resource, Debug, Clone)]
pub struct SoundBank {
    clips: HashMap<SfxKind, Vec<String>>,
}

impl Default for SoundBank {
    fn default() -> Self {
        let mut bank = Self {
            clips: HashMap::new(),
        };

        bank.insert(SfxKind::PistolFire, "sounds/weapons/pistol_fire.ogg");
        bank.insert(SfxKind::RifleFire, "sounds/weapons/rifle_fire_0.ogg");
        bank.insert(SfxKind::RifleFire, "sounds/weapons/rifle_fire_1.ogg");
        bank.insert(SfxKind::EnemyRifleFire, "sounds/enemies/rifle_fire.ogg");
        bank.insert(SfxKind::DryFire, "sounds/weapons/dry_fire.ogg");
        bank.insert(SfxKind::PickupHealth, "sounds/pickups/health.ogg");
        bank.insert(SfxKind::PickupAmmo, "sounds/pickups/ammo.ogg");
        for i in 0..3 {
            bank.insert(SfxKind::EnemyDeath, format!("sounds/enemies/death_{}.ogg", i));
        }

        bank
    }
}

impl SoundBank {
    pub fn empty() -> Self {
        Self {
            clips: HashMap::new(),
        }
    }

    pub fn insert(&mut self, kind: SfxKind, clip: impl Into<String>) {
        self.clips.entry(kind).or_default().push(clip.into());
    }

    /// None если для kind нет клипов (звук просто пропускается)
    pub fn pick(&self, kind: SfxKind, rng: &mut impl Rng) -> Option<&str> {
        let variants = self.clips.get(&kind)?;
        if variants.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..variants.len());
        Some(variants[index].as_str())
    }
}

/// Выбрать вариант и опубликовать PlaySfx. Нет клипа → ничего не делаем.
pub fn play_sfx(
    bank: &SoundBank,
    rng: &mut DeterministicRng,
    events: &mut EventWriter<PlaySfx>,
    kind: SfxKind,
    position: Vec3,
) {
    let Some(clip) = bank.pick(kind, &mut rng.rng) else {
        crate::log(&format!("🔇 No clip configured for {:?}, skipping", kind));
        return;
    };

    events.write(PlaySfx {
        kind,
        clip: clip.to_string(),
        position,
    });
}

// ============================================================================
// Feedback sink
// ============================================================================

/// Всё, что нужно системе чтобы проиграть звук и эффект
#[derive(SystemParam)]
pub struct CombatFeedback<'w> {
    bank: Res<'w, SoundBank>,
    rng: ResMut<'w, DeterministicRng>,
    sfx: EventWriter<'w, PlaySfx>,
    pools: ResMut<'w, EffectPools>,
    effects: EventWriter<'w, EffectPlayed>,
}

impl CombatFeedback<'_> {
    pub fn sound(&mut self, kind: SfxKind, position: Vec3) {
        play_sfx(&self.bank, &mut self.rng, &mut self.sfx, kind, position);
    }

    pub fn effect(&mut self, kind: EffectKind, position: Vec3, orientation: Quat) -> EffectHandle {
        play_effect(&mut self.pools, &mut self.effects, kind, position, orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pools() -> EffectPools {
        EffectPools::new(&EffectLifetimes {
            muzzle_flash: 0.1,
            hit_impact: 0.5,
            surface_impact: 1.0,
        })
    }

    #[test]
    fn test_pool_reuses_idle_instance() {
        let mut pools = pools();

        let first = pools.spawn_or_reuse(EffectKind::MuzzleFlash, Vec3::ZERO, Quat::IDENTITY);
        pools.tick(0.2); // muzzle flash доиграл

        let second = pools.spawn_or_reuse(EffectKind::MuzzleFlash, Vec3::X, Quat::IDENTITY);
        assert_eq!(first, second);
        assert_eq!(pools.pool_size(EffectKind::MuzzleFlash), 1);
        assert_eq!(pools.get(second).map(|i| i.position), Some(Vec3::X));
    }

    #[test]
    fn test_pool_grows_while_instances_play() {
        let mut pools = pools();

        let a = pools.spawn_or_reuse(EffectKind::SurfaceImpact, Vec3::ZERO, Quat::IDENTITY);
        let b = pools.spawn_or_reuse(EffectKind::SurfaceImpact, Vec3::ZERO, Quat::IDENTITY);

        assert_ne!(a.index, b.index);
        assert_eq!(pools.pool_size(EffectKind::SurfaceImpact), 2);
        assert_eq!(pools.playing_count(EffectKind::SurfaceImpact), 2);

        pools.tick(2.0);
        assert_eq!(pools.playing_count(EffectKind::SurfaceImpact), 0);
        // Пул не сжимается
        assert_eq!(pools.pool_size(EffectKind::SurfaceImpact), 2);
    }

    #[test]
    fn test_pools_are_scoped_per_kind() {
        let mut pools = pools();
        pools.spawn_or_reuse(EffectKind::HitImpact, Vec3::ZERO, Quat::IDENTITY);

        assert_eq!(pools.pool_size(EffectKind::HitImpact), 1);
        assert_eq!(pools.pool_size(EffectKind::MuzzleFlash), 0);
    }

    #[test]
    fn test_init_resource_uses_configured_lifetimes() {
        let mut world = World::new();
        world.insert_resource(SimulationConfig {
            effects: EffectLifetimes {
                muzzle_flash: 0.3,
                ..Default::default()
            },
            ..Default::default()
        });
        world.init_resource::<EffectPools>();

        let mut pools = world.resource_mut::<EffectPools>();
        let handle = pools.spawn_or_reuse(EffectKind::MuzzleFlash, Vec3::ZERO, Quat::IDENTITY);
        assert_eq!(pools.get(handle).map(|i| i.lifetime), Some(0.3));
    }

    #[test]
    fn test_sound_bank_pick_missing_kind() {
        let bank = SoundBank::empty();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(bank.pick(SfxKind::PistolFire, &mut rng).is_none());
    }

    #[test]
    fn test_sound_bank_pick_variant_is_deterministic() {
        let bank = SoundBank::default();

        let mut rng_a = ChaCha8Rng::seed_from_u64(42);
        let mut rng_b = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..10 {
            let a = bank.pick(SfxKind::EnemyDeath, &mut rng_a).map(str::to_string);
            let b = bank.pick(SfxKind::EnemyDeath, &mut rng_b).map(str::to_string);
            assert_eq!(a, b);
            assert!(a.is_some());
        }
    }
}
