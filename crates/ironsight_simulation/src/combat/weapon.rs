//! Weapon fire-control: ammo + single active state
//!
//! Состояния:
//! - Idle — принимает fire / reload / swap
//! - Reloading — ждёт окончания Reload позы (PoseWait)
//! - Swapping — ждёт окончания Change позы, потом Inactive, а `next` → Idle
//! - Inactive — убрано в loadout, запросы игнорируются
//!
//! Firing/Empty — не персистентные состояния, а исход одной попытки (`FireOutcome`).
//! `magazine_capacity == 0` = бесконечные патроны, `current_ammo` игнорируется.

use bevy::prelude::*;

use crate::combat::effects::{EffectKind, SfxKind};
use crate::components::{AnimPose, AnimationStatus, PoseWait};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeaponState {
    Idle,
    Reloading(PoseWait),
    Swapping { next: Entity, wait: PoseWait },
    Inactive,
}

/// Исход попытки выстрела
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// Патрон потрачен (если магазин конечный), луч уходит в resolver
    Fired,
    /// Магазин пуст — attack анимация выключается, луча нет
    Empty,
    /// Оружие не в Idle
    Refused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Started,
    AlreadyFull,
    Refused,
}

/// Завершённое ожидание позы
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCompleted {
    Reloaded,
    Swapped { next: Entity },
}

#[derive(Component, Debug, Clone)]
pub struct Weapon {
    pub name: String,
    pub damage: u32,
    pub range: f32,
    /// 0 = unlimited
    pub magazine_capacity: u32,
    pub current_ammo: u32,
    pub state: WeaponState,
    pub fire_sfx: Option<SfxKind>,
    pub muzzle_effect: Option<EffectKind>,
}

impl Weapon {
    pub fn new(name: impl Into<String>, damage: u32, range: f32, magazine_capacity: u32) -> Self {
        Self {
            name: name.into(),
            damage,
            range: range.max(0.0),
            magazine_capacity,
            current_ammo: magazine_capacity,
            state: WeaponState::Idle,
            fire_sfx: None,
            muzzle_effect: None,
        }
    }

    /// Стартовый боезапас (clamp в capacity)
    pub fn with_ammo(mut self, ammo: u32) -> Self {
        self.current_ammo = ammo.min(self.magazine_capacity);
        self
    }

    pub fn with_fire_sfx(mut self, sfx: SfxKind) -> Self {
        self.fire_sfx = Some(sfx);
        self
    }

    pub fn with_muzzle_effect(mut self, effect: EffectKind) -> Self {
        self.muzzle_effect = Some(effect);
        self
    }

    /// Оружие убрано в loadout (не экипировано)
    pub fn holstered(mut self) -> Self {
        self.state = WeaponState::Inactive;
        self
    }

    // ========================================================================
    // Presets
    // ========================================================================

    pub fn pistol() -> Self {
        Self::new("Pistol", 15, 50.0, 0)
            .with_fire_sfx(SfxKind::PistolFire)
            .with_muzzle_effect(EffectKind::MuzzleFlash)
    }

    pub fn rifle() -> Self {
        Self::new("Rifle", 25, 100.0, 30)
            .with_fire_sfx(SfxKind::RifleFire)
            .with_muzzle_effect(EffectKind::MuzzleFlash)
    }

    pub fn enemy_rifle() -> Self {
        Self::new("Enemy Rifle", 10, 30.0, 6)
            .with_fire_sfx(SfxKind::EnemyRifleFire)
            .with_muzzle_effect(EffectKind::MuzzleFlash)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn is_unlimited(&self) -> bool {
        self.magazine_capacity == 0
    }

    pub fn has_ammo(&self) -> bool {
        self.is_unlimited() || self.current_ammo > 0
    }

    pub fn is_full(&self) -> bool {
        self.is_unlimited() || self.current_ammo >= self.magazine_capacity
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, WeaponState::Idle)
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, WeaponState::Inactive)
    }

    /// Attack анимация допустима только с патронами (или unlimited)
    pub fn attack_animation_allowed(&self) -> bool {
        self.has_ammo()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    pub fn try_fire(&mut self) -> FireOutcome {
        if !self.is_idle() {
            return FireOutcome::Refused;
        }

        if !self.has_ammo() {
            return FireOutcome::Empty;
        }

        if !self.is_unlimited() {
            self.current_ammo -= 1;
        }

        FireOutcome::Fired
    }

    pub fn begin_reload(&mut self, settle: f32) -> ReloadOutcome {
        if !self.is_idle() {
            return ReloadOutcome::Refused;
        }

        if self.is_full() {
            return ReloadOutcome::AlreadyFull;
        }

        self.state = WeaponState::Reloading(PoseWait::new(AnimPose::Reload, settle));
        ReloadOutcome::Started
    }

    fn complete_reload(&mut self) {
        self.current_ammo = self.magazine_capacity;
        self.state = WeaponState::Idle;
    }

    /// false = swap отклонён (не Idle, в т.ч. swap уже идёт)
    pub fn begin_swap(&mut self, next: Entity, settle: f32) -> bool {
        if !self.is_idle() {
            return false;
        }

        self.state = WeaponState::Swapping {
            next,
            wait: PoseWait::new(AnimPose::Change, settle),
        };
        true
    }

    pub fn activate(&mut self) {
        self.state = WeaponState::Idle;
    }

    /// Владелец умер: reload/swap ожидание отменяется, оружие больше не отвечает
    ///
    /// true — было незавершённое ожидание.
    pub fn deactivate(&mut self) -> bool {
        let cancelled = matches!(self.state, WeaponState::Reloading(_) | WeaponState::Swapping { .. });
        self.state = WeaponState::Inactive;
        cancelled
    }

    /// Добавить патроны (pickup), возвращает сколько реально добавлено
    pub fn add_ammo(&mut self, amount: u32) -> u32 {
        if self.is_unlimited() {
            return 0;
        }

        let before = self.current_ammo;
        self.current_ammo = self
            .current_ammo
            .saturating_add(amount)
            .min(self.magazine_capacity);
        self.current_ammo - before
    }

    /// Продвинуть reload/swap ожидание на один tick
    pub fn tick_wait(&mut self, delta: f32, status: &AnimationStatus) -> Option<WaitCompleted> {
        match &mut self.state {
            WeaponState::Reloading(wait) => {
                if !wait.poll(delta, status) {
                    return None;
                }
                self.complete_reload();
                Some(WaitCompleted::Reloaded)
            }
            WeaponState::Swapping { next, wait } => {
                if !wait.poll(delta, status) {
                    return None;
                }
                let next = *next;
                self.state = WeaponState::Inactive;
                Some(WaitCompleted::Swapped { next })
            }
            WeaponState::Idle | WeaponState::Inactive => None,
        }
    }
}

/// Владелец оружия (стрелок). Луч игнорирует collider владельца.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponOwner(pub Entity);

/// Упорядоченный набор оружия владельца, ровно один слот экипирован
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Loadout {
    pub slots: Vec<Entity>,
    pub equipped: usize,
}

impl Loadout {
    pub fn new(slots: Vec<Entity>) -> Self {
        Self { slots, equipped: 0 }
    }

    pub fn equipped_weapon(&self) -> Option<Entity> {
        self.slots.get(self.equipped).copied()
    }

    /// Следующий слот по кругу (None если слот один)
    pub fn next_weapon(&self) -> Option<Entity> {
        if self.slots.len() < 2 {
            return None;
        }
        self.slots.get((self.equipped + 1) % self.slots.len()).copied()
    }

    /// Отметить weapon экипированным; false если его нет в loadout
    pub fn equip(&mut self, weapon: Entity) -> bool {
        match self.slots.iter().position(|slot| *slot == weapon) {
            Some(index) => {
                self.equipped = index;
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// Луч выстрела (мировые координаты)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aim {
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeaponAction {
    /// Нажат fire. Без aim луч идёт из owner Transform вперёд (-Z)
    Attack { aim: Option<Aim> },
    /// Fire отпущен
    CeaseFire,
    Reload,
    Swap { to: Entity },
    Locomotion { walk: f32, running: bool },
    Aim(bool),
}

/// Intent в weapon fire-control (input/presentation или AI)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct WeaponIntent {
    pub weapon: Entity,
    pub action: WeaponAction,
}

/// Внутренний event: выстрел прошёл, луч ждёт resolver
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ShotFired {
    pub weapon: Entity,
    pub shooter: Option<Entity>,
    pub origin: Vec3,
    pub direction: Vec3,
    pub range: f32,
    pub damage: u32,
}

/// Событие: оружие выстрелило
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackFired {
    pub weapon: Entity,
    pub owner: Option<Entity>,
    /// Патронов после выстрела (None = unlimited)
    pub remaining_ammo: Option<u32>,
}

/// Событие: магазин пополнен (reload / pickup)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmmoChanged {
    pub weapon: Entity,
    pub current: u32,
    pub capacity: u32,
}

impl AmmoChanged {
    pub fn of(weapon: Entity, stats: &Weapon) -> Self {
        Self {
            weapon,
            current: stats.current_ammo,
            capacity: stats.magazine_capacity,
        }
    }
}
