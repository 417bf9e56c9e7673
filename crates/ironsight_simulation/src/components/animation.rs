//! Animation контракт с presentation layer
//!
//! ECS никогда не смотрит в клипы. Только:
//! - запросы (trigger / reset / flag / float) → очередь `Animator::pending`,
//!   presentation забирает через `drain_requests()` каждый frame
//! - статус от presentation: текущая поза + normalized progress
//!
//! Все имена параметров — enum'ы, никаких строк.

use bevy::prelude::*;

/// Поза (state) animation graph, которую отчитывает presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimPose {
    #[default]
    Idle,
    Walk,
    Run,
    Attack,
    Reload,
    Change,
    Dead,
}

/// One-shot triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimTrigger {
    Run,
    Reload,
    Change,
    Dead,
}

/// Bool параметры
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimFlag {
    Attack,
    Run,
    Aiming,
}

/// Float параметры
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimFloat {
    Walk,
}

/// Запрос к presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimRequest {
    Trigger(AnimTrigger),
    ResetTrigger(AnimTrigger),
    SetFlag(AnimFlag, bool),
    SetFloat(AnimFloat, f32),
}

/// Статус от presentation: что играет сейчас и насколько доиграло
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationStatus {
    pub pose: AnimPose,
    /// Normalized progress текущей позы (≥ 1.0 = доиграла)
    pub progress: f32,
}

impl Default for AnimationStatus {
    fn default() -> Self {
        Self {
            pose: AnimPose::Idle,
            progress: 0.0,
        }
    }
}

impl AnimationStatus {
    pub fn is_current(&self, pose: AnimPose) -> bool {
        self.pose == pose
    }

    /// Поза закончилась: уже не текущая ИЛИ доиграла до конца
    pub fn has_finished(&self, pose: AnimPose) -> bool {
        !self.is_current(pose) || self.progress >= 1.0
    }
}

/// Animator entity (враг или оружие)
///
/// Хранит последнее запрошенное значение flags/floats, чтобы ECS мог проверить
/// "уже включено?" без round-trip в presentation.
#[derive(Component, Debug, Clone, Default)]
pub struct Animator {
    pending: Vec<AnimRequest>,
    attack: bool,
    run: bool,
    aiming: bool,
    walk: f32,
    status: AnimationStatus,
}

impl Animator {
    pub fn trigger(&mut self, trigger: AnimTrigger) {
        self.pending.push(AnimRequest::Trigger(trigger));
    }

    pub fn reset_trigger(&mut self, trigger: AnimTrigger) {
        self.pending.push(AnimRequest::ResetTrigger(trigger));
    }

    /// Возвращает true если значение изменилось (запрос ушёл в очередь)
    pub fn set_flag(&mut self, flag: AnimFlag, value: bool) -> bool {
        let slot = match flag {
            AnimFlag::Attack => &mut self.attack,
            AnimFlag::Run => &mut self.run,
            AnimFlag::Aiming => &mut self.aiming,
        };

        if *slot == value {
            return false;
        }

        *slot = value;
        self.pending.push(AnimRequest::SetFlag(flag, value));
        true
    }

    pub fn flag(&self, flag: AnimFlag) -> bool {
        match flag {
            AnimFlag::Attack => self.attack,
            AnimFlag::Run => self.run,
            AnimFlag::Aiming => self.aiming,
        }
    }

    pub fn set_float(&mut self, param: AnimFloat, value: f32) {
        match param {
            AnimFloat::Walk => self.walk = value,
        }
        self.pending.push(AnimRequest::SetFloat(param, value));
    }

    pub fn float(&self, param: AnimFloat) -> f32 {
        match param {
            AnimFloat::Walk => self.walk,
        }
    }

    pub fn pending(&self) -> &[AnimRequest] {
        &self.pending
    }

    /// Presentation забирает накопленные запросы
    pub fn drain_requests(&mut self) -> Vec<AnimRequest> {
        std::mem::take(&mut self.pending)
    }

    pub fn status(&self) -> AnimationStatus {
        self.status
    }

    /// Presentation отчитывается о текущей позе
    pub fn report(&mut self, pose: AnimPose, progress: f32) {
        self.status = AnimationStatus { pose, progress };
    }
}

/// Ожидание окончания позы: settle delay, потом poll раз в tick
///
/// Settle нужен потому что presentation переходит в запрошенную позу не мгновенно —
/// без него "поза не текущая" сработало бы в первый же tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseWait {
    pub pose: AnimPose,
    pub settle: f32,
    pub elapsed: f32,
}

impl PoseWait {
    pub fn new(pose: AnimPose, settle: f32) -> Self {
        Self {
            pose,
            settle: settle.max(0.0),
            elapsed: 0.0,
        }
    }

    /// true = поза закончилась, ожидание завершено
    pub fn poll(&mut self, delta: f32, status: &AnimationStatus) -> bool {
        self.elapsed += delta;

        if self.elapsed < self.settle {
            return false;
        }

        status.has_finished(self.pose)
    }
}
