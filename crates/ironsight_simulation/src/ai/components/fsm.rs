//! Enemy FSM components (brain state machine, tuning, chase target).
//!
//! Вместо coroutine'ов — явный state object: `EnemyBrain::tick(dt)` раз в FixedUpdate.
//! Suspension points хранятся в состоянии (poll таймер погони, прогресс падения).

use bevy::prelude::*;

use crate::components::{AnimFlag, AnimTrigger, Animator, MovementCommand, NavAgent};

/// Enemy stats (шаблон спавна)
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    pub speed: f32,
    /// Граница между погоней и атакой
    pub engagement_range: f32,
    /// Высота глаз (точка прицеливания)
    pub eye_height: f32,
    /// Интервал между выстрелами в Engaging
    pub fire_interval: f32,
}

impl Default for Enemy {
    fn default() -> Self {
        Self {
            speed: 3.0,
            engagement_range: 5.0,
            eye_height: 1.5,
            fire_interval: 1.0,
        }
    }
}

/// Target provider: за кем следит враг (обычно игрок). Transform цели — read-only.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChaseTarget(pub Entity);

/// Прогресс погони
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChaseProgress {
    /// Время с последней проверки arrival
    pub since_poll: f32,
}

/// Прогресс death sequence (падение 0° → -90° pitch)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathProgress {
    pub elapsed: f32,
    /// Yaw на момент смерти (сохраняется при падении)
    pub yaw: f32,
    pub finished: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyState {
    /// Не заметил цель (alertness = false)
    Dormant,
    /// Голова alert loop: на следующем tick выбирает Pursuing или Engaging
    Alert,
    Pursuing(ChaseProgress),
    Engaging,
    /// Terminal
    Dead(DeathProgress),
}

/// Что произошло за tick (для логов и событий)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrainSignal {
    Alerted,
    ChaseStarted,
    Arrived,
    Engaged,
    DeathFinished,
}

/// Счётчики шагов (диагностика + проверка cancel'а)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BrainStats {
    pub chase_ticks: u32,
    pub engage_ticks: u32,
    pub cancellations: u32,
    pub death_sequences: u32,
}

/// Тайминги brain'а (из Enemy + SimulationConfig)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrainTuning {
    pub engagement_range: f32,
    pub chase_poll_interval: f32,
    pub topple_duration: f32,
}

/// Что brain видит в этот tick
#[derive(Debug, Clone, Copy)]
pub struct BrainSenses<'a> {
    pub position: Vec3,
    pub rotation: Quat,
    /// None — цели нет (despawn или мертва)
    pub target: Option<Vec3>,
    pub nav: &'a NavAgent,
}

/// Чем brain управляет
pub struct BrainActuators<'a> {
    pub movement: &'a mut MovementCommand,
    pub animator: &'a mut Animator,
    pub rotation: &'a mut Quat,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct EnemyBrain {
    pub state: EnemyState,
    pub stats: BrainStats,
}

impl Default for EnemyBrain {
    fn default() -> Self {
        Self::new(false)
    }
}

impl EnemyBrain {
    pub fn new(start_alert: bool) -> Self {
        Self {
            state: if start_alert { EnemyState::Alert } else { EnemyState::Dormant },
            stats: BrainStats::default(),
        }
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.state, EnemyState::Dead(_))
    }

    pub fn is_alert(&self) -> bool {
        !matches!(self.state, EnemyState::Dormant | EnemyState::Dead(_))
    }

    /// Внешний alert (спавн alert'ным, шум и т.п.). Только из Dormant.
    pub fn alert(&mut self) -> bool {
        if !matches!(self.state, EnemyState::Dormant) {
            return false;
        }
        self.state = EnemyState::Alert;
        true
    }

    /// Perception: цель в радиусе И внутри forward cone
    ///
    /// `dot(forward, enemy − target) < 0` ⇔ цель перед врагом.
    pub fn perceives(position: Vec3, rotation: Quat, target: Vec3, engagement_range: f32) -> bool {
        let offset = position - target;
        if offset.length_squared() > engagement_range * engagement_range {
            return false;
        }

        let forward = rotation * Vec3::NEG_Z;
        forward.dot(offset) < 0.0
    }

    /// Один tick. Dead state — только падение, остальное игнорируется.
    pub fn tick(
        &mut self,
        delta: f32,
        tuning: &BrainTuning,
        senses: &BrainSenses,
        body: &mut BrainActuators,
    ) -> Option<BrainSignal> {
        match self.state {
            EnemyState::Dead(ref mut progress) => {
                Self::topple(progress, delta, tuning.topple_duration, body.rotation)
            }

            EnemyState::Dormant => {
                let target = senses.target?;
                if !Self::perceives(senses.position, senses.rotation, target, tuning.engagement_range) {
                    return None;
                }
                self.state = EnemyState::Alert;
                Some(BrainSignal::Alerted)
            }

            EnemyState::Alert | EnemyState::Engaging => self.alert_step(senses, tuning, body),

            EnemyState::Pursuing(ref mut chase) => {
                let Some(target) = senses.target else {
                    *body.movement = MovementCommand::Stop;
                    self.state = EnemyState::Alert;
                    return None;
                };

                self.stats.chase_ticks = self.stats.chase_ticks.saturating_add(1);

                // Цель двигается — destination обновляется каждый tick
                *body.movement = MovementCommand::MoveToPosition { target };

                chase.since_poll += delta;
                if chase.since_poll + f32::EPSILON < tuning.chase_poll_interval {
                    return None;
                }
                chase.since_poll = 0.0;

                if !senses.nav.has_arrived(tuning.engagement_range) {
                    return None;
                }

                // Контроль обратно alert loop'у
                self.state = EnemyState::Alert;
                Some(BrainSignal::Arrived)
            }
        }
    }

    /// Alert loop: далеко → погоня, близко → атака + поворот к цели
    fn alert_step(
        &mut self,
        senses: &BrainSenses,
        tuning: &BrainTuning,
        body: &mut BrainActuators,
    ) -> Option<BrainSignal> {
        let Some(target) = senses.target else {
            *body.movement = MovementCommand::Stop;
            body.animator.set_flag(AnimFlag::Attack, false);
            self.state = EnemyState::Alert;
            return None;
        };

        let range_sq = tuning.engagement_range * tuning.engagement_range;

        if senses.position.distance_squared(target) > range_sq {
            *body.movement = MovementCommand::MoveToPosition { target };
            body.animator.set_flag(AnimFlag::Attack, false);
            body.animator.trigger(AnimTrigger::Run);
            self.state = EnemyState::Pursuing(ChaseProgress::default());
            return Some(BrainSignal::ChaseStarted);
        }

        self.stats.engage_ticks = self.stats.engage_ticks.saturating_add(1);

        *body.movement = MovementCommand::Stop;
        body.animator.set_flag(AnimFlag::Attack, true);
        if let Some(facing) = facing_towards(senses.position, target) {
            *body.rotation = facing;
        }

        let entered = !matches!(self.state, EnemyState::Engaging);
        self.state = EnemyState::Engaging;
        entered.then_some(BrainSignal::Engaged)
    }

    /// Смерть: cancel всех процессов ровно один раз, потом death sequence
    ///
    /// false — уже мёртв (повторный lethal Damaged игнорируется).
    pub fn begin_death(&mut self, current_rotation: Quat, body: &mut BrainActuators) -> bool {
        if self.is_dead() {
            return false;
        }

        self.cancel_processes(body);

        body.animator.reset_trigger(AnimTrigger::Run);
        body.animator.set_flag(AnimFlag::Attack, false);
        body.animator.set_flag(AnimFlag::Run, false);
        body.animator.trigger(AnimTrigger::Dead);

        let (yaw, _, _) = current_rotation.to_euler(EulerRot::YXZ);
        self.state = EnemyState::Dead(DeathProgress {
            elapsed: 0.0,
            yaw,
            finished: false,
        });
        self.stats.death_sequences = self.stats.death_sequences.saturating_add(1);
        true
    }

    fn cancel_processes(&mut self, body: &mut BrainActuators) {
        *body.movement = MovementCommand::Stop;
        self.stats.cancellations = self.stats.cancellations.saturating_add(1);
    }

    fn topple(
        progress: &mut DeathProgress,
        delta: f32,
        duration: f32,
        rotation: &mut Quat,
    ) -> Option<BrainSignal> {
        if progress.finished {
            return None;
        }

        progress.elapsed += delta;
        let t = if duration > 0.0 {
            (progress.elapsed / duration).min(1.0)
        } else {
            1.0
        };

        let pitch = (-90.0_f32).to_radians() * t;
        *rotation = Quat::from_euler(EulerRot::YXZ, progress.yaw, pitch, 0.0);

        if t < 1.0 {
            return None;
        }

        progress.finished = true;
        Some(BrainSignal::DeathFinished)
    }
}

/// Yaw-only поворот лицом к цели (None если цель ровно над/под нами)
pub fn facing_towards(position: Vec3, target: Vec3) -> Option<Quat> {
    let offset = target - position;
    let flat = Vec2::new(offset.x, offset.z);
    if flat.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(Quat::from_rotation_y(f32::atan2(-flat.x, -flat.y)))
}

/// Таймер стрельбы врага (пока Engaging)
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct FireCadence {
    pub cooldown: f32,
}

impl FireCadence {
    /// Таймер идёт каждый tick в Engaging, даже пока оружие занято
    pub fn tick(&mut self, delta: f32) {
        self.cooldown = (self.cooldown - delta).max(0.0);
    }

    /// true = пора стрелять (и таймер перезапущен на `interval`)
    ///
    /// Вызывать только когда intent действительно будет отправлен.
    pub fn ready(&mut self, interval: f32) -> bool {
        if self.cooldown > 0.0 {
            return false;
        }
        self.cooldown = interval.max(0.0);
        true
    }
}
