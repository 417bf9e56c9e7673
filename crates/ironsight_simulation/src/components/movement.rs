//! Movement компоненты: контракт с внешним navigation service
//!
//! Архитектура:
//! - ECS пишет MovementCommand (high-level intent) + speed/stopping_distance
//! - Navigation layer (navmesh agent) читает команду, двигает Transform
//!   и отдаёт обратно readouts: remaining_distance, has_path, velocity
//! - ECS использует readouts только для arrival detection (black box)

use bevy::prelude::*;

/// Команда движения (выполняется navigation agent)
#[derive(Component, Debug, Clone, PartialEq, Default)]
pub enum MovementCommand {
    /// Стоять на месте (не трогать agent destination)
    #[default]
    Idle,
    /// Двигаться к позиции (world coordinates), re-issue каждый tick для moving target
    MoveToPosition { target: Vec3 },
    /// Остановиться немедленно (сбросить path)
    Stop,
}

impl MovementCommand {
    pub fn destination(&self) -> Option<Vec3> {
        match self {
            MovementCommand::MoveToPosition { target } => Some(*target),
            _ => None,
        }
    }
}

/// Navigation agent state
///
/// `speed` / `stopping_distance` — конфиг от ECS (при спавне).
/// `remaining_distance` / `has_path` / `velocity` — readouts от navigation layer.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct NavAgent {
    pub speed: f32,
    pub stopping_distance: f32,
    pub remaining_distance: f32,
    pub has_path: bool,
    pub velocity: Vec3,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            speed: 3.0,
            stopping_distance: 0.0,
            remaining_distance: 0.0,
            has_path: false,
            velocity: Vec3::ZERO,
        }
    }
}

/// Порог "агент стоит" для velocity²
pub const NAV_STILL_EPSILON_SQ: f32 = 1e-4;

impl NavAgent {
    pub fn new(speed: f32, stopping_distance: f32) -> Self {
        Self {
            speed,
            stopping_distance,
            ..Default::default()
        }
    }

    /// Arrival: дошли до stopping range И (пути нет ИЛИ агент стоит)
    pub fn has_arrived(&self, engagement_range: f32) -> bool {
        self.remaining_distance <= engagement_range
            && (!self.has_path || self.velocity.length_squared() <= NAV_STILL_EPSILON_SQ)
    }
}
