//! SimulationConfig — тюнинг симуляции (tick rate, враги, тайминги анимаций)
//!
//! Default = боевой баланс уровня. Override через RON:
//!
//! ```ron
//! (
//!     tick_hz: 60.0,
//!     enemy: (speed: 4.0, engagement_range: 6.0),
//!     death_topple_duration: 1.5,
//! )
//! ```
//!
//! Отсутствующие поля берутся из Default (`#[serde(default)]`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ошибки загрузки конфига (единственный Result-путь в крейте)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Параметры врага по умолчанию (шаблон спавна)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyDefaults {
    /// Скорость навигации (m/s)
    pub speed: f32,
    /// Дистанция переключения chase ↔ attack (метры)
    pub engagement_range: f32,
    pub max_health: u32,
    /// Интервал между выстрелами в Engaging (секунды)
    pub fire_interval: f32,
    /// Высота точки прицеливания над Transform (метры)
    pub eye_height: f32,
    /// Спавнить сразу в Alert (погоня без perception)
    pub start_alert: bool,
}

impl Default for EnemyDefaults {
    fn default() -> Self {
        Self {
            speed: 3.0,
            engagement_range: 5.0,
            max_health: 100,
            fire_interval: 1.0,
            eye_height: 1.5,
            start_alert: false,
        }
    }
}

/// Время проигрывания cosmetic эффектов (после — instance снова свободен в пуле)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectLifetimes {
    pub muzzle_flash: f32,
    pub hit_impact: f32,
    pub surface_impact: f32,
}

impl Default for EffectLifetimes {
    fn default() -> Self {
        Self {
            muzzle_flash: 0.1,
            hit_impact: 0.5,
            surface_impact: 1.0,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Частота FixedUpdate (Hz)
    pub tick_hz: f64,
    pub enemy: EnemyDefaults,
    /// Период проверки arrival во время погони (~10 раз в секунду)
    pub chase_poll_interval: f32,
    /// Длительность падения трупа (0° → -90° pitch)
    pub death_topple_duration: f32,
    /// Задержка перед проверкой окончания reload позы
    pub reload_settle: f32,
    /// Задержка перед проверкой окончания change позы
    pub swap_settle: f32,
    pub effects: EffectLifetimes,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            enemy: EnemyDefaults::default(),
            chase_poll_interval: 0.1,
            death_topple_duration: 1.0,
            reload_settle: 0.1,
            swap_settle: 0.25,
            effects: EffectLifetimes::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }
}
