//! Базовые компоненты акторов: Health (ledger), Player marker

use bevy::prelude::*;

/// Health ledger актора (игрок, враг, любой damageable entity)
///
/// Инвариант: 0 ≤ current ≤ max, max > 0
///
/// Ledger — только данные. Нотификации (Damaged/Recovered) пишет вызывающий
/// через `combat::apply_damage` / `combat::apply_recovery`, смерть обрабатывают listeners.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Результат мутации ledger (для event payload)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthChange {
    pub before: u32,
    pub after: u32,
}

impl HealthChange {
    pub fn delta(&self) -> u32 {
        self.before.abs_diff(self.after)
    }
}

impl Health {
    /// `max` = 0 поднимается до 1 (ledger с max 0 не имеет смысла)
    pub fn new(max: u32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    pub fn with_current(max: u32, current: u32) -> Self {
        let max = max.max(1);
        Self {
            current: current.min(max),
            max,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// current = max(0, current - amount)
    pub fn apply_damage(&mut self, amount: u32) -> HealthChange {
        let before = self.current;
        self.current = self.current.saturating_sub(amount);
        HealthChange {
            before,
            after: self.current,
        }
    }

    /// current = min(max, current + amount)
    pub fn apply_recovery(&mut self, amount: u32) -> HealthChange {
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.max);
        HealthChange {
            before,
            after: self.current,
        }
    }
}

/// Marker для player-controlled entity
///
/// Hit Resolver классифицирует попадание по этому маркеру (Player struck).
/// В single-player режиме компонент один.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;
