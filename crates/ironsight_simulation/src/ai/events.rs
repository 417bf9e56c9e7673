//! AI Events
//!
//! Death sequence враг заканчивает сам (падение), roster слушает и удаляет entity.

use bevy::prelude::*;

/// Событие: падение трупа закончено, entity можно удалять
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyDeathFinished {
    pub entity: Entity,
}

/// Событие: враг заметил цель (Dormant → Alert)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyAlerted {
    pub entity: Entity,
    pub target: Option<Entity>,
}
