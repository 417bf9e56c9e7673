//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: Health ledger, Player marker
//! - movement: контракт с navigation service (MovementCommand, NavAgent)
//! - animation: контракт с animation presenter (Animator, AnimationStatus, PoseWait)

pub mod actor;
pub mod animation;
pub mod movement;

// Re-exports для удобного импорта
pub use actor::*;
pub use animation::*;
pub use movement::*;
