//! AI components (enemy brain, tuning, target, fire cadence)

pub mod fsm;


pub use fsm::*;
