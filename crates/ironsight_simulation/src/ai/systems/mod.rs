//! AI systems (brain tick, death, fire cadence)

pub mod death;
pub mod fire;
pub mod fsm;

pub use death::*;
pub use fire::*;
pub use fsm::*;
