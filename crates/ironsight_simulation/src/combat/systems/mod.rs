//! Combat systems (weapon fire-control + shot resolution)

pub mod shots;
pub mod weapon;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod weapon_tests;

pub use shots::*;
pub use weapon::*;
