//! Shot resolution: ShotFired → HitResolver.

use bevy::prelude::*;

use crate::combat::hit_resolver::{HitOutcome, HitResolver};
use crate::combat::weapon::ShotFired;

/// System: каждый ShotFired → ray через resolver (урон / impact эффекты)
pub fn resolve_shots(mut shots: EventReader<ShotFired>, mut resolver: HitResolver) {
    for shot in shots.read() {
        let outcome = resolver.resolve(shot.origin, shot.direction, shot.range, shot.damage, shot.shooter);

        match outcome {
            HitOutcome::Miss => {
                crate::log(&format!("🎯 Shot from {:?}: miss", shot.weapon));
            }
            HitOutcome::Player(contact) | HitOutcome::Enemy(contact) | HitOutcome::World(contact) => {
                crate::log(&format!(
                    "🎯 Shot from {:?}: {:?} {:?} at {:.2}m",
                    shot.weapon,
                    outcome.kind(),
                    contact.entity,
                    contact.distance
                ));
            }
        }
    }
}
