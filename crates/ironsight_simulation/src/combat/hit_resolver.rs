//! Hit Resolver — общий ray-based dispatcher для всех оружий (игрок + враги)
//!
//! Один resolver = одна таксономия попаданий:
//! 1. Miss — ничего в пределах range
//! 2. Player — урон в ledger игрока
//! 3. Enemy — урон через roster damage path (+ hit impact эффект)
//! 4. World — без урона, surface impact эффект по нормали
//!
//! Ray query делается по форме `Collider` каждого кандидата (parry shape cast),
//! без физического pipeline. `ColliderDisabled` = hit detection выключен (трупы).

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, ColliderDisabled};

use crate::ai::Enemy;
use crate::combat::damage::{apply_damage, Damaged};
use crate::combat::effects::{CombatFeedback, EffectKind};
use crate::components::{Health, Player};
use crate::roster::{EnemyHit, EnemyRoster};

/// Что за entity попалась лучу
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Player,
    Enemy,
    World,
}

/// Точка попадания
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayContact {
    pub entity: Entity,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    Miss,
    Player(RayContact),
    Enemy(RayContact),
    World(RayContact),
}

impl HitOutcome {
    pub fn contact(&self) -> Option<&RayContact> {
        match self {
            HitOutcome::Miss => None,
            HitOutcome::Player(c) | HitOutcome::Enemy(c) | HitOutcome::World(c) => Some(c),
        }
    }

    pub fn kind(&self) -> Option<HitKind> {
        match self {
            HitOutcome::Miss => None,
            HitOutcome::Player(_) => Some(HitKind::Player),
            HitOutcome::Enemy(_) => Some(HitKind::Enemy),
            HitOutcome::World(_) => Some(HitKind::World),
        }
    }
}

/// Кандидат для ray query
pub struct HitCandidate<'a> {
    pub entity: Entity,
    pub collider: &'a Collider,
    pub transform: &'a Transform,
    pub kind: HitKind,
}

/// Ближайшее попадание среди кандидатов
///
/// `ignore` — сам стрелок (луч стартует внутри его collider).
pub fn cast_nearest<'a>(
    candidates: impl IntoIterator<Item = HitCandidate<'a>>,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    ignore: Option<Entity>,
) -> HitOutcome {
    let direction = direction.normalize_or_zero();
    if direction == Vec3::ZERO || max_distance <= 0.0 {
        return HitOutcome::Miss;
    }

    let mut nearest: Option<(HitKind, RayContact)> = None;

    for candidate in candidates {
        if Some(candidate.entity) == ignore {
            continue;
        }

        let Some(hit) = candidate.collider.cast_ray_and_get_normal(
            candidate.transform.translation,
            candidate.transform.rotation,
            origin,
            direction,
            max_distance,
            true,
        ) else {
            continue;
        };

        let distance = hit.time_of_impact;
        if distance > max_distance {
            continue;
        }

        let closer = nearest
            .as_ref()
            .map_or(true, |(_, current)| distance < current.distance);

        if closer {
            nearest = Some((
                candidate.kind,
                RayContact {
                    entity: candidate.entity,
                    point: hit.point,
                    normal: hit.normal,
                    distance,
                },
            ));
        }
    }

    match nearest {
        None => HitOutcome::Miss,
        Some((HitKind::Player, contact)) => HitOutcome::Player(contact),
        Some((HitKind::Enemy, contact)) => HitOutcome::Enemy(contact),
        Some((HitKind::World, contact)) => HitOutcome::World(contact),
    }
}

/// SystemParam: ray query по всем активным colliders мира + dispatch урона
#[derive(SystemParam)]
pub struct HitResolver<'w, 's> {
    colliders: Query<
        'w,
        's,
        (
            Entity,
            &'static Collider,
            &'static Transform,
            Has<Player>,
            Has<Enemy>,
        ),
        Without<ColliderDisabled>,
    >,
    healths: Query<'w, 's, &'static mut Health>,
    roster: Res<'w, EnemyRoster>,
    feedback: CombatFeedback<'w>,
    damaged: EventWriter<'w, Damaged>,
}

impl HitResolver<'_, '_> {
    /// Только ray query, без side effects
    pub fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        ignore: Option<Entity>,
    ) -> HitOutcome {
        let candidates = self
            .colliders
            .iter()
            .map(|(entity, collider, transform, is_player, is_enemy)| HitCandidate {
                entity,
                collider,
                transform,
                kind: if is_player {
                    HitKind::Player
                } else if is_enemy {
                    HitKind::Enemy
                } else {
                    HitKind::World
                },
            });

        cast_nearest(candidates, origin, direction, max_distance, ignore)
    }

    /// Ray query + routing: урон игроку, урон врагу через roster, impact эффект в мир
    pub fn resolve(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        damage: u32,
        shooter: Option<Entity>,
    ) -> HitOutcome {
        let outcome = self.cast(origin, direction, max_distance, shooter);

        match outcome {
            HitOutcome::Miss => {}
            HitOutcome::Player(contact) => {
                if let Ok(mut health) = self.healths.get_mut(contact.entity) {
                    apply_damage(contact.entity, &mut health, damage, shooter, &mut self.damaged);
                }
            }
            HitOutcome::Enemy(contact) => {
                if let Ok(mut health) = self.healths.get_mut(contact.entity) {
                    self.roster.damage(
                        EnemyHit {
                            enemy: contact.entity,
                            amount: damage,
                            source: shooter,
                            point: contact.point,
                            normal: contact.normal,
                        },
                        &mut health,
                        &mut self.feedback,
                        &mut self.damaged,
                    );
                }
            }
            HitOutcome::World(contact) => {
                self.feedback.effect(
                    EffectKind::SurfaceImpact,
                    contact.point,
                    surface_orientation(contact.normal),
                );
            }
        }

        outcome
    }
}

/// Ориентация эффекта "лицом" по нормали поверхности
pub fn surface_orientation(normal: Vec3) -> Quat {
    let normal = normal.normalize_or_zero();
    if normal == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(Vec3::Z, normal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(index: u32) -> Entity {
        Entity::from_raw(index)
    }

    #[test]
    fn test_nearest_candidate_wins() {
        let ball = Collider::ball(0.5);
        let near = Transform::from_xyz(0.0, 0.0, -5.0);
        let far = Transform::from_xyz(0.0, 0.0, -10.0);

        let outcome = cast_nearest(
            [
                HitCandidate { entity: entity(2), collider: &ball, transform: &far, kind: HitKind::Player },
                HitCandidate { entity: entity(1), collider: &ball, transform: &near, kind: HitKind::Enemy },
            ],
            Vec3::ZERO,
            Vec3::NEG_Z,
            50.0,
            None,
        );

        let HitOutcome::Enemy(contact) = outcome else {
            panic!("expected enemy hit, got {:?}", outcome);
        };
        assert_eq!(contact.entity, entity(1));
        assert!((contact.distance - 4.5).abs() < 1e-3);
    }

    #[test]
    fn test_out_of_range_is_miss() {
        let ball = Collider::ball(0.5);
        let target = Transform::from_xyz(0.0, 0.0, -10.0);

        let outcome = cast_nearest(
            [HitCandidate { entity: entity(1), collider: &ball, transform: &target, kind: HitKind::Enemy }],
            Vec3::ZERO,
            Vec3::NEG_Z,
            5.0,
            None,
        );

        assert_eq!(outcome, HitOutcome::Miss);
    }

    #[test]
    fn test_shooter_is_ignored() {
        let body = Collider::capsule_y(0.9, 0.4);
        let shooter = Transform::from_xyz(0.0, 0.0, 0.0);
        let wall = Collider::cuboid(5.0, 5.0, 0.1);
        let wall_transform = Transform::from_xyz(0.0, 0.0, -3.0);

        let outcome = cast_nearest(
            [
                HitCandidate { entity: entity(1), collider: &body, transform: &shooter, kind: HitKind::Enemy },
                HitCandidate { entity: entity(9), collider: &wall, transform: &wall_transform, kind: HitKind::World },
            ],
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::NEG_Z,
            20.0,
            Some(entity(1)),
        );

        let HitOutcome::World(contact) = outcome else {
            panic!("expected world hit, got {:?}", outcome);
        };
        assert_eq!(contact.entity, entity(9));
        assert!(contact.normal.z > 0.9, "wall normal faces the shooter: {:?}", contact.normal);
    }

    #[test]
    fn test_zero_direction_is_miss() {
        let ball = Collider::ball(0.5);
        let target = Transform::from_xyz(0.0, 0.0, 0.0);

        let outcome = cast_nearest(
            [HitCandidate { entity: entity(1), collider: &ball, transform: &target, kind: HitKind::Player }],
            Vec3::ZERO,
            Vec3::ZERO,
            10.0,
            None,
        );
        assert_eq!(outcome, HitOutcome::Miss);
    }

    #[test]
    fn test_surface_orientation_faces_normal() {
        let rotation = surface_orientation(Vec3::Y);
        assert!((rotation * Vec3::Z - Vec3::Y).length() < 1e-4);
        assert_eq!(surface_orientation(Vec3::ZERO), Quat::IDENTITY);
    }
}
