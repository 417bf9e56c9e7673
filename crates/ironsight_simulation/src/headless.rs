//! Headless stand-ins для внешних collaborators
//!
//! В игре навигацию и анимации делает движок. Для headless прогонов (тесты,
//! `main.rs`) здесь минимальные замены с тем же контрактом:
//! - HeadlessNavigationPlugin: агент идёт по прямой к destination, заполняет readouts
//! - HeadlessAnimationPlugin: забирает Animator requests, отчитывает позу + progress
//! - EventLog: накопитель событий для проверок после прогона

use bevy::prelude::*;
use std::collections::HashMap;

use crate::ai::facing_towards;
use crate::components::{AnimFlag, AnimPose, AnimRequest, AnimTrigger, Animator, MovementCommand, NavAgent};
use crate::SimulationSet;

// ============================================================================
// Navigation
// ============================================================================

/// Агент останавливается чуть внутри stopping_distance (как navmesh агент по инерции),
/// иначе дистанция на границе range прыгала бы туда-обратно из-за float
pub const NAV_STOP_MARGIN: f32 = 0.05;

/// System: прямолинейная навигация (без navmesh)
///
/// Remaining distance считается в плоскости XZ. Внутри stopping_distance агент
/// стоит (velocity = 0), путь при этом сохраняется — как у navmesh агента.
pub fn drive_nav_agents(
    mut agents: Query<(&MovementCommand, &mut NavAgent, &mut Transform)>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for (command, mut agent, mut transform) in agents.iter_mut() {
        match command {
            MovementCommand::MoveToPosition { target } => {
                let offset = Vec3::new(target.x - transform.translation.x, 0.0, target.z - transform.translation.z);
                let distance = offset.length();
                agent.has_path = true;

                let travel = distance - (agent.stopping_distance - NAV_STOP_MARGIN).max(0.0);
                if travel <= 0.0 || delta <= 0.0 {
                    agent.velocity = Vec3::ZERO;
                    agent.remaining_distance = distance;
                    continue;
                }

                let direction = offset / distance;
                let step = (agent.speed * delta).min(travel);
                transform.translation += direction * step;
                agent.velocity = direction * (step / delta);
                agent.remaining_distance = distance - step;

                if let Some(facing) = facing_towards(transform.translation, *target) {
                    transform.rotation = facing;
                }
            }
            MovementCommand::Stop => {
                agent.velocity = Vec3::ZERO;
                agent.has_path = false;
                agent.remaining_distance = 0.0;
            }
            MovementCommand::Idle => {
                agent.velocity = Vec3::ZERO;
            }
        }
    }
}

pub struct HeadlessNavigationPlugin;

impl Plugin for HeadlessNavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, drive_nav_agents.in_set(SimulationSet::Navigation));
    }
}

// ============================================================================
// Animation
// ============================================================================

/// Длительность one-shot клипов (секунды). Loop позы не заканчиваются.
#[derive(Resource, Debug, Clone)]
pub struct HeadlessClips {
    pub lengths: HashMap<AnimPose, f32>,
}

impl Default for HeadlessClips {
    fn default() -> Self {
        Self {
            lengths: HashMap::from([
                (AnimPose::Reload, 1.0),
                (AnimPose::Change, 0.5),
                (AnimPose::Dead, 1.0),
            ]),
        }
    }
}

impl HeadlessClips {
    pub fn one_shot(&self, pose: AnimPose) -> Option<f32> {
        self.lengths.get(&pose).copied()
    }
}

fn trigger_pose(trigger: AnimTrigger) -> AnimPose {
    match trigger {
        AnimTrigger::Run => AnimPose::Run,
        AnimTrigger::Reload => AnimPose::Reload,
        AnimTrigger::Change => AnimPose::Change,
        AnimTrigger::Dead => AnimPose::Dead,
    }
}

/// System: presenter — requests → поза, progress += dt / длина клипа
///
/// One-shot доиграл → Idle (Dead остаётся на последнем кадре).
pub fn present_animations(mut animators: Query<&mut Animator>, clips: Res<HeadlessClips>, time: Res<Time>) {
    let delta = time.delta_secs();

    for mut animator in animators.iter_mut() {
        let mut status = animator.status();

        for request in animator.drain_requests() {
            // Dead — конечная поза, ничего её не перебивает
            if status.pose == AnimPose::Dead {
                break;
            }

            match request {
                AnimRequest::Trigger(trigger) => {
                    status.pose = trigger_pose(trigger);
                    status.progress = 0.0;
                }
                AnimRequest::SetFlag(AnimFlag::Attack, on) if clips.one_shot(status.pose).is_none() => {
                    status.pose = if on { AnimPose::Attack } else { AnimPose::Idle };
                    status.progress = 0.0;
                }
                AnimRequest::ResetTrigger(_) | AnimRequest::SetFlag(..) | AnimRequest::SetFloat(..) => {}
            }
        }

        match clips.one_shot(status.pose) {
            // Конец клипа отчитан в прошлом tick → обратно в Idle
            Some(_) if status.progress >= 1.0 && status.pose != AnimPose::Dead => {
                status.pose = AnimPose::Idle;
                status.progress = 0.0;
            }
            Some(length) if length > 0.0 => {
                status.progress = (status.progress + delta / length).min(1.0);
            }
            Some(_) => status.progress = 1.0,
            None => status.progress = (status.progress + delta).fract(),
        }

        animator.report(status.pose, status.progress);
    }
}

pub struct HeadlessAnimationPlugin;

impl Plugin for HeadlessAnimationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HeadlessClips>()
            .add_systems(FixedUpdate, present_animations.in_set(SimulationSet::Presentation));
    }
}

// ============================================================================
// Event log
// ============================================================================

/// Все события типа E за прогон (в порядке публикации)
#[derive(Resource, Debug, Clone)]
pub struct EventLog<E: Event + Clone> {
    pub events: Vec<E>,
}

impl<E: Event + Clone> Default for EventLog<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E: Event + Clone> EventLog<E> {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

pub fn record_events<E: Event + Clone>(mut reader: EventReader<E>, mut log: ResMut<EventLog<E>>) {
    log.events.extend(reader.read().cloned());
}

/// `app.record_events::<E>()` — копить события E в `EventLog<E>`
pub trait RecordEvents {
    fn record_events<E: Event + Clone>(&mut self) -> &mut Self;
}

impl RecordEvents for App {
    fn record_events<E: Event + Clone>(&mut self) -> &mut Self {
        self.init_resource::<EventLog<E>>()
            .add_systems(Last, record_events::<E>)
    }
}
