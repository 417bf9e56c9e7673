//! Time Recorder — таймер забега
//!
//! start() сбрасывает elapsed, stop() замораживает. Пока идёт запись,
//! каждый tick добавляет dt и публикует RecordingTick (UI таймер снаружи).

use bevy::prelude::*;

use crate::SimulationSet;

#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeRecorder {
    elapsed: f32,
    recording: bool,
}

impl TimeRecorder {
    /// false + warning если запись уже идёт (elapsed не сбрасывается)
    pub fn start(&mut self) -> bool {
        if self.recording {
            crate::log_warning("⏱️ TimeRecorder: already recording");
            return false;
        }

        self.elapsed = 0.0;
        self.recording = true;
        true
    }

    /// false + warning если запись не идёт
    pub fn stop(&mut self) -> bool {
        if !self.recording {
            crate::log_warning("⏱️ TimeRecorder: not recording");
            return false;
        }

        self.recording = false;
        true
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Some(elapsed) если запись идёт
    pub fn tick(&mut self, delta: f32) -> Option<f32> {
        if !self.recording {
            return None;
        }
        self.elapsed += delta;
        Some(self.elapsed)
    }
}

/// Управление записью извне (game flow)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderControl {
    Start,
    Stop,
}

/// Событие: прошёл tick записи
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct RecordingTick {
    pub elapsed: f32,
}

/// System: RecorderControl → start/stop
pub fn apply_recorder_controls(mut controls: EventReader<RecorderControl>, mut recorder: ResMut<TimeRecorder>) {
    for control in controls.read() {
        match control {
            RecorderControl::Start => {
                if recorder.start() {
                    crate::log_info("⏱️ TimeRecorder: started");
                }
            }
            RecorderControl::Stop => {
                if recorder.stop() {
                    crate::log_info(&format!("⏱️ TimeRecorder: stopped at {:.2}s", recorder.elapsed()));
                }
            }
        }
    }
}

/// System: +dt и RecordingTick
pub fn tick_time_recorder(
    mut recorder: ResMut<TimeRecorder>,
    time: Res<Time>,
    mut ticks: EventWriter<RecordingTick>,
) {
    if let Some(elapsed) = recorder.tick(time.delta_secs()) {
        ticks.write(RecordingTick { elapsed });
    }
}

pub struct RecorderPlugin;

impl Plugin for RecorderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TimeRecorder>()
            .add_event::<RecorderControl>()
            .add_event::<RecordingTick>();

        app.add_systems(
            FixedUpdate,
            (apply_recorder_controls, tick_time_recorder)
                .chain()
                .in_set(SimulationSet::Spawn),
        );
    }
}
