use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::app::input::InputSnapshot;
use crate::app::overworld::Overworld;
use crate::app::rendering::RenderSink;
use crate::content::ContentError;
use crate::StartupError;

pub const TICKS_PER_SECOND: u32 = 60;

/// Authored durations are milliseconds; the simulation counts ticks.
pub fn ticks_from_millis(time_ms: u32) -> u32 {
    time_ms.saturating_mul(TICKS_PER_SECOND) / 1000
}

/// Supplies one input snapshot per frame. Device bindings live behind this
/// trait, outside the engine.
pub trait InputSource {
    fn poll(&mut self) -> InputSnapshot;
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: TICKS_PER_SECOND,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Content(#[from] ContentError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopMetricsSnapshot {
    pub ticks: u32,
    pub frames: u32,
}

#[derive(Debug)]
struct MetricsAccumulator {
    ticks: u32,
    frames: u32,
    window_start: Instant,
}

impl MetricsAccumulator {
    fn new() -> Self {
        Self {
            ticks: 0,
            frames: 0,
            window_start: Instant::now(),
        }
    }

    fn record_ticks(&mut self, ticks: u32) {
        self.ticks = self.ticks.saturating_add(ticks);
    }

    fn record_frame(&mut self) {
        self.frames = self.frames.saturating_add(1);
    }

    fn take_if_elapsed(&mut self, interval: Duration) -> Option<LoopMetricsSnapshot> {
        if self.window_start.elapsed() < interval {
            return None;
        }
        let snapshot = LoopMetricsSnapshot {
            ticks: self.ticks,
            frames: self.frames,
        };
        self.ticks = 0;
        self.frames = 0;
        self.window_start = Instant::now();
        Some(snapshot)
    }
}

/// Fixed-timestep session loop: accumulate real time, run whole ticks,
/// draw once per frame, sleep toward the next tick. Ends when the input
/// source requests quit. Discrete edges apply to the first tick of a frame
/// only.
pub fn run_session(
    overworld: &mut Overworld,
    input: &mut dyn InputSource,
    sink: &mut dyn RenderSink,
    config: &LoopConfig,
) {
    let target_tps = config.target_tps.max(1);
    let tick_duration = Duration::from_secs(1) / target_tps;
    let mut accumulator = Duration::ZERO;
    let mut previous = Instant::now();
    let mut metrics = MetricsAccumulator::new();
    info!(target_tps, "session_started");

    loop {
        let now = Instant::now();
        let frame_delta = (now - previous).min(config.max_frame_delta);
        previous = now;
        accumulator += frame_delta;

        let snapshot = input.poll();
        if snapshot.quit_requested() {
            info!(map = %overworld.map_name(), "session_ended");
            return;
        }

        let mut tick_snapshot = snapshot;
        let mut ticks_this_frame = 0;
        while accumulator >= tick_duration && ticks_this_frame < config.max_ticks_per_frame {
            overworld.tick(&tick_snapshot);
            tick_snapshot = tick_snapshot.with_confirm_pressed(false);
            accumulator -= tick_duration;
            ticks_this_frame += 1;
        }
        if ticks_this_frame == config.max_ticks_per_frame {
            // Running behind; drop the backlog instead of spiraling.
            accumulator = Duration::ZERO;
        }
        metrics.record_ticks(ticks_this_frame);

        overworld.draw(sink);
        metrics.record_frame();
        if let Some(window) = metrics.take_if_elapsed(config.metrics_log_interval) {
            debug!(ticks = window.ticks, frames = window.frames, "loop_metrics");
        }

        if let Some(remaining) = tick_duration.checked_sub(accumulator) {
            thread::sleep(remaining);
        }
    }
}
