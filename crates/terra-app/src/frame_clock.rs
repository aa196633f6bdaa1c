//! Frame pacing: how many simulation ticks each rendered frame runs.
//!
//! With a tick rate of zero the scene advances exactly one tick per frame,
//! so rotation speed follows the display's refresh rate. A non-zero rate uses
//! a fixed-timestep accumulator so the spin is independent of the frame rate.

use std::time::Instant;

use tracing::warn;

/// Longest frame the accumulator will absorb; longer frames are clamped so a
/// stall never replays a burst of ticks.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Converts wall-clock frame times into simulation tick counts.
pub struct FrameClock {
    previous_time: Instant,
    /// Seconds per tick, or `None` for one tick per frame.
    fixed_dt: Option<f64>,
    accumulator: f64,
    last_frame_secs: f64,
    frame_count: u64,
    tick_count: u64,
}

impl FrameClock {
    /// `tick_rate_hz == 0` selects one tick per frame.
    pub fn new(tick_rate_hz: u32) -> Self {
        Self {
            previous_time: Instant::now(),
            fixed_dt: (tick_rate_hz > 0).then(|| 1.0 / f64::from(tick_rate_hz)),
            accumulator: 0.0,
            last_frame_secs: 0.0,
            frame_count: 0,
            tick_count: 0,
        }
    }

    /// Measure the time since the last call and return the ticks to run.
    pub fn tick(&mut self) -> u64 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        self.advance(elapsed)
    }

    /// Account for a frame that took `elapsed_secs` and return the ticks to run.
    pub fn advance(&mut self, elapsed_secs: f64) -> u64 {
        self.frame_count += 1;
        self.last_frame_secs = elapsed_secs.max(0.0);
        let Some(dt) = self.fixed_dt else {
            self.tick_count += 1;
            return 1;
        };

        let mut frame_time = elapsed_secs.max(0.0);
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        self.accumulator += frame_time;
        let mut ticks = 0;
        while self.accumulator >= dt {
            self.accumulator -= dt;
            ticks += 1;
        }
        self.tick_count += ticks;
        ticks
    }

    /// Unclamped duration of the most recent frame.
    pub fn last_frame_secs(&self) -> f64 {
        self.last_frame_secs
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

/// Counts frames and reports the average rate once per interval.
pub struct FrameStats {
    interval: f64,
    elapsed: f64,
    frames: u32,
}

impl FrameStats {
    /// An interval of zero seconds disables reporting.
    pub fn new(interval_secs: u32) -> Self {
        Self {
            interval: f64::from(interval_secs),
            elapsed: 0.0,
            frames: 0,
        }
    }

    /// Record a frame of `frame_secs`; returns frames per second when an
    /// interval has completed.
    pub fn record(&mut self, frame_secs: f64) -> Option<f64> {
        if self.interval <= 0.0 {
            return None;
        }
        self.elapsed += frame_secs.max(0.0);
        self.frames += 1;
        if self.elapsed < self.interval {
            return None;
        }
        let fps = f64::from(self.frames) / self.elapsed;
        self.elapsed = 0.0;
        self.frames = 0;
        Some(fps)
    }
}
