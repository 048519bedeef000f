use std::time::{Duration, Instant};

/// Timing snapshot handed to per-frame callbacks.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame, clamped.
    pub dt: f32,

    /// Monotonic timestamp of this frame.
    pub now: Instant,

    /// Zero-based frame counter since the clock was created or last reset.
    pub frame_index: u64,
}

/// Produces `FrameTime` snapshots for one render loop.
///
/// `reset` when a loop starts so its frames count from zero. Delta time is
/// clamped: a minimized window or a debugger
/// pause must not hand a multi-second `dt` to scene animation.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub const DEFAULT_DT_MIN: Duration = Duration::from_micros(100);
    pub const DEFAULT_DT_MAX: Duration = Duration::from_millis(250);

    /// Nominal delta used for the very first frame (60 Hz).
    pub const FIRST_FRAME_DT: Duration = Duration::from_micros(16_667);

    pub fn new() -> Self {
        Self::with_clamps(Self::DEFAULT_DT_MIN, Self::DEFAULT_DT_MAX)
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: None,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Starts over: the next tick is frame zero with the nominal delta.
    ///
    /// Call when a loop (re)starts on a shared clock.
    pub fn reset(&mut self) {
        self.last = None;
        self.frame_index = 0;
    }

    /// Number of ticks produced so far.
    pub fn frames(&self) -> u64 {
        self.frame_index
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = match self.last {
            Some(last) => now
                .saturating_duration_since(last)
                .clamp(self.dt_min, self.dt_max),
            None => Self::FIRST_FRAME_DT.clamp(self.dt_min, self.dt_max),
        };
        self.last = Some(now);

        let time = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_uses_nominal_delta() {
        let mut clock = FrameClock::new();
        let t = clock.tick_at(Instant::now());
        assert_eq!(t.frame_index, 0);
        assert!((t.dt - FrameClock::FIRST_FRAME_DT.as_secs_f32()).abs() < 1e-6);
    }

    #[test]
    fn frame_index_increments() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        let t = clock.tick_at(start + Duration::from_millis(16));
        assert_eq!(t.frame_index, 1);
        assert_eq!(clock.frames(), 2);
    }

    #[test]
    fn long_stall_is_clamped() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        let t = clock.tick_at(start + Duration::from_secs(5));
        assert!((t.dt - 0.25).abs() < 1e-6);
    }

    #[test]
    fn zero_delta_is_clamped_up() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        let t = clock.tick_at(start);
        assert!(t.dt > 0.0);
    }

    #[test]
    fn reset_restarts_from_frame_zero() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        clock.tick_at(start + Duration::from_millis(16));
        clock.reset();
        assert_eq!(clock.frames(), 0);
        let t = clock.tick_at(start + Duration::from_secs(3));
        assert!((t.dt - FrameClock::FIRST_FRAME_DT.as_secs_f32()).abs() < 1e-6);
        assert_eq!(t.frame_index, 0);
    }
}
