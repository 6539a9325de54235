use std::time::Instant;

/// Snapshot of the frame clock handed to the carousel each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Seconds since the previous sample.
    pub delta: f32,
    /// Seconds since the source was created.
    pub elapsed: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    pub fn new(delta: f32, elapsed: f32, frame_index: u64) -> Self {
        Self {
            delta,
            elapsed,
            frame_index,
        }
    }
}

/// Abstraction over where frame deltas originate from.
pub trait TimeSource: Send {
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Time source backed by the system monotonic clock.
///
/// The first sample reports a zero delta, so a freshly opened window never
/// starts with a jump.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
    last: Option<Instant>,
    frame: u64,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            last: None,
            frame: 0,
        }
    }
}

impl TimeSource for SystemTimeSource {
    fn sample(&mut self) -> TimeSample {
        let now = Instant::now();
        let delta = self
            .last
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);
        let sample = TimeSample::new(
            delta,
            now.saturating_duration_since(self.origin).as_secs_f32(),
            self.frame,
        );
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Deterministic source that advances by a constant step every frame.
#[derive(Debug, Clone, Copy)]
pub struct FixedStepTimeSource {
    step: f32,
    elapsed: f64,
    frame: u64,
}

impl FixedStepTimeSource {
    pub fn new(step: f32) -> Self {
        Self {
            step: step.max(0.0),
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Builds a source stepping at `fps` frames per second.
    pub fn from_fps(fps: f32) -> Self {
        if fps > 0.0 {
            Self::new(1.0 / fps)
        } else {
            Self::new(0.0)
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }
}

impl TimeSource for FixedStepTimeSource {
    fn sample(&mut self) -> TimeSample {
        self.elapsed += f64::from(self.step);
        let sample = TimeSample::new(self.step, self.elapsed as f32, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}
