//! Two-phase animation timeline.
//!
//! The intro is a one-shot set of tracks on a shared clock. Once every track
//! has written its end value the controller switches to the crossfade loop,
//! carrying over whatever time the final tick overshot, so the whole schedule
//! is a pure function of accumulated time.

use ringconfig::{CameraSettings, CarouselConfig, CrossfadeSettings, Ease, IntroSettings};

use crate::assets::TextureId;

/// Scalar properties the intro animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenTarget {
    IntroProgress,
    CameraZ,
    RotationSpeed,
}

/// Receiver of timeline writes.
pub trait AnimationTarget {
    fn apply(&mut self, target: TweenTarget, value: f32);
    fn set_progress(&mut self, progress: f32);
    /// Advances the crossfade pair and resets progress to zero.
    fn advance_pair(&mut self, next: TextureId);
}

/// Where a track starts relative to the ones added before it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackPosition {
    /// At the current end of the timeline.
    After,
    /// Together with the previously added track.
    WithPrevious,
    /// At the previous track's start plus a fraction of its duration.
    PreviousStartPlus(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    pub target: TweenTarget,
    pub from: f32,
    pub to: f32,
    pub start: f32,
    pub duration: f32,
    pub ease: Ease,
    finished: bool,
}

impl Track {
    pub fn end(&self) -> f32 {
        self.start + self.duration
    }

    /// Value at timeline time `time`; exact `from`/`to` at the ends.
    pub fn value_at(&self, time: f32) -> f32 {
        let t = if self.duration > 0.0 {
            (time - self.start) / self.duration
        } else {
            1.0
        };
        let k = self.ease.sample(t);
        self.from * (1.0 - k) + self.to * k
    }
}

#[derive(Debug, Clone)]
pub struct IntroTimeline {
    tracks: Vec<Track>,
    delay: f32,
    clock: f32,
}

impl IntroTimeline {
    pub fn new(delay: f32) -> Self {
        Self {
            tracks: Vec::new(),
            delay: delay.max(0.0),
            clock: 0.0,
        }
    }

    pub fn from_settings(intro: &IntroSettings, camera: &CameraSettings) -> Self {
        let mut timeline = Self::new(intro.delay.as_secs_f32());
        timeline
            .add(
                TweenTarget::IntroProgress,
                0.0,
                1.0,
                intro.reveal.duration.as_secs_f32(),
                intro.reveal.ease,
                TrackPosition::After,
            )
            .add(
                TweenTarget::CameraZ,
                camera.rest_z,
                camera.intro_z,
                intro.dolly.duration.as_secs_f32(),
                intro.dolly.ease,
                TrackPosition::WithPrevious,
            )
            .add(
                TweenTarget::RotationSpeed,
                0.0,
                intro.peak_speed,
                intro.spin_up.duration.as_secs_f32(),
                intro.spin_up.ease,
                TrackPosition::PreviousStartPlus(intro.spin_up_offset),
            )
            .add(
                TweenTarget::RotationSpeed,
                intro.peak_speed,
                0.0,
                intro.spin_down.duration.as_secs_f32(),
                intro.spin_down.ease,
                TrackPosition::PreviousStartPlus(1.0),
            );
        timeline
    }

    pub fn add(
        &mut self,
        target: TweenTarget,
        from: f32,
        to: f32,
        duration: f32,
        ease: Ease,
        position: TrackPosition,
    ) -> &mut Self {
        let start = match (position, self.tracks.last()) {
            (TrackPosition::After, _) | (_, None) => self.duration(),
            (TrackPosition::WithPrevious, Some(previous)) => previous.start,
            (TrackPosition::PreviousStartPlus(fraction), Some(previous)) => {
                previous.start + previous.duration * fraction
            }
        };
        self.tracks.push(Track {
            target,
            from,
            to,
            start,
            duration: duration.max(0.0),
            ease,
            finished: false,
        });
        self
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// End of the last finishing track, excluding the delay.
    pub fn duration(&self) -> f32 {
        self.tracks.iter().map(Track::end).fold(0.0, f32::max)
    }

    /// Advances the intro clock. Returns the time past the intro end once
    /// every track has completed.
    pub fn advance<T>(&mut self, delta: f32, target: &mut T) -> Option<f32>
    where
        T: AnimationTarget + ?Sized,
    {
        self.clock += delta;
        let local = self.clock - self.delay;
        if local < 0.0 {
            return None;
        }
        for track in self.tracks.iter_mut().filter(|track| !track.finished) {
            if local < track.start {
                continue;
            }
            if local >= track.end() {
                track.finished = true;
                target.apply(track.target, track.to);
            } else {
                target.apply(track.target, track.value_at(local));
            }
        }
        if self.tracks.iter().all(|track| track.finished) {
            Some(local - self.duration())
        } else {
            None
        }
    }
}

/// Ever-increasing texture counter, reduced modulo the asset count on use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureCursor {
    counter: u64,
    len: usize,
}

impl TextureCursor {
    pub const START: u64 = 2;

    pub fn new(len: usize) -> Self {
        Self {
            counter: Self::START,
            len: len.max(1),
        }
    }

    pub fn value(&self) -> u64 {
        self.counter
    }

    /// Texture the counter currently points at; moves the counter on.
    pub fn advance(&mut self) -> TextureId {
        let id = TextureId((self.counter % self.len as u64) as usize);
        self.counter += 1;
        id
    }
}

/// Infinite repeating progress tween.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossfadeLoop {
    duration: f32,
    repeat_delay: f32,
    ease: Ease,
    /// Time within the current cycle; negative while the initial delay runs.
    local: f32,
    repeats: u64,
}

impl CrossfadeLoop {
    pub fn new(delay: f32, duration: f32, repeat_delay: f32, ease: Ease) -> Self {
        Self {
            duration,
            repeat_delay: repeat_delay.max(0.0),
            ease,
            local: -delay.max(0.0),
            repeats: 0,
        }
    }

    pub fn from_settings(settings: &CrossfadeSettings) -> Self {
        Self::new(
            settings.delay.as_secs_f32(),
            settings.duration.as_secs_f32(),
            settings.repeat_delay.as_secs_f32(),
            settings.ease,
        )
    }

    pub fn cycle(&self) -> f32 {
        self.duration + self.repeat_delay
    }

    pub fn repeats(&self) -> u64 {
        self.repeats
    }

    /// Progress for the current position; holds 1 through the repeat delay.
    pub fn progress(&self) -> f32 {
        if self.local <= 0.0 {
            0.0
        } else if self.local >= self.duration {
            1.0
        } else {
            self.ease.sample(self.local / self.duration)
        }
    }

    /// Moves the loop on by `delta`, firing one repeat per crossed boundary.
    pub fn advance<T>(&mut self, delta: f32, target: &mut T, cursor: &mut TextureCursor) -> u32
    where
        T: AnimationTarget + ?Sized,
    {
        self.local += delta;
        let cycle = self.cycle();
        let mut fired = 0;
        if cycle > 0.0 {
            while self.local >= cycle {
                self.local -= cycle;
                target.advance_pair(cursor.advance());
                self.repeats += 1;
                fired += 1;
            }
        }
        target.set_progress(self.progress());
        fired
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Intro,
    Loop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimelineReport {
    pub entered_loop: bool,
    pub repeats: u32,
}

#[derive(Debug, Clone)]
enum Stage {
    Intro(IntroTimeline),
    Loop(CrossfadeLoop),
}

/// Drives `Intro -> Loop` on one accumulated clock.
#[derive(Debug, Clone)]
pub struct TimelineController {
    stage: Stage,
    crossfade: CrossfadeLoop,
    cursor: TextureCursor,
}

impl TimelineController {
    pub fn new(intro: IntroTimeline, crossfade: CrossfadeLoop, asset_count: usize) -> Self {
        Self {
            stage: Stage::Intro(intro),
            crossfade,
            cursor: TextureCursor::new(asset_count),
        }
    }

    pub fn from_config(config: &CarouselConfig, asset_count: usize) -> Self {
        Self::new(
            IntroTimeline::from_settings(&config.intro, &config.camera),
            CrossfadeLoop::from_settings(&config.crossfade),
            asset_count,
        )
    }

    pub fn phase(&self) -> Phase {
        match self.stage {
            Stage::Intro(_) => Phase::Intro,
            Stage::Loop(_) => Phase::Loop,
        }
    }

    pub fn cursor(&self) -> &TextureCursor {
        &self.cursor
    }

    /// Repeats fired since the loop started.
    pub fn repeats(&self) -> u64 {
        match &self.stage {
            Stage::Intro(_) => 0,
            Stage::Loop(crossfade) => crossfade.repeats(),
        }
    }

    pub fn advance<T>(&mut self, delta: f32, target: &mut T) -> TimelineReport
    where
        T: AnimationTarget + ?Sized,
    {
        let mut report = TimelineReport::default();
        let mut remaining = delta;

        if let Stage::Intro(intro) = &mut self.stage {
            match intro.advance(delta, target) {
                Some(overflow) => {
                    self.stage = transition(&self.crossfade);
                    report.entered_loop = true;
                    remaining = overflow;
                }
                None => return report,
            }
        }

        if let Stage::Loop(crossfade) = &mut self.stage {
            report.repeats = crossfade.advance(remaining, target, &mut self.cursor);
        }
        report
    }
}

fn transition(crossfade: &CrossfadeLoop) -> Stage {
    tracing::debug!(cycle = crossfade.cycle(), "intro complete, starting crossfade loop");
    Stage::Loop(crossfade.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringconfig::EaseDirection;

    #[derive(Debug, Default)]
    struct Recorder {
        intro_progress: f32,
        camera_z: f32,
        rotation_speed: f32,
        progress: f32,
        current: TextureId,
        next: TextureId,
        progress_at_swap: Vec<f32>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                next: TextureId(1),
                ..Self::default()
            }
        }
    }

    impl AnimationTarget for Recorder {
        fn apply(&mut self, target: TweenTarget, value: f32) {
            match target {
                TweenTarget::IntroProgress => self.intro_progress = value,
                TweenTarget::CameraZ => self.camera_z = value,
                TweenTarget::RotationSpeed => self.rotation_speed = value,
            }
        }

        fn set_progress(&mut self, progress: f32) {
            self.progress = progress;
        }

        // Leaves `progress` alone so tests see what the loop writes after a swap.
        fn advance_pair(&mut self, next: TextureId) {
            self.current = self.next;
            self.next = next;
            self.progress_at_swap.push(self.progress);
        }
    }

    const STEP: f32 = 0.0625;

    fn controller(assets: usize) -> TimelineController {
        TimelineController::from_config(&CarouselConfig::default(), assets)
    }

    #[test]
    fn stock_intro_track_positions() {
        let intro =
            IntroTimeline::from_settings(&IntroSettings::default(), &CameraSettings::default());
        let starts: Vec<f32> = intro.tracks().iter().map(|t| t.start).collect();
        assert_eq!(starts[0], 0.0);
        assert_eq!(starts[1], 0.0);
        assert!((starts[2] - 0.375).abs() < 1e-6);
        assert!((starts[3] - 1.375).abs() < 1e-6);
        assert!((intro.duration() - 4.375).abs() < 1e-6);
        assert!((intro.delay() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn after_appends_at_the_end() {
        let mut intro = IntroTimeline::new(0.0);
        intro
            .add(TweenTarget::CameraZ, 0.0, 1.0, 2.0, Ease::None, TrackPosition::After)
            .add(TweenTarget::IntroProgress, 0.0, 1.0, 0.5, Ease::None, TrackPosition::WithPrevious)
            .add(TweenTarget::RotationSpeed, 0.0, 1.0, 1.0, Ease::None, TrackPosition::After);
        assert_eq!(intro.tracks()[2].start, 2.0);
        assert_eq!(intro.duration(), 3.0);
    }

    #[test]
    fn nothing_moves_during_the_intro_delay() {
        let mut timeline = controller(3);
        let mut target = Recorder::new();
        target.camera_z = -1.0;
        for _ in 0..7 {
            timeline.advance(STEP, &mut target);
        }
        assert_eq!(target.camera_z, -1.0);
        assert_eq!(timeline.phase(), Phase::Intro);
    }

    #[test]
    fn intro_hands_off_with_exact_end_values() {
        let mut timeline = controller(3);
        let mut target = Recorder::new();
        let mut entered = 0;
        let mut ticks = 0;
        while timeline.phase() == Phase::Intro {
            let report = timeline.advance(STEP, &mut target);
            entered += usize::from(report.entered_loop);
            ticks += 1;
            assert!(ticks < 1000);
        }
        assert_eq!(entered, 1);
        assert_eq!(target.intro_progress, 1.0);
        assert_eq!(target.camera_z, CameraSettings::default().intro_z);
        assert_eq!(target.rotation_speed, 0.0);
        assert_eq!(target.progress, 0.0);
        assert_eq!(timeline.cursor().value(), 2);
    }

    #[test]
    fn spin_peaks_between_the_two_speed_tracks() {
        let mut timeline = controller(3);
        let mut target = Recorder::new();
        // 0.5 s delay + 1.375 s to the spin-up end.
        for _ in 0..30 {
            timeline.advance(STEP, &mut target);
        }
        let peak = target.rotation_speed;
        assert!((peak - 5.0).abs() < 1e-3, "{peak}");
        timeline.advance(STEP, &mut target);
        assert!(target.rotation_speed < peak && target.rotation_speed > 0.0);
    }

    #[test]
    fn large_tick_carries_overflow_into_the_loop() {
        let mut stepped = controller(4);
        let mut jumped = controller(4);
        let mut a = Recorder::new();
        let mut b = Recorder::new();
        for _ in 0..(12.0 / STEP) as usize {
            stepped.advance(STEP, &mut a);
        }
        let report = jumped.advance(12.0, &mut b);
        assert!(report.entered_loop);
        assert_eq!(report.repeats, 1);
        assert_eq!(stepped.repeats(), jumped.repeats());
        assert_eq!(a.current, b.current);
        assert_eq!(a.next, b.next);
        assert!((a.progress - b.progress).abs() < 1e-4);
    }

    #[test]
    fn progress_holds_during_repeat_delay() {
        let mut crossfade = CrossfadeLoop::new(0.0, 1.0, 2.0, Ease::None);
        let mut cursor = TextureCursor::new(3);
        let mut target = Recorder::new();
        crossfade.advance(0.5, &mut target, &mut cursor);
        assert_eq!(target.progress, 0.5);
        crossfade.advance(1.0, &mut target, &mut cursor);
        assert_eq!(target.progress, 1.0);
        crossfade.advance(1.0, &mut target, &mut cursor);
        assert_eq!(target.progress, 1.0);
        let fired = crossfade.advance(0.5, &mut target, &mut cursor);
        assert_eq!(fired, 1);
        assert_eq!(target.progress, 0.0);
        assert_eq!(target.progress_at_swap, vec![1.0]);
    }

    #[test]
    fn several_boundaries_in_one_tick_fire_in_order() {
        let mut crossfade = CrossfadeLoop::new(0.0, 1.0, 1.0, Ease::None);
        let mut cursor = TextureCursor::new(5);
        let mut target = Recorder::new();
        let fired = crossfade.advance(6.5, &mut target, &mut cursor);
        assert_eq!(fired, 3);
        assert_eq!(cursor.value(), 5);
        assert_eq!(target.current, TextureId(3));
        assert_eq!(target.next, TextureId(4));
        assert_eq!(target.progress, 0.5);
    }

    #[test]
    fn eased_loop_uses_its_curve() {
        let ease = Ease::power(1, EaseDirection::In);
        let mut crossfade = CrossfadeLoop::new(0.0, 2.0, 0.0, ease);
        let mut cursor = TextureCursor::new(2);
        let mut target = Recorder::new();
        crossfade.advance(1.0, &mut target, &mut cursor);
        assert!((target.progress - 0.25).abs() < 1e-6);
    }

    #[test]
    fn cursor_cycles_through_every_asset() {
        let mut cursor = TextureCursor::new(4);
        let mut seen = Vec::new();
        let mut last = cursor.value();
        for _ in 0..4 {
            seen.push(cursor.advance().index());
            assert!(cursor.value() > last);
            last = cursor.value();
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn two_assets_alternate_forever() {
        let mut crossfade = CrossfadeLoop::new(0.0, 1.0, 0.0, Ease::None);
        let mut cursor = TextureCursor::new(2);
        let mut target = Recorder::new();
        for repeat in 1..=6u64 {
            crossfade.advance(1.0, &mut target, &mut cursor);
            assert_eq!(cursor.value(), 2 + repeat);
            assert_ne!(target.current, target.next);
            assert_eq!(target.current.index(), (repeat % 2) as usize);
        }
    }
}
