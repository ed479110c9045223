//! Preview playback clock.
//!
//! A small state machine over virtual time:
//!
//! ```text
//! Stopped --start--> Playing --pause--> Paused --resume--> Playing
//!                       |                  ^
//!                       +--reached end-----+
//! any --stop--> Stopped
//! ```
//!
//! Time only moves when the host calls [`Playback::poll`] with the current
//! wall-clock reading. Each elapsed tick interval advances virtual time by
//! `interval × speed`.

use std::fmt;
use std::time::Duration;

use stagehand_time::Ticker;
use thiserror::Error;

use crate::constants::{MAX_PLAYBACK_SPEED, MIN_PLAYBACK_SPEED, TICK_INTERVAL};

/// Where the preview is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Edit mode; no preview running
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn name(&self) -> &'static str {
        match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors for preview operations attempted in the wrong state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    #[error("not in preview mode")]
    NotInPreview,

    #[error("pause the preview first")]
    Playing,
}

/// Clamp a requested playback speed into the supported range.
pub fn clamp_speed(speed: f64) -> f64 {
    if speed.is_nan() {
        return 1.0;
    }
    speed.clamp(MIN_PLAYBACK_SPEED, MAX_PLAYBACK_SPEED)
}

/// Result of advancing the clock.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickOutcome {
    /// Ticks applied by this poll
    pub ticks: u32,
    /// The end of the show was reached and playback paused
    pub finished: bool,
}

impl TickOutcome {
    pub fn advanced(&self) -> bool {
        self.ticks > 0
    }
}

/// Virtual-time clock driven by a single repeating [`Ticker`].
#[derive(Debug)]
pub struct Playback {
    state: PlaybackState,
    current_time: f64,
    duration: f64,
    speed: f64,
    tick_interval: Duration,
    ticker: Ticker,
}

impl Default for Playback {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Playback {
    pub fn new(duration: f64) -> Self {
        Self {
            state: PlaybackState::Stopped,
            current_time: 0.0,
            duration: duration.max(0.0),
            speed: 1.0,
            tick_interval: TICK_INTERVAL,
            ticker: Ticker::new(),
        }
    }

    /// Use a different wall-clock tick interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = clamp_speed(speed);
        self
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_previewing(&self) -> bool {
        self.state != PlaybackState::Stopped
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Whether a repeating timer is currently armed.
    pub fn has_active_timer(&self) -> bool {
        self.ticker.is_active()
    }

    /// Virtual seconds added per tick at the current speed.
    pub fn step(&self) -> f64 {
        self.tick_interval.as_secs_f64() * self.speed
    }

    /// Change the show length; virtual time is pulled back inside it.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration.max(0.0);
        self.current_time = self.current_time.min(self.duration);
    }

    /// Set the speed multiplier. Takes effect from the next tick.
    /// Returns the clamped value actually applied.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        self.speed = clamp_speed(speed);
        log::debug!("Playback speed set to {}x", self.speed);
        self.speed
    }

    /// Enter preview from the top and start playing.
    ///
    /// Calling this while a timer is already armed replaces it, so the tick
    /// rate never doubles.
    pub fn start(&mut self, now: Duration) {
        self.current_time = 0.0;
        self.state = PlaybackState::Playing;
        let id = self.ticker.start(now, self.tick_interval);
        log::info!("▶ Preview started ({}, {}x)", id, self.speed);
    }

    /// Pause a playing preview. Returns false if it was not playing.
    pub fn pause(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        self.ticker.cancel();
        self.state = PlaybackState::Paused;
        log::info!("⏸ Preview paused at {:.2}s", self.current_time);
        true
    }

    /// Resume a paused preview with a fresh timer.
    pub fn resume(&mut self, now: Duration) -> Result<(), PreviewError> {
        match self.state {
            PlaybackState::Stopped => Err(PreviewError::NotInPreview),
            PlaybackState::Playing => Ok(()),
            PlaybackState::Paused => {
                self.state = PlaybackState::Playing;
                let id = self.ticker.start(now, self.tick_interval);
                log::info!("▶ Preview resumed at {:.2}s ({})", self.current_time, id);
                Ok(())
            }
        }
    }

    /// Pause when playing, resume when paused.
    pub fn toggle(&mut self, now: Duration) -> Result<PlaybackState, PreviewError> {
        match self.state {
            PlaybackState::Stopped => return Err(PreviewError::NotInPreview),
            PlaybackState::Playing => {
                self.pause();
            }
            PlaybackState::Paused => self.resume(now)?,
        }
        Ok(self.state)
    }

    /// Leave preview: cancel the timer and rewind to zero.
    pub fn stop(&mut self) {
        self.ticker.cancel();
        let was = self.state;
        self.state = PlaybackState::Stopped;
        self.current_time = 0.0;
        if was != PlaybackState::Stopped {
            log::info!("⏹ Preview stopped");
        }
    }

    /// Jump to `time`, clamped to `[0, duration]`. Returns the applied time.
    pub fn seek(&mut self, time: f64) -> Result<f64, PreviewError> {
        if self.state == PlaybackState::Stopped {
            return Err(PreviewError::NotInPreview);
        }
        let time = if time.is_nan() { 0.0 } else { time };
        self.current_time = time.clamp(0.0, self.duration);
        log::debug!("Preview seek to {:.2}s", self.current_time);
        Ok(self.current_time)
    }

    /// Apply every tick that has come due by `now`.
    pub fn poll(&mut self, now: Duration) -> TickOutcome {
        if self.state != PlaybackState::Playing {
            return TickOutcome::default();
        }

        let due = self.ticker.poll(now);
        let mut outcome = TickOutcome::default();
        for _ in 0..due {
            outcome.ticks += 1;
            let next = self.current_time + self.step();
            log::trace!("tick -> {:.3}s", next);
            if next >= self.duration {
                self.current_time = self.duration;
                self.ticker.cancel();
                self.state = PlaybackState::Paused;
                outcome.finished = true;
                log::info!("⏸ Preview reached the end ({:.2}s)", self.duration);
                break;
            }
            self.current_time = next;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_initial_state() {
        let playback = Playback::new(45.0);
        assert_eq!(playback.state(), PlaybackState::Stopped);
        assert!(!playback.is_previewing());
        assert!(!playback.has_active_timer());
        assert_eq!(playback.current_time(), 0.0);
    }

    #[test]
    fn test_one_second_at_normal_speed() {
        let mut playback = Playback::new(45.0);
        playback.start(ms(0));
        let outcome = playback.poll(ms(1000));
        assert_eq!(outcome.ticks, 10);
        assert!(!outcome.finished);
        assert!(approx(playback.current_time(), 1.0));
    }

    #[test]
    fn test_speed_scales_step_not_rate() {
        let mut playback = Playback::new(45.0).with_speed(2.0);
        playback.start(ms(0));
        assert_eq!(playback.poll(ms(1000)).ticks, 10);
        assert!(approx(playback.current_time(), 2.0));

        playback.set_speed(0.25);
        playback.poll(ms(2000));
        assert!(approx(playback.current_time(), 2.25));
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut playback = Playback::new(10.0);
        assert_eq!(playback.set_speed(10.0), MAX_PLAYBACK_SPEED);
        assert_eq!(playback.set_speed(0.0), MIN_PLAYBACK_SPEED);
        assert_eq!(playback.set_speed(f64::NAN), 1.0);
    }

    #[test]
    fn test_double_start_keeps_single_timer() {
        let mut playback = Playback::new(45.0);
        playback.start(ms(0));
        playback.start(ms(0));
        assert!(playback.has_active_timer());
        assert_eq!(playback.poll(ms(1000)).ticks, 10);
        assert!(approx(playback.current_time(), 1.0));
    }

    #[test]
    fn test_reaching_end_pauses() {
        let mut playback = Playback::new(1.0);
        playback.start(ms(0));
        let outcome = playback.poll(ms(5000));
        assert!(outcome.finished);
        assert_eq!(playback.state(), PlaybackState::Paused);
        assert_eq!(playback.current_time(), 1.0);
        assert!(!playback.has_active_timer());

        // Resuming at the end pauses again on the next tick
        playback.resume(ms(5000)).unwrap();
        assert!(playback.poll(ms(5100)).finished);
        assert_eq!(playback.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut playback = Playback::new(45.0);
        playback.start(ms(0));
        playback.poll(ms(500));
        assert!(playback.pause());
        assert!(!playback.pause());
        assert!(!playback.has_active_timer());
        assert_eq!(playback.poll(ms(10_000)), TickOutcome::default());
        assert!(approx(playback.current_time(), 0.5));

        playback.resume(ms(10_000)).unwrap();
        playback.poll(ms(10_300));
        assert!(approx(playback.current_time(), 0.8));
    }

    #[test]
    fn test_seek_requires_preview_and_clamps() {
        let mut playback = Playback::new(45.0);
        assert_eq!(playback.seek(3.0), Err(PreviewError::NotInPreview));

        playback.start(ms(0));
        playback.pause();
        assert_eq!(playback.seek(-4.0), Ok(0.0));
        assert_eq!(playback.seek(100.0), Ok(45.0));
        assert_eq!(playback.seek(12.5), Ok(12.5));
    }

    #[test]
    fn test_toggle_and_stop() {
        let mut playback = Playback::new(45.0);
        assert_eq!(playback.toggle(ms(0)), Err(PreviewError::NotInPreview));

        playback.start(ms(0));
        assert_eq!(playback.toggle(ms(0)), Ok(PlaybackState::Paused));
        assert_eq!(playback.toggle(ms(0)), Ok(PlaybackState::Playing));

        playback.poll(ms(2000));
        playback.stop();
        assert_eq!(playback.state(), PlaybackState::Stopped);
        assert_eq!(playback.current_time(), 0.0);
        assert!(!playback.has_active_timer());
    }

    #[test]
    fn test_custom_tick_interval() {
        let mut playback = Playback::new(45.0).with_tick_interval(ms(50));
        playback.start(ms(0));
        assert_eq!(playback.poll(ms(1000)).ticks, 20);
        assert!(approx(playback.current_time(), 1.0));
    }
}
