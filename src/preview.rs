//! Preview sessions: playback of a keyframed script with drag-to-insert.
//!
//! A [`PreviewScript`] is the read-only input (dialogues, original
//! keyframes, show length). A [`PreviewSession`] runs it: it owns the
//! [`Playback`] clock, the list of keyframes inserted while paused, and the
//! resolved marker position of every actor on stage.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::interpolate::{Interpolator, PositionMap};
use crate::model::{ActorId, Dialogue, Keyframe, Point, TimedCue};
use crate::playback::{Playback, PlaybackState, PreviewError, TickOutcome};
use crate::services::AnalysisResult;

/// Volume given to dialogue lines extracted from a video.
const EXTRACTED_DIALOGUE_VOLUME: f64 = 80.0;

// ============================================================================
// Script
// ============================================================================

/// Input to a preview: what is said when, and where actors stand when.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewScript {
    #[serde(default)]
    pub dialogues: Vec<Dialogue>,
    /// Original keyframes, any order
    #[serde(rename = "actorPositions", default)]
    pub keyframes: Vec<Keyframe>,
    /// Show length in seconds
    pub total_duration: f64,
}

impl PreviewScript {
    pub fn new(dialogues: Vec<Dialogue>, keyframes: Vec<Keyframe>, total_duration: f64) -> Self {
        Self {
            dialogues,
            keyframes,
            total_duration,
        }
    }

    /// Show length, falling back to the last keyframe or cue when unset.
    pub fn duration(&self) -> f64 {
        if self.total_duration > 0.0 {
            return self.total_duration;
        }
        let last_keyframe = self.keyframes.iter().map(|k| k.time).fold(0.0, f64::max);
        let last_cue = self
            .dialogues
            .iter()
            .map(TimedCue::end_time)
            .fold(0.0, f64::max);
        last_keyframe.max(last_cue)
    }

    /// Build a script from video analysis: transcripts become dialogue lines,
    /// tracked positions become keyframes.
    ///
    /// Position samples whose actor reference carries no numeric id are
    /// skipped.
    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        let dialogues: Vec<Dialogue> = analysis
            .transcripts
            .iter()
            .enumerate()
            .map(|(i, segment)| Dialogue {
                id: format!("uploaded_dialogue_{}", i + 1),
                actor_id: segment.actor_id(),
                content: segment.text.clone(),
                start_time: segment.start_time,
                duration: (segment.end_time - segment.start_time).max(0.0),
                emotion: segment.emotion.clone(),
                volume: Some(EXTRACTED_DIALOGUE_VOLUME),
            })
            .collect();

        let mut keyframes = Vec::with_capacity(analysis.actor_positions.len());
        for sample in &analysis.actor_positions {
            match sample.parsed_actor_id() {
                Some(actor) => keyframes.push(Keyframe::new(
                    actor,
                    sample.timestamp,
                    sample.position_2d.x,
                    sample.position_2d.y,
                )),
                None => log::warn!(
                    "Skipping position sample for unknown actor '{}'",
                    sample.actor_id
                ),
            }
        }

        let total_duration = analysis
            .transcripts
            .iter()
            .map(|t| t.end_time)
            .chain(keyframes.iter().map(|k| k.time))
            .fold(0.0, f64::max);

        log::info!(
            "Preview script from analysis: {} dialogues, {} keyframes, {:.1}s",
            dialogues.len(),
            keyframes.len(),
            total_duration
        );
        Self::new(dialogues, keyframes, total_duration)
    }

    /// Actors that have at least one keyframe, ascending.
    pub fn actor_ids(&self) -> Vec<ActorId> {
        let mut ids: Vec<ActorId> = self.keyframes.iter().map(|k| k.actor_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

// ============================================================================
// Session
// ============================================================================

/// A running (or stopped) preview of one script.
#[derive(Debug)]
pub struct PreviewSession {
    script: PreviewScript,
    dynamic: Vec<Keyframe>,
    playback: Playback,
    /// Actors whose markers are shown
    cast: Vec<ActorId>,
    positions: PositionMap,
}

impl PreviewSession {
    pub fn new(script: PreviewScript) -> Self {
        let playback = Playback::new(script.duration());
        Self::with_playback(script, playback)
    }

    /// Use a preconfigured clock (tick interval, initial speed).
    pub fn with_playback(script: PreviewScript, mut playback: Playback) -> Self {
        playback.set_duration(script.duration());
        let cast = script.actor_ids();
        Self {
            script,
            dynamic: Vec::new(),
            playback,
            cast,
            positions: PositionMap::new(),
        }
    }

    pub fn script(&self) -> &PreviewScript {
        &self.script
    }

    /// Swap the script. Any running preview is stopped first.
    pub fn set_script(&mut self, script: PreviewScript) {
        self.stop();
        self.playback.set_duration(script.duration());
        self.cast = script.actor_ids();
        self.script = script;
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn state(&self) -> PlaybackState {
        self.playback.state()
    }

    pub fn current_time(&self) -> f64 {
        self.playback.current_time()
    }

    pub fn dynamic_keyframes(&self) -> &[Keyframe] {
        &self.dynamic
    }

    pub fn interpolator(&self) -> Interpolator<'_> {
        Interpolator::new(&self.script.keyframes, &self.dynamic)
    }

    /// Set which actors get markers. Positions are recomputed when previewing.
    pub fn set_cast(&mut self, cast: impl IntoIterator<Item = ActorId>) {
        self.cast = cast.into_iter().collect();
        if self.playback.is_previewing() {
            self.refresh_positions();
        } else {
            self.positions.clear();
        }
    }

    pub fn cast(&self) -> &[ActorId] {
        &self.cast
    }

    /// Marker positions for the cast at the current virtual time.
    /// Empty when not previewing.
    pub fn positions(&self) -> &PositionMap {
        &self.positions
    }

    pub fn position_of(&self, actor: ActorId) -> Option<Point> {
        self.positions.get(&actor).copied()
    }

    /// Dialogues being spoken at the current virtual time.
    pub fn active_dialogues(&self) -> impl Iterator<Item = &Dialogue> + '_ {
        let t = self.current_time();
        self.script.dialogues.iter().filter(move |d| d.contains(t))
    }

    fn refresh_positions(&mut self) {
        let t = self.playback.current_time();
        let interp = Interpolator::new(&self.script.keyframes, &self.dynamic);
        self.positions = self
            .cast
            .iter()
            .map(|&actor| (actor, interp.position_at(actor, t)))
            .collect();
    }

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------

    /// Start from time zero.
    pub fn start(&mut self, now: Duration) {
        self.playback.start(now);
        self.refresh_positions();
    }

    pub fn pause(&mut self) -> bool {
        self.playback.pause()
    }

    pub fn resume(&mut self, now: Duration) -> Result<(), PreviewError> {
        self.playback.resume(now)
    }

    pub fn toggle(&mut self, now: Duration) -> Result<PlaybackState, PreviewError> {
        self.playback.toggle(now)
    }

    /// Leave preview. Dynamic keyframes and marker positions are discarded.
    pub fn stop(&mut self) {
        self.playback.stop();
        self.positions.clear();
        if !self.dynamic.is_empty() {
            log::debug!("Discarding {} dynamic keyframes", self.dynamic.len());
            self.dynamic.clear();
        }
    }

    pub fn seek(&mut self, time: f64) -> Result<f64, PreviewError> {
        let applied = self.playback.seek(time)?;
        self.refresh_positions();
        Ok(applied)
    }

    pub fn set_speed(&mut self, speed: f64) -> f64 {
        self.playback.set_speed(speed)
    }

    /// Advance the clock to `now` and refresh positions if time moved.
    pub fn pump(&mut self, now: Duration) -> TickOutcome {
        let outcome = self.playback.poll(now);
        if outcome.advanced() {
            self.refresh_positions();
        }
        outcome
    }

    // ------------------------------------------------------------------------
    // Dynamic keyframes
    // ------------------------------------------------------------------------

    /// Pin `actor` to `position` at the current virtual time.
    ///
    /// Only allowed while paused. The position is snapped to whole pixels.
    pub fn insert_keyframe(
        &mut self,
        actor: ActorId,
        position: Point,
    ) -> Result<Keyframe, PreviewError> {
        match self.playback.state() {
            PlaybackState::Stopped => return Err(PreviewError::NotInPreview),
            PlaybackState::Playing => return Err(PreviewError::Playing),
            PlaybackState::Paused => {}
        }

        let keyframe = Keyframe::at(actor, self.current_time(), position.rounded());
        self.dynamic.push(keyframe);
        self.positions.insert(actor, keyframe.position());
        log::info!(
            "📍 Keyframe for actor {} at {:.2}s -> ({}, {})",
            actor,
            keyframe.time,
            keyframe.x,
            keyframe.y
        );
        Ok(keyframe)
    }

    /// Drop every inserted keyframe. Returns how many were removed.
    pub fn clear_dynamic_keyframes(&mut self) -> usize {
        let removed = self.dynamic.len();
        self.dynamic.clear();
        if self.playback.is_previewing() {
            self.refresh_positions();
        }
        removed
    }

    /// Original and dynamic keyframes together, sorted by time.
    pub fn merged_keyframes(&self) -> Vec<Keyframe> {
        self.interpolator().merged()
    }
}

impl Drop for PreviewSession {
    fn drop(&mut self) {
        if self.playback.has_active_timer() {
            self.playback.stop();
        }
    }
}
