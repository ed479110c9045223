//! Wire types exchanged with the backend services.
//!
//! These mirror the backend's JSON (snake_case) rather than the editor's
//! internal model; conversions live next to the types that consume them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{
    Actor, ActorId, Area, Dialogue, Light, Movement, StageDocument, StageElement,
};

// ============================================================================
// Video analysis
// ============================================================================

/// Server-side identifier of an uploaded video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Processing state of an uploaded video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Uploaded,
    Processing,
    Processed,
    Error,
}

/// Handle for a started analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub video_id: VideoId,
    pub status: JobStatus,
    #[serde(default)]
    pub message: Option<String>,
}

/// One transcribed utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub id: String,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub speaker_id: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub emotion: Option<String>,
}

impl TranscriptSegment {
    /// Actor a speaker label maps to: `spk_N` is actor `N + 1`, anything
    /// else goes to actor 1.
    pub fn actor_id(&self) -> ActorId {
        self.speaker_id
            .as_deref()
            .and_then(|s| s.strip_prefix("spk_"))
            .and_then(|n| n.parse::<u64>().ok())
            .map_or(ActorId(1), |n| ActorId(n + 1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position2D {
    pub x: f64,
    pub y: f64,
}

/// A tracked actor position from video analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorPositionSample {
    pub id: String,
    /// Backend actor reference, e.g. `"2"` or `"actor_2"`
    pub actor_id: String,
    pub timestamp: f64,
    pub position_2d: Position2D,
    #[serde(default)]
    pub confidence: f64,
}

impl ActorPositionSample {
    /// Numeric actor id taken from the trailing digits of the reference.
    pub fn parsed_actor_id(&self) -> Option<ActorId> {
        let digits_at = self
            .actor_id
            .char_indices()
            .rev()
            .find(|(_, c)| !c.is_ascii_digit())
            .map_or(0, |(i, c)| i + c.len_utf8());
        self.actor_id[digits_at..].parse::<u64>().ok().map(ActorId)
    }
}

/// Everything the analysis pipeline extracted from a video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub transcripts: Vec<TranscriptSegment>,
    #[serde(default)]
    pub actor_positions: Vec<ActorPositionSample>,
}

// ============================================================================
// Timeline
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    pub light_id: String,
    pub color: Rgb,
    pub intensity: f64,
}

/// A lighting change at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingCue {
    pub id: String,
    pub timestamp: f64,
    pub lights: Vec<LightState>,
    #[serde(default = "default_transition")]
    pub transition_duration: f64,
}

fn default_transition() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MusicAction {
    Start,
    Stop,
    FadeIn,
    FadeOut,
}

/// A music transport event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicCue {
    pub id: String,
    pub timestamp: f64,
    pub action: MusicAction,
    #[serde(default)]
    pub track_id: Option<String>,
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default)]
    pub fade_duration: f64,
}

fn default_volume() -> f64 {
    1.0
}

/// Lighting and music cues of the current project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineData {
    #[serde(default)]
    pub lighting_cues: Vec<LightingCue>,
    #[serde(default)]
    pub music_cues: Vec<MusicCue>,
}

// ============================================================================
// Actor registry
// ============================================================================

/// Actor record as stored by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredActor {
    pub id: ActorId,
    pub name: String,
    pub color: String,
}

/// Position update pushed to the registry after an edit-mode drag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub actor_id: ActorId,
    pub x: f64,
    pub y: f64,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<VideoId>,
}

// ============================================================================
// Suggestions
// ============================================================================

/// How urgent a suggestion is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[serde(alias = "高")]
    High,
    #[serde(alias = "中")]
    Medium,
    #[serde(alias = "低")]
    Low,
}

impl Priority {
    /// Badge color for display.
    pub fn color(&self) -> &'static str {
        match self {
            Priority::High => "#ff4d4f",
            Priority::Medium => "#faad14",
            Priority::Low => "#52c41a",
        }
    }
}

/// A staging improvement proposed by the suggestion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: Priority,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_action: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_actors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_elements: Vec<String>,
    /// Seconds as `"start-end"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
}

impl Suggestion {
    pub fn new(kind: impl Into<String>, priority: Priority, description: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: kind.into(),
            priority,
            description: description.into(),
            specific_action: None,
            affected_actors: Vec::new(),
            affected_elements: Vec::new(),
            time_range: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.specific_action = Some(action.into());
        self
    }
}

/// Scored result of a full stage analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageAnalysis {
    pub overall_score: f64,
    pub analysis_summary: String,
    #[serde(default)]
    pub priority_suggestions: Vec<Suggestion>,
}

/// Depth of analysis requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Full,
    #[default]
    Quick,
}

/// The stage as sent to the suggestion service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSnapshot {
    pub actors: Vec<Actor>,
    pub dialogues: Vec<Dialogue>,
    pub movements: Vec<Movement>,
    pub lights: Vec<Light>,
    pub stage_elements: Vec<StageElement>,
    pub areas: Vec<Area>,
    pub analysis_type: AnalysisKind,
}

impl StageSnapshot {
    pub fn from_document(doc: &StageDocument, kind: AnalysisKind) -> Self {
        Self {
            actors: doc.actors().to_vec(),
            dialogues: doc.dialogues().to_vec(),
            movements: doc.movements().to_vec(),
            lights: doc.lights().to_vec(),
            stage_elements: doc.stage_elements().to_vec(),
            areas: doc.areas().to_vec(),
            analysis_type: kind,
        }
    }
}
