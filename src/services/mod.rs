//! Backend collaborators.
//!
//! The editor talks to four external services: video upload and analysis,
//! project timeline data, the actor registry and the staging suggestion
//! engine. Each is a trait so hosts can plug in an HTTP client, a mock, or
//! nothing at all; this crate ships no network code.

mod error;
mod suggestions;
mod types;

use std::path::Path;

pub use error::ServiceError;
pub use suggestions::{
    RefreshOutcome, SuggestionCoordinator, fallback_suggestions, icon_for_kind,
};
pub use types::{
    ActorPositionSample, AnalysisJob, AnalysisKind, AnalysisResult, JobStatus, LightState,
    LightingCue, MusicAction, MusicCue, Position2D, PositionUpdate, Priority, RegisteredActor,
    Rgb, StageAnalysis, StageSnapshot, Suggestion, TimelineData, TranscriptSegment, VideoId,
};

/// Upload and analysis of rehearsal videos.
pub trait VideoService {
    fn upload(&self, path: &Path) -> Result<VideoId, ServiceError>;

    /// Kick off transcription and position tracking.
    fn process(&self, video: &VideoId) -> Result<AnalysisJob, ServiceError>;

    fn analysis_result(&self, video: &VideoId) -> Result<AnalysisResult, ServiceError>;
}

/// Lighting and music cues of the current project.
pub trait TimelineService {
    fn timeline_data(&self, video: &VideoId) -> Result<TimelineData, ServiceError>;
}

/// Server-side actor records.
pub trait ActorRegistry {
    fn list_actors(&self) -> Result<Vec<RegisteredActor>, ServiceError>;

    fn create_actor(&self, name: &str, color: &str) -> Result<RegisteredActor, ServiceError>;

    fn update_actor_position(&self, update: &PositionUpdate) -> Result<(), ServiceError>;
}

/// Staging advice.
pub trait SuggestionService {
    /// Cheap rule-based suggestions.
    fn quick_suggestions(&self, stage: &StageSnapshot) -> Result<Vec<Suggestion>, ServiceError>;

    /// Slow, scored analysis.
    fn analyze_stage(&self, stage: &StageSnapshot) -> Result<StageAnalysis, ServiceError>;

    fn health(&self) -> bool;
}

/// Registry used when no backend is configured; accepts every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRegistry;

impl ActorRegistry for OfflineRegistry {
    fn list_actors(&self) -> Result<Vec<RegisteredActor>, ServiceError> {
        Ok(Vec::new())
    }

    fn create_actor(&self, _name: &str, _color: &str) -> Result<RegisteredActor, ServiceError> {
        Err(ServiceError::unavailable("no actor registry configured"))
    }

    fn update_actor_position(&self, update: &PositionUpdate) -> Result<(), ServiceError> {
        log::trace!("Offline registry: ignoring position of actor {}", update.actor_id);
        Ok(())
    }
}
