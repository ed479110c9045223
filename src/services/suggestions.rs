//! Throttled refresh of staging suggestions.

use std::time::Duration;

use stagehand_time::Throttle;

use super::{AnalysisKind, Priority, StageAnalysis, StageSnapshot, Suggestion, SuggestionService};
use crate::constants::SUGGESTION_REFRESH_INTERVAL;

/// Suggestions shown when the service cannot be reached.
pub fn fallback_suggestions() -> Vec<Suggestion> {
    vec![
        Suggestion::new(
            "system notice",
            Priority::Medium,
            "AI service unavailable, using basic suggestions",
        )
        .with_action("Check the network connection or try again later"),
        Suggestion::new(
            "basic check",
            Priority::Low,
            "Check that actors are spread evenly across the stage",
        )
        .with_action("Keep a comfortable distance between actors and avoid crowding"),
        Suggestion::new(
            "performance tip",
            Priority::Low,
            "Balance dialogue length against the pacing of the scene",
        )
        .with_action("Make sure no single actor carries an overly long stretch of lines"),
    ]
}

/// Display icon for a suggestion category.
pub fn icon_for_kind(kind: &str) -> &'static str {
    match kind {
        "path optimization" => "🚶",
        "lighting optimization" | "lighting design" => "💡",
        "performance rhythm" => "🎵",
        "position adjustment" => "📍",
        "dialogue rhythm" => "💬",
        "spatial idea" => "🎭",
        "interaction idea" => "🤝",
        "ai analysis" => "🤖",
        "system notice" => "⚠️",
        "basic check" => "✅",
        "performance tip" => "🎪",
        _ => "💡",
    }
}

/// What a refresh request ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Too soon after the previous refresh; nothing was called
    Throttled { retry_in: Duration },
    /// Suggestions replaced with the service's answer
    Updated { count: usize },
    /// Full analysis completed and its priority suggestions were applied
    Analyzed { score: f64, count: usize },
    /// The service failed; fallback suggestions are shown
    Fallback { reason: String },
}

/// Keeps the latest suggestion list and rate-limits automatic refreshes.
///
/// Automatic refreshes run at most once per interval. A forced refresh runs a
/// full analysis and ignores the limit. Calls complete in order, so the most
/// recent answer always replaces the list.
#[derive(Debug, Clone)]
pub struct SuggestionCoordinator {
    throttle: Throttle,
    healthy: Option<bool>,
    suggestions: Vec<Suggestion>,
    last_analysis: Option<StageAnalysis>,
}

impl Default for SuggestionCoordinator {
    fn default() -> Self {
        Self::new(SUGGESTION_REFRESH_INTERVAL)
    }
}

impl SuggestionCoordinator {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            throttle: Throttle::new(min_interval),
            healthy: None,
            suggestions: Vec::new(),
            last_analysis: None,
        }
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn last_analysis(&self) -> Option<&StageAnalysis> {
        self.last_analysis.as_ref()
    }

    /// Last known health, `None` before the first check.
    pub fn is_healthy(&self) -> Option<bool> {
        self.healthy
    }

    /// Whether an automatic refresh would go through at `now`.
    pub fn is_due(&self, now: Duration) -> bool {
        self.throttle.ready(now)
    }

    /// Show the fallback list, e.g. when no service is configured.
    pub fn use_fallback(&mut self) {
        self.suggestions = fallback_suggestions();
    }

    /// Query service health unless it is already known to be up.
    pub fn ensure_healthy(&mut self, service: &dyn SuggestionService) -> bool {
        if self.healthy == Some(true) {
            return true;
        }
        let healthy = service.health();
        if !healthy {
            log::warn!("Suggestion service health check failed");
        }
        self.healthy = Some(healthy);
        healthy
    }

    /// Refresh suggestions for `stage`.
    ///
    /// `full` requests the slow scored analysis and bypasses the throttle.
    pub fn refresh(
        &mut self,
        service: &dyn SuggestionService,
        stage: &StageSnapshot,
        now: Duration,
        full: bool,
    ) -> RefreshOutcome {
        if !full && !self.throttle.ready(now) {
            let retry_in = self.throttle.remaining(now);
            log::trace!("Suggestion refresh throttled for {:?}", retry_in);
            return RefreshOutcome::Throttled { retry_in };
        }
        self.throttle.mark(now);

        if full {
            let mut request = stage.clone();
            request.analysis_type = AnalysisKind::Full;
            match service.analyze_stage(&request) {
                Ok(analysis) => {
                    let count = analysis.priority_suggestions.len();
                    let score = analysis.overall_score;
                    self.suggestions = analysis.priority_suggestions.clone();
                    self.last_analysis = Some(analysis);
                    log::info!("Stage analysis done: score {score}, {count} suggestions");
                    return RefreshOutcome::Analyzed { score, count };
                }
                Err(err) => {
                    log::warn!("Full stage analysis failed: {err}; trying quick suggestions");
                }
            }
        }

        match service.quick_suggestions(stage) {
            Ok(list) => {
                let count = list.len();
                self.suggestions = list;
                RefreshOutcome::Updated { count }
            }
            Err(err) => {
                log::warn!("Quick suggestions failed: {err}");
                self.suggestions = fallback_suggestions();
                RefreshOutcome::Fallback {
                    reason: err.to_string(),
                }
            }
        }
    }
}
