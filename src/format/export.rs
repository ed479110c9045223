//! Merged keyframe export.
//!
//! The export file carries the script's dialogues, every keyframe (original
//! and inserted) sorted by time, the show length and how many keyframes were
//! inserted during preview:
//!
//! ```json
//! {
//!   "dialogues": [...],
//!   "actorPositions": [{"actorId": 1, "time": 0, "x": 200, "y": 120}],
//!   "totalDuration": 45,
//!   "dynamicPositionsCount": 2
//! }
//! ```
//!
//! The same layout is accepted on import; `dynamicPositionsCount` is optional
//! there, so plain preview scripts load too.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::FormatError;
use crate::model::{Dialogue, Keyframe};
use crate::preview::{PreviewScript, PreviewSession};

/// On-disk export of a preview with its inserted keyframes merged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedExport {
    #[serde(default)]
    pub dialogues: Vec<Dialogue>,
    #[serde(default)]
    pub actor_positions: Vec<Keyframe>,
    pub total_duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_positions_count: Option<usize>,
}

impl MergedExport {
    /// Snapshot a session: original plus dynamic keyframes, sorted by time.
    ///
    /// `totalDuration` is the length playback runs over, so a script with an
    /// unset duration exports the derived one.
    pub fn from_session(session: &PreviewSession) -> Self {
        let script = session.script();
        Self {
            dialogues: script.dialogues.clone(),
            actor_positions: session.merged_keyframes(),
            total_duration: session.playback().duration(),
            dynamic_positions_count: Some(session.dynamic_keyframes().len()),
        }
    }

    /// Total number of keyframes in the export.
    pub fn position_count(&self) -> usize {
        self.actor_positions.len()
    }

    pub fn to_json(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        let export: Self = serde_json::from_str(json)?;
        if !export.total_duration.is_finite() || export.total_duration < 0.0 {
            return Err(FormatError::invalid_format(format!(
                "totalDuration must be a non-negative number, got {}",
                export.total_duration
            )));
        }
        if let Some(bad) = export.actor_positions.iter().find(|k| !k.time.is_finite()) {
            return Err(FormatError::invalid_format(format!(
                "keyframe for actor {} has a non-finite time",
                bad.actor_id
            )));
        }
        Ok(export)
    }

    /// Convert back into a script. The merged keyframes all become original
    /// keyframes of the new script.
    pub fn into_script(self) -> PreviewScript {
        PreviewScript::new(self.dialogues, self.actor_positions, self.total_duration)
    }

    /// Default export file name for a wall-clock time in Unix seconds.
    pub fn default_filename(unix_secs: u64) -> String {
        format!("merged_actor_positions_{unix_secs}.json")
    }

    pub fn write_to(&self, path: &Path) -> Result<(), FormatError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!(
            "Exported {} positions ({} inserted) to {:?}",
            self.position_count(),
            self.dynamic_positions_count.unwrap_or(0),
            path
        );
        Ok(())
    }
}

/// Load a preview script from an export or plain script file.
pub fn read_script(path: &Path) -> Result<PreviewScript, FormatError> {
    let json = std::fs::read_to_string(path)?;
    let export = MergedExport::from_json(&json)?;
    log::debug!("Loaded {} keyframes from {:?}", export.position_count(), path);
    Ok(export.into_script())
}
