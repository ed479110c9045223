//! Errors from editor actions.

use thiserror::Error;

use super::FormError;
use crate::model::ActorId;
use crate::playback::PreviewError;

/// Why an editor action was rejected. The document is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("actor {0} does not exist")]
    UnknownActor(ActorId),

    #[error("no {kind} with id '{id}'")]
    UnknownItem { kind: &'static str, id: String },

    #[error("select an actor first")]
    NoSelection,

    #[error("a path needs at least {required} points, got {points}")]
    PathTooShort { points: usize, required: usize },

    #[error("an area needs at least {required} vertices, got {points}")]
    AreaTooSmall { points: usize, required: usize },

    #[error("invalid input: {0}")]
    Form(#[from] FormError),

    #[error(transparent)]
    Preview(#[from] PreviewError),
}

impl EditError {
    pub fn unknown(kind: &'static str, id: impl Into<String>) -> Self {
        Self::UnknownItem {
            kind,
            id: id.into(),
        }
    }
}
