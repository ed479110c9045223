//! Editor message types.
//!
//! All user actions are represented as messages in the Elm architecture
//! style and applied by [`StageEditor::update`](crate::editor::StageEditor::update).

use std::fmt;
use std::path::PathBuf;

use crate::editor::{
    ActorForm, AreaForm, DialogueForm, DragTarget, ElementForm, LightForm, MovementForm,
    MusicForm, Tool,
};
use crate::model::{ActorId, ActorPatch, DialoguePatch, Point};
use crate::preview::PreviewScript;

/// Messages that can be sent to update editor state.
#[derive(Debug, Clone)]
pub enum Message {
    // Actors
    /// Add an actor from the actor form
    AddActor(ActorForm),
    /// Remove an actor and its cues
    DeleteActor(ActorId),
    /// Select an actor, or clear the selection
    SelectActor(Option<ActorId>),
    /// Edit properties of an actor
    UpdateActor(ActorId, ActorPatch),

    // Stage furniture
    AddElement(ElementForm),
    DeleteElement(String),
    AddLight(LightForm),
    DeleteLight(String),
    AddArea(AreaForm),
    DeleteArea(String),

    // Cues
    AddMusic(MusicForm),
    DeleteMusic(String),
    /// Add a dialogue line for the selected actor
    AddDialogue(DialogueForm),
    UpdateDialogue(String, DialoguePatch),
    DeleteDialogue(String),
    /// Turn the finished path into a movement for the selected actor
    AddMovement(MovementForm),
    DeleteMovement(String),

    // Pointer
    /// Button pressed on an item at stage coordinates
    PointerDown(DragTarget, Point),
    /// Pointer moved to stage coordinates
    PointerMove(Point),
    /// Button released (or pointer left the stage)
    PointerUp,
    /// Click on empty stage at stage coordinates
    StageClick(Point),

    // Tools
    /// Start drawing with a tool, or finish if it is already active
    ToggleTool(Tool),
    /// Abort the current drag or drawing
    Cancel,

    // Preview
    StartPreview,
    PausePreview,
    ResumePreview,
    TogglePlayback,
    StopPreview,
    Seek(f64),
    SetSpeed(f64),
    ClearDynamicKeyframes,
    /// Write merged keyframes to a file
    ExportMerged(PathBuf),
    /// Replace the preview script
    LoadScript(PreviewScript),
    /// Advance the preview clock to now
    Tick,

    // History
    Undo,
    Redo,

    // Suggestions
    /// Refresh suggestions; `full` requests a scored analysis
    RefreshSuggestions { full: bool },
}

impl Message {
    /// Whether the message commits a document edit to history.
    pub fn edits_document(&self) -> bool {
        matches!(
            self,
            Message::AddActor(_)
                | Message::DeleteActor(_)
                | Message::UpdateActor(..)
                | Message::AddElement(_)
                | Message::DeleteElement(_)
                | Message::AddLight(_)
                | Message::DeleteLight(_)
                | Message::AddArea(_)
                | Message::DeleteArea(_)
                | Message::AddMusic(_)
                | Message::DeleteMusic(_)
                | Message::AddDialogue(_)
                | Message::UpdateDialogue(..)
                | Message::DeleteDialogue(_)
                | Message::AddMovement(_)
                | Message::DeleteMovement(_)
        )
    }
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient user-facing message produced while applying a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{tag}] {}", self.text)
    }
}
