//! The stage editor.
//!
//! [`StageEditor`] owns the document, its undo history, the pointer state and
//! the preview session. Every user action arrives as a [`Message`] and goes
//! through [`StageEditor::update`], which either applies it completely or
//! rejects it and leaves the document untouched. Outcomes the user should see
//! come back as [`Notice`]s.

mod error;
mod forms;
mod interaction;
#[cfg(test)]
mod tests;

pub use error::EditError;
pub use forms::{
    ActorForm, AreaForm, DEFAULT_ACTOR_COLOR, DialogueForm, ElementForm, FormError, LightForm,
    MovementForm, MusicForm, validate_actor_patch, validate_dialogue_patch,
};
pub use interaction::{
    ACTOR_BOUNDS, Drag, DragTarget, InteractionMode, LIGHT_BOUNDS, MIN_PATH_POINTS, Tool,
};

use std::path::Path;
use std::time::Duration;

use stagehand_time::{Clock, SharedClock, unix_millis};

use crate::config::AppConfig;
use crate::constants::{MAX_HISTORY_DEPTH, SUGGESTION_REFRESH_INTERVAL, TICK_INTERVAL};
use crate::format::MergedExport;
use crate::history::{ActionKind, History};
use crate::message::{Message, Notice};
use crate::model::{
    Actor, ActorId, ActorPatch, DialoguePatch, MIN_AREA_VERTICES, PathPoint, Point,
    StageDocument, remove_by,
};
use crate::playback::{Playback, PlaybackState, PreviewError};
use crate::preview::{PreviewScript, PreviewSession};
use crate::services::{
    ActorRegistry, AnalysisKind, OfflineRegistry, PositionUpdate, RefreshOutcome, ServiceError,
    StageSnapshot, Suggestion, SuggestionCoordinator, SuggestionService, VideoId,
};
use crate::timeline::format_time_display;

type EditResult = Result<Vec<Notice>, EditError>;

// ============================================================================
// Settings
// ============================================================================

/// Tunables the editor is built with.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSettings {
    /// Maximum number of undo steps kept
    pub max_history: usize,
    /// Preview tick interval
    pub tick_interval: Duration,
    /// Preview speed multiplier at start-up
    pub default_speed: f64,
    /// Minimum time between automatic suggestion refreshes
    pub suggestion_refresh: Duration,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            max_history: MAX_HISTORY_DEPTH,
            tick_interval: TICK_INTERVAL,
            default_speed: 1.0,
            suggestion_refresh: SUGGESTION_REFRESH_INTERVAL,
        }
    }
}

impl From<&AppConfig> for EditorSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_history: config.history.max_depth,
            tick_interval: Duration::from_millis(config.playback.tick_interval_ms.max(1)),
            default_speed: config.playback.default_speed,
            suggestion_refresh: Duration::from_secs(config.services.suggestion_refresh_secs),
        }
    }
}

// ============================================================================
// Editor
// ============================================================================

/// Editor state and the reducer that changes it.
pub struct StageEditor {
    document: StageDocument,
    history: History<StageDocument>,
    mode: InteractionMode,
    selected_actor: Option<ActorId>,
    preview: PreviewSession,
    suggestions: SuggestionCoordinator,
    clock: SharedClock,
    registry: Box<dyn ActorRegistry>,
    suggestion_service: Option<Box<dyn SuggestionService>>,
    video: Option<VideoId>,
    /// Finished path waiting for its movement details
    pending_path: Option<(ActorId, Vec<PathPoint>)>,
    /// Finished polygon waiting for its area details
    pending_area: Option<Vec<Point>>,
    /// Last numeric id handed out
    next_id: u64,
}

impl StageEditor {
    /// Create an editor for `document` with `script` loaded into the preview.
    ///
    /// The initial document is the undo baseline.
    pub fn new(
        document: StageDocument,
        script: PreviewScript,
        settings: EditorSettings,
        clock: SharedClock,
    ) -> Self {
        let next_id = document
            .actors()
            .iter()
            .map(|a| a.id)
            .chain(script.actor_ids())
            .map(|id| id.0)
            .max()
            .unwrap_or(0);

        let playback = Playback::default()
            .with_tick_interval(settings.tick_interval)
            .with_speed(settings.default_speed);
        let mut preview = PreviewSession::with_playback(script, playback);
        preview.set_cast(document.actors().iter().map(|a| a.id));

        log::debug!(
            "Editor created: {} actors, history depth {}",
            document.actors().len(),
            settings.max_history
        );

        Self {
            history: History::with_baseline(document.clone(), settings.max_history),
            document,
            mode: InteractionMode::Idle,
            selected_actor: None,
            preview,
            suggestions: SuggestionCoordinator::new(settings.suggestion_refresh),
            clock,
            registry: Box::new(OfflineRegistry),
            suggestion_service: None,
            video: None,
            pending_path: None,
            pending_area: None,
            next_id,
        }
    }

    /// Use `registry` to persist actor positions.
    pub fn with_registry(mut self, registry: Box<dyn ActorRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Use `service` for staging suggestions.
    pub fn with_suggestion_service(mut self, service: Box<dyn SuggestionService>) -> Self {
        self.suggestion_service = Some(service);
        self
    }

    /// Tag position updates with the video they were blocked against.
    pub fn with_video(mut self, video: VideoId) -> Self {
        self.video = Some(video);
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn document(&self) -> &StageDocument {
        &self.document
    }

    pub fn history(&self) -> &History<StageDocument> {
        &self.history
    }

    pub fn mode(&self) -> &InteractionMode {
        &self.mode
    }

    pub fn selected_actor(&self) -> Option<ActorId> {
        self.selected_actor
    }

    pub fn selected(&self) -> Option<&Actor> {
        self.selected_actor.and_then(|id| self.document.actor(id))
    }

    pub fn preview(&self) -> &PreviewSession {
        &self.preview
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.preview.state()
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        self.suggestions.suggestions()
    }

    pub fn coordinator(&self) -> &SuggestionCoordinator {
        &self.suggestions
    }

    pub fn pending_path(&self) -> Option<&(ActorId, Vec<PathPoint>)> {
        self.pending_path.as_ref()
    }

    pub fn pending_area(&self) -> Option<&[Point]> {
        self.pending_area.as_deref()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Where an actor marker should be drawn right now.
    ///
    /// A marker being dragged in preview follows the pointer; otherwise
    /// preview shows the interpolated position and editing shows the
    /// document position.
    pub fn display_position(&self, actor: ActorId) -> Option<Point> {
        match &self.mode {
            InteractionMode::DraggingActor {
                id,
                drag,
                in_preview: true,
            } if *id == actor => Some(drag.current),
            _ if self.preview.playback().is_previewing() => self.preview.position_of(actor),
            _ => self.document.actor(actor).map(|a| a.position),
        }
    }

    /// Advance the preview to the current clock reading.
    pub fn pump(&mut self) -> Vec<Notice> {
        self.update(Message::Tick)
    }

    // ------------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------------

    /// Apply one message.
    pub fn update(&mut self, message: Message) -> Vec<Notice> {
        // An unreleased drag must not leak into another action's snapshot
        if message.edits_document() && self.mode.is_dragging() {
            self.cancel_interaction();
        }
        let result = match message {
            Message::AddActor(form) => self.add_actor(&form),
            Message::DeleteActor(id) => self.delete_actor(id),
            Message::SelectActor(id) => self.select_actor(id),
            Message::UpdateActor(id, patch) => self.update_actor(id, &patch),

            Message::AddElement(form) => self.add_element(&form),
            Message::DeleteElement(id) => self.delete_element(&id),
            Message::AddLight(form) => self.add_light(&form),
            Message::DeleteLight(id) => self.delete_light(&id),
            Message::AddArea(form) => self.add_area(&form),
            Message::DeleteArea(id) => self.delete_area(&id),

            Message::AddMusic(form) => self.add_music(&form),
            Message::DeleteMusic(id) => self.delete_music(&id),
            Message::AddDialogue(form) => self.add_dialogue(&form),
            Message::UpdateDialogue(id, patch) => self.update_dialogue(&id, &patch),
            Message::DeleteDialogue(id) => self.delete_dialogue(&id),
            Message::AddMovement(form) => self.add_movement(&form),
            Message::DeleteMovement(id) => self.delete_movement(&id),

            Message::PointerDown(target, at) => self.pointer_down(target, at),
            Message::PointerMove(at) => {
                self.pointer_move(at);
                Ok(Vec::new())
            }
            Message::PointerUp => self.pointer_up(),
            Message::StageClick(at) => self.stage_click(at),

            Message::ToggleTool(tool) => self.toggle_tool(tool),
            Message::Cancel => {
                let cancelled = self.cancel_interaction();
                Ok(if cancelled {
                    vec![Notice::info("Cancelled")]
                } else {
                    Vec::new()
                })
            }

            Message::StartPreview => self.start_preview(),
            Message::PausePreview => self.pause_preview(),
            Message::ResumePreview => self.resume_preview(),
            Message::TogglePlayback => self.toggle_playback(),
            Message::StopPreview => self.stop_preview(),
            Message::Seek(time) => self
                .preview
                .seek(time)
                .map(|_| Vec::new())
                .map_err(Into::into),
            Message::SetSpeed(speed) => {
                let applied = self.preview.set_speed(speed);
                Ok(vec![Notice::info(format!("Playback speed {applied}x"))])
            }
            Message::ClearDynamicKeyframes => {
                let removed = self.preview.clear_dynamic_keyframes();
                Ok(vec![Notice::success(format!(
                    "Cleared {removed} inserted keyframes"
                ))])
            }
            Message::ExportMerged(path) => Ok(self.export_merged(&path)),
            Message::LoadScript(script) => Ok(self.load_script(script)),
            Message::Tick => Ok(self.tick()),

            Message::Undo => Ok(self.undo()),
            Message::Redo => Ok(self.redo()),

            Message::RefreshSuggestions { full } => Ok(self.refresh_suggestions(full)),
        };

        match result {
            Ok(notices) => notices,
            Err(err) => {
                log::warn!("Action rejected: {err}");
                vec![Notice::warning(err.to_string())]
            }
        }
    }

    // ------------------------------------------------------------------------
    // Bookkeeping
    // ------------------------------------------------------------------------

    fn peek_id(&self) -> u64 {
        self.next_id + 1
    }

    fn take_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Record the current document as a new history entry.
    fn commit(&mut self, kind: ActionKind, description: String) {
        self.history.save(kind, description, self.document.clone());
        self.document_changed();
    }

    fn document_changed(&mut self) {
        self.preview
            .set_cast(self.document.actors().iter().map(|a| a.id));
        self.auto_refresh_suggestions();
    }

    fn auto_refresh_suggestions(&mut self) {
        let Some(service) = self.suggestion_service.as_deref() else {
            return;
        };
        let now = self.clock.now();
        if !self.suggestions.is_due(now) {
            return;
        }
        let snapshot = StageSnapshot::from_document(&self.document, AnalysisKind::Quick);
        self.suggestions.refresh(service, &snapshot, now, false);
    }

    fn actor_name(&self, id: ActorId) -> Result<String, EditError> {
        self.document
            .actor(id)
            .map(|a| a.name.clone())
            .ok_or(EditError::UnknownActor(id))
    }

    // ------------------------------------------------------------------------
    // Actors
    // ------------------------------------------------------------------------

    fn add_actor(&mut self, form: &ActorForm) -> EditResult {
        let actor = form.validate(ActorId(self.peek_id()))?;
        self.take_id();
        let name = actor.name.clone();
        self.document.actors_mut().push(actor);
        self.commit(ActionKind::AddActor, format!("Add actor: {name}"));
        Ok(vec![Notice::success(format!("Added actor {name}"))])
    }

    fn delete_actor(&mut self, id: ActorId) -> EditResult {
        let actor = self
            .document
            .remove_actor(id)
            .ok_or(EditError::UnknownActor(id))?;

        if self.selected_actor == Some(id) {
            self.selected_actor = None;
        }
        if self.pending_path.as_ref().is_some_and(|(owner, _)| *owner == id) {
            self.pending_path = None;
        }
        let involved = match &self.mode {
            InteractionMode::DraggingActor { id: dragged, .. } => *dragged == id,
            InteractionMode::DrawingPath { actor, .. } => *actor == id,
            _ => false,
        };
        if involved {
            self.mode = InteractionMode::Idle;
        }

        self.commit(
            ActionKind::DeleteActor,
            format!("Delete actor: {}", actor.name),
        );
        Ok(vec![Notice::success(format!("Deleted actor {}", actor.name))])
    }

    fn select_actor(&mut self, id: Option<ActorId>) -> EditResult {
        if let Some(id) = id {
            self.actor_name(id)?;
        }
        self.selected_actor = id;
        Ok(Vec::new())
    }

    fn update_actor(&mut self, id: ActorId, patch: &ActorPatch) -> EditResult {
        validate_actor_patch(patch)?;
        let actor = self
            .document
            .actor(id)
            .ok_or(EditError::UnknownActor(id))?;
        if patch.is_empty() {
            return Ok(Vec::new());
        }
        let mut updated = actor.clone();
        patch.apply(&mut updated);
        let name = updated.name.clone();
        if let Some(slot) = self.document.actor_mut(id) {
            *slot = updated;
        }
        self.commit(ActionKind::UpdateActor, format!("Update actor: {name}"));
        Ok(vec![Notice::success(format!("Updated {name}"))])
    }

    // ------------------------------------------------------------------------
    // Stage elements, lights and areas
    // ------------------------------------------------------------------------

    fn add_element(&mut self, form: &ElementForm) -> EditResult {
        let element = form.validate(format!("element_{}", self.peek_id()))?;
        self.take_id();
        let description = format!("Add {}: {}", element.kind.name(), element.name);
        let notice = Notice::success(format!("Added {}", element.name));
        self.document.stage_elements_mut().push(element);
        self.commit(ActionKind::AddElement, description);
        Ok(vec![notice])
    }

    fn delete_element(&mut self, id: &str) -> EditResult {
        let element = remove_by(self.document.stage_elements_mut(), |e| e.id == id)
            .ok_or_else(|| EditError::unknown("stage element", id))?;
        self.commit(
            ActionKind::DeleteElement,
            format!("Delete element: {}", element.name),
        );
        Ok(vec![Notice::success(format!("Deleted {}", element.name))])
    }

    fn add_light(&mut self, form: &LightForm) -> EditResult {
        let light = form.validate(format!("light_{}", self.peek_id()))?;
        self.take_id();
        let name = light.name.clone();
        self.document.lights_mut().push(light);
        self.commit(ActionKind::AddLight, format!("Add light: {name}"));
        Ok(vec![Notice::success(format!("Added light {name}"))])
    }

    fn delete_light(&mut self, id: &str) -> EditResult {
        let light = remove_by(self.document.lights_mut(), |l| l.id == id)
            .ok_or_else(|| EditError::unknown("light", id))?;
        self.commit(
            ActionKind::DeleteLight,
            format!("Delete light: {}", light.name),
        );
        Ok(vec![Notice::success(format!("Deleted light {}", light.name))])
    }

    fn add_area(&mut self, form: &AreaForm) -> EditResult {
        let points = self.pending_area.clone().unwrap_or_default();
        if points.len() < MIN_AREA_VERTICES {
            return Err(EditError::AreaTooSmall {
                points: points.len(),
                required: MIN_AREA_VERTICES,
            });
        }
        let area = form.validate(format!("area_{}", self.peek_id()), points)?;
        self.take_id();
        self.pending_area = None;
        let name = area.name.clone();
        self.document.areas_mut().push(area);
        self.commit(ActionKind::AddArea, format!("Add area: {name}"));
        Ok(vec![Notice::success(format!("Added area {name}"))])
    }

    fn delete_area(&mut self, id: &str) -> EditResult {
        let area = remove_by(self.document.areas_mut(), |a| a.id == id)
            .ok_or_else(|| EditError::unknown("area", id))?;
        self.commit(ActionKind::DeleteArea, format!("Delete area: {}", area.name));
        Ok(vec![Notice::success(format!("Deleted area {}", area.name))])
    }

    // ------------------------------------------------------------------------
    // Cues
    // ------------------------------------------------------------------------

    fn add_music(&mut self, form: &MusicForm) -> EditResult {
        let track = form.validate(format!("music_{}", self.peek_id()))?;
        self.take_id();
        let name = track.name.clone();
        self.document.music_tracks_mut().push(track);
        self.commit(ActionKind::AddMusic, format!("Add music: {name}"));
        Ok(vec![Notice::success(format!("Added music {name}"))])
    }

    fn delete_music(&mut self, id: &str) -> EditResult {
        let track = remove_by(self.document.music_tracks_mut(), |m| m.id == id)
            .ok_or_else(|| EditError::unknown("music track", id))?;
        self.commit(
            ActionKind::DeleteMusic,
            format!("Delete music: {}", track.name),
        );
        Ok(vec![Notice::success(format!("Deleted music {}", track.name))])
    }

    fn add_dialogue(&mut self, form: &DialogueForm) -> EditResult {
        let actor = self.selected_actor.ok_or(EditError::NoSelection)?;
        let name = self.actor_name(actor)?;
        let dialogue = form.validate(format!("dialogue_{}", self.peek_id()), actor)?;
        self.take_id();
        self.document.dialogues_mut().push(dialogue);
        self.commit(ActionKind::AddDialogue, format!("Add dialogue for {name}"));
        Ok(vec![Notice::success(format!("Added a line for {name}"))])
    }

    fn update_dialogue(&mut self, id: &str, patch: &DialoguePatch) -> EditResult {
        validate_dialogue_patch(patch)?;
        if patch.is_empty() {
            return self
                .document
                .dialogue(id)
                .map(|_| Vec::new())
                .ok_or_else(|| EditError::unknown("dialogue", id));
        }
        let dialogue = self
            .document
            .dialogue_mut(id)
            .ok_or_else(|| EditError::unknown("dialogue", id))?;
        patch.apply(dialogue);
        self.commit(ActionKind::UpdateDialogue, format!("Update dialogue {id}"));
        Ok(vec![Notice::success("Dialogue updated")])
    }

    fn delete_dialogue(&mut self, id: &str) -> EditResult {
        remove_by(self.document.dialogues_mut(), |d| d.id == id)
            .ok_or_else(|| EditError::unknown("dialogue", id))?;
        self.commit(ActionKind::DeleteDialogue, format!("Delete dialogue {id}"));
        Ok(vec![Notice::success("Dialogue deleted")])
    }

    fn add_movement(&mut self, form: &MovementForm) -> EditResult {
        let Some((actor_id, points)) = self.pending_path.clone() else {
            return Err(EditError::PathTooShort {
                points: 0,
                required: MIN_PATH_POINTS,
            });
        };
        let actor = self
            .document
            .actor(actor_id)
            .ok_or(EditError::UnknownActor(actor_id))?;
        let movement = form.validate(format!("movement_{}", self.peek_id()), actor, points)?;
        self.take_id();
        self.pending_path = None;
        let name = movement.name.clone();
        self.document.movements_mut().push(movement);
        self.commit(ActionKind::AddMovement, format!("Add movement: {name}"));
        Ok(vec![Notice::success(format!("Added movement {name}"))])
    }

    fn delete_movement(&mut self, id: &str) -> EditResult {
        let movement = remove_by(self.document.movements_mut(), |m| m.id == id)
            .ok_or_else(|| EditError::unknown("movement", id))?;
        self.commit(
            ActionKind::DeleteMovement,
            format!("Delete movement: {}", movement.name),
        );
        Ok(vec![Notice::success(format!("Deleted movement {}", movement.name))])
    }

    // ------------------------------------------------------------------------
    // Pointer
    // ------------------------------------------------------------------------

    fn pointer_down(&mut self, target: DragTarget, at: Point) -> EditResult {
        if self.mode.is_drawing() {
            return Ok(Vec::new());
        }
        // A press without a release must not leave edits half applied.
        self.cancel_interaction();

        self.mode = match target {
            DragTarget::Actor(id) => {
                let position = self
                    .document
                    .actor(id)
                    .map(|a| a.position)
                    .ok_or(EditError::UnknownActor(id))?;
                let (from, in_preview) = match self.preview.state() {
                    PlaybackState::Playing => return Err(PreviewError::Playing.into()),
                    PlaybackState::Paused => (
                        self.preview.position_of(id).unwrap_or_else(|| {
                            self.preview
                                .interpolator()
                                .position_at(id, self.preview.current_time())
                        }),
                        true,
                    ),
                    PlaybackState::Stopped => (position, false),
                };
                self.selected_actor = Some(id);
                InteractionMode::DraggingActor {
                    id,
                    drag: Drag::new(at, from),
                    in_preview,
                }
            }
            DragTarget::Element(id) => {
                let position = self
                    .document
                    .stage_element(&id)
                    .map(|e| e.position)
                    .ok_or_else(|| EditError::unknown("stage element", id.as_str()))?;
                InteractionMode::DraggingElement {
                    id,
                    drag: Drag::new(at, position),
                }
            }
            DragTarget::Light(id) => {
                let position = self
                    .document
                    .light(&id)
                    .map(|l| l.position)
                    .ok_or_else(|| EditError::unknown("light", id.as_str()))?;
                InteractionMode::DraggingLight {
                    id,
                    drag: Drag::new(at, position),
                }
            }
        };
        Ok(Vec::new())
    }

    fn pointer_move(&mut self, at: Point) {
        match &mut self.mode {
            InteractionMode::DraggingActor {
                drag,
                in_preview: true,
                ..
            } => {
                drag.follow(at, &ACTOR_BOUNDS);
            }
            InteractionMode::DraggingActor { id, drag, .. } => {
                let position = drag.follow(at, &ACTOR_BOUNDS);
                if let Some(actor) = self.document.actor_mut(*id) {
                    actor.position = position;
                }
            }
            InteractionMode::DraggingElement { id, drag } => {
                let Some(bounds) = self.document.stage_element(id).map(|e| e.drag_bounds()) else {
                    return;
                };
                let position = drag.follow(at, &bounds);
                if let Some(element) = self.document.stage_element_mut(id) {
                    element.position = position;
                }
            }
            InteractionMode::DraggingLight { id, drag } => {
                let position = drag.follow(at, &LIGHT_BOUNDS);
                if let Some(light) = self.document.light_mut(id) {
                    light.position = position;
                }
            }
            _ => {}
        }
    }

    fn pointer_up(&mut self) -> EditResult {
        match std::mem::take(&mut self.mode) {
            InteractionMode::DraggingActor {
                id,
                drag,
                in_preview: true,
            } => {
                if !drag.moved() {
                    return Ok(Vec::new());
                }
                let name = self.actor_name(id)?;
                let keyframe = self.preview.insert_keyframe(id, drag.current)?;
                Ok(vec![Notice::success(format!(
                    "Keyframe added for {name} at {}",
                    format_time_display(keyframe.time)
                ))])
            }
            InteractionMode::DraggingActor {
                id,
                drag,
                in_preview: false,
            } => {
                if !drag.moved() {
                    return Ok(Vec::new());
                }
                let name = self.actor_name(id)?;
                self.commit(ActionKind::MoveActor, format!("Move actor: {name}"));
                let mut notices = Vec::new();
                if let Err(err) = self.sync_actor_position(id, drag.current) {
                    log::warn!("Failed to save position of actor {id}: {err}");
                    notices.push(Notice::warning(format!(
                        "Could not save the position of {name}: {err}"
                    )));
                }
                Ok(notices)
            }
            InteractionMode::DraggingElement { id, drag } => {
                if drag.moved() {
                    self.commit(ActionKind::MoveElement, format!("Move element: {id}"));
                }
                Ok(Vec::new())
            }
            InteractionMode::DraggingLight { id, drag } => {
                if drag.moved() {
                    self.commit(ActionKind::MoveLight, format!("Move light: {id}"));
                }
                Ok(Vec::new())
            }
            other => {
                self.mode = other;
                Ok(Vec::new())
            }
        }
    }

    fn sync_actor_position(&self, id: ActorId, position: Point) -> Result<(), ServiceError> {
        let update = PositionUpdate {
            actor_id: id,
            x: position.x,
            y: position.y,
            timestamp: unix_millis(),
            video_id: self.video.clone(),
        };
        self.registry.update_actor_position(&update)
    }

    fn stage_click(&mut self, at: Point) -> EditResult {
        let now = self.clock.now();
        match &mut self.mode {
            InteractionMode::DrawingPath {
                points, started, ..
            } => {
                let time = now.saturating_sub(*started).as_secs_f64();
                points.push(PathPoint::new(at.x, at.y, time));
                Ok(vec![Notice::info(format!("Path point {} added", points.len()))])
            }
            InteractionMode::DrawingArea { points } => {
                points.push(at);
                Ok(vec![Notice::info(format!("Area vertex {} added", points.len()))])
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Abort a drag or drawing. Edit drags put the item back where it was.
    fn cancel_interaction(&mut self) -> bool {
        match std::mem::take(&mut self.mode) {
            InteractionMode::Idle => return false,
            InteractionMode::DraggingActor {
                id,
                drag,
                in_preview: false,
            } if drag.moved() => {
                if let Some(actor) = self.document.actor_mut(id) {
                    actor.position = drag.origin;
                }
            }
            InteractionMode::DraggingElement { id, drag } if drag.moved() => {
                if let Some(element) = self.document.stage_element_mut(&id) {
                    element.position = drag.origin;
                }
            }
            InteractionMode::DraggingLight { id, drag } if drag.moved() => {
                if let Some(light) = self.document.light_mut(&id) {
                    light.position = drag.origin;
                }
            }
            _ => {}
        }
        true
    }

    // ------------------------------------------------------------------------
    // Tools
    // ------------------------------------------------------------------------

    fn toggle_tool(&mut self, tool: Tool) -> EditResult {
        if self.mode.active_tool() == Some(tool) {
            return self.finish_drawing();
        }

        match tool {
            Tool::Path => {
                let actor = self.selected_actor.ok_or(EditError::NoSelection)?;
                let name = self.actor_name(actor)?;
                self.cancel_interaction();
                self.pending_path = None;
                self.mode = InteractionMode::DrawingPath {
                    actor,
                    points: Vec::new(),
                    started: self.clock.now(),
                };
                Ok(vec![Notice::info(format!(
                    "Drawing a path for {name}: click the stage to add points"
                ))])
            }
            Tool::Area => {
                self.cancel_interaction();
                self.pending_area = None;
                self.mode = InteractionMode::DrawingArea { points: Vec::new() };
                Ok(vec![Notice::info(
                    "Drawing an area: click the stage to add vertices",
                )])
            }
        }
    }

    fn finish_drawing(&mut self) -> EditResult {
        match std::mem::take(&mut self.mode) {
            InteractionMode::DrawingPath { actor, points, .. } => {
                if points.len() < MIN_PATH_POINTS {
                    return Err(EditError::PathTooShort {
                        points: points.len(),
                        required: MIN_PATH_POINTS,
                    });
                }
                let count = points.len();
                self.pending_path = Some((actor, points));
                Ok(vec![Notice::info(format!(
                    "Path finished with {count} points"
                ))])
            }
            InteractionMode::DrawingArea { points } => {
                if points.len() < MIN_AREA_VERTICES {
                    return Err(EditError::AreaTooSmall {
                        points: points.len(),
                        required: MIN_AREA_VERTICES,
                    });
                }
                let count = points.len();
                self.pending_area = Some(points);
                Ok(vec![Notice::info(format!(
                    "Area finished with {count} vertices"
                ))])
            }
            other => {
                self.mode = other;
                Ok(Vec::new())
            }
        }
    }

    // ------------------------------------------------------------------------
    // Preview
    // ------------------------------------------------------------------------

    fn start_preview(&mut self) -> EditResult {
        self.cancel_interaction();
        self.preview
            .set_cast(self.document.actors().iter().map(|a| a.id));
        let now = self.clock.now();
        self.preview.start(now);
        Ok(vec![Notice::success("Preview started")])
    }

    fn pause_preview(&mut self) -> EditResult {
        match self.preview.state() {
            PlaybackState::Stopped => Err(PreviewError::NotInPreview.into()),
            PlaybackState::Paused => Ok(Vec::new()),
            PlaybackState::Playing => {
                self.preview.pause();
                Ok(vec![Notice::info(format!(
                    "Paused at {}: drag actors to add keyframes",
                    format_time_display(self.preview.current_time())
                ))])
            }
        }
    }

    fn resume_preview(&mut self) -> EditResult {
        self.drop_preview_drag();
        let now = self.clock.now();
        self.preview.resume(now)?;
        Ok(Vec::new())
    }

    fn toggle_playback(&mut self) -> EditResult {
        if self.preview.state() == PlaybackState::Stopped {
            return self.start_preview();
        }
        self.drop_preview_drag();
        let now = self.clock.now();
        match self.preview.toggle(now)? {
            PlaybackState::Paused => Ok(vec![Notice::info(format!(
                "Paused at {}",
                format_time_display(self.preview.current_time())
            ))]),
            _ => Ok(Vec::new()),
        }
    }

    fn stop_preview(&mut self) -> EditResult {
        if self.preview.state() == PlaybackState::Stopped {
            return Ok(Vec::new());
        }
        self.drop_preview_drag();
        self.preview.stop();
        Ok(vec![Notice::info("Preview stopped")])
    }

    /// A marker dragged while paused is only a proposal; leaving the pause
    /// discards it.
    fn drop_preview_drag(&mut self) {
        if matches!(
            self.mode,
            InteractionMode::DraggingActor {
                in_preview: true,
                ..
            }
        ) {
            self.mode = InteractionMode::Idle;
        }
    }

    fn tick(&mut self) -> Vec<Notice> {
        let now = self.clock.now();
        let outcome = self.preview.pump(now);
        if outcome.finished {
            vec![Notice::info("Preview reached the end")]
        } else {
            Vec::new()
        }
    }

    fn export_merged(&self, path: &Path) -> Vec<Notice> {
        let export = MergedExport::from_session(&self.preview);
        match export.write_to(path) {
            Ok(()) => vec![Notice::success(format!(
                "Exported {} positions ({} inserted) to {}",
                export.position_count(),
                export.dynamic_positions_count.unwrap_or(0),
                path.display()
            ))],
            Err(err) => {
                log::error!("Export to {} failed: {err}", path.display());
                vec![Notice::error(format!("Export failed: {err}"))]
            }
        }
    }

    fn load_script(&mut self, script: PreviewScript) -> Vec<Notice> {
        self.drop_preview_drag();
        if let Some(highest) = script.actor_ids().into_iter().map(|id| id.0).max() {
            self.next_id = self.next_id.max(highest);
        }
        let count = script.keyframes.len();
        self.preview.set_script(script);
        self.preview
            .set_cast(self.document.actors().iter().map(|a| a.id));
        vec![Notice::success(format!(
            "Loaded a script with {count} keyframes"
        ))]
    }

    // ------------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------------

    fn undo(&mut self) -> Vec<Notice> {
        self.cancel_interaction();
        let description = self.history.undo_description().map(str::to_string);
        let Some(state) = self.history.undo().cloned() else {
            return vec![Notice::warning("Nothing to undo")];
        };
        self.restore(state);
        vec![Notice::info(format!(
            "Undo: {}",
            description.unwrap_or_default()
        ))]
    }

    fn redo(&mut self) -> Vec<Notice> {
        self.cancel_interaction();
        let description = self.history.redo_description().map(str::to_string);
        let Some(state) = self.history.redo().cloned() else {
            return vec![Notice::warning("Nothing to redo")];
        };
        self.restore(state);
        vec![Notice::info(format!(
            "Redo: {}",
            description.unwrap_or_default()
        ))]
    }

    /// Swap in a snapshot without recording it.
    fn restore(&mut self, state: StageDocument) {
        self.history.suspend();
        self.document = state;
        self.selected_actor = None;
        self.pending_path = None;
        self.pending_area = None;
        self.document_changed();
        self.history.resume();
    }

    // ------------------------------------------------------------------------
    // Suggestions
    // ------------------------------------------------------------------------

    fn refresh_suggestions(&mut self, full: bool) -> Vec<Notice> {
        let Some(service) = self.suggestion_service.as_deref() else {
            self.suggestions.use_fallback();
            return vec![Notice::warning(
                "No suggestion service configured, showing basic suggestions",
            )];
        };
        if full && !self.suggestions.ensure_healthy(service) {
            return vec![Notice::warning(
                "Suggestion service unavailable, check the network connection",
            )];
        }

        let kind = if full {
            AnalysisKind::Full
        } else {
            AnalysisKind::Quick
        };
        let snapshot = StageSnapshot::from_document(&self.document, kind);
        let now = self.clock.now();
        match self.suggestions.refresh(service, &snapshot, now, full) {
            RefreshOutcome::Throttled { .. } | RefreshOutcome::Updated { .. } => Vec::new(),
            RefreshOutcome::Analyzed { score, count } => vec![Notice::success(format!(
                "Analysis complete: score {score:.0}, {count} suggestions"
            ))],
            RefreshOutcome::Fallback { reason } => vec![Notice::warning(format!(
                "Suggestions unavailable ({reason}), showing basic suggestions"
            ))],
        }
    }
}

impl std::fmt::Debug for StageEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageEditor")
            .field("actors", &self.document.actors().len())
            .field("history", &self.history.len())
            .field("mode", &self.mode)
            .field("selected_actor", &self.selected_actor)
            .field("playback", &self.preview.state())
            .finish_non_exhaustive()
    }
}
