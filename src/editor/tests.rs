use std::sync::Arc;
use std::time::Duration;

use stagehand_time::ManualClock;

use super::*;
use crate::message::NoticeLevel;
use crate::model::{AreaKind, Keyframe};
use crate::services::RegisteredActor;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn script() -> PreviewScript {
    PreviewScript::new(
        Vec::new(),
        vec![
            Keyframe::new(ActorId(1), 0.0, 100.0, 100.0),
            Keyframe::new(ActorId(1), 10.0, 200.0, 100.0),
        ],
        10.0,
    )
}

fn cast_document() -> StageDocument {
    let mut doc = StageDocument::new();
    doc.actors_mut().push(Actor::new(
        ActorId(1),
        "Ann",
        Point::new(100.0, 100.0),
        "#ffffff",
    ));
    doc
}

fn editor_with(
    document: StageDocument,
    script: PreviewScript,
    settings: EditorSettings,
) -> (StageEditor, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let editor = StageEditor::new(document, script, settings, clock.clone());
    (editor, clock)
}

fn editor() -> (StageEditor, Arc<ManualClock>) {
    editor_with(cast_document(), script(), EditorSettings::default())
}

fn has(notices: &[Notice], level: NoticeLevel) -> bool {
    notices.iter().any(|n| n.level == level)
}

fn drag(editor: &mut StageEditor, target: DragTarget, from: Point, to: Point) -> Vec<Notice> {
    let mut notices = editor.update(Message::PointerDown(target, from));
    notices.extend(editor.update(Message::PointerMove(to)));
    notices.extend(editor.update(Message::PointerUp));
    notices
}

struct FailingRegistry;

impl ActorRegistry for FailingRegistry {
    fn list_actors(&self) -> Result<Vec<RegisteredActor>, ServiceError> {
        Err(ServiceError::unavailable("offline"))
    }

    fn create_actor(&self, _name: &str, _color: &str) -> Result<RegisteredActor, ServiceError> {
        Err(ServiceError::unavailable("offline"))
    }

    fn update_actor_position(&self, _update: &PositionUpdate) -> Result<(), ServiceError> {
        Err(ServiceError::unavailable("offline"))
    }
}

// ============================================================================
// History through the reducer
// ============================================================================

#[test]
fn test_add_then_move_undo_redo() {
    let (mut editor, _clock) = editor_with(
        StageDocument::new(),
        PreviewScript::default(),
        EditorSettings::default(),
    );

    editor.update(Message::AddActor(ActorForm::named("A")));
    let id = editor.document().actors()[0].id;
    let spawn = editor.document().actors()[0].position;

    drag(
        &mut editor,
        DragTarget::Actor(id),
        spawn,
        Point::new(300.0, 200.0),
    );
    assert_eq!(
        editor.document().actor(id).map(|a| a.position),
        Some(Point::new(300.0, 200.0))
    );
    assert_eq!(editor.history().len(), 2);

    editor.update(Message::Undo);
    assert_eq!(editor.document().actor(id).map(|a| a.position), Some(spawn));

    editor.update(Message::Undo);
    assert!(editor.document().actors().is_empty());
    assert!(!editor.can_undo());

    editor.update(Message::Redo);
    assert_eq!(editor.document().actor(id).map(|a| a.position), Some(spawn));
    assert!(editor.can_redo());
}

#[test]
fn test_undo_on_empty_history_warns() {
    let (mut editor, _clock) = editor();
    let notices = editor.update(Message::Undo);
    assert!(has(&notices, NoticeLevel::Warning));
    let notices = editor.update(Message::Redo);
    assert!(has(&notices, NoticeLevel::Warning));
    assert_eq!(editor.document(), &cast_document());
}

#[test]
fn test_history_cap_keeps_latest_steps() {
    let settings = EditorSettings {
        max_history: 3,
        ..EditorSettings::default()
    };
    let (mut editor, _clock) = editor_with(StageDocument::new(), PreviewScript::default(), settings);

    for name in ["A", "B", "C", "D", "E"] {
        editor.update(Message::AddActor(ActorForm::named(name)));
    }
    assert_eq!(editor.history().len(), 3);

    for _ in 0..3 {
        assert!(!has(&editor.update(Message::Undo), NoticeLevel::Warning));
    }
    assert!(editor.document().actors().is_empty());
    assert!(has(&editor.update(Message::Undo), NoticeLevel::Warning));
}

#[test]
fn test_rejected_form_records_nothing() {
    let (mut editor, _clock) = editor();
    let notices = editor.update(Message::AddActor(ActorForm::named("   ")));
    assert!(has(&notices, NoticeLevel::Warning));
    assert_eq!(editor.document().actors().len(), 1);
    assert!(editor.history().is_empty());

    let mut form = ActorForm::named("Bob");
    form.color = Some("red".to_string());
    editor.update(Message::AddActor(form));
    assert!(editor.history().is_empty());
}

#[test]
fn test_delete_actor_cascades_and_undo_restores() {
    let (mut editor, _clock) = editor();
    editor.update(Message::SelectActor(Some(ActorId(1))));
    editor.update(Message::AddDialogue(DialogueForm::new("To be")));
    assert_eq!(editor.document().dialogues().len(), 1);

    editor.update(Message::DeleteActor(ActorId(1)));
    assert!(editor.document().actors().is_empty());
    assert!(editor.document().dialogues().is_empty());
    assert_eq!(editor.selected_actor(), None);

    editor.update(Message::Undo);
    assert_eq!(editor.document().actors().len(), 1);
    assert_eq!(editor.document().dialogues().len(), 1);
}

#[test]
fn test_dialogue_needs_selection() {
    let (mut editor, _clock) = editor();
    let notices = editor.update(Message::AddDialogue(DialogueForm::new("Hello")));
    assert!(has(&notices, NoticeLevel::Warning));
    assert!(editor.document().dialogues().is_empty());
}

#[test]
fn test_unknown_ids_are_rejected() {
    let (mut editor, _clock) = editor();
    assert!(has(
        &editor.update(Message::DeleteActor(ActorId(42))),
        NoticeLevel::Warning
    ));
    assert!(has(
        &editor.update(Message::DeleteLight("nope".into())),
        NoticeLevel::Warning
    ));
    assert!(has(
        &editor.update(Message::SelectActor(Some(ActorId(42)))),
        NoticeLevel::Warning
    ));
    assert!(editor.history().is_empty());
}

#[test]
fn test_new_ids_do_not_collide_with_script_actors() {
    let (mut editor, _clock) = editor_with(
        StageDocument::new(),
        script(),
        EditorSettings::default(),
    );
    editor.update(Message::AddActor(ActorForm::named("New")));
    assert_eq!(editor.document().actors()[0].id, ActorId(2));
}

// ============================================================================
// Pointer interaction
// ============================================================================

#[test]
fn test_edit_drag_clamps_to_stage() {
    let (mut editor, _clock) = editor();
    drag(
        &mut editor,
        DragTarget::Actor(ActorId(1)),
        Point::new(100.0, 100.0),
        Point::new(5000.0, -40.0),
    );
    assert_eq!(
        editor.document().actor(ActorId(1)).map(|a| a.position),
        Some(Point::new(730.0, 20.0))
    );
}

#[test]
fn test_click_without_move_records_nothing() {
    let (mut editor, _clock) = editor();
    editor.update(Message::PointerDown(
        DragTarget::Actor(ActorId(1)),
        Point::new(100.0, 100.0),
    ));
    editor.update(Message::PointerUp);
    assert!(editor.history().is_empty());
    assert_eq!(editor.selected_actor(), Some(ActorId(1)));
}

#[test]
fn test_cancel_restores_drag_origin() {
    let (mut editor, _clock) = editor();
    editor.update(Message::PointerDown(
        DragTarget::Actor(ActorId(1)),
        Point::new(100.0, 100.0),
    ));
    editor.update(Message::PointerMove(Point::new(300.0, 300.0)));
    assert_eq!(
        editor.display_position(ActorId(1)),
        Some(Point::new(300.0, 300.0))
    );

    editor.update(Message::Cancel);
    assert_eq!(editor.mode(), &InteractionMode::Idle);
    assert_eq!(editor.document(), &cast_document());
    assert!(editor.history().is_empty());
}

#[test]
fn test_edit_during_drag_records_settled_document() {
    let (mut editor, _clock) = editor();
    editor.update(Message::PointerDown(
        DragTarget::Actor(ActorId(1)),
        Point::new(100.0, 100.0),
    ));
    editor.update(Message::PointerMove(Point::new(300.0, 300.0)));

    editor.update(Message::AddActor(ActorForm::named("Bo")));
    assert_eq!(editor.mode(), &InteractionMode::Idle);
    let ann = editor.document().actor(ActorId(1)).expect("ann");
    assert_eq!(ann.position, Point::new(100.0, 100.0));

    let recorded = &editor.history().entries().last().expect("entry").state;
    assert_eq!(
        recorded.actor(ActorId(1)).map(|a| a.position),
        Some(Point::new(100.0, 100.0))
    );

    editor.update(Message::PointerUp);
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn test_registry_failure_keeps_local_move() {
    let (editor, _clock) = editor();
    let mut editor = editor.with_registry(Box::new(FailingRegistry));

    let notices = drag(
        &mut editor,
        DragTarget::Actor(ActorId(1)),
        Point::new(100.0, 100.0),
        Point::new(150.0, 120.0),
    );
    assert!(has(&notices, NoticeLevel::Warning));
    assert_eq!(
        editor.document().actor(ActorId(1)).map(|a| a.position),
        Some(Point::new(150.0, 120.0))
    );
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn test_light_drag_may_leave_stage() {
    let (mut editor, _clock) = editor();
    editor.update(Message::AddLight(LightForm::new(
        "Spot",
        crate::model::LightKind::Spot,
    )));
    let id = editor.document().lights()[0].id.clone();

    drag(
        &mut editor,
        DragTarget::Light(id.clone()),
        Point::new(400.0, 100.0),
        Point::new(400.0, -50.0),
    );
    assert_eq!(
        editor.document().light(&id).map(|l| l.position),
        Some(Point::new(400.0, -50.0))
    );
    assert_eq!(editor.history().len(), 2);
}

// ============================================================================
// Drawing tools
// ============================================================================

#[test]
fn test_path_drawing_creates_movement() {
    let (mut editor, clock) = editor();
    editor.update(Message::SelectActor(Some(ActorId(1))));
    editor.update(Message::ToggleTool(Tool::Path));
    assert_eq!(editor.mode().active_tool(), Some(Tool::Path));

    editor.update(Message::StageClick(Point::new(100.0, 100.0)));
    clock.advance(ms(1500));
    editor.update(Message::StageClick(Point::new(200.0, 150.0)));
    editor.update(Message::ToggleTool(Tool::Path));

    let (actor, points) = editor.pending_path().cloned().expect("pending path");
    assert_eq!(actor, ActorId(1));
    assert_eq!(points.len(), 2);
    assert!((points[1].time - 1.5).abs() < 1e-9);

    editor.update(Message::AddMovement(MovementForm::default()));
    assert!(editor.pending_path().is_none());
    let movement = &editor.document().movements()[0];
    assert_eq!(movement.name, "Ann movement");
    assert_eq!(movement.path.len(), 2);
}

#[test]
fn test_path_tool_requires_selection() {
    let (mut editor, _clock) = editor();
    let notices = editor.update(Message::ToggleTool(Tool::Path));
    assert!(has(&notices, NoticeLevel::Warning));
    assert_eq!(editor.mode(), &InteractionMode::Idle);
}

#[test]
fn test_movement_without_path_is_rejected() {
    let (mut editor, _clock) = editor();
    let notices = editor.update(Message::AddMovement(MovementForm::default()));
    assert!(has(&notices, NoticeLevel::Warning));
    assert!(editor.document().movements().is_empty());
}

#[test]
fn test_area_needs_three_vertices() {
    let (mut editor, _clock) = editor();
    editor.update(Message::ToggleTool(Tool::Area));
    editor.update(Message::StageClick(Point::new(0.0, 0.0)));
    editor.update(Message::StageClick(Point::new(100.0, 0.0)));
    let notices = editor.update(Message::ToggleTool(Tool::Area));
    assert!(has(&notices, NoticeLevel::Warning));
    assert!(editor.pending_area().is_none());
    assert_eq!(editor.mode(), &InteractionMode::Idle);

    editor.update(Message::ToggleTool(Tool::Area));
    for p in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)] {
        editor.update(Message::StageClick(Point::new(p.0, p.1)));
    }
    editor.update(Message::ToggleTool(Tool::Area));
    assert_eq!(editor.pending_area().map(<[Point]>::len), Some(3));

    editor.update(Message::AddArea(AreaForm::new(
        "Downstage",
        AreaKind::Performance,
    )));
    assert_eq!(editor.document().areas().len(), 1);
    assert!(editor.pending_area().is_none());
}

// ============================================================================
// Preview
// ============================================================================

#[test]
fn test_drag_rejected_while_playing() {
    let (mut editor, clock) = editor();
    editor.update(Message::StartPreview);
    clock.advance(ms(300));
    editor.pump();

    let notices = editor.update(Message::PointerDown(
        DragTarget::Actor(ActorId(1)),
        Point::new(103.0, 100.0),
    ));
    assert!(has(&notices, NoticeLevel::Warning));
    assert_eq!(editor.mode(), &InteractionMode::Idle);
    assert!(editor.preview().dynamic_keyframes().is_empty());
}

#[test]
fn test_paused_drag_inserts_keyframe() {
    let (mut editor, clock) = editor();
    editor.update(Message::StartPreview);
    clock.advance(ms(500));
    editor.pump();
    editor.update(Message::PausePreview);

    let at = editor.display_position(ActorId(1)).expect("position");
    assert_eq!(at, Point::new(105.0, 100.0));

    let notices = drag(
        &mut editor,
        DragTarget::Actor(ActorId(1)),
        at,
        Point::new(155.4, 130.0),
    );
    assert!(has(&notices, NoticeLevel::Success));

    let inserted = editor.preview().dynamic_keyframes();
    assert_eq!(inserted.len(), 1);
    assert!((inserted[0].time - 0.5).abs() < 1e-9);
    assert_eq!((inserted[0].x, inserted[0].y), (155.0, 130.0));

    // Preview edits never touch the document.
    assert_eq!(editor.document(), &cast_document());
    assert!(editor.history().is_empty());

    editor.update(Message::StopPreview);
    assert!(editor.preview().dynamic_keyframes().is_empty());
    assert_eq!(editor.playback_state(), PlaybackState::Stopped);
}

#[test]
fn test_pause_when_stopped_warns() {
    let (mut editor, _clock) = editor();
    assert!(has(&editor.update(Message::PausePreview), NoticeLevel::Warning));
    assert!(has(&editor.update(Message::Seek(3.0)), NoticeLevel::Warning));
}

#[test]
fn test_toggle_from_stopped_starts_preview() {
    let (mut editor, _clock) = editor();
    editor.update(Message::TogglePlayback);
    assert_eq!(editor.playback_state(), PlaybackState::Playing);
    editor.update(Message::TogglePlayback);
    assert_eq!(editor.playback_state(), PlaybackState::Paused);
    editor.update(Message::TogglePlayback);
    assert_eq!(editor.playback_state(), PlaybackState::Playing);
}

#[test]
fn test_preview_finishes_at_end() {
    let (mut editor, clock) = editor();
    editor.update(Message::StartPreview);
    clock.advance(Duration::from_secs(11));
    let notices = editor.pump();
    assert!(has(&notices, NoticeLevel::Info));
    assert_eq!(editor.playback_state(), PlaybackState::Paused);
    assert_eq!(editor.preview().current_time(), 10.0);
    assert_eq!(
        editor.display_position(ActorId(1)),
        Some(Point::new(200.0, 100.0))
    );
}

#[test]
fn test_export_merged_writes_file() {
    let (mut editor, clock) = editor();
    editor.update(Message::StartPreview);
    clock.advance(ms(500));
    editor.pump();
    editor.update(Message::PausePreview);
    drag(
        &mut editor,
        DragTarget::Actor(ActorId(1)),
        Point::new(105.0, 100.0),
        Point::new(120.0, 140.0),
    );

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("merged.json");
    let notices = editor.update(Message::ExportMerged(path.clone()));
    assert!(has(&notices, NoticeLevel::Success));

    let written = std::fs::read_to_string(&path).expect("read export");
    let export = MergedExport::from_json(&written).expect("parse export");
    assert_eq!(export.actor_positions.len(), 3);
    assert_eq!(export.dynamic_positions_count, Some(1));
}

// ============================================================================
// Suggestions
// ============================================================================

#[test]
fn test_refresh_without_service_uses_fallback() {
    let (mut editor, _clock) = editor();
    let notices = editor.update(Message::RefreshSuggestions { full: false });
    assert!(has(&notices, NoticeLevel::Warning));
    assert_eq!(editor.suggestions().len(), 3);
}

struct CountingService {
    quick_calls: std::rc::Rc<std::cell::Cell<u32>>,
}

impl SuggestionService for CountingService {
    fn quick_suggestions(&self, stage: &StageSnapshot) -> Result<Vec<Suggestion>, ServiceError> {
        self.quick_calls.set(self.quick_calls.get() + 1);
        Ok(vec![Suggestion::new(
            "spacing",
            crate::services::Priority::Medium,
            format!("{} actors on stage", stage.actors.len()),
        )])
    }

    fn analyze_stage(
        &self,
        _stage: &StageSnapshot,
    ) -> Result<crate::services::StageAnalysis, ServiceError> {
        Err(ServiceError::unavailable("analysis offline"))
    }

    fn health(&self) -> bool {
        true
    }
}

#[test]
fn test_edits_refresh_suggestions_throttled() {
    let calls = std::rc::Rc::new(std::cell::Cell::new(0));
    let (editor, clock) = editor();
    let mut editor = editor.with_suggestion_service(Box::new(CountingService {
        quick_calls: calls.clone(),
    }));

    editor.update(Message::AddActor(ActorForm::named("B")));
    editor.update(Message::AddActor(ActorForm::named("C")));
    assert_eq!(calls.get(), 1);
    assert_eq!(editor.suggestions()[0].description, "2 actors on stage");

    clock.advance(Duration::from_secs(5));
    editor.update(Message::AddActor(ActorForm::named("D")));
    assert_eq!(calls.get(), 2);
    assert_eq!(editor.suggestions()[0].description, "4 actors on stage");
}

#[test]
fn test_full_refresh_falls_back_to_quick() {
    let calls = std::rc::Rc::new(std::cell::Cell::new(0));
    let (editor, _clock) = editor();
    let mut editor = editor.with_suggestion_service(Box::new(CountingService {
        quick_calls: calls.clone(),
    }));

    let notices = editor.update(Message::RefreshSuggestions { full: true });
    assert!(notices.is_empty());
    assert_eq!(calls.get(), 1);
    assert_eq!(editor.coordinator().is_healthy(), Some(true));
    assert!(editor.coordinator().last_analysis().is_none());
}

#[test]
fn test_settings_from_default_config() {
    let settings = EditorSettings::from(&crate::config::AppConfig::new());
    assert_eq!(settings, EditorSettings::default());
}
