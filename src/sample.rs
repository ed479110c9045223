//! Built-in sample show.
//!
//! Three actors, two props, ten lines of dialogue and fifteen keyframes
//! spread over a 45 second scene. Used to seed a new editor and by the
//! `stagehand sample` command.

use crate::model::{
    Actor, ActorId, Dialogue, ElementKind, Keyframe, Point, StageDocument, StageElement,
};
use crate::preview::PreviewScript;

/// Length of the sample scene in seconds.
pub const SAMPLE_DURATION: f64 = 45.0;

/// (actor, start, duration, volume, line)
const LINES: [(u64, f64, f64, f64, &str); 10] = [
    (1, 2.0, 4.0, 85.0, "Welcome, all of you, to the house on the hill."),
    (2, 7.0, 3.5, 80.0, "We came as soon as we heard the news."),
    (3, 11.0, 2.5, 90.0, "Is it true the letter was never sent?"),
    (1, 15.0, 4.0, 85.0, "It is. I found it in the drawer of this very table."),
    (2, 20.0, 3.0, 80.0, "Then someone here has been lying to us."),
    (3, 24.0, 2.5, 95.0, "Not me! I swear it was not me."),
    (1, 28.0, 4.0, 85.0, "Sit down, both of you. Let us hear it from the start."),
    (2, 33.0, 2.5, 75.0, "The start was the night of the storm."),
    (3, 36.0, 2.0, 90.0, "And the lights went out."),
    (1, 39.0, 3.0, 85.0, "Exactly. And when they came back, the letter was gone."),
];

/// (actor, time, x, y)
const KEYFRAMES: [(u64, f64, f64, f64); 15] = [
    (1, 0.0, 200.0, 120.0),
    (1, 8.0, 400.0, 220.0),
    (1, 20.0, 540.0, 180.0),
    (1, 28.0, 460.0, 220.0),
    (1, 42.0, 320.0, 120.0),
    (2, 0.0, 350.0, 200.0),
    (2, 10.0, 250.0, 300.0),
    (2, 20.0, 350.0, 240.0),
    (2, 30.0, 450.0, 140.0),
    (2, 42.0, 370.0, 260.0),
    (3, 0.0, 150.0, 250.0),
    (3, 10.0, 250.0, 350.0),
    (3, 20.0, 350.0, 250.0),
    (3, 30.0, 250.0, 150.0),
    (3, 42.0, 130.0, 190.0),
];

pub fn sample_actors() -> Vec<Actor> {
    vec![
        Actor::new(ActorId(1), "Lead", Point::new(200.0, 120.0), "#a8c090")
            .with_role("lead")
            .with_speed(1.2),
        Actor::new(ActorId(2), "Support A", Point::new(350.0, 200.0), "#81a1c1"),
        Actor::new(ActorId(3), "Support B", Point::new(150.0, 250.0), "#e6b17a").with_speed(0.8),
    ]
}

pub fn sample_props() -> Vec<StageElement> {
    vec![
        StageElement {
            id: "chair1".to_string(),
            kind: ElementKind::Prop,
            name: "Chair".to_string(),
            position: Point::new(400.0, 300.0),
            width: 40.0,
            height: 40.0,
            icon: "🪑".to_string(),
        },
        StageElement {
            id: "table1".to_string(),
            kind: ElementKind::Prop,
            name: "Table".to_string(),
            position: Point::new(300.0, 150.0),
            width: 60.0,
            height: 40.0,
            icon: "🪵".to_string(),
        },
    ]
}

pub fn sample_dialogues() -> Vec<Dialogue> {
    LINES
        .iter()
        .enumerate()
        .map(|(i, &(actor, start_time, duration, volume, content))| Dialogue {
            id: format!("d{}", i + 1),
            actor_id: ActorId(actor),
            content: content.to_string(),
            start_time,
            duration,
            emotion: None,
            volume: Some(volume),
        })
        .collect()
}

pub fn sample_keyframes() -> Vec<Keyframe> {
    KEYFRAMES
        .iter()
        .map(|&(actor, time, x, y)| Keyframe::new(ActorId(actor), time, x, y))
        .collect()
}

/// The sample stage: actors, props and their lines.
pub fn sample_document() -> StageDocument {
    let mut doc = StageDocument::new();
    *doc.actors_mut() = sample_actors();
    *doc.stage_elements_mut() = sample_props();
    *doc.dialogues_mut() = sample_dialogues();
    doc
}

/// The sample blocking for preview.
pub fn sample_script() -> PreviewScript {
    PreviewScript::new(sample_dialogues(), sample_keyframes(), SAMPLE_DURATION)
}
