//! Data models for the stage editor.

mod actor;
mod cue;
mod document;
mod geometry;
mod keyframe;
mod stage;

pub use actor::{Actor, ActorId, ActorPatch};
pub use cue::{
    Dialogue, DialoguePatch, Light, LightKind, Movement, MusicTrack, PathKind, PathPoint,
    TimedCue,
};
pub use document::StageDocument;
pub(crate) use document::remove_by;
pub use geometry::{Bounds, Point};
pub use keyframe::{Keyframe, sort_by_time};
pub use stage::{Area, AreaKind, ElementKind, MIN_AREA_VERTICES, StageElement};
