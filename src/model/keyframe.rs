//! Keyframes: sparse per-actor position samples over time.

use serde::{Deserialize, Serialize};

use super::{ActorId, Point};

/// A timestamped stage position for one actor.
///
/// Serialized as `{actorId, time, x, y}`, the layout shared by preview
/// scripts and merged exports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    pub actor_id: ActorId,
    /// Seconds from the start of the show
    pub time: f64,
    pub x: f64,
    pub y: f64,
}

impl Keyframe {
    pub fn new(actor_id: ActorId, time: f64, x: f64, y: f64) -> Self {
        Self { actor_id, time, x, y }
    }

    pub fn at(actor_id: ActorId, time: f64, position: Point) -> Self {
        Self::new(actor_id, time, position.x, position.y)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Stable sort by time. Keyframes with equal times keep their input order.
pub fn sort_by_time(keyframes: &mut [Keyframe]) {
    keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
}
