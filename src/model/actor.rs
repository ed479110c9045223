//! Actor data model.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Point;

/// Unique identifier for an actor.
///
/// Keyframes and cues refer to actors by this id, so it stays stable across
/// undo/redo and is never reused within an editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A performer on the stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    /// Current edit-mode position
    #[serde(flatten)]
    pub position: Point,
    /// Marker color as a CSS hex string
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Walking speed multiplier
    #[serde(default = "default_speed")]
    pub speed: f64,
}

fn default_speed() -> f64 {
    1.0
}

impl Actor {
    pub fn new(id: ActorId, name: impl Into<String>, position: Point, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            color: color.into(),
            role: None,
            speed: default_speed(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }
}

/// Partial update for an actor's editable properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub role: Option<String>,
    pub speed: Option<f64>,
}

impl ActorPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.role.is_none() && self.speed.is_none()
    }

    /// Apply the patch in place.
    pub fn apply(&self, actor: &mut Actor) {
        if let Some(name) = &self.name {
            actor.name = name.clone();
        }
        if let Some(color) = &self.color {
            actor.color = color.clone();
        }
        if let Some(role) = &self.role {
            actor.role = Some(role.clone());
        }
        if let Some(speed) = self.speed {
            actor.speed = speed;
        }
    }
}
