//! Form input for creating stage items.
//!
//! Each form mirrors a creation dialog: required fields are plain values,
//! optional ones fall back to the dialog defaults. `validate` checks every
//! field before anything is built, so a rejected form never touches the
//! document.

use thiserror::Error;

use crate::constants::SPAWN_POSITION;
use crate::model::{
    Actor, ActorId, ActorPatch, Area, AreaKind, Dialogue, DialoguePatch, ElementKind, Light,
    LightKind, Movement, MusicTrack, PathKind, PathPoint, Point, StageElement,
};

/// A form field was missing or out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("missing required field: {field}")]
    Missing { field: &'static str },

    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl FormError {
    pub fn missing(field: &'static str) -> Self {
        Self::Missing { field }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Field checks
// ============================================================================

fn require_text(field: &'static str, value: &str) -> Result<String, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FormError::missing(field));
    }
    Ok(trimmed.to_string())
}

fn finite(field: &'static str, value: f64) -> Result<f64, FormError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormError::invalid(field, "must be a number"))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, FormError> {
    let value = finite(field, value)?;
    if value < 0.0 {
        return Err(FormError::invalid(field, "must not be negative"));
    }
    Ok(value)
}

fn positive(field: &'static str, value: f64) -> Result<f64, FormError> {
    let value = finite(field, value)?;
    if value <= 0.0 {
        return Err(FormError::invalid(field, "must be greater than zero"));
    }
    Ok(value)
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, FormError> {
    let value = finite(field, value)?;
    if !(min..=max).contains(&value) {
        return Err(FormError::invalid(field, format!("must be between {min} and {max}")));
    }
    Ok(value)
}

/// Accepts `#rgb` and `#rrggbb`.
fn color(field: &'static str, value: &str) -> Result<String, FormError> {
    let value = value.trim();
    let digits = value
        .strip_prefix('#')
        .ok_or_else(|| FormError::invalid(field, "must start with '#'"))?;
    let valid = matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(FormError::invalid(field, format!("'{value}' is not a hex color")));
    }
    Ok(value.to_string())
}

fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Actor
// ============================================================================

pub const DEFAULT_ACTOR_COLOR: &str = "#a8c090";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorForm {
    pub name: String,
    pub color: Option<String>,
    pub role: Option<String>,
    pub speed: Option<f64>,
}

impl ActorForm {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build an actor placed at the spawn point.
    pub fn validate(&self, id: ActorId) -> Result<Actor, FormError> {
        let name = require_text("name", &self.name)?;
        let color = color("color", self.color.as_deref().unwrap_or(DEFAULT_ACTOR_COLOR))?;
        let speed = positive("speed", self.speed.unwrap_or(1.0))?;
        let mut actor = Actor::new(id, name, SPAWN_POSITION, color).with_speed(speed);
        actor.role = optional_text(&self.role);
        Ok(actor)
    }
}

/// Check an actor property edit before applying it.
pub fn validate_actor_patch(patch: &ActorPatch) -> Result<(), FormError> {
    if let Some(name) = &patch.name {
        require_text("name", name)?;
    }
    if let Some(value) = &patch.color {
        color("color", value)?;
    }
    if let Some(speed) = patch.speed {
        positive("speed", speed)?;
    }
    Ok(())
}

// ============================================================================
// Stage element
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ElementForm {
    pub kind: ElementKind,
    pub name: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub icon: Option<String>,
}

impl ElementForm {
    pub fn new(kind: ElementKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            width: None,
            height: None,
            icon: None,
        }
    }

    pub fn validate(&self, id: String) -> Result<StageElement, FormError> {
        Ok(StageElement {
            id,
            kind: self.kind,
            name: require_text("name", &self.name)?,
            position: SPAWN_POSITION,
            width: positive("width", self.width.unwrap_or(40.0))?,
            height: positive("height", self.height.unwrap_or(40.0))?,
            icon: optional_text(&self.icon).unwrap_or_else(|| "📦".to_string()),
        })
    }
}

// ============================================================================
// Light
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LightForm {
    pub name: String,
    pub kind: LightKind,
    pub position: Option<Point>,
    pub direction: Option<f64>,
    pub color: Option<String>,
    pub intensity: Option<f64>,
    pub beam_angle: Option<f64>,
    pub start_time: Option<f64>,
    pub duration: Option<f64>,
}

impl LightForm {
    pub fn new(name: impl Into<String>, kind: LightKind) -> Self {
        Self {
            name: name.into(),
            kind,
            position: None,
            direction: None,
            color: None,
            intensity: None,
            beam_angle: None,
            start_time: None,
            duration: None,
        }
    }

    pub fn validate(&self, id: String) -> Result<Light, FormError> {
        let position = self.position.unwrap_or(Point::new(400.0, 100.0));
        Ok(Light {
            id,
            name: require_text("name", &self.name)?,
            position: Point::new(finite("x", position.x)?, finite("y", position.y)?),
            direction: in_range("direction", self.direction.unwrap_or(0.0), 0.0, 360.0)?,
            kind: self.kind,
            color: color("color", self.color.as_deref().unwrap_or("#FFFFFF"))?,
            intensity: in_range("intensity", self.intensity.unwrap_or(100.0), 0.0, 100.0)?,
            beam_angle: in_range("beam angle", self.beam_angle.unwrap_or(30.0), 1.0, 180.0)?,
            start_time: non_negative("start time", self.start_time.unwrap_or(0.0))?,
            duration: positive("duration", self.duration.unwrap_or(10.0))?,
        })
    }
}

// ============================================================================
// Music
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MusicForm {
    pub name: String,
    pub start_time: Option<f64>,
    pub duration: Option<f64>,
    pub volume: Option<f64>,
    pub fade_in: Option<f64>,
    pub fade_out: Option<f64>,
    pub file: Option<String>,
}

impl MusicForm {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self, id: String) -> Result<MusicTrack, FormError> {
        let duration = positive("duration", self.duration.unwrap_or(30.0))?;
        let fade_in = non_negative("fade in", self.fade_in.unwrap_or(0.0))?;
        let fade_out = non_negative("fade out", self.fade_out.unwrap_or(0.0))?;
        if fade_in + fade_out > duration {
            return Err(FormError::invalid("fade in", "fades are longer than the track"));
        }
        Ok(MusicTrack {
            id,
            name: require_text("name", &self.name)?,
            start_time: non_negative("start time", self.start_time.unwrap_or(0.0))?,
            duration,
            volume: in_range("volume", self.volume.unwrap_or(80.0), 0.0, 100.0)?,
            fade_in,
            fade_out,
            file: optional_text(&self.file),
        })
    }
}

// ============================================================================
// Dialogue
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogueForm {
    pub content: String,
    pub start_time: Option<f64>,
    pub duration: Option<f64>,
    pub emotion: Option<String>,
    pub volume: Option<f64>,
}

impl DialogueForm {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self, id: String, actor: ActorId) -> Result<Dialogue, FormError> {
        Ok(Dialogue {
            id,
            actor_id: actor,
            content: require_text("content", &self.content)?,
            start_time: non_negative("start time", self.start_time.unwrap_or(0.0))?,
            duration: positive("duration", self.duration.unwrap_or(5.0))?,
            emotion: optional_text(&self.emotion),
            volume: Some(in_range("volume", self.volume.unwrap_or(80.0), 0.0, 100.0)?),
        })
    }
}

/// Check a dialogue edit before applying it.
pub fn validate_dialogue_patch(patch: &DialoguePatch) -> Result<(), FormError> {
    if let Some(content) = &patch.content {
        require_text("content", content)?;
    }
    if let Some(start) = patch.start_time {
        non_negative("start time", start)?;
    }
    if let Some(duration) = patch.duration {
        positive("duration", duration)?;
    }
    if let Some(volume) = patch.volume {
        in_range("volume", volume, 0.0, 100.0)?;
    }
    Ok(())
}

// ============================================================================
// Movement
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementForm {
    /// Defaults to "<actor name> movement"
    pub name: Option<String>,
    pub start_time: Option<f64>,
    pub duration: Option<f64>,
    pub speed: Option<f64>,
    pub path_kind: PathKind,
}

impl MovementForm {
    pub fn validate(
        &self,
        id: String,
        actor: &Actor,
        path: Vec<PathPoint>,
    ) -> Result<Movement, FormError> {
        let name =
            optional_text(&self.name).unwrap_or_else(|| format!("{} movement", actor.name));
        Ok(Movement {
            id,
            actor_id: actor.id,
            name,
            start_time: non_negative("start time", self.start_time.unwrap_or(0.0))?,
            duration: positive("duration", self.duration.unwrap_or(5.0))?,
            path,
            speed: positive("speed", self.speed.unwrap_or(1.0))?,
            path_kind: self.path_kind,
        })
    }
}

// ============================================================================
// Area
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AreaForm {
    pub name: String,
    pub kind: AreaKind,
    pub color: Option<String>,
    pub opacity: Option<f64>,
}

impl AreaForm {
    pub fn new(name: impl Into<String>, kind: AreaKind) -> Self {
        Self {
            name: name.into(),
            kind,
            color: None,
            opacity: None,
        }
    }

    pub fn validate(&self, id: String, points: Vec<Point>) -> Result<Area, FormError> {
        Ok(Area {
            id,
            name: require_text("name", &self.name)?,
            kind: self.kind,
            points,
            color: color("color", self.color.as_deref().unwrap_or(DEFAULT_ACTOR_COLOR))?,
            opacity: in_range("opacity", self.opacity.unwrap_or(0.3), 0.0, 1.0)?,
        })
    }
}
