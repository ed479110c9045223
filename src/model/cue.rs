//! Time-bounded annotations on the show timeline.

use serde::{Deserialize, Serialize};

use super::{ActorId, Point};

/// Anything that occupies `[start_time, start_time + duration]` on the timeline.
pub trait TimedCue {
    fn start_time(&self) -> f64;

    fn duration(&self) -> f64;

    fn end_time(&self) -> f64 {
        self.start_time() + self.duration()
    }

    /// Inclusive on both ends.
    fn contains(&self, time: f64) -> bool {
        time >= self.start_time() && time <= self.end_time()
    }
}

macro_rules! impl_timed_cue {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TimedCue for $ty {
                fn start_time(&self) -> f64 {
                    self.start_time
                }

                fn duration(&self) -> f64 {
                    self.duration
                }
            }
        )*
    };
}

/// A spoken line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dialogue {
    pub id: String,
    pub actor_id: ActorId,
    pub content: String,
    pub start_time: f64,
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

/// Partial update for a dialogue line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialoguePatch {
    pub content: Option<String>,
    pub start_time: Option<f64>,
    pub duration: Option<f64>,
    pub emotion: Option<String>,
    pub volume: Option<f64>,
}

impl DialoguePatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply(&self, dialogue: &mut Dialogue) {
        if let Some(content) = &self.content {
            dialogue.content = content.clone();
        }
        if let Some(start) = self.start_time {
            dialogue.start_time = start;
        }
        if let Some(duration) = self.duration {
            dialogue.duration = duration;
        }
        if let Some(emotion) = &self.emotion {
            dialogue.emotion = Some(emotion.clone());
        }
        if let Some(volume) = self.volume {
            dialogue.volume = Some(volume);
        }
    }
}

/// A music cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicTrack {
    pub id: String,
    pub name: String,
    pub start_time: f64,
    pub duration: f64,
    /// 0-100
    pub volume: f64,
    /// Fade durations in seconds
    pub fade_in: f64,
    pub fade_out: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Fixture type of a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Spot,
    Flood,
    Wash,
    Follow,
}

impl LightKind {
    pub fn name(&self) -> &'static str {
        match self {
            LightKind::Spot => "Spot",
            LightKind::Flood => "Flood",
            LightKind::Wash => "Wash",
            LightKind::Follow => "Follow",
        }
    }
}

/// A lighting cue with a rig position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Light {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub position: Point,
    /// Beam direction in degrees, 0-360
    pub direction: f64,
    #[serde(rename = "type")]
    pub kind: LightKind,
    pub color: String,
    /// 0-100
    pub intensity: f64,
    pub beam_angle: f64,
    pub start_time: f64,
    pub duration: f64,
}

/// One drawn vertex of a movement path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    pub time: f64,
}

impl PathPoint {
    pub fn new(x: f64, y: f64, time: f64) -> Self {
        Self { x, y, time }
    }
}

/// How a movement path is traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    #[default]
    Linear,
    Curved,
    Bezier,
}

/// A planned actor movement along a drawn path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: String,
    pub actor_id: ActorId,
    pub name: String,
    pub start_time: f64,
    pub duration: f64,
    pub path: Vec<PathPoint>,
    pub speed: f64,
    #[serde(rename = "pathType", default)]
    pub path_kind: PathKind,
}

impl_timed_cue!(Dialogue, MusicTrack, Light, Movement);
