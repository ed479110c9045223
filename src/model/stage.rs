//! Static stage furniture: props, scenery and marked areas.

use serde::{Deserialize, Serialize};

use super::{Bounds, Point};
use crate::constants::{STAGE_HEIGHT, STAGE_WIDTH};

/// Kind of stage element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Prop,
    Scenery,
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Prop => "prop",
            ElementKind::Scenery => "scenery",
        }
    }
}

/// A prop or piece of scenery placed on the stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub name: String,
    /// Top-left corner
    #[serde(flatten)]
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub icon: String,
}

impl StageElement {
    /// Region the element's top-left corner may occupy while staying fully on stage.
    pub fn drag_bounds(&self) -> Bounds {
        Bounds::new(
            0.0,
            (STAGE_WIDTH - self.width).max(0.0),
            0.0,
            (STAGE_HEIGHT - self.height).max(0.0),
        )
    }
}

/// Purpose of a marked area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaKind {
    Performance,
    Stage,
    Backstage,
    Audience,
}

/// Minimum number of vertices for an area polygon.
pub const MIN_AREA_VERTICES: usize = 3;

/// A polygonal region of the stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AreaKind,
    pub points: Vec<Point>,
    pub color: String,
    pub opacity: f64,
}

impl Area {
    /// Check if a point is inside the area (ray casting).
    pub fn contains(&self, point: &Point) -> bool {
        if self.points.len() < MIN_AREA_VERTICES {
            return false;
        }

        let mut inside = false;
        let n = self.points.len();
        let mut j = n - 1;
        for i in 0..n {
            let vi = &self.points[i];
            let vj = &self.points[j];
            if ((vi.y > point.y) != (vj.y > point.y))
                && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}
