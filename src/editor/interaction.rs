//! Pointer interaction state.

use std::time::Duration;

use crate::constants::{
    ACTOR_MAX_X, ACTOR_MAX_Y, ACTOR_MIN_X, ACTOR_MIN_Y, LIGHT_MAX_X, LIGHT_MAX_Y, LIGHT_MIN_X,
    LIGHT_MIN_Y,
};
use crate::model::{ActorId, Bounds, MIN_AREA_VERTICES, PathPoint, Point};

/// Region an actor marker may be dragged within.
pub const ACTOR_BOUNDS: Bounds = Bounds::new(ACTOR_MIN_X, ACTOR_MAX_X, ACTOR_MIN_Y, ACTOR_MAX_Y);

/// Region a light may be rigged within, including off-stage.
pub const LIGHT_BOUNDS: Bounds = Bounds::new(LIGHT_MIN_X, LIGHT_MAX_X, LIGHT_MIN_Y, LIGHT_MAX_Y);

/// Minimum number of points for a movement path.
pub const MIN_PATH_POINTS: usize = 2;

/// What the pointer went down on.
#[derive(Debug, Clone, PartialEq)]
pub enum DragTarget {
    Actor(ActorId),
    Element(String),
    Light(String),
}

/// Drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Path,
    Area,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Path => "path",
            Tool::Area => "area",
        }
    }
}

/// State of a drag in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    /// Pointer position minus item position at press time
    pub grab_offset: Point,
    /// Item position when the drag started
    pub origin: Point,
    /// Item position now
    pub current: Point,
}

impl Drag {
    pub fn new(pointer: Point, item: Point) -> Self {
        Self {
            grab_offset: Point::new(pointer.x - item.x, pointer.y - item.y),
            origin: item,
            current: item,
        }
    }

    /// Move so the grab point follows `pointer`, staying inside `bounds`.
    pub fn follow(&mut self, pointer: Point, bounds: &Bounds) -> Point {
        self.current =
            Point::new(pointer.x - self.grab_offset.x, pointer.y - self.grab_offset.y)
                .clamped(bounds);
        self.current
    }

    pub fn moved(&self) -> bool {
        self.current != self.origin
    }
}

/// The single current pointer mode of the editor.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionMode {
    /// Nothing in progress
    #[default]
    Idle,
    /// Dragging an actor marker. In preview the drag only moves the marker
    /// and release inserts a keyframe.
    DraggingActor {
        id: ActorId,
        drag: Drag,
        in_preview: bool,
    },
    DraggingElement { id: String, drag: Drag },
    DraggingLight { id: String, drag: Drag },
    /// Collecting path points for the selected actor
    DrawingPath {
        actor: ActorId,
        points: Vec<PathPoint>,
        /// Clock reading when drawing began; point times are relative to it
        started: Duration,
    },
    /// Collecting polygon vertices for a new area
    DrawingArea { points: Vec<Point> },
}

impl InteractionMode {
    pub fn is_dragging(&self) -> bool {
        matches!(
            self,
            InteractionMode::DraggingActor { .. }
                | InteractionMode::DraggingElement { .. }
                | InteractionMode::DraggingLight { .. }
        )
    }

    pub fn is_drawing(&self) -> bool {
        matches!(
            self,
            InteractionMode::DrawingPath { .. } | InteractionMode::DrawingArea { .. }
        )
    }

    /// The tool being drawn with, if any.
    pub fn active_tool(&self) -> Option<Tool> {
        match self {
            InteractionMode::DrawingPath { .. } => Some(Tool::Path),
            InteractionMode::DrawingArea { .. } => Some(Tool::Area),
            _ => None,
        }
    }

    /// Whether the collected points are enough to finish the drawing.
    pub fn drawing_complete(&self) -> bool {
        match self {
            InteractionMode::DrawingPath { points, .. } => points.len() >= MIN_PATH_POINTS,
            InteractionMode::DrawingArea { points } => points.len() >= MIN_AREA_VERTICES,
            _ => false,
        }
    }
}
