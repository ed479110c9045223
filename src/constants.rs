//! Global constants for the stagehand editor

use std::time::Duration;

use crate::model::Point;

/// Position used for an actor that has no keyframes at all
pub const DEFAULT_ACTOR_POSITION: Point = Point { x: 200.0, y: 200.0 };

/// Wall-clock interval between playback ticks; at 1x each tick advances
/// virtual time by the same amount
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Slowest selectable playback speed
pub const MIN_PLAYBACK_SPEED: f64 = 0.25;

/// Fastest selectable playback speed
pub const MAX_PLAYBACK_SPEED: f64 = 2.0;

/// Maximum number of undo snapshots kept
pub const MAX_HISTORY_DEPTH: usize = 50;

/// Minimum time between automatic suggestion refreshes
pub const SUGGESTION_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Longest configurable suggestion refresh interval, in seconds
pub const MAX_SUGGESTION_REFRESH_SECS: u64 = 3600;

/// Stage canvas size in pixels
pub const STAGE_WIDTH: f64 = 800.0;
pub const STAGE_HEIGHT: f64 = 500.0;

/// Actor markers stay this far inside the stage edge
pub const ACTOR_MIN_X: f64 = 20.0;
pub const ACTOR_MAX_X: f64 = 730.0;
pub const ACTOR_MIN_Y: f64 = 20.0;
pub const ACTOR_MAX_Y: f64 = 430.0;

/// Lights may be rigged off-stage
pub const LIGHT_MIN_X: f64 = -100.0;
pub const LIGHT_MAX_X: f64 = 900.0;
pub const LIGHT_MIN_Y: f64 = -100.0;
pub const LIGHT_MAX_Y: f64 = 600.0;

/// Where newly added actors and elements are placed
pub const SPAWN_POSITION: Point = Point { x: 400.0, y: 250.0 };

/// Timeline scale
pub const TIMELINE_PX_PER_SECOND: f64 = 10.0;
