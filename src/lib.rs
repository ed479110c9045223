//! stagehand - stage rehearsal editor core
//!
//! Actors, props, lights and cues on a 2D stage, a keyframed preview that
//! plays the blocking back on a virtual clock, keyframes inserted by dragging
//! while paused, and a capped undo/redo history of the whole stage.
//!
//! Everything is driven through [`editor::StageEditor::update`] with
//! [`message::Message`] values; time comes from an injected
//! [`stagehand_time::Clock`], so the core runs the same natively, in the
//! browser and under test.

pub mod config;
pub mod constants;
pub mod editor;
pub mod format;
pub mod history;
pub mod interpolate;
pub mod keybindings;
pub mod message;
pub mod model;
pub mod playback;
pub mod preview;
pub mod sample;
pub mod services;
pub mod timeline;

#[cfg(not(target_arch = "wasm32"))]
pub mod native;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
