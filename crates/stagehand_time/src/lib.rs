//! Time primitives for the stagehand editor.
//!
//! - [`Clock`]: injectable monotonic time source ([`SystemClock`] in production,
//!   [`ManualClock`] in tests and headless runs).
//! - [`Ticker`]: a single-slot repeating timer. Starting it always replaces the
//!   previous timer, so two timers can never advance the same playback.
//! - [`Throttle`]: minimum interval gate for rate-limited refreshes.
//!
//! None of these spawn threads or register callbacks. The host loop asks them
//! what happened since the last poll.

mod clock;
mod throttle;
mod ticker;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock, unix_millis};
pub use throttle::Throttle;
pub use ticker::{Ticker, TimerId};
