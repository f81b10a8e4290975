//! Per-frame perceptual state machine: eye identity, blink classification,
//! and their mapping to pointer actions.

pub mod actions;
pub mod combined;
pub mod config;
pub mod debounce;
pub mod landmarks;
pub mod motion;
pub mod resolver;
pub mod session;
pub mod timer;
pub mod types;
pub mod window;

pub use config::{ClickMode, TrackingConfig};
pub use session::{FrameSnapshot, TickOutcome, TrackingSession};
