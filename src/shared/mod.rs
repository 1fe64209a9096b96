//! Controller state and messaging
//!
//! The overlay controller owns an explicit state record and is driven by
//! commands sent over a channel.

pub mod messages;
pub mod state;

pub use messages::OverlayCommand;
pub use state::{OverlayPhase, OverlayState};
