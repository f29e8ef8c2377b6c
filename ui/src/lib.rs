//! The guest, wall and admin screens, independent of how they are drawn.
//!
//! Each screen owns its state and exposes it as plain data; a renderer reads
//! [`WallScreen::changes`] or [`AdminScreen::changes`] and redraws on every
//! update.

pub mod components;

pub use components::admin_view::{AdminScreen, ClearConfirmation, ModerationQueue};
pub use components::app::App;
pub use components::guest_view::GuestScreen;
pub use components::shared_state::{Board, FeedStatus, LiveBoard};
pub use components::wall_view::{WallBoard, WallScreen};
