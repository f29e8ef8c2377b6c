pub mod api;
pub mod error;
pub mod guest;
pub mod identity;
pub mod message;
pub mod navigation;
pub mod room;
pub mod view;

/// Room every screen joins unless configured otherwise.
pub const DEFAULT_ROOM: &str = "christmas-wall-v2";
