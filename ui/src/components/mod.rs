pub mod admin_view;
pub mod app;
pub mod guest_view;
pub mod shared_state;
pub mod wall_view;
