pub mod app;
pub mod drag;
pub mod handlers;
pub mod ui;
