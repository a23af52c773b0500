pub mod history;
pub mod models;
pub mod palette;
pub mod session;
