pub mod api;
pub mod config;
pub mod errors;
pub mod phase;
pub mod session;
pub mod ui;
