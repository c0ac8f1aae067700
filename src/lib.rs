pub mod actions;
pub mod app;
pub mod backend;
pub mod chart;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod page;
pub mod render;
pub mod state;
pub mod ui;

pub use app::router;
pub use backend::{Backend, HttpBackend};
pub use config::Config;
pub use state::AppState;
