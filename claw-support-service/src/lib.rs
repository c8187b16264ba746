pub mod config;
pub mod line;
pub mod service;
pub mod sheets;

pub use config::{Config, LogFormat};
pub use line::{LineClient, TextEvent, verify_signature};
pub use service::{AppState, build_app_state, build_router, process_events, spawn_session_sweeper};
pub use sheets::AppsScriptSink;
