pub mod api;
pub mod config;
pub mod error;
mod main_lib;

pub use main_lib::{build_memory_state, build_state, init_tracing, AppState};
