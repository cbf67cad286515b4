//! Web layer for the departure board.
//!
//! Serves the latest board as JSON and accepts new watches.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
