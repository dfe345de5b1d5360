//! Web layer for the fuel price tracker.
//!
//! JSON endpoints for browsing districts, choosing cities to track and
//! reading the latest prices the coordinators hold.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
