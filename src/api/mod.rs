//! REST + SSE front-end for the dashboard

pub mod handlers;
mod shell;

pub use handlers::{router, AppState};
