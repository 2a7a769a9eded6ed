//! HTTP surface over the tracker services.
//!
//! Handlers accept urlencoded forms and answer with JSON view models. A
//! successful mutation answers `303 See Other`; a rejected form answers 200
//! with the echoed form and its errors.

mod error;
mod forms;
mod handlers;
mod router;
mod session;
mod state;

pub use error::WebError;
pub use router::build_router;
pub use session::{Actor, SESSION_COOKIE};
pub use state::AppState;
