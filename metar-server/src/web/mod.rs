//! Web layer: the report lookup API.
//!
//! Provides `/api/v1/metar` and `/api/v1/taf`, answering with a JSON envelope
//! or, on request, raw `<pre>` blocks.

mod dto;
mod limit;
mod routes;
mod state;
pub mod templates;

pub use dto::{ApiResponse, ApiStatus, ReportQuery};
pub use limit::{KeyedLimiter, RATE_LIMIT_WINDOW};
pub use routes::{AppError, create_router};
pub use state::AppState;
