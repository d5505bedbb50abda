//! Report lookup manager.
//!
//! One [`Manager`] serves one report kind. A lookup goes through three
//! stages: the expiring cache, a coalesced upstream resolution walking the
//! configured sources in order, and normalisation of the report text.
//! Results, positive or negative, are cached until the next publication
//! boundary.

mod config;
mod error;
mod normalize;
mod query;
mod schedule;


pub use config::{DEFAULT_BATCH_LIMIT, ManagerConfig};
pub use error::QueryError;
pub use normalize::normalize;
pub use query::{Lookup, Manager};
pub use schedule::next_refresh;
