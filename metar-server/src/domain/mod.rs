//! Domain types for the weather report service.
//!
//! Station codes are validated at construction, so code that receives a
//! `StationCode` can substitute it into an upstream URL without further checks.

mod report;
mod station;

pub use report::ReportKind;
pub use station::{InvalidStationCode, StationCode};
