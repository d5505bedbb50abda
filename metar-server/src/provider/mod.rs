//! Upstream report sources.
//!
//! A [`Provider`] wraps one configured endpoint: it fetches the body over
//! HTTP and hands it to the configured decoder. The manager only depends on
//! the [`ReportSource`] trait, so tests can substitute scripted sources.

mod client;
mod error;
mod source;

pub use client::Provider;
pub use error::ProviderError;
pub use source::ReportSource;
