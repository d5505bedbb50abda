//! METAR/TAF lookup service.
//!
//! Resolves aviation weather reports for a station code from an ordered list
//! of upstream sources, with request coalescing and an expiring cache, and
//! serves them over HTTP.

pub mod cache;
pub mod cli;
pub mod coalesce;
pub mod config;
pub mod decoder;
pub mod domain;
pub mod manager;
pub mod provider;
pub mod web;
