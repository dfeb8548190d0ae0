//! Core pipeline for scraping a channel's admin deletion log.
//!
//! This crate is intentionally transport-agnostic. The Telegram client lives
//! behind the [`ports::TransportClient`] port; adapters (live session, replay
//! dump) are separate crates. What lives here is the part worth reusing: the
//! bounded-concurrency batch enrichment pipeline that turns raw deletion
//! events into records with resolved sender/admin identities.

pub mod cache;
pub mod config;
pub mod domain;
pub mod enrich;
pub mod errors;
pub mod logging;
pub mod ports;
pub mod process;
pub mod ratelimit;
pub mod report;
pub mod resolve;
pub mod scrape;

pub use errors::{Error, Result};
