//! Arbwatch - prediction market arbitrage alerts.
//!
//! Polls a prediction-market listing on a fixed interval, keeps only open,
//! recent, non-blacklisted markets, computes how far each market's outcome
//! prices sum below $1, and notifies once per market the first time that
//! margin reaches a configurable threshold.
//!
//! # Architecture
//!
//! ```text
//! MarketSource ─▶ normalize ─▶ filter ─▶ margin ─▶ dedup ─▶ Notifier
//!      ▲                                                        │
//!      └──────────────── RefreshLoop (tokio interval) ──────────┘
//! ```
//!
//! # Modules
//!
//! - [`domain`] - Market records, filter rules, margin math, alert state
//! - [`port`] - `MarketSource` and `Notifier` traits
//! - [`application`] - Normalizer, pipeline, refresh loop, sample data
//! - [`adapter`] - Gamma API client, Telegram notifier, CLI
//! - [`infrastructure`] - Configuration, logging and wiring
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `telegram` (default) - Deliver alerts through a Telegram bot
//! - `testkit` - Expose test doubles to integration tests

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
