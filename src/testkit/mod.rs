//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for raw market records and pipeline settings.
//! - [`notifier`] - Recording and failing [`Notifier`](crate::port::Notifier) doubles.
//! - [`source`] - Scripted [`MarketSource`](crate::port::MarketSource) doubles.

pub mod domain;
pub mod notifier;
pub mod source;
