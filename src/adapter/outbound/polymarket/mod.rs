//! Polymarket market source.
//!
//! Reads the public Gamma market listing; no authentication required.

pub mod client;
pub mod settings;

pub use client::GammaClient;
pub use settings::GammaConfig;
