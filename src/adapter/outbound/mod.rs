//! Outbound adapters (driven side): concrete market sources and notifiers.

pub mod notifier;
pub mod polymarket;
