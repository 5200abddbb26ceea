//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the two external collaborators of a refresh
//! cycle: the market data source and the notification sink.

pub mod notifier;
pub mod source;
