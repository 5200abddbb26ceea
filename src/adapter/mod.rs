//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - Driving side: the command-line interface
//! - [`outbound`] - Driven side: market sources and notifiers

pub mod inbound;
pub mod outbound;
