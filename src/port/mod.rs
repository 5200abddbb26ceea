//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!   ┌─────────────┐     ┌──────────────────────┐     ┌───────────┐
//!   │ MarketSource│ ──▶ │ normalize → filter → │ ──▶ │ Notifier  │
//!   │   Adapter   │     │ margin → dedup       │     │  Adapter  │
//!   └─────────────┘     └──────────────────────┘     └───────────┘
//! ```
//!
//! - [`MarketSource`] - Raw market records (Gamma API, fixtures)
//! - [`Notifier`] - Alert delivery (Telegram, logging)

pub mod outbound;

pub use outbound::notifier::{LogNotifier, Notifier, NotifierRegistry, NullNotifier};
pub use outbound::source::MarketSource;
