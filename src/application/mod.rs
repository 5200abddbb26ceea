//! Application services: the refresh cycle and the loop that drives it.
//!
//! Data flows strictly one way within a cycle:
//!
//! ```text
//! MarketSource → normalizer → FilterRules → profit_margin → AlertDeduplicator → Notifier
//! ```

pub mod normalizer;
pub mod pipeline;
pub mod refresh;
pub mod sample;

pub use pipeline::{
    AlertOutcome, DeliveryFailure, NormalizationFailure, Pipeline, PipelineConfig, ProcessedBatch,
    Rejection,
};
pub use refresh::{CycleReport, RefreshConfig, RefreshLoop};
