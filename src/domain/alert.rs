//! Session-scoped alert deduplication.
//!
//! Each market key is either unnotified (absent from [`AlertState`]) or
//! notified. With the default [`AlertOnce`] policy the transition to notified
//! fires at most once per session: a market whose margin dips below the
//! threshold and recovers does not alert again. [`RearmBelowThreshold`] is the
//! alternative that re-arms a key after a dip.
//!
//! Keys are market slugs. Distinct markets sharing an empty slug collapse into
//! one dedup slot.

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;

use super::market::ProcessedMarket;

/// Keys that have already produced a notification this session.
///
/// Insert-only: a key never leaves the set once added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertState {
    notified: HashSet<String>,
}

impl AlertState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_notified(&self, key: &str) -> bool {
        self.notified.contains(key)
    }

    /// Record `key` as notified. Returns `true` only on first insertion.
    pub fn mark_notified(&mut self, key: &str) -> bool {
        if self.notified.contains(key) {
            return false;
        }
        self.notified.insert(key.to_string())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notified.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notified.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.notified.iter().map(String::as_str)
    }
}

/// Decides when a key that crossed the threshold should notify.
///
/// Called once per admitted market per cycle. Returning `true` means the
/// caller must send a notification; the policy has already recorded it, so
/// a failed delivery never causes a repeat.
pub trait DedupPolicy: Send + Sync + fmt::Debug {
    fn observe(&mut self, key: &str, margin: f64, threshold: f64) -> bool;

    /// Policy name for logging.
    fn name(&self) -> &'static str;

    /// Number of keys currently suppressed.
    fn suppressed(&self) -> usize;
}

/// Alert the first time a key reaches the threshold, never again this session.
#[derive(Debug, Default)]
pub struct AlertOnce {
    state: AlertState,
}

impl AlertOnce {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &AlertState {
        &self.state
    }
}

impl DedupPolicy for AlertOnce {
    fn observe(&mut self, key: &str, margin: f64, threshold: f64) -> bool {
        margin >= threshold && self.state.mark_notified(key)
    }

    fn name(&self) -> &'static str {
        "once"
    }

    fn suppressed(&self) -> usize {
        self.state.len()
    }
}

/// Alert when a key reaches the threshold, re-arming once it falls below.
#[derive(Debug, Default)]
pub struct RearmBelowThreshold {
    latched: HashSet<String>,
}

impl RearmBelowThreshold {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DedupPolicy for RearmBelowThreshold {
    fn observe(&mut self, key: &str, margin: f64, threshold: f64) -> bool {
        if margin >= threshold {
            return self.latched.insert(key.to_string());
        }
        self.latched.remove(key);
        false
    }

    fn name(&self) -> &'static str {
        "rearm"
    }

    fn suppressed(&self) -> usize {
        self.latched.len()
    }
}

/// Configurable choice of [`DedupPolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicyKind {
    #[default]
    Once,
    Rearm,
}

impl DedupPolicyKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Rearm => "rearm",
        }
    }

    #[must_use]
    pub fn build(self) -> Box<dyn DedupPolicy> {
        match self {
            Self::Once => Box::new(AlertOnce::new()),
            Self::Rearm => Box::new(RearmBelowThreshold::new()),
        }
    }
}

/// Applies a threshold and a [`DedupPolicy`] to processed markets.
#[derive(Debug)]
pub struct AlertDeduplicator {
    threshold: f64,
    policy: Box<dyn DedupPolicy>,
}

impl AlertDeduplicator {
    #[must_use]
    pub fn new(threshold: f64, policy: Box<dyn DedupPolicy>) -> Self {
        Self { threshold, policy }
    }

    /// Deduplicator with the session-wide alert-once policy.
    #[must_use]
    pub fn alert_once(threshold: f64) -> Self {
        Self::new(threshold, Box::new(AlertOnce::new()))
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn policy(&self) -> &dyn DedupPolicy {
        self.policy.as_ref()
    }

    /// Returns `true` when `market` should notify now.
    pub fn observe(&mut self, market: &ProcessedMarket) -> bool {
        self.policy
            .observe(&market.key, market.profit_margin, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_state_insertion_is_idempotent() {
        let mut state = AlertState::new();
        assert!(state.mark_notified("btc"));
        assert!(!state.mark_notified("btc"));
        assert!(state.is_notified("btc"));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn alert_once_fires_on_first_crossing_only() {
        let mut policy = AlertOnce::new();
        assert!(!policy.observe("btc", 0.02, 0.05));
        assert!(policy.observe("btc", 0.07, 0.05));
        assert!(!policy.observe("btc", 0.07, 0.05));
        assert_eq!(policy.suppressed(), 1);
    }

    #[test]
    fn alert_once_does_not_rearm_after_dip() {
        let mut policy = AlertOnce::new();
        assert!(policy.observe("btc", 0.07, 0.05));
        assert!(!policy.observe("btc", 0.02, 0.05));
        assert!(!policy.observe("btc", 0.07, 0.05));
        assert!(policy.state().is_notified("btc"));
    }

    #[test]
    fn alert_once_threshold_is_inclusive() {
        let mut policy = AlertOnce::new();
        assert!(policy.observe("eth", 0.05, 0.05));
    }

    #[test]
    fn empty_keys_share_one_slot() {
        let mut policy = AlertOnce::new();
        assert!(policy.observe("", 0.10, 0.05));
        assert!(!policy.observe("", 0.20, 0.05));
        assert_eq!(policy.suppressed(), 1);
    }

    #[test]
    fn rearm_policy_fires_again_after_dip() {
        let mut policy = RearmBelowThreshold::new();
        assert!(policy.observe("btc", 0.07, 0.05));
        assert!(!policy.observe("btc", 0.08, 0.05));
        assert!(!policy.observe("btc", 0.02, 0.05));
        assert!(policy.observe("btc", 0.07, 0.05));
    }

    #[test]
    fn policy_kind_builds_matching_policy() {
        assert_eq!(DedupPolicyKind::Once.build().name(), "once");
        assert_eq!(DedupPolicyKind::Rearm.build().name(), "rearm");
        assert_eq!(DedupPolicyKind::default(), DedupPolicyKind::Once);
    }
}
