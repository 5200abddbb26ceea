//! Eligibility rules for normalized market snapshots.
//!
//! Rules run in a fixed order and stop at the first rejection:
//!
//! 1. status must be `open` ([`RejectReason::NotOpen`])
//! 2. at least one outcome price ([`RejectReason::NoPrices`])
//! 3. question free of blacklisted tokens ([`RejectReason::Blacklisted`])
//! 4. created no earlier than the cutoff year ([`RejectReason::TooOld`])
//!
//! Each rule is independent, so the order only affects which reason is
//! reported, never whether a market is admitted.

use std::fmt;

use chrono::Datelike;
use serde::Serialize;

use super::market::MarketSnapshot;

/// Why a snapshot was kept out of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NotOpen,
    NoPrices,
    Blacklisted,
    TooOld,
}

impl RejectReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotOpen => "not_open",
            Self::NoPrices => "no_prices",
            Self::Blacklisted => "blacklisted",
            Self::TooOld => "too_old",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for a single snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Admit,
    Reject(RejectReason),
}

impl FilterDecision {
    #[must_use]
    pub const fn is_admit(self) -> bool {
        matches!(self, Self::Admit)
    }
}

/// Configured filter pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRules {
    /// Lowercased blacklist tokens matched against the question.
    blacklist: Vec<String>,
    /// Oldest creation year still admitted.
    min_year: i32,
}

impl FilterRules {
    /// Build rules from raw blacklist tokens and a cutoff year.
    ///
    /// Tokens are compared case-insensitively; blank tokens are dropped since
    /// they would match every question.
    #[must_use]
    pub fn new<I, S>(blacklist: I, min_year: i32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let blacklist = blacklist
            .into_iter()
            .map(|token| token.as_ref().trim().to_lowercase())
            .filter(|token| !token.is_empty())
            .collect();

        Self {
            blacklist,
            min_year,
        }
    }

    #[must_use]
    pub fn min_year(&self) -> i32 {
        self.min_year
    }

    #[must_use]
    pub fn blacklist(&self) -> &[String] {
        &self.blacklist
    }

    /// Run every rule in order, short-circuiting on the first rejection.
    #[must_use]
    pub fn evaluate(&self, snapshot: &MarketSnapshot) -> FilterDecision {
        if !snapshot.is_open() {
            return FilterDecision::Reject(RejectReason::NotOpen);
        }
        if snapshot.outcome_prices.is_empty() {
            return FilterDecision::Reject(RejectReason::NoPrices);
        }
        if self.is_blacklisted(&snapshot.question) {
            return FilterDecision::Reject(RejectReason::Blacklisted);
        }
        if let Some(created_at) = snapshot.created_at {
            if created_at.year() < self.min_year {
                return FilterDecision::Reject(RejectReason::TooOld);
            }
        }
        FilterDecision::Admit
    }

    fn is_blacklisted(&self, question: &str) -> bool {
        if self.blacklist.is_empty() {
            return false;
        }
        let question = question.to_lowercase();
        self.blacklist
            .iter()
            .any(|token| question.contains(token.as_str()))
    }
}
