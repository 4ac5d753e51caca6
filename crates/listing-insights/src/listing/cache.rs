use chrono::{DateTime, Utc};

use super::report::{PaymentReport, ResolvedTerms};
use super::sources::ListingId;
use crate::walkability::WalkabilityScore;

/// Cache key combining the listing with every parameter that shapes the result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub(crate) fn payments(listing_id: &ListingId, terms: &ResolvedTerms) -> Self {
        let sweep = terms
            .sweep
            .iter()
            .map(|percent| percent.to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self(format!(
            "payments:{listing_id}:{}:{}:{}:{}:{}:{:?}:[{sweep}]",
            terms.down_payment_percent,
            terms.interest_rate_annual_percent,
            terms.loan_term_years,
            terms.pmi_rate_percent,
            terms.target_debt_to_income_percent,
            terms.buyer_annual_income,
        ))
    }

    pub fn walkability(listing_id: &ListingId) -> Self {
        Self(format!("walkability:{listing_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsightValue {
    Payments(PaymentReport),
    Walkability(WalkabilityScore),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedInsight {
    pub computed_at: DateTime<Utc>,
    pub value: InsightValue,
}

impl CachedInsight {
    pub fn now(value: InsightValue) -> Self {
        Self {
            computed_at: Utc::now(),
            value,
        }
    }
}

/// Caller-owned result cache. Expiry policy belongs to the implementation.
pub trait InsightsCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<CachedInsight>;
    fn put(&self, key: CacheKey, entry: CachedInsight);
}

/// Cache that never remembers anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl InsightsCache for NoCache {
    fn get(&self, _key: &CacheKey) -> Option<CachedInsight> {
        None
    }

    fn put(&self, _key: CacheKey, _entry: CachedInsight) {}
}
