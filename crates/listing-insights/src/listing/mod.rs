//! Caller layer around the calculators.
//!
//! Listing facts, nearby amenities and result caching live behind traits so the service can be
//! exercised with in-memory collaborators. Upstream failures stop here: amenity lookups that
//! fail are logged and scored as empty, and unpriced listings become a contact-for-pricing
//! report rather than a payment.

pub mod cache;
pub mod report;
pub mod router;
pub mod service;
pub mod sources;

#[cfg(test)]
mod tests;

pub use cache::{CacheKey, CachedInsight, InsightValue, InsightsCache, NoCache};
pub use report::{
    MortgageCalculatorRequest, PaymentReport, PaymentRequest, PricedPaymentReport,
    CONTACT_FOR_PRICING_MESSAGE,
};
pub use router::insights_router;
pub use service::{InsightsError, InsightsSettings, ListingInsightsService};
pub use sources::{AmenitySource, ListingDataSource, ListingFinancials, ListingId, SourceError};
