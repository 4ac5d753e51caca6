//! Buyer-facing insights for real-estate listings: mortgage payment scenarios, affordability
//! against income, market position and an amenity-based walkability estimate.

pub mod config;
pub mod error;
pub mod finance;
pub mod geo;
pub mod listing;
pub mod market;
pub mod numeric;
pub mod telemetry;
pub mod walkability;
