use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;
use crate::walkability::{AmenityCategory, AmenityObservation};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pricing, cost and location facts for one listing as stored upstream.
///
/// Actual tax and insurance figures are optional; the service estimates whatever is missing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ListingFinancials {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub actual_tax: Option<f64>,
    #[serde(default)]
    pub actual_insurance: Option<f64>,
    #[serde(default)]
    pub monthly_hoa: Option<f64>,
    #[serde(default)]
    pub estimated_value: Option<f64>,
    #[serde(default)]
    pub comparable_average: Option<f64>,
    #[serde(default)]
    pub market_position_hint: Option<String>,
    #[serde(default)]
    pub location: Option<Coordinates>,
}

impl ListingFinancials {
    /// The asking price, if the listing has one worth calculating against.
    pub fn usable_price(&self) -> Option<f64> {
        self.price.filter(|price| price.is_finite() && *price > 0.0)
    }
}

/// Pricing/listing data collaborator.
pub trait ListingDataSource: Send + Sync {
    fn financials(&self, id: &ListingId) -> Result<Option<ListingFinancials>, SourceError>;
}

/// Nearby-amenity collaborator. Distances are already computed in miles.
pub trait AmenitySource: Send + Sync {
    fn nearby(
        &self,
        origin: &Coordinates,
        category: AmenityCategory,
    ) -> Result<Vec<AmenityObservation>, SourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("upstream data unavailable: {0}")]
    Unavailable(String),
    #[error("upstream returned malformed data: {0}")]
    Malformed(String),
}
