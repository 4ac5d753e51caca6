use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::finance::RegionTaxTable;
use crate::geo::Coordinates;
use crate::listing::cache::{CacheKey, CachedInsight, InsightsCache};
use crate::listing::sources::{
    AmenitySource, ListingDataSource, ListingFinancials, ListingId, SourceError,
};
use crate::listing::{InsightsSettings, ListingInsightsService};
use crate::walkability::{AmenityCategory, AmenityObservation};

pub(super) const PRICED: &str = "mls-1001";
pub(super) const UNPRICED: &str = "mls-1002";
pub(super) const NO_LOCATION: &str = "mls-1003";

pub(super) fn downtown() -> Coordinates {
    Coordinates::new(41.5868, -93.625)
}

pub(super) fn priced_listing() -> ListingFinancials {
    ListingFinancials {
        price: Some(400_000.0),
        region_code: Some("IA".to_string()),
        actual_tax: Some(4_800.0),
        actual_insurance: Some(1_600.0),
        monthly_hoa: None,
        estimated_value: Some(410_000.0),
        comparable_average: Some(395_000.0),
        market_position_hint: Some("fair_value".to_string()),
        location: Some(downtown()),
    }
}

#[derive(Default)]
pub(super) struct MemoryListings {
    records: HashMap<ListingId, ListingFinancials>,
    pub(super) lookups: AtomicUsize,
}

impl MemoryListings {
    pub(super) fn seeded() -> Self {
        let mut records = HashMap::new();
        records.insert(ListingId(PRICED.to_string()), priced_listing());
        records.insert(
            ListingId(UNPRICED.to_string()),
            ListingFinancials {
                price: None,
                location: Some(downtown()),
                ..ListingFinancials::default()
            },
        );
        records.insert(
            ListingId(NO_LOCATION.to_string()),
            ListingFinancials {
                location: None,
                ..priced_listing()
            },
        );
        Self {
            records,
            lookups: AtomicUsize::new(0),
        }
    }
}

impl ListingDataSource for MemoryListings {
    fn financials(&self, id: &ListingId) -> Result<Option<ListingFinancials>, SourceError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.records.get(id).cloned())
    }
}

pub(super) struct UnavailableListings;

impl ListingDataSource for UnavailableListings {
    fn financials(&self, _id: &ListingId) -> Result<Option<ListingFinancials>, SourceError> {
        Err(SourceError::Unavailable("listing store offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryAmenities {
    places: HashMap<AmenityCategory, Vec<AmenityObservation>>,
    failing: HashSet<AmenityCategory>,
}

impl MemoryAmenities {
    pub(super) fn walkable_block() -> Self {
        let mut places = HashMap::new();
        places.insert(
            AmenityCategory::Restaurant,
            vec![AmenityObservation::new(AmenityCategory::Restaurant, 0.25)],
        );
        places.insert(
            AmenityCategory::Grocery,
            vec![AmenityObservation::new(AmenityCategory::Grocery, 0.4)],
        );
        Self {
            places,
            failing: HashSet::new(),
        }
    }

    pub(super) fn failing(mut self, category: AmenityCategory) -> Self {
        self.failing.insert(category);
        self
    }
}

impl AmenitySource for MemoryAmenities {
    fn nearby(
        &self,
        _origin: &Coordinates,
        category: AmenityCategory,
    ) -> Result<Vec<AmenityObservation>, SourceError> {
        if self.failing.contains(&category) {
            return Err(SourceError::Unavailable(format!(
                "{} lookup timed out",
                category.label()
            )));
        }
        Ok(self.places.get(&category).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub(super) struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, CachedInsight>>,
}

impl MemoryCache {
    pub(super) fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }
}

impl InsightsCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<CachedInsight> {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .get(key)
            .cloned()
    }

    fn put(&self, key: CacheKey, entry: CachedInsight) {
        self.entries
            .lock()
            .expect("cache mutex poisoned")
            .insert(key, entry);
    }
}

pub(super) type TestService = ListingInsightsService<MemoryListings, MemoryAmenities, MemoryCache>;

pub(super) fn build_service() -> (Arc<TestService>, Arc<MemoryListings>, Arc<MemoryCache>) {
    build_service_with(MemoryAmenities::walkable_block())
}

pub(super) fn build_service_with(
    amenities: MemoryAmenities,
) -> (Arc<TestService>, Arc<MemoryListings>, Arc<MemoryCache>) {
    let listings = Arc::new(MemoryListings::seeded());
    let cache = Arc::new(MemoryCache::default());
    let service = Arc::new(ListingInsightsService::new(
        listings.clone(),
        Arc::new(amenities),
        cache.clone(),
        RegionTaxTable::default(),
        InsightsSettings::default(),
    ));
    (service, listings, cache)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
