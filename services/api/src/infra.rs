use chrono::{Duration, Utc};
use listing_insights::geo::Coordinates;
use listing_insights::listing::{
    AmenitySource, CacheKey, CachedInsight, InsightsCache, ListingDataSource, ListingFinancials,
    ListingId, SourceError,
};
use listing_insights::walkability::{AmenityCategory, AmenityObservation};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};

/// Amenities further than this from the property are not reported.
pub(crate) const AMENITY_SEARCH_RADIUS_MILES: f64 = 5.0;

/// Upper bound on the cache TTL; ten years.
const MAX_CACHE_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryListingSource {
    listings: Arc<HashMap<ListingId, ListingFinancials>>,
}

impl InMemoryListingSource {
    pub(crate) fn new(listings: impl IntoIterator<Item = (ListingId, ListingFinancials)>) -> Self {
        Self {
            listings: Arc::new(listings.into_iter().collect()),
        }
    }

    pub(crate) fn demo() -> Self {
        Self::new(demo_listings())
    }

    pub(crate) fn ids(&self) -> Vec<ListingId> {
        let mut ids: Vec<ListingId> = self.listings.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl ListingDataSource for InMemoryListingSource {
    fn financials(&self, id: &ListingId) -> Result<Option<ListingFinancials>, SourceError> {
        Ok(self.listings.get(id).cloned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Place {
    pub(crate) category: AmenityCategory,
    pub(crate) location: Coordinates,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAmenitySource {
    places: Arc<Vec<Place>>,
}

impl InMemoryAmenitySource {
    pub(crate) fn new(places: Vec<Place>) -> Self {
        Self {
            places: Arc::new(places),
        }
    }

    pub(crate) fn demo() -> Self {
        Self::new(demo_places())
    }
}

impl AmenitySource for InMemoryAmenitySource {
    fn nearby(
        &self,
        origin: &Coordinates,
        category: AmenityCategory,
    ) -> Result<Vec<AmenityObservation>, SourceError> {
        let mut found: Vec<AmenityObservation> = self
            .places
            .iter()
            .filter(|place| place.category == category)
            .map(|place| AmenityObservation::from_coordinates(category, origin, &place.location))
            .filter(|observation| observation.distance_miles <= AMENITY_SEARCH_RADIUS_MILES)
            .collect();
        found.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
        Ok(found)
    }
}

/// Process-local cache; entries older than the TTL are dropped on read.
pub(crate) struct TtlInsightsCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CachedInsight>>,
}

impl TtlInsightsCache {
    pub(crate) fn new(ttl_secs: u64) -> Self {
        let secs = ttl_secs.min(MAX_CACHE_TTL_SECS) as i64;
        Self {
            ttl: Duration::seconds(secs),
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl InsightsCache for TtlInsightsCache {
    fn get(&self, key: &CacheKey) -> Option<CachedInsight> {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let fresh = guard
            .get(key)
            .map(|entry| Utc::now() - entry.computed_at < self.ttl)?;
        if fresh {
            guard.get(key).cloned()
        } else {
            guard.remove(key);
            None
        }
    }

    fn put(&self, key: CacheKey, entry: CachedInsight) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }
}

const EAST_VILLAGE: Coordinates = Coordinates::new(41.5868, -93.6131);
const LOHI: Coordinates = Coordinates::new(39.7589, -105.0110);

pub(crate) fn demo_listings() -> Vec<(ListingId, ListingFinancials)> {
    vec![
        (
            ListingId("mls-2001".to_string()),
            ListingFinancials {
                price: Some(385_000.0),
                region_code: Some("IA".to_string()),
                actual_tax: Some(6_045.0),
                actual_insurance: None,
                monthly_hoa: None,
                estimated_value: Some(392_000.0),
                comparable_average: Some(380_000.0),
                market_position_hint: Some("fair_value".to_string()),
                location: Some(EAST_VILLAGE),
            },
        ),
        (
            ListingId("mls-2002".to_string()),
            ListingFinancials {
                price: Some(629_000.0),
                region_code: Some("CO".to_string()),
                actual_tax: None,
                actual_insurance: Some(2_100.0),
                monthly_hoa: Some(310.0),
                estimated_value: Some(600_000.0),
                comparable_average: Some(590_000.0),
                market_position_hint: Some("premium".to_string()),
                location: Some(LOHI),
            },
        ),
        (
            ListingId("mls-2003".to_string()),
            ListingFinancials {
                price: None,
                region_code: Some("IA".to_string()),
                location: Some(Coordinates::new(41.6005, -93.6091)),
                ..ListingFinancials::default()
            },
        ),
    ]
}

fn offset(origin: Coordinates, dlat: f64, dlng: f64) -> Coordinates {
    Coordinates::new(origin.lat + dlat, origin.lng + dlng)
}

pub(crate) fn demo_places() -> Vec<Place> {
    use AmenityCategory::*;

    let east_village = [
        (Restaurant, 0.001, 0.002),
        (Restaurant, -0.002, 0.001),
        (Restaurant, 0.003, -0.004),
        (Restaurant, 0.006, 0.003),
        (Grocery, 0.004, 0.002),
        (Grocery, -0.010, 0.012),
        (School, 0.008, -0.006),
        (Hospital, 0.021, -0.019),
        (Bank, 0.002, -0.003),
        (Bank, -0.003, 0.005),
        (Transit, 0.001, -0.001),
        (Transit, -0.004, -0.002),
    ];
    let lohi = [
        (Restaurant, 0.001, 0.001),
        (Restaurant, 0.002, -0.002),
        (Grocery, -0.006, 0.004),
        (School, 0.009, 0.007),
        (Transit, -0.003, 0.006),
    ];

    east_village
        .into_iter()
        .map(|(category, dlat, dlng)| Place {
            category,
            location: offset(EAST_VILLAGE, dlat, dlng),
        })
        .chain(lohi.into_iter().map(|(category, dlat, dlng)| Place {
            category,
            location: offset(LOHI, dlat, dlng),
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_insights::listing::{InsightValue, PaymentReport};
    use listing_insights::walkability::estimate_walkability;

    #[test]
    fn amenity_source_filters_category_and_radius() {
        let source = InMemoryAmenitySource::new(vec![
            Place {
                category: AmenityCategory::Grocery,
                location: offset(EAST_VILLAGE, 0.004, 0.0),
            },
            Place {
                category: AmenityCategory::Grocery,
                location: offset(EAST_VILLAGE, 0.5, 0.0),
            },
            Place {
                category: AmenityCategory::Bank,
                location: EAST_VILLAGE,
            },
        ]);

        let found = source
            .nearby(&EAST_VILLAGE, AmenityCategory::Grocery)
            .expect("lookup");
        assert_eq!(found.len(), 1);
        assert!(found[0].distance_miles > 0.2 && found[0].distance_miles < 0.4);
    }

    #[test]
    fn demo_places_make_east_village_walkable() {
        let source = InMemoryAmenitySource::demo();
        let observations: Vec<AmenityObservation> = AmenityCategory::ordered()
            .into_iter()
            .flat_map(|category| source.nearby(&EAST_VILLAGE, category).expect("lookup"))
            .collect();

        let score = estimate_walkability(&observations);
        assert!(score.score > 0);
        assert!(score.categories.iter().all(|category| category.observations > 0));
    }

    #[test]
    fn listing_source_returns_seeded_records() {
        let source = InMemoryListingSource::demo();
        assert_eq!(source.ids().len(), 3);
        let record = source
            .financials(&ListingId("mls-2002".to_string()))
            .expect("lookup")
            .expect("seeded");
        assert_eq!(record.monthly_hoa, Some(310.0));
        assert!(source
            .financials(&ListingId("mls-9999".to_string()))
            .expect("lookup")
            .is_none());
    }

    fn entry() -> CachedInsight {
        CachedInsight::now(InsightValue::Payments(PaymentReport::contact_for_pricing(
            &ListingId("mls-2003".to_string()),
        )))
    }

    #[test]
    fn ttl_cache_serves_fresh_entries() {
        let cache = TtlInsightsCache::new(60);
        let key = demo_key();
        cache.put(key.clone(), entry());
        assert!(cache.get(&key).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn ttl_cache_evicts_expired_entries() {
        let cache = TtlInsightsCache::new(60);
        let key = demo_key();
        let mut stale = entry();
        stale.computed_at = Utc::now() - Duration::seconds(120);
        cache.put(key.clone(), stale);

        assert!(cache.get(&key).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn zero_ttl_disables_caching() {
        let cache = TtlInsightsCache::new(0);
        let key = demo_key();
        cache.put(key.clone(), entry());
        assert!(cache.get(&key).is_none());
    }

    fn demo_key() -> CacheKey {
        CacheKey::walkability(&ListingId("mls-2001".to_string()))
    }
}
