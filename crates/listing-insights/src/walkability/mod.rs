//! Amenity-proximity walkability estimate.
//!
//! Each configured category earns points for every nearby amenity plus a bonus that shrinks
//! with distance; the weighted category scores are normalised to a 0-100 score and a tier.

mod config;
mod rules;

pub use config::{CategoryRule, WalkabilityConfig};

use crate::geo::{Coordinates, DistanceUnit};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmenityCategory {
    Restaurant,
    Grocery,
    School,
    Hospital,
    Bank,
    Transit,
}

impl AmenityCategory {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Restaurant,
            Self::Grocery,
            Self::School,
            Self::Hospital,
            Self::Bank,
            Self::Transit,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Restaurant => "Restaurants",
            Self::Grocery => "Grocery Stores",
            Self::School => "Schools",
            Self::Hospital => "Hospitals",
            Self::Bank => "Banks",
            Self::Transit => "Transit",
        }
    }

    /// Accepts the serialized name or its plural, ignoring case.
    pub fn from_key(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "restaurant" | "restaurants" => Some(Self::Restaurant),
            "grocery" | "groceries" => Some(Self::Grocery),
            "school" | "schools" => Some(Self::School),
            "hospital" | "hospitals" => Some(Self::Hospital),
            "bank" | "banks" => Some(Self::Bank),
            "transit" => Some(Self::Transit),
            _ => None,
        }
    }
}

/// A place of `category` found `distance_miles` from the property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmenityObservation {
    pub category: AmenityCategory,
    pub distance_miles: f64,
}

impl AmenityObservation {
    pub const fn new(category: AmenityCategory, distance_miles: f64) -> Self {
        Self {
            category,
            distance_miles,
        }
    }

    pub fn from_coordinates(
        category: AmenityCategory,
        property: &Coordinates,
        place: &Coordinates,
    ) -> Self {
        Self::new(category, property.distance_to(place, DistanceUnit::Miles))
    }

    fn is_usable(&self) -> bool {
        self.distance_miles.is_finite() && self.distance_miles >= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WalkabilityTier {
    #[serde(rename = "Walker's Paradise")]
    WalkersParadise,
    #[serde(rename = "Very Walkable")]
    VeryWalkable,
    #[serde(rename = "Somewhat Walkable")]
    SomewhatWalkable,
    #[serde(rename = "Car-Dependent")]
    CarDependent,
}

impl WalkabilityTier {
    /// Car-Dependent is the floor; there is no band below it.
    pub const fn from_score(score: u8) -> Self {
        match score {
            90.. => Self::WalkersParadise,
            70..=89 => Self::VeryWalkable,
            50..=69 => Self::SomewhatWalkable,
            _ => Self::CarDependent,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::WalkersParadise => "Walker's Paradise",
            Self::VeryWalkable => "Very Walkable",
            Self::SomewhatWalkable => "Somewhat Walkable",
            Self::CarDependent => "Car-Dependent",
        }
    }
}

/// One category's share of the final score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: AmenityCategory,
    pub observations: usize,
    pub within_range: usize,
    pub score: f64,
    pub weighted_contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkabilityScore {
    pub score: u8,
    pub tier: WalkabilityTier,
    pub categories: Vec<CategoryScore>,
}

impl WalkabilityScore {
    pub fn description(&self) -> &'static str {
        self.tier.label()
    }
}

/// Stateless scorer bound to a rubric.
#[derive(Debug, Clone, Default)]
pub struct WalkabilityEngine {
    config: WalkabilityConfig,
}

impl WalkabilityEngine {
    pub fn new(config: WalkabilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WalkabilityConfig {
        &self.config
    }

    pub fn score(&self, observations: &[AmenityObservation]) -> WalkabilityScore {
        let usable: Vec<AmenityObservation> = observations
            .iter()
            .filter(|observation| {
                let usable = observation.is_usable();
                if !usable {
                    warn!(
                        category = observation.category.label(),
                        distance = observation.distance_miles,
                        "skipping amenity with unusable distance"
                    );
                }
                usable
            })
            .copied()
            .collect();

        let categories: Vec<CategoryScore> = self
            .config
            .categories
            .iter()
            .map(|rule| rules::score_category(rule, &self.config, &usable))
            .collect();

        let score = rules::combine(&self.config, &categories).round().clamp(0.0, 100.0) as u8;
        let tier = WalkabilityTier::from_score(score);

        debug!(
            score,
            tier = tier.label(),
            observations = usable.len(),
            "estimated walkability"
        );

        WalkabilityScore {
            score,
            tier,
            categories,
        }
    }
}

/// Score `observations` with the default rubric.
pub fn estimate_walkability(observations: &[AmenityObservation]) -> WalkabilityScore {
    WalkabilityEngine::default().score(observations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe(category: AmenityCategory, distance_miles: f64) -> AmenityObservation {
        AmenityObservation::new(category, distance_miles)
    }

    #[test]
    fn empty_input_is_car_dependent_zero() {
        let result = estimate_walkability(&[]);
        assert_eq!(result.score, 0);
        assert_eq!(result.tier, WalkabilityTier::CarDependent);
        assert_eq!(result.categories.len(), 6);
        assert!(result.categories.iter().all(|category| category.score == 0.0));
    }

    #[test]
    fn restaurant_and_grocery_regression() {
        let result = estimate_walkability(&[
            observe(AmenityCategory::Restaurant, 0.25),
            observe(AmenityCategory::Grocery, 0.4),
        ]);

        let restaurant = result.categories[0];
        let grocery = result.categories[1];
        assert_eq!(restaurant.score, 25.0);
        assert_eq!(grocery.score, 25.0);
        assert_eq!(result.score, 11);
        assert_eq!(result.tier, WalkabilityTier::CarDependent);
    }

    #[test]
    fn far_amenities_count_without_bonus() {
        let result = estimate_walkability(&[observe(AmenityCategory::Hospital, 5.0)]);
        let hospital = result
            .categories
            .iter()
            .find(|category| category.category == AmenityCategory::Hospital)
            .copied()
            .expect("hospital scored");

        assert_eq!(hospital.observations, 1);
        assert_eq!(hospital.within_range, 0);
        assert_eq!(hospital.score, 20.0);
        assert_eq!(result.score, 2);
    }

    #[test]
    fn amenity_at_max_distance_earns_no_bonus() {
        let result = estimate_walkability(&[observe(AmenityCategory::Transit, 0.5)]);
        let transit = result.categories[5];
        assert_eq!(transit.within_range, 1);
        assert_eq!(transit.score, 20.0);
    }

    #[test]
    fn category_score_caps_at_one_hundred() {
        let crowded: Vec<_> = (0..10)
            .map(|_| observe(AmenityCategory::Restaurant, 0.0))
            .collect();
        let result = estimate_walkability(&crowded);
        assert_eq!(result.categories[0].score, 100.0);
        assert_eq!(result.score, 20);
    }

    #[test]
    fn saturated_neighbourhood_is_walkers_paradise() {
        let observations: Vec<_> = AmenityCategory::ordered()
            .into_iter()
            .flat_map(|category| (0..5).map(move |_| observe(category, 0.1)))
            .collect();

        let result = estimate_walkability(&observations);
        assert_eq!(result.score, 100);
        assert_eq!(result.tier, WalkabilityTier::WalkersParadise);
        assert_eq!(result.description(), "Walker's Paradise");
    }

    #[test]
    fn adding_nearby_amenities_never_lowers_score() {
        let mut observations = Vec::new();
        let mut previous = estimate_walkability(&observations).score;

        for round in 0..8 {
            for category in AmenityCategory::ordered() {
                observations.push(observe(category, 0.05 * round as f64));
                let score = estimate_walkability(&observations).score;
                assert!(score >= previous, "{category:?} in round {round} lowered score");
                previous = score;
            }
        }
    }

    #[test]
    fn skips_unusable_distances() {
        let result = estimate_walkability(&[
            observe(AmenityCategory::Bank, -1.0),
            observe(AmenityCategory::Bank, f64::NAN),
        ]);
        assert_eq!(result.score, 0);
        assert_eq!(result.categories[4].observations, 0);
    }

    #[test]
    fn tier_bands() {
        assert_eq!(WalkabilityTier::from_score(100), WalkabilityTier::WalkersParadise);
        assert_eq!(WalkabilityTier::from_score(90), WalkabilityTier::WalkersParadise);
        assert_eq!(WalkabilityTier::from_score(89), WalkabilityTier::VeryWalkable);
        assert_eq!(WalkabilityTier::from_score(70), WalkabilityTier::VeryWalkable);
        assert_eq!(WalkabilityTier::from_score(50), WalkabilityTier::SomewhatWalkable);
        assert_eq!(WalkabilityTier::from_score(25), WalkabilityTier::CarDependent);
        assert_eq!(WalkabilityTier::from_score(0), WalkabilityTier::CarDependent);
    }

    #[test]
    fn tier_serializes_as_label() {
        let json = serde_json::to_string(&WalkabilityTier::WalkersParadise).unwrap();
        assert_eq!(json, "\"Walker's Paradise\"");
    }

    #[test]
    fn custom_rubric_ignores_unlisted_categories() {
        let engine = WalkabilityEngine::new(WalkabilityConfig {
            categories: vec![CategoryRule {
                category: AmenityCategory::Transit,
                weight: 1.0,
                max_distance_miles: 1.0,
            }],
            ..WalkabilityConfig::default()
        });

        let result = engine.score(&[
            observe(AmenityCategory::Transit, 0.5),
            observe(AmenityCategory::Grocery, 0.1),
        ]);
        assert_eq!(result.categories.len(), 1);
        assert_eq!(result.score, 25);
    }

    #[test]
    fn category_keys_accept_plurals() {
        assert_eq!(AmenityCategory::from_key(" Groceries "), Some(AmenityCategory::Grocery));
        assert_eq!(AmenityCategory::from_key("bank"), Some(AmenityCategory::Bank));
        assert_eq!(AmenityCategory::from_key("parks"), None);
    }
}
