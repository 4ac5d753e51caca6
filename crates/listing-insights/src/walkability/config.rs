use serde::{Deserialize, Serialize};

use super::AmenityCategory;

/// Weight and reach for one amenity category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: AmenityCategory,
    pub weight: f64,
    pub max_distance_miles: f64,
}

/// Scoring rubric: which categories count and how much.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkabilityConfig {
    pub categories: Vec<CategoryRule>,
    /// Points per observation, before the proximity bonus.
    pub points_per_amenity: f64,
    /// Bonus for an amenity at zero distance, shrinking linearly to nothing at max distance.
    pub max_proximity_bonus: f64,
}

impl Default for WalkabilityConfig {
    fn default() -> Self {
        let rule = |category, weight, max_distance_miles| CategoryRule {
            category,
            weight,
            max_distance_miles,
        };

        Self {
            categories: vec![
                rule(AmenityCategory::Restaurant, 0.20, 0.5),
                rule(AmenityCategory::Grocery, 0.25, 0.8),
                rule(AmenityCategory::School, 0.15, 1.0),
                rule(AmenityCategory::Hospital, 0.10, 2.0),
                rule(AmenityCategory::Bank, 0.10, 1.0),
                rule(AmenityCategory::Transit, 0.20, 0.5),
            ],
            points_per_amenity: 20.0,
            max_proximity_bonus: 10.0,
        }
    }
}

impl WalkabilityConfig {
    pub fn rule_for(&self, category: AmenityCategory) -> Option<&CategoryRule> {
        self.categories
            .iter()
            .find(|rule| rule.category == category)
    }
}
