use super::config::{CategoryRule, WalkabilityConfig};
use super::{AmenityObservation, CategoryScore};

const CATEGORY_CEILING: f64 = 100.0;

pub(crate) fn score_category(
    rule: &CategoryRule,
    config: &WalkabilityConfig,
    observations: &[AmenityObservation],
) -> CategoryScore {
    let mut count = 0usize;
    let mut within_range = 0usize;
    let mut proximity_bonus = 0.0;

    for observation in observations
        .iter()
        .filter(|observation| observation.category == rule.category)
    {
        count += 1;
        if rule.max_distance_miles > 0.0 && observation.distance_miles <= rule.max_distance_miles {
            within_range += 1;
            proximity_bonus += (1.0 - observation.distance_miles / rule.max_distance_miles)
                * config.max_proximity_bonus;
        }
    }

    let score = (count as f64 * config.points_per_amenity + proximity_bonus).min(CATEGORY_CEILING);

    CategoryScore {
        category: rule.category,
        observations: count,
        within_range,
        score,
        weighted_contribution: score * rule.weight,
    }
}

/// Weighted total of the category scores, normalised to 0..=100 (unrounded).
pub(crate) fn combine(config: &WalkabilityConfig, categories: &[CategoryScore]) -> f64 {
    let total: f64 = categories
        .iter()
        .map(|category| category.weighted_contribution)
        .sum();
    let max_possible: f64 = config
        .categories
        .iter()
        .map(|rule| CATEGORY_CEILING * rule.weight)
        .sum();

    if max_possible <= 0.0 {
        return 0.0;
    }

    (total / max_possible * 100.0).min(100.0)
}
