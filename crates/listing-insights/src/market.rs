//! Listing price position against its estimate and comparable sales.

use serde::{Deserialize, Serialize};

use crate::finance::FinanceError;
use crate::numeric::round_percent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPosition {
    Underpriced,
    FairValue,
    Overpriced,
    Premium,
    Unknown,
}

impl MarketPosition {
    /// Parse an upstream classification. Unrecognised hints are treated as absent.
    pub fn from_hint(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "underpriced" => Some(Self::Underpriced),
            "fair_value" | "fair" => Some(Self::FairValue),
            "overpriced" => Some(Self::Overpriced),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Underpriced => "Below Market",
            Self::FairValue => "Fair Market Value",
            Self::Overpriced => "Above Market",
            Self::Premium => "Premium Pricing",
            Self::Unknown => "Market Position Unknown",
        }
    }

    pub const fn indicator(self) -> ValueIndicator {
        match self {
            Self::Underpriced => ValueIndicator::GoodValue,
            Self::FairValue | Self::Unknown => ValueIndicator::Neutral,
            Self::Overpriced => ValueIndicator::Expensive,
            Self::Premium => ValueIndicator::Premium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueIndicator {
    GoodValue,
    Neutral,
    Expensive,
    Premium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketComparison {
    pub price_vs_estimate_percent: f64,
    pub price_vs_comparables_percent: f64,
    pub position: MarketPosition,
    pub label: String,
    pub indicator: ValueIndicator,
}

fn percent_delta(listing_price: f64, reference: Option<f64>) -> f64 {
    match reference {
        Some(value) if value.is_finite() && value > 0.0 => {
            round_percent((listing_price - value) / value * 100.0)
        }
        _ => 0.0,
    }
}

/// Deltas are informational only: the position comes from `position_hint` when one is
/// supplied and is `Unknown` otherwise.
pub fn classify_market_position(
    listing_price: f64,
    estimated_value: Option<f64>,
    comparable_average: Option<f64>,
    position_hint: Option<MarketPosition>,
) -> Result<MarketComparison, FinanceError> {
    if !listing_price.is_finite() || listing_price <= 0.0 {
        return Err(FinanceError::InvalidInput {
            field: "listing_price",
            reason: format!("must be a positive amount, got {listing_price}"),
        });
    }

    let position = position_hint.unwrap_or(MarketPosition::Unknown);

    Ok(MarketComparison {
        price_vs_estimate_percent: percent_delta(listing_price, estimated_value),
        price_vs_comparables_percent: percent_delta(listing_price, comparable_average),
        position,
        label: position.label().to_string(),
        indicator: position.indicator(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_deltas_against_present_references() {
        let comparison =
            classify_market_position(420_000.0, Some(400_000.0), Some(450_000.0), None).unwrap();

        assert_eq!(comparison.price_vs_estimate_percent, 5.0);
        assert_eq!(comparison.price_vs_comparables_percent, -6.67);
        assert_eq!(comparison.position, MarketPosition::Unknown);
        assert_eq!(comparison.indicator, ValueIndicator::Neutral);
        assert_eq!(comparison.label, "Market Position Unknown");
    }

    #[test]
    fn missing_or_zero_references_leave_zero_deltas() {
        let comparison = classify_market_position(300_000.0, None, Some(0.0), None).unwrap();
        assert_eq!(comparison.price_vs_estimate_percent, 0.0);
        assert_eq!(comparison.price_vs_comparables_percent, 0.0);
    }

    #[test]
    fn trusts_upstream_hint_over_deltas() {
        // Priced well above the estimate, but upstream says it is a bargain.
        let comparison = classify_market_position(
            500_000.0,
            Some(400_000.0),
            None,
            Some(MarketPosition::Underpriced),
        )
        .unwrap();

        assert_eq!(comparison.position, MarketPosition::Underpriced);
        assert_eq!(comparison.indicator, ValueIndicator::GoodValue);
        assert_eq!(comparison.label, "Below Market");
        assert_eq!(comparison.price_vs_estimate_percent, 25.0);
    }

    #[test]
    fn hint_mapping_covers_every_position() {
        let cases = [
            (MarketPosition::Underpriced, ValueIndicator::GoodValue),
            (MarketPosition::FairValue, ValueIndicator::Neutral),
            (MarketPosition::Overpriced, ValueIndicator::Expensive),
            (MarketPosition::Premium, ValueIndicator::Premium),
        ];
        for (hint, indicator) in cases {
            let comparison = classify_market_position(1.0, None, None, Some(hint)).unwrap();
            assert_eq!(comparison.indicator, indicator);
        }
    }

    #[test]
    fn parses_hint_strings() {
        assert_eq!(
            MarketPosition::from_hint(" Fair-Value "),
            Some(MarketPosition::FairValue)
        );
        assert_eq!(
            MarketPosition::from_hint("PREMIUM"),
            Some(MarketPosition::Premium)
        );
        assert_eq!(MarketPosition::from_hint("bargain"), None);
    }

    #[test]
    fn rejects_non_positive_listing_price() {
        assert!(classify_market_position(0.0, Some(1.0), None, None).is_err());
    }
}
