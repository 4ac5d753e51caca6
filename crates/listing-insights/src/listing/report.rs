use serde::{Deserialize, Serialize};

use super::sources::{ListingFinancials, ListingId};
use crate::finance::{AffordabilityResult, PaymentScenario, RecurringCosts, ScenarioSweep};
use crate::market::MarketComparison;
use crate::numeric::round_money;

pub const CONTACT_FOR_PRICING_MESSAGE: &str = "Contact agent for pricing";

/// Loan terms requested by a buyer. Anything left out falls back to the service settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentRequest {
    #[serde(default)]
    pub down_payment_percent: Option<f64>,
    #[serde(default)]
    pub interest_rate_annual_percent: Option<f64>,
    #[serde(default)]
    pub loan_term_years: Option<u32>,
    #[serde(default)]
    pub buyer_annual_income: Option<f64>,
    #[serde(default)]
    pub down_payment_percents: Option<Vec<u8>>,
}

/// Request terms with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedTerms {
    pub(crate) down_payment_percent: f64,
    pub(crate) interest_rate_annual_percent: f64,
    pub(crate) loan_term_years: u32,
    pub(crate) pmi_rate_percent: f64,
    pub(crate) target_debt_to_income_percent: f64,
    pub(crate) buyer_annual_income: Option<f64>,
    pub(crate) sweep: Vec<u8>,
}

/// Ad-hoc calculator input: listing facts supplied inline instead of fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageCalculatorRequest {
    pub price: f64,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub annual_property_tax: Option<f64>,
    #[serde(default)]
    pub annual_insurance: Option<f64>,
    #[serde(default)]
    pub monthly_hoa: Option<f64>,
    #[serde(default)]
    pub estimated_value: Option<f64>,
    #[serde(default)]
    pub comparable_average: Option<f64>,
    #[serde(default)]
    pub market_position_hint: Option<String>,
    #[serde(flatten)]
    pub terms: PaymentRequest,
}

impl MortgageCalculatorRequest {
    pub(crate) fn financials(&self) -> ListingFinancials {
        ListingFinancials {
            price: Some(self.price),
            region_code: self.region_code.clone(),
            actual_tax: self.annual_property_tax,
            actual_insurance: self.annual_insurance,
            monthly_hoa: self.monthly_hoa,
            estimated_value: self.estimated_value,
            comparable_average: self.comparable_average,
            market_position_hint: self.market_position_hint.clone(),
            location: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedPaymentReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<ListingId>,
    pub price: f64,
    pub costs: RecurringCosts,
    pub selected: PaymentScenario,
    pub sweep: ScenarioSweep,
    pub affordability: AffordabilityResult,
    pub market: MarketComparison,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentReport {
    ContactForPricing { listing_id: ListingId, message: String },
    Priced(Box<PricedPaymentReport>),
}

impl PaymentReport {
    pub fn contact_for_pricing(listing_id: &ListingId) -> Self {
        Self::ContactForPricing {
            listing_id: listing_id.clone(),
            message: CONTACT_FOR_PRICING_MESSAGE.to_string(),
        }
    }

    pub fn priced(&self) -> Option<&PricedPaymentReport> {
        match self {
            Self::Priced(report) => Some(report.as_ref()),
            Self::ContactForPricing { .. } => None,
        }
    }

    /// Copy with money rounded to cents for display.
    pub fn rounded(&self) -> Self {
        match self {
            Self::ContactForPricing { .. } => self.clone(),
            Self::Priced(report) => Self::Priced(Box::new(PricedPaymentReport {
                listing_id: report.listing_id.clone(),
                price: round_money(report.price),
                costs: RecurringCosts {
                    annual_property_tax: round_money(report.costs.annual_property_tax),
                    annual_insurance: round_money(report.costs.annual_insurance),
                    monthly_hoa: round_money(report.costs.monthly_hoa),
                },
                selected: report.selected.rounded(),
                sweep: report.sweep.rounded(),
                affordability: report.affordability.rounded(),
                market: report.market.clone(),
            })),
        }
    }
}
