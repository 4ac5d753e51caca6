//! Mortgage payment, affordability and cost-estimate calculators.
//!
//! Every function here is pure: inputs are validated up front and a fresh result is returned,
//! so callers may share them freely across threads.

mod affordability;
mod amortization;
mod domain;
mod estimates;

pub use affordability::{assess_affordability, rating_for_ratio, RATING_THRESHOLDS};
pub use amortization::{
    amortization_schedule, compute_payment_scenario, compute_payment_scenarios,
    monthly_principal_interest, ScenarioSweep, SweepEntry, PMI_THRESHOLD_PERCENT,
    STANDARD_DOWN_PAYMENT_SWEEP,
};
pub use domain::{
    AffordabilityPolicy, AffordabilityRating, AffordabilityResult, AmortizationYear,
    LoanParameters, PaymentScenario, RecurringCosts, DEFAULT_PMI_RATE_PERCENT,
    DEFAULT_TARGET_DEBT_TO_INCOME_PERCENT, MAX_LOAN_TERM_YEARS,
};
pub use estimates::{
    estimate_insurance, estimate_property_tax, RegionTaxError, RegionTaxTable,
    DEFAULT_TAX_RATE_PERCENT, INSURANCE_RATE_OF_PRICE,
};

/// Rejected calculator input. No partial result is ever produced alongside it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FinanceError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl FinanceError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}
