use serde::{Deserialize, Serialize};

use super::FinanceError;
use crate::numeric::{is_non_negative, round_money, round_percent};

pub const DEFAULT_PMI_RATE_PERCENT: f64 = 0.5;
pub const DEFAULT_TARGET_DEBT_TO_INCOME_PERCENT: f64 = 28.0;

/// Longest loan term accepted, in years.
pub const MAX_LOAN_TERM_YEARS: u32 = 50;

fn default_pmi_rate() -> f64 {
    DEFAULT_PMI_RATE_PERCENT
}

/// Loan inputs for a single payment calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    pub price: f64,
    pub down_payment_percent: f64,
    pub interest_rate_annual_percent: f64,
    pub loan_term_years: u32,
    #[serde(default = "default_pmi_rate")]
    pub pmi_rate_percent: f64,
}

impl LoanParameters {
    /// Copy of these parameters with a different down payment.
    pub fn with_down_payment(self, percent: f64) -> Self {
        Self {
            down_payment_percent: percent,
            ..self
        }
    }

    /// Number of monthly payments. Validation caps the term at [`MAX_LOAN_TERM_YEARS`].
    pub fn payment_count(&self) -> u32 {
        self.loan_term_years.saturating_mul(12)
    }

    pub fn monthly_rate(&self) -> f64 {
        self.interest_rate_annual_percent / 100.0 / 12.0
    }

    pub fn down_payment_amount(&self) -> f64 {
        self.price * self.down_payment_percent / 100.0
    }

    pub fn loan_amount(&self) -> f64 {
        self.price - self.down_payment_amount()
    }

    pub(crate) fn validate(&self) -> Result<(), FinanceError> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(FinanceError::invalid(
                "price",
                format!("must be a positive amount, got {}", self.price),
            ));
        }
        if !self.down_payment_percent.is_finite()
            || !(0.0..=100.0).contains(&self.down_payment_percent)
        {
            return Err(FinanceError::invalid(
                "down_payment_percent",
                format!("must be between 0 and 100, got {}", self.down_payment_percent),
            ));
        }
        if !is_non_negative(self.interest_rate_annual_percent) {
            return Err(FinanceError::invalid(
                "interest_rate_annual_percent",
                format!(
                    "must be zero or greater, got {}",
                    self.interest_rate_annual_percent
                ),
            ));
        }
        if self.loan_term_years == 0 || self.loan_term_years > MAX_LOAN_TERM_YEARS {
            return Err(FinanceError::invalid(
                "loan_term_years",
                format!(
                    "must be between 1 and {MAX_LOAN_TERM_YEARS} years, got {}",
                    self.loan_term_years
                ),
            ));
        }
        if !is_non_negative(self.pmi_rate_percent) {
            return Err(FinanceError::invalid(
                "pmi_rate_percent",
                format!("must be zero or greater, got {}", self.pmi_rate_percent),
            ));
        }
        Ok(())
    }
}

/// Recurring ownership costs layered on top of principal and interest.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RecurringCosts {
    #[serde(default)]
    pub annual_property_tax: f64,
    #[serde(default)]
    pub annual_insurance: f64,
    #[serde(default)]
    pub monthly_hoa: f64,
}

impl RecurringCosts {
    pub(crate) fn validate(&self) -> Result<(), FinanceError> {
        let fields = [
            ("annual_property_tax", self.annual_property_tax),
            ("annual_insurance", self.annual_insurance),
            ("monthly_hoa", self.monthly_hoa),
        ];
        for (field, value) in fields {
            if !is_non_negative(value) {
                return Err(FinanceError::invalid(
                    field,
                    format!("must be zero or greater, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// Monthly payment breakdown for one down-payment choice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentScenario {
    pub down_payment_percent: f64,
    pub down_payment_amount: f64,
    pub loan_amount: f64,
    pub monthly_principal_interest: f64,
    pub monthly_taxes: f64,
    pub monthly_insurance: f64,
    pub monthly_hoa: f64,
    pub monthly_pmi: f64,
    pub total_monthly_payment: f64,
    pub total_interest_over_term: f64,
}

impl PaymentScenario {
    pub fn component_sum(&self) -> f64 {
        self.monthly_principal_interest
            + self.monthly_taxes
            + self.monthly_insurance
            + self.monthly_hoa
            + self.monthly_pmi
    }

    /// Presentation copy: money rounded to cents, the total re-derived from the rounded
    /// components so the displayed figures still add up.
    pub fn rounded(&self) -> Self {
        let mut rounded = Self {
            down_payment_percent: round_percent(self.down_payment_percent),
            down_payment_amount: round_money(self.down_payment_amount),
            loan_amount: round_money(self.loan_amount),
            monthly_principal_interest: round_money(self.monthly_principal_interest),
            monthly_taxes: round_money(self.monthly_taxes),
            monthly_insurance: round_money(self.monthly_insurance),
            monthly_hoa: round_money(self.monthly_hoa),
            monthly_pmi: round_money(self.monthly_pmi),
            total_monthly_payment: 0.0,
            total_interest_over_term: round_money(self.total_interest_over_term),
        };
        rounded.total_monthly_payment = round_money(rounded.component_sum());
        rounded
    }
}

/// Buyer affordability band, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordabilityRating {
    Unknown,
    NotAffordable,
    Challenging,
    Adequate,
    Good,
    Excellent,
}

impl AffordabilityRating {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::NotAffordable => "Not Affordable",
            Self::Challenging => "Challenging",
            Self::Adequate => "Adequate",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityPolicy {
    pub target_debt_to_income_percent: f64,
}

impl Default for AffordabilityPolicy {
    fn default() -> Self {
        Self {
            target_debt_to_income_percent: DEFAULT_TARGET_DEBT_TO_INCOME_PERCENT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityResult {
    pub required_annual_income: f64,
    pub rating: AffordabilityRating,
    /// Buyer income minus required income; zero when the buyer's income is unknown.
    pub income_gap: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_ratio: Option<f64>,
}

impl AffordabilityResult {
    pub fn rounded(&self) -> Self {
        Self {
            required_annual_income: round_money(self.required_annual_income),
            rating: self.rating,
            income_gap: round_money(self.income_gap),
            income_ratio: self.income_ratio.map(|ratio| crate::numeric::round_to(ratio, 4)),
        }
    }
}

/// One year of an amortization schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub ending_balance: f64,
}
