use tracing::debug;

use super::domain::{
    AffordabilityPolicy, AffordabilityRating, AffordabilityResult, PaymentScenario,
};
use super::FinanceError;
use crate::numeric::is_non_negative;

/// Inclusive lower bounds on income / required income, checked top-down.
pub const RATING_THRESHOLDS: [(f64, AffordabilityRating); 4] = [
    (1.30, AffordabilityRating::Excellent),
    (1.10, AffordabilityRating::Good),
    (1.00, AffordabilityRating::Adequate),
    (0.85, AffordabilityRating::Challenging),
];

pub fn rating_for_ratio(ratio: f64) -> AffordabilityRating {
    RATING_THRESHOLDS
        .iter()
        .find(|(floor, _)| ratio >= *floor)
        .map(|(_, rating)| *rating)
        .unwrap_or(AffordabilityRating::NotAffordable)
}

pub fn assess_affordability(
    scenario: &PaymentScenario,
    policy: &AffordabilityPolicy,
    buyer_annual_income: Option<f64>,
) -> Result<AffordabilityResult, FinanceError> {
    let dti = policy.target_debt_to_income_percent;
    if !dti.is_finite() || dti <= 0.0 {
        return Err(FinanceError::invalid(
            "target_debt_to_income_percent",
            format!("must be a positive percentage, got {dti}"),
        ));
    }

    let required_annual_income = scenario.total_monthly_payment * 12.0 / (dti / 100.0);

    let Some(income) = buyer_annual_income else {
        return Ok(AffordabilityResult {
            required_annual_income,
            rating: AffordabilityRating::Unknown,
            income_gap: 0.0,
            income_ratio: None,
        });
    };

    if !is_non_negative(income) {
        return Err(FinanceError::invalid(
            "buyer_annual_income",
            format!("must be zero or greater, got {income}"),
        ));
    }

    // Nothing owed monthly: any income clears the bar.
    let (rating, income_ratio) = if required_annual_income > 0.0 {
        let ratio = income / required_annual_income;
        (rating_for_ratio(ratio), Some(ratio))
    } else {
        (AffordabilityRating::Excellent, None)
    };

    debug!(
        required_annual_income,
        income,
        rating = rating.label(),
        "assessed affordability"
    );

    Ok(AffordabilityResult {
        required_annual_income,
        rating,
        income_gap: income - required_annual_income,
        income_ratio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::{compute_payment_scenario, LoanParameters, RecurringCosts};

    fn scenario() -> PaymentScenario {
        compute_payment_scenario(
            &LoanParameters {
                price: 400_000.0,
                down_payment_percent: 20.0,
                interest_rate_annual_percent: 6.5,
                loan_term_years: 30,
                pmi_rate_percent: 0.5,
            },
            &RecurringCosts {
                annual_property_tax: 4_800.0,
                annual_insurance: 1_600.0,
                monthly_hoa: 0.0,
            },
        )
        .expect("valid scenario")
    }

    #[test]
    fn required_income_uses_default_ratio() {
        let scenario = scenario();
        let result =
            assess_affordability(&scenario, &AffordabilityPolicy::default(), None).unwrap();

        let expected = scenario.total_monthly_payment * 12.0 / 0.28;
        assert!((result.required_annual_income - expected).abs() < 1e-9);
        assert!((result.required_annual_income - 109_540.7).abs() < 1.0);
        assert_eq!(result.rating, AffordabilityRating::Unknown);
        assert_eq!(result.income_gap, 0.0);
    }

    #[test]
    fn boundaries_resolve_to_higher_tier() {
        assert_eq!(rating_for_ratio(1.30), AffordabilityRating::Excellent);
        assert_eq!(rating_for_ratio(1.10), AffordabilityRating::Good);
        assert_eq!(rating_for_ratio(1.00), AffordabilityRating::Adequate);
        assert_eq!(rating_for_ratio(0.85), AffordabilityRating::Challenging);
        assert_eq!(rating_for_ratio(0.8499), AffordabilityRating::NotAffordable);
        assert_eq!(rating_for_ratio(0.0), AffordabilityRating::NotAffordable);
    }

    #[test]
    fn rating_never_drops_as_ratio_rises() {
        let mut previous = rating_for_ratio(0.0);
        for step in 0..=400 {
            let rating = rating_for_ratio(step as f64 * 0.005);
            assert!(rating >= previous, "ratio step {step} regressed");
            previous = rating;
        }
        assert_eq!(previous, AffordabilityRating::Excellent);
    }

    #[test]
    fn income_gap_is_signed() {
        let scenario = scenario();
        let policy = AffordabilityPolicy::default();

        let short = assess_affordability(&scenario, &policy, Some(95_000.0)).unwrap();
        assert!(short.income_gap < 0.0);
        assert_eq!(short.rating, AffordabilityRating::Challenging);

        let ample = assess_affordability(&scenario, &policy, Some(150_000.0)).unwrap();
        assert!(ample.income_gap > 0.0);
        assert_eq!(ample.rating, AffordabilityRating::Excellent);
    }

    #[test]
    fn rejects_bad_policy_and_income() {
        let scenario = scenario();
        let policy = AffordabilityPolicy {
            target_debt_to_income_percent: 0.0,
        };
        assert!(assess_affordability(&scenario, &policy, Some(1.0)).is_err());
        assert!(
            assess_affordability(&scenario, &AffordabilityPolicy::default(), Some(-5.0)).is_err()
        );
    }
}
