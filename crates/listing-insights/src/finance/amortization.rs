use serde::Serialize;
use tracing::debug;

use super::domain::{AmortizationYear, LoanParameters, PaymentScenario, RecurringCosts};
use super::FinanceError;

/// Down payments offered side by side on a listing.
pub const STANDARD_DOWN_PAYMENT_SWEEP: [u8; 6] = [5, 10, 15, 20, 25, 30];

/// PMI applies strictly below this down payment.
pub const PMI_THRESHOLD_PERCENT: f64 = 20.0;

/// Level monthly principal-and-interest payment for a fully amortizing loan.
///
/// A rate too small to move `(1 + r)^n` off one is treated as zero. When the
/// growth factor overflows, the payment is its limit, interest on the full balance.
pub fn monthly_principal_interest(loan_amount: f64, monthly_rate: f64, payments: u32) -> f64 {
    let even_split = loan_amount / f64::from(payments);
    if monthly_rate == 0.0 {
        return even_split;
    }

    let factor = (1.0 + monthly_rate).powi(i32::try_from(payments).unwrap_or(i32::MAX));
    if factor.is_infinite() {
        return loan_amount * monthly_rate;
    }
    let growth = factor - 1.0;
    if growth <= 0.0 {
        return even_split;
    }
    loan_amount * monthly_rate * factor / growth
}

/// Validated level payment; a non-finite result means the inputs are out of range.
fn level_payment(loan: &LoanParameters, loan_amount: f64) -> Result<f64, FinanceError> {
    let payment =
        monthly_principal_interest(loan_amount, loan.monthly_rate(), loan.payment_count());
    let total_paid = payment * f64::from(loan.payment_count());
    if !payment.is_finite() || !total_paid.is_finite() {
        return Err(FinanceError::invalid(
            "interest_rate_annual_percent",
            format!(
                "payment on {loan_amount} at {}% does not fit in a finite amount",
                loan.interest_rate_annual_percent
            ),
        ));
    }
    Ok(payment)
}

pub fn compute_payment_scenario(
    loan: &LoanParameters,
    costs: &RecurringCosts,
) -> Result<PaymentScenario, FinanceError> {
    loan.validate()?;
    costs.validate()?;

    let down_payment_amount = loan.down_payment_amount();
    let loan_amount = loan.price - down_payment_amount;
    let payments = loan.payment_count();

    let monthly_pi = level_payment(loan, loan_amount)?;
    let monthly_taxes = costs.annual_property_tax / 12.0;
    let monthly_insurance = costs.annual_insurance / 12.0;
    let monthly_hoa = costs.monthly_hoa;
    let monthly_pmi = if loan.down_payment_percent >= PMI_THRESHOLD_PERCENT {
        0.0
    } else {
        loan_amount * loan.pmi_rate_percent / 100.0 / 12.0
    };

    let total_monthly_payment =
        monthly_pi + monthly_taxes + monthly_insurance + monthly_hoa + monthly_pmi;
    if !total_monthly_payment.is_finite() {
        return Err(FinanceError::invalid(
            "total_monthly_payment",
            "monthly costs add up to more than a finite amount",
        ));
    }

    Ok(PaymentScenario {
        down_payment_percent: loan.down_payment_percent,
        down_payment_amount,
        loan_amount,
        monthly_principal_interest: monthly_pi,
        monthly_taxes,
        monthly_insurance,
        monthly_hoa,
        monthly_pmi,
        total_monthly_payment,
        total_interest_over_term: monthly_pi * f64::from(payments) - loan_amount,
    })
}

/// Scenario for one percent of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepEntry {
    pub down_payment_percent: u8,
    pub scenario: PaymentScenario,
}

/// Scenarios keyed by down-payment percent, in the order the percents were requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScenarioSweep {
    entries: Vec<SweepEntry>,
}

impl ScenarioSweep {
    fn insert(&mut self, percent: u8, scenario: PaymentScenario) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.down_payment_percent == percent)
        {
            Some(entry) => entry.scenario = scenario,
            None => self.entries.push(SweepEntry {
                down_payment_percent: percent,
                scenario,
            }),
        }
    }

    pub fn get(&self, percent: u8) -> Option<&PaymentScenario> {
        self.entries
            .iter()
            .find(|entry| entry.down_payment_percent == percent)
            .map(|entry| &entry.scenario)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &PaymentScenario)> {
        self.entries
            .iter()
            .map(|entry| (entry.down_payment_percent, &entry.scenario))
    }

    pub fn percents(&self) -> Vec<u8> {
        self.entries
            .iter()
            .map(|entry| entry.down_payment_percent)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rounded(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|entry| SweepEntry {
                    down_payment_percent: entry.down_payment_percent,
                    scenario: entry.scenario.rounded(),
                })
                .collect(),
        }
    }
}

/// Run [`compute_payment_scenario`] once per percent, varying only the down payment.
pub fn compute_payment_scenarios(
    base: &LoanParameters,
    costs: &RecurringCosts,
    down_payment_percents: &[u8],
) -> Result<ScenarioSweep, FinanceError> {
    let mut sweep = ScenarioSweep::default();
    for &percent in down_payment_percents {
        let loan = base.with_down_payment(f64::from(percent));
        let scenario = compute_payment_scenario(&loan, costs)?;
        sweep.insert(percent, scenario);
    }

    debug!(
        price = base.price,
        scenarios = sweep.len(),
        "computed down payment sweep"
    );
    Ok(sweep)
}

/// Year-by-year principal and interest for the loan described by `loan`.
pub fn amortization_schedule(loan: &LoanParameters) -> Result<Vec<AmortizationYear>, FinanceError> {
    loan.validate()?;

    let rate = loan.monthly_rate();
    let payments = loan.payment_count();
    let mut balance = loan.loan_amount();
    let payment = level_payment(loan, balance)?;

    let mut years = Vec::with_capacity(loan.loan_term_years as usize);
    let mut current = AmortizationYear {
        year: 1,
        principal_paid: 0.0,
        interest_paid: 0.0,
        ending_balance: balance,
    };

    for month in 1..=payments {
        let interest = balance * rate;
        let principal = if month == payments {
            balance
        } else {
            (payment - interest).min(balance)
        };
        balance -= principal;

        current.principal_paid += principal;
        current.interest_paid += interest;
        current.ending_balance = balance.max(0.0);

        if month % 12 == 0 {
            years.push(current);
            current = AmortizationYear {
                year: current.year + 1,
                principal_paid: 0.0,
                interest_paid: 0.0,
                ending_balance: current.ending_balance,
            };
        }
    }

    Ok(years)
}
