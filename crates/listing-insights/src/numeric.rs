//! Rounding and currency helpers shared by the calculators.
//!
//! Engine outputs keep full `f64` precision; these helpers are applied at the output boundary
//! (money to cents, percentages and distances to two decimals, scores to whole numbers).

/// Round `value` to `places` decimal places, half away from zero.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Round a currency amount to cents.
pub fn round_money(value: f64) -> f64 {
    round_to(value, 2)
}

/// Round a percentage to two decimals.
pub fn round_percent(value: f64) -> f64 {
    round_to(value, 2)
}

/// Format an amount as US dollars with thousands separators, e.g. `$2,555.95`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = cents / 100;
    let remainder = cents % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{remainder:02}")
}

pub(crate) fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
