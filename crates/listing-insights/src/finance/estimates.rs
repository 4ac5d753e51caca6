use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::FinanceError;
use crate::numeric::is_non_negative;

/// Annual property-tax rate used when a region has no entry.
pub const DEFAULT_TAX_RATE_PERCENT: f64 = 1.2;

/// Annual homeowner's insurance estimate as a fraction of price.
pub const INSURANCE_RATE_OF_PRICE: f64 = 0.004;

/// Effective annual property-tax rates by state, in percent of assessed value.
const US_STATE_RATES: [(&str, f64); 20] = [
    ("AZ", 0.62),
    ("CA", 0.75),
    ("CO", 0.55),
    ("FL", 0.98),
    ("GA", 0.92),
    ("HI", 0.28),
    ("IA", 1.57),
    ("IL", 2.27),
    ("MA", 1.23),
    ("MI", 1.54),
    ("MN", 1.12),
    ("NC", 0.84),
    ("NJ", 2.49),
    ("NY", 1.72),
    ("OH", 1.56),
    ("OR", 0.97),
    ("PA", 1.58),
    ("TX", 1.80),
    ("VA", 0.82),
    ("WA", 0.98),
];

/// Region code to annual tax rate lookup, with a documented fallback rate.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTaxTable {
    rates: HashMap<String, f64>,
    default_rate_percent: f64,
}

impl Default for RegionTaxTable {
    fn default() -> Self {
        Self::us_states()
    }
}

impl RegionTaxTable {
    pub fn new(default_rate_percent: f64) -> Self {
        Self {
            rates: HashMap::new(),
            default_rate_percent,
        }
    }

    pub fn us_states() -> Self {
        US_STATE_RATES
            .iter()
            .fold(Self::new(DEFAULT_TAX_RATE_PERCENT), |table, (code, rate)| {
                table.with_rate(code, *rate)
            })
    }

    pub fn with_rate(mut self, region_code: &str, rate_percent: f64) -> Self {
        self.rates.insert(normalize_code(region_code), rate_percent);
        self
    }

    pub fn default_rate_percent(&self) -> f64 {
        self.default_rate_percent
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Rate for `region_code`, or the table default when the region is missing or unknown.
    pub fn rate_for(&self, region_code: Option<&str>) -> f64 {
        region_code
            .and_then(|code| self.rates.get(&normalize_code(code)))
            .copied()
            .unwrap_or(self.default_rate_percent)
    }

    /// Load a `region_code,rate_percent` CSV. The table holds only the regions the file lists.
    pub fn from_reader<R: Read>(
        reader: R,
        default_rate_percent: f64,
    ) -> Result<Self, RegionTaxError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut table = Self::new(default_rate_percent);

        for record in csv_reader.deserialize::<TaxRateRow>() {
            let row = record?;
            if !is_non_negative(row.rate_percent) {
                return Err(RegionTaxError::InvalidRate {
                    region: row.region_code,
                    rate: row.rate_percent,
                });
            }
            table = table.with_rate(&row.region_code, row.rate_percent);
        }

        Ok(table)
    }

    pub fn from_path(
        path: impl AsRef<Path>,
        default_rate_percent: f64,
    ) -> Result<Self, RegionTaxError> {
        let file = File::open(path)?;
        Self::from_reader(file, default_rate_percent)
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[derive(Debug, Deserialize)]
struct TaxRateRow {
    region_code: String,
    rate_percent: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum RegionTaxError {
    #[error("failed to read tax rate table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tax rate table: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid tax rate {rate} for region '{region}'")]
    InvalidRate { region: String, rate: f64 },
}

fn validate_price(price: f64) -> Result<(), FinanceError> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(FinanceError::invalid(
            "price",
            format!("must be a positive amount, got {price}"),
        ))
    }
}

/// Annual property tax: the listing's actual figure when it is usable, otherwise a regional
/// estimate.
pub fn estimate_property_tax(
    price: f64,
    region_code: Option<&str>,
    actual_tax: Option<f64>,
    table: &RegionTaxTable,
) -> Result<f64, FinanceError> {
    if let Some(actual) = actual_tax.filter(|tax| tax.is_finite() && *tax > 0.0) {
        return Ok(actual);
    }

    validate_price(price)?;
    Ok(price * table.rate_for(region_code) / 100.0)
}

/// Annual insurance: the actual premium when supplied, otherwise 0.4% of price.
pub fn estimate_insurance(price: f64, actual_insurance: Option<f64>) -> Result<f64, FinanceError> {
    if let Some(actual) = actual_insurance.filter(|premium| is_non_negative(*premium)) {
        return Ok(actual);
    }

    validate_price(price)?;
    Ok(price * INSURANCE_RATE_OF_PRICE)
}
