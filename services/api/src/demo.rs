use crate::infra::{InMemoryAmenitySource, InMemoryListingSource, TtlInsightsCache};
use clap::Args;
use listing_insights::config::AppConfig;
use listing_insights::error::AppError;
use listing_insights::finance::{amortization_schedule, AmortizationYear, LoanParameters};
use listing_insights::listing::{
    InsightsError, ListingInsightsService, MortgageCalculatorRequest, NoCache, PaymentReport,
    PaymentRequest, PricedPaymentReport,
};
use listing_insights::numeric::{format_currency, round_money};
use listing_insights::walkability::{AmenityCategory, AmenityObservation, WalkabilityScore};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct MortgageArgs {
    /// Listing price in dollars
    #[arg(long)]
    pub(crate) price: f64,
    /// Down payment as a percent of price (defaults to 20)
    #[arg(long)]
    pub(crate) down_payment: Option<f64>,
    /// Annual interest rate percent (defaults to the configured rate)
    #[arg(long)]
    pub(crate) rate: Option<f64>,
    /// Loan term in years (defaults to the configured term)
    #[arg(long)]
    pub(crate) term: Option<u32>,
    /// Actual annual property tax; estimated from the region when omitted
    #[arg(long)]
    pub(crate) tax: Option<f64>,
    /// Actual annual insurance premium; estimated from the price when omitted
    #[arg(long)]
    pub(crate) insurance: Option<f64>,
    /// Monthly HOA dues
    #[arg(long)]
    pub(crate) hoa: Option<f64>,
    /// Two-letter region code used for the tax estimate
    #[arg(long)]
    pub(crate) region: Option<String>,
    /// Buyer annual income for the affordability rating
    #[arg(long)]
    pub(crate) income: Option<f64>,
    /// Automated value estimate for the market comparison
    #[arg(long)]
    pub(crate) estimated_value: Option<f64>,
    /// Average price of comparable sales
    #[arg(long)]
    pub(crate) comparables: Option<f64>,
    /// Upstream market classification (underpriced, fair_value, overpriced, premium)
    #[arg(long)]
    pub(crate) market_hint: Option<String>,
    /// Print the yearly amortization schedule
    #[arg(long)]
    pub(crate) schedule: bool,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

impl MortgageArgs {
    fn request(&self) -> MortgageCalculatorRequest {
        MortgageCalculatorRequest {
            price: self.price,
            region_code: self.region.clone(),
            annual_property_tax: self.tax,
            annual_insurance: self.insurance,
            monthly_hoa: self.hoa,
            estimated_value: self.estimated_value,
            comparable_average: self.comparables,
            market_position_hint: self.market_hint.clone(),
            terms: PaymentRequest {
                down_payment_percent: self.down_payment,
                interest_rate_annual_percent: self.rate,
                loan_term_years: self.term,
                buyer_annual_income: self.income,
                down_payment_percents: None,
            },
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct WalkabilityArgs {
    /// Nearby amenity as CATEGORY:MILES, e.g. restaurant:0.25 (repeatable)
    #[arg(long = "amenity", value_parser = parse_amenity)]
    pub(crate) amenities: Vec<AmenityObservation>,
    /// Print the score as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Buyer income used for the affordability portion of the demo
    #[arg(long, default_value_t = 120_000.0)]
    pub(crate) income: f64,
}

pub(crate) fn parse_amenity(raw: &str) -> Result<AmenityObservation, String> {
    let (category, distance) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected CATEGORY:MILES, got '{raw}'"))?;
    let category = AmenityCategory::from_key(category)
        .ok_or_else(|| format!("unknown amenity category '{category}'"))?;
    let distance = distance
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid distance '{distance}' ({err})"))?;
    if !distance.is_finite() || distance < 0.0 {
        return Err(format!("distance must be zero or more miles, got {distance}"));
    }
    Ok(AmenityObservation::new(category, distance))
}

pub(crate) fn run_mortgage(args: MortgageArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = ListingInsightsService::new(
        Arc::new(InMemoryListingSource::default()),
        Arc::new(InMemoryAmenitySource::default()),
        Arc::new(NoCache),
        config.insights.tax_table()?,
        config.insights.settings(),
    );

    let report = service.calculate(&args.request())?;
    let rounded = PaymentReport::Priced(Box::new(report.clone())).rounded();

    if args.json {
        match serde_json::to_string_pretty(&rounded) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Report unavailable as JSON: {err}"),
        }
    } else if let Some(priced) = rounded.priced() {
        render_payment_report(priced);
    }

    if args.schedule {
        let settings = service.settings();
        let loan = LoanParameters {
            price: report.price,
            down_payment_percent: report.selected.down_payment_percent,
            interest_rate_annual_percent: args
                .rate
                .unwrap_or(settings.interest_rate_annual_percent),
            loan_term_years: args.term.unwrap_or(settings.loan_term_years),
            pmi_rate_percent: settings.pmi_rate_percent,
        };
        render_schedule(&amortization_schedule(&loan).map_err(InsightsError::from)?);
    }

    Ok(())
}

pub(crate) fn run_walkability(args: WalkabilityArgs) -> Result<(), AppError> {
    let score = listing_insights::walkability::estimate_walkability(&args.amenities);
    if args.json {
        match serde_json::to_string_pretty(&score) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Score unavailable as JSON: {err}"),
        }
    } else {
        render_walkability(&score);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let listings = InMemoryListingSource::demo();
    let ids = listings.ids();
    let service = ListingInsightsService::new(
        Arc::new(listings),
        Arc::new(InMemoryAmenitySource::demo()),
        Arc::new(TtlInsightsCache::new(config.insights.cache_ttl_secs)),
        config.insights.tax_table()?,
        config.insights.settings(),
    );
    let request = PaymentRequest {
        buyer_annual_income: Some(args.income),
        ..PaymentRequest::default()
    };

    println!("Listing insights demo");
    println!(
        "Buyer income {} | {}% of gross income toward housing",
        format_currency(args.income),
        service.settings().affordability.target_debt_to_income_percent
    );

    for id in ids {
        println!("\n=== Listing {id} ===");
        match service.payment_report(&id, &request) {
            Ok(report) => match report.rounded() {
                PaymentReport::ContactForPricing { message, .. } => println!("{message}"),
                PaymentReport::Priced(priced) => render_payment_report(&priced),
            },
            Err(err) => println!("Payment report unavailable: {err}"),
        }

        match service.walkability(&id) {
            Ok(score) => render_walkability(&score),
            Err(err) => println!("Walkability unavailable: {err}"),
        }
    }

    Ok(())
}

pub(crate) fn render_payment_report(report: &PricedPaymentReport) {
    let selected = &report.selected;
    println!(
        "Price {} | {}% down ({})",
        format_currency(report.price),
        selected.down_payment_percent,
        format_currency(selected.down_payment_amount)
    );
    println!("Loan amount: {}", format_currency(selected.loan_amount));
    println!("Monthly payment breakdown");
    println!(
        "  Principal & interest: {}",
        format_currency(selected.monthly_principal_interest)
    );
    println!("  Property tax: {}", format_currency(selected.monthly_taxes));
    println!("  Insurance: {}", format_currency(selected.monthly_insurance));
    if selected.monthly_hoa > 0.0 {
        println!("  HOA: {}", format_currency(selected.monthly_hoa));
    }
    if selected.monthly_pmi > 0.0 {
        println!("  PMI: {}", format_currency(selected.monthly_pmi));
    }
    println!(
        "  Total: {} | {} interest over the term",
        format_currency(selected.total_monthly_payment),
        format_currency(selected.total_interest_over_term)
    );

    if !report.sweep.is_empty() {
        println!("Down payment options");
        for (percent, scenario) in report.sweep.iter() {
            println!(
                "  - {percent}% down: {}/mo{}",
                format_currency(scenario.total_monthly_payment),
                if scenario.monthly_pmi > 0.0 {
                    format!(" (includes {} PMI)", format_currency(scenario.monthly_pmi))
                } else {
                    String::new()
                }
            );
        }
    }

    let affordability = &report.affordability;
    println!(
        "Affordability: {} | required income {}",
        affordability.rating.label(),
        format_currency(affordability.required_annual_income)
    );
    if affordability.income_ratio.is_some() {
        println!("  Income gap: {}", format_currency(affordability.income_gap));
    }

    let market = &report.market;
    println!(
        "Market position: {} | {:+.2}% vs estimate | {:+.2}% vs comparables",
        market.label, market.price_vs_estimate_percent, market.price_vs_comparables_percent
    );
}

pub(crate) fn render_schedule(schedule: &[AmortizationYear]) {
    println!("Amortization schedule");
    for year in schedule {
        println!(
            "  Year {:>2}: principal {} | interest {} | balance {}",
            year.year,
            format_currency(round_money(year.principal_paid)),
            format_currency(round_money(year.interest_paid)),
            format_currency(round_money(year.ending_balance))
        );
    }
}

pub(crate) fn render_walkability(score: &WalkabilityScore) {
    println!("Walkability {}/100 ({})", score.score, score.description());
    for category in &score.categories {
        println!(
            "  - {}: {} nearby, {} in range, {:.1} pts",
            category.category.label(),
            category.observations,
            category.within_range,
            category.score
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_amenity_pairs() {
        let observation = parse_amenity("Grocery: 0.4").expect("parses");
        assert_eq!(observation.category, AmenityCategory::Grocery);
        assert_eq!(observation.distance_miles, 0.4);
    }

    #[test]
    fn rejects_negative_or_unknown_amenities() {
        assert!(parse_amenity("bank:-1").is_err());
        assert!(parse_amenity("museum:0.3").is_err());
        assert!(parse_amenity("transit").is_err());
    }

    #[test]
    fn mortgage_args_map_onto_calculator_request() {
        let args = MortgageArgs {
            price: 400_000.0,
            down_payment: Some(10.0),
            rate: None,
            term: Some(15),
            tax: Some(4_800.0),
            insurance: None,
            hoa: Some(75.0),
            region: Some("IA".to_string()),
            income: Some(110_000.0),
            estimated_value: None,
            comparables: None,
            market_hint: Some("overpriced".to_string()),
            schedule: false,
            json: false,
        };

        let request = args.request();
        assert_eq!(request.price, 400_000.0);
        assert_eq!(request.annual_property_tax, Some(4_800.0));
        assert_eq!(request.terms.down_payment_percent, Some(10.0));
        assert_eq!(request.terms.loan_term_years, Some(15));
        assert!(request.terms.interest_rate_annual_percent.is_none());
        assert_eq!(request.market_position_hint.as_deref(), Some("overpriced"));
    }
}
