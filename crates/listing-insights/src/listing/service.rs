use std::sync::Arc;

use tracing::{debug, info, warn};

use super::cache::{CacheKey, CachedInsight, InsightValue, InsightsCache};
use super::report::{
    MortgageCalculatorRequest, PaymentReport, PaymentRequest, PricedPaymentReport, ResolvedTerms,
};
use super::sources::{AmenitySource, ListingDataSource, ListingFinancials, ListingId, SourceError};
use crate::finance::{
    assess_affordability, compute_payment_scenario, compute_payment_scenarios,
    estimate_insurance, estimate_property_tax, AffordabilityPolicy, FinanceError,
    LoanParameters, RecurringCosts, RegionTaxTable, DEFAULT_PMI_RATE_PERCENT,
    STANDARD_DOWN_PAYMENT_SWEEP,
};
use crate::market::{classify_market_position, MarketPosition};
use crate::walkability::{WalkabilityConfig, WalkabilityEngine, WalkabilityScore};

/// Loan defaults applied when a request leaves terms out.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightsSettings {
    pub down_payment_percent: f64,
    pub interest_rate_annual_percent: f64,
    pub loan_term_years: u32,
    pub pmi_rate_percent: f64,
    pub affordability: AffordabilityPolicy,
    pub sweep: Vec<u8>,
}

impl Default for InsightsSettings {
    fn default() -> Self {
        Self {
            down_payment_percent: 20.0,
            interest_rate_annual_percent: 6.5,
            loan_term_years: 30,
            pmi_rate_percent: DEFAULT_PMI_RATE_PERCENT,
            affordability: AffordabilityPolicy::default(),
            sweep: STANDARD_DOWN_PAYMENT_SWEEP.to_vec(),
        }
    }
}

impl InsightsSettings {
    pub(crate) fn resolve(&self, request: &PaymentRequest) -> ResolvedTerms {
        ResolvedTerms {
            down_payment_percent: request
                .down_payment_percent
                .unwrap_or(self.down_payment_percent),
            interest_rate_annual_percent: request
                .interest_rate_annual_percent
                .unwrap_or(self.interest_rate_annual_percent),
            loan_term_years: request.loan_term_years.unwrap_or(self.loan_term_years),
            pmi_rate_percent: self.pmi_rate_percent,
            target_debt_to_income_percent: self.affordability.target_debt_to_income_percent,
            buyer_annual_income: request.buyer_annual_income,
            sweep: request
                .down_payment_percents
                .clone()
                .unwrap_or_else(|| self.sweep.clone()),
        }
    }
}

/// Caller-side composition of the calculators with listing, amenity and cache collaborators.
pub struct ListingInsightsService<L, A, C> {
    listings: Arc<L>,
    amenities: Arc<A>,
    cache: Arc<C>,
    tax_table: Arc<RegionTaxTable>,
    settings: InsightsSettings,
    walkability: WalkabilityEngine,
}

impl<L, A, C> ListingInsightsService<L, A, C>
where
    L: ListingDataSource + 'static,
    A: AmenitySource + 'static,
    C: InsightsCache + 'static,
{
    pub fn new(
        listings: Arc<L>,
        amenities: Arc<A>,
        cache: Arc<C>,
        tax_table: RegionTaxTable,
        settings: InsightsSettings,
    ) -> Self {
        Self {
            listings,
            amenities,
            cache,
            tax_table: Arc::new(tax_table),
            settings,
            walkability: WalkabilityEngine::default(),
        }
    }

    pub fn with_walkability_config(mut self, config: WalkabilityConfig) -> Self {
        self.walkability = WalkabilityEngine::new(config);
        self
    }

    pub fn settings(&self) -> &InsightsSettings {
        &self.settings
    }

    pub fn walkability_engine(&self) -> &WalkabilityEngine {
        &self.walkability
    }

    /// Payment sweep, affordability and market position for a stored listing.
    ///
    /// Listings without a usable price produce [`PaymentReport::ContactForPricing`] instead
    /// of a payment.
    pub fn payment_report(
        &self,
        listing_id: &ListingId,
        request: &PaymentRequest,
    ) -> Result<PaymentReport, InsightsError> {
        let terms = self.settings.resolve(request);
        let key = CacheKey::payments(listing_id, &terms);
        if let Some(CachedInsight {
            value: InsightValue::Payments(report),
            ..
        }) = self.cache.get(&key)
        {
            debug!(%listing_id, key = key.as_str(), "payment report served from cache");
            return Ok(report);
        }

        let financials = self.fetch(listing_id)?;
        let report = match financials.usable_price() {
            Some(price) => {
                let priced = self.price_listing(Some(listing_id), price, &financials, &terms)?;
                PaymentReport::Priced(Box::new(priced))
            }
            None => {
                info!(%listing_id, "listing has no usable price; deferring to agent contact");
                PaymentReport::contact_for_pricing(listing_id)
            }
        };

        self.cache
            .put(key, CachedInsight::now(InsightValue::Payments(report.clone())));
        Ok(report)
    }

    /// Same report for figures supplied inline rather than fetched.
    pub fn calculate(
        &self,
        request: &MortgageCalculatorRequest,
    ) -> Result<PricedPaymentReport, InsightsError> {
        let terms = self.settings.resolve(&request.terms);
        let financials = request.financials();
        Ok(self.price_listing(None, request.price, &financials, &terms)?)
    }

    fn price_listing(
        &self,
        listing_id: Option<&ListingId>,
        price: f64,
        financials: &ListingFinancials,
        terms: &ResolvedTerms,
    ) -> Result<PricedPaymentReport, FinanceError> {
        let costs = RecurringCosts {
            annual_property_tax: estimate_property_tax(
                price,
                financials.region_code.as_deref(),
                financials.actual_tax,
                &self.tax_table,
            )?,
            annual_insurance: estimate_insurance(price, financials.actual_insurance)?,
            monthly_hoa: financials.monthly_hoa.unwrap_or(0.0),
        };

        let loan = LoanParameters {
            price,
            down_payment_percent: terms.down_payment_percent,
            interest_rate_annual_percent: terms.interest_rate_annual_percent,
            loan_term_years: terms.loan_term_years,
            pmi_rate_percent: terms.pmi_rate_percent,
        };

        let selected = compute_payment_scenario(&loan, &costs)?;
        let sweep = compute_payment_scenarios(&loan, &costs, &terms.sweep)?;
        let affordability = assess_affordability(
            &selected,
            &self.settings.affordability,
            terms.buyer_annual_income,
        )?;
        let hint = financials
            .market_position_hint
            .as_deref()
            .and_then(MarketPosition::from_hint);
        let market = classify_market_position(
            price,
            financials.estimated_value,
            financials.comparable_average,
            hint,
        )?;

        Ok(PricedPaymentReport {
            listing_id: listing_id.cloned(),
            price,
            costs,
            selected,
            sweep,
            affordability,
            market,
        })
    }

    /// Walkability for a stored listing.
    ///
    /// A category whose amenity lookup fails is scored as empty and the partial score is
    /// not cached; a listing without coordinates scores the floor.
    pub fn walkability(&self, listing_id: &ListingId) -> Result<WalkabilityScore, InsightsError> {
        let key = CacheKey::walkability(listing_id);
        if let Some(CachedInsight {
            value: InsightValue::Walkability(score),
            ..
        }) = self.cache.get(&key)
        {
            debug!(%listing_id, "walkability served from cache");
            return Ok(score);
        }

        let financials = self.fetch(listing_id)?;
        let mut observations = Vec::new();
        let mut degraded = false;

        match financials.location {
            Some(origin) => {
                for rule in &self.walkability.config().categories {
                    match self.amenities.nearby(&origin, rule.category) {
                        Ok(found) => observations.extend(
                            found
                                .into_iter()
                                .filter(|observation| observation.category == rule.category),
                        ),
                        Err(err) => {
                            degraded = true;
                            warn!(
                                %listing_id,
                                category = rule.category.label(),
                                error = %err,
                                "amenity lookup failed; scoring category as empty"
                            );
                        }
                    }
                }
            }
            None => warn!(%listing_id, "listing has no coordinates; walkability defaults to floor"),
        }

        let score = self.walkability.score(&observations);
        if degraded {
            debug!(%listing_id, "partial walkability score left uncached");
        } else {
            self.cache
                .put(key, CachedInsight::now(InsightValue::Walkability(score.clone())));
        }
        Ok(score)
    }

    fn fetch(&self, listing_id: &ListingId) -> Result<ListingFinancials, InsightsError> {
        self.listings
            .financials(listing_id)?
            .ok_or_else(|| InsightsError::ListingNotFound(listing_id.clone()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InsightsError {
    #[error(transparent)]
    Finance(#[from] FinanceError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("listing {0} not found")]
    ListingNotFound(ListingId),
}
