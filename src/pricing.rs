//! Spot metal prices with caching and static fallback.
//!
//! The Nisab threshold is pegged to gold and silver market prices, so this
//! module is the engine's only network-facing edge. The design goal is that
//! an obligation check must never fail because a price API is down: every
//! quote request resolves, falling back to a static per-currency constant
//! table when the live source errors, times out, or has no credential.
//!
//! [`PriceQuoteProvider`] keeps one resolved quote per currency for the cache
//! TTL (24 hours by default), fallback quotes included, so a failing upstream
//! is not re-hit on every calculation.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use once_cell::sync::Lazy;

use crate::calendar::today_gregorian;
use crate::config::EngineConfig;
use crate::currency::Currency;
use crate::errors::{ZakatError, ZakatResult};
use crate::inputs::IntoAmount;

/// Grams per troy ounce, the unit spot markets quote in.
pub const OUNCE_TO_GRAM: Decimal = dec!(31.1035);

/// The two metals a Nisab threshold can be pegged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Metal {
    Gold,
    Silver,
}

impl Metal {
    /// Market symbol used by spot-price APIs.
    pub fn symbol(&self) -> &'static str {
        match self {
            Metal::Gold => "XAU",
            Metal::Silver => "XAG",
        }
    }
}

/// Where a quote's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    /// Both legs fetched live.
    Api,
    /// At least one leg substituted from the static constant table.
    Fallback,
}

impl QuoteSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, QuoteSource::Fallback)
    }
}

/// Per-gram gold and silver prices resolved for one currency on one day.
///
/// Immutable once resolved; superseded when the cache TTL lapses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalPriceQuote {
    pub gold_per_gram: Decimal,
    pub silver_per_gram: Decimal,
    pub currency: Currency,
    pub date: NaiveDate,
    pub source: QuoteSource,
}

/// Static per-gram fallback constants, deliberately conservative and updated
/// rarely. They keep every downstream calculation defined when no live price
/// is available for the currency.
static FALLBACK_PRICES: Lazy<HashMap<Currency, (Decimal, Decimal)>> = Lazy::new(|| {
    HashMap::from([
        (Currency::Usd, (dec!(75.00), dec!(0.90))),
        (Currency::Eur, (dec!(68.00), dec!(0.82))),
        (Currency::Gbp, (dec!(58.00), dec!(0.70))),
        (Currency::Sar, (dec!(281.00), dec!(3.38))),
        (Currency::Aed, (dec!(275.00), dec!(3.30))),
        (Currency::Idr, (dec!(1180000), dec!(14200))),
        (Currency::Myr, (dec!(330.00), dec!(4.00))),
        (Currency::Pkr, (dec!(20900), dec!(250))),
        (Currency::Bdt, (dec!(8200), dec!(98))),
        (Currency::Egp, (dec!(3600), dec!(43))),
        (Currency::Try, (dec!(2450), dec!(29))),
    ])
});

/// Fallback (gold, silver) per-gram prices for a currency.
pub fn fallback_prices(currency: Currency) -> (Decimal, Decimal) {
    FALLBACK_PRICES
        .get(&currency)
        .copied()
        .unwrap_or_else(|| FALLBACK_PRICES[&Currency::Usd])
}

/// External market-data collaborator: one spot price per call, quoted per
/// troy ounce in the requested currency.
///
/// Implementations may be unavailable (no credential configured); the
/// provider absorbs every failure into the fallback table.
#[async_trait::async_trait]
pub trait SpotPriceClient: Send + Sync {
    async fn fetch_spot(&self, metal: Metal, currency: Currency) -> ZakatResult<Decimal>;
}

/// A fixed-price client for tests, demos, and offline use.
#[derive(Debug, Clone)]
pub struct StaticSpotClient {
    gold_per_ounce: Decimal,
    silver_per_ounce: Decimal,
}

impl StaticSpotClient {
    pub fn new(
        gold_per_ounce: impl IntoAmount,
        silver_per_ounce: impl IntoAmount,
    ) -> ZakatResult<Self> {
        let gold = gold_per_ounce.into_amount()?;
        let silver = silver_per_ounce.into_amount()?;
        if gold < Decimal::ZERO || silver < Decimal::ZERO {
            return Err(ZakatError::invalid_input(
                "spot_prices",
                "spot prices must be non-negative",
            ));
        }
        Ok(Self { gold_per_ounce: gold, silver_per_ounce: silver })
    }
}

#[async_trait::async_trait]
impl SpotPriceClient for StaticSpotClient {
    async fn fetch_spot(&self, metal: Metal, _currency: Currency) -> ZakatResult<Decimal> {
        Ok(match metal {
            Metal::Gold => self.gold_per_ounce,
            Metal::Silver => self.silver_per_ounce,
        })
    }
}

/// Live spot prices from the goldapi.io public API.
///
/// Needs an access token; without one every fetch fails fast and the
/// provider serves fallback constants instead.
#[cfg(feature = "live-pricing")]
pub struct GoldApiClient {
    client: reqwest::Client,
    token: Option<String>,
}

#[cfg(feature = "live-pricing")]
#[derive(serde::Deserialize)]
struct GoldApiTicker {
    price: f64,
}

#[cfg(feature = "live-pricing")]
impl GoldApiClient {
    /// Creates a client with the given token and per-request timeout.
    pub fn new(token: Option<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client, token }
    }

    /// Builds a client from `HISAB_GOLDAPI_TOKEN`, if set.
    pub fn from_env(timeout_secs: u64) -> Self {
        Self::new(std::env::var("HISAB_GOLDAPI_TOKEN").ok(), timeout_secs)
    }
}

#[cfg(feature = "live-pricing")]
#[async_trait::async_trait]
impl SpotPriceClient for GoldApiClient {
    async fn fetch_spot(&self, metal: Metal, currency: Currency) -> ZakatResult<Decimal> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| ZakatError::PriceSource("no goldapi.io token configured".into()))?;

        let url = format!("https://www.goldapi.io/api/{}/{}", metal.symbol(), currency);
        let response = self
            .client
            .get(&url)
            .header("x-access-token", token)
            .send()
            .await
            .map_err(|e| ZakatError::PriceSource(format!("goldapi request failed: {}", e)))?;

        let ticker: GoldApiTicker = response
            .json()
            .await
            .map_err(|e| ZakatError::PriceSource(format!("goldapi response unreadable: {}", e)))?;

        let price = Decimal::from_f64_retain(ticker.price)
            .filter(|p| *p > Decimal::ZERO)
            .ok_or_else(|| {
                ZakatError::PriceSource(format!("goldapi returned unusable price {}", ticker.price))
            })?;
        Ok(price)
    }
}

struct CachedQuote {
    fetched_at: Instant,
    quote: MetalPriceQuote,
}

/// Resolves per-gram metal prices with a per-currency TTL cache.
///
/// `get_prices` never fails: each metal leg that cannot be fetched live is
/// substituted from the fallback table, and the resulting quote is cached
/// either way so a dead upstream is not retried until the TTL lapses.
pub struct PriceQuoteProvider {
    client: Arc<dyn SpotPriceClient>,
    cache: RwLock<HashMap<Currency, CachedQuote>>,
    ttl: Duration,
    timeout: Duration,
}

impl PriceQuoteProvider {
    pub fn new(client: Arc<dyn SpotPriceClient>, config: &EngineConfig) -> Self {
        Self {
            client,
            cache: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(config.price_cache_ttl_secs),
            timeout: Duration::from_secs(config.price_timeout_secs),
        }
    }

    /// Current per-gram prices for the currency: cache first, then a live
    /// fetch, then the fallback table.
    pub async fn get_prices(&self, currency: Currency) -> MetalPriceQuote {
        if let Ok(guard) = self.cache.read() {
            if let Some(cached) = guard.get(&currency) {
                if cached.fetched_at.elapsed() < self.ttl {
                    tracing::debug!(%currency, "price cache hit");
                    return cached.quote.clone();
                }
            }
        }

        let (gold_leg, silver_leg) = futures::join!(
            self.fetch_leg(Metal::Gold, currency),
            self.fetch_leg(Metal::Silver, currency),
        );

        let (fallback_gold, fallback_silver) = fallback_prices(currency);
        let mut degraded = false;

        let gold_per_gram = gold_leg.unwrap_or_else(|e| {
            tracing::warn!(%currency, error = %e, "gold spot unavailable, using fallback");
            degraded = true;
            fallback_gold
        });
        let silver_per_gram = silver_leg.unwrap_or_else(|e| {
            tracing::warn!(%currency, error = %e, "silver spot unavailable, using fallback");
            degraded = true;
            fallback_silver
        });

        let quote = MetalPriceQuote {
            gold_per_gram,
            silver_per_gram,
            currency,
            date: today_gregorian(),
            source: if degraded { QuoteSource::Fallback } else { QuoteSource::Api },
        };

        // Cache fallback quotes too: a dead upstream should not be re-hit
        // on every calculation within the TTL window.
        if let Ok(mut guard) = self.cache.write() {
            guard.insert(
                currency,
                CachedQuote { fetched_at: Instant::now(), quote: quote.clone() },
            );
        }

        quote
    }

    /// One metal leg: external call bounded by the configured timeout,
    /// ounce-to-gram conversion, non-positive prices rejected.
    async fn fetch_leg(&self, metal: Metal, currency: Currency) -> ZakatResult<Decimal> {
        let per_ounce = tokio::time::timeout(self.timeout, self.client.fetch_spot(metal, currency))
            .await
            .map_err(|_| ZakatError::PriceSource(format!("{} spot fetch timed out", metal)))??;
        if per_ounce <= Decimal::ZERO {
            return Err(ZakatError::PriceSource(format!(
                "{} spot price must be positive, got {}",
                metal, per_ounce
            )));
        }
        Ok(per_ounce / OUNCE_TO_GRAM)
    }
}
