use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

use crate::errors::{ZakatError, ZakatResult};
use crate::inputs::IntoAmount;

/// Which metal's threshold [`crate::nisab::NisabResolver`] hands back.
///
/// Both values are always computed and snapshotted; this only selects the
/// one returned. Gold is the majority scholarly preference and the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NisabBasis {
    #[default]
    Gold,
    Silver,
}

/// Tunables for the eligibility engine.
///
/// Every field has a sensible default; construct with `EngineConfig::default()`
/// and adjust through the fluent `with_*` methods, or load from JSON / the
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Grams of gold defining the Nisab (20 mithqal convention).
    pub nisab_gold_grams: Decimal,
    /// Grams of silver defining the Nisab (200 dirham convention).
    pub nisab_silver_grams: Decimal,
    /// Zakat rate applied to zakatable wealth.
    pub zakat_rate: Decimal,
    /// Which metal's threshold the resolver returns.
    pub nisab_basis: NisabBasis,
    /// Last-resort threshold in the reference currency, used when even the
    /// snapshot store is unreachable.
    pub static_nisab_threshold: Decimal,
    /// How long a resolved price quote stays valid, per currency.
    pub price_cache_ttl_secs: u64,
    /// Timeout for a single spot-price fetch, HTTP and otherwise.
    pub price_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nisab_gold_grams: dec!(87.48),
            nisab_silver_grams: dec!(612.36),
            zakat_rate: dec!(0.025),
            nisab_basis: NisabBasis::default(),
            static_nisab_threshold: dec!(4000),
            price_cache_ttl_secs: 24 * 60 * 60,
            price_timeout_secs: 10,
        }
    }
}

impl EngineConfig {
    /// Checks the configuration for values that would make calculations
    /// meaningless (zero weights, a rate outside (0, 1), a zero timeout).
    pub fn validate(&self) -> ZakatResult<()> {
        if self.nisab_gold_grams <= Decimal::ZERO || self.nisab_silver_grams <= Decimal::ZERO {
            return Err(ZakatError::invalid_input(
                "nisab_weights",
                "Nisab metal weights must be positive",
            ));
        }
        if self.zakat_rate <= Decimal::ZERO || self.zakat_rate >= Decimal::ONE {
            return Err(ZakatError::invalid_input(
                "zakat_rate",
                format!("rate must be between 0 and 1, got {}", self.zakat_rate),
            ));
        }
        if self.static_nisab_threshold < Decimal::ZERO {
            return Err(ZakatError::invalid_input(
                "static_nisab_threshold",
                "fallback threshold must be non-negative",
            ));
        }
        if self.price_timeout_secs == 0 {
            return Err(ZakatError::invalid_input(
                "price_timeout_secs",
                "timeout must be at least one second",
            ));
        }
        Ok(())
    }

    /// Parses a configuration from a JSON string; absent fields keep their
    /// defaults.
    pub fn from_json_str(s: &str) -> ZakatResult<Self> {
        let config: EngineConfig = serde_json::from_str(s)
            .map_err(|e| ZakatError::invalid_input("config", format!("bad config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file on disk.
    pub fn try_from_json(path: &str) -> ZakatResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ZakatError::invalid_input("config", format!("cannot read {}: {}", path, e))
        })?;
        Self::from_json_str(&content)
    }

    /// Builds a configuration from `HISAB_*` environment variables, keeping
    /// defaults for anything unset.
    ///
    /// Recognised: `HISAB_NISAB_GOLD_GRAMS`, `HISAB_NISAB_SILVER_GRAMS`,
    /// `HISAB_ZAKAT_RATE`, `HISAB_STATIC_NISAB`, `HISAB_PRICE_TTL_SECS`,
    /// `HISAB_PRICE_TIMEOUT_SECS`.
    pub fn from_env() -> ZakatResult<Self> {
        let mut config = Self::default();
        if let Some(v) = env_decimal("HISAB_NISAB_GOLD_GRAMS")? {
            config.nisab_gold_grams = v;
        }
        if let Some(v) = env_decimal("HISAB_NISAB_SILVER_GRAMS")? {
            config.nisab_silver_grams = v;
        }
        if let Some(v) = env_decimal("HISAB_ZAKAT_RATE")? {
            config.zakat_rate = v;
        }
        if let Some(v) = env_decimal("HISAB_STATIC_NISAB")? {
            config.static_nisab_threshold = v;
        }
        if let Some(v) = env_u64("HISAB_PRICE_TTL_SECS")? {
            config.price_cache_ttl_secs = v;
        }
        if let Some(v) = env_u64("HISAB_PRICE_TIMEOUT_SECS")? {
            config.price_timeout_secs = v;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_weights(
        mut self,
        gold_grams: impl IntoAmount,
        silver_grams: impl IntoAmount,
    ) -> ZakatResult<Self> {
        self.nisab_gold_grams = gold_grams.into_amount()?;
        self.nisab_silver_grams = silver_grams.into_amount()?;
        Ok(self)
    }

    pub fn with_zakat_rate(mut self, rate: impl IntoAmount) -> ZakatResult<Self> {
        self.zakat_rate = rate.into_amount()?;
        Ok(self)
    }

    pub fn with_nisab_basis(mut self, basis: NisabBasis) -> Self {
        self.nisab_basis = basis;
        self
    }

    pub fn with_static_threshold(mut self, threshold: impl IntoAmount) -> ZakatResult<Self> {
        self.static_nisab_threshold = threshold.into_amount()?;
        Ok(self)
    }

    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.price_cache_ttl_secs = secs;
        self
    }

    pub fn with_price_timeout_secs(mut self, secs: u64) -> Self {
        self.price_timeout_secs = secs;
        self
    }
}

fn env_decimal(key: &'static str) -> ZakatResult<Option<Decimal>> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<Decimal>()
            .map(Some)
            .map_err(|e| ZakatError::invalid_input("config", format!("{}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

fn env_u64(key: &'static str) -> ZakatResult<Option<u64>> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|e| ZakatError::invalid_input("config", format!("{}: {}", key, e))),
        Err(_) => Ok(None),
    }
}
