//! Nisab threshold derivation and daily snapshot pinning.
//!
//! The Nisab is the minimum wealth at which Zakat becomes obligatory,
//! defined by metal weight (87.48g gold or 612.36g silver) and priced in the
//! user's currency. Because spot prices move intraday, the resolved threshold
//! is pinned per (date, currency) through a [`SnapshotStore`]: everyone
//! calculating on the same day sees the same number.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;

use crate::calendar::today_gregorian;
use crate::config::{EngineConfig, NisabBasis};
use crate::currency::Currency;
use crate::errors::{ZakatError, ZakatResult};
use crate::pricing::{PriceQuoteProvider, QuoteSource};

/// One day's Nisab threshold for one currency, carrying both metal bases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NisabThreshold {
    pub gold_based: Decimal,
    pub silver_based: Decimal,
    pub currency: Currency,
    pub date: NaiveDate,
    pub source: QuoteSource,
}

impl NisabThreshold {
    /// The threshold amount under the given basis policy.
    pub fn for_basis(&self, basis: NisabBasis) -> Decimal {
        match basis {
            NisabBasis::Gold => self.gold_based,
            NisabBasis::Silver => self.silver_based,
        }
    }
}

/// Daily snapshot persistence, natural-keyed by (date, currency).
///
/// Upsert semantics, last write wins: concurrent same-day writers derive the
/// same value from the same cached quote, so racing is harmless.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn get(
        &self,
        date: NaiveDate,
        currency: Currency,
    ) -> ZakatResult<Option<NisabThreshold>>;

    async fn upsert(&self, threshold: &NisabThreshold) -> ZakatResult<()>;
}

/// Map-backed snapshot store.
#[derive(Default)]
pub struct InMemorySnapshotStore {
    inner: RwLock<HashMap<(NaiveDate, Currency), NisabThreshold>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn get(
        &self,
        date: NaiveDate,
        currency: Currency,
    ) -> ZakatResult<Option<NisabThreshold>> {
        let guard = self
            .inner
            .read()
            .map_err(|_| ZakatError::Snapshot("snapshot lock poisoned".into()))?;
        Ok(guard.get(&(date, currency)).cloned())
    }

    async fn upsert(&self, threshold: &NisabThreshold) -> ZakatResult<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| ZakatError::Snapshot("snapshot lock poisoned".into()))?;
        guard.insert((threshold.date, threshold.currency), threshold.clone());
        Ok(())
    }
}

/// Derives Nisab thresholds from metal prices and pins one value per
/// (date, currency) through the snapshot store.
pub struct NisabResolver {
    provider: Arc<PriceQuoteProvider>,
    store: Arc<dyn SnapshotStore>,
    gold_grams: Decimal,
    silver_grams: Decimal,
    basis: NisabBasis,
    static_threshold: Decimal,
}

impl NisabResolver {
    pub fn new(
        provider: Arc<PriceQuoteProvider>,
        store: Arc<dyn SnapshotStore>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            provider,
            store,
            gold_grams: config.nisab_gold_grams,
            silver_grams: config.nisab_silver_grams,
            basis: config.nisab_basis,
            static_threshold: config.static_nisab_threshold,
        }
    }

    /// The threshold for an explicit date. A stored snapshot wins; on miss
    /// the value is derived from current prices and pinned under
    /// (date, currency).
    pub async fn threshold_for(
        &self,
        date: NaiveDate,
        currency: Currency,
    ) -> ZakatResult<NisabThreshold> {
        if let Some(snapshot) = self.store.get(date, currency).await? {
            return Ok(snapshot);
        }

        let quote = self.provider.get_prices(currency).await;
        let threshold = NisabThreshold {
            gold_based: quote.gold_per_gram * self.gold_grams,
            silver_based: quote.silver_per_gram * self.silver_grams,
            currency,
            date,
            source: quote.source,
        };
        self.store.upsert(&threshold).await?;
        Ok(threshold)
    }

    /// Today's threshold amount under the configured basis. Never fails: a
    /// snapshot-store failure degrades to the configured static threshold.
    pub async fn get_threshold(&self, currency: Currency) -> Decimal {
        self.resolve_current(currency).await.0
    }

    /// Today's threshold amount plus whether any fallback was involved,
    /// feeding result provenance flags.
    pub(crate) async fn resolve_current(&self, currency: Currency) -> (Decimal, bool) {
        match self.threshold_for(today_gregorian(), currency).await {
            Ok(threshold) => (
                threshold.for_basis(self.basis),
                threshold.source.is_fallback(),
            ),
            Err(e) => {
                tracing::warn!(
                    %currency,
                    error = %e,
                    "nisab snapshot unavailable, using static threshold"
                );
                (self.static_threshold, true)
            }
        }
    }
}
