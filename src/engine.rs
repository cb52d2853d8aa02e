//! The Zakat engine: point-in-time calculation and Hawl-anchored
//! eligibility.
//!
//! Both entry points are total functions. A price outage, a failing ledger
//! or a missing profile never surfaces as an error; the result degrades to
//! zeros and fallback values with `degraded = true` so callers can tell a
//! live computation from a best-effort one. Hard errors are reserved for
//! construction time (invalid configuration).

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarConverter, HijriDate, today_gregorian};
use crate::config::EngineConfig;
use crate::currency::Currency;
use crate::errors::ZakatResult;
use crate::ledger::{InMemoryLedgerStore, LedgerStore, WealthAggregator};
use crate::nisab::{InMemorySnapshotStore, NisabResolver, SnapshotStore};
use crate::payments::PaymentLedger;
use crate::pricing::{PriceQuoteProvider, SpotPriceClient};
use crate::profile::{HawlAnchor, InMemoryProfileStore, ProfileStore};

/// Point-in-time Zakat position, recomputed on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZakatCalculation {
    pub current_savings: Decimal,
    pub zakatable_income: Decimal,
    pub debts: Decimal,
    pub total_zakatable_wealth: Decimal,
    pub nisab_threshold: Decimal,
    pub zakat_due: Decimal,
    pub is_above_nisab: bool,
    pub amount_to_reach_nisab: Decimal,
    pub currency: Currency,
    /// True when any input came from a fallback instead of live data.
    pub degraded: bool,
}

impl ZakatCalculation {
    /// One-line human-readable position, amounts at cent precision.
    pub fn summary(&self) -> String {
        let verdict = if self.is_above_nisab {
            format!("zakat due {} {}", self.zakat_due.round_dp(2), self.currency)
        } else {
            format!(
                "below nisab by {} {}",
                self.amount_to_reach_nisab.round_dp(2),
                self.currency
            )
        };
        format!(
            "wealth {} {} against nisab {} {}: {}",
            self.total_zakatable_wealth.round_dp(2),
            self.currency,
            self.nisab_threshold.round_dp(2),
            self.currency,
            verdict
        )
    }
}

/// Hawl-anchored annual eligibility verdict.
///
/// The date fields are `None` when the user has no Hawl anchor configured;
/// `days_until_zakat_date` counts to the next anniversary occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZakatEligibilityResult {
    pub is_obligatory: bool,
    pub annual_savings: Decimal,
    pub nisab_threshold: Decimal,
    pub zakat_amount_due: Decimal,
    /// Whether the window's savings cleared the threshold, evaluated at the
    /// window's close only. Strict Hawl would require wealth to stay above
    /// Nisab continuously across the year; that is not checked here.
    pub has_maintained_nisab: bool,
    pub days_until_zakat_date: Option<i64>,
    pub next_zakat_date_hijri: Option<HijriDate>,
    pub next_zakat_date_gregorian: Option<NaiveDate>,
    pub currency: Currency,
    pub degraded: bool,
}

impl ZakatEligibilityResult {
    /// The shape reported when no anchor is configured or an upstream
    /// failed: nothing owed, no dates.
    fn empty(currency: Currency, degraded: bool) -> Self {
        Self {
            is_obligatory: false,
            annual_savings: Decimal::ZERO,
            nisab_threshold: Decimal::ZERO,
            zakat_amount_due: Decimal::ZERO,
            has_maintained_nisab: false,
            days_until_zakat_date: None,
            next_zakat_date_hijri: None,
            next_zakat_date_gregorian: None,
            currency,
            degraded,
        }
    }
}

/// Orchestrates calendar, prices, ledger and profile into Zakat verdicts.
pub struct ZakatEngine {
    config: EngineConfig,
    calendar: CalendarConverter,
    wealth: WealthAggregator,
    nisab: Arc<NisabResolver>,
    profiles: Arc<dyn ProfileStore>,
    payments: PaymentLedger,
}

impl ZakatEngine {
    pub fn builder() -> ZakatEngineBuilder {
        ZakatEngineBuilder::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn calendar(&self) -> &CalendarConverter {
        &self.calendar
    }

    /// Payment recording and history, sharing this engine's ledger.
    pub fn payments(&self) -> &PaymentLedger {
        &self.payments
    }

    /// Today's Nisab threshold in the given currency. Infallible; degrades
    /// through fallback prices down to the configured static value.
    pub async fn get_threshold(&self, currency: Currency) -> Decimal {
        self.nisab.get_threshold(currency).await
    }

    /// Point-in-time position from lifetime savings, zakatable income and
    /// user-entered debts. Never fails: unavailable components read as zero
    /// and flag the result degraded. Negative debts are clamped to zero.
    pub async fn calculate(
        &self,
        user_id: &str,
        debts: Decimal,
        currency: Currency,
    ) -> ZakatCalculation {
        let debts = if debts < Decimal::ZERO {
            tracing::warn!(user_id, %debts, "negative debts clamped to zero");
            Decimal::ZERO
        } else {
            debts
        };

        let (savings, income, nisab) = futures::join!(
            self.wealth.current_savings(user_id),
            self.wealth.zakatable_income(user_id),
            self.nisab.resolve_current(currency),
        );

        let mut degraded = false;
        let current_savings = savings.unwrap_or_else(|e| {
            tracing::warn!(user_id, error = %e, "savings unavailable, treating as zero");
            degraded = true;
            Decimal::ZERO
        });
        let zakatable_income = income.unwrap_or_else(|e| {
            tracing::warn!(user_id, error = %e, "zakatable income unavailable, treating as zero");
            degraded = true;
            Decimal::ZERO
        });
        let (nisab_threshold, nisab_degraded) = nisab;
        degraded |= nisab_degraded;

        let total = current_savings + zakatable_income - debts;
        let is_above = total >= nisab_threshold;
        let zakat_due = if is_above {
            self.config.zakat_rate * total
        } else {
            Decimal::ZERO
        };

        ZakatCalculation {
            current_savings,
            zakatable_income,
            debts,
            total_zakatable_wealth: total,
            nisab_threshold,
            zakat_due,
            is_above_nisab: is_above,
            amount_to_reach_nisab: (nisab_threshold - total).max(Decimal::ZERO),
            currency,
            degraded,
        }
    }

    /// Annual eligibility against the user's Hawl anchor.
    ///
    /// Without an anchor the verdict is a quiet "not obligatory" with no
    /// dates. With one, savings across the closing Hijri year are compared
    /// to the current threshold. Upstream failures degrade to the anchorless
    /// shape rather than erroring.
    pub async fn evaluate_eligibility(
        &self,
        user_id: &str,
        currency: Currency,
    ) -> ZakatEligibilityResult {
        let anchor = match self.profiles.profile(user_id).await {
            Ok(profile) => profile.and_then(|p| p.hawl_anchor),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "profile unavailable");
                return ZakatEligibilityResult::empty(currency, true);
            }
        };
        let Some(anchor) = anchor else {
            return ZakatEligibilityResult::empty(currency, false);
        };

        match self.eligibility_with_anchor(user_id, anchor, currency).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "eligibility check degraded");
                ZakatEligibilityResult::empty(currency, true)
            }
        }
    }

    async fn eligibility_with_anchor(
        &self,
        user_id: &str,
        anchor: HawlAnchor,
        currency: Currency,
    ) -> ZakatResult<ZakatEligibilityResult> {
        let today = self.calendar.today_hijri()?;

        // The Hawl window closes at this Hijri year's anchor and opens at
        // the same (month, day) one year earlier.
        let window_end = self
            .calendar
            .to_gregorian(self.anchor_in_year(today.year, anchor)?)?;
        let window_start = self
            .calendar
            .to_gregorian(self.anchor_in_year(today.year - 1, anchor)?)?;

        let (savings, nisab) = futures::join!(
            self.wealth.savings_in_window(user_id, window_start, window_end),
            self.nisab.resolve_current(currency),
        );
        let annual_savings = savings?;
        let (nisab_threshold, degraded) = nisab;

        // Evaluated at the window's close only, not continuously across the
        // year; strict Hawl would require wealth to stay above Nisab the
        // whole time.
        let has_maintained = annual_savings >= nisab_threshold;
        let zakat_amount_due = if has_maintained {
            self.config.zakat_rate * annual_savings
        } else {
            Decimal::ZERO
        };

        let next_year = if (today.month, today.day) < (anchor.month, anchor.day) {
            today.year
        } else {
            today.year + 1
        };
        let next_hijri = self.anchor_in_year(next_year, anchor)?;
        let next_gregorian = self.calendar.to_gregorian(next_hijri)?;
        let days_until = (next_gregorian - today_gregorian()).num_days();

        Ok(ZakatEligibilityResult {
            is_obligatory: has_maintained,
            annual_savings,
            nisab_threshold,
            zakat_amount_due,
            has_maintained_nisab: has_maintained,
            days_until_zakat_date: Some(days_until),
            next_zakat_date_hijri: Some(next_hijri),
            next_zakat_date_gregorian: Some(next_gregorian),
            currency,
            degraded,
        })
    }

    /// The anchor as a concrete date in the given Hijri year, day clamped
    /// to that month's actual length.
    fn anchor_in_year(&self, year: i32, anchor: HawlAnchor) -> ZakatResult<HijriDate> {
        let len = self.calendar.days_in_hijri_month(year, anchor.month)?;
        HijriDate::new(year, anchor.month, anchor.day.min(len))
    }
}

/// Wires the engine's collaborators, defaulting to in-memory stores and the
/// environment-configured price client.
#[derive(Default)]
pub struct ZakatEngineBuilder {
    config: EngineConfig,
    ledger: Option<Arc<dyn LedgerStore>>,
    profiles: Option<Arc<dyn ProfileStore>>,
    snapshots: Option<Arc<dyn SnapshotStore>>,
    spot_client: Option<Arc<dyn SpotPriceClient>>,
}

impl ZakatEngineBuilder {
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_ledger(mut self, store: Arc<dyn LedgerStore>) -> Self {
        self.ledger = Some(store);
        self
    }

    pub fn with_profiles(mut self, store: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(store);
        self
    }

    pub fn with_snapshots(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.snapshots = Some(store);
        self
    }

    pub fn with_spot_client(mut self, client: Arc<dyn SpotPriceClient>) -> Self {
        self.spot_client = Some(client);
        self
    }

    pub fn build(self) -> ZakatResult<ZakatEngine> {
        self.config.validate()?;

        let ledger = self
            .ledger
            .unwrap_or_else(|| Arc::new(InMemoryLedgerStore::new()));
        let profiles = self
            .profiles
            .unwrap_or_else(|| Arc::new(InMemoryProfileStore::new()));
        let snapshots = self
            .snapshots
            .unwrap_or_else(|| Arc::new(InMemorySnapshotStore::new()));
        let spot_client = self
            .spot_client
            .unwrap_or_else(|| default_spot_client(&self.config));

        let provider = Arc::new(PriceQuoteProvider::new(spot_client, &self.config));
        let nisab = Arc::new(NisabResolver::new(provider, snapshots, &self.config));
        let calendar = CalendarConverter::new();
        let payments = PaymentLedger::new(
            Arc::clone(&ledger),
            Arc::clone(&nisab),
            calendar.clone(),
            &self.config,
        );

        Ok(ZakatEngine {
            wealth: WealthAggregator::new(ledger),
            calendar,
            nisab,
            profiles,
            payments,
            config: self.config,
        })
    }
}

#[cfg(feature = "live-pricing")]
fn default_spot_client(config: &EngineConfig) -> Arc<dyn SpotPriceClient> {
    Arc::new(crate::pricing::GoldApiClient::from_env(
        config.price_timeout_secs,
    ))
}

#[cfg(not(feature = "live-pricing"))]
fn default_spot_client(_config: &EngineConfig) -> Arc<dyn SpotPriceClient> {
    // No live source compiled in; every fetch falls through to the static
    // price table.
    struct OfflineSpotClient;

    #[async_trait::async_trait]
    impl SpotPriceClient for OfflineSpotClient {
        async fn fetch_spot(
            &self,
            _metal: crate::pricing::Metal,
            _currency: Currency,
        ) -> ZakatResult<Decimal> {
            Err(crate::errors::ZakatError::PriceSource(
                "no spot price client configured".into(),
            ))
        }
    }

    Arc::new(OfflineSpotClient)
}
