//! Recording Zakat payments and comparing them against what each year
//! actually required.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{CalendarConverter, today_gregorian};
use crate::config::EngineConfig;
use crate::currency::Currency;
use crate::errors::{ZakatError, ZakatResult};
use crate::inputs::IntoAmount;
use crate::ledger::{LedgerEntry, LedgerStore, WealthAggregator, ZakatPaymentRecord};
use crate::nisab::NisabResolver;

/// One calendar year of the payment history view: what was saved, what the
/// threshold was, what was paid and what was actually due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyComparison {
    pub year: i32,
    /// Hijri year the Gregorian year closed in.
    pub hijri_year: i32,
    pub savings: Decimal,
    /// Today's threshold, applied to every row alike; historical thresholds
    /// are not reconstructed, so past rows are indicative rather than exact.
    pub nisab_threshold: Decimal,
    pub zakat_paid: Decimal,
    pub zakat_due: Decimal,
}

/// Payment history over the shared ledger, annotated with Hijri dates.
pub struct PaymentLedger {
    store: Arc<dyn LedgerStore>,
    wealth: WealthAggregator,
    nisab: Arc<NisabResolver>,
    calendar: CalendarConverter,
    zakat_rate: Decimal,
}

impl PaymentLedger {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        nisab: Arc<NisabResolver>,
        calendar: CalendarConverter,
        config: &EngineConfig,
    ) -> Self {
        Self {
            wealth: WealthAggregator::new(Arc::clone(&store)),
            store,
            nisab,
            calendar,
            zakat_rate: config.zakat_rate,
        }
    }

    /// Records a payment, deriving the Hijri date it fell on. Amounts must
    /// be strictly positive; a zero payment is a data-entry mistake, not a
    /// payment.
    pub async fn record_payment(
        &self,
        user_id: &str,
        amount: impl IntoAmount,
        paid_date: NaiveDate,
        notes: Option<String>,
    ) -> ZakatResult<ZakatPaymentRecord> {
        let amount = amount.into_amount()?;
        if amount <= Decimal::ZERO {
            return Err(ZakatError::invalid_input(
                "payment.amount",
                "payment amount must be positive",
            ));
        }

        let record = ZakatPaymentRecord {
            id: Uuid::new_v4(),
            amount,
            paid_date,
            paid_date_hijri: self.calendar.to_hijri(paid_date)?,
            notes,
        };
        self.store
            .insert(user_id, LedgerEntry::ZakatPayment(record.clone()))
            .await?;
        tracing::debug!(user_id, %record.amount, %record.paid_date, "zakat payment recorded");
        Ok(record)
    }

    /// All recorded payments, newest first.
    pub async fn list_history(&self, user_id: &str) -> ZakatResult<Vec<ZakatPaymentRecord>> {
        let mut payments = self.store.zakat_payments(user_id).await?;
        payments.sort_by(|a, b| b.paid_date.cmp(&a.paid_date));
        Ok(payments)
    }

    /// Year-by-year comparison covering every year with a recorded payment
    /// plus the trailing five calendar years, ascending.
    ///
    /// Each row recomputes that year's income minus expenses but applies
    /// the current Nisab threshold throughout; historical thresholds are
    /// not reconstructed. A latent inaccuracy for past years, kept as is.
    pub async fn yearly_comparison(
        &self,
        user_id: &str,
        currency: Currency,
    ) -> ZakatResult<Vec<YearlyComparison>> {
        let payments = self.store.zakat_payments(user_id).await?;

        let mut years: BTreeSet<i32> = payments.iter().map(|p| p.paid_date.year()).collect();
        let current_year = today_gregorian().year();
        for offset in 0..5 {
            years.insert(current_year - offset);
        }

        let threshold = self.nisab.get_threshold(currency).await;

        let rows = join_all(years.into_iter().map(|year| {
            let paid: Decimal = payments
                .iter()
                .filter(|p| p.paid_date.year() == year)
                .map(|p| p.amount)
                .sum();
            self.year_row(user_id, year, threshold, paid)
        }))
        .await;

        rows.into_iter().collect()
    }

    async fn year_row(
        &self,
        user_id: &str,
        year: i32,
        threshold: Decimal,
        paid: Decimal,
    ) -> ZakatResult<YearlyComparison> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| ZakatError::calendar("year", format!("{year} out of range")))?;
        let end = NaiveDate::from_ymd_opt(year, 12, 31)
            .ok_or_else(|| ZakatError::calendar("year", format!("{year} out of range")))?;

        let savings = self.wealth.savings_in_window(user_id, start, end).await?;
        let zakat_due = if savings >= threshold {
            self.zakat_rate * savings
        } else {
            Decimal::ZERO
        };

        Ok(YearlyComparison {
            year,
            hijri_year: self.calendar.to_hijri(end)?.year,
            savings,
            nisab_threshold: threshold,
            zakat_paid: paid,
            zakat_due,
        })
    }
}
