//! Read-only wealth projections over the ledger.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::ZakatResult;

use super::store::LedgerStore;

/// Sums ledger rows into the figures the engine compares against Nisab.
///
/// Pure projections: nothing here caches or mutates, so a flag toggle or a
/// new entry is visible on the very next read. Independent sums are issued
/// concurrently since the store may be network-backed.
pub struct WealthAggregator {
    store: Arc<dyn LedgerStore>,
}

impl WealthAggregator {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Lifetime running balance: all income minus all expenses minus all
    /// Zakat already paid. Not windowed.
    pub async fn current_savings(&self, user_id: &str) -> ZakatResult<Decimal> {
        let (incomes, expenses, payments) = futures::join!(
            self.store.incomes(user_id),
            self.store.expenses(user_id),
            self.store.zakat_payments(user_id),
        );

        let income: Decimal = incomes?.iter().map(|e| e.amount).sum();
        let expense: Decimal = expenses?.iter().map(|e| e.amount).sum();
        let paid: Decimal = payments?.iter().map(|p| p.amount).sum();
        Ok(income - expense - paid)
    }

    /// Sum of income entries currently flagged zakatable.
    pub async fn zakatable_income(&self, user_id: &str) -> ZakatResult<Decimal> {
        let incomes = self.store.incomes(user_id).await?;
        Ok(incomes
            .iter()
            .filter(|e| e.is_zakatable)
            .map(|e| e.amount)
            .sum())
    }

    /// Income minus expenses dated within `[start, end]`, both ends
    /// inclusive. Zakat payments are out of scope here: the window is used
    /// to measure what was earned across a Hawl, not the balance.
    pub async fn savings_in_window(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ZakatResult<Decimal> {
        let (incomes, expenses) =
            futures::join!(self.store.incomes(user_id), self.store.expenses(user_id));

        let income: Decimal = incomes?
            .iter()
            .filter(|e| e.date >= start && e.date <= end)
            .map(|e| e.amount)
            .sum();
        let expense: Decimal = expenses?
            .iter()
            .filter(|e| e.date >= start && e.date <= end)
            .map(|e| e.amount)
            .sum();
        Ok(income - expense)
    }
}
