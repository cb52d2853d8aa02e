//! Ledger persistence seam.
//!
//! The engine only ever sees live rows: soft-deleted entries are filtered
//! out inside the store, so every aggregation upstream stays oblivious to
//! deletion mechanics.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::errors::{ZakatError, ZakatResult};

use super::entries::{ExpenseEntry, IncomeEntry, LedgerEntry, ZakatPaymentRecord};

/// Per-user ledger backend. Queries return live (non-deleted) rows only.
#[async_trait::async_trait]
pub trait LedgerStore: Send + Sync {
    async fn incomes(&self, user_id: &str) -> ZakatResult<Vec<IncomeEntry>>;
    async fn expenses(&self, user_id: &str) -> ZakatResult<Vec<ExpenseEntry>>;
    async fn zakat_payments(&self, user_id: &str) -> ZakatResult<Vec<ZakatPaymentRecord>>;

    async fn insert(&self, user_id: &str, entry: LedgerEntry) -> ZakatResult<()>;

    /// Flips the zakatable flag on an income entry. Errors if the id does
    /// not name a live income row for this user.
    async fn set_income_zakatable(
        &self,
        user_id: &str,
        id: Uuid,
        zakatable: bool,
    ) -> ZakatResult<()>;

    /// Marks a row deleted without destroying it. Deleted rows vanish from
    /// every query.
    async fn soft_delete(&self, user_id: &str, id: Uuid) -> ZakatResult<()>;
}

struct Row {
    entry: LedgerEntry,
    deleted: bool,
}

/// Map-backed ledger, suitable for tests and single-process use.
#[derive(Default)]
pub struct InMemoryLedgerStore {
    rows: RwLock<HashMap<String, Vec<Row>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(
        &self,
    ) -> ZakatResult<std::sync::RwLockReadGuard<'_, HashMap<String, Vec<Row>>>> {
        self.rows
            .read()
            .map_err(|_| ZakatError::Ledger("ledger lock poisoned".into()))
    }

    fn write(
        &self,
    ) -> ZakatResult<std::sync::RwLockWriteGuard<'_, HashMap<String, Vec<Row>>>> {
        self.rows
            .write()
            .map_err(|_| ZakatError::Ledger("ledger lock poisoned".into()))
    }
}

#[async_trait::async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn incomes(&self, user_id: &str) -> ZakatResult<Vec<IncomeEntry>> {
        let guard = self.read()?;
        Ok(guard
            .get(user_id)
            .into_iter()
            .flatten()
            .filter(|row| !row.deleted)
            .filter_map(|row| match &row.entry {
                LedgerEntry::Income(e) => Some(e.clone()),
                _ => None,
            })
            .collect())
    }

    async fn expenses(&self, user_id: &str) -> ZakatResult<Vec<ExpenseEntry>> {
        let guard = self.read()?;
        Ok(guard
            .get(user_id)
            .into_iter()
            .flatten()
            .filter(|row| !row.deleted)
            .filter_map(|row| match &row.entry {
                LedgerEntry::Expense(e) => Some(e.clone()),
                _ => None,
            })
            .collect())
    }

    async fn zakat_payments(&self, user_id: &str) -> ZakatResult<Vec<ZakatPaymentRecord>> {
        let guard = self.read()?;
        Ok(guard
            .get(user_id)
            .into_iter()
            .flatten()
            .filter(|row| !row.deleted)
            .filter_map(|row| match &row.entry {
                LedgerEntry::ZakatPayment(p) => Some(p.clone()),
                _ => None,
            })
            .collect())
    }

    async fn insert(&self, user_id: &str, entry: LedgerEntry) -> ZakatResult<()> {
        let mut guard = self.write()?;
        guard
            .entry(user_id.to_owned())
            .or_default()
            .push(Row { entry, deleted: false });
        Ok(())
    }

    async fn set_income_zakatable(
        &self,
        user_id: &str,
        id: Uuid,
        zakatable: bool,
    ) -> ZakatResult<()> {
        let mut guard = self.write()?;
        let rows = guard
            .get_mut(user_id)
            .ok_or_else(|| ZakatError::Ledger(format!("no ledger for user {user_id}")))?;
        for row in rows.iter_mut().filter(|row| !row.deleted) {
            if let LedgerEntry::Income(income) = &mut row.entry {
                if income.id == id {
                    income.is_zakatable = zakatable;
                    return Ok(());
                }
            }
        }
        Err(ZakatError::Ledger(format!("income entry {id} not found")))
    }

    async fn soft_delete(&self, user_id: &str, id: Uuid) -> ZakatResult<()> {
        let mut guard = self.write()?;
        let rows = guard
            .get_mut(user_id)
            .ok_or_else(|| ZakatError::Ledger(format!("no ledger for user {user_id}")))?;
        for row in rows.iter_mut() {
            if row.entry.id() == id && !row.deleted {
                row.deleted = true;
                return Ok(());
            }
        }
        Err(ZakatError::Ledger(format!("ledger entry {id} not found")))
    }
}
