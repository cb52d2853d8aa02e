//! Ledger row types: a tagged union of the three entry kinds the engine
//! reads and writes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::HijriDate;
use crate::errors::{ZakatError, ZakatResult};
use crate::inputs::IntoAmount;

/// Money coming in. Only entries flagged `is_zakatable` count toward
/// zakatable income; the flag is mutable after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeEntry {
    pub id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: Option<String>,
    pub is_zakatable: bool,
}

impl IncomeEntry {
    /// New zakatable income entry. Negative amounts are rejected.
    pub fn new(amount: impl IntoAmount, date: NaiveDate) -> ZakatResult<Self> {
        let amount = positive_or_zero("income.amount", amount)?;
        Ok(Self {
            id: Uuid::new_v4(),
            amount,
            date,
            category: None,
            is_zakatable: true,
        })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Excludes the entry from zakatable income (gifts already zakat-exempt,
    /// reimbursements, and the like).
    pub fn non_zakatable(mut self) -> Self {
        self.is_zakatable = false;
        self
    }
}

/// Money going out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseEntry {
    pub id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: Option<String>,
}

impl ExpenseEntry {
    pub fn new(amount: impl IntoAmount, date: NaiveDate) -> ZakatResult<Self> {
        let amount = positive_or_zero("expense.amount", amount)?;
        Ok(Self { id: Uuid::new_v4(), amount, date, category: None })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// A Zakat payment that was actually made, annotated with the Hijri date it
/// fell on. Reduces current savings like an expense does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZakatPaymentRecord {
    pub id: Uuid,
    pub amount: Decimal,
    pub paid_date: NaiveDate,
    pub paid_date_hijri: HijriDate,
    pub notes: Option<String>,
}

/// One row of the ledger. The kind tag makes heterogeneous query results
/// self-describing instead of relying on which fields happen to be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LedgerEntry {
    Income(IncomeEntry),
    Expense(ExpenseEntry),
    ZakatPayment(ZakatPaymentRecord),
}

impl LedgerEntry {
    pub fn id(&self) -> Uuid {
        match self {
            LedgerEntry::Income(e) => e.id,
            LedgerEntry::Expense(e) => e.id,
            LedgerEntry::ZakatPayment(p) => p.id,
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            LedgerEntry::Income(e) => e.amount,
            LedgerEntry::Expense(e) => e.amount,
            LedgerEntry::ZakatPayment(p) => p.amount,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            LedgerEntry::Income(e) => e.date,
            LedgerEntry::Expense(e) => e.date,
            LedgerEntry::ZakatPayment(p) => p.paid_date,
        }
    }
}

fn positive_or_zero(field: &'static str, amount: impl IntoAmount) -> ZakatResult<Decimal> {
    let amount = amount.into_amount()?;
    if amount < Decimal::ZERO {
        return Err(ZakatError::invalid_input(field, "amount must be non-negative"));
    }
    Ok(amount)
}
