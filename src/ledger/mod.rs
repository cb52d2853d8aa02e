//! The financial ledger: entry types, the persistence seam, and the wealth
//! projections built on top of it.

pub mod aggregate;
pub mod entries;
pub mod store;

pub use aggregate::WealthAggregator;
pub use entries::{ExpenseEntry, IncomeEntry, LedgerEntry, ZakatPaymentRecord};
pub use store::{InMemoryLedgerStore, LedgerStore};
