//! Zakat eligibility and Nisab engine for personal-finance ledgers.
//!
//! The crate answers one question: does this user owe Zakat, and how much?
//! Getting there takes four cooperating pieces:
//!
//! - [`calendar`] converts between the Gregorian and Hijri calendars, since
//!   the Zakat year (Hawl) is lunar.
//! - [`pricing`] and [`nisab`] turn gold and silver spot prices into the
//!   wealth threshold (Nisab) above which Zakat is due, with a daily cache
//!   and static fallbacks so the answer survives a dead price API.
//! - [`ledger`] aggregates income, expenses and prior payments into
//!   zakatable wealth.
//! - [`engine`] folds it all into a point-in-time calculation or a
//!   Hawl-anchored annual eligibility verdict; [`payments`] keeps the
//!   payment history.
//!
//! The engine never fails a calculation: unavailable collaborators degrade
//! the result to fallback values and flag it `degraded` instead.
//!
//! ```no_run
//! use hisab::prelude::*;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> ZakatResult<()> {
//!     let ledger = Arc::new(InMemoryLedgerStore::new());
//!     let engine = ZakatEngine::builder()
//!         .with_ledger(Arc::clone(&ledger) as Arc<dyn LedgerStore>)
//!         .build()?;
//!
//!     let payday = chrono::NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
//!     let salary = IncomeEntry::new("2500.00", payday)?.with_category("salary");
//!     ledger.insert("amira", LedgerEntry::Income(salary)).await?;
//!
//!     let position = engine.calculate("amira", Decimal::ZERO, Currency::Usd).await;
//!     println!("{}", position.summary());
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod config;
pub mod currency;
pub mod engine;
pub mod errors;
pub mod inputs;
pub mod ledger;
pub mod nisab;
pub mod payments;
pub mod prelude;
pub mod pricing;
pub mod profile;

pub use config::{EngineConfig, NisabBasis};
pub use currency::Currency;
pub use engine::{ZakatCalculation, ZakatEligibilityResult, ZakatEngine};
pub use errors::{ZakatError, ZakatResult};
