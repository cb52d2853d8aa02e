//! Re-exports of the types most programs need.
//!
//! # Usage
//!
//! ```rust
//! use hisab::prelude::*;
//! ```

pub use crate::calendar::{CalendarConverter, HijriDate, Holiday};
pub use crate::config::{EngineConfig, NisabBasis};
pub use crate::currency::Currency;
pub use crate::engine::{
    ZakatCalculation, ZakatEligibilityResult, ZakatEngine, ZakatEngineBuilder,
};
pub use crate::errors::{ZakatError, ZakatResult};
pub use crate::inputs::IntoAmount;
pub use crate::ledger::{
    ExpenseEntry, IncomeEntry, InMemoryLedgerStore, LedgerEntry, LedgerStore, WealthAggregator,
    ZakatPaymentRecord,
};
pub use crate::nisab::{InMemorySnapshotStore, NisabResolver, NisabThreshold, SnapshotStore};
pub use crate::payments::{PaymentLedger, YearlyComparison};
pub use crate::pricing::{
    Metal, MetalPriceQuote, PriceQuoteProvider, QuoteSource, SpotPriceClient, StaticSpotClient,
};
pub use crate::profile::{HawlAnchor, InMemoryProfileStore, ProfileStore, UserProfile};

#[cfg(feature = "live-pricing")]
pub use crate::pricing::GoldApiClient;
