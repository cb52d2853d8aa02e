use thiserror::Error;

/// Crate-wide result alias.
pub type ZakatResult<T> = std::result::Result<T, ZakatError>;

/// Root error type for the eligibility engine.
///
/// Upstream failures (price API, ledger, snapshot store) are represented here
/// so collaborators can propagate them with `?`, but the engine-facing
/// operations (`calculate`, `evaluate_eligibility`, `get_prices`,
/// `get_threshold`) absorb them into degraded results instead of surfacing
/// them to callers.
#[derive(Debug, Error)]
pub enum ZakatError {
    /// The spot-price collaborator failed or returned no usable price.
    #[error("price source unavailable: {0}")]
    PriceSource(String),

    /// A ledger query or mutation failed.
    #[error("ledger operation failed: {0}")]
    Ledger(String),

    /// The daily snapshot store failed.
    #[error("snapshot store failed: {0}")]
    Snapshot(String),

    /// The user-profile collaborator failed.
    #[error("profile lookup failed: {0}")]
    Profile(String),

    /// A calendar value was outside the representable range.
    #[error("calendar conversion failed for {field}: {reason}")]
    Calendar { field: &'static str, reason: String },

    /// Caller-supplied input rejected at the boundary.
    #[error("invalid input for '{field}': {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl ZakatError {
    pub(crate) fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        ZakatError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn calendar(field: &'static str, reason: impl Into<String>) -> Self {
        ZakatError::Calendar {
            field,
            reason: reason.into(),
        }
    }
}
