use serde::{Deserialize, Serialize};

/// ISO 4217 currencies the engine quotes prices and thresholds in.
///
/// Fallback price constants exist for every listed currency, so adding a
/// variant means adding a row to the fallback table in `pricing`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Currency {
    /// US Dollar, the reference currency for static fallbacks.
    #[default]
    Usd,
    Eur,
    Gbp,
    Sar,
    Aed,
    Idr,
    Myr,
    Pkr,
    Bdt,
    Egp,
    Try,
}
