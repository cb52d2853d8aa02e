//! User profile: the Hawl anchor and currency preference.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::currency::Currency;
use crate::errors::{ZakatError, ZakatResult};

/// The Hijri (month, day) a user's Zakat year closes on.
///
/// Deliberately year-free: the anchor recurs every Hijri year. A day-30
/// anchor is clamped to day 29 when the month runs short that year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HawlAnchor {
    pub month: u8,
    pub day: u8,
}

impl HawlAnchor {
    pub fn new(month: u8, day: u8) -> ZakatResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(ZakatError::invalid_input(
                "hawl_anchor.month",
                format!("month {month} out of range 1..=12"),
            ));
        }
        if !(1..=30).contains(&day) {
            return Err(ZakatError::invalid_input(
                "hawl_anchor.day",
                format!("day {day} out of range 1..=30"),
            ));
        }
        Ok(Self { month, day })
    }
}

/// What the engine needs to know about a user. Everything else about the
/// account lives with the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    /// Absent until the user picks an anniversary; Hawl-based eligibility
    /// stays disabled without it.
    pub hawl_anchor: Option<HawlAnchor>,
    pub preferred_currency: Currency,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            hawl_anchor: None,
            preferred_currency: Currency::default(),
        }
    }

    pub fn with_hawl_anchor(mut self, anchor: HawlAnchor) -> Self {
        self.hawl_anchor = Some(anchor);
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.preferred_currency = currency;
        self
    }
}

/// Profile lookup seam. The engine only reads profiles; account management
/// belongs to the host application.
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// The stored profile, or `None` for unknown users.
    async fn profile(&self, user_id: &str) -> ZakatResult<Option<UserProfile>>;
}

/// Map-backed profile store.
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, profile: UserProfile) -> ZakatResult<()> {
        let mut guard = self
            .profiles
            .write()
            .map_err(|_| ZakatError::Profile("profile lock poisoned".into()))?;
        guard.insert(profile.user_id.clone(), profile);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn profile(&self, user_id: &str) -> ZakatResult<Option<UserProfile>> {
        let guard = self
            .profiles
            .read()
            .map_err(|_| ZakatError::Profile("profile lock poisoned".into()))?;
        Ok(guard.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_bounds_are_enforced() {
        assert!(HawlAnchor::new(9, 1).is_ok());
        assert!(HawlAnchor::new(0, 1).is_err());
        assert!(HawlAnchor::new(13, 1).is_err());
        assert!(HawlAnchor::new(9, 0).is_err());
        assert!(HawlAnchor::new(9, 31).is_err());
    }

    #[tokio::test]
    async fn test_unknown_users_read_as_none() {
        let store = InMemoryProfileStore::new();
        assert!(store.profile("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_then_read_back() {
        let store = InMemoryProfileStore::new();
        let profile = UserProfile::new("amira")
            .with_hawl_anchor(HawlAnchor::new(9, 1).unwrap())
            .with_currency(Currency::Sar);
        store.upsert(profile.clone()).unwrap();

        assert_eq!(store.profile("amira").await.unwrap(), Some(profile));
    }
}
