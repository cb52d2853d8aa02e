use chrono::{Duration, NaiveDate};
use hisab::prelude::*;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Gold fixed at 100/gram: threshold 8748.00 under the default weights.
fn build_engine(store: Arc<InMemoryLedgerStore>, profiles: Arc<InMemoryProfileStore>) -> ZakatEngine {
    let client = StaticSpotClient::new(dec!(3110.35), dec!(311.035)).unwrap();
    ZakatEngine::builder()
        .with_ledger(store)
        .with_profiles(profiles)
        .with_spot_client(Arc::new(client))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_no_anchor_means_no_obligation_and_no_dates() {
    let profiles = Arc::new(InMemoryProfileStore::new());
    profiles.upsert(UserProfile::new("amira")).unwrap();

    let store = Arc::new(InMemoryLedgerStore::new());
    let income = IncomeEntry::new(50000, today() - Duration::days(30)).unwrap();
    store.insert("amira", LedgerEntry::Income(income)).await.unwrap();

    let engine = build_engine(store, profiles);
    let result = engine.evaluate_eligibility("amira", Currency::Usd).await;

    // Plenty of wealth, but no anniversary configured.
    assert!(!result.is_obligatory);
    assert!(!result.has_maintained_nisab);
    assert_eq!(result.annual_savings, dec!(0));
    assert!(result.next_zakat_date_hijri.is_none());
    assert!(result.next_zakat_date_gregorian.is_none());
    assert!(result.days_until_zakat_date.is_none());
    assert!(!result.degraded);
}

#[tokio::test]
async fn test_anniversary_today_closes_the_window_today() {
    let store = Arc::new(InMemoryLedgerStore::new());
    let income = IncomeEntry::new(10000, today() - Duration::days(30)).unwrap();
    let expense = ExpenseEntry::new(500, today() - Duration::days(20)).unwrap();
    store.insert("amira", LedgerEntry::Income(income)).await.unwrap();
    store.insert("amira", LedgerEntry::Expense(expense)).await.unwrap();

    // Anchor on today's Hijri (month, day): the Hawl window ends today and
    // the entries above fall inside it.
    let calendar = CalendarConverter::new();
    let today_hijri = calendar.today_hijri().unwrap();
    let anchor = HawlAnchor::new(today_hijri.month, today_hijri.day).unwrap();
    let profiles = Arc::new(InMemoryProfileStore::new());
    profiles.upsert(UserProfile::new("amira").with_hawl_anchor(anchor)).unwrap();

    let engine = build_engine(store, profiles);
    let result = engine.evaluate_eligibility("amira", Currency::Usd).await;

    // 10000 - 500 = 9500 >= 8748.
    assert_eq!(result.annual_savings, dec!(9500));
    assert!(result.has_maintained_nisab);
    assert!(result.is_obligatory);
    assert_eq!(result.zakat_amount_due, dec!(237.500));
    assert_eq!(result.nisab_threshold, dec!(8748.00));

    // Today IS the anchor, so the next occurrence is a full lunar year out.
    let days = result.days_until_zakat_date.expect("anchored result has a countdown");
    assert!((300..400).contains(&days), "got {days}");
    let next_hijri = result.next_zakat_date_hijri.unwrap();
    assert_eq!(next_hijri.year, today_hijri.year + 1);

    // Both calendar representations must point at the same day.
    let next_gregorian = result.next_zakat_date_gregorian.unwrap();
    assert_eq!(calendar.to_gregorian(next_hijri).unwrap(), next_gregorian);
}

#[tokio::test]
async fn test_upcoming_anniversary_counts_down() {
    let calendar = CalendarConverter::new();
    let soon = calendar.to_hijri(today() + Duration::days(10)).unwrap();
    let anchor = HawlAnchor::new(soon.month, soon.day).unwrap();

    let profiles = Arc::new(InMemoryProfileStore::new());
    profiles.upsert(UserProfile::new("amira").with_hawl_anchor(anchor)).unwrap();

    let engine = build_engine(Arc::new(InMemoryLedgerStore::new()), profiles);
    let result = engine.evaluate_eligibility("amira", Currency::Usd).await;

    let days = result.days_until_zakat_date.expect("anchored result has a countdown");
    assert!((9..=11).contains(&days), "anchor is 10 days out, got {days}");
}

#[tokio::test]
async fn test_savings_below_threshold_are_not_obligatory() {
    let store = Arc::new(InMemoryLedgerStore::new());
    let income = IncomeEntry::new(5000, today() - Duration::days(15)).unwrap();
    store.insert("amira", LedgerEntry::Income(income)).await.unwrap();

    let calendar = CalendarConverter::new();
    let today_hijri = calendar.today_hijri().unwrap();
    let anchor = HawlAnchor::new(today_hijri.month, today_hijri.day).unwrap();
    let profiles = Arc::new(InMemoryProfileStore::new());
    profiles.upsert(UserProfile::new("amira").with_hawl_anchor(anchor)).unwrap();

    let engine = build_engine(store, profiles);
    let result = engine.evaluate_eligibility("amira", Currency::Usd).await;

    // 5000 < 8748: no obligation, but the countdown is still reported.
    assert_eq!(result.annual_savings, dec!(5000));
    assert!(!result.has_maintained_nisab);
    assert!(!result.is_obligatory);
    assert_eq!(result.zakat_amount_due, dec!(0));
    assert!(result.days_until_zakat_date.is_some());
}

#[tokio::test]
async fn test_old_income_outside_the_window_does_not_count() {
    let store = Arc::new(InMemoryLedgerStore::new());
    // Two lunar years ago: outside the closing Hawl window.
    let stale = IncomeEntry::new(20000, today() - Duration::days(800)).unwrap();
    let fresh = IncomeEntry::new(1000, today() - Duration::days(5)).unwrap();
    store.insert("amira", LedgerEntry::Income(stale)).await.unwrap();
    store.insert("amira", LedgerEntry::Income(fresh)).await.unwrap();

    let calendar = CalendarConverter::new();
    let today_hijri = calendar.today_hijri().unwrap();
    let anchor = HawlAnchor::new(today_hijri.month, today_hijri.day).unwrap();
    let profiles = Arc::new(InMemoryProfileStore::new());
    profiles.upsert(UserProfile::new("amira").with_hawl_anchor(anchor)).unwrap();

    let engine = build_engine(store, profiles);
    let result = engine.evaluate_eligibility("amira", Currency::Usd).await;

    assert_eq!(result.annual_savings, dec!(1000));
    assert!(!result.is_obligatory);
}
