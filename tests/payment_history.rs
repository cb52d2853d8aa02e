use chrono::{Datelike, NaiveDate};
use hisab::prelude::*;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn this_year() -> i32 {
    chrono::Local::now().date_naive().year()
}

/// Gold fixed at 100/gram: threshold 8748.00 under the default weights.
fn build_engine(store: Arc<InMemoryLedgerStore>) -> ZakatEngine {
    let client = StaticSpotClient::new(dec!(3110.35), dec!(311.035)).unwrap();
    ZakatEngine::builder()
        .with_ledger(store)
        .with_spot_client(Arc::new(client))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_recorded_payments_come_back_hijri_annotated() {
    let engine = build_engine(Arc::new(InMemoryLedgerStore::new()));
    let payments = engine.payments();

    let first = ymd(2024, 4, 10);
    let second = ymd(2025, 3, 30);
    payments
        .record_payment("amira", dec!(218.70), first, Some("first hawl".into()))
        .await
        .unwrap();
    payments.record_payment("amira", 225, second, None).await.unwrap();

    let history = payments.list_history("amira").await.unwrap();
    assert_eq!(history.len(), 2);

    // Newest first.
    assert_eq!(history[0].paid_date, second);
    assert_eq!(history[1].paid_date, first);
    assert_eq!(history[1].notes.as_deref(), Some("first hawl"));

    // The Hijri annotation matches an independent conversion.
    let calendar = CalendarConverter::new();
    assert_eq!(history[0].paid_date_hijri, calendar.to_hijri(second).unwrap());
    assert_eq!(history[1].paid_date_hijri, calendar.to_hijri(first).unwrap());
}

#[tokio::test]
async fn test_zero_and_negative_payments_are_rejected() {
    let engine = build_engine(Arc::new(InMemoryLedgerStore::new()));

    let zero = engine.payments().record_payment("amira", 0, ymd(2025, 4, 1), None).await;
    assert!(zero.is_err());

    let negative = engine
        .payments()
        .record_payment("amira", dec!(-10), ymd(2025, 4, 1), None)
        .await;
    assert!(negative.is_err());

    // Nothing was written.
    assert!(engine.payments().list_history("amira").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_yearly_comparison_spans_payments_and_trailing_years() {
    let store = Arc::new(InMemoryLedgerStore::new());
    let engine = build_engine(Arc::clone(&store));
    let year = this_year();

    // Last year: 12000 earned, 300 paid. 12000 >= 8748, so 300 was due.
    let income = IncomeEntry::new(12000, ymd(year - 1, 2, 1)).unwrap();
    store.insert("amira", LedgerEntry::Income(income)).await.unwrap();
    engine
        .payments()
        .record_payment("amira", 300, ymd(year - 1, 7, 1), None)
        .await
        .unwrap();

    let rows = engine.payments().yearly_comparison("amira", Currency::Usd).await.unwrap();

    // Trailing five years, ascending; the payment year is inside them.
    let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
    assert_eq!(years, (year - 4..=year).collect::<Vec<_>>());

    let last_year = rows.iter().find(|r| r.year == year - 1).unwrap();
    assert_eq!(last_year.savings, dec!(12000));
    assert_eq!(last_year.zakat_paid, dec!(300));
    assert_eq!(last_year.zakat_due, dec!(300.000));
    assert_eq!(last_year.nisab_threshold, dec!(8748.00));

    // Hijri year of the row is the one its December 31st falls in.
    let calendar = CalendarConverter::new();
    let expected = calendar.to_hijri(ymd(year - 1, 12, 31)).unwrap().year;
    assert_eq!(last_year.hijri_year, expected);

    // This year has no entries yet.
    let current = rows.iter().find(|r| r.year == year).unwrap();
    assert_eq!(current.savings, dec!(0));
    assert_eq!(current.zakat_due, dec!(0));
}

#[tokio::test]
async fn test_ancient_payment_years_are_still_listed() {
    let store = Arc::new(InMemoryLedgerStore::new());
    let engine = build_engine(store);

    engine
        .payments()
        .record_payment("amira", 75, ymd(2018, 6, 15), None)
        .await
        .unwrap();

    let rows = engine.payments().yearly_comparison("amira", Currency::Usd).await.unwrap();
    assert_eq!(rows.len(), 6, "2018 plus the trailing five years");
    assert_eq!(rows[0].year, 2018);
    assert_eq!(rows[0].zakat_paid, dec!(75));
}
