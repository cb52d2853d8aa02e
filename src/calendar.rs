//! # Dual Calendar Support (Hijri ⇄ Gregorian)
//!
//! Zakat anniversaries (Hawl) and religious observances run on the Hijri
//! (lunar) calendar while ledger entries carry Gregorian dates, so every
//! obligation check needs to move between the two without drifting a day.
//!
//! Conversion is delegated to `icu_calendar`'s arithmetic Islamic Civil
//! calendar, which makes the round trip `to_gregorian(to_hijri(d)) == d`
//! exact at day granularity. Month lengths are derived from the conversion
//! itself rather than a fixed 29/30 table, so they always agree with the
//! epoch and leap rules the conversion uses.

use chrono::{Datelike, Local, NaiveDate};
use icu_calendar::{Date, islamic::IslamicCivil};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{ZakatError, ZakatResult};

/// Hijri month names in common English transliteration, indexed by month - 1.
pub const HIJRI_MONTHS: [&str; 12] = [
    "Muharram",
    "Safar",
    "Rabi' al-Awwal",
    "Rabi' al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

/// A date on the Hijri (lunar) calendar.
///
/// Invariant: `1 <= month <= 12` and `day` is bounded by that month's
/// computed length (29 or 30). `new` enforces the structural bounds; use
/// [`CalendarConverter::hijri_date`] when the day must additionally be
/// checked against the actual month length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HijriDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl HijriDate {
    /// Builds a Hijri date after checking structural bounds.
    ///
    /// Days 1-30 are accepted for every month here; whether day 30 exists in
    /// a given month is only decidable through the calendar, and surfaces as
    /// a `Calendar` error on conversion.
    pub fn new(year: i32, month: u8, day: u8) -> ZakatResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(ZakatError::invalid_input(
                "month",
                format!("Hijri month must be 1-12, got {}", month),
            ));
        }
        if !(1..=30).contains(&day) {
            return Err(ZakatError::invalid_input(
                "day",
                format!("Hijri day must be 1-30, got {}", day),
            ));
        }
        Ok(Self { year, month, day })
    }

    /// English transliteration of this date's month name.
    pub fn month_name(&self) -> &'static str {
        HIJRI_MONTHS
            .get(self.month as usize - 1)
            .copied()
            .unwrap_or("Unknown")
    }
}

impl fmt::Display for HijriDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} AH", self.day, self.month_name(), self.year)
    }
}

/// A fixed religious observance keyed by Hijri (month, day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub month: u8,
    pub day: u8,
    pub name: &'static str,
}

/// Observances recognised by [`CalendarConverter::is_holiday`].
///
/// Laylat al-Qadr is listed on 27 Ramadan by convention; the exact night is
/// not fixed.
pub const HOLIDAYS: &[Holiday] = &[
    Holiday { month: 1, day: 1, name: "Islamic New Year" },
    Holiday { month: 1, day: 10, name: "Day of Ashura" },
    Holiday { month: 3, day: 12, name: "Mawlid al-Nabi" },
    Holiday { month: 7, day: 27, name: "Isra and Mi'raj" },
    Holiday { month: 9, day: 1, name: "First day of Ramadan" },
    Holiday { month: 9, day: 27, name: "Laylat al-Qadr" },
    Holiday { month: 10, day: 1, name: "Eid al-Fitr" },
    Holiday { month: 12, day: 9, name: "Day of Arafah" },
    Holiday { month: 12, day: 10, name: "Eid al-Adha" },
];

/// Today's date on the local clock. Shared by the cache, snapshot and
/// eligibility code so "the current day" means the same thing everywhere.
pub(crate) fn today_gregorian() -> NaiveDate {
    Local::now().date_naive()
}

/// Pure date-math between the Gregorian and Hijri calendars.
#[derive(Debug, Clone)]
pub struct CalendarConverter {
    cal: IslamicCivil,
}

impl Default for CalendarConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarConverter {
    pub fn new() -> Self {
        Self { cal: IslamicCivil::new() }
    }

    /// Converts a Gregorian date to its Hijri equivalent.
    ///
    /// Errors are structurally unreachable for a `NaiveDate`, which is always
    /// a valid ISO date; the `Result` exists so callers can `?` uniformly.
    pub fn to_hijri(&self, date: NaiveDate) -> ZakatResult<HijriDate> {
        let iso = Date::try_new_iso_date(date.year(), date.month() as u8, date.day() as u8)
            .map_err(|e| ZakatError::calendar("gregorian", e.to_string()))?;
        let hijri = iso.to_calendar(self.cal.clone());
        Ok(HijriDate {
            year: hijri.year().number,
            month: hijri.month().ordinal as u8,
            day: hijri.day_of_month().0 as u8,
        })
    }

    /// Converts a Hijri date to its Gregorian equivalent.
    ///
    /// Rejects dates that do not exist on the calendar, e.g. day 30 of a
    /// 29-day month.
    pub fn to_gregorian(&self, date: HijriDate) -> ZakatResult<NaiveDate> {
        let hijri = Date::try_new_islamic_civil_date_with_calendar(
            date.year,
            date.month,
            date.day,
            self.cal.clone(),
        )
        .map_err(|e| ZakatError::calendar("hijri", format!("{}: {}", date, e)))?;
        let iso = hijri.to_iso();
        NaiveDate::from_ymd_opt(
            iso.year().number,
            iso.month().ordinal,
            iso.day_of_month().0,
        )
        .ok_or_else(|| ZakatError::calendar("hijri", format!("{} out of chrono range", date)))
    }

    /// Builds a Hijri date validated against the actual month length.
    pub fn hijri_date(&self, year: i32, month: u8, day: u8) -> ZakatResult<HijriDate> {
        let date = HijriDate::new(year, month, day)?;
        // Conversion is the authority on whether the day exists.
        self.to_gregorian(date)?;
        Ok(date)
    }

    /// Number of days (29 or 30) in the given Hijri month.
    ///
    /// Derived by converting the following month's first day to Gregorian,
    /// stepping back one day, and reading that day's Hijri day number. The
    /// result therefore always agrees with the conversion's own leap rules.
    pub fn days_in_hijri_month(&self, year: i32, month: u8) -> ZakatResult<u8> {
        if !(1..=12).contains(&month) {
            return Err(ZakatError::invalid_input(
                "month",
                format!("Hijri month must be 1-12, got {}", month),
            ));
        }
        let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let next_first = self.to_gregorian(HijriDate {
            year: next_year,
            month: next_month,
            day: 1,
        })?;
        let month_last = next_first
            .pred_opt()
            .ok_or_else(|| ZakatError::calendar("hijri", "month start out of chrono range"))?;
        Ok(self.to_hijri(month_last)?.day)
    }

    /// Looks the date up in the fixed observance table.
    pub fn is_holiday(&self, date: HijriDate) -> Option<&'static Holiday> {
        HOLIDAYS
            .iter()
            .find(|h| h.month == date.month && h.day == date.day)
    }

    /// Today's date on the Hijri calendar.
    pub fn today_hijri(&self) -> ZakatResult<HijriDate> {
        self.to_hijri(today_gregorian())
    }
}
