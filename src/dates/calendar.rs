//! Business-day calendars
//!
//! A calendar decides which dates are business days and moves dates by
//! business days or by tenor periods. Holiday sets are either rule-based
//! (NYSE, Brazil) or supplied explicitly.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::period::{Period, TimeUnit};
use crate::core::{ValuationError, ValuationResult};

/// Business-day adjustment rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusinessDayConvention {
    Following,
    ModifiedFollowing,
    Preceding,
    ModifiedPreceding,
    Unadjusted,
}

/// Built-in holiday rule sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HolidayRule {
    /// Every day is a business day
    Null,
    /// Saturdays and Sundays only
    WeekendsOnly,
    /// New York Stock Exchange
    UnitedStates,
    /// Brazilian national holidays (B3 settlement calendar)
    Brazil,
}

/// Business-day calendar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    name: String,
    rule: HolidayRule,
    extra_holidays: BTreeSet<NaiveDate>,
}

impl Calendar {
    pub fn new(name: impl Into<String>, rule: HolidayRule) -> Self {
        Self {
            name: name.into(),
            rule,
            extra_holidays: BTreeSet::new(),
        }
    }

    pub fn null() -> Self {
        Self::new("NULL", HolidayRule::Null)
    }

    pub fn weekends_only() -> Self {
        Self::new("WEEKENDS_ONLY", HolidayRule::WeekendsOnly)
    }

    pub fn united_states() -> Self {
        Self::new("UNITED_STATES", HolidayRule::UnitedStates)
    }

    pub fn brazil() -> Self {
        Self::new("BRAZIL", HolidayRule::Brazil)
    }

    /// Resolve a calendar from its configured name
    pub fn from_name(name: &str) -> ValuationResult<Self> {
        let key: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_uppercase();

        match key.as_str() {
            "NULL" | "NULLCALENDAR" => Ok(Self::null()),
            "WEEKENDSONLY" => Ok(Self::weekends_only()),
            "US" | "UNITEDSTATES" | "NYSE" => Ok(Self::united_states()),
            "BR" | "BRAZIL" | "BMF" | "B3" => Ok(Self::brazil()),
            _ => Err(ValuationError::configuration(format!(
                "Calendar not supported: {}",
                name
            ))),
        }
    }

    /// Add ad-hoc holidays on top of the rule set
    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.extra_holidays.extend(holidays);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule(&self) -> HolidayRule {
        self.rule
    }

    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        match self.rule {
            HolidayRule::Null => false,
            _ => matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        !self.is_business_day(date)
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        if self.is_weekend(date) || self.extra_holidays.contains(&date) {
            return false;
        }
        match self.rule {
            HolidayRule::Null | HolidayRule::WeekendsOnly => true,
            HolidayRule::UnitedStates => !is_nyse_holiday(date),
            HolidayRule::Brazil => !is_brazil_holiday(date),
        }
    }

    /// Roll a date onto a business day
    pub fn adjust(&self, date: NaiveDate, convention: BusinessDayConvention) -> NaiveDate {
        match convention {
            BusinessDayConvention::Unadjusted => date,
            BusinessDayConvention::Following => self.roll(date, 1),
            BusinessDayConvention::Preceding => self.roll(date, -1),
            BusinessDayConvention::ModifiedFollowing => {
                let rolled = self.roll(date, 1);
                if rolled.month() != date.month() {
                    self.roll(date, -1)
                } else {
                    rolled
                }
            }
            BusinessDayConvention::ModifiedPreceding => {
                let rolled = self.roll(date, -1);
                if rolled.month() != date.month() {
                    self.roll(date, 1)
                } else {
                    rolled
                }
            }
        }
    }

    /// Move `n` units from `date`.
    ///
    /// `Days` counts business days (a zero offset just rolls forward);
    /// other units move calendar time and then roll with `Following`.
    pub fn advance(&self, date: NaiveDate, n: i32, unit: TimeUnit) -> ValuationResult<NaiveDate> {
        self.advance_period(
            date,
            Period::new(n, unit),
            BusinessDayConvention::Following,
            false,
        )
    }

    /// Move by a period with an explicit convention and end-of-month rule
    pub fn advance_period(
        &self,
        date: NaiveDate,
        period: Period,
        convention: BusinessDayConvention,
        end_of_month: bool,
    ) -> ValuationResult<NaiveDate> {
        let n = period.length;
        match period.unit {
            TimeUnit::Days => {
                if n == 0 {
                    return Ok(self.adjust(date, convention));
                }
                let step = if n > 0 { 1 } else { -1 };
                let mut remaining = n.abs();
                let mut current = date;
                while remaining > 0 {
                    current += Duration::days(step);
                    if self.is_business_day(current) {
                        remaining -= 1;
                    }
                }
                Ok(current)
            }
            TimeUnit::Weeks => Ok(self.adjust(date + Duration::weeks(n as i64), convention)),
            TimeUnit::Months | TimeUnit::Years => {
                let months = period.in_months()?.unwrap_or(0);
                let shifted = shift_months(date, months).ok_or_else(|| {
                    ValuationError::invalid_input(format!("cannot advance {} by {}", date, period))
                })?;
                if end_of_month && self.is_end_of_month(date) {
                    return Ok(self.end_of_month(shifted));
                }
                Ok(self.adjust(shifted, convention))
            }
        }
    }

    /// Last business day of the month containing `date`
    pub fn end_of_month(&self, date: NaiveDate) -> NaiveDate {
        self.adjust(last_day_of_month(date), BusinessDayConvention::Preceding)
    }

    pub fn is_end_of_month(&self, date: NaiveDate) -> bool {
        date == self.end_of_month(date)
    }

    /// Business days in `[start, end)`; negative when `end < start`
    pub fn business_days_between(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        if end < start {
            return -self.business_days_between(end, start);
        }
        let mut count = 0;
        let mut current = start;
        while current < end {
            if self.is_business_day(current) {
                count += 1;
            }
            current += Duration::days(1);
        }
        count
    }

    fn roll(&self, date: NaiveDate, step: i64) -> NaiveDate {
        let mut current = date;
        while !self.is_business_day(current) {
            current += Duration::days(step);
        }
        current
    }
}

fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    }
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .map(|d| d - Duration::days(1))
        .unwrap_or(date)
}

/// Gregorian Easter Sunday (anonymous algorithm)
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let last = last_day_of_month(NaiveDate::from_ymd_opt(year, month, 1)?);
    let back = (7 + last.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    Some(last - Duration::days(back as i64))
}

/// Saturday holidays move to Friday, Sunday holidays to Monday
fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

fn is_nyse_holiday(date: NaiveDate) -> bool {
    let y = date.year();
    let fixed = |m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).map(observed);

    let mut holidays = vec![
        // New Year's Day is not moved back into the prior year
        NaiveDate::from_ymd_opt(y, 1, 1).map(|d| {
            if d.weekday() == Weekday::Sun {
                d + Duration::days(1)
            } else {
                d
            }
        }),
        nth_weekday(y, 1, Weekday::Mon, 3),
        nth_weekday(y, 2, Weekday::Mon, 3),
        easter_sunday(y).map(|e| e - Duration::days(2)),
        last_weekday(y, 5, Weekday::Mon),
        fixed(7, 4),
        nth_weekday(y, 9, Weekday::Mon, 1),
        nth_weekday(y, 11, Weekday::Thu, 4),
        fixed(12, 25),
    ];
    if y >= 2022 {
        holidays.push(fixed(6, 19));
    }

    holidays.into_iter().flatten().any(|h| h == date)
}

fn is_brazil_holiday(date: NaiveDate) -> bool {
    let y = date.year();
    let fixed = |m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d);
    let easter = easter_sunday(y);

    let mut holidays = vec![
        fixed(1, 1),
        easter.map(|e| e - Duration::days(48)),
        easter.map(|e| e - Duration::days(47)),
        easter.map(|e| e - Duration::days(2)),
        fixed(4, 21),
        fixed(5, 1),
        easter.map(|e| e + Duration::days(60)),
        fixed(9, 7),
        fixed(10, 12),
        fixed(11, 2),
        fixed(11, 15),
        fixed(12, 25),
    ];
    if y >= 2024 {
        holidays.push(fixed(11, 20));
    }

    holidays.into_iter().flatten().any(|h| h == date)
}
