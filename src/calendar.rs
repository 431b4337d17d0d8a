//! Calendar-day handling and week bucketing for the meal-plan calendar.
//!
//! Every date that enters the service (query strings, JSON payloads, DB rows)
//! is turned into a [`CalendarDay`] first. Weeks always start on Monday,
//! whatever the client locale.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A date without time of day, always interpreted as UTC midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct CalendarDay(NaiveDate);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("invalid calendar date: {0}")]
    Invalid(String),
    #[error("date out of range")]
    OutOfRange,
}

impl CalendarDay {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, CalendarError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| CalendarError::Invalid(format!("{year:04}-{month:02}-{day:02}")))
    }

    /// Today's date in UTC.
    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    /// Accepts `YYYY-MM-DD` as well as full RFC 3339 timestamps; the latter are
    /// shifted to UTC before the time of day is dropped.
    pub fn parse(raw: &str) -> Result<Self, CalendarError> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(Self(date));
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|ts| Self(ts.with_timezone(&Utc).date_naive()))
            .map_err(|_| CalendarError::Invalid(raw.to_string()))
    }

    pub fn naive(self) -> NaiveDate {
        self.0
    }

    /// Day of week with Sunday = 0 .. Saturday = 6.
    pub fn weekday_from_sunday(self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

    /// Day of week with Monday = 0 .. Sunday = 6.
    pub fn weekday_from_monday(self) -> u32 {
        self.0.weekday().num_days_from_monday()
    }

    pub fn add_days(self, days: i64) -> Result<Self, CalendarError> {
        Duration::try_days(days)
            .and_then(|d| self.0.checked_add_signed(d))
            .map(Self)
            .ok_or(CalendarError::OutOfRange)
    }

    /// Signed number of days from `earlier` to `self`.
    pub fn days_since(self, earlier: CalendarDay) -> i64 {
        (self.0 - earlier.0).num_days()
    }

    /// Iterates every day from `self` to `end`, both inclusive.
    pub fn iter_through(self, end: CalendarDay) -> impl Iterator<Item = CalendarDay> {
        self.0
            .iter_days()
            .take_while(move |d| *d <= end.0)
            .map(CalendarDay)
    }
}

impl From<NaiveDate> for CalendarDay {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl FromStr for CalendarDay {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl Serialize for CalendarDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        CalendarDay::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Inclusive date range used to query the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: CalendarDay,
    pub end: CalendarDay,
}

impl DateRange {
    pub fn new(start: CalendarDay, end: CalendarDay) -> Self {
        Self { start, end }
    }

    pub fn single(day: CalendarDay) -> Self {
        Self { start: day, end: day }
    }

    pub fn contains(&self, day: CalendarDay) -> bool {
        self.start <= day && day <= self.end
    }
}

/// The seven days, Monday through Sunday, of one navigated week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekWindow {
    pub week_offset: i64,
    pub dates: [CalendarDay; 7],
    /// Index of the reference day inside `dates`, when the window contains it.
    pub today_index: Option<usize>,
}

/// Monday of the week `week_offset` weeks away from `reference`, then the six
/// following days.
pub fn compute_week_dates(
    reference: CalendarDay,
    week_offset: i64,
) -> Result<WeekWindow, CalendarError> {
    let dow = i64::from(reference.weekday_from_sunday());
    let days_to_monday = if dow == 0 { -6 } else { 1 - dow };
    let shift = week_offset
        .checked_mul(7)
        .and_then(|w| w.checked_add(days_to_monday))
        .ok_or(CalendarError::OutOfRange)?;
    let monday = reference.add_days(shift)?;

    let mut dates = [monday; 7];
    for (i, slot) in dates.iter_mut().enumerate().skip(1) {
        *slot = monday.add_days(i as i64)?;
    }
    let today_index = dates.iter().position(|d| *d == reference);

    Ok(WeekWindow {
        week_offset,
        dates,
        today_index,
    })
}

impl WeekWindow {
    pub fn start(&self) -> CalendarDay {
        self.dates[0]
    }

    pub fn end(&self) -> CalendarDay {
        self.dates[6]
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.start(), self.end())
    }

    pub fn contains(&self, day: CalendarDay) -> bool {
        self.range().contains(day)
    }

    pub fn day(&self, index: usize) -> Option<CalendarDay> {
        self.dates.get(index).copied()
    }

    /// Caption shown above the week strip.
    pub fn title(&self) -> String {
        match self.week_offset {
            0 => "This week".to_string(),
            -1 => "Last week".to_string(),
            1 => "Next week".to_string(),
            n if n > 0 => format!("In {n} weeks"),
            n => format!("{} weeks ago", n.unsigned_abs()),
        }
    }
}

/// Which week and which day of it the meal-plan screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewState {
    pub week_offset: i64,
    pub selected_day_index: usize,
}

impl ViewState {
    /// Current week with today selected.
    pub fn initial(today: CalendarDay) -> Self {
        Self {
            week_offset: 0,
            selected_day_index: today.weekday_from_monday() as usize,
        }
    }

    /// Navigating to another week re-selects today's weekday, like opening the
    /// screen fresh.
    pub fn with_week_offset(self, week_offset: i64, today: CalendarDay) -> Self {
        Self {
            week_offset,
            selected_day_index: today.weekday_from_monday() as usize,
        }
    }

    pub fn shifted(self, delta: i64, today: CalendarDay) -> Self {
        self.with_week_offset(self.week_offset.saturating_add(delta), today)
    }

    pub fn select_day(self, index: usize) -> Self {
        Self {
            selected_day_index: index.min(6),
            ..self
        }
    }

    pub fn window(&self, today: CalendarDay) -> Result<WeekWindow, CalendarError> {
        compute_week_dates(today, self.week_offset)
    }
}
