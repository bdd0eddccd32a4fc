// Calendar month keys.
//
// Every grouping in the engine is keyed on a `MonthKey`. The textual form is
// `YYYY-MM`, which sorts the same way as the value itself, so string order and
// `Ord` agree.
use crate::error::KpiError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Build a key from a year and a 1-based month. Returns `None` for a month
    /// outside `1..=12` or a year chrono cannot represent.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month() }
    }

    /// Parse a `YYYY-MM` key. A trailing day (`YYYY-MM-DD`) is tolerated since
    /// some exports write the first of the month instead of the bare key.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let head = s.get(..7)?;
        let rest = &s[7..];
        let day_suffix = rest.len() == 3
            && rest.starts_with('-')
            && rest[1..].chars().all(|c| c.is_ascii_digit());
        if !(rest.is_empty() || day_suffix) {
            return None;
        }
        let (y, m) = head.split_once('-')?;
        if y.len() != 4 || m.len() != 2 {
            return None;
        }
        if !y.chars().all(|c| c.is_ascii_digit()) || !m.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Self::new(y.parse().ok()?, m.parse().ok()?)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // `new` already proved the first of the month exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.add_months(1)
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    /// Shift by a signed number of calendar months.
    pub fn add_months(&self, delta: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + delta;
        Self { year: index.div_euclid(12), month: index.rem_euclid(12) as u32 + 1 }
    }

    pub fn pred(&self) -> Self {
        self.add_months(-1)
    }

    pub fn succ(&self) -> Self {
        self.add_months(1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = KpiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| KpiError::InvalidMonth { value: s.to_string() })
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
