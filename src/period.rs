// Period resolution: the rolling 12-month lookback window and the boundary
// used for period-over-period comparison.
use crate::month::MonthKey;
use crate::types::MonthlySiteKpi;
use chrono::NaiveDate;
use serde::Serialize;

/// Number of calendar months in the lookback window, anchor included.
pub const LOOKBACK_MONTHS: i32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookbackWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_key: MonthKey,
    pub end_key: MonthKey,
}

impl LookbackWindow {
    pub fn contains(&self, month: MonthKey) -> bool {
        self.start_key <= month && month <= self.end_key
    }
}

/// Window of 12 calendar months ending at (and including) `anchor`.
pub fn resolve_lookback(anchor: MonthKey) -> LookbackWindow {
    let start_key = anchor.add_months(-(LOOKBACK_MONTHS - 1));
    LookbackWindow {
        start: start_key.first_day(),
        end: anchor.first_day(),
        start_key,
        end_key: anchor,
    }
}

/// Latest well-formed month present in `records`.
pub fn latest_month(records: &[MonthlySiteKpi]) -> Option<MonthKey> {
    records.iter().filter_map(MonthlySiteKpi::month_key).max()
}

/// The month immediately before the latest month that has data. Trend
/// comparisons cut here rather than at a fixed offset from the anchor.
pub fn previous_month_key(last_available_month: MonthKey) -> MonthKey {
    last_available_month.pred()
}

/// Pick the anchor month: an explicit choice wins, otherwise the latest month
/// in the snapshot, otherwise the month containing `today`.
pub fn default_anchor(
    explicit: Option<MonthKey>,
    records: &[MonthlySiteKpi],
    today: NaiveDate,
) -> MonthKey {
    explicit
        .or_else(|| latest_month(records))
        .unwrap_or_else(|| MonthKey::from_date(today))
}
