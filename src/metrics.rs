// Metric aggregation: current vs previous-period totals and trend badges.
//
// "Current" is the whole filtered set (cumulative through the latest month in
// the window). "Previous" is the same set cut at `previous_month_key`, so both
// sides of the comparison are cumulative figures.
use crate::month::MonthKey;
use crate::period::{latest_month, previous_month_key};
use crate::types::{MonthlySiteKpi, Side};
use crate::util::{percent_change, ppm};
use log::warn;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn from_change_percent(change_percent: f64) -> Self {
        if change_percent > 0.0 {
            Trend::Up
        } else if change_percent < 0.0 {
            Trend::Down
        } else {
            Trend::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }
}

/// One metric tile. `change_percent` keeps its sign; `trend` is the
/// classification of that sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValue {
    pub value: f64,
    pub previous_value: f64,
    pub change: f64,
    pub change_percent: f64,
    pub trend: Trend,
}

impl MetricValue {
    pub fn compare(value: f64, previous_value: f64) -> Self {
        let change_percent = percent_change(value, previous_value);
        Self {
            value,
            previous_value,
            change: value - previous_value,
            change_percent,
            trend: Trend::from_change_percent(change_percent),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricFamily {
    pub complaints: MetricValue,
    pub defective: MetricValue,
    pub deliveries: MetricValue,
    pub ppm: MetricValue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Totals {
    customer_complaints: f64,
    supplier_complaints: f64,
    internal_complaints: f64,
    customer_defective: f64,
    supplier_defective: f64,
    customer_deliveries: f64,
    supplier_deliveries: f64,
    deviations: f64,
    ppap_in_progress: f64,
    ppap_completed: f64,
}

impl Totals {
    fn add(&mut self, r: &MonthlySiteKpi) {
        self.customer_complaints += r.customer_complaints_q1 as f64;
        self.supplier_complaints += r.supplier_complaints_q2 as f64;
        self.internal_complaints += r.internal_complaints_q3 as f64;
        self.customer_defective += r.customer_defective_parts;
        self.supplier_defective += r.supplier_defective_parts;
        self.customer_deliveries += r.customer_deliveries;
        self.supplier_deliveries += r.supplier_deliveries;
        self.deviations += r.deviations_d as f64;
        self.ppap_in_progress += r.ppap_p.in_progress as f64;
        self.ppap_completed += r.ppap_p.completed as f64;
    }

    fn complaints(&self, side: Side) -> f64 {
        match side {
            Side::Customer => self.customer_complaints,
            Side::Supplier => self.supplier_complaints,
        }
    }

    fn defective(&self, side: Side) -> f64 {
        match side {
            Side::Customer => self.customer_defective,
            Side::Supplier => self.supplier_defective,
        }
    }

    fn deliveries(&self, side: Side) -> f64 {
        match side {
            Side::Customer => self.customer_deliveries,
            Side::Supplier => self.supplier_deliveries,
        }
    }

    /// Ratio of the summed quantities, never a mean of per-record ratios.
    fn ppm(&self, side: Side) -> f64 {
        ppm(self.defective(side), self.deliveries(side))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub latest_month: Option<MonthKey>,
    pub previous_month: Option<MonthKey>,
    pub customer: MetricFamily,
    pub supplier: MetricFamily,
    pub internal_complaints: MetricValue,
    pub deviations: MetricValue,
    pub ppap_in_progress: MetricValue,
    pub ppap_completed: MetricValue,
}

impl KpiSummary {
    pub fn family(&self, side: Side) -> &MetricFamily {
        match side {
            Side::Customer => &self.customer,
            Side::Supplier => &self.supplier,
        }
    }
}

fn family(side: Side, current: &Totals, previous: &Totals) -> MetricFamily {
    MetricFamily {
        complaints: MetricValue::compare(current.complaints(side), previous.complaints(side)),
        defective: MetricValue::compare(current.defective(side), previous.defective(side)),
        deliveries: MetricValue::compare(current.deliveries(side), previous.deliveries(side)),
        ppm: MetricValue::compare(current.ppm(side), previous.ppm(side)),
    }
}

/// Aggregate `records` into metric tiles. The previous period is every record
/// whose month is at or before `previous_month`; `None` means no previous
/// period, so every previous value is zero. Records with a malformed month
/// cannot be placed in either period and are skipped.
pub fn aggregate(records: &[MonthlySiteKpi], previous_month: Option<MonthKey>) -> KpiSummary {
    let mut current = Totals::default();
    let mut previous = Totals::default();
    for r in records {
        let Some(month) = r.month_key() else {
            warn!("Skipping record for site '{}' with malformed month '{}'", r.site_code, r.month);
            continue;
        };
        current.add(r);
        if previous_month.is_some_and(|cut| month <= cut) {
            previous.add(r);
        }
    }

    KpiSummary {
        latest_month: latest_month(records),
        previous_month,
        customer: family(Side::Customer, &current, &previous),
        supplier: family(Side::Supplier, &current, &previous),
        internal_complaints: MetricValue::compare(
            current.internal_complaints,
            previous.internal_complaints,
        ),
        deviations: MetricValue::compare(current.deviations, previous.deviations),
        ppap_in_progress: MetricValue::compare(current.ppap_in_progress, previous.ppap_in_progress),
        ppap_completed: MetricValue::compare(current.ppap_completed, previous.ppap_completed),
    }
}

/// Convenience wrapper that derives the comparison boundary from the data.
pub fn aggregate_with_data_boundary(records: &[MonthlySiteKpi]) -> KpiSummary {
    let previous = latest_month(records).map(previous_month_key);
    aggregate(records, previous)
}
