// Chart series.
//
// Rows are bucketed by month and then by a dimension (site or notification
// type). The axis ceiling is computed from the same grouping with no local
// drill-down applied, so toggling a drill-down redraws series but never
// rescales the axis.
use crate::month::MonthKey;
use crate::types::{MonthlySiteKpi, Side};
use crate::util::{ppm, round_up_to_step};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Per-site quantity plotted when grouping by site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SiteMeasure {
    CustomerComplaints,
    SupplierComplaints,
    InternalComplaints,
    AllComplaints,
    CustomerDefective,
    SupplierDefective,
    CustomerDeliveries,
    SupplierDeliveries,
}

impl SiteMeasure {
    fn value(&self, r: &MonthlySiteKpi) -> f64 {
        match self {
            SiteMeasure::CustomerComplaints => r.customer_complaints_q1 as f64,
            SiteMeasure::SupplierComplaints => r.supplier_complaints_q2 as f64,
            SiteMeasure::InternalComplaints => r.internal_complaints_q3 as f64,
            SiteMeasure::AllComplaints => {
                r.customer_complaints_q1 as f64
                    + r.supplier_complaints_q2 as f64
                    + r.internal_complaints_q3 as f64
            }
            SiteMeasure::CustomerDefective => r.customer_defective_parts,
            SiteMeasure::SupplierDefective => r.supplier_defective_parts,
            SiteMeasure::CustomerDeliveries => r.customer_deliveries,
            SiteMeasure::SupplierDeliveries => r.supplier_deliveries,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Site(SiteMeasure),
    NotificationType,
}

/// Keys produced when grouping by notification type. PPAP in-progress and
/// completed counts are plotted together under `P`.
fn notification_values(r: &MonthlySiteKpi) -> [(&'static str, f64); 5] {
    [
        ("Q1", r.customer_complaints_q1 as f64),
        ("Q2", r.supplier_complaints_q2 as f64),
        ("Q3", r.internal_complaints_q3 as f64),
        ("D", r.deviations_d as f64),
        ("P", r.ppap_p.in_progress as f64 + r.ppap_p.completed as f64),
    ]
}

/// Chart-only drill-down. It restricts which dimension keys are drawn and
/// has no effect on the axis ceiling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LocalSelection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl LocalSelection {
    pub fn only<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LocalSelection::Only(keys.into_iter().map(Into::into).collect())
    }

    fn includes(&self, key: &str) -> bool {
        match self {
            LocalSelection::All => true,
            LocalSelection::Only(keys) => keys.contains(key),
        }
    }
}

/// Keys `month` and `total` are taken by the row itself; a site code spelled
/// the same is stored as `site:month` / `site:total`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub month: MonthKey,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
    pub total: f64,
}

const RESERVED_KEYS: [&str; 2] = ["month", "total"];

fn site_key(code: &str) -> String {
    if RESERVED_KEYS.contains(&code) {
        format!("site:{code}")
    } else {
        code.to_string()
    }
}

/// Step and minimum for an axis ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    pub step: f64,
    pub floor: f64,
}

impl AxisScale {
    pub const COMPLAINTS: AxisScale = AxisScale { step: 20.0, floor: 20.0 };
    pub const DEFECTS: AxisScale = AxisScale { step: 100.0, floor: 100.0 };
    pub const DELIVERIES: AxisScale = AxisScale { step: 1000.0, floor: 1000.0 };
}

/// Group `records` by month and dimension. Months are ascending; every month
/// present in the input gets a row, and every dimension key seen for that
/// month is kept even when its value is zero.
pub fn build_series(
    records: &[MonthlySiteKpi],
    group_by: GroupBy,
    local: &LocalSelection,
) -> Vec<SeriesRow> {
    let mut buckets: BTreeMap<MonthKey, BTreeMap<String, f64>> = BTreeMap::new();
    for r in records {
        let Some(month) = r.month_key() else {
            warn!("Series: skipping site '{}' with malformed month '{}'", r.site_code, r.month);
            continue;
        };
        let bucket = buckets.entry(month).or_default();
        match group_by {
            GroupBy::Site(measure) => {
                if local.includes(&r.site_code) {
                    *bucket.entry(site_key(&r.site_code)).or_insert(0.0) += measure.value(r);
                }
            }
            GroupBy::NotificationType => {
                for (key, value) in notification_values(r) {
                    if local.includes(key) {
                        *bucket.entry(key.to_string()).or_insert(0.0) += value;
                    }
                }
            }
        }
    }

    buckets
        .into_iter()
        .map(|(month, values)| {
            let total = values.values().sum();
            SeriesRow { month, values, total }
        })
        .collect()
}

/// Axis ceiling for a chart of `group_by` over `records`. Always computed over
/// all dimension keys.
pub fn axis_ceiling(records: &[MonthlySiteKpi], group_by: GroupBy, scale: AxisScale) -> f64 {
    let peak = build_series(records, group_by, &LocalSelection::All)
        .iter()
        .map(|row| row.total)
        .fold(0.0_f64, f64::max);
    round_up_to_step(peak, scale.step, scale.floor)
}

/// All dimension keys appearing in `rows`, sorted.
pub fn series_keys(rows: &[SeriesRow]) -> Vec<String> {
    let keys: BTreeSet<&String> = rows.iter().flat_map(|r| r.values.keys()).collect();
    keys.into_iter().cloned().collect()
}

/// Sparkline metric. Values are per month, not cumulative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SparkMetric {
    Complaints(Side),
    Defective(Side),
    Deliveries(Side),
    Ppm(Side),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SparkPoint {
    pub month: MonthKey,
    pub value: f64,
}

/// One point per month present in `records`. PPM points are the ratio of that
/// month's summed defective parts to its summed deliveries.
pub fn monthly_sparkline(records: &[MonthlySiteKpi], metric: SparkMetric) -> Vec<SparkPoint> {
    let mut months: BTreeMap<MonthKey, (f64, f64)> = BTreeMap::new();
    for r in records {
        let Some(month) = r.month_key() else {
            continue;
        };
        let acc = months.entry(month).or_insert((0.0, 0.0));
        match metric {
            SparkMetric::Complaints(side) => acc.0 += r.complaints(side) as f64,
            SparkMetric::Defective(side) => acc.0 += r.defective_parts(side),
            SparkMetric::Deliveries(side) => acc.0 += r.deliveries(side),
            SparkMetric::Ppm(side) => {
                acc.0 += r.defective_parts(side);
                acc.1 += r.deliveries(side);
            }
        }
    }
    months
        .into_iter()
        .map(|(month, (a, b))| {
            let value = match metric {
                SparkMetric::Ppm(_) => ppm(a, b),
                _ => a,
            };
            SparkPoint { month, value }
        })
        .collect()
}
