// The full derivation: resolve period -> filter -> {aggregate, series,
// contribution, conversions}. Each stage is a plain function; this module only
// wires them together and keeps nothing between calls.
use crate::config::AxisConfig;
use crate::contribution::{build_contribution, ContributionTable};
use crate::conversions::{collect_conversions, ConversionSummary};
use crate::filter::{filter_records, MalformedRecord};
use crate::metrics::{aggregate, KpiSummary};
use crate::month::MonthKey;
use crate::period::{default_anchor, previous_month_key, resolve_lookback, LookbackWindow};
use crate::series::{
    axis_ceiling, build_series, monthly_sparkline, AxisScale, GroupBy, LocalSelection,
    SeriesRow, SiteMeasure, SparkMetric, SparkPoint,
};
use crate::types::{FilterState, MonthlySiteKpi, Side};
use chrono::NaiveDate;
use log::debug;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartView {
    pub rows: Vec<SeriesRow>,
    pub axis_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sparklines {
    pub customer_complaints: Vec<SparkPoint>,
    pub supplier_complaints: Vec<SparkPoint>,
    pub customer_defective: Vec<SparkPoint>,
    pub supplier_defective: Vec<SparkPoint>,
    pub customer_deliveries: Vec<SparkPoint>,
    pub supplier_deliveries: Vec<SparkPoint>,
    pub customer_ppm: Vec<SparkPoint>,
    pub supplier_ppm: Vec<SparkPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub window: LookbackWindow,
    pub latest_month: Option<MonthKey>,
    pub previous_month: Option<MonthKey>,
    pub record_count: usize,
    pub malformed: Vec<MalformedRecord>,
    pub kpis: KpiSummary,
    pub notification_chart: ChartView,
    pub site_complaint_chart: ChartView,
    pub customer_defect_chart: ChartView,
    pub customer_delivery_chart: ChartView,
    pub sparklines: Sparklines,
    pub customer_contribution: ContributionTable,
    pub supplier_contribution: ContributionTable,
    pub customer_conversions: ConversionSummary,
    pub supplier_conversions: ConversionSummary,
}

/// Chart rows with an optional drill-down plus the axis ceiling of the full
/// grouping.
pub fn chart_view(
    records: &[MonthlySiteKpi],
    group_by: GroupBy,
    local: &LocalSelection,
    scale: AxisScale,
) -> ChartView {
    ChartView {
        rows: build_series(records, group_by, local),
        axis_max: axis_ceiling(records, group_by, scale),
    }
}

/// Derive every view from a record snapshot. `today` only matters when there
/// is neither an explicit anchor nor any record to take one from.
pub fn build_dashboard(
    records: &[MonthlySiteKpi],
    state: &FilterState,
    anchor: Option<MonthKey>,
    today: NaiveDate,
    axis: &AxisConfig,
) -> Dashboard {
    let anchor = default_anchor(anchor, records, today);
    let window = resolve_lookback(anchor);
    let outcome = filter_records(records, state, &window);
    let filtered = &outcome.records;

    let latest = outcome.latest_month;
    let previous = latest.map(previous_month_key);
    debug!(
        "Dashboard anchor {} window {}..={} latest {:?} previous {:?}",
        anchor, window.start_key, window.end_key, latest, previous
    );

    Dashboard {
        window,
        latest_month: latest,
        previous_month: previous,
        record_count: filtered.len(),
        malformed: outcome.malformed,
        kpis: KpiSummary {
            latest_month: latest,
            ..aggregate(filtered, previous)
        },
        notification_chart: chart_view(
            filtered,
            GroupBy::NotificationType,
            &LocalSelection::All,
            axis.complaints,
        ),
        site_complaint_chart: chart_view(
            filtered,
            GroupBy::Site(SiteMeasure::AllComplaints),
            &LocalSelection::All,
            axis.complaints,
        ),
        customer_defect_chart: chart_view(
            filtered,
            GroupBy::Site(SiteMeasure::CustomerDefective),
            &LocalSelection::All,
            axis.defects,
        ),
        customer_delivery_chart: chart_view(
            filtered,
            GroupBy::Site(SiteMeasure::CustomerDeliveries),
            &LocalSelection::All,
            axis.deliveries,
        ),
        sparklines: Sparklines {
            customer_complaints: monthly_sparkline(
                filtered,
                SparkMetric::Complaints(Side::Customer),
            ),
            supplier_complaints: monthly_sparkline(
                filtered,
                SparkMetric::Complaints(Side::Supplier),
            ),
            customer_defective: monthly_sparkline(
                filtered,
                SparkMetric::Defective(Side::Customer),
            ),
            supplier_defective: monthly_sparkline(
                filtered,
                SparkMetric::Defective(Side::Supplier),
            ),
            customer_deliveries: monthly_sparkline(
                filtered,
                SparkMetric::Deliveries(Side::Customer),
            ),
            supplier_deliveries: monthly_sparkline(
                filtered,
                SparkMetric::Deliveries(Side::Supplier),
            ),
            customer_ppm: monthly_sparkline(filtered, SparkMetric::Ppm(Side::Customer)),
            supplier_ppm: monthly_sparkline(filtered, SparkMetric::Ppm(Side::Supplier)),
        },
        customer_contribution: build_contribution(filtered, Side::Customer, &[]),
        supplier_contribution: build_contribution(filtered, Side::Supplier, &[]),
        customer_conversions: collect_conversions(filtered, Side::Customer),
        supplier_conversions: collect_conversions(filtered, Side::Supplier),
    }
}
