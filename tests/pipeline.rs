mod common;

use chrono::NaiveDate;
use common::{customer, empty, full, key};
use quality_kpi::config::AxisConfig;
use quality_kpi::logging;
use quality_kpi::metrics::Trend;
use quality_kpi::pipeline::{build_dashboard, chart_view};
use quality_kpi::series::{AxisScale, GroupBy, LocalSelection, SiteMeasure};
use quality_kpi::types::{ComplaintType, FilterState, MonthlySiteKpi};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Two months of one site, anchored on the second month.
#[test]
fn end_to_end_customer_ppm() {
    let records = vec![
        customer("101", "2025-01", 10.0, 100_000.0),
        customer("101", "2025-02", 20.0, 200_000.0),
    ];

    let dashboard = build_dashboard(
        &records,
        &FilterState::default(),
        Some(key("2025-02")),
        today(),
        &AxisConfig::default(),
    );

    let ppm = dashboard.kpis.customer.ppm;
    assert_eq!(ppm.value, 100.0);
    assert_eq!(ppm.previous_value, 100.0);
    assert_eq!(ppm.trend, Trend::Stable);
    assert_eq!(dashboard.kpis.customer.defective.value, 30.0);
    assert_eq!(dashboard.kpis.customer.defective.previous_value, 10.0);
    assert_eq!(dashboard.kpis.customer.defective.trend, Trend::Up);
    assert_eq!(dashboard.latest_month, Some(key("2025-02")));
    assert_eq!(dashboard.previous_month, Some(key("2025-01")));
    assert_eq!(dashboard.window.start_key, key("2024-03"));
}

/// Same inputs, same bytes.
#[test]
fn pipeline_is_idempotent() {
    let records = vec![
        full("101", "2024-12"),
        full("205", "2025-01"),
        full("101", "2025-02"),
        empty("310", "not-a-month"),
    ];
    let state = FilterState {
        selected_complaint_types: vec![ComplaintType::Customer, ComplaintType::Supplier],
        ..Default::default()
    };
    let run = || {
        let d = build_dashboard(&records, &state, None, today(), &AxisConfig::default());
        serde_json::to_string(&d).unwrap()
    };

    let first = run();
    let second = run();

    assert_eq!(first, second);
}

#[test]
fn anchor_defaults_to_latest_record_month() {
    let records = vec![
        customer("101", "2024-06", 1.0, 1_000.0),
        customer("101", "2025-05", 1.0, 1_000.0),
    ];

    let dashboard = build_dashboard(
        &records,
        &FilterState::default(),
        None,
        today(),
        &AxisConfig::default(),
    );

    assert_eq!(dashboard.window.end_key, key("2025-05"));
    assert_eq!(dashboard.window.start_key, key("2024-06"));
    assert_eq!(dashboard.record_count, 2);
}

#[test]
fn empty_snapshot_anchors_on_today_and_yields_zeroes() {
    let dashboard = build_dashboard(
        &[],
        &FilterState::default(),
        None,
        today(),
        &AxisConfig::default(),
    );

    assert_eq!(dashboard.window.end_key, key("2026-10"));
    assert_eq!(dashboard.record_count, 0);
    assert_eq!(dashboard.kpis.customer.ppm.value, 0.0);
    assert!(dashboard.notification_chart.rows.is_empty());
    assert_eq!(dashboard.notification_chart.axis_max, 20.0);
    assert!(!dashboard.customer_conversions.has_conversions);
    assert_eq!(dashboard.customer_contribution.average_monthly_ppm(), None);
}

#[test]
fn malformed_records_surface_in_dashboard() {
    logging::init_test();
    let records = vec![full("101", "2025-02"), empty("205", "2025-2")];

    let dashboard = build_dashboard(
        &records,
        &FilterState::default(),
        None,
        today(),
        &AxisConfig::default(),
    );

    assert_eq!(dashboard.record_count, 1);
    assert_eq!(dashboard.malformed.len(), 1);
    assert_eq!(dashboard.malformed[0].month, "2025-2");
}

#[test]
fn complaint_filter_flows_into_conversions_and_contribution() {
    let records = vec![full("101", "2025-02")];
    let state = FilterState {
        selected_complaint_types: vec![ComplaintType::Supplier],
        ..Default::default()
    };

    let dashboard = build_dashboard(&records, &state, None, today(), &AxisConfig::default());

    assert!(!dashboard.customer_conversions.has_conversions);
    assert!(dashboard.supplier_conversions.has_conversions);
    assert_eq!(dashboard.customer_contribution.grand_total.defective, 0.0);
    assert_eq!(dashboard.customer_contribution.sites, vec!["101".to_string()]);
    assert_eq!(dashboard.supplier_contribution.grand_total.ppm, 300.0);
}

/// A drill-down changes the drawn rows but not the axis of the chart view.
#[test]
fn chart_view_axis_ignores_drill_down() {
    let complaints = |site: &str, month: &str, q1: u64| MonthlySiteKpi {
        customer_complaints_q1: q1,
        ..empty(site, month)
    };
    let records = vec![
        complaints("101", "2025-01", 30),
        complaints("205", "2025-01", 12),
        complaints("205", "2025-02", 7),
    ];
    let group_by = GroupBy::Site(SiteMeasure::CustomerComplaints);

    let all = chart_view(&records, group_by, &LocalSelection::All, AxisScale::COMPLAINTS);
    let only_205 =
        chart_view(&records, group_by, &LocalSelection::only(["205"]), AxisScale::COMPLAINTS);

    assert_ne!(all.rows, only_205.rows);
    assert_eq!(only_205.rows[0].total, 12.0);
    assert_eq!(all.axis_max, 60.0);
    assert_eq!(only_205.axis_max, all.axis_max);
}

/// Months outside the date range stay on the charts but do not become the
/// latest month.
#[test]
fn date_range_keeps_months_but_moves_latest() {
    let records = vec![
        customer("101", "2025-01", 10.0, 100_000.0),
        customer("101", "2025-02", 20.0, 100_000.0),
        customer("101", "2025-03", 40.0, 100_000.0),
    ];
    let state = FilterState {
        date_to: NaiveDate::from_ymd_opt(2025, 2, 28),
        ..Default::default()
    };

    let dashboard = build_dashboard(&records, &state, None, today(), &AxisConfig::default());

    assert_eq!(dashboard.record_count, 3);
    assert_eq!(dashboard.latest_month, Some(key("2025-02")));
    assert_eq!(dashboard.kpis.latest_month, Some(key("2025-02")));
    assert_eq!(dashboard.previous_month, Some(key("2025-01")));
    assert_eq!(dashboard.kpis.customer.defective.value, 30.0);
    assert_eq!(dashboard.kpis.customer.defective.previous_value, 10.0);
    assert_eq!(dashboard.customer_defect_chart.rows.len(), 3);
    assert_eq!(dashboard.customer_defect_chart.rows[2].total, 0.0);
    let deliveries: Vec<f64> =
        dashboard.sparklines.customer_deliveries.iter().map(|p| p.value).collect();
    assert_eq!(deliveries, vec![100_000.0, 100_000.0, 0.0]);
}
