mod common;

use common::{empty, full, key, window};
use quality_kpi::filter::{filter_records, with_fields_zeroed, KpiField};
use quality_kpi::types::{ComplaintType, FilterState, NotificationType};

// ── Tests ────────────────────────────────────────────────────────────────────

/// Empty selections restrict nothing: within the window the output equals
/// the input.
#[test]
fn empty_filter_state_is_identity_within_window() {
    let records = vec![full("101", "2024-05"), full("205", "2024-12"), full("101", "2025-02")];

    let outcome = filter_records(&records, &FilterState::default(), &window("2025-02"));

    assert_eq!(outcome.records, records);
    assert!(outcome.malformed.is_empty());
}

#[test]
fn lookback_window_drops_records_outside_twelve_months() {
    let records = vec![
        empty("101", "2024-02"),
        empty("101", "2024-03"),
        empty("101", "2025-02"),
        empty("101", "2025-03"),
    ];

    let outcome = filter_records(&records, &FilterState::default(), &window("2025-02"));

    let months: Vec<&str> = outcome.records.iter().map(|r| r.month.as_str()).collect();
    assert_eq!(months, vec!["2024-03", "2025-02"]);
}

#[test]
fn plant_filter_keeps_only_selected_sites() {
    let records = vec![full("101", "2025-01"), full("205", "2025-01"), full("310", "2025-02")];
    let state = FilterState {
        selected_plants: vec!["101".into(), "310".into()],
        ..Default::default()
    };

    let outcome = filter_records(&records, &state, &window("2025-02"));

    let sites: Vec<&str> = outcome.records.iter().map(|r| r.site_code.as_str()).collect();
    assert_eq!(sites, vec!["101", "310"]);
}

/// Months outside the date range keep their slot but carry only zeroes.
#[test]
fn date_range_zeroes_months_outside_first_and_last_day() {
    let records = vec![full("101", "2024-12"), full("101", "2025-01"), full("101", "2025-02")];
    let state = FilterState {
        date_from: chrono::NaiveDate::from_ymd_opt(2025, 1, 1),
        // February is not fully covered, so it is zeroed.
        date_to: chrono::NaiveDate::from_ymd_opt(2025, 2, 27),
        ..Default::default()
    };

    let outcome = filter_records(&records, &state, &window("2025-02"));

    assert_eq!(outcome.records.len(), records.len(), "date range never drops records");
    let months: Vec<&str> = outcome.records.iter().map(|r| r.month.as_str()).collect();
    assert_eq!(months, vec!["2024-12", "2025-01", "2025-02"]);
    for r in [&outcome.records[0], &outcome.records[2]] {
        assert_eq!(*r, with_fields_zeroed(r, &KpiField::ALL));
        assert_eq!(r.customer_complaints_q1, 0);
        assert_eq!(r.customer_deliveries, 0.0);
        assert_eq!(r.ppap_p.completed, 0);
        assert!(r.supplier_conversions.is_none());
        assert_eq!(r.customer_ppm, None);
    }
    assert_eq!(outcome.records[1], records[1]);
    assert_eq!(outcome.latest_month, Some(key("2025-01")));
}

/// Deselecting a complaint type zeroes fields on a copy; the record stays.
#[test]
fn complaint_type_filter_zeroes_copies_and_keeps_records() {
    let records = vec![full("101", "2025-01"), full("205", "2025-02")];
    let state = FilterState {
        selected_complaint_types: vec![ComplaintType::Supplier],
        ..Default::default()
    };

    let outcome = filter_records(&records, &state, &window("2025-02"));

    assert_eq!(outcome.records.len(), records.len(), "type filters never drop records");
    for r in &outcome.records {
        assert_eq!(r.customer_complaints_q1, 0);
        assert_eq!(r.customer_defective_parts, 0.0);
        assert_eq!(r.customer_deliveries, 0.0);
        assert!(r.customer_conversions.is_none());
        assert_eq!(r.internal_complaints_q3, 0);
        assert_eq!(r.supplier_complaints_q2, 2);
        assert_eq!(r.supplier_deliveries, 50_000.0);
    }
    // Originals untouched.
    assert_eq!(records[0].customer_complaints_q1, 3);
    assert_eq!(records[0].customer_deliveries, 100_000.0);
}

#[test]
fn notification_type_filter_gates_deviation_and_ppap_counts() {
    let records = vec![full("101", "2025-02")];

    let only_p1 = FilterState {
        selected_notification_types: vec![NotificationType::P1],
        ..Default::default()
    };
    let r = &filter_records(&records, &only_p1, &window("2025-02")).records[0];
    assert_eq!(r.ppap_p.in_progress, 2);
    assert_eq!(r.ppap_p.completed, 0);
    assert_eq!(r.deviations_d, 0);
    assert_eq!(r.customer_complaints_q1, 0);
    assert_eq!(r.customer_defective_parts, 0.0);
    assert_eq!(r.customer_deliveries, 100_000.0, "deliveries are not notification-derived");

    let d_and_p3 = FilterState {
        selected_notification_types: vec![NotificationType::D2, NotificationType::P3],
        ..Default::default()
    };
    let r = &filter_records(&records, &d_and_p3, &window("2025-02")).records[0];
    assert_eq!(r.deviations_d, 1);
    assert_eq!(r.ppap_p.in_progress, 0);
    assert_eq!(r.ppap_p.completed, 4);

    let q1_q3 = FilterState {
        selected_notification_types: vec![NotificationType::Q1, NotificationType::Q3],
        ..Default::default()
    };
    let r = &filter_records(&records, &q1_q3, &window("2025-02")).records[0];
    assert_eq!(r.customer_complaints_q1, 3);
    assert_eq!(r.internal_complaints_q3, 5);
    assert_eq!(r.supplier_complaints_q2, 0);
    assert_eq!(r.supplier_defective_parts, 0.0);
}

/// A fully zeroed record still occupies its month/site slot.
#[test]
fn fully_suppressed_record_is_present_but_zero() {
    let records = vec![full("101", "2025-02")];
    let state = FilterState {
        selected_complaint_types: vec![ComplaintType::Internal],
        selected_notification_types: vec![NotificationType::Q2],
        ..Default::default()
    };

    let outcome = filter_records(&records, &state, &window("2025-02"));

    assert_eq!(outcome.records.len(), 1);
    let r = &outcome.records[0];
    assert_eq!(r.site_code, "101");
    assert_eq!(r.month, "2025-02");
    assert_eq!(r.customer_complaints_q1 + r.supplier_complaints_q2 + r.internal_complaints_q3, 0);
}

#[test]
fn malformed_months_are_reported_not_fatal() {
    let records = vec![empty("101", "2025-02"), empty("205", "Feb-25"), empty("310", "")];

    let outcome = filter_records(&records, &FilterState::default(), &window("2025-02"));

    assert_eq!(outcome.records.len(), 1);
    let bad: Vec<&str> = outcome.malformed.iter().map(|m| m.site_code.as_str()).collect();
    assert_eq!(bad, vec!["205", "310"]);
}

/// Filtering an already filtered set with the same state changes nothing.
#[test]
fn refiltering_is_idempotent() {
    let records = vec![full("101", "2024-11"), full("205", "2025-01"), full("101", "2025-02")];
    let state = FilterState {
        selected_plants: vec!["101".into()],
        selected_complaint_types: vec![ComplaintType::Customer, ComplaintType::Internal],
        selected_notification_types: vec![NotificationType::Q1, NotificationType::P2],
        ..Default::default()
    };
    let w = window("2025-02");

    let once = filter_records(&records, &state, &w).records;
    let twice = filter_records(&once, &state, &w).records;

    assert_eq!(once, twice);
}

#[test]
fn zeroing_defective_clears_stored_ppm() {
    let r = full("101", "2025-02");
    let z = with_fields_zeroed(&r, &[KpiField::CustomerDefective]);
    assert_eq!(z.customer_defective_parts, 0.0);
    assert_eq!(z.customer_ppm, None);
    assert_eq!(z.supplier_ppm, Some(300.0));
    assert_eq!(r.customer_ppm, Some(400.0));
}
