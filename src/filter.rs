// Filter engine.
//
// Plant and lookback filters drop whole records. Date-range, complaint-type and
// notification-type filters never drop: they return copies with the suppressed
// fields zeroed so every month/site bucket stays on the chart axis.
use crate::month::MonthKey;
use crate::period::LookbackWindow;
use crate::types::{ComplaintType, FilterState, MonthlySiteKpi, NotificationType};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashSet;

/// Numeric fields the type filters can suppress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KpiField {
    CustomerComplaints,
    SupplierComplaints,
    InternalComplaints,
    CustomerDefective,
    SupplierDefective,
    CustomerDeliveries,
    SupplierDeliveries,
    CustomerConversions,
    SupplierConversions,
    Deviations,
    PpapInProgress,
    PpapCompleted,
}

impl KpiField {
    pub const ALL: [KpiField; 12] = [
        KpiField::CustomerComplaints,
        KpiField::SupplierComplaints,
        KpiField::InternalComplaints,
        KpiField::CustomerDefective,
        KpiField::SupplierDefective,
        KpiField::CustomerDeliveries,
        KpiField::SupplierDeliveries,
        KpiField::CustomerConversions,
        KpiField::SupplierConversions,
        KpiField::Deviations,
        KpiField::PpapInProgress,
        KpiField::PpapCompleted,
    ];
}

/// A record excluded because its month key did not parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MalformedRecord {
    pub site_code: String,
    pub month: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    pub records: Vec<MonthlySiteKpi>,
    pub malformed: Vec<MalformedRecord>,
    /// Latest month inside the date range. Months zeroed by the date range
    /// stay in `records` but do not count here.
    pub latest_month: Option<MonthKey>,
}

/// Return a copy of `record` with `fields` set to zero. The stored PPM of a
/// side is cleared whenever its defective or delivery quantity is zeroed,
/// since it no longer describes the copy.
pub fn with_fields_zeroed(record: &MonthlySiteKpi, fields: &[KpiField]) -> MonthlySiteKpi {
    let mut out = record.clone();
    for field in fields {
        match field {
            KpiField::CustomerComplaints => out.customer_complaints_q1 = 0,
            KpiField::SupplierComplaints => out.supplier_complaints_q2 = 0,
            KpiField::InternalComplaints => out.internal_complaints_q3 = 0,
            KpiField::CustomerDefective => {
                out.customer_defective_parts = 0.0;
                out.customer_ppm = None;
            }
            KpiField::SupplierDefective => {
                out.supplier_defective_parts = 0.0;
                out.supplier_ppm = None;
            }
            KpiField::CustomerDeliveries => {
                out.customer_deliveries = 0.0;
                out.customer_ppm = None;
            }
            KpiField::SupplierDeliveries => {
                out.supplier_deliveries = 0.0;
                out.supplier_ppm = None;
            }
            KpiField::CustomerConversions => out.customer_conversions = None,
            KpiField::SupplierConversions => out.supplier_conversions = None,
            KpiField::Deviations => out.deviations_d = 0,
            KpiField::PpapInProgress => out.ppap_p.in_progress = 0,
            KpiField::PpapCompleted => out.ppap_p.completed = 0,
        }
    }
    out
}

/// Fields suppressed by the complaint-type selection. Empty selection
/// suppresses nothing.
pub fn complaint_type_suppressions(selected: &[ComplaintType]) -> Vec<KpiField> {
    if selected.is_empty() {
        return Vec::new();
    }
    let mut fields = Vec::new();
    if !selected.contains(&ComplaintType::Customer) {
        fields.extend([
            KpiField::CustomerComplaints,
            KpiField::CustomerDefective,
            KpiField::CustomerDeliveries,
            KpiField::CustomerConversions,
        ]);
    }
    if !selected.contains(&ComplaintType::Supplier) {
        fields.extend([
            KpiField::SupplierComplaints,
            KpiField::SupplierDefective,
            KpiField::SupplierDeliveries,
            KpiField::SupplierConversions,
        ]);
    }
    if !selected.contains(&ComplaintType::Internal) {
        fields.push(KpiField::InternalComplaints);
    }
    fields
}

/// Fields suppressed by the notification-type selection. Deliveries are not
/// notification-derived and are never touched here.
pub fn notification_type_suppressions(selected: &[NotificationType]) -> Vec<KpiField> {
    if selected.is_empty() {
        return Vec::new();
    }
    let mut fields = Vec::new();
    if !selected.contains(&NotificationType::Q1) {
        fields.extend([
            KpiField::CustomerComplaints,
            KpiField::CustomerDefective,
            KpiField::CustomerConversions,
        ]);
    }
    if !selected.contains(&NotificationType::Q2) {
        fields.extend([
            KpiField::SupplierComplaints,
            KpiField::SupplierDefective,
            KpiField::SupplierConversions,
        ]);
    }
    if !selected.contains(&NotificationType::Q3) {
        fields.push(KpiField::InternalComplaints);
    }
    if !selected.iter().any(NotificationType::is_deviation) {
        fields.push(KpiField::Deviations);
    }
    if !selected.contains(&NotificationType::P1) {
        fields.push(KpiField::PpapInProgress);
    }
    if !selected.contains(&NotificationType::P2) && !selected.contains(&NotificationType::P3) {
        fields.push(KpiField::PpapCompleted);
    }
    fields
}

/// Whether the whole of `month` lies within `dateFrom..=dateTo`.
pub fn within_date_range(month: MonthKey, state: &FilterState) -> bool {
    if let Some(from) = state.date_from {
        if month.first_day() < from {
            return false;
        }
    }
    if let Some(to) = state.date_to {
        if month.last_day() > to {
            return false;
        }
    }
    true
}

/// Apply `state` to `records` within `window`. Input records are only read.
pub fn filter_records(
    records: &[MonthlySiteKpi],
    state: &FilterState,
    window: &LookbackWindow,
) -> FilterOutcome {
    let plants: HashSet<&str> = state.selected_plants.iter().map(String::as_str).collect();

    let mut suppressed = complaint_type_suppressions(&state.selected_complaint_types);
    for field in notification_type_suppressions(&state.selected_notification_types) {
        if !suppressed.contains(&field) {
            suppressed.push(field);
        }
    }

    let mut outcome = FilterOutcome::default();
    for record in records {
        if !plants.is_empty() && !plants.contains(record.site_code.as_str()) {
            continue;
        }
        let Some(month) = record.month_key() else {
            warn!(
                "Excluding record for site '{}' with malformed month '{}'",
                record.site_code, record.month
            );
            outcome.malformed.push(MalformedRecord {
                site_code: record.site_code.clone(),
                month: record.month.clone(),
            });
            continue;
        };
        if !window.contains(month) {
            continue;
        }
        let copy = if !within_date_range(month, state) {
            with_fields_zeroed(record, &KpiField::ALL)
        } else {
            outcome.latest_month = outcome.latest_month.max(Some(month));
            if suppressed.is_empty() {
                record.clone()
            } else {
                with_fields_zeroed(record, &suppressed)
            }
        };
        outcome.records.push(copy);
    }

    debug!(
        "Filtered {} of {} records into window {}..={} ({} malformed, {} fields suppressed)",
        outcome.records.len(),
        records.len(),
        window.start_key,
        window.end_key,
        outcome.malformed.len(),
        suppressed.len()
    );
    outcome
}
