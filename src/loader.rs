use crate::error::KpiResult;
use crate::types::{MonthlySiteKpi, PpapCount, RawRow, Side};
use crate::util::{parse_f64_safe, parse_u64_safe, ppm};
use csv::ReaderBuilder;
use log::{info, warn};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    /// Rows whose month key does not parse. They are still loaded so the
    /// engine can report them.
    pub malformed_months: usize,
    /// Rows whose stored PPM disagrees with the one implied by their own
    /// defective and delivery quantities. Informational only.
    pub ppm_mismatches: usize,
}

/// Load a record snapshot. `.json` files hold an array of records; anything
/// else is read as CSV.
pub fn load_records(path: &Path) -> KpiResult<(Vec<MonthlySiteKpi>, LoadReport)> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let (records, report) = if is_json {
        load_json(path)?
    } else {
        load_csv(path)?
    };
    info!(
        "Loaded {} of {} rows from {} ({} rejected, {} malformed months)",
        report.loaded_rows,
        report.total_rows,
        path.display(),
        report.parse_errors,
        report.malformed_months
    );
    if report.ppm_mismatches > 0 {
        warn!(
            "{} rows carry a stored PPM that does not match defective/deliveries",
            report.ppm_mismatches
        );
    }
    Ok((records, report))
}

pub fn load_json(path: &Path) -> KpiResult<(Vec<MonthlySiteKpi>, LoadReport)> {
    let s = std::fs::read_to_string(path)?;
    let records: Vec<MonthlySiteKpi> = serde_json::from_str(&s)?;
    let total_rows = records.len();
    let mut parse_errors = 0usize;
    let records: Vec<MonthlySiteKpi> = records
        .into_iter()
        .filter(|r| {
            let ok = !r.site_code.trim().is_empty() && quantities_valid(r);
            if !ok {
                parse_errors += 1;
            }
            ok
        })
        .collect();
    let report = LoadReport {
        total_rows,
        loaded_rows: records.len(),
        parse_errors,
        malformed_months: records.iter().filter(|r| r.month_key().is_none()).count(),
        ppm_mismatches: ppm_mismatches(&records),
    };
    Ok((records, report))
}

pub fn load_csv(path: &Path) -> KpiResult<(Vec<MonthlySiteKpi>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_path(path)?;
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records: Vec<MonthlySiteKpi> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Row {}: {}", total_rows, e);
                parse_errors += 1;
                continue;
            }
        };
        match clean_row(row) {
            Some(r) => records.push(r),
            None => {
                warn!("Row {}: missing site code or invalid quantity", total_rows);
                parse_errors += 1;
            }
        }
    }

    let report = LoadReport {
        total_rows,
        loaded_rows: records.len(),
        parse_errors,
        malformed_months: records.iter().filter(|r| r.month_key().is_none()).count(),
        ppm_mismatches: ppm_mismatches(&records),
    };
    Ok((records, report))
}

/// Empty cells count as zero; present cells must parse and be non-negative.
fn count(cell: Option<&str>) -> Option<u64> {
    match cell.map(str::trim) {
        None | Some("") => Some(0),
        Some(s) => parse_u64_safe(Some(s)),
    }
}

fn quantity(cell: Option<&str>) -> Option<f64> {
    match cell.map(str::trim) {
        None | Some("") => Some(0.0),
        Some(s) => parse_f64_safe(Some(s)).filter(|v| *v >= 0.0),
    }
}

fn clean_row(row: RawRow) -> Option<MonthlySiteKpi> {
    let site_code = row.site_code.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    Some(MonthlySiteKpi {
        month: row.month.unwrap_or_default().trim().to_string(),
        site_code: site_code.to_string(),
        site_name: row
            .site_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        customer_complaints_q1: count(row.customer_complaints_q1.as_deref())?,
        supplier_complaints_q2: count(row.supplier_complaints_q2.as_deref())?,
        internal_complaints_q3: count(row.internal_complaints_q3.as_deref())?,
        customer_defective_parts: quantity(row.customer_defective_parts.as_deref())?,
        supplier_defective_parts: quantity(row.supplier_defective_parts.as_deref())?,
        customer_deliveries: quantity(row.customer_deliveries.as_deref())?,
        supplier_deliveries: quantity(row.supplier_deliveries.as_deref())?,
        customer_ppm: parse_f64_safe(row.customer_ppm.as_deref()),
        supplier_ppm: parse_f64_safe(row.supplier_ppm.as_deref()),
        deviations_d: count(row.deviations_d.as_deref())?,
        ppap_p: PpapCount {
            in_progress: count(row.ppap_in_progress.as_deref())?,
            completed: count(row.ppap_completed.as_deref())?,
        },
        customer_conversions: None,
        supplier_conversions: None,
    })
}

fn quantities_valid(r: &MonthlySiteKpi) -> bool {
    [
        r.customer_defective_parts,
        r.supplier_defective_parts,
        r.customer_deliveries,
        r.supplier_deliveries,
    ]
    .iter()
    .all(|v| v.is_finite() && *v >= 0.0)
}

/// Stored PPM values are trusted only as a cross-check; anything off by more
/// than half a percent (or one ppm for small values) counts as a mismatch.
pub fn ppm_mismatches(records: &[MonthlySiteKpi]) -> usize {
    records
        .iter()
        .flat_map(|r| [Side::Customer, Side::Supplier].map(|side| (r, side)))
        .filter(|(r, side)| match r.stored_ppm(*side) {
            Some(stored) => {
                let computed = ppm(r.defective_parts(*side), r.deliveries(*side));
                (stored - computed).abs() > (computed.abs() * 0.005).max(1.0)
            }
            None => false,
        })
        .count()
}
