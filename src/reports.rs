// Flatten derived views into rows for CSV export and console previews.
use crate::contribution::ContributionTable;
use crate::conversions::ConversionSummary;
use crate::metrics::{KpiSummary, MetricValue};
use crate::plants::PlantDirectory;
use crate::series::{series_keys, SeriesRow};
use crate::types::{ConversionRow, MetricTileRow, MonthlySiteKpi, Side};
use crate::util::format_number;
use std::collections::HashMap;

fn tile(metric: String, v: &MetricValue, decimals: usize) -> MetricTileRow {
    MetricTileRow {
        metric,
        value: format_number(v.value, decimals),
        previous: format_number(v.previous_value, decimals),
        change: format_number(v.change, decimals),
        change_pct: format!("{:.2}", v.change_percent),
        trend: v.trend.as_str().to_string(),
    }
}

pub fn metric_tile_rows(kpis: &KpiSummary) -> Vec<MetricTileRow> {
    let mut rows = Vec::new();
    for side in [Side::Customer, Side::Supplier] {
        let f = kpis.family(side);
        let label = side.label();
        rows.push(tile(format!("{label} complaints"), &f.complaints, 0));
        rows.push(tile(format!("{label} defective parts"), &f.defective, 0));
        rows.push(tile(format!("{label} deliveries"), &f.deliveries, 0));
        rows.push(tile(format!("{label} PPM"), &f.ppm, 2));
    }
    rows.push(tile("Internal complaints".into(), &kpis.internal_complaints, 0));
    rows.push(tile("Deviations".into(), &kpis.deviations, 0));
    rows.push(tile("PPAP in progress".into(), &kpis.ppap_in_progress, 0));
    rows.push(tile("PPAP completed".into(), &kpis.ppap_completed, 0));
    rows
}

/// Month rows with one column per dimension key and a trailing total.
pub fn series_sheet(rows: &[SeriesRow]) -> Vec<Vec<String>> {
    let keys = series_keys(rows);
    let mut sheet = Vec::with_capacity(rows.len() + 1);
    let mut header = vec!["Month".to_string()];
    header.extend(keys.iter().cloned());
    header.push("Total".to_string());
    sheet.push(header);
    for row in rows {
        let mut line = vec![row.month.to_string()];
        line.extend(
            keys.iter()
                .map(|k| format_number(row.values.get(k).copied().unwrap_or(0.0), 0)),
        );
        line.push(format_number(row.total, 0));
        sheet.push(line);
    }
    sheet
}

/// Contribution sheet with sites labelled from plant metadata, falling back
/// to the first site name seen in the records.
pub fn contribution_sheet(
    table: &ContributionTable,
    plants: &PlantDirectory,
    records: &[MonthlySiteKpi],
) -> Vec<Vec<String>> {
    let mut names: HashMap<&str, &str> = HashMap::new();
    for r in records {
        if let Some(name) = r.site_name.as_deref() {
            names.entry(r.site_code.as_str()).or_insert(name);
        }
    }
    table.to_sheet(|code| plants.label(code, names.get(code).copied()))
}

pub fn conversion_rows(summary: &ConversionSummary) -> Vec<ConversionRow> {
    summary
        .details
        .iter()
        .map(|d| ConversionRow {
            site: d.site_code.clone(),
            month: d.month.clone(),
            notification: d.entry.notification_number.clone(),
            original: format!(
                "{} {}",
                format_number(d.entry.original_ml, 2),
                d.entry.original_unit
            ),
            converted_pc: format_number(d.entry.converted_pc, 2),
            material: d.entry.material_description.clone().unwrap_or_default(),
        })
        .collect()
}
