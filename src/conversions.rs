// Unit-conversion disclosure: which defective quantities were reported in a
// non-piece unit and converted before aggregation.
use crate::types::{ConversionEntry, MonthlySiteKpi, Side};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionDetail {
    pub site_code: String,
    pub month: String,
    #[serde(flatten)]
    pub entry: ConversionEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    pub has_conversions: bool,
    /// Number of converted notifications.
    pub total_converted: usize,
    /// Sum of the original quantities, whatever their unit.
    pub total_original_units: f64,
    #[serde(rename = "totalPC")]
    pub total_pc: f64,
    pub details: Vec<ConversionDetail>,
}

/// Flatten the conversion annotations of `side` across `records`, in record
/// order.
pub fn collect_conversions(records: &[MonthlySiteKpi], side: Side) -> ConversionSummary {
    let mut summary = ConversionSummary::default();
    for r in records {
        let Some(set) = r.conversions(side) else {
            continue;
        };
        for entry in &set.conversions {
            summary.total_original_units += entry.original_ml;
            summary.total_pc += entry.converted_pc;
            summary.details.push(ConversionDetail {
                site_code: r.site_code.clone(),
                month: r.month.clone(),
                entry: entry.clone(),
            });
        }
    }
    summary.total_converted = summary.details.len();
    summary.has_conversions = !summary.details.is_empty();
    summary
}
