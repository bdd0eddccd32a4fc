#![allow(dead_code)]

use quality_kpi::month::MonthKey;
use quality_kpi::period::{resolve_lookback, LookbackWindow};
use quality_kpi::types::{ConversionEntry, ConversionSet, MonthlySiteKpi, PpapCount};

// ── Helpers ──────────────────────────────────────────────────────────────────

pub fn key(s: &str) -> MonthKey {
    MonthKey::parse(s).unwrap()
}

pub fn window(anchor: &str) -> LookbackWindow {
    resolve_lookback(key(anchor))
}

/// A record with every quantity zero.
pub fn empty(site: &str, month: &str) -> MonthlySiteKpi {
    MonthlySiteKpi {
        month: month.to_string(),
        site_code: site.to_string(),
        ..Default::default()
    }
}

/// Customer-side defects and deliveries only.
pub fn customer(site: &str, month: &str, defective: f64, deliveries: f64) -> MonthlySiteKpi {
    MonthlySiteKpi {
        customer_defective_parts: defective,
        customer_deliveries: deliveries,
        ..empty(site, month)
    }
}

/// A record with every field populated so filters have something to zero.
pub fn full(site: &str, month: &str) -> MonthlySiteKpi {
    MonthlySiteKpi {
        month: month.to_string(),
        site_code: site.to_string(),
        site_name: Some(format!("Plant {site}")),
        customer_complaints_q1: 3,
        supplier_complaints_q2: 2,
        internal_complaints_q3: 5,
        customer_defective_parts: 40.0,
        supplier_defective_parts: 15.0,
        customer_deliveries: 100_000.0,
        supplier_deliveries: 50_000.0,
        customer_ppm: Some(400.0),
        supplier_ppm: Some(300.0),
        deviations_d: 1,
        ppap_p: PpapCount { in_progress: 2, completed: 4 },
        customer_conversions: Some(conversion_set(&[("N-1", 500.0, "ML", 2.0)])),
        supplier_conversions: Some(conversion_set(&[("N-2", 12.0, "M", 3.0)])),
    }
}

pub fn conversion_set(entries: &[(&str, f64, &str, f64)]) -> ConversionSet {
    let conversions: Vec<ConversionEntry> = entries
        .iter()
        .map(|(number, original, unit, pc)| ConversionEntry {
            notification_number: number.to_string(),
            original_ml: *original,
            original_unit: unit.to_string(),
            converted_pc: *pc,
            bottle_size: None,
            material_description: None,
        })
        .collect();
    ConversionSet {
        total_ml: conversions.iter().map(|c| c.original_ml).sum(),
        total_pc: conversions.iter().map(|c| c.converted_pc).sum(),
        conversions,
    }
}
