use crate::month::MonthKey;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One CSV row as exported by the quality system. Every cell is read as text
/// and cleaned by the loader.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Month")]
    pub month: Option<String>,
    #[serde(rename = "SiteCode")]
    pub site_code: Option<String>,
    #[serde(rename = "SiteName")]
    pub site_name: Option<String>,
    #[serde(rename = "CustomerComplaintsQ1")]
    pub customer_complaints_q1: Option<String>,
    #[serde(rename = "SupplierComplaintsQ2")]
    pub supplier_complaints_q2: Option<String>,
    #[serde(rename = "InternalComplaintsQ3")]
    pub internal_complaints_q3: Option<String>,
    #[serde(rename = "CustomerDefectiveParts")]
    pub customer_defective_parts: Option<String>,
    #[serde(rename = "SupplierDefectiveParts")]
    pub supplier_defective_parts: Option<String>,
    #[serde(rename = "CustomerDeliveries")]
    pub customer_deliveries: Option<String>,
    #[serde(rename = "SupplierDeliveries")]
    pub supplier_deliveries: Option<String>,
    #[serde(rename = "CustomerPpm")]
    pub customer_ppm: Option<String>,
    #[serde(rename = "SupplierPpm")]
    pub supplier_ppm: Option<String>,
    #[serde(rename = "DeviationsD")]
    pub deviations_d: Option<String>,
    #[serde(rename = "PpapInProgress")]
    pub ppap_in_progress: Option<String>,
    #[serde(rename = "PpapCompleted")]
    pub ppap_completed: Option<String>,
}

/// PPAP notifications split by state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PpapCount {
    pub in_progress: u64,
    pub completed: u64,
}

/// A single notification whose defective quantity was reported in a
/// non-piece unit and converted to pieces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionEntry {
    pub notification_number: String,
    /// Quantity in the originating unit. The name is historical; the unit is
    /// whatever `original_unit` says.
    #[serde(rename = "originalML")]
    pub original_ml: f64,
    pub original_unit: String,
    #[serde(rename = "convertedPC")]
    pub converted_pc: f64,
    #[serde(default)]
    pub bottle_size: Option<f64>,
    #[serde(default)]
    pub material_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionSet {
    #[serde(default)]
    pub conversions: Vec<ConversionEntry>,
    #[serde(rename = "totalML", default)]
    pub total_ml: f64,
    #[serde(rename = "totalPC", default)]
    pub total_pc: f64,
}

/// One site, one calendar month. Produced by ingestion and never mutated by
/// the engine; filtering works on copies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySiteKpi {
    /// `YYYY-MM`. Kept as text so a malformed value can reach the engine and be
    /// reported instead of failing the whole snapshot.
    pub month: String,
    pub site_code: String,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub customer_complaints_q1: u64,
    #[serde(default)]
    pub supplier_complaints_q2: u64,
    #[serde(default)]
    pub internal_complaints_q3: u64,
    #[serde(default)]
    pub customer_defective_parts: f64,
    #[serde(default)]
    pub supplier_defective_parts: f64,
    #[serde(default)]
    pub customer_deliveries: f64,
    #[serde(default)]
    pub supplier_deliveries: f64,
    #[serde(default)]
    pub customer_ppm: Option<f64>,
    #[serde(default)]
    pub supplier_ppm: Option<f64>,
    #[serde(default)]
    pub deviations_d: u64,
    #[serde(default)]
    pub ppap_p: PpapCount,
    #[serde(default)]
    pub customer_conversions: Option<ConversionSet>,
    #[serde(default)]
    pub supplier_conversions: Option<ConversionSet>,
}

impl MonthlySiteKpi {
    pub fn month_key(&self) -> Option<MonthKey> {
        MonthKey::parse(&self.month)
    }

    pub fn complaints(&self, side: Side) -> u64 {
        match side {
            Side::Customer => self.customer_complaints_q1,
            Side::Supplier => self.supplier_complaints_q2,
        }
    }

    pub fn defective_parts(&self, side: Side) -> f64 {
        match side {
            Side::Customer => self.customer_defective_parts,
            Side::Supplier => self.supplier_defective_parts,
        }
    }

    pub fn deliveries(&self, side: Side) -> f64 {
        match side {
            Side::Customer => self.customer_deliveries,
            Side::Supplier => self.supplier_deliveries,
        }
    }

    pub fn conversions(&self, side: Side) -> Option<&ConversionSet> {
        match side {
            Side::Customer => self.customer_conversions.as_ref(),
            Side::Supplier => self.supplier_conversions.as_ref(),
        }
    }

    /// The stored PPM, if ingestion supplied one. The engine recomputes PPM
    /// from sums and only uses this for sanity checks.
    pub fn stored_ppm(&self, side: Side) -> Option<f64> {
        match side {
            Side::Customer => self.customer_ppm,
            Side::Supplier => self.supplier_ppm,
        }
    }
}

/// The two parties a defect or delivery can be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Customer,
    Supplier,
}

impl Side {
    pub fn label(&self) -> &'static str {
        match self {
            Side::Customer => "Customer",
            Side::Supplier => "Supplier",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplaintType {
    Customer,
    Supplier,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NotificationType {
    Q1,
    Q2,
    Q3,
    D1,
    D2,
    D3,
    P1,
    P2,
    P3,
}

impl NotificationType {
    pub fn is_deviation(&self) -> bool {
        matches!(self, NotificationType::D1 | NotificationType::D2 | NotificationType::D3)
    }
}

/// User-controlled filters. Empty lists mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub selected_plants: Vec<String>,
    pub selected_complaint_types: Vec<ComplaintType>,
    pub selected_notification_types: Vec<NotificationType>,
    pub date_from: Option<chrono::NaiveDate>,
    pub date_to: Option<chrono::NaiveDate>,
}

// ── Report rows ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MetricTileRow {
    #[serde(rename = "Metric")]
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
    #[serde(rename = "Previous")]
    #[tabled(rename = "Previous")]
    pub previous: String,
    #[serde(rename = "Change")]
    #[tabled(rename = "Change")]
    pub change: String,
    #[serde(rename = "ChangePct")]
    #[tabled(rename = "ChangePct")]
    pub change_pct: String,
    #[serde(rename = "Trend")]
    #[tabled(rename = "Trend")]
    pub trend: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ConversionRow {
    #[serde(rename = "Site")]
    #[tabled(rename = "Site")]
    pub site: String,
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Notification")]
    #[tabled(rename = "Notification")]
    pub notification: String,
    #[serde(rename = "Original")]
    #[tabled(rename = "Original")]
    pub original: String,
    #[serde(rename = "ConvertedPC")]
    #[tabled(rename = "ConvertedPC")]
    pub converted_pc: String,
    #[serde(rename = "Material")]
    #[tabled(rename = "Material")]
    pub material: String,
}
