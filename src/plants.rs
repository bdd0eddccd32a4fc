// Plant metadata used only to label sites in reports.
use crate::error::KpiResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantInfo {
    pub code: String,
    pub city: String,
    pub abbreviation: String,
    pub country: String,
}

#[derive(Debug, Clone, Default)]
pub struct PlantDirectory {
    by_code: HashMap<String, PlantInfo>,
}

impl PlantDirectory {
    pub fn new(plants: Vec<PlantInfo>) -> Self {
        Self { by_code: plants.into_iter().map(|p| (p.code.clone(), p)).collect() }
    }

    /// Read a JSON array of plants.
    pub fn from_json_file(path: &Path) -> KpiResult<Self> {
        let s = std::fs::read_to_string(path)?;
        let plants: Vec<PlantInfo> = serde_json::from_str(&s)?;
        Ok(Self::new(plants))
    }

    pub fn get(&self, code: &str) -> Option<&PlantInfo> {
        self.by_code.get(code)
    }

    /// Display label for a site: metadata first, then the record's own site
    /// name, then the bare code.
    pub fn label(&self, code: &str, site_name: Option<&str>) -> String {
        if let Some(p) = self.get(code) {
            return format!("{} {} ({})", p.code, p.abbreviation, p.city);
        }
        match site_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => code.to_string(),
        }
    }
}
