// Runtime configuration, read from TOML.
//
// Example:
//
//   records_path = "quality_kpis.csv"
//   output_dir = "out"
//   anchor = "2025-02"
//
//   [filter]
//   selectedPlants = ["101", "205"]
//   selectedComplaintTypes = ["Customer"]
//
//   [axis.defects]
//   step = 50.0
//   floor = 100.0
use crate::error::{KpiError, KpiResult};
use crate::month::MonthKey;
use crate::series::AxisScale;
use crate::types::FilterState;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "quality-kpi.toml";
pub const CONFIG_ENV_VAR: &str = "QUALITY_KPI_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    pub complaints: AxisScale,
    pub defects: AxisScale,
    pub deliveries: AxisScale,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            complaints: AxisScale::COMPLAINTS,
            defects: AxisScale::DEFECTS,
            deliveries: AxisScale::DELIVERIES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub records_path: PathBuf,
    pub plants_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub anchor: Option<String>,
    pub filter: FilterState,
    pub axis: AxisConfig,
    pub preview_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            records_path: PathBuf::from("quality_kpis.csv"),
            plants_path: None,
            output_dir: PathBuf::from("."),
            anchor: None,
            filter: FilterState::default(),
            axis: AxisConfig::default(),
            preview_rows: 5,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> KpiResult<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> KpiResult<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Load from `$QUALITY_KPI_CONFIG`, else `quality-kpi.toml` in the working
    /// directory. A missing default file yields the defaults; a missing file
    /// named by the environment variable is an error.
    pub fn load() -> KpiResult<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }
        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.exists() {
            Self::from_file(default)
        } else {
            log::info!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
            Ok(Self::default())
        }
    }

    pub fn anchor_key(&self) -> KpiResult<Option<MonthKey>> {
        match &self.anchor {
            None => Ok(None),
            Some(s) => MonthKey::parse(s)
                .map(Some)
                .ok_or_else(|| KpiError::InvalidAnchor { value: s.clone() }),
        }
    }

    fn validate(&self) -> KpiResult<()> {
        for (name, scale) in [
            ("complaints", self.axis.complaints),
            ("defects", self.axis.defects),
            ("deliveries", self.axis.deliveries),
        ] {
            if scale.step.is_nan() || scale.step <= 0.0 || scale.floor < 0.0 {
                return Err(KpiError::InvalidConfig {
                    reason: format!("axis.{name} needs step > 0 and floor >= 0"),
                });
            }
        }
        if let (Some(from), Some(to)) = (self.filter.date_from, self.filter.date_to) {
            if from > to {
                return Err(KpiError::InvalidConfig {
                    reason: format!("filter dateFrom {from} is after dateTo {to}"),
                });
            }
        }
        self.anchor_key()?;
        Ok(())
    }
}
