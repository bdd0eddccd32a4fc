// Site contribution table: defective parts and deliveries cross-tabulated by
// site and month, with per-month and grand-total PPM.
use crate::month::MonthKey;
use crate::types::{MonthlySiteKpi, Side};
use crate::util::{average, format_number, ppm};
use log::warn;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CellTotals {
    pub defective: f64,
    pub deliveries: f64,
}

impl CellTotals {
    pub fn ppm(&self) -> f64 {
        ppm(self.defective, self.deliveries)
    }

    fn add(&mut self, defective: f64, deliveries: f64) {
        self.defective += defective;
        self.deliveries += deliveries;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub defective: f64,
    pub deliveries: f64,
    pub ppm: f64,
}

impl From<CellTotals> for PeriodTotals {
    fn from(cell: CellTotals) -> Self {
        Self { defective: cell.defective, deliveries: cell.deliveries, ppm: cell.ppm() }
    }
}

/// Position of a month's PPM relative to the mean monthly PPM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PpmBand {
    AboveAverage,
    AtAverage,
    BelowAverage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionTable {
    pub side: Side,
    pub sites: Vec<String>,
    pub months: Vec<MonthKey>,
    cells: BTreeMap<String, BTreeMap<MonthKey, CellTotals>>,
    month_totals: BTreeMap<MonthKey, CellTotals>,
    pub grand_total: PeriodTotals,
}

impl ContributionTable {
    /// Totals for one site in one month; zero when the pair never appeared.
    pub fn cell(&self, site: &str, month: MonthKey) -> CellTotals {
        self.cells
            .get(site)
            .and_then(|m| m.get(&month))
            .copied()
            .unwrap_or_default()
    }

    /// Totals for one site across all months.
    pub fn site_total(&self, site: &str) -> PeriodTotals {
        let mut acc = CellTotals::default();
        if let Some(months) = self.cells.get(site) {
            for cell in months.values() {
                acc.add(cell.defective, cell.deliveries);
            }
        }
        acc.into()
    }

    pub fn month_total(&self, month: MonthKey) -> PeriodTotals {
        self.month_totals.get(&month).copied().unwrap_or_default().into()
    }

    /// Arithmetic mean of the monthly PPM values, skipping months without
    /// deliveries. `None` when no month had deliveries.
    pub fn average_monthly_ppm(&self) -> Option<f64> {
        let values: Vec<f64> = self
            .month_totals
            .values()
            .filter(|t| t.deliveries > 0.0)
            .map(CellTotals::ppm)
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(average(&values))
        }
    }

    /// Classify a month against the mean monthly PPM. `None` for months with
    /// no deliveries, or when no mean exists.
    pub fn ppm_band(&self, month: MonthKey) -> Option<PpmBand> {
        let totals = self.month_totals.get(&month)?;
        if totals.deliveries <= 0.0 {
            return None;
        }
        let mean = self.average_monthly_ppm()?;
        let value = totals.ppm();
        Some(if value > mean {
            PpmBand::AboveAverage
        } else if value < mean {
            PpmBand::BelowAverage
        } else {
            PpmBand::AtAverage
        })
    }

    /// Two-dimensional export: a header of months plus `TOTAL`, one row of
    /// defective parts per site, then total-defective, total-deliveries and
    /// calculated-PPM rows. `label` renders the site column.
    pub fn to_sheet<F>(&self, label: F) -> Vec<Vec<String>>
    where
        F: Fn(&str) -> String,
    {
        let mut sheet = Vec::with_capacity(self.sites.len() + 4);

        let mut header = vec!["Site".to_string()];
        header.extend(self.months.iter().map(MonthKey::to_string));
        header.push("TOTAL".to_string());
        sheet.push(header);

        for site in &self.sites {
            let mut row = vec![label(site)];
            row.extend(
                self.months
                    .iter()
                    .map(|m| format_number(self.cell(site, *m).defective, 0)),
            );
            row.push(format_number(self.site_total(site).defective, 0));
            sheet.push(row);
        }

        sheet.push(self.aggregate_row("Total defective", |t| format_number(t.defective, 0)));
        sheet.push(self.aggregate_row("Total deliveries", |t| format_number(t.deliveries, 0)));
        sheet.push(self.aggregate_row("Calculated PPM", |t| format_number(t.ppm, 2)));
        sheet
    }

    fn aggregate_row(&self, name: &str, pick: fn(&PeriodTotals) -> String) -> Vec<String> {
        let mut row = vec![name.to_string()];
        row.extend(self.months.iter().map(|m| pick(&self.month_total(*m))));
        row.push(pick(&self.grand_total));
        row
    }
}

/// Cross-tabulate `side` defective parts and deliveries. An empty
/// `restrict_to_sites` includes every site. Duplicate site/month rows are
/// summed.
pub fn build_contribution(
    records: &[MonthlySiteKpi],
    side: Side,
    restrict_to_sites: &[String],
) -> ContributionTable {
    let restrict: BTreeSet<&str> = restrict_to_sites.iter().map(String::as_str).collect();

    let mut cells: BTreeMap<String, BTreeMap<MonthKey, CellTotals>> = BTreeMap::new();
    let mut month_totals: BTreeMap<MonthKey, CellTotals> = BTreeMap::new();
    let mut grand = CellTotals::default();

    for r in records {
        if !restrict.is_empty() && !restrict.contains(r.site_code.as_str()) {
            continue;
        }
        let Some(month) = r.month_key() else {
            warn!(
                "Contribution: skipping site '{}' with malformed month '{}'",
                r.site_code, r.month
            );
            continue;
        };
        let defective = r.defective_parts(side);
        let deliveries = r.deliveries(side);
        cells
            .entry(r.site_code.clone())
            .or_default()
            .entry(month)
            .or_default()
            .add(defective, deliveries);
        month_totals.entry(month).or_default().add(defective, deliveries);
        grand.add(defective, deliveries);
    }

    ContributionTable {
        side,
        sites: cells.keys().cloned().collect(),
        months: month_totals.keys().copied().collect(),
        cells,
        month_totals,
        grand_total: grand.into(),
    }
}
