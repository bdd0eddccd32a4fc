use crate::error::KpiResult;
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> KpiResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a sheet whose first row is the header.
pub fn write_sheet(path: &Path, sheet: &[Vec<String>]) -> KpiResult<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    for row in sheet {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> KpiResult<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Preview the header plus up to `max_rows` body rows of a sheet.
pub fn preview_sheet(sheet: &[Vec<String>], max_rows: usize) {
    if sheet.len() <= 1 {
        println!("(no rows)\n");
        return;
    }
    let mut builder = Builder::default();
    for row in sheet.iter().take(max_rows + 1) {
        builder.push_record(row.iter().cloned());
    }
    let table_str = builder.build().with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
