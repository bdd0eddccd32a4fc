// Entry point and high-level CLI flow.
//
// - Option [1] loads the record snapshot named in the config and prints
//   diagnostics.
// - Option [2] derives the dashboard, writes the exports and prints previews.
// - After generating reports, the user can go back to the menu or exit.
use anyhow::{Context, Result};
use quality_kpi::config::AppConfig;
use quality_kpi::plants::PlantDirectory;
use quality_kpi::{build_dashboard, loader, logging, output, reports, util, MonthlySiteKpi};
use std::io::{self, Write};

struct AppState {
    config: AppConfig,
    plants: PlantDirectory,
    records: Option<Vec<MonthlySiteKpi>>,
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn handle_load(state: &mut AppState) -> Result<()> {
    let path = state.config.records_path.clone();
    let (records, report) = loader::load_records(&path)
        .with_context(|| format!("loading records from {}", path.display()))?;
    println!(
        "Processing dataset... ({} rows read, {} loaded)",
        util::format_int(report.total_rows as u64),
        util::format_int(report.loaded_rows as u64)
    );
    if report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse/validation errors.",
            util::format_int(report.parse_errors as u64)
        );
    }
    if report.malformed_months > 0 {
        println!(
            "Warning: {} rows have a malformed month and will be excluded from charts.",
            util::format_int(report.malformed_months as u64)
        );
    }
    println!();
    // A reload replaces the previous snapshot wholesale.
    state.records = Some(records);
    Ok(())
}

fn handle_generate_reports(state: &AppState) -> Result<()> {
    let Some(records) = state.records.as_deref() else {
        println!("Error: No data loaded. Please load the records first (option 1).\n");
        return Ok(());
    };
    let config = &state.config;
    let today = chrono::Local::now().date_naive();
    let dashboard = build_dashboard(
        records,
        &config.filter,
        config.anchor_key()?,
        today,
        &config.axis,
    );

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;
    let out = |name: &str| config.output_dir.join(name);
    let n = config.preview_rows;

    println!("Generating reports...");
    println!(
        "Window {} to {}, {} records in scope",
        dashboard.window.start_key,
        dashboard.window.end_key,
        util::format_int(dashboard.record_count as u64)
    );
    if !dashboard.malformed.is_empty() {
        println!("{} records excluded for malformed months", dashboard.malformed.len());
    }
    println!();

    let tiles = reports::metric_tile_rows(&dashboard.kpis);
    output::write_csv(&out("kpi_tiles.csv"), &tiles)?;
    println!("Report 1: KPI Tiles");
    match (dashboard.latest_month, dashboard.previous_month) {
        (Some(latest), Some(previous)) => {
            println!("(Cumulative through {latest}, compared with through {previous})\n")
        }
        _ => println!("(No data in window)\n"),
    }
    output::preview_table_rows(&tiles, tiles.len());

    let series = reports::series_sheet(&dashboard.notification_chart.rows);
    output::write_sheet(&out("notification_series.csv"), &series)?;
    println!("Report 2: Notifications by Month");
    println!(
        "(Axis ceiling {})\n",
        util::format_number(dashboard.notification_chart.axis_max, 0)
    );
    output::preview_sheet(&series, n);

    for (file, title, table) in [
        ("customer_contribution.csv", "Customer", &dashboard.customer_contribution),
        ("supplier_contribution.csv", "Supplier", &dashboard.supplier_contribution),
    ] {
        let sheet = reports::contribution_sheet(table, &state.plants, records);
        output::write_sheet(&out(file), &sheet)?;
        println!("Report: {title} Site Contribution (defective parts)");
        if let Some(avg) = table.average_monthly_ppm() {
            println!("(Average monthly PPM {})", util::format_number(avg, 2));
        }
        println!();
        output::preview_sheet(&sheet, sheet.len());
    }

    for (title, summary) in [
        ("Customer", &dashboard.customer_conversions),
        ("Supplier", &dashboard.supplier_conversions),
    ] {
        if summary.has_conversions {
            println!(
                "{title} unit conversions: {} notifications, {} original units -> {} PC\n",
                summary.total_converted,
                util::format_number(summary.total_original_units, 2),
                util::format_number(summary.total_pc, 2)
            );
            output::preview_table_rows(&reports::conversion_rows(summary), n);
        }
    }

    output::write_json(&out("dashboard.json"), &dashboard)?;
    println!("Full dashboard saved to {}\n", out("dashboard.json").display());
    Ok(())
}

fn main() -> Result<()> {
    logging::init();
    let config = AppConfig::load().context("reading configuration")?;
    let plants = match &config.plants_path {
        Some(path) => PlantDirectory::from_json_file(path)
            .with_context(|| format!("reading plants from {}", path.display()))?,
        None => PlantDirectory::default(),
    };
    let mut state = AppState { config, plants, records: None };

    loop {
        println!("Quality KPI Reports");
        println!("[1] Load the records");
        println!("[2] Generate Reports\n");
        match read_choice().as_str() {
            "1" => {
                if let Err(e) = handle_load(&mut state) {
                    eprintln!("Failed to load file: {:#}\n", e);
                }
            }
            "2" => {
                println!();
                if let Err(e) = handle_generate_reports(&state) {
                    eprintln!("Report error: {:#}\n", e);
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
    Ok(())
}
