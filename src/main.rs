// Entry point and interactive console flow.
//
// - Option [1] loads the three CSV files and prints load diagnostics.
// - Options [2]-[6] render KPI views for the configured period and export
//   the larger ones to CSV/JSON in the output directory.
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use waste_kpi::aggregate::{all_branch_kpis, company_kpi, site_waste_totals};
use waste_kpi::config::Config;
use waste_kpi::sankey::{flow_graph, FlowScope};
use waste_kpi::trend::{kpi_trend, TrendTarget};
use waste_kpi::{loader, output, reports, util, Dataset, Period, RecordSource};

// Loaded once, reused by every report in the session.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Dataset>,
}

/// Read a single line of input after printing the common prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn loaded_data() -> Option<Dataset> {
    let state = match APP_STATE.lock() {
        Ok(s) => s,
        Err(poisoned) => poisoned.into_inner(),
    };
    state.data.clone()
}

/// The configured period, or the latest one present in the data.
fn target_period(cfg: &Config, data: &Dataset) -> Option<Period> {
    cfg.period
        .clone()
        .or_else(|| data.available_periods().pop())
}

fn handle_load(cfg: &Config) {
    match loader::load_dataset(&cfg.data_dir) {
        Ok((data, report)) => {
            println!(
                "Loaded {} branches, {} sites, {} waste records from {}",
                util::format_int(report.branches),
                util::format_int(report.sites),
                util::format_int(report.records),
                cfg.data_dir.display()
            );
            if report.skipped_rows > 0 {
                println!(
                    "Note: {} rows skipped due to parse/validation errors.",
                    util::format_int(report.skipped_rows)
                );
            }
            if report.defaulted_weights > 0 {
                println!(
                    "Info: {} weight cells were blank or unreadable and counted as 0.",
                    util::format_int(report.defaulted_weights)
                );
            }
            println!();
            let mut state = match APP_STATE.lock() {
                Ok(s) => s,
                Err(poisoned) => poisoned.into_inner(),
            };
            state.data = Some(data);
        }
        Err(e) => {
            error!(error = %e, "load failed");
            eprintln!("Failed to load data: {}\n", e);
        }
    }
}

fn handle_company(cfg: &Config, data: &Dataset, period: &Period) {
    let kpi = company_kpi(data, period);
    println!("Company KPI Summary ({})\n", period);
    output::preview_table_rows(&reports::company_summary_rows(&kpi), usize::MAX);
    let path = cfg.output_dir.join("company_kpi.json");
    if let Err(e) = output::write_json(&path, &kpi) {
        warn!(error = %e, "company export failed");
    }
}

fn handle_branches(cfg: &Config, data: &Dataset, period: &Period) {
    let rows = reports::branch_comparison_rows(&all_branch_kpis(data, period));
    println!("Branch Comparison ({}, ranked by real recycling rate)\n", period);
    output::preview_table_rows(&rows, 10);
    let path = cfg.output_dir.join("branch_comparison.csv");
    match output::write_csv(&path, &rows) {
        Ok(()) => println!("(Full table exported to {})\n", path.display()),
        Err(e) => eprintln!("Write error: {}", e),
    }
}

fn handle_sites(cfg: &Config, data: &Dataset, period: &Period) {
    let rows = reports::site_list_rows(&site_waste_totals(data, None, period));
    println!("Sites ({})\n", period);
    output::preview_table_rows(&rows, 20);
    let path = cfg.output_dir.join("sites.csv");
    match output::write_csv(&path, &rows) {
        Ok(()) => println!("(Full table exported to {})\n", path.display()),
        Err(e) => eprintln!("Write error: {}", e),
    }
}

fn handle_trend(cfg: &Config, data: &Dataset) {
    let series = kpi_trend(data, &TrendTarget::Company, cfg.trend_months);
    println!("Company KPI Trend (last {} periods)\n", cfg.trend_months);
    output::preview_table_rows(&reports::trend_rows(&series), cfg.trend_months);
    let path = cfg.output_dir.join("kpi_trend.json");
    match output::write_json(&path, &series) {
        Ok(()) => println!("(Series exported to {})\n", path.display()),
        Err(e) => eprintln!("Write error: {}", e),
    }
}

fn handle_flow(cfg: &Config, data: &Dataset, period: &Period) {
    let Some(graph) = flow_graph(data, &FlowScope::Company, period) else {
        println!("No waste flow data for {}.\n", period);
        return;
    };
    println!(
        "Waste flow ({}): {} nodes, {} links",
        period,
        graph.nodes.len(),
        graph.links.len()
    );
    for link in graph.links.iter().filter(|l| l.source == 0) {
        println!(
            "  {} -> {}",
            graph.nodes[link.target].name,
            util::format_weight(link.value)
        );
    }
    let path = cfg.output_dir.join("waste_flow.json");
    match output::write_json(&path, &graph) {
        Ok(()) => println!("(Graph exported to {})\n", path.display()),
        Err(e) => eprintln!("Write error: {}", e),
    }
}

fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_filter)),
        )
        .with_writer(io::stderr)
        .init();

    loop {
        println!("Waste KPI Dashboard");
        println!("[1] Load data");
        println!("[2] Company KPI summary");
        println!("[3] Branch comparison");
        println!("[4] Site list");
        println!("[5] Company KPI trend");
        println!("[6] Company waste flow");
        println!("[0] Exit\n");
        let choice = read_choice();
        println!();
        match choice.as_str() {
            "0" => {
                println!("Exiting the program.");
                break;
            }
            "1" => handle_load(&cfg),
            "2" | "3" | "4" | "5" | "6" => {
                let Some(data) = loaded_data() else {
                    println!("Error: No data loaded. Please load the data first (option 1).\n");
                    continue;
                };
                let Some(period) = target_period(&cfg, &data) else {
                    println!("Error: The loaded data contains no waste records.\n");
                    continue;
                };
                match choice.as_str() {
                    "2" => handle_company(&cfg, &data, &period),
                    "3" => handle_branches(&cfg, &data, &period),
                    "4" => handle_sites(&cfg, &data, &period),
                    "5" => handle_trend(&cfg, &data),
                    _ => handle_flow(&cfg, &data, &period),
                }
            }
            _ => println!("Invalid choice. Please enter a number from 0 to 6.\n"),
        }
    }
}
