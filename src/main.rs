//! CLI entry point for the drone selector.
//!
//! Provides subcommands for ranking drones for a port site, listing the
//! known operational purposes, and building the combined site table.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use drone_selector::{
    Attribute, CostLimits, DataSource, PurposeCatalog, SelectionOutcome, SelectionRequest,
    config::Settings,
    fetch::{BasicClient, is_remote, resolve},
    merge::merge_site_files,
    output::{SelectionReport, append_ranked, print_json, print_pretty},
    select,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "drone_selector")]
#[command(about = "Ranks drones for port operations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter and rank the drone catalog for a site
    Select {
        /// Drone catalog CSV, path or URL [env: DRONE_DATA_PATH]
        #[arg(long)]
        catalog: Option<String>,

        /// Site table CSV, path or URL [env: PORT_DATA_PATH]
        #[arg(long)]
        sites: Option<String>,

        /// Site name, matched case-insensitively as a substring
        #[arg(long, default_value = "")]
        site: String,

        /// Operational purpose (repeatable)
        #[arg(short, long = "purpose")]
        purposes: Vec<String>,

        /// Importance of battery life, 1-5
        #[arg(long, default_value_t = 3.0)]
        battery_life: f64,

        /// Importance of wind resistance, 1-5
        #[arg(long, default_value_t = 3.0)]
        wind_resistance: f64,

        /// Importance of camera resolution, 1-5
        #[arg(long, default_value_t = 3.0)]
        camera_resolution: f64,

        /// Importance of price, 1-5
        #[arg(long, default_value_t = 3.0)]
        price: f64,

        /// Maximum purchase price in EUR
        #[arg(long)]
        budget: Option<f64>,

        /// Maximum maintenance cost in EUR
        #[arg(long)]
        maintenance_cost: Option<f64>,

        /// JSON file replacing the built-in purpose profiles
        #[arg(long)]
        purposes_file: Option<String>,

        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,

        /// CSV file to append ranked rows to
        #[arg(short, long)]
        output: Option<String>,

        /// Only report the best N drones
        #[arg(long)]
        top: Option<usize>,
    },
    /// List the operational purposes and their requirements
    ListPurposes {
        /// JSON file replacing the built-in purpose profiles
        #[arg(long)]
        purposes_file: Option<String>,

        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Outer-join per-metric site CSVs into one site table
    MergeSites {
        /// Input CSVs, each keyed by country_code and port_name
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Merged table to write [env: PORT_DATA_PATH]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    let settings = Settings::from_env();

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = settings
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = settings
        .log_file
        .file_name()
        .unwrap_or(OsStr::new("drone_selector.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Select {
            catalog,
            sites,
            site,
            purposes,
            battery_life,
            wind_resistance,
            camera_resolution,
            price,
            budget,
            maintenance_cost,
            purposes_file,
            format,
            output,
            top,
        } => {
            let client = BasicClient::new()?;
            let catalog = resolve(&client, catalog.as_deref().unwrap_or(&settings.drone_data)).await?;
            let sites = site_source(&client, sites.as_deref().unwrap_or(&settings.port_data)).await;
            let purpose_catalog = load_purposes(purposes_file.as_deref())?;

            let limits = CostLimits {
                budget,
                maintenance_ceiling: maintenance_cost,
            };
            let request = SelectionRequest {
                catalog,
                sites,
                site_name: site.clone(),
                purposes: purposes.clone(),
                priorities: vec![
                    (Attribute::BatteryLife.header().to_string(), battery_life),
                    (Attribute::WindResistance.header().to_string(), wind_resistance),
                    (Attribute::CameraResolution.header().to_string(), camera_resolution),
                    (Attribute::Price.header().to_string(), price),
                ],
                limits,
            };

            let selection = select(&request, &purpose_catalog);

            let mut report = SelectionReport::new(&selection, &site, &purposes, limits);
            if let Some(n) = top {
                report = report.top(n);
            }

            match format {
                Format::Pretty => {
                    info!(summary = %report.summary, "Selection summary");
                    for (i, ranked) in report.drones.iter().enumerate() {
                        info!(
                            rank = i + 1,
                            drone = %ranked.drone.name,
                            category = %ranked.drone.category,
                            score = ranked.score,
                            cost_effectiveness = ?ranked.cost_effectiveness,
                            price_eur = ?ranked.drone.price_eur,
                            "Ranked drone"
                        );
                    }
                    print_pretty(&report);
                }
                Format::Json => print_json(&report)?,
            }

            if let Some(path) = output {
                append_ranked(&path, &report)?;
                info!(path = %path, rows = report.drones.len(), "Ranked drones written");
            }

            if let SelectionOutcome::Failed(e) = &selection.outcome {
                bail!("drone selection failed: {e}");
            }
        }
        Commands::ListPurposes {
            purposes_file,
            format,
        } => {
            let catalog = load_purposes(purposes_file.as_deref())?;
            if let Format::Json = format {
                info!("{}", catalog.to_json()?);
                return Ok(());
            }
            for profile in catalog.profiles() {
                let requirements: Vec<String> = profile
                    .requirements
                    .iter()
                    .map(|(attribute, requirement)| format!("{attribute} {requirement}"))
                    .collect();
                info!(
                    purpose = %profile.name,
                    requirements = %requirements.join("; "),
                    "Purpose"
                );
            }
            info!(total = catalog.profiles().len(), "Purpose list complete");
        }
        Commands::MergeSites { inputs, output } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&settings.port_data));
            let merged = merge_site_files(&inputs, &output)?;
            if merged.is_empty() {
                warn!(output = %output.display(), "Merged site table has no rows");
            }
        }
    }

    Ok(())
}

fn load_purposes(path: Option<&str>) -> Result<PurposeCatalog> {
    match path {
        Some(path) => PurposeCatalog::load(path),
        None => Ok(PurposeCatalog::builtin()),
    }
}

/// Site data is optional: a failed download falls back to default
/// constraints instead of aborting the run.
async fn site_source(client: &BasicClient, location: &str) -> Option<DataSource> {
    if !is_remote(location) {
        return Some(DataSource::file(location));
    }
    match resolve(client, location).await {
        Ok(source) => Some(source),
        Err(e) => {
            warn!(source = location, error = %e, "Site data unavailable");
            None
        }
    }
}
