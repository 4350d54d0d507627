//! Output formatting and persistence for selection results.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::filters::CostLimits;
use crate::pipeline::Selection;
use crate::ranking::{RankedDrone, WeightVector};
use crate::site::SiteConstraints;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Everything worth reporting about one selection run.
#[derive(Debug, Serialize)]
pub struct SelectionReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub site: &'a str,
    pub purposes: &'a [String],
    pub limits: CostLimits,
    pub constraints: &'a SiteConstraints,
    pub weights: &'a WeightVector,
    pub summary: String,
    pub drones: &'a [RankedDrone],
}

impl<'a> SelectionReport<'a> {
    pub fn new(
        selection: &'a Selection,
        site: &'a str,
        purposes: &'a [String],
        limits: CostLimits,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            site,
            purposes,
            limits,
            constraints: &selection.constraints,
            weights: &selection.weights,
            summary: selection.summary(),
            drones: selection.ranked(),
        }
    }

    /// Keeps only the `n` best drones.
    pub fn top(mut self, n: usize) -> Self {
        self.drones = &self.drones[..n.min(self.drones.len())];
        self
    }
}

/// One CSV row per ranked drone.
#[derive(Debug, Serialize)]
struct RankedRow<'a> {
    generated_at: DateTime<Utc>,
    site: &'a str,
    rank: usize,
    drone_name: &'a str,
    category: &'a str,
    score: f64,
    cost_effectiveness: Option<f64>,
    price_eur: Option<f64>,
    maintenance_cost_eur: Option<f64>,
    battery_life_min: Option<f64>,
    wind_resistance_m_s: Option<f64>,
    camera_resolution_mp: Option<f64>,
}

/// Logs the report using Rust's debug pretty-print format.
pub fn print_pretty(report: &SelectionReport<'_>) {
    debug!("{:#?}", report);
}

/// Logs the report as pretty-printed JSON.
pub fn print_json(report: &SelectionReport<'_>) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Appends one row per ranked drone to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_ranked(path: &str, report: &SelectionReport<'_>) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = report.drones.len(), "Appending ranked rows");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("failed to open '{path}' for append"))?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for (i, ranked) in report.drones.iter().enumerate() {
        let d = &ranked.drone;
        writer.serialize(RankedRow {
            generated_at: report.generated_at,
            site: report.site,
            rank: i + 1,
            drone_name: &d.name,
            category: &d.category,
            score: ranked.score,
            cost_effectiveness: ranked.cost_effectiveness,
            price_eur: d.price_eur,
            maintenance_cost_eur: d.maintenance_cost_eur,
            battery_life_min: d.battery_life_min,
            wind_resistance_m_s: d.wind_resistance_m_s,
            camera_resolution_mp: d.camera_resolution_mp,
        })?;
    }
    writer.flush()?;

    Ok(())
}
