//! Deployment-site environmental constraints.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ParseError, SourceError};
use crate::parser::{parse_optional_number, parse_site_temperature_range};
use crate::source::DataSource;

const DEFAULT_TEMPERATURE_RANGE: (f64, f64) = (-10.0, 45.0);

/// Operating limits a drone must satisfy at a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConstraints {
    pub humidity_percent: f64,
    pub coverage_area_sq_km: f64,
    pub temperature_min_c: f64,
    pub temperature_max_c: f64,
    pub average_wind_speed_m_s: f64,
    pub maximum_wind_speed_m_s: f64,
    /// Minimum IP rating, e.g. `"IP43"`.
    pub environmental_durability: String,
    pub integration_capability: String,
}

impl Default for SiteConstraints {
    fn default() -> Self {
        Self {
            humidity_percent: 80.0,
            coverage_area_sq_km: 25.0,
            temperature_min_c: DEFAULT_TEMPERATURE_RANGE.0,
            temperature_max_c: DEFAULT_TEMPERATURE_RANGE.1,
            average_wind_speed_m_s: 8.0,
            maximum_wind_speed_m_s: 15.0,
            environmental_durability: "IP43".to_string(),
            integration_capability: "Moderate".to_string(),
        }
    }
}

/// One row of the merged site table.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteRow {
    #[serde(default)]
    pub country_code: Option<String>,
    pub port_name: Option<String>,
    #[serde(default)]
    pub humidity_percent: Option<String>,
    #[serde(default)]
    pub coverage_area_sq_km: Option<String>,
    #[serde(default)]
    pub temperature_range_c: Option<String>,
    #[serde(default)]
    pub average_wind_speed_m_s: Option<String>,
    #[serde(default)]
    pub maximum_wind_speed_m_s: Option<String>,
}

impl SiteRow {
    /// Builds constraints from this row. Every field falls back to its
    /// default on its own; a bad temperature range resets both bounds.
    pub fn to_constraints(&self) -> SiteConstraints {
        let defaults = SiteConstraints::default();
        let field = |cell: &Option<String>, default: f64, name: &str| {
            parse_optional_number(cell.as_deref()).unwrap_or_else(|e| {
                debug!(field = name, error = %e, default, "Site field falls back to default");
                default
            })
        };

        let (temperature_min_c, temperature_max_c) = self
            .temperature_range_c
            .as_deref()
            .map_or(Err(ParseError::Missing), parse_site_temperature_range)
            .unwrap_or_else(|e| {
                debug!(error = %e, "Temperature range falls back to default");
                DEFAULT_TEMPERATURE_RANGE
            });

        SiteConstraints {
            humidity_percent: field(
                &self.humidity_percent,
                defaults.humidity_percent,
                "humidity_percent",
            ),
            coverage_area_sq_km: field(
                &self.coverage_area_sq_km,
                defaults.coverage_area_sq_km,
                "coverage_area_sq_km",
            ),
            temperature_min_c,
            temperature_max_c,
            average_wind_speed_m_s: field(
                &self.average_wind_speed_m_s,
                defaults.average_wind_speed_m_s,
                "average_wind_speed_m_s",
            ),
            maximum_wind_speed_m_s: field(
                &self.maximum_wind_speed_m_s,
                defaults.maximum_wind_speed_m_s,
                "maximum_wind_speed_m_s",
            ),
            ..defaults
        }
    }
}

/// Parsed site table.
#[derive(Debug, Clone, Default)]
pub struct SiteTable {
    rows: Vec<SiteRow>,
}

impl SiteTable {
    pub fn new(rows: Vec<SiteRow>) -> Self {
        Self { rows }
    }

    pub fn load(source: &DataSource) -> Result<Self, SourceError> {
        let bytes = source.read_bytes()?;
        Self::parse(&bytes).map_err(|e| SourceError::Malformed {
            path: source.label(),
            source: e,
        })
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(bytes);
        let rows = rdr.deserialize().collect::<Result<Vec<SiteRow>, _>>()?;
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[SiteRow] {
        &self.rows
    }

    /// First row whose port name contains `query`, ignoring case.
    pub fn find(&self, query: &str) -> Option<&SiteRow> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.rows.iter().find(|row| {
            row.port_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
    }
}

/// Derives constraints for `site_name`, falling back to the defaults when the
/// table is absent or nothing matches.
#[tracing::instrument(skip(table))]
pub fn extract_site_constraints(table: Option<&SiteTable>, site_name: &str) -> SiteConstraints {
    let Some(table) = table else {
        info!("No site table available, using default constraints");
        return SiteConstraints::default();
    };

    match table.find(site_name) {
        Some(row) => {
            info!(
                port_name = row.port_name.as_deref().unwrap_or_default(),
                country_code = row.country_code.as_deref().unwrap_or_default(),
                "Site matched"
            );
            row.to_constraints()
        }
        None => {
            warn!(rows = table.rows().len(), "Site not found, using default constraints");
            SiteConstraints::default()
        }
    }
}
