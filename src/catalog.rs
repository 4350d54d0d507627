//! Drone catalog loading and normalization.
//!
//! A catalog is read from CSV into [`DroneRecord`]s, numeric cells are coerced
//! (anything unparseable becomes missing), and [`Catalog::normalize`] then
//! imputes missing values and standardizes categorical text so that every
//! later stage compares like with like.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SelectionError;
use crate::parser::{parse_optional_number, title_case};
use crate::source::DataSource;
use crate::utility::median;

/// A catalog column, named by its exact CSV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    #[serde(rename = "Flight Radius (km)")]
    FlightRadius,
    #[serde(rename = "Maximum Flight Height (m)")]
    MaxFlightHeight,
    #[serde(rename = "Max Daily Flights")]
    MaxDailyFlights,
    #[serde(rename = "Wind Resistance (m/s)")]
    WindResistance,
    #[serde(rename = "Battery Life (minutes)")]
    BatteryLife,
    #[serde(rename = "Payload Capacity (kg)")]
    PayloadCapacity,
    #[serde(rename = "Camera Resolution (MP)")]
    CameraResolution,
    #[serde(rename = "Thermal Camera Resolution (MP)")]
    ThermalCameraResolution,
    #[serde(rename = "Price (EUR)")]
    Price,
    #[serde(rename = "Maintenance Cost (EUR)")]
    MaintenanceCost,
    #[serde(rename = "Day/Night Operation")]
    DayNightOperation,
    #[serde(rename = "Real-Time Data Streaming")]
    RealTimeStreaming,
    #[serde(rename = "Infrared/Night Vision Capability")]
    NightVision,
    #[serde(rename = "IP Rating")]
    IpRating,
    #[serde(rename = "Temperature Resistance")]
    TemperatureResistance,
    #[serde(rename = "Humidity Resistance")]
    HumidityResistance,
}

impl Attribute {
    pub const NUMERIC: [Attribute; 10] = [
        Attribute::FlightRadius,
        Attribute::MaxFlightHeight,
        Attribute::MaxDailyFlights,
        Attribute::WindResistance,
        Attribute::BatteryLife,
        Attribute::PayloadCapacity,
        Attribute::CameraResolution,
        Attribute::ThermalCameraResolution,
        Attribute::Price,
        Attribute::MaintenanceCost,
    ];

    pub const CATEGORICAL: [Attribute; 6] = [
        Attribute::DayNightOperation,
        Attribute::RealTimeStreaming,
        Attribute::NightVision,
        Attribute::IpRating,
        Attribute::TemperatureResistance,
        Attribute::HumidityResistance,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Attribute::FlightRadius => "Flight Radius (km)",
            Attribute::MaxFlightHeight => "Maximum Flight Height (m)",
            Attribute::MaxDailyFlights => "Max Daily Flights",
            Attribute::WindResistance => "Wind Resistance (m/s)",
            Attribute::BatteryLife => "Battery Life (minutes)",
            Attribute::PayloadCapacity => "Payload Capacity (kg)",
            Attribute::CameraResolution => "Camera Resolution (MP)",
            Attribute::ThermalCameraResolution => "Thermal Camera Resolution (MP)",
            Attribute::Price => "Price (EUR)",
            Attribute::MaintenanceCost => "Maintenance Cost (EUR)",
            Attribute::DayNightOperation => "Day/Night Operation",
            Attribute::RealTimeStreaming => "Real-Time Data Streaming",
            Attribute::NightVision => "Infrared/Night Vision Capability",
            Attribute::IpRating => "IP Rating",
            Attribute::TemperatureResistance => "Temperature Resistance",
            Attribute::HumidityResistance => "Humidity Resistance",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        Self::NUMERIC
            .into_iter()
            .chain(Self::CATEGORICAL)
            .find(|a| a.header() == header)
    }

    pub fn is_numeric(self) -> bool {
        Self::NUMERIC.contains(&self)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One catalog row as it appears on disk, before any coercion.
#[derive(Debug, Deserialize)]
struct RawDroneRow {
    #[serde(rename = "Drone Name")]
    name: String,
    #[serde(rename = "Category", default)]
    category: Option<String>,
    #[serde(rename = "Flight Radius (km)", default)]
    flight_radius_km: Option<String>,
    #[serde(rename = "Maximum Flight Height (m)", default)]
    max_flight_height_m: Option<String>,
    #[serde(rename = "Max Daily Flights", default)]
    max_daily_flights: Option<String>,
    #[serde(rename = "Wind Resistance (m/s)", default)]
    wind_resistance_m_s: Option<String>,
    #[serde(rename = "Battery Life (minutes)", default)]
    battery_life_min: Option<String>,
    #[serde(rename = "Payload Capacity (kg)", default)]
    payload_capacity_kg: Option<String>,
    #[serde(rename = "Camera Resolution (MP)", default)]
    camera_resolution_mp: Option<String>,
    #[serde(rename = "Thermal Camera Resolution (MP)", default)]
    thermal_camera_resolution_mp: Option<String>,
    #[serde(rename = "Price (EUR)", default)]
    price_eur: Option<String>,
    #[serde(rename = "Maintenance Cost (EUR)", default)]
    maintenance_cost_eur: Option<String>,
    #[serde(rename = "Day/Night Operation", default)]
    day_night_operation: Option<String>,
    #[serde(rename = "Real-Time Data Streaming", default)]
    real_time_streaming: Option<String>,
    #[serde(rename = "Infrared/Night Vision Capability", default)]
    night_vision: Option<String>,
    #[serde(rename = "IP Rating", default)]
    ip_rating: Option<String>,
    #[serde(rename = "Temperature Resistance", default)]
    temperature_resistance: Option<String>,
    #[serde(rename = "Humidity Resistance", default)]
    humidity_resistance: Option<String>,
}

/// A single drone model.
///
/// Numeric fields are `None` before normalization when the cell was missing or
/// unparseable. After [`Catalog::normalize`] a numeric field is only `None`
/// when its whole column carried no observation to impute from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroneRecord {
    #[serde(rename = "Drone Name")]
    pub name: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Flight Radius (km)")]
    pub flight_radius_km: Option<f64>,
    #[serde(rename = "Maximum Flight Height (m)")]
    pub max_flight_height_m: Option<f64>,
    #[serde(rename = "Max Daily Flights")]
    pub max_daily_flights: Option<f64>,
    #[serde(rename = "Wind Resistance (m/s)")]
    pub wind_resistance_m_s: Option<f64>,
    #[serde(rename = "Battery Life (minutes)")]
    pub battery_life_min: Option<f64>,
    #[serde(rename = "Payload Capacity (kg)")]
    pub payload_capacity_kg: Option<f64>,
    #[serde(rename = "Camera Resolution (MP)")]
    pub camera_resolution_mp: Option<f64>,
    #[serde(rename = "Thermal Camera Resolution (MP)")]
    pub thermal_camera_resolution_mp: Option<f64>,
    #[serde(rename = "Price (EUR)")]
    pub price_eur: Option<f64>,
    #[serde(rename = "Maintenance Cost (EUR)")]
    pub maintenance_cost_eur: Option<f64>,
    #[serde(rename = "Day/Night Operation")]
    pub day_night_operation: Option<String>,
    #[serde(rename = "Real-Time Data Streaming")]
    pub real_time_streaming: Option<String>,
    #[serde(rename = "Infrared/Night Vision Capability")]
    pub night_vision: Option<String>,
    #[serde(rename = "IP Rating")]
    pub ip_rating: Option<String>,
    #[serde(rename = "Temperature Resistance")]
    pub temperature_resistance: Option<String>,
    #[serde(rename = "Humidity Resistance")]
    pub humidity_resistance: Option<String>,
}

impl DroneRecord {
    /// A record with only a name and category; every attribute is missing.
    pub fn named(name: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            flight_radius_km: None,
            max_flight_height_m: None,
            max_daily_flights: None,
            wind_resistance_m_s: None,
            battery_life_min: None,
            payload_capacity_kg: None,
            camera_resolution_mp: None,
            thermal_camera_resolution_mp: None,
            price_eur: None,
            maintenance_cost_eur: None,
            day_night_operation: None,
            real_time_streaming: None,
            night_vision: None,
            ip_rating: None,
            temperature_resistance: None,
            humidity_resistance: None,
        }
    }

    fn from_raw(raw: RawDroneRow) -> Self {
        let num = |cell: &Option<String>| parse_optional_number(cell.as_deref()).ok();
        Self {
            flight_radius_km: num(&raw.flight_radius_km),
            max_flight_height_m: num(&raw.max_flight_height_m),
            max_daily_flights: num(&raw.max_daily_flights),
            wind_resistance_m_s: num(&raw.wind_resistance_m_s),
            battery_life_min: num(&raw.battery_life_min),
            payload_capacity_kg: num(&raw.payload_capacity_kg),
            camera_resolution_mp: num(&raw.camera_resolution_mp),
            thermal_camera_resolution_mp: num(&raw.thermal_camera_resolution_mp),
            price_eur: num(&raw.price_eur),
            maintenance_cost_eur: num(&raw.maintenance_cost_eur),
            name: raw.name.trim().to_string(),
            category: raw.category.unwrap_or_default().trim().to_string(),
            day_night_operation: raw.day_night_operation,
            real_time_streaming: raw.real_time_streaming,
            night_vision: raw.night_vision,
            ip_rating: raw.ip_rating,
            temperature_resistance: raw.temperature_resistance,
            humidity_resistance: raw.humidity_resistance,
        }
    }

    /// Value of a numeric attribute; always `None` for categorical ones.
    pub fn numeric(&self, attribute: Attribute) -> Option<f64> {
        match attribute {
            Attribute::FlightRadius => self.flight_radius_km,
            Attribute::MaxFlightHeight => self.max_flight_height_m,
            Attribute::MaxDailyFlights => self.max_daily_flights,
            Attribute::WindResistance => self.wind_resistance_m_s,
            Attribute::BatteryLife => self.battery_life_min,
            Attribute::PayloadCapacity => self.payload_capacity_kg,
            Attribute::CameraResolution => self.camera_resolution_mp,
            Attribute::ThermalCameraResolution => self.thermal_camera_resolution_mp,
            Attribute::Price => self.price_eur,
            Attribute::MaintenanceCost => self.maintenance_cost_eur,
            _ => None,
        }
    }

    /// Text of a categorical attribute; always `None` for numeric ones.
    pub fn text(&self, attribute: Attribute) -> Option<&str> {
        match attribute {
            Attribute::DayNightOperation => self.day_night_operation.as_deref(),
            Attribute::RealTimeStreaming => self.real_time_streaming.as_deref(),
            Attribute::NightVision => self.night_vision.as_deref(),
            Attribute::IpRating => self.ip_rating.as_deref(),
            Attribute::TemperatureResistance => self.temperature_resistance.as_deref(),
            Attribute::HumidityResistance => self.humidity_resistance.as_deref(),
            _ => None,
        }
    }

    fn numeric_slot(&mut self, attribute: Attribute) -> Option<&mut Option<f64>> {
        match attribute {
            Attribute::FlightRadius => Some(&mut self.flight_radius_km),
            Attribute::MaxFlightHeight => Some(&mut self.max_flight_height_m),
            Attribute::MaxDailyFlights => Some(&mut self.max_daily_flights),
            Attribute::WindResistance => Some(&mut self.wind_resistance_m_s),
            Attribute::BatteryLife => Some(&mut self.battery_life_min),
            Attribute::PayloadCapacity => Some(&mut self.payload_capacity_kg),
            Attribute::CameraResolution => Some(&mut self.camera_resolution_mp),
            Attribute::ThermalCameraResolution => Some(&mut self.thermal_camera_resolution_mp),
            Attribute::Price => Some(&mut self.price_eur),
            Attribute::MaintenanceCost => Some(&mut self.maintenance_cost_eur),
            _ => None,
        }
    }

    fn text_slot(&mut self, attribute: Attribute) -> Option<&mut Option<String>> {
        match attribute {
            Attribute::DayNightOperation => Some(&mut self.day_night_operation),
            Attribute::RealTimeStreaming => Some(&mut self.real_time_streaming),
            Attribute::NightVision => Some(&mut self.night_vision),
            Attribute::IpRating => Some(&mut self.ip_rating),
            Attribute::TemperatureResistance => Some(&mut self.temperature_resistance),
            Attribute::HumidityResistance => Some(&mut self.humidity_resistance),
            _ => None,
        }
    }
}

/// Fixed fill value for a numeric column, if it has one. Other columns fall
/// back to their median.
fn numeric_fill(attribute: Attribute) -> Option<f64> {
    match attribute {
        // No reading means no thermal camera.
        Attribute::ThermalCameraResolution => Some(0.0),
        Attribute::PayloadCapacity => Some(0.1),
        _ => None,
    }
}

fn categorical_fill(attribute: Attribute) -> Option<&'static str> {
    match attribute {
        Attribute::DayNightOperation => Some("Day only"),
        Attribute::RealTimeStreaming | Attribute::NightVision => Some("No"),
        Attribute::IpRating => Some("Not rated"),
        Attribute::HumidityResistance => Some("5-95% RH"),
        _ => None,
    }
}

fn standardize_flag(value: &str) -> String {
    match title_case(value.trim()).as_str() {
        "True" => "Yes".to_string(),
        "False" => "No".to_string(),
        other => other.to_string(),
    }
}

/// A set of drone records together with the columns the source declared.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    drones: Vec<DroneRecord>,
    columns: BTreeSet<Attribute>,
}

impl Catalog {
    pub fn new(drones: Vec<DroneRecord>, columns: impl IntoIterator<Item = Attribute>) -> Self {
        Self {
            drones,
            columns: columns.into_iter().collect(),
        }
    }

    /// Reads a CSV catalog and normalizes it.
    #[tracing::instrument(skip(source), fields(source = %source.label()))]
    pub fn load(source: &DataSource) -> Result<Self, SelectionError> {
        let bytes = source.read_bytes()?;
        let catalog = Self::parse(&bytes)?.normalize();
        info!(drones = catalog.len(), columns = catalog.columns.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// Parses CSV bytes without imputation. Unparseable numeric cells become
    /// missing.
    pub fn parse(bytes: &[u8]) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(bytes);

        let columns: BTreeSet<Attribute> = rdr
            .headers()?
            .iter()
            .filter_map(Attribute::from_header)
            .collect();

        let mut drones = Vec::new();
        for result in rdr.deserialize() {
            let raw: RawDroneRow = result?;
            drones.push(DroneRecord::from_raw(raw));
        }

        Ok(Self { drones, columns })
    }

    /// Imputes missing values and standardizes categorical text.
    ///
    /// Numeric columns are filled first (fixed value or column median), then
    /// categorical defaults are applied, then the flag-like columns are
    /// trimmed and title-cased. Running it again changes nothing.
    pub fn normalize(mut self) -> Self {
        for attribute in Attribute::NUMERIC {
            if !self.columns.contains(&attribute) {
                continue;
            }
            let fill = numeric_fill(attribute).or_else(|| {
                let observed: Vec<f64> = self
                    .drones
                    .iter()
                    .filter_map(|d| d.numeric(attribute))
                    .collect();
                median(&observed)
            });
            let Some(fill) = fill else {
                debug!(column = %attribute, "Column has no observations, leaving undefined");
                continue;
            };
            let mut filled = 0usize;
            for drone in &mut self.drones {
                if let Some(slot) = drone.numeric_slot(attribute) {
                    if slot.is_none() {
                        *slot = Some(fill);
                        filled += 1;
                    }
                }
            }
            if filled > 0 {
                debug!(column = %attribute, filled, fill, "Imputed missing numeric values");
            }
        }

        for attribute in Attribute::CATEGORICAL {
            if !self.columns.contains(&attribute) {
                continue;
            }
            let Some(fill) = categorical_fill(attribute) else {
                continue;
            };
            for drone in &mut self.drones {
                if let Some(slot) = drone.text_slot(attribute) {
                    if slot.is_none() {
                        *slot = Some(fill.to_string());
                    }
                }
            }
        }

        for drone in &mut self.drones {
            for attribute in [Attribute::RealTimeStreaming, Attribute::NightVision] {
                if let Some(Some(value)) = drone.text_slot(attribute) {
                    *value = standardize_flag(value);
                }
            }
            if let Some(value) = drone.day_night_operation.as_mut() {
                *value = title_case(value.trim());
            }
        }

        self
    }

    pub fn drones(&self) -> &[DroneRecord] {
        &self.drones
    }

    pub fn columns(&self) -> &BTreeSet<Attribute> {
        &self.columns
    }

    pub fn has_column(&self, attribute: Attribute) -> bool {
        self.columns.contains(&attribute)
    }

    pub fn len(&self) -> usize {
        self.drones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drones.is_empty()
    }

    /// Keeps the drones matching `keep`, preserving order and columns.
    pub fn retain(mut self, keep: impl FnMut(&DroneRecord) -> bool) -> Self {
        self.drones.retain(keep);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Drone Name,Category,Flight Radius (km),Wind Resistance (m/s),Battery Life (minutes),Payload Capacity (kg),Camera Resolution (MP),Thermal Camera Resolution (MP),Price (EUR),Day/Night Operation,Real-Time Data Streaming,Infrared/Night Vision Capability,IP Rating,Humidity Resistance";

    fn catalog(rows: &[&str]) -> Catalog {
        let csv = format!("{HEADER}\n{}\n", rows.join("\n"));
        Catalog::parse(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_attribute_header_lookup() {
        for attribute in Attribute::NUMERIC.into_iter().chain(Attribute::CATEGORICAL) {
            assert_eq!(Attribute::from_header(attribute.header()), Some(attribute));
        }
        assert_eq!(Attribute::from_header("Battery Life"), None);
    }

    #[test]
    fn test_parse_coerces_unparseable_to_missing() {
        let cat = catalog(&["Alpha,Quad,abc,12,30,1,20,,5000,Day,yes,no,IP43,"]);
        let drone = &cat.drones()[0];
        assert_eq!(drone.flight_radius_km, None);
        assert_eq!(drone.wind_resistance_m_s, Some(12.0));
        assert_eq!(drone.thermal_camera_resolution_mp, None);
    }

    #[test]
    fn test_normalize_fixed_fills() {
        let cat = catalog(&[
            "Alpha,Quad,5,12,30,,20,,5000,,,,,",
            "Beta,Quad,6,14,40,2,24,0.3,6000,,,,,",
        ])
        .normalize();
        let alpha = &cat.drones()[0];
        assert_eq!(alpha.thermal_camera_resolution_mp, Some(0.0));
        assert_eq!(alpha.payload_capacity_kg, Some(0.1));
    }

    #[test]
    fn test_normalize_median_fill() {
        let cat = catalog(&[
            "Alpha,Quad,,12,30,1,,0,5000,,,,,",
            "Beta,Quad,4,14,40,1,20,0,6000,,,,,",
            "Gamma,Quad,8,16,50,1,30,0,7000,,,,,",
        ])
        .normalize();
        let alpha = &cat.drones()[0];
        assert_eq!(alpha.flight_radius_km, Some(6.0));
        assert_eq!(alpha.camera_resolution_mp, Some(25.0));
    }

    #[test]
    fn test_normalize_categorical_defaults_and_flags() {
        let cat = catalog(&[
            "Alpha,Quad,5,12,30,1,20,0,5000,,,,,",
            "Beta,Quad,5,12,30,1,20,0,5000, day and night capable , true ,FALSE,IP54,10-90% RH",
        ])
        .normalize();
        let alpha = &cat.drones()[0];
        assert_eq!(alpha.day_night_operation.as_deref(), Some("Day Only"));
        assert_eq!(alpha.real_time_streaming.as_deref(), Some("No"));
        assert_eq!(alpha.night_vision.as_deref(), Some("No"));
        assert_eq!(alpha.ip_rating.as_deref(), Some("Not rated"));
        assert_eq!(alpha.humidity_resistance.as_deref(), Some("5-95% RH"));

        let beta = &cat.drones()[1];
        assert_eq!(beta.day_night_operation.as_deref(), Some("Day And Night Capable"));
        assert_eq!(beta.real_time_streaming.as_deref(), Some("Yes"));
        assert_eq!(beta.night_vision.as_deref(), Some("No"));
        assert_eq!(beta.ip_rating.as_deref(), Some("IP54"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = catalog(&[
            "Alpha,Quad,,12,30,,20,,5000,,YES,,,",
            "Beta,Quad,4,,40,2,,0.2,,night capable,No,True,IP43,",
        ])
        .normalize();
        let twice = once.clone().normalize();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_absent_column_is_not_imputed() {
        let csv = "Drone Name,Category,Price (EUR)\nAlpha,Quad,\nBeta,Quad,1000\n";
        let cat = Catalog::parse(csv.as_bytes()).unwrap().normalize();
        assert!(!cat.has_column(Attribute::ThermalCameraResolution));
        assert_eq!(cat.drones()[0].thermal_camera_resolution_mp, None);
        assert_eq!(cat.drones()[0].price_eur, Some(1000.0));
        assert_eq!(cat.drones()[0].ip_rating, None);
    }

    #[test]
    fn test_missing_name_column_is_an_error() {
        let csv = "Category,Price (EUR)\nQuad,1000\n";
        assert!(Catalog::parse(csv.as_bytes()).is_err());
    }
}
