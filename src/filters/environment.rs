use tracing::debug;

use crate::catalog::{Attribute, Catalog, DroneRecord};
use crate::error::ParseError;
use crate::parser::parse_resistance_range;
use crate::site::SiteConstraints;

/// Drones must withstand 80% of the site's maximum wind speed.
pub const WIND_SAFETY_FACTOR: f64 = 0.8;

/// Flight radius may fall 30% short of the radius implied by the coverage area.
pub const RADIUS_RELAXATION: f64 = 0.7;

/// Ordinal level of an IP rating.
///
/// | Rating    | Level |
/// |-----------|-------|
/// | Not rated | 0     |
/// | IP20      | 20    |
/// | IP43      | 43    |
/// | IP44      | 44    |
/// | IP45      | 45    |
/// | IP53      | 53    |
/// | IP54      | 54    |
/// | IP65      | 65    |
/// | IP67      | 67    |
pub fn ip_rating_level(rating: &str) -> Result<u8, ParseError> {
    match rating.trim() {
        "Not rated" => Ok(0),
        "IP20" => Ok(20),
        "IP43" => Ok(43),
        "IP44" => Ok(44),
        "IP45" => Ok(45),
        "IP53" => Ok(53),
        "IP54" => Ok(54),
        "IP65" => Ok(65),
        "IP67" => Ok(67),
        other => Err(ParseError::UnknownRating(other.to_string())),
    }
}

/// Radius (km) a drone needs to cover a circular area of `area_sq_km`,
/// after relaxation.
pub fn required_radius_km(area_sq_km: f64) -> f64 {
    (area_sq_km / std::f64::consts::PI).sqrt() * RADIUS_RELAXATION
}

fn withstands_wind(drone: &DroneRecord, site: &SiteConstraints) -> bool {
    drone
        .wind_resistance_m_s
        .is_some_and(|w| w >= site.maximum_wind_speed_m_s * WIND_SAFETY_FACTOR)
}

fn covers_temperature(drone: &DroneRecord, site: &SiteConstraints) -> bool {
    let Some(raw) = drone.temperature_resistance.as_deref() else {
        return false;
    };
    match parse_resistance_range(raw) {
        Ok((lo, hi)) => lo <= site.temperature_min_c && hi >= site.temperature_max_c,
        Err(e) => {
            debug!(drone = %drone.name, error = %e, "Temperature resistance unusable, excluded");
            false
        }
    }
}

fn reaches_coverage(drone: &DroneRecord, required_km: f64) -> bool {
    drone.flight_radius_km.is_some_and(|r| r >= required_km)
}

fn meets_durability(drone: &DroneRecord, required_level: u8) -> bool {
    let level = drone
        .ip_rating
        .as_deref()
        .map_or(Ok(0), ip_rating_level)
        .unwrap_or(0);
    level >= required_level
}

/// Keeps drones that can operate within the site's wind, temperature,
/// coverage and durability limits.
///
/// The temperature and IP checks only apply when the catalog carries those
/// columns.
#[tracing::instrument(skip_all, fields(before = catalog.len()))]
pub fn filter_by_environment(catalog: Catalog, site: &SiteConstraints) -> Catalog {
    let check_temperature = catalog.has_column(Attribute::TemperatureResistance);
    let check_ip = catalog.has_column(Attribute::IpRating);
    let required_km = required_radius_km(site.coverage_area_sq_km);
    let required_level = ip_rating_level(&site.environmental_durability).unwrap_or(0);

    let filtered = catalog.retain(|drone| {
        withstands_wind(drone, site)
            && (!check_temperature || covers_temperature(drone, site))
            && reaches_coverage(drone, required_km)
            && (!check_ip || meets_durability(drone, required_level))
    });

    debug!(
        after = filtered.len(),
        min_wind = site.maximum_wind_speed_m_s * WIND_SAFETY_FACTOR,
        min_radius_km = required_km,
        required_level,
        "Environmental filter applied"
    );
    filtered
}
