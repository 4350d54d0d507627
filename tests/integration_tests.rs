use std::io::Write;

use drone_selector::catalog::{Attribute, Catalog};
use drone_selector::filters::{
    CostLimits, filter_by_cost, filter_by_environment, filter_by_requirements,
};
use drone_selector::purpose::{PurposeCatalog, Requirement};
use drone_selector::ranking::derive_weights;
use drone_selector::site::SiteConstraints;
use drone_selector::{DataSource, EmptyReason, SelectionOutcome, SelectionRequest, select};
use flate2::Compression;
use flate2::write::GzEncoder;

const DRONES: &[u8] = include_bytes!("fixtures/drones.csv");
const PORTS: &[u8] = include_bytes!("fixtures/ports.csv");

fn request(site: &str) -> SelectionRequest {
    SelectionRequest {
        catalog: DataSource::inline("drones.csv", DRONES),
        sites: Some(DataSource::inline("ports.csv", PORTS)),
        site_name: site.to_string(),
        purposes: vec![],
        priorities: vec![
            (Attribute::BatteryLife.header().to_string(), 4.0),
            (Attribute::WindResistance.header().to_string(), 5.0),
            (Attribute::CameraResolution.header().to_string(), 3.0),
            (Attribute::Price.header().to_string(), 2.0),
        ],
        limits: CostLimits::default(),
    }
}

fn port_security_request() -> SelectionRequest {
    SelectionRequest {
        purposes: vec!["Port Security".to_string()],
        limits: CostLimits {
            budget: Some(60_000.0),
            maintenance_ceiling: Some(1_500.0),
        },
        ..request("Port of Hamburg")
    }
}

#[test]
fn test_port_security_at_unknown_site() {
    let selection = select(&port_security_request(), &PurposeCatalog::builtin());

    assert_eq!(selection.constraints, SiteConstraints::default());
    assert_eq!(selection.summary(), "Filtered 10 drones down to 3 suitable options");

    let names: Vec<&str> = selection.ranked().iter().map(|r| r.drone.name.as_str()).collect();
    assert_eq!(names, vec!["Harbor Hawk", "Sentinel X8", "Dock Scout"]);
    assert!((selection.ranked()[0].score - 1.1).abs() < 1e-9);
    assert!((selection.weights.total() - 1.0).abs() < 1e-9);
}

#[test]
fn test_ranking_is_sorted_and_deterministic() {
    let purposes = PurposeCatalog::builtin();
    let first = select(&port_security_request(), &purposes);
    let second = select(&port_security_request(), &purposes);

    assert_eq!(first.ranked(), second.ranked());
    assert!(first.ranked().windows(2).all(|p| p[0].score >= p[1].score));
}

#[test]
fn test_budget_below_every_price() {
    let mut req = port_security_request();
    req.limits.budget = Some(1_000.0);
    let selection = select(&req, &PurposeCatalog::builtin());

    assert!(matches!(
        selection.outcome,
        SelectionOutcome::Empty(EmptyReason::NoBudgetMatch)
    ));
    assert_eq!(selection.summary(), "No drones meet the budget constraints");
    assert!(selection.ranked().is_empty());
}

#[test]
fn test_overlapping_purposes_keep_higher_threshold() {
    let purposes = PurposeCatalog::builtin();
    let aggregated = purposes.aggregate(&["Port Security", "Reconnaissance"]);
    assert_eq!(
        aggregated.get(Attribute::CameraResolution),
        Some(&Requirement::Minimum(20.0))
    );
    assert_eq!(
        aggregated.get(Attribute::WindResistance),
        Some(&Requirement::Minimum(12.0))
    );

    let mut req = port_security_request();
    req.purposes.push("Reconnaissance".to_string());
    let selection = select(&req, &purposes);
    let names: Vec<&str> = selection.ranked().iter().map(|r| r.drone.name.as_str()).collect();
    assert_eq!(names, vec!["Harbor Hawk"]);
}

#[test]
fn test_single_priority_gets_full_weight() {
    let weights = derive_weights(&[("X".to_string(), 3.0)]);
    assert_eq!(weights.get("X"), Some(1.0));
}

#[test]
fn test_matched_site_bounds_wind_resistance() {
    let selection = select(&request("rotterdam"), &PurposeCatalog::builtin());

    assert_eq!(selection.constraints.maximum_wind_speed_m_s, 20.0);
    assert_eq!(selection.constraints.coverage_area_sq_km, 100.0);

    let mut names: Vec<&str> = selection.ranked().iter().map(|r| r.drone.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Cargo Lifter", "Harbor Hawk", "Storm Rider"]);
    for ranked in selection.ranked() {
        assert!(ranked.drone.wind_resistance_m_s.unwrap() >= 0.8 * 20.0);
        assert!(ranked.cost_effectiveness.is_none());
    }
}

#[test]
fn test_cost_limits_are_upper_bounds() {
    let mut req = request("");
    req.limits = CostLimits {
        budget: Some(50_000.0),
        maintenance_ceiling: Some(1_000.0),
    };
    let selection = select(&req, &PurposeCatalog::builtin());

    assert!(!selection.ranked().is_empty());
    for ranked in selection.ranked() {
        assert!(ranked.drone.price_eur.unwrap() <= 50_000.0);
        assert!(ranked.drone.maintenance_cost_eur.unwrap() <= 1_000.0);
        assert!(ranked.cost_effectiveness.is_some());
    }
}

#[test]
fn test_fixture_normalization() {
    let once = Catalog::parse(DRONES).unwrap().normalize();
    let twice = once.clone().normalize();
    assert_eq!(once, twice);

    let find = |name: &str| once.drones().iter().find(|d| d.name == name).unwrap();
    assert_eq!(find("Dock Scout").thermal_camera_resolution_mp, Some(0.0));
    assert_eq!(find("Harbor Patrol Lite").payload_capacity_kg, Some(0.1));
    assert_eq!(find("Breeze Mini").max_daily_flights, Some(12.0));
    assert_eq!(find("Harbor Hawk").night_vision.as_deref(), Some("Yes"));
    assert_eq!(find("Cargo Lifter").real_time_streaming.as_deref(), Some("No"));
    assert_eq!(find("Dock Scout").humidity_resistance.as_deref(), Some("5-95% RH"));
}

#[test]
fn test_normalize_and_filter_twice_changes_nothing() {
    let site = SiteConstraints::default();
    let requirements = PurposeCatalog::builtin().aggregate(&["Port Security"]);
    let limits = CostLimits {
        budget: Some(60_000.0),
        maintenance_ceiling: Some(1_500.0),
    };

    let pass = |catalog: Catalog| {
        let catalog = filter_by_environment(catalog.normalize(), &site);
        let catalog = filter_by_requirements(catalog, &requirements);
        let candidates = filter_by_cost(&catalog, &limits);
        let drones = candidates.iter().map(|c| c.drone.clone()).collect();
        (Catalog::new(drones, catalog.columns().iter().copied()), candidates)
    };

    let (once, first) = pass(Catalog::parse(DRONES).unwrap());
    let (twice, second) = pass(once.clone());

    assert_eq!(once.len(), 3);
    assert_eq!(once, twice);
    assert_eq!(first, second);
}

#[test]
fn test_gzip_catalog_matches_plain() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(DRONES).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut req = port_security_request();
    req.catalog = DataSource::inline("drones.csv.gz", compressed);
    let purposes = PurposeCatalog::builtin();

    assert_eq!(
        select(&req, &purposes).ranked(),
        select(&port_security_request(), &purposes).ranked()
    );
}
