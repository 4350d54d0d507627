use serde::Serialize;
use tracing::debug;

use crate::catalog::{Catalog, DroneRecord};

/// Spending limits for a selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostLimits {
    pub budget: Option<f64>,
    pub maintenance_ceiling: Option<f64>,
}

impl CostLimits {
    pub fn is_unbounded(&self) -> bool {
        self.budget.is_none() && self.maintenance_ceiling.is_none()
    }

    /// The same limits with the budget term removed.
    pub fn without_budget(&self) -> Self {
        Self {
            budget: None,
            ..*self
        }
    }
}

/// A drone that survived the cost stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub drone: DroneRecord,
    /// Capability per unit of total cost; only set once a cost limit was applied.
    pub cost_effectiveness: Option<f64>,
}

impl Candidate {
    pub fn new(drone: DroneRecord) -> Self {
        Self {
            drone,
            cost_effectiveness: None,
        }
    }
}

/// `(battery × radius × camera) / (price + maintenance)`, when all inputs are
/// known and the result is finite.
pub fn cost_effectiveness(drone: &DroneRecord) -> Option<f64> {
    let capability =
        drone.battery_life_min? * drone.flight_radius_km? * drone.camera_resolution_mp?;
    let total_cost = drone.price_eur? + drone.maintenance_cost_eur?;
    let score = capability / total_cost;
    score.is_finite().then_some(score)
}

fn within(value: Option<f64>, limit: Option<f64>) -> bool {
    match limit {
        Some(limit) => value.is_some_and(|v| v <= limit),
        None => true,
    }
}

/// Keeps drones within budget and maintenance ceiling and scores their cost
/// effectiveness. With no limits at all the catalog passes through unscored.
#[tracing::instrument(skip(catalog), fields(before = catalog.len()))]
pub fn filter_by_cost(catalog: &Catalog, limits: &CostLimits) -> Vec<Candidate> {
    if limits.is_unbounded() {
        return catalog.drones().iter().cloned().map(Candidate::new).collect();
    }

    let candidates: Vec<Candidate> = catalog
        .drones()
        .iter()
        .filter(|d| within(d.price_eur, limits.budget))
        .filter(|d| within(d.maintenance_cost_eur, limits.maintenance_ceiling))
        .map(|d| Candidate {
            cost_effectiveness: cost_effectiveness(d),
            drone: d.clone(),
        })
        .collect();

    debug!(after = candidates.len(), "Cost filter applied");
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Attribute;

    fn drone(name: &str, price: f64, maintenance: f64) -> DroneRecord {
        DroneRecord {
            price_eur: Some(price),
            maintenance_cost_eur: Some(maintenance),
            battery_life_min: Some(40.0),
            flight_radius_km: Some(5.0),
            camera_resolution_mp: Some(20.0),
            ..DroneRecord::named(name, "Quad")
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                drone("cheap", 10_000.0, 500.0),
                drone("mid", 40_000.0, 1_500.0),
                drone("dear", 90_000.0, 900.0),
            ],
            [Attribute::Price, Attribute::MaintenanceCost],
        )
    }

    fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.drone.name.as_str()).collect()
    }

    #[test]
    fn test_budget_and_ceiling() {
        let limits = CostLimits {
            budget: Some(60_000.0),
            maintenance_ceiling: Some(1_000.0),
        };
        let out = filter_by_cost(&catalog(), &limits);
        assert_eq!(names(&out), vec!["cheap"]);
        for c in &out {
            assert!(c.drone.price_eur.unwrap() <= 60_000.0);
            assert!(c.drone.maintenance_cost_eur.unwrap() <= 1_000.0);
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let limits = CostLimits {
            budget: Some(40_000.0),
            maintenance_ceiling: Some(1_500.0),
        };
        assert_eq!(names(&filter_by_cost(&catalog(), &limits)), vec!["cheap", "mid"]);
    }

    #[test]
    fn test_unbounded_passes_through_without_scores() {
        let out = filter_by_cost(&catalog(), &CostLimits::default());
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|c| c.cost_effectiveness.is_none()));
    }

    #[test]
    fn test_cost_effectiveness_attached() {
        let limits = CostLimits {
            budget: Some(100_000.0),
            maintenance_ceiling: None,
        };
        let out = filter_by_cost(&catalog(), &limits);
        let cheap = out[0].cost_effectiveness.unwrap();
        assert!((cheap - 4_000.0 / 10_500.0).abs() < 1e-12);
    }

    #[test]
    fn test_cost_effectiveness_zero_cost_is_unset() {
        let free = drone("free", 0.0, 0.0);
        assert_eq!(cost_effectiveness(&free), None);
    }

    #[test]
    fn test_without_budget_keeps_ceiling() {
        let limits = CostLimits {
            budget: Some(1.0),
            maintenance_ceiling: Some(2.0),
        };
        assert_eq!(
            limits.without_budget(),
            CostLimits {
                budget: None,
                maintenance_ceiling: Some(2.0)
            }
        );
    }
}
