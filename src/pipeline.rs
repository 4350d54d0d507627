//! End-to-end drone selection.
//!
//! A run moves through [`Stage`]s in a fixed order. Any filter stage that
//! leaves nothing ends the run early with an [`EmptyReason`]; a catalog that
//! cannot be loaded ends it with a [`SelectionError`]. Nothing is kept between
//! runs.

use std::fmt;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::catalog::Catalog;
use crate::error::SelectionError;
use crate::filters::{CostLimits, filter_by_cost, filter_by_environment, filter_by_requirements};
use crate::purpose::PurposeCatalog;
use crate::ranking::{PriorityInput, RankedDrone, WeightVector, derive_weights, rank};
use crate::site::{SiteConstraints, SiteTable, extract_site_constraints};
use crate::source::DataSource;

/// Everything a selection run needs.
#[derive(Debug, Clone)]
pub struct SelectionRequest {
    pub catalog: DataSource,
    pub sites: Option<DataSource>,
    pub site_name: String,
    pub purposes: Vec<String>,
    pub priorities: PriorityInput,
    pub limits: CostLimits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    EnvironmentFilter,
    PurposeFilter,
    CostFilter,
    Ranking,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::EnvironmentFilter => "environment_filter",
            Stage::PurposeFilter => "purpose_filter",
            Stage::CostFilter => "cost_filter",
            Stage::Ranking => "ranking",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Why a run ended without candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmptyReason {
    NoEnvironmentMatch,
    NoPurposeMatch,
    /// Only the budget ruled out the remaining drones.
    NoBudgetMatch,
    /// The maintenance ceiling rules out everything even without a budget.
    NoOtherConstraintMatch,
    /// The cost stage emptied the set and no budget was given.
    NoConstraintMatch,
}

impl EmptyReason {
    pub fn message(self) -> &'static str {
        match self {
            EmptyReason::NoEnvironmentMatch => "No drones meet the port environmental requirements",
            EmptyReason::NoPurposeMatch => "No drones meet the selected purpose requirements",
            EmptyReason::NoBudgetMatch => "No drones meet the budget constraints",
            EmptyReason::NoOtherConstraintMatch => "No drones meet the other constraints",
            EmptyReason::NoConstraintMatch => "No drones meet the constraints",
        }
    }
}

#[derive(Debug)]
pub enum SelectionOutcome {
    Ranked {
        original_count: usize,
        drones: Vec<RankedDrone>,
    },
    Empty(EmptyReason),
    Failed(SelectionError),
}

/// Result of one run: the constraints and weights that were used, and the
/// outcome.
#[derive(Debug)]
pub struct Selection {
    pub constraints: SiteConstraints,
    pub weights: WeightVector,
    pub outcome: SelectionOutcome,
}

impl Selection {
    fn ended(constraints: SiteConstraints, outcome: SelectionOutcome) -> Self {
        Self {
            constraints,
            weights: WeightVector::default(),
            outcome,
        }
    }

    /// Ranked drones, best first. Empty unless the run succeeded.
    pub fn ranked(&self) -> &[RankedDrone] {
        match &self.outcome {
            SelectionOutcome::Ranked { drones, .. } => drones,
            _ => &[],
        }
    }

    pub fn summary(&self) -> String {
        match &self.outcome {
            SelectionOutcome::Ranked {
                original_count,
                drones,
            } => format!(
                "Filtered {original_count} drones down to {} suitable options",
                drones.len()
            ),
            SelectionOutcome::Empty(reason) => reason.message().to_string(),
            SelectionOutcome::Failed(SelectionError::EmptyCatalog) => {
                "No drone data available".to_string()
            }
            SelectionOutcome::Failed(e) => format!("Error in drone selection: {e}"),
        }
    }
}

fn load_sites(source: Option<&DataSource>) -> Option<SiteTable> {
    let source = source?;
    match SiteTable::load(source) {
        Ok(table) => Some(table),
        Err(e) => {
            warn!(source = %source.label(), error = %e, "Site data unavailable");
            None
        }
    }
}

fn run(request: &SelectionRequest, purposes: &PurposeCatalog) -> Result<Selection, SelectionError> {
    let catalog = Catalog::load(&request.catalog)?;
    if catalog.is_empty() {
        return Err(SelectionError::EmptyCatalog);
    }
    let original_count = catalog.len();
    info!(stage = %Stage::Load, drones = original_count, "Catalog ready");

    let sites = load_sites(request.sites.as_ref());
    let constraints = extract_site_constraints(sites.as_ref(), &request.site_name);

    let catalog = filter_by_environment(catalog, &constraints);
    info!(stage = %Stage::EnvironmentFilter, remaining = catalog.len(), "Stage complete");
    if catalog.is_empty() {
        return Ok(Selection::ended(
            constraints,
            SelectionOutcome::Empty(EmptyReason::NoEnvironmentMatch),
        ));
    }

    let catalog = if request.purposes.is_empty() {
        catalog
    } else {
        let requirements = purposes.aggregate(&request.purposes);
        let filtered = filter_by_requirements(catalog, &requirements);
        info!(stage = %Stage::PurposeFilter, remaining = filtered.len(), "Stage complete");
        filtered
    };
    if catalog.is_empty() {
        return Ok(Selection::ended(
            constraints,
            SelectionOutcome::Empty(EmptyReason::NoPurposeMatch),
        ));
    }

    let candidates = filter_by_cost(&catalog, &request.limits);
    info!(stage = %Stage::CostFilter, remaining = candidates.len(), "Stage complete");
    if candidates.is_empty() {
        let reason = if request.limits.budget.is_none() {
            EmptyReason::NoConstraintMatch
        } else if filter_by_cost(&catalog, &request.limits.without_budget()).is_empty() {
            EmptyReason::NoOtherConstraintMatch
        } else {
            EmptyReason::NoBudgetMatch
        };
        return Ok(Selection::ended(constraints, SelectionOutcome::Empty(reason)));
    }

    let weights = derive_weights(&request.priorities);
    let drones = rank(candidates, &weights);
    info!(stage = %Stage::Ranking, ranked = drones.len(), "Stage complete");

    Ok(Selection {
        constraints,
        weights,
        outcome: SelectionOutcome::Ranked {
            original_count,
            drones,
        },
    })
}

/// Runs the full selection for `request`.
///
/// Never fails: load errors are reported through
/// [`SelectionOutcome::Failed`] and empty stages through
/// [`SelectionOutcome::Empty`].
#[tracing::instrument(
    skip_all,
    fields(site = %request.site_name, purposes = ?request.purposes, catalog = %request.catalog.label())
)]
pub fn select(request: &SelectionRequest, purposes: &PurposeCatalog) -> Selection {
    let selection = run(request, purposes).unwrap_or_else(|e| {
        error!(error = %e, "Selection failed");
        Selection::ended(SiteConstraints::default(), SelectionOutcome::Failed(e))
    });
    info!(stage = %Stage::Done, summary = %selection.summary(), "Selection finished");
    selection
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Drone Name,Category,Flight Radius (km),Wind Resistance (m/s),Battery Life (minutes),Camera Resolution (MP),Price (EUR),Maintenance Cost (EUR),Real-Time Data Streaming,Infrared/Night Vision Capability,IP Rating,Temperature Resistance";

    fn request(rows: &[&str]) -> SelectionRequest {
        let csv = format!("{HEADER}\n{}\n", rows.join("\n"));
        SelectionRequest {
            catalog: DataSource::inline("test.csv", csv.into_bytes()),
            sites: None,
            site_name: "Port of Hamburg".to_string(),
            purposes: vec![],
            priorities: vec![("Battery Life (minutes)".to_string(), 3.0)],
            limits: CostLimits::default(),
        }
    }

    const GOOD: &str = "Good,Quad,5,15,45,20,20000,800,Yes,Yes,IP54,-20°C to 50°C";
    const BETTER: &str = "Better,Quad,6,16,55,24,30000,900,Yes,Yes,IP67,-20°C to 50°C";
    const WEAK: &str = "Weak,Quad,5,8,45,20,10000,300,Yes,Yes,IP54,-20°C to 50°C";

    #[test]
    fn test_ranked_summary() {
        let selection = select(&request(&[GOOD, BETTER, WEAK]), &PurposeCatalog::builtin());
        assert_eq!(selection.summary(), "Filtered 3 drones down to 2 suitable options");
        let names: Vec<_> = selection.ranked().iter().map(|r| r.drone.name.as_str()).collect();
        assert_eq!(names, vec!["Better", "Good"]);
        assert_eq!(selection.constraints, SiteConstraints::default());
    }

    #[test]
    fn test_environment_empty() {
        let selection = select(&request(&[WEAK]), &PurposeCatalog::builtin());
        assert!(matches!(
            selection.outcome,
            SelectionOutcome::Empty(EmptyReason::NoEnvironmentMatch)
        ));
        assert!(selection.ranked().is_empty());
    }

    #[test]
    fn test_purpose_empty() {
        let mut req = request(&[GOOD]);
        req.purposes = vec!["Cargo & Logistics Monitoring".to_string()];
        let selection = select(&req, &PurposeCatalog::builtin());
        assert_eq!(selection.summary(), "No drones meet the selected purpose requirements");
    }

    #[test]
    fn test_budget_vs_other_constraints() {
        let mut req = request(&[GOOD, BETTER]);
        req.limits = CostLimits {
            budget: Some(5_000.0),
            maintenance_ceiling: Some(1_000.0),
        };
        let selection = select(&req, &PurposeCatalog::builtin());
        assert_eq!(selection.summary(), "No drones meet the budget constraints");

        req.limits.maintenance_ceiling = Some(100.0);
        let selection = select(&req, &PurposeCatalog::builtin());
        assert_eq!(selection.summary(), "No drones meet the other constraints");

        req.limits.budget = None;
        let selection = select(&req, &PurposeCatalog::builtin());
        assert_eq!(selection.summary(), "No drones meet the constraints");
    }

    #[test]
    fn test_missing_catalog_fails_gracefully() {
        let mut req = request(&[GOOD]);
        req.catalog = DataSource::file("/no/such/catalog.csv");
        let selection = select(&req, &PurposeCatalog::builtin());
        assert!(matches!(
            selection.outcome,
            SelectionOutcome::Failed(SelectionError::SourceUnavailable(_))
        ));
        assert!(selection.summary().starts_with("Error in drone selection: "));
    }

    #[test]
    fn test_header_only_catalog_is_empty() {
        let mut req = request(&[]);
        req.catalog = DataSource::inline("empty.csv", format!("{HEADER}\n").into_bytes());
        let selection = select(&req, &PurposeCatalog::builtin());
        assert!(matches!(
            selection.outcome,
            SelectionOutcome::Failed(SelectionError::EmptyCatalog)
        ));
        assert_eq!(selection.summary(), "No drone data available");
    }

    #[test]
    fn test_unreadable_sites_fall_back_to_defaults() {
        let mut req = request(&[GOOD]);
        req.sites = Some(DataSource::file("/no/such/ports.csv"));
        req.site_name = "Rotterdam".to_string();
        let selection = select(&req, &PurposeCatalog::builtin());
        assert_eq!(selection.constraints, SiteConstraints::default());
        assert_eq!(selection.ranked().len(), 1);
    }
}
