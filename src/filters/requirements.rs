use tracing::debug;

use crate::catalog::{Attribute, Catalog, DroneRecord};
use crate::purpose::{AggregatedRequirement, Requirement};

fn satisfies(drone: &DroneRecord, attribute: Attribute, requirement: &Requirement) -> bool {
    match requirement {
        Requirement::Minimum(min) => drone.numeric(attribute).is_some_and(|v| v >= *min),
        Requirement::Flag(expected) => drone.text(attribute) == Some(expected.as_str()),
        Requirement::Capability(_) => drone
            .text(attribute)
            .is_some_and(|t| t.to_lowercase().contains("capable")),
        Requirement::Descriptive(_) => true,
    }
}

/// Keeps drones that meet every aggregated requirement whose column exists
/// in the catalog.
#[tracing::instrument(skip_all, fields(before = catalog.len()))]
pub fn filter_by_requirements(catalog: Catalog, requirements: &AggregatedRequirement) -> Catalog {
    let mut filtered = catalog;
    for (attribute, requirement) in requirements.iter() {
        if !filtered.has_column(attribute) {
            debug!(%attribute, "Requirement skipped, column absent");
            continue;
        }
        filtered = filtered.retain(|drone| satisfies(drone, attribute, requirement));
        debug!(%attribute, %requirement, remaining = filtered.len(), "Requirement applied");
    }
    filtered
}
