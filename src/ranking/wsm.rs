//! Weighted-sum ranking of filtered candidates.

use serde::Serialize;
use tracing::debug;

use crate::catalog::{Attribute, DroneRecord};
use crate::filters::Candidate;
use crate::ranking::weights::WeightVector;
use crate::utility::{min_max, rescale};

/// Share of the normalized cost effectiveness added on top of the weighted sum.
pub const COST_EFFECTIVENESS_BONUS: f64 = 0.1;

/// Score given to every candidate when no criterion can tell them apart.
pub const UNIFORM_SCORE: f64 = 1.0;

/// A candidate with its final score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDrone {
    #[serde(flatten)]
    pub drone: DroneRecord,
    #[serde(rename = "Cost Effectiveness")]
    pub cost_effectiveness: Option<f64>,
    #[serde(rename = "WSM Score")]
    pub score: f64,
}

/// Adds `weight × normalized(column)` to each score. Returns `false` without
/// touching the scores when the column is constant or entirely undefined.
fn accumulate(scores: &mut [f64], column: &[Option<f64>], weight: f64) -> bool {
    let Some((lo, hi)) = min_max(column.iter().copied()) else {
        return false;
    };
    if hi <= lo {
        return false;
    }
    for (score, value) in scores.iter_mut().zip(column) {
        if let Some(v) = value {
            *score += rescale(*v, lo, hi) * weight;
        }
    }
    true
}

/// Scores candidates by the weighted sum of their min–max normalized
/// criteria, plus a small cost-effectiveness bonus, and sorts them best
/// first. Equal scores keep their input order.
///
/// Criteria that do not name a numeric catalog column, carry no positive
/// weight, or cannot discriminate are ignored. If none remain, every
/// candidate scores [`UNIFORM_SCORE`].
#[tracing::instrument(skip_all, fields(candidates = candidates.len(), criteria = weights.len()))]
pub fn rank(candidates: Vec<Candidate>, weights: &WeightVector) -> Vec<RankedDrone> {
    let mut scores = vec![0.0_f64; candidates.len()];
    let mut scored = 0usize;

    for (criterion, weight) in weights.iter() {
        if !(weight > 0.0) {
            continue;
        }
        let Some(attribute) = Attribute::from_header(criterion).filter(|a| a.is_numeric()) else {
            debug!(criterion, "Criterion is not a numeric column, skipped");
            continue;
        };
        let column: Vec<Option<f64>> = candidates
            .iter()
            .map(|c| c.drone.numeric(attribute))
            .collect();
        if accumulate(&mut scores, &column, weight) {
            scored += 1;
        } else {
            debug!(criterion, "Criterion cannot discriminate, skipped");
        }
    }

    if scored > 0 {
        let bonus: Vec<Option<f64>> = candidates.iter().map(|c| c.cost_effectiveness).collect();
        if accumulate(&mut scores, &bonus, COST_EFFECTIVENESS_BONUS) {
            debug!("Cost effectiveness bonus applied");
        }
    } else {
        scores.fill(UNIFORM_SCORE);
    }

    let mut ranked: Vec<RankedDrone> = candidates
        .into_iter()
        .zip(scores)
        .map(|(candidate, score)| RankedDrone {
            drone: candidate.drone,
            cost_effectiveness: candidate.cost_effectiveness,
            score,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    debug!(scored_criteria = scored, "Ranking complete");
    ranked
}
