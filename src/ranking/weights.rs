//! Priority weights from relative importance scores.
//!
//! Scores are compared pairwise: `M[i][j] = v_i / v_j`, `M[j][i] = 1 / M[i][j]`.
//! Each weight is the geometric mean of its row of `M`, normalized so the
//! weights sum to 1.

use serde::Serialize;
use tracing::warn;

/// Criterion name → relative importance, in input order.
pub type PriorityInput = Vec<(String, f64)>;

/// Criterion name → weight, in input order. Weights sum to 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeightVector(Vec<(String, f64)>);

impl WeightVector {
    pub fn get(&self, criterion: &str) -> Option<f64> {
        self.0.iter().find(|(c, _)| c == criterion).map(|(_, w)| *w)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(c, w)| (c.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.0.iter().map(|(_, w)| w).sum()
    }
}

fn geometric_mean_weights(scores: &[f64]) -> Option<Vec<f64>> {
    let n = scores.len();
    let mut matrix = vec![vec![1.0_f64; n]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let ratio = if scores[i] == scores[j] {
                1.0
            } else {
                scores[i] / scores[j]
            };
            matrix[i][j] = ratio;
            matrix[j][i] = 1.0 / ratio;
        }
    }

    let exponent = 1.0 / n as f64;
    let means: Vec<f64> = matrix
        .iter()
        .map(|row| row.iter().product::<f64>().powf(exponent))
        .collect();
    let total: f64 = means.iter().sum();

    if !total.is_finite() || total <= 0.0 || means.iter().any(|m| !m.is_finite() || *m < 0.0) {
        return None;
    }
    Some(means.into_iter().map(|m| m / total).collect())
}

fn proportional_weights(scores: &[f64]) -> Option<Vec<f64>> {
    let total: f64 = scores.iter().sum();
    if !total.is_finite() || total <= 0.0 || scores.iter().any(|s| *s < 0.0) {
        return None;
    }
    Some(scores.iter().map(|s| s / total).collect())
}

/// Derives a [`WeightVector`] from relative importance scores.
///
/// A single criterion always gets weight 1. If the pairwise synthesis breaks
/// down numerically (zero, negative or non-finite scores), the raw scores are
/// normalized directly; if even that is impossible every criterion gets the
/// same weight.
pub fn derive_weights(priorities: &[(String, f64)]) -> WeightVector {
    let n = priorities.len();
    if n == 0 {
        return WeightVector::default();
    }
    if n == 1 {
        return WeightVector(vec![(priorities[0].0.clone(), 1.0)]);
    }

    let scores: Vec<f64> = priorities.iter().map(|(_, v)| *v).collect();
    let weights = geometric_mean_weights(&scores)
        .or_else(|| {
            warn!(?scores, "Pairwise synthesis failed, normalizing raw scores");
            proportional_weights(&scores)
        })
        .unwrap_or_else(|| {
            warn!(?scores, "Scores cannot be normalized, using uniform weights");
            vec![1.0 / n as f64; n]
        });

    WeightVector(
        priorities
            .iter()
            .zip(weights)
            .map(|((criterion, _), w)| (criterion.clone(), w))
            .collect(),
    )
}
