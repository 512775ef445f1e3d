//! Cluster-based generalization for k-anonymity
//!
//! Quasi-identifiers are encoded into a numeric feature matrix (categorical
//! values as ordinal codes, missing numerics imputed with the column mean),
//! standardized, and clustered with Lloyd's k-means into ~N/k groups. Members
//! of clusters smaller than k are collapsed onto a cluster representative:
//! the cluster mean for numeric columns, the wildcard otherwise. Cluster
//! initialization draws from the pipeline random source, so results are
//! reproducible for a fixed seed.

use std::collections::{BTreeMap, BTreeSet};

use crate::anonymize::WILDCARD;
use crate::dataset::{ColumnType, Dataset, Value, ValueKey};
use crate::rng::PipelineRng;
use crate::Error;

const MAX_ITERATIONS: usize = 100;

pub(super) fn cluster_generalize(
    dataset: &Dataset,
    k: usize,
    quasi_identifiers: &[String],
    rng: &mut PipelineRng,
) -> Result<Dataset, Error> {
    let n = dataset.len();
    if n == 0 {
        return Ok(dataset.clone());
    }
    let mut qi_cols = Vec::with_capacity(quasi_identifiers.len());
    for name in quasi_identifiers {
        qi_cols.push(dataset.require_column(name)?);
    }

    let features = encode_features(dataset, &qi_cols);
    let cluster_count = (n / k).max(1);
    let assignment = kmeans(&features, cluster_count, rng);

    let mut members_by_cluster: Vec<Vec<usize>> = vec![Vec::new(); cluster_count];
    for (row, &cluster) in assignment.iter().enumerate() {
        members_by_cluster[cluster].push(row);
    }

    let mut result = dataset.clone();
    for members in members_by_cluster.iter().filter(|m| !m.is_empty() && m.len() < k) {
        for &col in &qi_cols {
            let replacement = match dataset.column_type(col) {
                ColumnType::Numeric => {
                    let values: Vec<f64> = members
                        .iter()
                        .filter_map(|&row| dataset.value(row, col).as_number())
                        .collect();
                    if values.is_empty() {
                        Value::Text(WILDCARD.to_string())
                    } else {
                        Value::Number(values.iter().sum::<f64>() / values.len() as f64)
                    }
                }
                ColumnType::Categorical | ColumnType::Temporal => {
                    Value::Text(WILDCARD.to_string())
                }
            };
            for &row in members {
                result.set_value(row, col, replacement.clone());
            }
        }
    }
    result.reinfer_types();
    Ok(result)
}

/// Encode quasi-identifier columns into standardized numeric features.
fn encode_features(dataset: &Dataset, qi_cols: &[usize]) -> Vec<Vec<f64>> {
    let n = dataset.len();
    let mut features = vec![vec![0.0; qi_cols.len()]; n];

    for (dim, &col) in qi_cols.iter().enumerate() {
        let raw: Vec<f64> = match dataset.column_type(col) {
            ColumnType::Numeric => {
                let present = dataset.numeric_values(col);
                let mean = if present.is_empty() {
                    0.0
                } else {
                    present.iter().sum::<f64>() / present.len() as f64
                };
                (0..n)
                    .map(|row| dataset.value(row, col).as_number().unwrap_or(mean))
                    .collect()
            }
            ColumnType::Categorical | ColumnType::Temporal => {
                // Ordinal codes over the sorted distinct keys; null is a
                // code of its own.
                let distinct: BTreeSet<ValueKey> =
                    (0..n).map(|row| dataset.value(row, col).key()).collect();
                let codes: BTreeMap<ValueKey, usize> = distinct
                    .into_iter()
                    .enumerate()
                    .map(|(code, key)| (key, code))
                    .collect();
                (0..n)
                    .map(|row| codes[&dataset.value(row, col).key()] as f64)
                    .collect()
            }
        };

        let mean = raw.iter().sum::<f64>() / n as f64;
        let var = raw.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        let std = var.sqrt();
        for (row, &v) in raw.iter().enumerate() {
            features[row][dim] = if std > 0.0 { (v - mean) / std } else { 0.0 };
        }
    }
    features
}

/// Lloyd's k-means with rng-sampled initial centers. Returns the cluster
/// index of each point.
fn kmeans(features: &[Vec<f64>], cluster_count: usize, rng: &mut PipelineRng) -> Vec<usize> {
    let n = features.len();
    let dims = features[0].len();
    let mut centers: Vec<Vec<f64>> = rng
        .sample_indices(n, cluster_count)
        .into_iter()
        .map(|i| features[i].clone())
        .collect();

    let mut assignment = vec![0usize; n];
    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (row, point) in features.iter().enumerate() {
            let nearest = nearest_center(point, &centers);
            if assignment[row] != nearest {
                assignment[row] = nearest;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![vec![0.0; dims]; centers.len()];
        let mut counts = vec![0usize; centers.len()];
        for (row, point) in features.iter().enumerate() {
            let c = assignment[row];
            counts[c] += 1;
            for (dim, v) in point.iter().enumerate() {
                sums[c][dim] += v;
            }
        }
        for (c, center) in centers.iter_mut().enumerate() {
            // Empty clusters keep their previous center.
            if counts[c] > 0 {
                for (dim, s) in sums[c].iter().enumerate() {
                    center[dim] = s / counts[c] as f64;
                }
            }
        }
    }
    assignment
}

fn nearest_center(point: &[f64], centers: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (c, center) in centers.iter().enumerate() {
        let dist: f64 = point
            .iter()
            .zip(center)
            .map(|(p, q)| (p - q).powi(2))
            .sum();
        if dist < best_dist {
            best_dist = dist;
            best = c;
        }
    }
    best
}
