//! Recoding generalization and record suppression
//!
//! Global recoding rewrites whole quasi-identifier columns: numeric columns
//! become quantile range labels, categorical values rarer than k become the
//! wildcard. Local recoding touches only the members of undersized classes.
//! Suppression always runs last for k-anonymity and is capped by the
//! configured limit; violations beyond the cap are left in place and counted.

use crate::anonymize::WILDCARD;
use crate::dataset::{ColumnType, Dataset, Value};
use crate::equivalence::partition;
use crate::Error;
use std::collections::{BTreeSet, HashMap};

/// Generalize every quasi-identifier column in one pass.
pub(super) fn global_recode(
    dataset: &Dataset,
    k: usize,
    quasi_identifiers: &[String],
) -> Result<Dataset, Error> {
    let mut result = dataset.clone();
    for name in quasi_identifiers {
        let col = dataset.require_column(name)?;
        match dataset.column_type(col) {
            ColumnType::Numeric => generalize_numeric_column(&mut result, col, k),
            ColumnType::Categorical | ColumnType::Temporal => {
                generalize_categorical_column(&mut result, col, k)
            }
        }
    }
    result.reinfer_types();
    Ok(result)
}

/// Bin a numeric column into ~N/k quantile ranges rendered as "[lo-hi]".
fn generalize_numeric_column(dataset: &mut Dataset, col: usize, k: usize) {
    let mut values = dataset.numeric_values(col);
    if values.is_empty() {
        return;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let bins = (dataset.len() / k).max(1);
    let mut edges: Vec<f64> = (0..=bins)
        .map(|j| quantile(&values, j as f64 / bins as f64))
        .collect();
    edges.dedup();

    let labels: Vec<String> = if edges.len() < 2 {
        vec![format!("[{:.2}-{:.2}]", edges[0], edges[0])]
    } else {
        edges
            .windows(2)
            .map(|w| format!("[{:.2}-{:.2}]", w[0], w[1]))
            .collect()
    };

    for row in 0..dataset.len() {
        let v = match dataset.value(row, col).as_number() {
            Some(v) => v,
            None => continue,
        };
        let bin = assign_bin(&edges, v, labels.len());
        dataset.set_value(row, col, Value::Text(labels[bin].clone()));
    }
}

/// Linear-interpolation quantile over an ascending slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

fn assign_bin(edges: &[f64], value: f64, bin_count: usize) -> usize {
    if bin_count <= 1 {
        return 0;
    }
    // First bin is closed on the left; the rest are (lo, hi].
    for bin in 0..bin_count {
        if value <= edges[bin + 1] {
            return bin;
        }
    }
    bin_count - 1
}

/// Replace categorical values occurring fewer than k times with the wildcard.
fn generalize_categorical_column(dataset: &mut Dataset, col: usize, k: usize) {
    let mut counts = HashMap::new();
    for row in 0..dataset.len() {
        let value = dataset.value(row, col);
        if !value.is_null() {
            *counts.entry(value.key()).or_insert(0usize) += 1;
        }
    }
    for row in 0..dataset.len() {
        let value = dataset.value(row, col);
        if value.is_null() {
            continue;
        }
        if counts[&value.key()] < k {
            dataset.set_value(row, col, Value::Text(WILDCARD.to_string()));
        }
    }
}

/// Generalize only the members of equivalence classes smaller than k.
/// Numeric cells become a ±10%-of-value range label, everything else the
/// wildcard; classes already at size k are untouched.
pub(super) fn local_recode(
    dataset: &Dataset,
    k: usize,
    quasi_identifiers: &[String],
) -> Result<Dataset, Error> {
    let mut qi_cols = Vec::with_capacity(quasi_identifiers.len());
    for name in quasi_identifiers {
        qi_cols.push(dataset.require_column(name)?);
    }

    let classes = partition(dataset, quasi_identifiers)?;
    let mut result = dataset.clone();
    for class in classes.iter().filter(|c| c.size() < k) {
        generalize_member_cells(dataset, &mut result, &class.members, &qi_cols);
    }
    result.reinfer_types();
    Ok(result)
}

/// Generalize the quasi-identifier cells of the given rows in place:
/// numeric cells become a ±10%-of-value range label (at least ±1), all
/// other cells the wildcard. Caller re-infers types afterwards.
fn generalize_member_cells(
    original: &Dataset,
    result: &mut Dataset,
    rows: &[usize],
    qi_cols: &[usize],
) {
    for &row in rows {
        for &col in qi_cols {
            let replacement = match original.column_type(col) {
                ColumnType::Numeric => match original.value(row, col).as_number() {
                    Some(v) => {
                        let half_range = (v.abs() * 0.1).max(1.0);
                        Value::Text(format!("[{:.2}-{:.2}]", v - half_range, v + half_range))
                    }
                    None => Value::Text(WILDCARD.to_string()),
                },
                ColumnType::Categorical | ColumnType::Temporal => {
                    Value::Text(WILDCARD.to_string())
                }
            };
            result.set_value(row, col, replacement);
        }
    }
}

pub(super) struct SuppressionResult {
    pub dataset: Dataset,
    pub suppressed_records: usize,
    pub residual_violating_classes: usize,
    pub residual_violating_records: usize,
}

/// Remove records still violating k-anonymity, up to
/// floor(suppression_limit × N) of them, smallest classes first.
pub(super) fn suppress(
    dataset: &Dataset,
    k: usize,
    quasi_identifiers: &[String],
    suppression_limit: f64,
) -> Result<SuppressionResult, Error> {
    let classes = partition(dataset, quasi_identifiers)?;

    // Classes are already sorted smallest-first, so this ordering removes
    // the highest-risk records before the cap is reached.
    let violating: Vec<usize> = classes
        .iter()
        .filter(|c| c.size() < k)
        .flat_map(|c| c.members.iter().copied())
        .collect();

    let cap = (dataset.len() as f64 * suppression_limit).floor() as usize;
    let to_remove: BTreeSet<usize> = if violating.len() <= cap {
        violating.iter().copied().collect()
    } else {
        violating.iter().copied().take(cap).collect()
    };

    let result = dataset.remove_rows(&to_remove);

    let residual = partition(&result, quasi_identifiers)?;
    let residual_violating_classes = residual.iter().filter(|c| c.size() < k).count();
    let residual_violating_records: usize = residual
        .iter()
        .filter(|c| c.size() < k)
        .map(|c| c.size())
        .sum();

    Ok(SuppressionResult {
        dataset: result,
        suppressed_records: to_remove.len(),
        residual_violating_classes,
        residual_violating_records,
    })
}
