//! Equivalence-class partitioning over quasi-identifier tuples
//!
//! For a fixed dataset and quasi-identifier set, the classes partition the
//! dataset exactly: every record belongs to one class and class sizes sum to
//! the record count. Classes are ordered smallest-first because the smallest
//! class carries the highest individual re-identification risk.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::dataset::{Dataset, ValueKey};
use crate::Error;

/// A set of record positions sharing one quasi-identifier value tuple.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EquivalenceClass {
    /// The shared quasi-identifier tuple, one key per QI column.
    pub key: Vec<ValueKey>,
    /// Row positions (into the partitioned dataset) of the members.
    pub members: Vec<usize>,
}

impl EquivalenceClass {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Group records by their full quasi-identifier tuple.
///
/// Returns classes sorted ascending by size (ties broken by first member
/// position, so the ordering is deterministic). An empty QI list yields an
/// empty partition.
pub fn partition(dataset: &Dataset, quasi_identifiers: &[String]) -> Result<Vec<EquivalenceClass>, Error> {
    if quasi_identifiers.is_empty() {
        return Ok(Vec::new());
    }

    let mut qi_cols = Vec::with_capacity(quasi_identifiers.len());
    for name in quasi_identifiers {
        qi_cols.push(dataset.require_column(name)?);
    }

    let mut groups: HashMap<Vec<ValueKey>, Vec<usize>> = HashMap::new();
    for row in 0..dataset.len() {
        let key: Vec<ValueKey> = qi_cols
            .iter()
            .map(|&col| dataset.value(row, col).key())
            .collect();
        groups.entry(key).or_default().push(row);
    }

    let mut classes: Vec<EquivalenceClass> = groups
        .into_iter()
        .map(|(key, members)| EquivalenceClass { key, members })
        .collect();
    classes.sort_by_key(|c| (c.size(), c.members[0]));

    Ok(classes)
}

/// Count classes smaller than the k-anonymity threshold.
pub fn count_k_violations(classes: &[EquivalenceClass], k: usize) -> usize {
    classes.iter().filter(|c| c.size() < k).count()
}
