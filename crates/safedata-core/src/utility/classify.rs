//! Baseline classifier for the classification-utility metric
//!
//! A bagged ensemble of decision stumps: each stump is trained on a bootstrap
//! sample over one randomly chosen feature, picking the threshold that
//! minimizes training misclassification. Predictions are majority votes. The
//! model only has to be a consistent baseline on both the original and the
//! processed data; its absolute accuracy is irrelevant to the metric.

use crate::rng::PipelineRng;

const ENSEMBLE_SIZE: usize = 25;
const MAX_THRESHOLD_CANDIDATES: usize = 32;

#[derive(Clone, Debug)]
struct Stump {
    feature: usize,
    threshold: f64,
    below_label: usize,
    above_label: usize,
}

pub(super) struct StumpEnsemble {
    stumps: Vec<Stump>,
    label_count: usize,
}

impl StumpEnsemble {
    /// Train on row-major features and integer labels. `label_count` is the
    /// number of distinct label codes; rows and labels must be non-empty and
    /// of equal length.
    pub(super) fn train(
        features: &[Vec<f64>],
        labels: &[usize],
        label_count: usize,
        rng: &mut PipelineRng,
    ) -> StumpEnsemble {
        let n = features.len();
        let dims = features[0].len();
        let mut stumps = Vec::with_capacity(ENSEMBLE_SIZE);
        for _ in 0..ENSEMBLE_SIZE {
            let sample: Vec<usize> = (0..n).map(|_| rng.below(n)).collect();
            let feature = rng.below(dims);
            stumps.push(fit_stump(features, labels, label_count, &sample, feature));
        }
        StumpEnsemble {
            stumps,
            label_count,
        }
    }

    pub(super) fn predict(&self, row: &[f64]) -> usize {
        let mut votes = vec![0usize; self.label_count];
        for stump in &self.stumps {
            let label = if row[stump.feature] <= stump.threshold {
                stump.below_label
            } else {
                stump.above_label
            };
            votes[label] += 1;
        }
        votes
            .iter()
            .enumerate()
            .max_by_key(|&(_, v)| *v)
            .map(|(label, _)| label)
            .unwrap_or(0)
    }

    pub(super) fn accuracy(&self, features: &[Vec<f64>], labels: &[usize]) -> f64 {
        if features.is_empty() {
            return 0.0;
        }
        let correct = features
            .iter()
            .zip(labels)
            .filter(|(row, &label)| self.predict(row) == label)
            .count();
        correct as f64 / features.len() as f64
    }
}

fn fit_stump(
    features: &[Vec<f64>],
    labels: &[usize],
    label_count: usize,
    sample: &[usize],
    feature: usize,
) -> Stump {
    let mut values: Vec<f64> = sample.iter().map(|&i| features[i][feature]).collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values.dedup();

    // Midpoints between consecutive distinct values, thinned to a fixed
    // candidate budget.
    let midpoints: Vec<f64> = values.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    let step = (midpoints.len() / MAX_THRESHOLD_CANDIDATES).max(1);
    let candidates: Vec<f64> = if midpoints.is_empty() {
        vec![values.first().copied().unwrap_or(0.0)]
    } else {
        midpoints.iter().step_by(step).copied().collect()
    };

    let mut best = Stump {
        feature,
        threshold: candidates[0],
        below_label: 0,
        above_label: 0,
    };
    let mut best_errors = usize::MAX;
    for &threshold in &candidates {
        let mut below_votes = vec![0usize; label_count];
        let mut above_votes = vec![0usize; label_count];
        for &i in sample {
            if features[i][feature] <= threshold {
                below_votes[labels[i]] += 1;
            } else {
                above_votes[labels[i]] += 1;
            }
        }
        let below_label = majority(&below_votes);
        let above_label = majority(&above_votes);
        let errors = sample.len()
            - below_votes[below_label]
            - above_votes[above_label];
        if errors < best_errors {
            best_errors = errors;
            best = Stump {
                feature,
                threshold,
                below_label,
                above_label,
            };
        }
    }
    best
}

fn majority(votes: &[usize]) -> usize {
    votes
        .iter()
        .enumerate()
        .max_by_key(|&(_, v)| *v)
        .map(|(label, _)| label)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..50 {
            features.push(vec![i as f64]);
            labels.push(usize::from(i >= 25));
        }
        (features, labels)
    }

    #[test]
    fn test_learns_linearly_separable_data() {
        let (features, labels) = separable();
        let mut rng = PipelineRng::from_seed(42);
        let model = StumpEnsemble::train(&features, &labels, 2, &mut rng);
        let acc = model.accuracy(&features, &labels);
        assert!(acc > 0.9, "training accuracy {} too low", acc);
    }

    #[test]
    fn test_training_is_deterministic() {
        let (features, labels) = separable();
        let mut rng_a = PipelineRng::from_seed(5);
        let mut rng_b = PipelineRng::from_seed(5);
        let a = StumpEnsemble::train(&features, &labels, 2, &mut rng_a);
        let b = StumpEnsemble::train(&features, &labels, 2, &mut rng_b);
        for row in &features {
            assert_eq!(a.predict(row), b.predict(row));
        }
    }

    #[test]
    fn test_single_distinct_value_does_not_panic() {
        let features = vec![vec![1.0]; 10];
        let labels = vec![0usize; 10];
        let mut rng = PipelineRng::from_seed(1);
        let model = StumpEnsemble::train(&features, &labels, 1, &mut rng);
        assert_eq!(model.accuracy(&features, &labels), 1.0);
    }
}
