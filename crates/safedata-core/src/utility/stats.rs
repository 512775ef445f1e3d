//! Scalar statistics shared by the utility metrics

/// Arithmetic mean; 0.0 for an empty slice.
pub(super) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1); 0.0 below two values.
pub(super) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64).sqrt()
}

/// Pearson correlation; `None` when either side has zero variance or fewer
/// than two pairs exist.
pub(super) fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mx = mean(&xs[..n]);
    let my = mean(&ys[..n]);
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..n {
        cov += (xs[i] - mx) * (ys[i] - my);
        var_x += (xs[i] - mx).powi(2);
        var_y += (ys[i] - my).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Two-sample Kolmogorov-Smirnov statistic: the largest gap between the two
/// empirical CDFs.
pub(super) fn ks_statistic(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.is_empty() || ys.is_empty() {
        return 1.0;
    }
    let mut a = xs.to_vec();
    let mut b = ys.to_vec();
    a.sort_by(|p, q| p.partial_cmp(q).unwrap_or(std::cmp::Ordering::Equal));
    b.sort_by(|p, q| p.partial_cmp(q).unwrap_or(std::cmp::Ordering::Equal));

    let mut i = 0;
    let mut j = 0;
    let mut max_gap: f64 = 0.0;
    while i < a.len() && j < b.len() {
        // Advance both sides past the current value so ties move the two
        // CDFs together.
        let v = a[i].min(b[j]);
        while i < a.len() && a[i] <= v {
            i += 1;
        }
        while j < b.len() && b[j] <= v {
            j += 1;
        }
        let fa = i as f64 / a.len() as f64;
        let fb = j as f64 / b.len() as f64;
        max_gap = max_gap.max((fa - fb).abs());
    }
    max_gap
}

/// First Wasserstein distance between two one-dimensional empirical
/// distributions: the area between their CDFs.
pub(super) fn wasserstein(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.is_empty() || ys.is_empty() {
        return 0.0;
    }
    let mut a = xs.to_vec();
    let mut b = ys.to_vec();
    a.sort_by(|p, q| p.partial_cmp(q).unwrap_or(std::cmp::Ordering::Equal));
    b.sort_by(|p, q| p.partial_cmp(q).unwrap_or(std::cmp::Ordering::Equal));

    let mut points: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
    points.sort_by(|p, q| p.partial_cmp(q).unwrap_or(std::cmp::Ordering::Equal));
    points.dedup();

    let cdf = |sorted: &[f64], x: f64| -> f64 {
        sorted.partition_point(|&v| v <= x) as f64 / sorted.len() as f64
    };

    let mut distance = 0.0;
    for w in points.windows(2) {
        let width = w[1] - w[0];
        distance += (cdf(&a, w[0]) - cdf(&b, w[0])).abs() * width;
    }
    distance
}

/// Shannon entropy in bits over a probability vector; zero entries ignored.
pub(super) fn entropy_bits(probabilities: &[f64]) -> f64 {
    probabilities
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.log2())
        .sum()
}

/// Counts per equal-width bin over [min, max]; the top edge is inclusive.
pub(super) fn equal_width_bin_counts(values: &[f64], bins: usize) -> Vec<usize> {
    let mut counts = vec![0usize; bins.max(1)];
    if values.is_empty() {
        return counts;
    }
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi <= lo {
        counts[0] = values.len();
        return counts;
    }
    let width = (hi - lo) / counts.len() as f64;
    for &v in values {
        let bin = (((v - lo) / width) as usize).min(counts.len() - 1);
        counts[bin] += 1;
    }
    counts
}

/// Mutual information in nats between two numeric vectors, each discretized
/// into `bins` equal-width bins.
pub(super) fn mutual_information(xs: &[f64], ys: &[f64], bins: usize) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return 0.0;
    }
    let bin_of = |values: &[f64], v: f64| -> usize {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if hi <= lo {
            return 0;
        }
        let width = (hi - lo) / bins as f64;
        (((v - lo) / width) as usize).min(bins - 1)
    };

    let mut joint = vec![vec![0usize; bins]; bins];
    for i in 0..n {
        joint[bin_of(&xs[..n], xs[i])][bin_of(&ys[..n], ys[i])] += 1;
    }

    let marginal_x: Vec<usize> = joint.iter().map(|row| row.iter().sum()).collect();
    let marginal_y: Vec<usize> = (0..bins).map(|j| joint.iter().map(|row| row[j]).sum()).collect();

    let total = n as f64;
    let mut mi = 0.0;
    for (i, row) in joint.iter().enumerate() {
        for (j, &count) in row.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let pxy = count as f64 / total;
            let px = marginal_x[i] as f64 / total;
            let py = marginal_y[j] as f64 / total;
            mi += pxy * (pxy / (px * py)).ln();
        }
    }
    mi.max(0.0)
}
