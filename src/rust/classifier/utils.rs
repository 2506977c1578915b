use ndarray::Array1;

/// L2-normalizes a vector; a zero vector stays zero.
pub(crate) fn normalize_vector(vec: &Array1<f64>) -> Array1<f64> {
    let norm: f64 = vec.iter().map(|&x| x * x).sum::<f64>().sqrt();
    if norm > 1e-12 {
        vec / norm
    } else {
        Array1::zeros(vec.len())
    }
}

/// Numerically stable `ln(sum(exp(x)))`.
pub(crate) fn log_sum_exp(values: &Array1<f64>) -> f64 {
    let max = values.fold(f64::NEG_INFINITY, |acc, &x| acc.max(x));
    if !max.is_finite() {
        return max;
    }
    max + values.iter().map(|&x| (x - max).exp()).sum::<f64>().ln()
}

/// Turns joint log likelihoods into probabilities that sum to one.
pub(crate) fn softmax(log_scores: &Array1<f64>) -> Array1<f64> {
    let lse = log_sum_exp(log_scores);
    log_scores.mapv(|x| (x - lse).exp())
}
