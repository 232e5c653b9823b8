//! Summary statistics used by the ReliefSeq scorer.
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

/// Mean and unbiased sample variance. The variance is 0.0 for fewer than two values.
pub fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().mean();
    let variance = if values.len() < 2 {
        0.0
    } else {
        values.iter().variance()
    };
    (mean, variance)
}

/// Signal-to-noise ratio of two samples: (mean_a - mean_b) / (sd_a + sd_b).
///
/// Returns 0.0 when both samples have zero spread.
pub fn signal_to_noise(a: &[f64], b: &[f64]) -> f64 {
    let (mean_a, var_a) = mean_and_variance(a);
    let (mean_b, var_b) = mean_and_variance(b);
    let noise = var_a.sqrt() + var_b.sqrt();
    if noise > 0.0 {
        (mean_a - mean_b) / noise
    } else {
        0.0
    }
}

/// Two-sample t statistic with a fudge term `s0` added to the standard error.
///
/// # Arguments
///
/// * `a`, `b` - Samples to compare; the statistic is positive when `a` has the larger mean.
/// * `s0` - Added to the denominator to damp attributes with tiny variance.
///
/// # Returns
///
/// `(t, degrees_of_freedom)`, with t = 0.0 when the denominator vanishes.
pub fn moderated_t_statistic(a: &[f64], b: &[f64], s0: f64) -> (f64, f64) {
    let (mean_a, var_a) = mean_and_variance(a);
    let (mean_b, var_b) = mean_and_variance(b);
    let n_a = a.len().max(1) as f64;
    let n_b = b.len().max(1) as f64;
    let denominator = (var_a / n_a + var_b / n_b).sqrt() + s0;
    let df = (a.len() + b.len()).saturating_sub(2).max(1) as f64;
    if denominator > 0.0 {
        ((mean_a - mean_b) / denominator, df)
    } else {
        (0.0, df)
    }
}

/// Lower-tail probability of a standard Student's t distribution.
pub fn students_t_cdf(t: f64, df: f64) -> f64 {
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => dist.cdf(t),
        Err(e) => {
            log::warn!("Invalid Student's t parameters (df={}): {}", df, e);
            f64::NAN
        }
    }
}
