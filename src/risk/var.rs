//! Historical-simulation tail metrics over a returns sample.
//!
//! Returns are plain percentages (-2.5 = a 2.5% loss). Both metrics come back
//! as non-negative loss magnitudes.
//!
//! Percentile convention: linear interpolation between the two nearest order
//! statistics. For a sorted sample x[0..n] and quantile q the rank is
//! h = q * (n - 1) and the result is x[floor(h)] + (h - floor(h)) * (x[ceil(h)] - x[floor(h)]).

use crate::errors::{QuantError, QuantResult};

/// Empirical q-quantile (q in [0, 1]) with linear interpolation.
pub fn historical_percentile(returns: &[f64], q: f64) -> QuantResult<f64> {
    validate_sample(returns)?;
    if !(0.0..=1.0).contains(&q) {
        return Err(QuantError::InvalidArgument(format!(
            "quantile must be in [0, 1], got {q}"
        )));
    }

    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        Ok(sorted[lo])
    } else {
        let w = rank - lo as f64;
        Ok(sorted[lo] + w * (sorted[hi] - sorted[lo]))
    }
}

/// Loss threshold exceeded in only (1 - confidence) of historical periods.
pub fn historical_var(returns: &[f64], confidence: f64) -> QuantResult<f64> {
    validate_confidence(confidence)?;
    Ok(historical_percentile(returns, 1.0 - confidence)?.abs())
}

/// Mean loss over the periods at or beyond the VaR percentile.
pub fn historical_expected_shortfall(returns: &[f64], confidence: f64) -> QuantResult<f64> {
    validate_confidence(confidence)?;
    let cutoff = historical_percentile(returns, 1.0 - confidence)?;

    let (sum, count) = returns
        .iter()
        .filter(|&&r| r <= cutoff)
        .fold((0.0, 0usize), |(s, n), &r| (s + r, n + 1));

    // The minimum is always <= any interpolated percentile, so count >= 1
    Ok((sum / count.max(1) as f64).abs())
}

pub(crate) fn validate_confidence(confidence: f64) -> QuantResult<()> {
    if confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(QuantError::InvalidArgument(format!(
            "confidence level must be in (0, 1), got {confidence}"
        )))
    }
}

fn validate_sample(returns: &[f64]) -> QuantResult<()> {
    if returns.is_empty() {
        return Err(QuantError::InvalidArgument("returns sample is empty".into()));
    }
    if let Some(bad) = returns.iter().find(|r| !r.is_finite()) {
        return Err(QuantError::InvalidArgument(format!(
            "returns sample contains non-finite value {bad}"
        )));
    }
    Ok(())
}
