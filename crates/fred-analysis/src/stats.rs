//! Pure statistical transforms over observations.
//!
//! Derived observations keep the series id of their inputs and are dated at
//! the start of the window they summarize. Unreported input values produce
//! unreported outputs rather than poisoning neighboring windows.

use fred_core::{FredError, Observation, Result};

/// Moving average over a fixed window.
///
/// The result has `observations.len() - window + 1` entries; entry `i` is
/// the mean of the window starting at observation `i` and keeps that
/// observation's date. A window of 1 reproduces the input. A window that
/// contains an unreported value yields an unreported entry.
///
/// # Errors
///
/// Returns [`FredError::InvalidOperation`] when `window` is zero or larger
/// than the number of observations.
pub fn moving_average(observations: &[Observation], window: usize) -> Result<Vec<Observation>> {
    if window == 0 || window > observations.len() {
        return Err(FredError::InvalidOperation(format!(
            "Moving average window {window} not in 1..={}",
            observations.len()
        )));
    }

    Ok(observations
        .windows(window)
        .map(|chunk| {
            let mean = chunk
                .iter()
                .map(|obs| obs.value)
                .sum::<Option<f64>>()
                .map(|total| total / window as f64);
            Observation::new(chunk[0].series_id.clone(), chunk[0].date, mean)
        })
        .collect())
}

/// Successive absolute differences.
///
/// Entry `i` is `value[i + 1] - value[i]`, dated at observation `i`. The
/// result has one entry fewer than the input; differencing fewer than two
/// observations yields an empty result.
#[must_use]
pub fn diff(observations: &[Observation]) -> Vec<Observation> {
    observations
        .windows(2)
        .map(|pair| {
            let value = match (pair[0].value, pair[1].value) {
                (Some(a), Some(b)) => Some(b - a),
                _ => None,
            };
            Observation::new(pair[0].series_id.clone(), pair[0].date, value)
        })
        .collect()
}

/// Successive percentage differences.
///
/// Entry `i` is `(value[i + 1] - value[i]) / value[i]`, dated at observation
/// `i`. A zero or unreported denominator yields an unreported entry.
#[must_use]
pub fn diff_percent(observations: &[Observation]) -> Vec<Observation> {
    observations
        .windows(2)
        .map(|pair| {
            let value = match (pair[0].value, pair[1].value) {
                (Some(a), Some(b)) if a != 0.0 => Some((b - a) / a),
                _ => None,
            };
            Observation::new(pair[0].series_id.clone(), pair[0].date, value)
        })
        .collect()
}

/// Sample covariance matrix of two aligned series.
///
/// Returns the symmetric 2x2 matrix `[[var(a), cov(a, b)], [cov(a, b),
/// var(b)]]` with the sample (n - 1) normalization. Unreported values
/// propagate as NaN.
///
/// # Errors
///
/// Returns [`FredError::InvalidOperation`] when the series differ in length
/// or hold fewer than two observations.
pub fn covariance(a: &[Observation], b: &[Observation]) -> Result<[[f64; 2]; 2]> {
    if a.len() != b.len() {
        return Err(FredError::InvalidOperation(format!(
            "Covariance not computable: series lengths {} and {} differ",
            a.len(),
            b.len()
        )));
    }
    if a.len() < 2 {
        return Err(FredError::InvalidOperation(
            "Covariance not computable: need at least two observations".to_string(),
        ));
    }

    let xs: Vec<f64> = a.iter().map(Observation::value_or_nan).collect();
    let ys: Vec<f64> = b.iter().map(Observation::value_or_nan).collect();
    let mean_x = mean(&xs);
    let mean_y = mean(&ys);

    let var_x = sample_moment(&xs, &xs, mean_x, mean_x);
    let var_y = sample_moment(&ys, &ys, mean_y, mean_y);
    let cov = sample_moment(&xs, &ys, mean_x, mean_y);

    Ok([[var_x, cov], [cov, var_y]])
}

/// Least-squares regression line through a series.
///
/// Fits `y = intercept + slope * x` where x is the observation date in days
/// since the Unix epoch, and returns `(intercept, slope)`. Two observations
/// reproduce the exact line through them. Unreported values are skipped.
///
/// # Errors
///
/// Returns [`FredError::InvalidOperation`] when fewer than two reported
/// observations remain, or all remaining observations share one date.
pub fn linear_regression(observations: &[Observation]) -> Result<(f64, f64)> {
    let points: Vec<(f64, f64)> = observations
        .iter()
        .filter_map(|obs| obs.value.map(|v| (obs.epoch_days() as f64, v)))
        .collect();

    if points.len() < 2 {
        return Err(FredError::InvalidOperation(
            "Regression needs at least two reported observations".to_string(),
        ));
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return Err(FredError::InvalidOperation(
            "Regression needs observations on at least two dates".to_string(),
        ));
    }
    let sxy: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    Ok((intercept, slope))
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_moment(xs: &[f64], ys: &[f64], mean_x: f64, mean_y: f64) -> f64 {
    xs.iter()
        .zip(ys.iter())
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum::<f64>()
        / (xs.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fred_core::SeriesId;

    fn obs(days: u32, value: Option<f64>) -> Observation {
        Observation::new(
            SeriesId::new("TEST"),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(days as u64),
            value,
        )
    }

    fn values(observations: &[Observation]) -> Vec<Option<f64>> {
        observations.iter().map(|o| o.value).collect()
    }

    #[test]
    fn test_moving_average_window_one_is_identity() {
        let input = vec![obs(0, Some(1.0)), obs(1, Some(2.0)), obs(2, None)];
        assert_eq!(moving_average(&input, 1).unwrap(), input);
    }

    #[test]
    fn test_moving_average_window_three() {
        let input = vec![
            obs(0, Some(1.0)),
            obs(1, Some(2.0)),
            obs(2, Some(3.0)),
            obs(3, Some(4.0)),
        ];
        let result = moving_average(&input, 3).unwrap();
        assert_eq!(values(&result), vec![Some(2.0), Some(3.0)]);
        assert_eq!(result[0].date, input[0].date);
        assert_eq!(result[1].date, input[1].date);
    }

    #[test]
    fn test_moving_average_missing_value_window() {
        let input = vec![obs(0, Some(1.0)), obs(1, None), obs(2, Some(3.0))];
        let result = moving_average(&input, 2).unwrap();
        assert_eq!(values(&result), vec![None, None]);
    }

    #[test]
    fn test_moving_average_bad_window() {
        let input = vec![obs(0, Some(1.0)), obs(1, Some(2.0))];
        assert!(moving_average(&input, 0).is_err());
        assert!(moving_average(&input, 3).is_err());
    }

    #[test]
    fn test_diff() {
        let input = vec![obs(0, Some(1.0)), obs(1, Some(4.0)), obs(2, Some(2.0))];
        let result = diff(&input);
        assert_eq!(values(&result), vec![Some(3.0), Some(-2.0)]);
        assert_eq!(result[0].date, input[0].date);
    }

    #[test]
    fn test_diff_short_input() {
        assert!(diff(&[]).is_empty());
        assert!(diff(&[obs(0, Some(1.0))]).is_empty());
    }

    #[test]
    fn test_diff_percent() {
        let input = vec![
            obs(0, Some(2.0)),
            obs(1, Some(3.0)),
            obs(2, Some(0.0)),
            obs(3, Some(1.0)),
        ];
        let result = diff_percent(&input);
        assert_eq!(values(&result), vec![Some(0.5), Some(-1.0), None]);
    }

    #[test]
    fn test_diff_propagates_missing() {
        let input = vec![obs(0, Some(1.0)), obs(1, None), obs(2, Some(2.0))];
        assert_eq!(values(&diff(&input)), vec![None, None]);
        assert_eq!(values(&diff_percent(&input)), vec![None, None]);
    }

    #[test]
    fn test_covariance_known_values() {
        let a = vec![obs(0, Some(1.0)), obs(1, Some(2.0)), obs(2, Some(3.0))];
        let b = vec![obs(0, Some(2.0)), obs(1, Some(4.0)), obs(2, Some(6.0))];
        let matrix = covariance(&a, &b).unwrap();
        assert!((matrix[0][0] - 1.0).abs() < 1e-12);
        assert!((matrix[1][1] - 4.0).abs() < 1e-12);
        assert!((matrix[0][1] - 2.0).abs() < 1e-12);
        assert_eq!(matrix[0][1], matrix[1][0]);
    }

    #[test]
    fn test_covariance_mismatched_lengths() {
        let a = vec![obs(0, Some(1.0)), obs(1, Some(2.0))];
        let b = vec![obs(0, Some(1.0))];
        assert!(matches!(
            covariance(&a, &b),
            Err(FredError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_covariance_propagates_nan() {
        let a = vec![obs(0, Some(1.0)), obs(1, None)];
        let b = vec![obs(0, Some(1.0)), obs(1, Some(2.0))];
        let matrix = covariance(&a, &b).unwrap();
        assert!(matrix[0][0].is_nan());
        assert!(matrix[0][1].is_nan());
    }

    #[test]
    fn test_regression_two_points_exact() {
        let input = vec![obs(0, Some(10.0)), obs(10, Some(30.0))];
        let (intercept, slope) = linear_regression(&input).unwrap();
        let x0 = input[0].epoch_days() as f64;
        let x1 = input[1].epoch_days() as f64;
        assert!((intercept + slope * x0 - 10.0).abs() < 1e-9);
        assert!((intercept + slope * x1 - 30.0).abs() < 1e-9);
        assert!((slope - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_regression_collinear_points() {
        let input = vec![
            obs(0, Some(1.0)),
            obs(1, Some(2.0)),
            obs(2, Some(3.0)),
            obs(3, Some(4.0)),
        ];
        let (intercept, slope) = linear_regression(&input).unwrap();
        assert!((slope - 1.0).abs() < 1e-12);
        let x0 = input[0].epoch_days() as f64;
        assert!((intercept + slope * x0 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_regression_skips_unreported() {
        let input = vec![obs(0, Some(10.0)), obs(5, None), obs(10, Some(30.0))];
        let (_, slope) = linear_regression(&input).unwrap();
        assert!((slope - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_regression_too_few_points() {
        assert!(linear_regression(&[obs(0, Some(1.0))]).is_err());
        assert!(linear_regression(&[obs(0, Some(1.0)), obs(1, None)]).is_err());
    }
}
