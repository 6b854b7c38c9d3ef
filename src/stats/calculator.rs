//! Statistics Calculator Module
//! Ordinary-least-squares trendline and its coefficient of determination.

use crate::data::FilteredSummary;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Result of fitting `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendlineFit {
    pub n: usize,
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, in [0, 1].
    pub r_squared: f64,
    /// Two-sided p-value of the slope; `None` with no residual degrees of freedom.
    pub slope_p_value: Option<f64>,
}

impl TrendlineFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Least-squares fit of `ys` on `xs`.
    ///
    /// Returns `None` for fewer than two points, mismatched lengths, non-finite
    /// input, or when every x is the same (no line is defined).
    pub fn ols_fit(xs: &[f64], ys: &[f64]) -> Option<TrendlineFit> {
        let n = xs.len();
        if n < 2 || ys.len() != n {
            return None;
        }
        if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
            return None;
        }

        let mean_x = xs.iter().sum::<f64>() / n as f64;
        let mean_y = ys.iter().sum::<f64>() / n as f64;

        let sxx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
        let syy: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
        let sxy: f64 = xs
            .iter()
            .zip(ys.iter())
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();

        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let ss_res: f64 = xs
            .iter()
            .zip(ys.iter())
            .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
            .sum();

        // A flat y is fitted exactly by the horizontal line
        let r_squared = if syy == 0.0 {
            1.0
        } else {
            (1.0 - ss_res / syy).clamp(0.0, 1.0)
        };

        Some(TrendlineFit {
            n,
            slope,
            intercept,
            r_squared,
            slope_p_value: Self::slope_p_value(slope, ss_res, sxx, n),
        })
    }

    /// Two-tailed p-value of the slope using the t-distribution with n - 2 dof.
    fn slope_p_value(slope: f64, ss_res: f64, sxx: f64, n: usize) -> Option<f64> {
        if n <= 2 {
            return None;
        }
        let df = (n - 2) as f64;
        let se = (ss_res / df / sxx).sqrt();
        if se == 0.0 {
            return Some(0.0);
        }

        let t = slope / se;
        StudentsT::new(0.0, 1.0, df)
            .ok()
            .map(|dist| (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
    }

    /// Fit hospital count against population for the selected states.
    pub fn fit_hospitals_on_population(filtered: &FilteredSummary<'_>) -> Option<TrendlineFit> {
        let xs: Vec<f64> = filtered.iter().map(|r| r.population as f64).collect();
        let ys: Vec<f64> = filtered.iter().map(|r| r.hospital_count as f64).collect();
        Self::ols_fit(&xs, &ys)
    }
}

/// R² of hospital count on population; undefined for fewer than two states.
pub fn compute_correlation(filtered: &FilteredSummary<'_>) -> Option<f64> {
    StatsCalculator::fit_hospitals_on_population(filtered).map(|fit| fit.r_squared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{filter_by_states, StateRow, StateSummary};

    fn summary() -> StateSummary {
        StateSummary::from_rows(
            vec![
                StateRow::new("California", "CA", 340, 39_000_000),
                StateRow::new("Texas", "TX", 410, 29_000_000),
                StateRow::new("Wyoming", "WY", 0, 580_000),
                StateRow::new("Ohio", "OH", 190, 11_800_000),
            ],
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn perfect_line_has_unit_r_squared() {
        let fit = StatsCalculator::ols_fit(&[1.0, 2.0, 3.0, 4.0], &[3.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(fit.slope_p_value, Some(0.0));
        assert!((fit.predict(10.0) - 21.0).abs() < 1e-9);
    }

    #[test]
    fn known_r_squared() {
        // y = x + noise, r = 0.8 exactly for this set
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 1.0, 4.0, 3.0, 5.0];
        let fit = StatsCalculator::ols_fit(&xs, &ys).unwrap();
        assert!((fit.slope - 0.8).abs() < 1e-12);
        assert!((fit.r_squared - 0.64).abs() < 1e-12);
        let p = fit.slope_p_value.unwrap();
        assert!(p > 0.0 && p < 1.0);
    }

    #[test]
    fn degenerate_inputs_have_no_fit() {
        assert!(StatsCalculator::ols_fit(&[], &[]).is_none());
        assert!(StatsCalculator::ols_fit(&[1.0], &[2.0]).is_none());
        assert!(StatsCalculator::ols_fit(&[3.0, 3.0], &[1.0, 2.0]).is_none());
        assert!(StatsCalculator::ols_fit(&[1.0, 2.0], &[1.0]).is_none());
        assert!(StatsCalculator::ols_fit(&[1.0, f64::NAN], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn two_points_fit_exactly_without_p_value() {
        let fit = StatsCalculator::ols_fit(&[0.0, 10.0], &[5.0, 0.0]).unwrap();
        assert_eq!(fit.r_squared, 1.0);
        assert_eq!(fit.slope_p_value, None);
    }

    #[test]
    fn correlation_needs_two_states() {
        let summary = summary();
        assert_eq!(compute_correlation(&filter_by_states(&summary, &["CA"])), None);
        let none: [&str; 0] = [];
        assert_eq!(compute_correlation(&filter_by_states(&summary, &none)), None);

        let all = filter_by_states(&summary, &summary.state_codes());
        let r2 = compute_correlation(&all).unwrap();
        assert!(r2.is_finite());
        assert!((0.0..=1.0).contains(&r2));
    }
}
