//! Statistics Calculator Module
//! Descriptive statistics over attendance values and the cumulative
//! registrations-per-year series behind the time chart.

use polars::prelude::*;
use std::collections::HashMap;

/// Descriptive statistics in the usual `describe` shape.
#[derive(Debug, Clone)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Default for SummaryStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q1: f64::NAN,
            median: f64::NAN,
            q3: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Handles the statistical computations for the report.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_summary(values: &[f64]) -> SummaryStats {
        let n = values.len();
        if n == 0 {
            return SummaryStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        SummaryStats {
            count: n,
            mean,
            std: variance.sqrt(),
            min: sorted[0],
            q1: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q3: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Extract a numeric column as f64 values, dropping nulls.
    pub fn column_values(df: &DataFrame, column: &str) -> Vec<f64> {
        df.column(column)
            .ok()
            .and_then(|col| col.cast(&DataType::Float64).ok())
            .and_then(|col| {
                col.f64()
                    .ok()
                    .map(|ca| ca.into_iter().flatten().filter(|v| !v.is_nan()).collect())
            })
            .unwrap_or_default()
    }

    /// Running total of registrations per year, ascending by year.
    pub fn cumulative_year_counts(years: &[i32]) -> Vec<(i32, u32)> {
        if years.is_empty() {
            return Vec::new();
        }

        let mut per_year: HashMap<i32, u32> = HashMap::new();
        for &y in years {
            *per_year.entry(y).or_insert(0) += 1;
        }

        let mut ordered: Vec<i32> = per_year.keys().copied().collect();
        ordered.sort_unstable();

        let mut total = 0u32;
        ordered
            .into_iter()
            .map(|y| {
                total += per_year[&y];
                (y, total)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_matches_describe_semantics() {
        let stats = StatsCalculator::compute_summary(&[100.0, 500.0, 300.0]);
        assert_eq!(stats.count, 3);
        assert!((stats.mean - 300.0).abs() < 1e-9);
        assert!((stats.std - 200.0).abs() < 1e-9); // sample std, ddof = 1
        assert_eq!(stats.min, 100.0);
        assert_eq!(stats.q1, 200.0);
        assert_eq!(stats.median, 300.0);
        assert_eq!(stats.q3, 400.0);
        assert_eq!(stats.max, 500.0);
    }

    #[test]
    fn empty_input_yields_empty_summary() {
        let stats = StatsCalculator::compute_summary(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
    }

    #[test]
    fn column_values_skips_nulls() {
        let df = df!("Attendance" => [Some(100), None, Some(300)]).unwrap();
        let values = StatsCalculator::column_values(&df, "Attendance");
        assert_eq!(values, vec![100.0, 300.0]);
    }

    #[test]
    fn cumulative_counts_accumulate_in_year_order() {
        let curve = StatsCalculator::cumulative_year_counts(&[1980, 1975, 1980, 1990]);
        assert_eq!(curve, vec![(1975, 1), (1980, 3), (1990, 4)]);
    }

    #[test]
    fn cumulative_counts_of_nothing_is_empty() {
        assert!(StatsCalculator::cumulative_year_counts(&[]).is_empty());
    }
}
