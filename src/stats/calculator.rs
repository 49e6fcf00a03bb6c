//! Statistics Calculator Module
//! Aggregates, deviation statistics and plan/actual recommendations.

use crate::data::Record;
use serde::Serialize;
use statrs::statistics::Statistics;

pub const NO_DATA_RECOMMENDATION: &str = "No data in the selected range.";

/// Direction of an average deviation relative to plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    AbovePlan,
    BelowPlan,
    OnPlan,
}

impl Trend {
    pub fn from_mean(mean: f64) -> Self {
        if mean > 0.0 {
            Trend::AbovePlan
        } else if mean < 0.0 {
            Trend::BelowPlan
        } else {
            Trend::OnPlan
        }
    }

    pub fn production_message(self) -> &'static str {
        match self {
            Trend::AbovePlan => "Production exceeding plan on average. Consider revising targets.",
            Trend::BelowPlan => "Production below plan. Investigate bottlenecks or inefficiencies.",
            Trend::OnPlan => "Production closely aligns with planning.",
        }
    }

    pub fn quality_message(self) -> &'static str {
        match self {
            Trend::AbovePlan => {
                "Quality is higher than planned - good, but double-check consistency."
            }
            Trend::BelowPlan => "Quality below expectation. Investigate root causes.",
            Trend::OnPlan => "Quality is on target.",
        }
    }
}

/// Distribution of one deviation column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviationStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
}

impl Default for DeviationStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            q1: f64::NAN,
            q3: f64::NAN,
            whisker_low: f64::NAN,
            whisker_high: f64::NAN,
        }
    }
}

/// Aggregates over a non-empty set of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub record_count: usize,
    pub total_planned_production: f64,
    pub total_actual_production: f64,
    pub total_planned_quality: f64,
    pub total_actual_quality: f64,
    pub mean_production_deviation: f64,
    pub mean_quality_deviation: f64,
    pub production_trend: Trend,
    pub quality_trend: Trend,
    pub production_deviation: DeviationStats,
    pub quality_deviation: DeviationStats,
}

impl Summary {
    /// Production message first, then quality.
    pub fn recommendations(&self) -> Vec<String> {
        vec![
            self.production_trend.production_message().to_string(),
            self.quality_trend.quality_message().to_string(),
        ]
    }
}

pub struct StatsCalculator;

impl StatsCalculator {
    /// Summarize records; `None` when there is nothing to summarize.
    pub fn summarize(records: &[Record]) -> Option<Summary> {
        if records.is_empty() {
            return None;
        }

        let n = records.len() as f64;
        let total = |f: fn(&Record) -> f64| records.iter().map(f).sum::<f64>();

        let production: Vec<f64> = records.iter().map(|r| r.production_deviation).collect();
        let quality: Vec<f64> = records.iter().map(|r| r.quality_deviation).collect();

        // Plain sum/count so that exactly cancelling deviations give exactly 0.0.
        let mean_production_deviation = production.iter().sum::<f64>() / n;
        let mean_quality_deviation = quality.iter().sum::<f64>() / n;

        Some(Summary {
            record_count: records.len(),
            total_planned_production: total(|r| r.planned_production),
            total_actual_production: total(|r| r.actual_production),
            total_planned_quality: total(|r| r.planned_quality),
            total_actual_quality: total(|r| r.actual_quality),
            mean_production_deviation,
            mean_quality_deviation,
            production_trend: Trend::from_mean(mean_production_deviation),
            quality_trend: Trend::from_mean(mean_quality_deviation),
            production_deviation: Self::compute_deviation_stats(&production),
            quality_deviation: Self::compute_deviation_stats(&quality),
        })
    }

    /// Recommendation lines for an optional summary.
    pub fn recommendations(summary: Option<&Summary>) -> Vec<String> {
        summary
            .map(Summary::recommendations)
            .unwrap_or_else(|| vec![NO_DATA_RECOMMENDATION.to_string()])
    }

    /// Compute descriptive statistics for an array of values.
    pub fn compute_deviation_stats(values: &[f64]) -> DeviationStats {
        let n = values.len();
        if n == 0 {
            return DeviationStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let q1 = Self::percentile(&sorted, 25.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= q1 - 1.5 * iqr)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= q3 + 1.5 * iqr)
            .unwrap_or(q3);

        let std = if n > 1 { values.std_dev() } else { 0.0 };

        DeviationStats {
            count: n,
            mean: values.mean(),
            median: Self::percentile(&sorted, 50.0),
            std,
            min: sorted[0],
            max: sorted[n - 1],
            q1,
            q3,
            whisker_low,
            whisker_high,
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(d: u32, pp: f64, ap: f64, pq: f64, aq: f64) -> Record {
        Record::new(NaiveDate::from_ymd_opt(2024, 1, d).unwrap(), pp, ap, pq, aq)
    }

    #[test]
    fn test_end_to_end_example_aligns_with_planning() {
        let records = vec![
            rec(1, 10.0, 12.0, 300.0, 300.0),
            rec(2, 20.0, 18.0, 300.0, 300.0),
            rec(3, 30.0, 30.0, 300.0, 300.0),
        ];
        let deviations: Vec<f64> = records.iter().map(|r| r.production_deviation).collect();
        assert_eq!(deviations, vec![2.0, -2.0, 0.0]);

        let summary = StatsCalculator::summarize(&records).unwrap();
        assert_eq!(summary.mean_production_deviation, 0.0);
        assert_eq!(summary.production_trend, Trend::OnPlan);
        assert_eq!(
            summary.recommendations()[0],
            "Production closely aligns with planning."
        );
        assert_eq!(summary.recommendations()[1], "Quality is on target.");
    }

    #[test]
    fn test_sums() {
        let records = vec![rec(1, 1.5, 2.0, 10.0, 11.0), rec(2, 2.5, 3.0, 20.0, 19.0)];
        let summary = StatsCalculator::summarize(&records).unwrap();
        assert_eq!(summary.record_count, 2);
        assert_eq!(summary.total_planned_production, 4.0);
        assert_eq!(summary.total_actual_production, 5.0);
        assert_eq!(summary.total_planned_quality, 30.0);
        assert_eq!(summary.total_actual_quality, 30.0);
        assert_eq!(summary.mean_production_deviation, 0.5);
        assert_eq!(summary.mean_quality_deviation, 0.0);
    }

    #[test]
    fn test_cancelling_deviations_are_on_target() {
        let records = vec![rec(1, 5.0, 5.75, 100.0, 100.25), rec(2, 5.0, 4.25, 100.0, 99.75)];
        let summary = StatsCalculator::summarize(&records).unwrap();
        assert_eq!(summary.production_trend, Trend::OnPlan);
        assert_eq!(summary.quality_trend, Trend::OnPlan);
    }

    #[test]
    fn test_recommendations_by_sign() {
        let above = StatsCalculator::summarize(&[rec(1, 1.0, 2.0, 1.0, 3.0)]).unwrap();
        assert_eq!(
            above.recommendations(),
            vec![
                "Production exceeding plan on average. Consider revising targets.".to_string(),
                "Quality is higher than planned - good, but double-check consistency.".to_string(),
            ]
        );

        let below = StatsCalculator::summarize(&[rec(1, 2.0, 1.0, 3.0, 1.0)]).unwrap();
        assert_eq!(
            below.recommendations(),
            vec![
                "Production below plan. Investigate bottlenecks or inefficiencies.".to_string(),
                "Quality below expectation. Investigate root causes.".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_input_has_no_summary() {
        assert!(StatsCalculator::summarize(&[]).is_none());
        assert_eq!(
            StatsCalculator::recommendations(None),
            vec![NO_DATA_RECOMMENDATION.to_string()]
        );
    }

    #[test]
    fn test_deviation_stats() {
        let stats = StatsCalculator::compute_deviation_stats(&[4.0, 1.0, 3.0, 2.0, 100.0]);
        assert_eq!(stats.count, 5);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 100.0);
        assert_eq!(stats.whisker_low, 1.0);
        // 100 lies beyond q3 + 1.5 * iqr
        assert_eq!(stats.whisker_high, 4.0);
        assert!((stats.mean - 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_deviation_stats_single_value() {
        let stats = StatsCalculator::compute_deviation_stats(&[2.5]);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.whisker_low, 2.5);
        assert_eq!(stats.whisker_high, 2.5);
    }
}
