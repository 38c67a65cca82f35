//! Trend computation over recorded runs
//!
//! Ordinary least squares over the index-vs-value series, not over
//! elapsed time: irregular sampling distorts the slope magnitude, but
//! direction is the signal consumers act on.

use chrono::{DateTime, Duration, Utc};
use faultline_config::RegressionConfig;
use faultline_core::{HistoryEntry, TrendDirection, TrendResult};
use tracing::debug;

use crate::error::HistoryResult;
use crate::store::HistoryStore;

/// Slope magnitude at or below which a trend counts as stable
const STABLE_SLOPE: f64 = 0.1;

/// A watched metric whose trend crossed the regression threshold
#[derive(Debug, Clone, PartialEq)]
pub struct Regression {
    pub metric: String,
    pub trend: TrendResult,
}

impl std::fmt::Display for Regression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {:.1} -> {:.1} ({:+.1}% over {} runs)",
            self.metric, self.trend.first, self.trend.last, self.trend.percent_change, self.trend.sample_count
        )
    }
}

/// Compute a trend for one metric over entries inside the window.
///
/// Returns `None` with fewer than two data points; a single run is
/// never a trend.
pub fn trend_over(
    entries: &[HistoryEntry],
    metric_path: &str,
    window: Duration,
    now: DateTime<Utc>,
) -> Option<TrendResult> {
    let cutoff = now - window;
    let values: Vec<f64> = entries
        .iter()
        .filter(|entry| entry.timestamp >= cutoff)
        .filter_map(|entry| entry.snapshot.metric(metric_path))
        .collect();

    if values.len() < 2 {
        debug!(
            "Insufficient data for trend on {} ({} point(s) in window)",
            metric_path,
            values.len()
        );
        return None;
    }

    let slope = ols_slope(&values);
    let first = values[0];
    let last = values[values.len() - 1];
    let absolute_change = last - first;
    let percent_change = if first == 0.0 {
        0.0
    } else {
        absolute_change / first * 100.0
    };

    let direction = if slope.abs() <= STABLE_SLOPE {
        TrendDirection::Stable
    } else if slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };

    Some(TrendResult {
        direction,
        slope,
        absolute_change,
        percent_change,
        first,
        last,
        sample_count: values.len(),
    })
}

/// Least-squares slope of values against their index
fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
    let sum_xx: f64 = (0..values.len()).map(|i| (i * i) as f64).sum();

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denominator
}

impl HistoryStore {
    /// Trend for one metric of one test over a day window
    pub async fn trend(
        &self,
        test_name: &str,
        metric_path: &str,
        window_days: u32,
    ) -> HistoryResult<Option<TrendResult>> {
        let entries = self.history(test_name).await?;
        Ok(trend_over(
            &entries,
            metric_path,
            Duration::days(i64::from(window_days)),
            Utc::now(),
        ))
    }

    /// Watched metrics whose trend increased beyond the configured
    /// percent change; all watched metrics are lower-is-better
    pub async fn detect_regressions(
        &self,
        test_name: &str,
        config: &RegressionConfig,
    ) -> HistoryResult<Vec<Regression>> {
        let entries = self.history(test_name).await?;
        let window = Duration::days(i64::from(config.window_days));
        let now = Utc::now();

        let mut regressions = Vec::new();
        for metric in &config.metrics {
            let Some(trend) = trend_over(&entries, metric, window, now) else {
                continue;
            };

            if trend.direction == TrendDirection::Increasing
                && trend.percent_change >= config.min_percent_change
            {
                regressions.push(Regression {
                    metric: metric.clone(),
                    trend,
                });
            }
        }

        Ok(regressions)
    }
}
