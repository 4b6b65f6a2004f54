//! Aggregation module for combining calculation results
//!
//! Folds per-activity results into grouped totals by channel, market, scope,
//! and category. The fold is pure and order-independent: re-aggregating the
//! same results in any order yields identical totals (up to floating-point
//! summation order, which stays below the presentation rounding precision).
//!
//! Grouping keys use `BTreeMap` so serialized reports list groups in a
//! stable order; consumers are free to re-sort for display.

use crate::calculator::EmissionCalculator;
use crate::error::Result;
use crate::types::{
    ActivityInput, CalculationResult, serialize_rounded, serialize_rounded_map,
};
use futures::stream::{Stream, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Grouped emission totals for a batch of activities
///
/// All figures are kg CO₂e. In-memory values keep full precision; rounding
/// to the presentation precision happens on serialization.
///
/// # Examples
/// ```
/// use emistat::aggregation::Aggregator;
///
/// let report = Aggregator::aggregate(vec![]);
/// assert_eq!(report.total, 0.0);
/// assert!(report.by_channel.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateReport {
    /// Sum over all items
    #[serde(serialize_with = "serialize_rounded")]
    pub total: f64,
    /// Totals grouped by channel
    #[serde(serialize_with = "serialize_rounded_map")]
    pub by_channel: BTreeMap<String, f64>,
    /// Totals grouped by market
    #[serde(serialize_with = "serialize_rounded_map")]
    pub by_market: BTreeMap<String, f64>,
    /// Totals grouped by scope ("scope1" / "scope2" / "scope3")
    #[serde(serialize_with = "serialize_rounded_map")]
    pub by_scope: BTreeMap<String, f64>,
    /// Totals grouped by emission category
    #[serde(serialize_with = "serialize_rounded_map")]
    pub by_category: BTreeMap<String, f64>,
    /// The per-activity results the report was built from
    pub items: Vec<CalculationResult>,
}

impl AggregateReport {
    /// Fold one result into the grouped totals
    fn add(&mut self, result: CalculationResult) {
        self.total += result.total_emissions;
        *self
            .by_channel
            .entry(result.channel.as_str().to_string())
            .or_insert(0.0) += result.total_emissions;
        *self
            .by_market
            .entry(result.market.as_str().to_string())
            .or_insert(0.0) += result.total_emissions;
        *self
            .by_scope
            .entry(result.scope.key().to_string())
            .or_insert(0.0) += result.total_emissions;
        *self
            .by_category
            .entry(result.category.as_str().to_string())
            .or_insert(0.0) += result.total_emissions;
        self.items.push(result);
    }
}

/// Main aggregation engine
pub struct Aggregator {
    calculator: Arc<EmissionCalculator>,
    show_progress: bool,
}

impl Aggregator {
    /// Create a new Aggregator
    pub fn new(calculator: Arc<EmissionCalculator>) -> Self {
        Self {
            calculator,
            show_progress: false,
        }
    }

    /// Enable or disable progress bars
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Combine already-calculated results into a grouped report.
    ///
    /// Pure fold; empty input yields a zero-valued report, not an error.
    pub fn aggregate(results: Vec<CalculationResult>) -> AggregateReport {
        let mut report = AggregateReport::default();
        for result in results {
            report.add(result);
        }
        report
    }

    /// Calculate a stream of activities and aggregate the results.
    ///
    /// Any calculation failure aborts the batch with its typed error; the
    /// report never contains silently-defaulted figures.
    pub async fn aggregate_stream(
        &self,
        activities: impl Stream<Item = Result<ActivityInput>>,
    ) -> Result<AggregateReport> {
        let progress = if self.show_progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg} [{elapsed_precise}] {pos} activities processed")
                    .unwrap(),
            );
            pb.set_message("Calculating emissions");
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            Some(pb)
        } else {
            None
        };

        let mut report = AggregateReport::default();
        let mut count = 0u64;

        tokio::pin!(activities);
        while let Some(activity) = activities.next().await {
            let activity = activity?;
            let result = self.calculator.calculate_with_ghg_protocol(&activity).await?;
            report.add(result);

            count += 1;
            if let Some(ref pb) = progress {
                pb.set_position(count);
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message(format!("Calculated {count} activities"));
        }

        debug!(
            "Aggregated {} activities into {} channels, {} markets",
            count,
            report.by_channel.len(),
            report.by_market.len()
        );

        Ok(report)
    }
}
