//! Output formatting module for emistat
//!
//! This module provides formatters for displaying emission data in different
//! formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools

use crate::aggregation::AggregateReport;
use crate::types::{CalculationResult, EmissionFactor, round_emissions};
use colored::Colorize;
use prettytable::{Table, format, row};
use serde_json::json;

/// Trait for output formatters
///
/// Implementations provide different output formats for reports, itemized
/// results, and the factor dataset listing.
pub trait OutputFormatter {
    /// Format an aggregate report
    fn format_report(&self, report: &AggregateReport) -> String;

    /// Format itemized per-activity results
    fn format_items(&self, items: &[CalculationResult]) -> String;

    /// Format a factor dataset listing
    fn format_factors(&self, version: &str, factors: &[EmissionFactor]) -> String;
}

/// Table formatter for human-readable output
///
/// Produces ASCII tables suitable for terminal display; emission figures are
/// shown in kg CO₂e at the presentation precision.
pub struct TableFormatter;

impl TableFormatter {
    /// Create a new TableFormatter
    pub fn new() -> Self {
        Self
    }

    /// Format an emission figure in kg CO₂e
    fn format_kg(kg: f64) -> String {
        format!("{:.5}", round_emissions(kg))
    }

    /// Format a quantity, using thousands separators for whole numbers
    fn format_quantity(quantity: f64) -> String {
        if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
            let s = format!("{}", quantity as i64);
            let mut result = String::new();
            for (count, ch) in s.chars().rev().enumerate() {
                if count > 0 && count % 3 == 0 && ch != '-' {
                    result.push(',');
                }
                result.push(ch);
            }
            result.chars().rev().collect()
        } else {
            format!("{quantity:.3}")
        }
    }

    /// Render one grouping map as a two-column table
    fn grouping_table(title: &str, groups: &std::collections::BTreeMap<String, f64>) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![b -> title, b -> "kg CO2e"]);
        for (key, kg) in groups {
            table.add_row(row![key, r -> Self::format_kg(*kg)]);
        }
        table.to_string()
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableFormatter {
    fn format_report(&self, report: &AggregateReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} kg CO2e across {} activities\n\n",
            "Total:".bold(),
            Self::format_kg(report.total).bold(),
            report.items.len()
        ));

        output.push_str(&Self::grouping_table("By Channel", &report.by_channel));
        output.push('\n');
        output.push_str(&Self::grouping_table("By Market", &report.by_market));
        output.push('\n');
        output.push_str(&Self::grouping_table("By Scope", &report.by_scope));
        output.push('\n');
        output.push_str(&Self::grouping_table("By Category", &report.by_category));

        output
    }

    fn format_items(&self, items: &[CalculationResult]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Activity",
            b -> "Channel",
            b -> "Market",
            b -> "Scope",
            b -> "Category",
            b -> "Quantity",
            b -> "kg CO2e"
        ]);

        let mut total = 0.0;
        for item in items {
            total += item.total_emissions;
            table.add_row(row![
                item.factor_used.sub_activity,
                item.channel,
                item.market,
                item.scope,
                item.category,
                r -> format!(
                    "{} {}",
                    Self::format_quantity(item.normalized_quantity),
                    item.factor_used.unit
                ),
                r -> Self::format_kg(item.total_emissions)
            ]);
        }
        table.add_row(row![b -> "TOTAL", "", "", "", "", "", rb -> Self::format_kg(total)]);

        table.to_string()
    }

    fn format_factors(&self, version: &str, factors: &[EmissionFactor]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Category",
            b -> "Sub-activity",
            b -> "Region",
            b -> "Unit",
            b -> "kg CO2e / unit",
            b -> "Valid from",
            b -> "Source"
        ]);

        for factor in factors {
            table.add_row(row![
                factor.category,
                factor.sub_activity,
                factor.region,
                factor.unit,
                r -> format!("{}", factor.factor_kg_per_unit),
                factor.valid_from,
                factor.source
            ]);
        }

        format!("Factor dataset {version}\n{table}")
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Create a new JsonFormatter
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &AggregateReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    fn format_items(&self, items: &[CalculationResult]) -> String {
        serde_json::to_string_pretty(items).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    fn format_factors(&self, version: &str, factors: &[EmissionFactor]) -> String {
        let value = json!({
            "version": version,
            "factors": factors,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Get the appropriate formatter based on output preference
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter::new())
    } else {
        Box::new(TableFormatter::new())
    }
}
