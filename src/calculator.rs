//! Emission calculator module
//!
//! Orchestrates classification, factor lookup, and unit normalization to
//! turn one activity record into a kg CO₂e figure, following the GHG
//! Protocol corporate accounting methodology.
//!
//! The calculator is stateless per call: concurrent calculations share the
//! same immutable registry snapshot and need no synchronization. A failed
//! calculation surfaces a typed error; there is no fallback estimate here.

use crate::classifier;
use crate::error::Result;
use crate::factors::FactorRegistry;
use crate::types::{ActivityInput, CalculationResult, EmissionFactor};
use crate::units;
use std::sync::Arc;
use tracing::{debug, warn};

/// Calculates emissions for activity records against a factor registry
pub struct EmissionCalculator {
    /// Factor registry instance
    registry: Arc<FactorRegistry>,
}

impl EmissionCalculator {
    /// Create a new EmissionCalculator
    pub fn new(registry: Arc<FactorRegistry>) -> Self {
        Self { registry }
    }

    /// Calculate emissions for one activity record.
    ///
    /// Steps: validate the input, classify it into a scope and category,
    /// resolve the factor valid for the activity's market and date,
    /// normalize the quantity into the factor's canonical unit, then apply
    /// `factor × quantity` with the market grid adjustment where the factor
    /// calls for one.
    ///
    /// A caller-provided scope hint is validated against the classifier's
    /// scope; on mismatch the computed scope wins and the discrepancy is
    /// logged as a warning.
    ///
    /// # Errors
    ///
    /// Any failure aborts the calculation with a typed error — never a
    /// defaulted or estimated result.
    pub async fn calculate_with_ghg_protocol(
        &self,
        input: &ActivityInput,
    ) -> Result<CalculationResult> {
        input.validate()?;

        let classification = classifier::classify(&input.activity_type, &input.channel)?;

        if let Some(hint) = input.scope {
            if hint != classification.scope {
                warn!(
                    "Scope hint {} for {} does not match computed {}; using computed scope",
                    hint, input.activity_type, classification.scope
                );
            }
        }

        let factor = self
            .registry
            .lookup(
                &classification.category,
                &input.activity_type,
                &input.market,
                input.date,
            )
            .await?;

        let normalized_quantity = units::normalize(input.quantity, &input.unit, &factor.unit)?;

        let market_multiplier = if factor.market_adjusted {
            self.registry.grid_multiplier(&input.market).await?
        } else {
            1.0
        };

        let total_emissions = Self::emissions_from_factor(normalized_quantity, &factor, market_multiplier);

        debug!(
            "Calculated {:.5} kg CO2e for {} x {} {} ({}, multiplier {})",
            total_emissions,
            input.activity_type,
            input.quantity,
            input.unit,
            input.market,
            market_multiplier
        );

        Ok(CalculationResult {
            total_emissions,
            scope: classification.scope,
            category: classification.category,
            factor_used: factor,
            normalized_quantity,
            market: input.market.clone(),
            channel: input.channel.clone(),
            campaign: input.campaign.clone(),
        })
    }

    /// Apply a resolved factor to a normalized quantity.
    ///
    /// Pure arithmetic, kept separate so tests and benchmarks can exercise
    /// the hot path without a registry.
    pub fn emissions_from_factor(
        normalized_quantity: f64,
        factor: &EmissionFactor,
        market_multiplier: f64,
    ) -> f64 {
        normalized_quantity * factor.factor_kg_per_unit * market_multiplier
    }
}
