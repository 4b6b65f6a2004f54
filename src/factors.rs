//! Emission factor registry
//!
//! Resolves `(category, sub-activity, region, date)` to the best-matching
//! emission factor entry. The dataset is loaded once and cached for the
//! process lifetime; factor updates ship as data, not code.
//!
//! Dataset resolution order:
//! 1. an explicit file set with [`FactorRegistry::with_source_file`]
//! 2. the `EMISTAT_FACTORS_PATH` environment variable
//! 3. `<config_dir>/emistat/factors.json`
//! 4. the published dataset URL (skipped in offline mode)
//! 5. the embedded dataset compiled into the binary

use crate::error::{EmistatError, Result};
use crate::types::{ActivityDate, ActivityType, Category, EmissionFactor, FactorTable, Market};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Published factor dataset URL
const FACTOR_DATASET_URL: &str =
    "https://raw.githubusercontent.com/emistat/ghg-factors/main/factors.json";

/// Embedded factor dataset for offline mode
const EMBEDDED_FACTORS: &str = include_str!("../embedded/factors.json");

/// Environment variable overriding the dataset location
const FACTORS_PATH_ENV: &str = "EMISTAT_FACTORS_PATH";

/// Loads and caches the emission factor dataset
///
/// The registry is cheap to share (`Arc`) and safe for concurrent lookups:
/// the dataset is loaded once behind an `RwLock` and never mutated after.
pub struct FactorRegistry {
    /// Cached dataset snapshot
    cache: Arc<RwLock<Option<FactorTable>>>,
    /// Whether to skip the remote fetch
    offline_mode: bool,
    /// Explicit dataset file, when set
    source_file: Option<PathBuf>,
    /// HTTP client
    client: reqwest::Client,
}

impl FactorRegistry {
    /// Create a new FactorRegistry
    pub async fn new(offline: bool) -> Self {
        Self {
            cache: Arc::new(RwLock::new(None)),
            offline_mode: offline,
            source_file: None,
            client: reqwest::Client::new(),
        }
    }

    /// Use an explicit dataset file instead of discovery/fetching
    pub fn with_source_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_file = Some(path.into());
        self
    }

    /// Resolve the best-matching factor for an activity.
    ///
    /// Region-specific entries take precedence over `"GLOBAL"` entries for
    /// the same category/sub-activity; among the matching entries, the one
    /// with the latest `valid_from <= as_of` wins.
    ///
    /// # Errors
    ///
    /// - [`EmistatError::FactorNotFound`] when no entry matches the
    ///   category/sub-activity for the requested region or `"GLOBAL"`.
    /// - [`EmistatError::StaleFactorSet`] when entries exist but all are
    ///   newer than `as_of`.
    pub async fn lookup(
        &self,
        category: &Category,
        sub_activity: &ActivityType,
        region: &Market,
        as_of: ActivityDate,
    ) -> Result<EmissionFactor> {
        self.ensure_loaded().await?;

        let cache = self.cache.read().await;
        let table = cache.as_ref().ok_or_else(Self::not_loaded)?;
        Self::find_factor(table, category, sub_activity, region, as_of).cloned()
    }

    /// Grid carbon-intensity index for a market, 1.0 when none is defined
    pub async fn grid_multiplier(&self, market: &Market) -> Result<f64> {
        self.ensure_loaded().await?;

        let cache = self.cache.read().await;
        let table = cache.as_ref().ok_or_else(Self::not_loaded)?;
        Ok(Self::find_grid_multiplier(table, market))
    }

    /// A clone of the loaded dataset snapshot
    pub async fn table(&self) -> Result<FactorTable> {
        self.ensure_loaded().await?;

        let cache = self.cache.read().await;
        Ok(cache.as_ref().ok_or_else(Self::not_loaded)?.clone())
    }

    fn not_loaded() -> EmistatError {
        EmistatError::Config("factor dataset not loaded".to_string())
    }

    /// Drop the cached dataset and reload on next access
    pub async fn refresh(&self) -> Result<()> {
        let mut cache = self.cache.write().await;
        *cache = None;
        drop(cache);

        self.ensure_loaded().await
    }

    /// Ensure the dataset is loaded
    async fn ensure_loaded(&self) -> Result<()> {
        {
            let cache = self.cache.read().await;
            if cache.is_some() {
                return Ok(());
            }
        }

        let mut cache = self.cache.write().await;
        if cache.is_some() {
            return Ok(());
        }

        let table = self.load_table().await?;
        info!(
            "Loaded factor dataset {} ({} entries, {} grid regions)",
            table.version,
            table.factors.len(),
            table.grid_intensity.len()
        );
        *cache = Some(table);
        Ok(())
    }

    /// Load the dataset following the resolution order
    async fn load_table(&self) -> Result<FactorTable> {
        if let Some(path) = &self.source_file {
            return Self::load_from_file(path.clone()).await;
        }

        if let Ok(env_path) = std::env::var(FACTORS_PATH_ENV) {
            return Self::load_from_file(PathBuf::from(env_path)).await;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("emistat").join("factors.json");
            if config_path.exists() {
                return Self::load_from_file(config_path).await;
            }
        }

        if !self.offline_mode {
            match self.fetch_remote().await {
                Ok(table) => {
                    info!("Fetched factor dataset from {FACTOR_DATASET_URL}");
                    return Ok(table);
                }
                Err(e) => {
                    warn!("Failed to fetch factor dataset: {e}, using embedded data");
                }
            }
        } else {
            info!("Using embedded factor dataset (offline mode)");
        }

        Self::parse_table(EMBEDDED_FACTORS)
    }

    /// Load and validate a dataset file
    async fn load_from_file(path: PathBuf) -> Result<FactorTable> {
        debug!("Loading factor dataset from {}", path.display());
        let contents = tokio::fs::read_to_string(&path).await?;
        Self::parse_table(&contents).map_err(|e| EmistatError::Parse {
            file: path,
            error: e.to_string(),
        })
    }

    /// Fetch the published dataset
    async fn fetch_remote(&self) -> Result<FactorTable> {
        let response = self.client.get(FACTOR_DATASET_URL).send().await?;
        let body = response.text().await?;
        Self::parse_table(&body)
    }

    /// Parse and validate a dataset
    fn parse_table(data: &str) -> Result<FactorTable> {
        let table: FactorTable = serde_json::from_str(data)?;
        Self::validate_table(&table)?;
        Ok(table)
    }

    /// Reject datasets that would produce nonsense results
    fn validate_table(table: &FactorTable) -> Result<()> {
        if table.factors.is_empty() {
            return Err(EmistatError::Config(
                "factor dataset contains no entries".to_string(),
            ));
        }

        for factor in &table.factors {
            if !factor.factor_kg_per_unit.is_finite() || factor.factor_kg_per_unit < 0.0 {
                return Err(EmistatError::Config(format!(
                    "factor for {}/{} ({}) has invalid value {}",
                    factor.category, factor.sub_activity, factor.region, factor.factor_kg_per_unit
                )));
            }
        }

        for (region, index) in &table.grid_intensity {
            if !index.is_finite() || *index < 0.0 {
                return Err(EmistatError::Config(format!(
                    "grid intensity for {region} has invalid value {index}"
                )));
            }
        }

        Ok(())
    }

    /// Pure lookup over a dataset snapshot
    pub fn find_factor<'a>(
        table: &'a FactorTable,
        category: &Category,
        sub_activity: &ActivityType,
        region: &Market,
        as_of: ActivityDate,
    ) -> Result<&'a EmissionFactor> {
        let candidates: Vec<&EmissionFactor> = table
            .factors
            .iter()
            .filter(|f| {
                f.category.matches(category.as_str()) && f.sub_activity.matches(sub_activity.as_str())
            })
            .collect();

        if candidates.is_empty() {
            return Err(EmistatError::FactorNotFound {
                category: category.clone(),
                sub_activity: sub_activity.clone(),
            });
        }

        let regional: Vec<&EmissionFactor> = candidates
            .iter()
            .copied()
            .filter(|f| f.region.matches(region.as_str()))
            .collect();

        let pool: Vec<&EmissionFactor> = if regional.is_empty() {
            candidates
                .iter()
                .copied()
                .filter(|f| f.region.is_global())
                .collect()
        } else {
            regional
        };

        // Entries exist only for other regions; still a registry gap
        if pool.is_empty() {
            return Err(EmistatError::FactorNotFound {
                category: category.clone(),
                sub_activity: sub_activity.clone(),
            });
        }

        match pool
            .iter()
            .copied()
            .filter(|f| f.valid_from <= as_of)
            .max_by_key(|f| f.valid_from)
        {
            Some(factor) => {
                debug!(
                    "Resolved factor {}/{} ({}, valid from {}) for {}",
                    factor.category, factor.sub_activity, factor.region, factor.valid_from, as_of
                );
                Ok(factor)
            }
            None => {
                let earliest = pool.iter().map(|f| f.valid_from).min().unwrap_or(as_of);
                Err(EmistatError::StaleFactorSet {
                    category: category.clone(),
                    sub_activity: sub_activity.clone(),
                    requested: as_of,
                    earliest,
                })
            }
        }
    }

    /// Pure grid-index lookup over a dataset snapshot
    pub fn find_grid_multiplier(table: &FactorTable, market: &Market) -> f64 {
        table
            .grid_intensity
            .iter()
            .find(|(region, _)| market.matches(region))
            .map(|(_, index)| *index)
            .unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Unit;

    fn date(s: &str) -> ActivityDate {
        s.parse().unwrap()
    }

    fn entry(
        category: &str,
        sub_activity: &str,
        region: &str,
        factor: f64,
        valid_from: &str,
    ) -> EmissionFactor {
        EmissionFactor {
            category: Category::new(category),
            sub_activity: ActivityType::new(sub_activity),
            region: Market::new(region),
            unit: Unit::new("kwh"),
            factor_kg_per_unit: factor,
            valid_from: date(valid_from),
            source: "fixture".to_string(),
            market_adjusted: false,
        }
    }

    fn fixture_table() -> FactorTable {
        FactorTable {
            version: "test".to_string(),
            grid_intensity: [("US".to_string(), 0.85), ("FR".to_string(), 0.13)]
                .into_iter()
                .collect(),
            factors: vec![
                entry("cloud-computing", "CloudComputeHours", "GLOBAL", 0.05, "2023-01-01"),
                entry("cloud-computing", "CloudComputeHours", "GLOBAL", 0.04, "2024-01-01"),
                entry("cloud-computing", "CloudComputeHours", "EU", 0.03, "2023-01-01"),
                entry("business-travel-rail", "RailDistance", "GB", 0.035, "2023-01-01"),
            ],
        }
    }

    #[test]
    fn test_region_overrides_global() {
        let table = fixture_table();
        let factor = FactorRegistry::find_factor(
            &table,
            &Category::new("cloud-computing"),
            &ActivityType::new("CloudComputeHours"),
            &Market::new("EU"),
            date("2024-06-01"),
        )
        .unwrap();
        assert_eq!(factor.factor_kg_per_unit, 0.03);
    }

    #[test]
    fn test_unknown_region_falls_back_to_global() {
        let table = fixture_table();
        let factor = FactorRegistry::find_factor(
            &table,
            &Category::new("cloud-computing"),
            &ActivityType::new("CloudComputeHours"),
            &Market::new("Unknown Region"),
            date("2024-06-01"),
        )
        .unwrap();
        assert!(factor.region.is_global());
        assert_eq!(factor.factor_kg_per_unit, 0.04);
    }

    #[test]
    fn test_latest_version_at_date_wins() {
        let table = fixture_table();
        let factor = FactorRegistry::find_factor(
            &table,
            &Category::new("cloud-computing"),
            &ActivityType::new("CloudComputeHours"),
            &Market::new("US"),
            date("2023-06-01"),
        )
        .unwrap();
        // 2024 revision not yet valid in mid-2023
        assert_eq!(factor.factor_kg_per_unit, 0.05);
    }

    #[test]
    fn test_date_before_earliest_is_stale() {
        let table = fixture_table();
        let err = FactorRegistry::find_factor(
            &table,
            &Category::new("cloud-computing"),
            &ActivityType::new("CloudComputeHours"),
            &Market::new("US"),
            date("2022-06-01"),
        )
        .unwrap_err();
        assert!(matches!(err, EmistatError::StaleFactorSet { .. }));
        assert_eq!(err.kind(), "stale_factor_set");
    }

    #[test]
    fn test_missing_category_is_not_found() {
        let table = fixture_table();
        let err = FactorRegistry::find_factor(
            &table,
            &Category::new("no-such-category"),
            &ActivityType::new("CloudComputeHours"),
            &Market::new("US"),
            date("2024-06-01"),
        )
        .unwrap_err();
        assert!(matches!(err, EmistatError::FactorNotFound { .. }));
    }

    #[test]
    fn test_region_only_entries_without_global_are_not_found_elsewhere() {
        let table = fixture_table();
        // RailDistance only has a GB entry in the fixture
        let err = FactorRegistry::find_factor(
            &table,
            &Category::new("business-travel-rail"),
            &ActivityType::new("RailDistance"),
            &Market::new("US"),
            date("2024-06-01"),
        )
        .unwrap_err();
        assert!(matches!(err, EmistatError::FactorNotFound { .. }));
    }

    #[test]
    fn test_grid_multiplier_defaults_to_one() {
        let table = fixture_table();
        assert_eq!(
            FactorRegistry::find_grid_multiplier(&table, &Market::new("us")),
            0.85
        );
        assert_eq!(
            FactorRegistry::find_grid_multiplier(&table, &Market::new("Unknown Region")),
            1.0
        );
    }

    #[test]
    fn test_embedded_dataset_parses_and_validates() {
        let table = FactorRegistry::parse_table(EMBEDDED_FACTORS).unwrap();
        assert!(!table.factors.is_empty());
        assert!(table.grid_intensity.contains_key("GLOBAL"));
    }

    #[test]
    fn test_negative_factor_rejected() {
        let mut table = fixture_table();
        table.factors[0].factor_kg_per_unit = -1.0;
        let json = serde_json::to_string(&table).unwrap();
        let err = FactorRegistry::parse_table(&json).unwrap_err();
        assert!(matches!(err, EmistatError::Config(_)));
    }

    #[tokio::test]
    async fn test_offline_registry_lookup() {
        let registry = FactorRegistry::new(true).await;
        let factor = registry
            .lookup(
                &Category::new("digital-advertising"),
                &ActivityType::new("Impressions"),
                &Market::new("US"),
                date("2025-01-15"),
            )
            .await
            .unwrap();
        assert_eq!(factor.region.as_str(), "US");
    }
}
