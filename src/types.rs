//! Core domain types for emistat
//!
//! This module contains the fundamental types used throughout the emistat
//! library. These types provide strong typing for common concepts like
//! activity types, channels, markets, GHG Protocol scopes, and emission
//! factors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Decimal places applied to emission figures at the serialization boundary.
///
/// In-memory values keep full precision so aggregation never accumulates
/// rounding error; only serialized output is rounded.
pub const EMISSION_PRECISION: u32 = 5;

/// Round an emission figure to the presentation precision.
///
/// # Examples
/// ```
/// use emistat::types::round_emissions;
///
/// assert_eq!(round_emissions(0.123456789), 0.12346);
/// assert_eq!(round_emissions(7.1), 7.1);
/// ```
pub fn round_emissions(kg: f64) -> f64 {
    let scale = 10f64.powi(EMISSION_PRECISION as i32);
    (kg * scale).round() / scale
}

pub(crate) fn serialize_rounded<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(round_emissions(*value))
}

pub(crate) fn serialize_rounded_map<S>(
    map: &BTreeMap<String, f64>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_map(map.iter().map(|(k, v)| (k, round_emissions(*v))))
}

/// Strongly-typed activity type wrapper
///
/// This ensures activity type names are consistently handled throughout the
/// application and provides type safety when working with activity
/// identifiers. Matching against classifier and registry tables is
/// case-insensitive; the original casing is preserved for display.
///
/// # Examples
/// ```
/// use emistat::types::ActivityType;
///
/// let activity = ActivityType::new("Impressions");
/// assert_eq!(activity.as_str(), "Impressions");
/// assert!(activity.matches("impressions"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityType(String);

impl ActivityType {
    /// Create a new ActivityType from any string-like type
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against another activity type name
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strongly-typed marketing/operational channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Channel(String);

impl Channel {
    /// Create a new Channel
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Channel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Geographic market used to select regional factors and grid intensity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Market(String);

impl Market {
    /// Region key for entries that apply everywhere
    pub const GLOBAL: &'static str = "GLOBAL";

    /// Create a new Market
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this market is the GLOBAL fallback region
    pub fn is_global(&self) -> bool {
        self.0.eq_ignore_ascii_case(Self::GLOBAL)
    }

    /// Case-insensitive comparison against a region name
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical emission category assigned by the scope classifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Category(String);

impl Category {
    /// Create a new Category
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a category name
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Measurement unit key ("impression", "gb", "km", "kwh", "litre", ...)
///
/// Unit keys are case-insensitive on the wire, so the inner value is
/// lowercased on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Unit(String);

impl Unit {
    /// Create a new Unit, normalizing to lowercase
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().to_lowercase())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Unit {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// GHG Protocol scope
///
/// Serialized as the protocol's scope number (1, 2 or 3).
///
/// # Examples
/// ```
/// use emistat::types::Scope;
///
/// let scope = Scope::try_from(3u8).unwrap();
/// assert_eq!(scope, Scope::ValueChain);
/// assert_eq!(scope.number(), 3);
/// assert_eq!(scope.key(), "scope3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Scope {
    /// Scope 1: direct emissions from owned or controlled sources
    Direct,
    /// Scope 2: indirect emissions from purchased energy
    PurchasedEnergy,
    /// Scope 3: all other value-chain emissions
    ValueChain,
}

impl Scope {
    /// The protocol scope number
    pub fn number(self) -> u8 {
        match self {
            Self::Direct => 1,
            Self::PurchasedEnergy => 2,
            Self::ValueChain => 3,
        }
    }

    /// Stable grouping key used in report maps
    pub fn key(self) -> &'static str {
        match self {
            Self::Direct => "scope1",
            Self::PurchasedEnergy => "scope2",
            Self::ValueChain => "scope3",
        }
    }
}

impl TryFrom<u8> for Scope {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Direct),
            2 => Ok(Self::PurchasedEnergy),
            3 => Ok(Self::ValueChain),
            other => Err(format!("Invalid GHG scope: {other}")),
        }
    }
}

impl From<Scope> for u8 {
    fn from(scope: Scope) -> Self {
        scope.number()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scope {}", self.number())
    }
}

/// ISO-8601 calendar date of an activity occurrence
///
/// Used to select the emission-factor version valid at that date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActivityDate(NaiveDate);

impl ActivityDate {
    /// Create a new ActivityDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl std::str::FromStr for ActivityDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<NaiveDate>().map(Self)
    }
}

impl fmt::Display for ActivityDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// One unit of user-submitted activity data
///
/// This is the wire format accepted from callers, so field names follow the
/// JSON contract (`activityType`, `quantity`, `unit`, ...).
///
/// # Examples
/// ```
/// use emistat::types::ActivityInput;
///
/// let input: ActivityInput = serde_json::from_str(
///     r#"{
///         "activityType": "Impressions",
///         "channel": "Google Ads",
///         "market": "US",
///         "quantity": 10000,
///         "unit": "impression",
///         "scope": 3,
///         "date": "2025-01-15",
///         "campaign": "spring-launch"
///     }"#,
/// ).unwrap();
/// assert_eq!(input.quantity, 10000.0);
/// assert!(input.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInput {
    /// Kind of activity, e.g. "Impressions", "CloudComputeHours"
    pub activity_type: ActivityType,
    /// Marketing/operational channel grouping, e.g. "Google Ads", "AWS"
    pub channel: Channel,
    /// Geographic market/country code
    pub market: Market,
    /// Non-negative amount in `unit`
    pub quantity: f64,
    /// Unit key the quantity is expressed in
    pub unit: Unit,
    /// Optional caller scope hint; the classifier's scope wins on mismatch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    /// Activity occurrence date
    pub date: ActivityDate,
    /// Optional campaign tag, passed through unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
}

impl ActivityInput {
    /// Check the input invariants that do not require reference data
    ///
    /// # Errors
    ///
    /// Returns [`crate::EmistatError::InvalidQuantity`] when the quantity is
    /// negative or not finite.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(crate::EmistatError::InvalidQuantity(self.quantity));
        }
        Ok(())
    }
}

/// Immutable emission-factor reference data
///
/// One entry of the factor registry: kg CO₂e per canonical unit for a
/// (category, sub-activity, region) combination, valid from a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionFactor {
    /// Emission category this factor belongs to
    pub category: Category,
    /// Sub-activity within the category (the activity type)
    pub sub_activity: ActivityType,
    /// Region the factor applies to, or "GLOBAL"
    pub region: Market,
    /// Canonical unit the factor is defined against
    pub unit: Unit,
    /// kg CO₂e per canonical unit
    pub factor_kg_per_unit: f64,
    /// First date this factor version is valid for
    pub valid_from: ActivityDate,
    /// Citation/version tag for the published factor set
    pub source: String,
    /// Whether the factor is scaled by the market's grid-intensity index
    #[serde(default)]
    pub market_adjusted: bool,
}

/// A loaded emission-factor dataset snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorTable {
    /// Dataset release tag
    pub version: String,
    /// Relative grid carbon-intensity index per region (1.0 = world average)
    #[serde(default)]
    pub grid_intensity: BTreeMap<String, f64>,
    /// Factor entries
    pub factors: Vec<EmissionFactor>,
}

/// Output for one calculated activity
///
/// Owned by the caller after return; the engine keeps no shared state.
/// `totalEmissions` is rounded to [`EMISSION_PRECISION`] decimal places when
/// serialized; the in-memory value keeps full precision for aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    /// Emissions for this activity in kg CO₂e
    #[serde(serialize_with = "serialize_rounded")]
    pub total_emissions: f64,
    /// GHG Protocol scope assigned by the classifier
    pub scope: Scope,
    /// Canonical category assigned by the classifier
    pub category: Category,
    /// The factor entry the calculation used
    pub factor_used: EmissionFactor,
    /// Quantity after conversion to the factor's canonical unit
    pub normalized_quantity: f64,
    /// Market the activity occurred in
    pub market: Market,
    /// Channel the activity belongs to
    pub channel: Channel,
    /// Campaign tag passed through from the input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
}
