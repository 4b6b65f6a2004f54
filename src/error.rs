//! Error types for emistat
//!
//! This module defines the error types used throughout the emistat library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! Calculation failures are typed so callers can decide between surfacing an
//! error, retrying, or falling back to an explicitly-labeled estimate. The
//! engine itself never substitutes a guessed number for a failed calculation.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{ActivityType, Category, Unit};

/// Main error type for emistat operations
///
/// This enum encompasses all possible errors that can occur during emistat
/// operations, from calculation failures to IO errors and dataset problems.
#[derive(Error, Debug)]
pub enum EmistatError {
    /// Activity type has no scope/category mapping; a classifier-table gap
    #[error("Unclassified activity type: {0}")]
    UnclassifiedActivity(ActivityType),

    /// No emission factor exists for the category/sub-activity; a registry gap
    #[error("No emission factor for category '{category}', sub-activity '{sub_activity}'")]
    FactorNotFound {
        /// The classified category
        category: Category,
        /// The sub-activity looked up within the category
        sub_activity: ActivityType,
    },

    /// The submitted unit cannot be converted to the factor's canonical unit
    #[error("Unsupported unit conversion: '{from}' -> '{to}'")]
    UnsupportedUnit {
        /// Unit the quantity was submitted in
        from: Unit,
        /// Canonical unit the factor requires
        to: Unit,
    },

    /// Requested date precedes the earliest factor version for the category
    #[error(
        "No factor version for category '{category}', sub-activity '{sub_activity}' valid at {requested} (earliest is {earliest})"
    )]
    StaleFactorSet {
        /// The classified category
        category: Category,
        /// The sub-activity looked up within the category
        sub_activity: ActivityType,
        /// The activity date the lookup was for
        requested: crate::types::ActivityDate,
        /// Earliest valid-from date available for the candidates
        earliest: crate::types::ActivityDate,
    },

    /// Quantity is negative or not finite
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(f64),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No activity data file or directory found
    #[error("No activity data found at {0}")]
    NoActivityData(PathBuf),

    /// Factor dataset failed validation
    #[error("Factor dataset error: {0}")]
    Config(String),

    /// Parse error with file context
    #[error("Parse error in {file}: {error}")]
    Parse {
        /// The file that caused the error
        file: PathBuf,
        /// The error message
        error: String,
    },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl EmistatError {
    /// Stable machine-readable error kind
    ///
    /// API-layer consumers branch on this string instead of matching display
    /// text, which is free to change.
    ///
    /// # Examples
    /// ```
    /// use emistat::error::EmistatError;
    /// use emistat::types::ActivityType;
    ///
    /// let err = EmistatError::UnclassifiedActivity(ActivityType::new("NotARealActivity"));
    /// assert_eq!(err.kind(), "unclassified_activity");
    /// ```
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnclassifiedActivity(_) => "unclassified_activity",
            Self::FactorNotFound { .. } => "factor_not_found",
            Self::UnsupportedUnit { .. } => "unsupported_unit",
            Self::StaleFactorSet { .. } => "stale_factor_set",
            Self::InvalidQuantity(_) => "invalid_quantity",
            Self::InvalidDate(_) => "invalid_date",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NoActivityData(_) => "no_activity_data",
            Self::Config(_) => "config",
            Self::Parse { .. } => "parse",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
            Self::Network(_) => "network",
        }
    }
}

/// Convenience type alias for Results in emistat
///
/// # Example
///
/// ```
/// use emistat::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, EmistatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = EmistatError::UnclassifiedActivity(ActivityType::new("NotARealActivity"));
        assert_eq!(
            error.to_string(),
            "Unclassified activity type: NotARealActivity"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let emistat_error: EmistatError = io_error.into();
        assert!(matches!(emistat_error, EmistatError::Io(_)));
        assert_eq!(emistat_error.kind(), "io");
    }

    #[test]
    fn test_unsupported_unit_kind() {
        let error = EmistatError::UnsupportedUnit {
            from: Unit::new("unknown_unit"),
            to: Unit::new("kwh"),
        };
        assert_eq!(error.kind(), "unsupported_unit");
    }
}
