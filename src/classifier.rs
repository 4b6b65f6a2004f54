//! GHG Protocol scope classification
//!
//! Maps an activity type to its protocol scope (1, 2 or 3) and canonical
//! emission category via a deterministic static table. The channel does not
//! influence classification; it is a reporting dimension carried through to
//! aggregation.

use crate::error::{EmistatError, Result};
use crate::types::{ActivityType, Category, Channel, Scope};
use tracing::debug;

/// Scope and category assigned to an activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// GHG Protocol scope
    pub scope: Scope,
    /// Canonical category string, matching the factor registry's categories
    pub category: Category,
}

/// Classification table: activity type -> (category, scope).
///
/// Activity-type keys are matched case-insensitively. The categories here
/// are exactly the category keys of the factor registry.
const CLASSIFICATION_TABLE: &[(&str, &str, Scope)] = &[
    ("Impressions", "digital-advertising", Scope::ValueChain),
    ("Clicks", "digital-advertising", Scope::ValueChain),
    ("EmailsSent", "email-marketing", Scope::ValueChain),
    ("CloudComputeHours", "cloud-computing", Scope::ValueChain),
    ("DataTransfer", "data-transfer", Scope::ValueChain),
    ("CdnTransfer", "data-transfer", Scope::ValueChain),
    ("FlightDistance", "business-travel-air", Scope::ValueChain),
    ("RailDistance", "business-travel-rail", Scope::ValueChain),
    ("FleetVehicleDistance", "mobile-combustion", Scope::Direct),
    ("OfficeElectricity", "purchased-electricity", Scope::PurchasedEnergy),
    ("OfficeHeating", "stationary-combustion", Scope::Direct),
    ("GeneratorFuel", "stationary-combustion", Scope::Direct),
    ("LubricantVolume", "lubricants-and-oils", Scope::Direct),
];

/// Classify an activity into a GHG Protocol scope and category.
///
/// # Errors
///
/// Returns [`EmistatError::UnclassifiedActivity`] when the activity type has
/// no table entry. This signals a data-completeness gap, not a user error.
///
/// # Examples
/// ```
/// use emistat::classifier::classify;
/// use emistat::types::{ActivityType, Channel, Scope};
///
/// let c = classify(&ActivityType::new("Impressions"), &Channel::new("Google Ads")).unwrap();
/// assert_eq!(c.scope, Scope::ValueChain);
/// assert_eq!(c.category.as_str(), "digital-advertising");
/// ```
pub fn classify(activity_type: &ActivityType, channel: &Channel) -> Result<Classification> {
    let entry = CLASSIFICATION_TABLE
        .iter()
        .find(|(name, _, _)| activity_type.matches(name));

    match entry {
        Some((name, category, scope)) => {
            debug!(
                "Classified {} (channel {}) as {} / {}",
                name, channel, scope, category
            );
            Ok(Classification {
                scope: *scope,
                category: Category::new(*category),
            })
        }
        None => Err(EmistatError::UnclassifiedActivity(activity_type.clone())),
    }
}

/// All activity types the classifier knows about
pub fn known_activity_types() -> impl Iterator<Item = &'static str> {
    CLASSIFICATION_TABLE.iter().map(|(name, _, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_type(name: &str) -> Result<Classification> {
        classify(&ActivityType::new(name), &Channel::new("test-channel"))
    }

    #[test]
    fn test_scope3_activities() {
        for name in ["Impressions", "CloudComputeHours", "FlightDistance"] {
            let c = classify_type(name).unwrap();
            assert_eq!(c.scope, Scope::ValueChain, "{name}");
        }
    }

    #[test]
    fn test_scope2_electricity() {
        let c = classify_type("OfficeElectricity").unwrap();
        assert_eq!(c.scope, Scope::PurchasedEnergy);
        assert_eq!(c.category.as_str(), "purchased-electricity");
    }

    #[test]
    fn test_scope1_direct_sources() {
        for name in ["FleetVehicleDistance", "OfficeHeating", "LubricantVolume"] {
            let c = classify_type(name).unwrap();
            assert_eq!(c.scope, Scope::Direct, "{name}");
        }
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let c = classify_type("impressions").unwrap();
        assert_eq!(c.category.as_str(), "digital-advertising");
    }

    #[test]
    fn test_unknown_activity_rejected() {
        let err = classify_type("NotARealActivity").unwrap_err();
        assert!(matches!(err, EmistatError::UnclassifiedActivity(_)));
        assert_eq!(err.kind(), "unclassified_activity");
    }

    #[test]
    fn test_classification_is_deterministic() {
        let a = classify_type("DataTransfer").unwrap();
        let b = classify_type("DataTransfer").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_known_activity_types_listed() {
        let names: Vec<_> = known_activity_types().collect();
        assert!(names.contains(&"Impressions"));
        assert!(names.contains(&"GeneratorFuel"));
    }
}
