//! Common test utilities and helpers for emistat tests
//!
//! This module provides reusable fixture builders and helper functions to
//! make testing easier and more consistent.

use emistat::{
    calculator::EmissionCalculator,
    factors::FactorRegistry,
    types::{ActivityInput, ActivityType, Channel, Market, Scope, Unit},
};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Common test markets used across tests
#[allow(dead_code)]
pub const TEST_MARKETS: &[&str] = &["US", "EU", "GB", "DE", "FR"];

/// Common test channels
#[allow(dead_code)]
pub const TEST_CHANNELS: &[&str] = &["Google Ads", "Meta Ads", "AWS", "Travel", "Facilities"];

/// A small standalone factor dataset used by file-based registry tests
pub static FIXTURE_DATASET: Lazy<String> = Lazy::new(|| {
    serde_json::json!({
        "version": "fixture-1",
        "gridIntensity": { "GLOBAL": 1.0, "US": 0.85, "FR": 0.13 },
        "factors": [
            {
                "category": "digital-advertising",
                "subActivity": "Impressions",
                "region": "GLOBAL",
                "unit": "impression",
                "factorKgPerUnit": 0.0005,
                "validFrom": "2023-01-01",
                "source": "fixture"
            },
            {
                "category": "purchased-electricity",
                "subActivity": "OfficeElectricity",
                "region": "GLOBAL",
                "unit": "kwh",
                "factorKgPerUnit": 0.4,
                "validFrom": "2023-01-01",
                "source": "fixture",
                "marketAdjusted": true
            }
        ]
    })
    .to_string()
});

/// Build an activity record from the fields tests care about
pub fn create_test_activity(
    activity_type: &str,
    channel: &str,
    market: &str,
    quantity: f64,
    unit: &str,
    date: &str,
) -> ActivityInput {
    ActivityInput {
        activity_type: ActivityType::new(activity_type),
        channel: Channel::new(channel),
        market: Market::new(market),
        quantity,
        unit: Unit::new(unit),
        scope: None,
        date: date.parse().unwrap(),
        campaign: None,
    }
}

/// Build an activity record carrying a scope hint and campaign tag
#[allow(dead_code)]
pub fn create_tagged_activity(
    activity_type: &str,
    channel: &str,
    market: &str,
    quantity: f64,
    unit: &str,
    date: &str,
    scope: Scope,
    campaign: &str,
) -> ActivityInput {
    let mut activity = create_test_activity(activity_type, channel, market, quantity, unit, date);
    activity.scope = Some(scope);
    activity.campaign = Some(campaign.to_string());
    activity
}

/// An offline calculator over the embedded dataset
pub async fn offline_calculator() -> Arc<EmissionCalculator> {
    let registry = Arc::new(FactorRegistry::new(true).await);
    Arc::new(EmissionCalculator::new(registry))
}
