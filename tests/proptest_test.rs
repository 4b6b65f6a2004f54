//! Property-based tests for emistat using proptest

use emistat::{
    aggregation::Aggregator,
    calculator::EmissionCalculator,
    types::{
        ActivityType, CalculationResult, Category, Channel, EmissionFactor, Market, Scope, Unit,
        round_emissions,
    },
    units,
};
use proptest::prelude::*;

// Strategies for generating test data

prop_compose! {
    fn arb_quantity()(
        quantity in 0.0f64..10_000_000.0,
    ) -> f64 {
        quantity
    }
}

prop_compose! {
    fn arb_factor()(
        value in 0.0f64..10.0,
        market_adjusted in any::<bool>(),
    ) -> EmissionFactor {
        EmissionFactor {
            category: Category::new("digital-advertising"),
            sub_activity: ActivityType::new("Impressions"),
            region: Market::new(Market::GLOBAL),
            unit: Unit::new("impression"),
            factor_kg_per_unit: value,
            valid_from: "2023-01-01".parse().unwrap(),
            source: "proptest".to_string(),
            market_adjusted,
        }
    }
}

fn arb_convertible_pair() -> impl Strategy<Value = (Unit, Unit)> {
    prop::sample::select(vec![
        ("mb", "gb"),
        ("gb", "tb"),
        ("mile", "km"),
        ("m", "km"),
        ("wh", "kwh"),
        ("kwh", "mwh"),
        ("ml", "litre"),
        ("gallon", "litre"),
        ("minute", "hour"),
        ("g", "kg"),
        ("tonne", "kg"),
    ])
    .prop_map(|(a, b)| (Unit::new(a), Unit::new(b)))
}

prop_compose! {
    fn arb_result()(
        kg in 0.0f64..1000.0,
        channel in prop::sample::select(vec!["Google Ads", "Meta Ads", "AWS", "Travel"]),
        market in prop::sample::select(vec!["US", "EU", "GB", "FR"]),
        scope in prop::sample::select(vec![Scope::Direct, Scope::PurchasedEnergy, Scope::ValueChain]),
        factor in arb_factor(),
    ) -> CalculationResult {
        CalculationResult {
            total_emissions: kg,
            scope,
            category: Category::new("digital-advertising"),
            factor_used: factor,
            normalized_quantity: kg,
            market: Market::new(market),
            channel: Channel::new(channel),
            campaign: None,
        }
    }
}

proptest! {
    #[test]
    fn test_emissions_never_negative(
        quantity in arb_quantity(),
        factor in arb_factor(),
        multiplier in 0.0f64..2.0,
    ) {
        let kg = EmissionCalculator::emissions_from_factor(quantity, &factor, multiplier);
        prop_assert!(kg >= 0.0);
    }

    #[test]
    fn test_zero_quantity_is_zero_emissions(
        factor in arb_factor(),
        multiplier in 0.0f64..2.0,
    ) {
        let kg = EmissionCalculator::emissions_from_factor(0.0, &factor, multiplier);
        prop_assert_eq!(kg, 0.0);
    }

    #[test]
    fn test_emissions_calculation_consistency(
        quantity in arb_quantity(),
        factor in arb_factor(),
    ) {
        let a = EmissionCalculator::emissions_from_factor(quantity, &factor, 1.0);
        let b = EmissionCalculator::emissions_from_factor(quantity, &factor, 1.0);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn test_emissions_monotonic_in_quantity(
        base in 0.0f64..1_000_000.0,
        extra in 0.0f64..1_000_000.0,
        factor in arb_factor(),
    ) {
        let smaller = EmissionCalculator::emissions_from_factor(base, &factor, 1.0);
        let larger = EmissionCalculator::emissions_from_factor(base + extra, &factor, 1.0);
        prop_assert!(larger >= smaller);
    }

    #[test]
    fn test_unit_round_trip(
        quantity in 0.000001f64..1_000_000.0,
        (from, to) in arb_convertible_pair(),
    ) {
        let there = units::normalize(quantity, &from, &to).unwrap();
        let back = units::normalize(there, &to, &from).unwrap();
        let tolerance = quantity.abs() * 1e-9;
        prop_assert!(
            (back - quantity).abs() <= tolerance,
            "round trip {} -> {} drifted from {} to {}", from, to, quantity, back
        );
    }

    #[test]
    fn test_rounding_is_idempotent(kg in 0.0f64..1_000_000.0) {
        let once = round_emissions(kg);
        let twice = round_emissions(once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_aggregation_order_independent(
        results in prop::collection::vec(arb_result(), 0..25),
    ) {
        let mut reversed = results.clone();
        reversed.reverse();

        let a = Aggregator::aggregate(results);
        let b = Aggregator::aggregate(reversed);

        // Summation order may differ, so compare well below the rounding precision
        let close = |x: f64, y: f64| (x - y).abs() < 1e-6;
        prop_assert!(close(a.total, b.total));
        prop_assert_eq!(a.by_channel.len(), b.by_channel.len());
        for (channel, kg) in &a.by_channel {
            prop_assert!(close(*kg, b.by_channel[channel]));
        }
        for (market, kg) in &a.by_market {
            prop_assert!(close(*kg, b.by_market[market]));
        }
        for (scope, kg) in &a.by_scope {
            prop_assert!(close(*kg, b.by_scope[scope]));
        }
    }

    #[test]
    fn test_aggregate_total_equals_item_sum(
        results in prop::collection::vec(arb_result(), 0..25),
    ) {
        let expected: f64 = results.iter().map(|r| r.total_emissions).sum();
        let report = Aggregator::aggregate(results);
        prop_assert!((report.total - expected).abs() < 1e-9);
    }
}
