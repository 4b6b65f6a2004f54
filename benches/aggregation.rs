use criterion::{Criterion, black_box, criterion_group, criterion_main};
use emistat::{
    aggregation::Aggregator,
    types::{
        ActivityType, CalculationResult, Category, Channel, EmissionFactor, Market, Scope, Unit,
    },
};

fn create_results(count: usize) -> Vec<CalculationResult> {
    let channels = ["Google Ads", "Meta Ads", "AWS", "Travel", "Facilities"];
    let markets = ["US", "EU", "GB", "DE", "FR"];

    (0..count)
        .map(|i| CalculationResult {
            total_emissions: (i as f64) * 0.0125,
            scope: match i % 3 {
                0 => Scope::Direct,
                1 => Scope::PurchasedEnergy,
                _ => Scope::ValueChain,
            },
            category: Category::new("digital-advertising"),
            factor_used: EmissionFactor {
                category: Category::new("digital-advertising"),
                sub_activity: ActivityType::new("Impressions"),
                region: Market::new(Market::GLOBAL),
                unit: Unit::new("impression"),
                factor_kg_per_unit: 0.0006,
                valid_from: "2023-01-01".parse().unwrap(),
                source: "bench".to_string(),
                market_adjusted: false,
            },
            normalized_quantity: (i as f64) * 20.0,
            market: Market::new(markets[i % markets.len()]),
            channel: Channel::new(channels[i % channels.len()]),
            campaign: None,
        })
        .collect()
}

fn benchmark_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregation");

    for count in [100, 1_000, 10_000] {
        group.bench_function(format!("aggregate_{count}_results"), |b| {
            let results = create_results(count);

            b.iter(|| {
                let report = Aggregator::aggregate(black_box(results.clone()));
                black_box(report.total)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_aggregation);
criterion_main!(benches);
