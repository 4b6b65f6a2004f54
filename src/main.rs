//! emistat - GHG Protocol carbon emission calculator for activity data

use chrono::Utc;
use clap::Parser;
use emistat::{
    aggregation::Aggregator,
    calculator::EmissionCalculator,
    cli::{Cli, Command, parse_date_filter},
    data_loader::ActivityLoader,
    error::Result,
    factors::FactorRegistry,
    filters::ActivityFilter,
    output::get_formatter,
    types::{ActivityDate, ActivityInput, ActivityType, Channel, Market, Scope, Unit},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the factor registry configured by the CLI flags
async fn create_registry(cli: &Cli) -> Arc<FactorRegistry> {
    let mut registry = FactorRegistry::new(cli.offline).await;
    if let Some(path) = &cli.factors_file {
        registry = registry.with_source_file(path.clone());
    }
    Arc::new(registry)
}

/// Build the activity filter from the CLI flags
fn create_filter(cli: &Cli) -> Result<ActivityFilter> {
    let mut filter = ActivityFilter::new();

    if let Some(since) = &cli.since {
        filter = filter.with_since(parse_date_filter(since)?);
    }
    if let Some(until) = &cli.until {
        filter = filter.with_until(parse_date_filter(until)?);
    }
    if let Some(market) = &cli.market {
        filter = filter.with_market(market.clone());
    }
    if let Some(channel) = &cli.channel {
        filter = filter.with_channel(channel.clone());
    }
    if let Some(campaign) = &cli.campaign {
        filter = filter.with_campaign(campaign.clone());
    }

    Ok(filter)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. The --verbose flag should override RUST_LOG.
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("emistat=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("emistat=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &cli.command {
        Command::Report { input } => {
            info!("Running aggregate emission report");

            let show_progress = !cli.json && is_terminal::is_terminal(std::io::stdout());
            let registry = create_registry(&cli).await;
            let calculator = Arc::new(EmissionCalculator::new(registry));
            let aggregator = Aggregator::new(calculator).with_progress(show_progress);

            let loader = ActivityLoader::from_path(input.clone()).await?;
            let activities = loader.load_activities();
            let filtered = create_filter(&cli)?.filter_stream(activities).await;

            let report = aggregator.aggregate_stream(filtered).await?;

            let formatter = get_formatter(cli.json);
            println!("{}", formatter.format_report(&report));
        }

        Command::Items { input } => {
            info!("Running itemized emission report");

            let show_progress = !cli.json && is_terminal::is_terminal(std::io::stdout());
            let registry = create_registry(&cli).await;
            let calculator = Arc::new(EmissionCalculator::new(registry));
            let aggregator = Aggregator::new(calculator).with_progress(show_progress);

            let loader = ActivityLoader::from_path(input.clone()).await?;
            let activities = loader.load_activities();
            let filtered = create_filter(&cli)?.filter_stream(activities).await;

            let report = aggregator.aggregate_stream(filtered).await?;

            let formatter = get_formatter(cli.json);
            println!("{}", formatter.format_items(&report.items));
        }

        Command::Calculate {
            activity_type,
            channel,
            market,
            quantity,
            unit,
            scope,
            date,
            campaign,
        } => {
            info!("Calculating single activity");

            let scope = scope
                .map(|n| {
                    Scope::try_from(n)
                        .map_err(emistat::error::EmistatError::InvalidArgument)
                })
                .transpose()?;

            let date = match date {
                Some(s) => ActivityDate::new(parse_date_filter(s)?),
                None => ActivityDate::new(Utc::now().date_naive()),
            };

            let input = ActivityInput {
                activity_type: ActivityType::new(activity_type.clone()),
                channel: Channel::new(channel.clone()),
                market: Market::new(market.clone()),
                quantity: *quantity,
                unit: Unit::new(unit.clone()),
                scope,
                date,
                campaign: campaign.clone(),
            };

            let registry = create_registry(&cli).await;
            let calculator = EmissionCalculator::new(registry);
            let result = calculator.calculate_with_ghg_protocol(&input).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let formatter = get_formatter(false);
                println!("{}", formatter.format_items(std::slice::from_ref(&result)));
            }
        }

        Command::Factors { category } => {
            info!("Listing factor dataset");

            let registry = create_registry(&cli).await;
            let table = registry.table().await?;

            let factors: Vec<_> = match category {
                Some(category) => table
                    .factors
                    .iter()
                    .filter(|f| f.category.matches(category))
                    .cloned()
                    .collect(),
                None => table.factors.clone(),
            };

            let formatter = get_formatter(cli.json);
            println!("{}", formatter.format_factors(&table.version, &factors));
        }
    }

    Ok(())
}
