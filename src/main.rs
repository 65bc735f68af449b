//! awsping - rank AWS regions by network latency

use awsping::{
    catalog::CatalogClient,
    cli::Cli,
    client::NetworkProber,
    config::{display_config_summary, load_config, EnvManager},
    dns::SystemResolver,
    error::{AppError, ErrorReporter, Result},
    executor::LatencyEngine,
    log_debug, log_info,
    logging::LoggerFactory,
    models::Config,
    output::OutputCoordinator,
    PKG_NAME, VERSION,
};
use clap::Parser;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    // Only the flags are known until the configuration has loaded
    let early_reporter = ErrorReporter::new(cli.use_colors(), cli.debug);

    let config = match load_config(cli) {
        Ok(config) => config,
        Err(e) => exit_with(&early_reporter, e),
    };

    let reporter = ErrorReporter::from_config(&config);
    if let Err(e) = run_application(config).await {
        exit_with(&reporter, e);
    }
}

fn exit_with(reporter: &ErrorReporter, error: AppError) -> ! {
    reporter.report_error(&error);
    process::exit(error.exit_code());
}

/// Main application logic
async fn run_application(config: Config) -> Result<()> {
    let factory = LoggerFactory::new(config.clone());
    let logger = factory.create_logger("MAIN").await;

    log_debug!(logger, "{} v{} starting", PKG_NAME, VERSION);
    if config.debug {
        for line in display_config_summary(&config).lines() {
            log_debug!(logger, "config: {}", line);
        }
    }
    for warning in EnvManager::validate_current_env() {
        logger.warn(&warning).log().await;
    }

    let catalog = CatalogClient::new(config.timeout())?;
    let mut endpoints = catalog.fetch(&config.catalog_url).await?;
    log_info!(logger, "Loaded {} regions from {}", endpoints.len(), config.catalog_url);

    let coordinator = OutputCoordinator::from_config(&config)?;

    if config.list_only() {
        print!("{}", coordinator.display_regions(&endpoints)?);
        return Ok(());
    }

    let resolver = Arc::new(SystemResolver::new()?);
    let prober = NetworkProber::new(resolver, config.timeout())?;
    let engine = LatencyEngine::new(prober).with_logger(factory.create_probe_logger().await);

    let summary = engine.measure(&mut endpoints, &config).await?;

    print!("{}", coordinator.display_results(&endpoints, &summary)?);

    Ok(())
}
