use clap::Parser;
use gridcast::adapters::{ContestFile, FolderSink, Tank01Client, TopPerformersFormatter};
use gridcast::cli::Cli;
use gridcast::config::AppConfig;
use gridcast::error::{GridcastError, Result};
use gridcast::tracker::{GameTracker, PhaseClassifier};
use std::sync::Arc;
use tracing::{info, warn};

mod main_runtime;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir)?;
    main_runtime::init_logging(&config.logging);

    if let Err(problems) = config.validate() {
        for problem in &problems {
            warn!("config: {}", problem);
        }
        return Err(GridcastError::Internal(format!(
            "invalid configuration: {}",
            problems.join("; ")
        )));
    }

    let feed = Tank01Client::from_config(&config.feed)?;
    if config.feed.resolved_api_key().is_none() {
        warn!("no RapidAPI key configured; feed requests will likely be rejected");
    }

    let formatter = TopPerformersFormatter::new(feed.clone(), config.contest.timezone_label.clone());
    let contests = ContestFile::new(config.contest.pointer_path.clone());
    let sink = FolderSink::new(config.sink.folders.clone());

    info!(
        feed = %feed.base_url(),
        pointer = %contests.path().display(),
        outboxes = sink.folders().len(),
        "starting gridcast"
    );

    let mut tracker = GameTracker::new(
        Arc::new(contests),
        Arc::new(feed),
        Arc::new(formatter),
        Arc::new(sink),
        PhaseClassifier::from_config(&config.feed),
        config.timing(),
    )
    .with_timezone_label(config.contest.timezone_label.clone());

    if cli.once {
        let outcome = tracker.run_cycle().await?;
        info!(?outcome, "single cycle finished");
        return Ok(());
    }

    tracker.run_until(main_runtime::shutdown_signal()).await;
    info!("gridcast stopped");
    Ok(())
}
