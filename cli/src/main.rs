//! CLI entrypoint for crowdcontrol
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use crowdcontrol_application::{
    AuditLogger, ConfigIssue, DataAccess, EventBus, NoAuditLogger, NoProgress, PaymentDispatcher,
    QualityOrchestrator, ScoringProgress, has_errors, validate_experiment,
};
use crowdcontrol_domain::{
    ExperimentChanged, ExperimentId, ExperimentState, OutputFormat, QualityStrategies,
};
use crowdcontrol_infrastructure::{
    ConfigLoader, Dataset, FileConfig, InMemoryDataAccess, InMemoryImageSource, JsonlAuditLogger,
    LedgerPlatform,
};
use crowdcontrol_presentation::{
    Cli, Command, ConsoleFormatter, OutputConfig, ProgressReporter, SimpleProgress,
};
use serde_json::json;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting crowdcontrol");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).map_err(|e| anyhow::anyhow!(e))?
    };

    let output = OutputConfig::resolve(
        cli.output.map(Into::into),
        config.output.format,
        config.output.color,
        cli.no_color,
        cli.quiet,
    );
    output.apply_color();

    match cli.command.clone() {
        Some(Command::Run {
            dataset,
            experiment,
        }) => run(&cli, &config, output, &dataset, ExperimentId::new(experiment)).await,
        Some(Command::Validate {
            dataset,
            experiment,
        }) => validate(output, &dataset, experiment.map(ExperimentId::new)),
        Some(Command::Algorithms) => {
            let catalog = QualityStrategies::with_defaults().catalog();
            match output.format {
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&catalog)),
                _ => println!("{}", ConsoleFormatter::format_catalog(&catalog)),
            }
            Ok(())
        }
        None => bail!("No command given. Run `crowdcontrol --help` for usage."),
    }
}

/// Initialize logging based on verbosity level; `RUST_LOG` wins when set
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    });

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Could not open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

/// Stop an experiment and print what scoring and payment did
async fn run(
    cli: &Cli,
    config: &FileConfig,
    output: OutputConfig,
    dataset_path: &Path,
    experiment_id: ExperimentId,
) -> Result<()> {
    let params = config.to_params()?;
    let dataset = Dataset::from_path(dataset_path)?;

    // === Dependency Injection ===
    let data = Arc::new(InMemoryDataAccess::from_dataset(&dataset));
    let images = Arc::new(InMemoryImageSource::from_json(&dataset.images));
    let strategies = QualityStrategies::with_defaults();

    let experiment = data.get_experiment(experiment_id)?;
    let issues = validate_experiment(&experiment, &strategies);
    if has_errors(&issues) {
        eprintln!("{}", ConsoleFormatter::format_issues(experiment_id, &issues));
        bail!("Experiment {} is misconfigured", experiment_id);
    }
    for issue in &issues {
        warn!("[{}] {}", issue.section, issue.message);
    }

    let audit_path = cli.audit.as_ref().or(config.audit.path.as_ref());
    let audit: Arc<dyn AuditLogger> = match audit_path.map(JsonlAuditLogger::open) {
        Some(Ok(logger)) => {
            info!("Writing audit trail to {}", logger.path().display());
            Arc::new(logger)
        }
        Some(Err(e)) => {
            warn!("{}, continuing without audit trail", e);
            Arc::new(NoAuditLogger)
        }
        None => Arc::new(NoAuditLogger),
    };

    let progress: Arc<dyn ScoringProgress> = if !output.show_progress {
        Arc::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Arc::new(ProgressReporter::new())
    } else {
        Arc::new(SimpleProgress)
    };

    let bus = Arc::new(EventBus::new());

    let orchestrator = Arc::new(
        QualityOrchestrator::new(
            Arc::clone(&data),
            images,
            strategies.clone(),
            params.duplicates.clone(),
        )
        .with_scoring_params(params.scoring.clone())
        .with_progress(progress)
        .with_audit_logger(Arc::clone(&audit)),
    );
    orchestrator.subscribe(&bus);

    let ledger = Arc::new(LedgerPlatform::new(Arc::clone(&data)));
    let dispatcher = Arc::new(
        PaymentDispatcher::new(
            Arc::clone(&data),
            strategies,
            params.payment.clone(),
            Handle::current(),
        )
        .with_platform(ledger)
        .with_audit_logger(audit),
    );
    dispatcher.subscribe(&bus);

    match experiment.state {
        ExperimentState::Created => bail!("Experiment {} was never published", experiment_id),
        ExperimentState::Stopped => bail!("Experiment {} is already stopped", experiment_id),
        ExperimentState::Published => {
            transition(&data, &bus, experiment_id, ExperimentState::Stopping).await?;
        }
        ExperimentState::Stopping => {}
    }
    transition(&data, &bus, experiment_id, ExperimentState::Stopped).await?;

    let scoring = orchestrator
        .latest_report(experiment_id)
        .context("Scoring did not run")?;
    let payments = dispatcher.drain().await;

    let participants: Vec<_> = payments
        .iter()
        .flat_map(|report| report.outcomes.iter().map(|o| o.worker))
        .collect();
    let balances: Vec<_> = data
        .workers()
        .into_iter()
        .filter(|w| participants.contains(&w.id))
        .collect();

    match output.format {
        OutputFormat::Json => {
            let combined = json!({
                "scoring": scoring,
                "payments": payments,
                "balances": balances,
            });
            println!("{}", ConsoleFormatter::format_json(&combined));
        }
        format => {
            let full = format == OutputFormat::Full;
            print!("{}", ConsoleFormatter::format_scoring(&scoring, full));
            for report in &payments {
                print!("{}", ConsoleFormatter::format_payment(report, full));
            }
            if full {
                print!("{}", ConsoleFormatter::format_balances(&balances));
            }
        }
    }

    if !scoring.succeeded() {
        bail!(
            "{} answer(s) of experiment {} could not be scored",
            scoring.failures.len(),
            experiment_id
        );
    }
    Ok(())
}

/// Store a state change and publish it; scoring runs off the async runtime
async fn transition(
    data: &Arc<InMemoryDataAccess>,
    bus: &Arc<EventBus>,
    experiment_id: ExperimentId,
    state: ExperimentState,
) -> Result<()> {
    let (old, new) = data.set_experiment_state(experiment_id, state)?;
    info!(
        "Experiment {}: {} -> {}",
        experiment_id, old.state, new.state
    );

    let bus = Arc::clone(bus);
    let emission = tokio::task::spawn_blocking(move || {
        bus.experiment_changed
            .publish(&ExperimentChanged::new(old, new))
    })
    .await?;

    for (subscriber, entry) in emission.entries() {
        info!("{}: {} ({})", subscriber, entry.short, entry.long);
    }
    Ok(())
}

/// Report configuration issues without scoring anything
fn validate(output: OutputConfig, dataset_path: &Path, only: Option<ExperimentId>) -> Result<()> {
    let dataset = Dataset::from_path(dataset_path)?;
    let strategies = QualityStrategies::with_defaults();

    let experiments: Vec<_> = dataset
        .experiments
        .iter()
        .filter(|e| only.is_none_or(|id| e.id == id))
        .collect();
    if let Some(id) = only
        && experiments.is_empty()
    {
        bail!("Experiment {} is not in {}", id, dataset_path.display());
    }

    let results: Vec<(ExperimentId, Vec<ConfigIssue>)> = experiments
        .iter()
        .map(|e| (e.id, validate_experiment(e, &strategies)))
        .collect();

    match output.format {
        OutputFormat::Json => {
            let value: Vec<_> = results
                .iter()
                .map(|(id, issues)| json!({ "experiment": id, "issues": issues }))
                .collect();
            println!("{}", ConsoleFormatter::format_json(&value));
        }
        _ => {
            for (id, issues) in &results {
                print!("{}", ConsoleFormatter::format_issues(*id, issues));
            }
        }
    }

    let invalid = results.iter().filter(|(_, issues)| has_errors(issues)).count();
    if invalid > 0 {
        bail!("{} experiment(s) have configuration errors", invalid);
    }
    Ok(())
}
