use clap::Parser;
use config::Config;
use dirsentry::{cli::Cli, signals::wait_for_signal};
use orchestrator::{
    CommandAnalyzer, ScanOrchestrator, Services, SnapshotOutcome, SystemClock,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // NOTE: The verbosity flag takes precedence over the environment variable
    // for log control. For example, `DIRSENTRY_LOG=warn dirsentry -vv` will
    // still log at the trace level. The environment variable can only set the
    // log level per module, not override the verbosity flag.
    // Eg. `DIRSENTRY_LOG=orchestrator::walk=warn dirsentry -vv` silences the
    // per-entry traversal messages only.
    let env_filter = EnvFilter::builder()
        .with_env_var("DIRSENTRY_LOG")
        .from_env()?
        .add_directive(cli.verbosity.log_level_filter().as_str().parse()?);

    let layer = tracing_subscriber::fmt::layer()
        .with_level(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter)
        .init();

    // load config
    let mut config = match &cli.conffile {
        Some(path) => Config::load(path)?,
        _ => {
            let mut candidates = glob::glob("/etc/dirsentry/config.d/*.toml")?
                .filter_map(Result::ok)
                .collect::<Vec<_>>();
            candidates.insert(0, "/etc/dirsentry/config.toml".into());
            trace!(?candidates, "config file candidates");
            Config::load_multiple(candidates)?
        }
    };
    cli.apply(&mut config);
    debug!(?config, ?cli);

    let roots = config.scan.monitored.clone();
    if roots.is_empty() {
        anyhow::bail!("no directories to monitor; pass them as arguments or set scan.monitored");
    }

    let services = Services {
        analyzer: Arc::new(CommandAnalyzer::new(&config.analysis)),
        clock: Arc::new(SystemClock),
    };
    let orchestrator = ScanOrchestrator::new(config, services);

    // install signal handlers
    let token = orchestrator.cancellation_token();
    let signal_handle = tokio::spawn(wait_for_signal(token.clone()));

    let report = orchestrator.run(&roots).await;

    // the handler only returns on its own once a signal arrived
    token.cancel();
    if let Err(err) = signal_handle.await? {
        error!("error happened during handling signals: {}", err);
    }

    for (root, result) in &report.directories {
        match result {
            Ok(dir) => {
                let changes = match &dir.outcome {
                    SnapshotOutcome::Changed { changes: Some(changes) } => format!(
                        "{} added, {} removed, {} modified",
                        changes.added.len(),
                        changes.removed.len(),
                        changes.modified.len()
                    ),
                    _ => String::from("-"),
                };
                info!(
                    root = %root.display(),
                    outcome = dir.outcome.label(),
                    %changes,
                    entries = dir.stats.entries,
                    suspicious = dir.stats.suspicious,
                    corrupted = dir.corrupted(),
                    analysis_failures = dir.stats.analysis_failures,
                    skipped = dir.stats.skipped,
                    snapshot = %dir.snapshot.display(),
                    "directory summary"
                );
            }
            Err(err) => error!(root = %root.display(), "{err}"),
        }
    }

    let totals = report.totals();
    info!(
        directories = report.directories.len(),
        entries = totals.entries,
        corrupted = totals.quarantined,
        "scan complete"
    );

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
