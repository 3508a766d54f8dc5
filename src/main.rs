use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use pip_remove::config::Config;
use pip_remove::discovery::DistFinder;
use pip_remove::graph::DependencyGraph;
use pip_remove::index::{PackageIndex, Snapshot};
use pip_remove::remove::{PipUninstaller, RemovalOutcome, RemovalPlan, SafeRemover, Uninstaller};
use pip_remove::report::{ReportFormat, Reporter};
use pip_remove::resolver::Resolver;

/// pip-remove - uninstall PACKAGE together with the dependencies nothing else needs
#[derive(Parser, Debug)]
#[command(name = "pip-remove")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Packages to uninstall
    #[arg(required = true, value_name = "PACKAGE")]
    packages: Vec<String>,

    /// Auto-confirm uninstallation
    #[arg(short, long)]
    yes: bool,

    /// Suppress output (implies --yes)
    #[arg(short, long)]
    quiet: bool,

    /// Increase output (-v for progress, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write log records to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Python interpreter used for discovery and uninstall
    #[arg(long, value_name = "EXE")]
    python: Option<String>,

    /// Site-packages directory to scan instead of the interpreter's sys.path
    /// (can be specified multiple times)
    #[arg(long, value_name = "DIR")]
    site_packages: Vec<PathBuf>,

    /// Read the installed packages from a snapshot file (JSON, YAML or TOML)
    #[arg(long, value_name = "FILE")]
    index: Option<PathBuf>,

    /// Additional protected package or pattern, never removed
    /// (can be specified multiple times)
    #[arg(short, long, value_name = "NAME")]
    protect: Vec<String>,

    /// Ignore requirements that only apply to optional extras
    #[arg(long)]
    no_extras: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dry run - show what would be uninstalled without making changes
    #[arg(long)]
    dry_run: bool,

    /// Write a script that reinstalls the removed packages
    #[arg(long, value_name = "FILE")]
    undo_script: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    Terminal,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    info!("pip-remove v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    let format = report_format(&cli, &config);

    // Built once and shared by every target
    let index = load_index(&config, &cli)?;
    let graph = DependencyGraph::from_index(&index);
    info!(
        "Indexed {} packages ({} dependency edges)",
        graph.package_count(),
        graph.edge_count()
    );

    let mut reporter = Reporter::new(format.clone(), cli.output.clone()).with_quiet(cli.quiet);
    let uninstaller = PipUninstaller::new(config.python.clone(), cli.quiet);
    let mut remover = SafeRemover::new(cli.yes, cli.dry_run, cli.undo_script.clone())
        .with_quiet(cli.quiet)
        .with_python(config.python.clone());

    // Without a readable report there is nothing to confirm against
    let can_remove = format == ReportFormat::Terminal || cli.yes || cli.quiet || cli.dry_run;

    let mut failed = 0;
    for target in &cli.packages {
        let result = run_target(
            target,
            &index,
            &graph,
            &config,
            &mut reporter,
            can_remove.then_some((&mut remover, &uninstaller as &dyn Uninstaller)),
        );

        if let Err(e) = result {
            failed += 1;
            eprintln!("{:?}", e);
        }
    }

    reporter.finish()?;

    if failed > 0 {
        return Err(miette::miette!(
            "{} of {} packages could not be processed",
            failed,
            cli.packages.len()
        ));
    }

    Ok(())
}

/// Resolve, report and remove a single target
fn run_target(
    target: &str,
    index: &PackageIndex,
    graph: &DependencyGraph,
    config: &Config,
    reporter: &mut Reporter,
    removal: Option<(&mut SafeRemover, &dyn Uninstaller)>,
) -> Result<()> {
    if config.is_protected(target) {
        warn!("{} is protected and will not be removed", target);
    }

    let mut resolver = Resolver::new(target, index, graph, config)?;
    let resolved = resolver.resolve()?;
    let state = resolver.into_state();

    reporter.report(&state, resolved);

    if !resolved {
        return Ok(());
    }

    let Some((remover, uninstaller)) = removal else {
        info!("Skipping uninstall of {}: pass --yes to uninstall in json mode", state.target);
        return Ok(());
    };

    let plan = RemovalPlan::from_state(&state);
    match remover.remove(&plan, index, uninstaller)? {
        RemovalOutcome::Uninstalled(status) if !status.success() => Err(miette::miette!(
            "pip uninstall failed for {} (exit code {:?})",
            plan.target,
            status.code
        )),
        _ => Ok(()),
    }
}

fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    use std::sync::Arc;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            _ => EnvFilter::new("debug"),
        }
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::File::create(path).into_diagnostic()?;
            Some(
                fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false)
                    .with_target(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .init();

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        let cwd = std::env::current_dir().into_diagnostic()?;
        Config::from_default_locations(&cwd)?
    };

    // Override with CLI arguments
    if let Some(python) = &cli.python {
        config.python = python.clone();
    }
    if !cli.site_packages.is_empty() {
        config.site_packages = cli.site_packages.clone();
    }
    if !cli.protect.is_empty() {
        config.protected.extend(cli.protect.clone());
    }
    if cli.no_extras {
        config.include_extras = false;
    }

    Ok(config)
}

fn report_format(cli: &Cli, config: &Config) -> ReportFormat {
    if let Some(format) = &cli.format {
        return format.clone().into();
    }

    ReportFormat::parse(&config.report.format).unwrap_or_else(|| {
        warn!(
            "Unknown report format '{}' in config, using terminal",
            config.report.format
        );
        ReportFormat::Terminal
    })
}

fn load_index(config: &Config, cli: &Cli) -> Result<PackageIndex> {
    if let Some(path) = &cli.index {
        info!("Loading index snapshot from {}", path.display());
        let snapshot = Snapshot::load(path).into_diagnostic()?;
        return Ok(snapshot.into_index(config.include_extras));
    }

    info!("Discovering installed distributions...");
    DistFinder::new(config).with_progress(!cli.quiet).build_index()
}
