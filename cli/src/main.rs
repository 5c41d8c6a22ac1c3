use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use catalog_migrate_core::{MigrationReport, TransformOptions, reports_to_json};
use catalog_migrate_store::{
    CatalogSource, DEFAULT_BRANCH, GitProvider, LocalProvider, MigrateConfig, RepositoryProvider,
    migrate_directory,
};
use clap::{Args, Parser, Subcommand};
use tracing::{info, info_span, warn};
use tracing_subscriber::EnvFilter;

const USAGE_EXAMPLES: &str = "Must provide at least one catalog URL as argument
Example:
  https://git.rancher.io/rancher-catalog~master
  https://github.com/rancher/rancher-catalog~hosted
  https://github.com/rancher/community-catalog";

#[derive(Debug, Parser)]
#[command(name = "catalog-migrate")]
#[command(about = "Migrate service catalogs from the legacy layout to the normalized layout")]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Clone one or more catalogs and migrate each checkout.
    Clone(CloneArgs),
    /// Migrate an already checked-out catalog in place.
    Local(LocalArgs),
}

#[derive(Debug, Args)]
struct CloneArgs {
    /// Catalog URLs in endpoint[~branch] form.
    urls: Vec<String>,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory catalogs are cloned into.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Preserve original files for comparison and backwards compatibility.
    #[arg(long)]
    preserve: bool,
    /// Seconds before a clone is abandoned.
    #[arg(long)]
    clone_timeout: Option<u64>,
    /// Write a JSON run report to this path.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Save the effective configuration (file, flags and URLs) to this path.
    #[arg(long)]
    save_config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct LocalArgs {
    /// Root of the checked-out catalog.
    dir: PathBuf,
    /// Preserve original files for comparison and backwards compatibility.
    #[arg(long)]
    preserve: bool,
    /// Write a JSON run report to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Clone(args) => run_clone(args),
        Command::Local(args) => run_local(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_clone(args: CloneArgs) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => MigrateConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => MigrateConfig::default(),
    };
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if let Some(timeout) = args.clone_timeout {
        config.clone_timeout_secs = timeout;
    }
    config.preserve |= args.preserve;
    config.catalogs.extend(args.urls);

    if config.catalogs.is_empty() {
        return Err(USAGE_EXAMPLES.to_string());
    }

    // Reject malformed URLs before anything is cloned.
    let mut sources = Vec::new();
    let mut seen = HashSet::new();
    for url in &config.catalogs {
        let source = CatalogSource::parse(url).map_err(|e| e.to_string())?;
        if seen.insert(source.clone()) {
            sources.push(source);
        } else {
            warn!(url = %url, "Duplicate catalog, skipping");
        }
    }

    if let Some(path) = &args.save_config {
        config.catalogs = sources.iter().map(CatalogSource::to_url).collect();
        config
            .save(path)
            .map_err(|e| format!("Failed to save config '{}': {e}", path.display()))?;
        info!(path = %path.display(), "Saved configuration");
    }

    if config.preserve {
        info!("Preserve enabled");
    }
    let options = TransformOptions {
        preserve: config.preserve,
    };
    let provider = GitProvider::new(&config.output_dir, config.clone_timeout());

    let mut reports = Vec::new();
    for source in &sources {
        let span = info_span!("catalog", endpoint = %source.endpoint, branch = %source.branch);
        let _enter = span.enter();
        info!("Begin");

        let dir = provider
            .fetch(source)
            .map_err(|e| format!("Error cloning catalog ({source}): {e}"))?;
        let report = migrate_directory(&dir, options)
            .map_err(|e| format!("Error transforming catalog ({source}): {e}"))?;
        print_summary(&report);
        reports.push(report);
    }

    if let Some(path) = &args.report {
        write_report(path, &reports)?;
    }
    info!("Exiting");
    Ok(())
}

fn run_local(args: LocalArgs) -> Result<(), String> {
    let source = CatalogSource {
        endpoint: args.dir.display().to_string(),
        branch: DEFAULT_BRANCH.to_string(),
    };
    let dir = LocalProvider::new(&args.dir)
        .fetch(&source)
        .map_err(|e| format!("Error opening catalog: {e}"))?;
    let options = TransformOptions {
        preserve: args.preserve,
    };

    let span = info_span!("catalog", dir = %dir.display());
    let _enter = span.enter();
    info!("Begin");

    let report = migrate_directory(&dir, options)
        .map_err(|e| format!("Error transforming catalog '{}': {e}", dir.display()))?;
    print_summary(&report);

    if let Some(path) = &args.report {
        write_report(path, std::slice::from_ref(&report))?;
    }
    Ok(())
}

fn print_summary(report: &MigrationReport) {
    println!(
        "Migrated {} template(s), {} version(s) in '{}' ({} renamed, {} written, {} removed).",
        report.templates,
        report.versions.len(),
        report.catalog.display(),
        report.directories_renamed,
        report.files_written,
        report.files_removed,
    );
}

fn write_report(path: &Path, reports: &[MigrationReport]) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create report directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    let raw = reports_to_json(reports)
        .map_err(|err| format!("Failed to serialize report: {err}"))?;
    fs::write(path, raw).map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}
