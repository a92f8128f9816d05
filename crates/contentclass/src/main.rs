use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use contentclass::{
    build_validator, load_index, lookup, repository_path, scan_file, write_merged, RootConfig,
    RootError,
};
use contentclass_core::{ContentUsage, Severity};
use contentclass_validator::settings::VALIDATOR_ID;
use contentclass_validator::{ContentClassificationValidator, UsageSubject, ValidationRun, Violation};

/// contentclass: check content against content classification maps
///
/// Resource paths are classified as public, abstract, final or internal.
/// Content must not reference, inherit from or overlay what its
/// classification disallows.
#[derive(Parser, Debug)]
#[command(name = "contentclass", version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the effective classification of a resource path
    Lookup {
        /// Absolute resource path, or relative to /libs/
        path: String,
    },

    /// Check a single usage of a resource path
    Check {
        /// OVERLAY, INHERIT or REFERENCE
        usage: ContentUsage,

        /// Used resource path; for OVERLAY the overlaying node's own path
        path: String,

        /// Name of the using element; the file as a whole if omitted
        #[arg(long)]
        element: Option<String>,
    },

    /// Check files of a content tree on disk
    Scan {
        /// Directory mapped to the repository root, e.g. a package's jcr_root
        #[arg(long)]
        root: Option<PathBuf>,

        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Merge the configured maps and write the result
    Merge {
        /// Output file
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("contentclass=debug,contentclass_map=debug,contentclass_validator=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("contentclass=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<(RootConfig, PathBuf), RootError> {
    let path = path.cloned().unwrap_or_else(RootConfig::default_config_path);
    let config = RootConfig::load(&path)?;
    // map locations are relative to the config file
    let base_dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((config, base_dir))
}

fn load_validator(config_path: Option<&PathBuf>) -> Result<ContentClassificationValidator, RootError> {
    let (config, base_dir) = load_config(config_path)?;
    let index = load_index(&config, &base_dir)?;
    build_validator(&config, index)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `false` if violations at severity ERROR were found.
fn run(cli: Cli) -> Result<bool, RootError> {
    match cli.command {
        Commands::Lookup { path } => cmd_lookup(cli.config.as_ref(), &path, cli.json),
        Commands::Check {
            usage,
            path,
            element,
        } => cmd_check(cli.config.as_ref(), usage, &path, element, cli.json),
        Commands::Scan { root, files } => {
            cmd_scan(cli.config.as_ref(), root.as_deref(), &files, cli.json)
        }
        Commands::Merge { output } => cmd_merge(cli.config.as_ref(), &output),
    }
}

fn cmd_lookup(config_path: Option<&PathBuf>, path: &str, json: bool) -> Result<bool, RootError> {
    let validator = load_validator(config_path)?;
    let report = lookup(&validator, path)?;
    if json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("{}: {} ({})", report.path, report.classification, report.label);
        if let Some(remark) = &report.remark {
            println!("  Remark: {}", remark);
        }
    }
    Ok(true)
}

fn cmd_check(
    config_path: Option<&PathBuf>,
    usage: ContentUsage,
    path: &str,
    element: Option<String>,
    json: bool,
) -> Result<bool, RootError> {
    let validator = load_validator(config_path)?;
    let subject = element.map_or(UsageSubject::File, UsageSubject::Element);
    let mut run = ValidationRun::new();
    let violations: Vec<Violation> = validator
        .evaluate(&mut run, Some(path), usage, &subject)?
        .into_iter()
        .collect();
    report(&violations, json)
}

fn cmd_scan(
    config_path: Option<&PathBuf>,
    root: Option<&Path>,
    files: &[PathBuf],
    json: bool,
) -> Result<bool, RootError> {
    let validator = load_validator(config_path)?;
    info!(validator = VALIDATOR_ID, files = files.len(), "scanning");

    let mut run = ValidationRun::new();
    let mut violations = Vec::new();
    for file in files {
        let repository_path = repository_path(root, file)?;
        violations.extend(scan_file(&validator, &mut run, file, &repository_path)?);
    }
    violations.push(validator.summary());
    report(&violations, json)
}

fn cmd_merge(config_path: Option<&PathBuf>, output: &Path) -> Result<bool, RootError> {
    let (config, base_dir) = load_config(config_path)?;
    let index = load_index(&config, &base_dir)?;
    write_merged(&index, output)?;
    println!(
        "Merged {} maps into {} ({} entries, label '{}')",
        config.maps.len(),
        output.display(),
        index.len(),
        index.label()
    );
    Ok(true)
}

fn report(violations: &[Violation], json: bool) -> Result<bool, RootError> {
    for violation in violations {
        if json {
            println!("{}", serde_json::to_string(violation)?);
        } else {
            println!("[{}] {}", violation.severity, violation.message);
        }
    }
    Ok(!violations.iter().any(|v| v.severity >= Severity::Error))
}
