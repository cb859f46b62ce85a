use clap::Parser;
use colored::*;
use env_logger::{Builder, Env};
use log::{error, info, Level};
use std::io::Write;
use std::path::PathBuf;

use receipt_gate::config::parse_threshold;
use receipt_gate::{ReasonCode, ReferenceTemplate, ValidationConfig, ValidationResult, Validator};

#[derive(clap::Subcommand)]
enum Commands {
    /// Check receipt images against a validation profile
    Check(CheckCommand),

    /// Show version information
    Version,
}

#[derive(Parser, Clone)]
struct CheckCommand {
    /// Path(s) to receipt images to validate
    #[arg(value_name = "IMAGES", required = true)]
    images: Vec<PathBuf>,

    /// Validation profile (strict-template, relaxed-screenshot, dark-screenshot)
    #[arg(short, long, default_value = "strict-template")]
    profile: String,

    /// Path to the reference template image (required for template profiles)
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Override the structural similarity threshold (0.0-1.0)
    #[arg(long, value_parser = parse_threshold)]
    threshold: Option<f64>,

    /// Emit one JSON report per image instead of human-readable lines
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
#[command(name = "receipt-gate")]
#[command(about = "Receipt image format validation against a reference template")]
struct Cli {
    /// Verbosity level (-q silences, -v/-vv/-vvv increase detail)
    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity,

    #[command(subcommand)]
    command: Commands,
}

fn get_log_level_from_verbosity(verbosity: &clap_verbosity_flag::Verbosity) -> log::LevelFilter {
    // Shift the clap-verbosity baseline up one notch so the per-run summary
    // lines (info) show at -v and warnings show by default. -q still means
    // errors only; clap-verbosity reports it via is_silent.
    if verbosity.is_silent() {
        return log::LevelFilter::Error;
    }
    match verbosity.log_level_filter() {
        log::LevelFilter::Off => log::LevelFilter::Off,
        log::LevelFilter::Error => log::LevelFilter::Warn,
        log::LevelFilter::Warn => log::LevelFilter::Info,
        log::LevelFilter::Info => log::LevelFilter::Debug,
        log::LevelFilter::Debug | log::LevelFilter::Trace => log::LevelFilter::Trace,
    }
}

fn init_logging(verbosity: &clap_verbosity_flag::Verbosity) {
    // If the user didn't pass -v/-q and RUST_LOG is set, honor the env var.
    let use_env = !verbosity.is_present() && std::env::var_os("RUST_LOG").is_some();

    let mut logger = if use_env {
        Builder::from_env(Env::default())
    } else {
        let mut b = Builder::new();
        b.filter_level(get_log_level_from_verbosity(verbosity));
        b
    };

    logger
        .format(|buf, record| {
            let level_str = match record.level() {
                Level::Error => "ERROR".red().bold().to_string(),
                Level::Warn => "WARN".yellow().to_string(),
                Level::Info => "INFO".green().to_string(),
                Level::Debug => "DEBUG".blue().to_string(),
                Level::Trace => "TRACE".magenta().to_string(),
            };
            writeln!(buf, "[{}] {}", level_str, record.args())
        })
        .init();
}

fn run_check(cmd: &CheckCommand) -> anyhow::Result<i32> {
    let mut config = ValidationConfig::by_name(&cmd.profile).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown profile '{}' (available: {})",
            cmd.profile,
            ValidationConfig::profile_names().join(", ")
        )
    })?;

    if let Some(threshold) = cmd.threshold {
        match config.comparison.as_mut() {
            Some(comparison) => comparison.ssim_threshold = threshold,
            None => anyhow::bail!(
                "--threshold has no effect on profile '{}' (no structural comparison)",
                cmd.profile
            ),
        }
    }

    let template = match &cmd.template {
        Some(path) => Some(ReferenceTemplate::load(path)?),
        None if config.requires_template() => {
            anyhow::bail!("profile '{}' requires --template", cmd.profile)
        }
        None => None,
    };

    info!(
        "🧾 Format check: {} image(s) | profile: {}",
        cmd.images.len(),
        config.profile
    );

    let validator = Validator::new(template);
    let mut any_rejected = false;

    for path in &cmd.images {
        let bytes = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", path.display()))?;

        // Empty submissions are a boundary concern, not a pipeline one.
        let result = if bytes.is_empty() {
            ValidationResult::rejected(ReasonCode::NoImage)
        } else {
            validator.validate(&bytes, &config)
        };

        if !result.is_accepted() {
            any_rejected = true;
        }
        print_result(path, &result, cmd.json)?;
    }

    Ok(if any_rejected { 1 } else { 0 })
}

fn print_result(path: &std::path::Path, result: &ValidationResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(&result.report())?);
        return Ok(());
    }

    match result {
        ValidationResult::Accepted { similarity } => match similarity {
            Some(score) => println!(
                "{}: {} (similarity {score:.2})",
                path.display(),
                "ACCEPTED".green().bold()
            ),
            None => println!("{}: {}", path.display(), "ACCEPTED".green().bold()),
        },
        ValidationResult::Rejected {
            reason, similarity, ..
        } => match similarity {
            Some(score) => println!(
                "{}: {} {reason} (similarity {score:.2})",
                path.display(),
                "REJECTED".red().bold()
            ),
            None => println!("{}: {} {reason}", path.display(), "REJECTED".red().bold()),
        },
    }
    Ok(())
}


fn main() {
    let cli = Cli::parse();
    init_logging(&cli.verbosity);

    match &cli.command {
        Commands::Check(cmd) => match run_check(cmd) {
            Ok(code) => std::process::exit(code),
            Err(e) => {
                error!("❌ Format check failed: {e:#}");
                std::process::exit(2);
            }
        },
        Commands::Version => {
            println!("receipt-gate v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "Profiles: {}",
                ValidationConfig::profile_names().join(", ")
            );
            println!("Repository: {}", env!("CARGO_PKG_REPOSITORY"));
        }
    }
}
