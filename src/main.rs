use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::info;

use coroutinelint::analysis::IssueRegistry;
use coroutinelint::report::ReportOptions;
use coroutinelint::{
    Analyzer, Config, FileFinder, FixApplier, ReportFormat, Reporter, RuleId,
};

/// coroutinelint - Coroutine and color lint checks for Android projects
#[derive(Parser, Debug)]
#[command(name = "coroutinelint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the project directory to analyze
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target directories to analyze (can be specified multiple times)
    #[arg(short, long)]
    target: Vec<PathBuf>,

    /// Patterns to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Rules to turn off, by id or code (can be specified multiple times)
    #[arg(long, value_name = "RULE")]
    disable: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Output file (instead of stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Apply the available fixes to the source files
    #[arg(long)]
    fix: bool,

    /// Dry run - show what would be fixed without making changes
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,

    /// Generate shell completions
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,

    /// List the available rules and exit
    #[arg(long)]
    list_rules: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Compact,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Compact => ReportFormat::Compact,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle shell completions
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose, cli.quiet);

    if cli.list_rules {
        list_rules(cli.verbose);
        return Ok(());
    }

    info!("coroutinelint v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;
    let has_errors = run_analysis(&config, &cli)?;

    if has_errors {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        // Try to load from default locations
        Config::from_default_locations(&cli.path)?
    };

    // Override with CLI arguments
    if !cli.target.is_empty() {
        config.targets = cli.target.clone();
    }
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    for name in &cli.disable {
        let rule = RuleId::from_id(name)
            .ok_or_else(|| miette::miette!("Unknown rule '{}', see --list-rules", name))?;
        config.disable(rule);
    }

    Ok(config)
}

/// One line per rule; `verbose` adds the long explanation
fn list_rules(verbose: bool) {
    for rule in IssueRegistry::rules() {
        println!(
            "{}  {:<20} {:<8} {:<12} P{}  {}",
            rule.code().magenta(),
            rule.id().bold(),
            rule.default_severity().as_str(),
            rule.category().as_str(),
            rule.priority(),
            rule.brief()
        );
        if verbose {
            println!("       {}\n", rule.explanation().dimmed());
        }
    }
}

/// Returns whether any error-severity diagnostic was reported
fn run_analysis(config: &Config, cli: &Cli) -> Result<bool> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;

    let start_time = Instant::now();
    let format = ReportFormat::from(cli.format);
    let interactive = format != ReportFormat::Json && cli.output.is_none();

    // Step 1: Discover files
    info!("Discovering files...");
    let finder = FileFinder::new(config);
    let files = finder.find_files(&cli.path)?;
    info!(
        "Found {} Kotlin files and {} resource files",
        files.kotlin.len(),
        files.resources.len()
    );

    if files.is_empty() {
        if interactive {
            println!("{}", "No Kotlin or resource files found.".yellow());
        }
        return Ok(false);
    }

    // Step 2: Resolve dependencies
    let dependencies = files.dependencies(&config.dependencies);

    // Step 3: Parse and check
    let mut analyzer = Analyzer::from_config(config);
    let progress = if cli.quiet {
        None
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .into_diagnostic()?
                .progress_chars("#>-"),
        );
        analyzer = analyzer.with_progress(pb.clone());
        Some(pb)
    };

    let result = analyzer.run(&files, &dependencies);
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    info!(
        "Analysis finished in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    // Step 4: Report
    let reporter = Reporter::with_options(
        format,
        ReportOptions {
            output_path: cli.output.clone(),
            base_path: Some(cli.path.clone()),
        },
    );
    reporter.report(&result)?;

    // Step 5: Apply fixes
    if cli.fix || cli.dry_run {
        let mut applier = FixApplier::new(cli.dry_run);
        applier.collect(&result.diagnostics);
        let summary = applier.apply_all();

        let verb = if cli.dry_run { "Would apply" } else { "Applied" };
        let line = format!(
            "{} {} fixes in {} files ({} failed, {} skipped as overlapping)",
            verb,
            summary.fixes_applied,
            summary.files_modified,
            summary.fixes_failed,
            summary.fixes_skipped
        );
        if interactive {
            println!("{}", line.green());
            for path in &summary.modified_files {
                println!("  {}", path.display().to_string().dimmed());
            }
        } else {
            info!("{}", line);
        }
        for error in &summary.errors {
            tracing::warn!("{}", error);
        }
    }

    Ok(result.has_errors())
}
