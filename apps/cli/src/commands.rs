//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use crtrack_core::pipeline::{ProgressReporter, ReportOutcome, ReportRequest};
use crtrack_shared::{
    AppConfig, ReportSettings, config_file_path, init_config, load_config, load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// crtrack: who worked on which CR, from weekly status files.
#[derive(Parser)]
#[command(
    name = "crtrack",
    version,
    about = "Build a CR assignment matrix and a CR-grouped digest from status files.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.crtrack/crtrack.toml).
    #[arg(long, global = true, env = "CRTRACK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate the assignment matrix and the consolidated digest.
    Report {
        /// Folder holding the CR list, roster, and status files.
        folder: PathBuf,

        /// Write reports here instead of into the status folder.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Append newly discovered CRs to the CR list.
        #[arg(long)]
        persist_new: bool,

        /// Omit the full-title row above the matrix header.
        #[arg(long)]
        no_titles_row: bool,

        /// Print the run summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the CR work blocks found in a single status file.
    Scan {
        /// Status file to scan.
        file: PathBuf,

        /// Person name (defaults to the file stem).
        #[arg(short, long)]
        person: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "crtrack=info",
        1 => "crtrack=debug",
        _ => "crtrack=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    match cli.command {
        Command::Report {
            folder,
            out,
            persist_new,
            no_titles_row,
            json,
        } => cmd_report(
            config_path.as_deref(),
            &folder,
            out,
            persist_new,
            no_titles_row,
            json,
        ),
        Command::Scan { file, person } => cmd_scan(&file, person),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path.as_deref()),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_report(
    config_path: Option<&Path>,
    folder: &Path,
    out: Option<PathBuf>,
    persist_new: bool,
    no_titles_row: bool,
    json: bool,
) -> Result<()> {
    let config = resolve_config(config_path)?;

    let mut settings = ReportSettings::from(&config);
    if persist_new {
        settings.persist_new_crs = true;
    }
    if no_titles_row {
        settings.titles_row = false;
    }

    if !folder.is_dir() {
        return Err(eyre!("'{}' is not a valid directory", folder.display()));
    }

    let request = ReportRequest {
        folder: folder.to_path_buf(),
        output_dir: out,
        settings,
        generated_at: chrono::Local::now().naive_local(),
    };

    info!(folder = %folder.display(), "building CR report");

    let reporter = CliProgress::new(!json);
    let outcome = crtrack_core::pipeline::run_report(&request, &reporter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_summary(&outcome);
    }

    Ok(())
}

fn print_summary(outcome: &ReportOutcome) {
    println!();
    println!("  Reports created!");
    println!("  Matrix:  {}", outcome.matrix_path.display());
    println!("  Digest:  {}", outcome.digest_path.display());
    println!("  Team:    {} members", outcome.team_size);
    println!(
        "  CRs:     {} ({} with activity)",
        outcome.cr_count, outcome.active_cr_count
    );
    println!("  Time:    {:.1}s", outcome.elapsed.as_secs_f64());

    if !outcome.new_crs.is_empty() {
        let labels: Vec<String> = outcome.new_crs.iter().map(|c| c.label()).collect();
        let note = if outcome.new_crs_persisted {
            " (added to CR list)"
        } else {
            ""
        };
        println!("  New:     {}{note}", labels.join(", "));
    }

    for path in &outcome.unreadable {
        println!("  Warning: could not read {}", path.display());
    }
    for person in &outcome.unlisted_people {
        println!("  Warning: {person} is not on the team roster");
    }

    println!();
    println!("  Assignment summary:");
    for person in &outcome.assignments {
        if person.crs.is_empty() {
            println!("    {}: no assignments found", person.name);
        } else {
            let labels: Vec<String> = person.crs.iter().map(|c| c.label()).collect();
            println!("    {}: {}", person.name, labels.join(", "));
        }
    }
    println!();
}

fn cmd_scan(file: &Path, person: Option<String>) -> Result<()> {
    let mut doc = crtrack_core::sources::read_document(file)?;
    if let Some(name) = person {
        doc.person = name;
    }

    let blocks = crtrack_scanner::scan_person(&doc);
    info!(person = %doc.person, blocks = blocks.len(), "scanned status file");

    if blocks.is_empty() {
        println!("No CR work blocks found in {}", file.display());
        return Ok(());
    }

    for (cr, block) in &blocks {
        let marker = if cr.is_trackable() { "" } else { " (not tracked)" };
        println!("{} [{}]{marker}", cr.label(), block.person);
        for line in block.text.lines() {
            println!("    {line}");
        }
        println!();
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config written to {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let source = match config_path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };
    let config = resolve_config(config_path)?;
    println!("# {}", source.display());
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new(visible: bool) -> Self {
        if !visible {
            return Self {
                spinner: ProgressBar::hidden(),
            };
        }
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn document_read(&self, person: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Reading [{current}/{total}] {person}"));
    }

    fn done(&self, _outcome: &ReportOutcome) {
        self.spinner.finish_and_clear();
    }
}
