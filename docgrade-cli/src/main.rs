use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use docgrade::report::{write_report, write_rules, write_statistics, write_types};
use docgrade_core::{ReviewConfig, ReviewOrchestrator};

#[derive(Parser)]
#[command(name = "docgrade")]
#[command(about = "Grades Word HTML exports of academic documents against ABNT formatting rules")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Review a document and print (or save) the report
    Review {
        /// Word "Web Page" export (.htm / .html)
        file: PathBuf,

        /// Document type: monograph or article (detected when omitted)
        #[arg(short = 't', long = "type")]
        document_type: Option<String>,

        /// Write the JSON report here instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to a rule table (YAML, or JSON by extension)
        #[arg(short, long)]
        config: Option<String>,

        /// Log the duration of every pipeline step
        #[arg(long)]
        profile: bool,
    },
    /// Print document statistics
    Stats {
        file: PathBuf,

        #[arg(short, long)]
        config: Option<String>,
    },
    /// List supported document types and their required sections
    Types {
        #[arg(short, long)]
        config: Option<String>,
    },
    /// Print the rules being checked
    Rules {
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_env("DOCGRADE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&str>) -> ReviewConfig {
    if let Some(config_path) = path {
        tracing::info!("📋 Loading rules from: {}", config_path);
    }
    ReviewConfig::load_with_fallback(path)
}

fn main() {
    let args = Args::parse();
    init_logging(args.quiet);

    if let Err(e) = run(args.command) {
        eprintln!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::Review {
            file,
            document_type,
            output,
            config,
            profile,
        } => {
            let mut orchestrator =
                ReviewOrchestrator::for_word_html(load_config(config.as_deref())).with_profiling(profile);
            if let Some(requested) = document_type.as_deref() {
                orchestrator.set_document_type(requested)?;
            }

            let outcome = orchestrator.review_file(&file)?;
            match output {
                Some(path) => save_report(&outcome, &path)?,
                None => write_report(&mut out, &outcome.report)?,
            }
        }
        Command::Stats { file, config } => {
            let orchestrator = ReviewOrchestrator::for_word_html(load_config(config.as_deref()));
            let data = orchestrator.parse_file(&file)?;
            write_statistics(&mut out, &orchestrator.statistics(&data))?;
        }
        Command::Types { config } => write_types(&mut out, &load_config(config.as_deref()))?,
        Command::Rules { config } => write_rules(&mut out, &load_config(config.as_deref()))?,
    }
    Ok(())
}

fn save_report(outcome: &docgrade_core::ReviewOutcome, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(outcome)?;
    std::fs::write(output_path, json)?;
    tracing::info!(
        "💾 Report saved to: {} (grade {}, {}%)",
        output_path.display(),
        outcome.report.grade_label,
        outcome.report.scores.percentage
    );
    Ok(())
}
