//! Command-line surface over the journal core.
//!
//! # Responsibility
//! - Let a caller inspect conflicts and choose append or selective overwrite.
//! - Keep all journal semantics inside `daylog_core`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use daylog_core::db::{open_db, Connection};
use daylog_core::{
    fallback_phrases, init_logging, DateKey, DateNormalizer, JournalConfig, JournalService,
    MergeEngine, PreparedBatch, Resolution, SqliteDocumentRepository,
};

#[derive(Debug, Parser)]
#[command(name = "daylog")]
#[command(about = "Date-sectioned journal merge tool")]
struct Cli {
    #[arg(long, global = true, default_value = "./daylog.sqlite3")]
    db: PathBuf,

    /// JSON config file; missing fields take defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Absolute directory for rolling log files. Logging is off without it.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalize one date expression to its M.D.YYYY key.
    Normalize(NormalizeArgs),
    /// Run the local fallback summarizer over an utterance.
    Segment { text: String },
    /// Print the stored journal.
    Show,
    /// Report which dates of a summarizer payload already have content.
    Conflicts(GroupsArgs),
    /// Merge a summarizer payload into the journal.
    Merge(MergeArgs),
    /// Summarize an utterance locally and append it under today.
    Record { utterance: String },
}

#[derive(Debug, Args)]
struct NormalizeArgs {
    expression: String,
    /// Reference date (M.D.YYYY) instead of the local date.
    #[arg(long)]
    today: Option<String>,
}

#[derive(Debug, Args)]
struct GroupsArgs {
    /// Summarizer JSON file.
    #[arg(long)]
    groups: PathBuf,
}

#[derive(Debug, Args)]
struct MergeArgs {
    #[command(flatten)]
    input: GroupsArgs,
    /// Date whose section body is replaced; repeatable. Accepts any
    /// recognized date expression.
    #[arg(long = "overwrite")]
    overwrite: Vec<String>,
    /// Print the merged journal instead of saving it.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir).map_err(|err| anyhow!(err))?;
    }

    match cli.command {
        Command::Normalize(args) => run_normalize(&args),
        Command::Segment { text } => {
            for phrase in fallback_phrases(&text) {
                println!("- {phrase}");
            }
            Ok(())
        }
        Command::Show => {
            let conn = open_db(&cli.db).context("failed to open journal store")?;
            let service = journal_service(&conn, config)?;
            print!("{}", service.load_document()?);
            Ok(())
        }
        Command::Conflicts(args) => {
            let conn = open_db(&cli.db).context("failed to open journal store")?;
            let service = journal_service(&conn, config)?;
            let batch = read_batch(&service, &args.groups)?;
            let report = service.conflict_report(&batch)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Command::Merge(args) => {
            let conn = open_db(&cli.db).context("failed to open journal store")?;
            let service = journal_service(&conn, config)?;
            let batch = read_batch(&service, &args.input.groups)?;
            let resolution = if args.overwrite.is_empty() {
                Resolution::AppendAll
            } else {
                let normalizer = service.normalizer();
                let dates = args
                    .overwrite
                    .iter()
                    .map(|expression| normalizer.normalize(expression))
                    .collect::<Result<Vec<_>, _>>()?;
                Resolution::OverwriteSelected(dates)
            };
            if args.dry_run {
                let doc = service.load_document()?;
                let engine = MergeEngine::new(service.config().merge_options());
                let merged = match &resolution {
                    Resolution::OverwriteSelected(dates) => {
                        engine.overwrite_selected(&doc, &batch.groups, dates)?
                    }
                    _ => engine.append(&doc, &batch.groups)?,
                };
                print!("{merged}");
                return Ok(());
            }
            let outcome = service.commit(&batch, &resolution)?;
            eprintln!(
                "merged {} group(s); overwrote {} section(s)",
                outcome.groups_applied,
                outcome.overwritten.len()
            );
            Ok(())
        }
        Command::Record { utterance } => {
            let conn = open_db(&cli.db).context("failed to open journal store")?;
            let service = journal_service(&conn, config)?;
            let batch = service.prepare_utterance(&utterance, None)?;
            if batch.is_empty() {
                return Err(anyhow!("nothing worth recording in the utterance"));
            }
            let outcome = service.commit(&batch, &Resolution::AppendAll)?;
            eprintln!("recorded {} group(s)", outcome.groups_applied);
            Ok(())
        }
    }
}

fn run_normalize(args: &NormalizeArgs) -> Result<()> {
    let today = match args.today.as_deref() {
        Some(value) => DateKey::parse_canonical(value)?
            .to_date()
            .ok_or_else(|| anyhow!("`{value}` is not a real date"))?,
        None => Local::now().date_naive(),
    };
    let key = DateNormalizer::new(today).normalize(&args.expression)?;
    println!("{key}");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<JournalConfig> {
    let Some(path) = path else {
        return Ok(JournalConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    Ok(JournalConfig::from_json_str(&text)?)
}

fn journal_service(
    conn: &Connection,
    config: JournalConfig,
) -> Result<JournalService<SqliteDocumentRepository<'_>>> {
    let repo = SqliteDocumentRepository::try_new(conn)?;
    Ok(JournalService::new(repo, config))
}

fn read_batch(
    service: &JournalService<SqliteDocumentRepository<'_>>,
    path: &Path,
) -> Result<PreparedBatch> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read groups {}", path.display()))?;
    let batch = service.prepare_json(&json)?;
    for issue in &batch.issues {
        eprintln!("skipped: {issue}");
    }
    for failure in &batch.failures {
        let action = if failure.defaulted_to_today {
            "filed under today"
        } else {
            "left out"
        };
        eprintln!("group {}: {} ({action})", failure.index, failure.error);
    }
    Ok(batch)
}
