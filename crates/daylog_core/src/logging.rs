//! Rolling file logs for the journal core.
//!
//! # Responsibility
//! - Start one file logger per process on request of the host.
//! - Keep events metadata-only: journal text and phrases never reach a log.
//!
//! # Invariants
//! - Repeating `init_logging` with the same target is a no-op.
//! - A different level or directory after the first start is an error.
//! - Panics are recorded once a logger is running.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, LogSpecification, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::path::{Path, PathBuf};

const LOG_BASENAME: &str = "daylog";
const ROTATE_AT_BYTES: u64 = 4 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const PANIC_MESSAGE_CHARS: usize = 200;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

/// Validated `(level, directory)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogTarget {
    level: LevelFilter,
    dir: PathBuf,
}

impl LogTarget {
    fn parse(level: &str, dir: &str) -> Result<Self, String> {
        let level = normalize_level(level)?;
        let dir = dir.trim();
        if dir.is_empty() {
            return Err("log directory is blank".to_string());
        }
        let dir = PathBuf::from(dir);
        if dir.is_relative() {
            return Err(format!(
                "log directory `{}` is relative; pass an absolute path",
                dir.display()
            ));
        }
        Ok(Self { level, dir })
    }
}

struct ActiveLogger {
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Starts file logging at `level` into `log_dir`.
///
/// # Errors
/// - Unknown level, or a blank or relative directory.
/// - The directory cannot be created or the backend fails to start.
/// - A logger is already running with another level or directory.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let target = LogTarget::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start(target.clone()))?;
    if active.target != target {
        return Err(format!(
            "logging already running at level {} in `{}`; refusing to switch to level {} in `{}`",
            active.target.level,
            active.target.dir.display(),
            target.level,
            target.dir.display()
        ));
    }
    Ok(())
}

/// Level and directory of the running logger, if any.
pub fn logging_status() -> Option<(LevelFilter, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.target.level, active.target.dir.clone()))
}

/// Level used when a config does not name one.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Parses a level name; `warning` is accepted for `warn`.
pub(crate) fn normalize_level(level: &str) -> Result<LevelFilter, String> {
    let name = level.trim();
    if name.eq_ignore_ascii_case("warning") {
        return Ok(LevelFilter::Warn);
    }
    match name.parse::<LevelFilter>() {
        Ok(LevelFilter::Off) | Err(_) => Err(format!(
            "unsupported log level `{name}`; use trace, debug, info, warn or error"
        )),
        Ok(filter) => Ok(filter),
    }
}

/// Single line, at most `max_chars` characters plus an ellipsis.
pub(crate) fn sanitize_message(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars().map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch });
    let mut out: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}

fn start(target: LogTarget) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&target.dir)
        .map_err(|err| format!("cannot create `{}`: {err}", target.dir.display()))?;

    let spec = LogSpecification::builder().default(target.level).build();
    let handle = Logger::with(spec)
        .log_to_file(
            FileSpec::default()
                .directory(&target.dir)
                .basename(LOG_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("logger backend failed to start: {err}"))?;

    record_panics(&target.dir);
    info!(
        "event=logging_start module=logging status=ok level={} version={}",
        target.level,
        env!("CARGO_PKG_VERSION")
    );
    Ok(ActiveLogger {
        target,
        _handle: handle,
    })
}

fn record_panics(dir: &Path) {
    // Runs once: `start` is only reached from inside `ACTIVE` initialization.
    let dir = dir.display().to_string();
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let location = panic
            .location()
            .map_or_else(|| "unknown".to_string(), |at| format!("{}:{}", at.file(), at.line()));
        error!(
            "event=panic module=logging status=error location={location} log_dir={dir} message={}",
            sanitize_message(&panic_message(panic.payload()), PANIC_MESSAGE_CHARS)
        );
        previous(panic);
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        return (*text).to_string();
    }
    payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_else(|| "<non-text panic payload>".to_string())
}
