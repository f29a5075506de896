//! Core logic for the daylog journal.
//!
//! The journal is one flat text document split into `M.D.YYYY` date sections
//! of `"- "` entries. This crate normalizes date expressions, parses the flat
//! text, detects which incoming dates collide with existing sections, and
//! merges or overwrites section content without disturbing anything else.

pub mod config;
pub mod dates;
pub mod db;
pub mod logging;
pub mod merge;
pub mod model;
pub mod payload;
pub mod repo;
pub mod segment;
pub mod service;

pub use config::{ConfigError, JournalConfig};
pub use dates::normalize::{
    normalize_date, Clock, DateNormalizer, DateParseError, FixedClock, SystemClock,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use merge::conflict::{affected_dates, existing_dates, preview, ConflictReport, Preview};
pub use merge::engine::{
    append, overwrite_selected, DuplicateHeaderPolicy, MergeEngine, MergeError, MergeOptions,
};
pub use merge::prepare::{prepare_groups, GroupFailure, PreparedBatch, UnparsedDatePolicy};
pub use model::date_key::{is_header_line, DateKey, DateKeyError};
pub use model::document::{is_entry_line, Document, Section, ENTRY_PREFIX};
pub use model::phrase_group::{to_entry_line, EntryGroup, PhraseGroup, SummaryPayload};
pub use payload::{
    parse_summary_json, payload_from_value, MalformedGroup, MalformedReason, ParsedPayload,
    PayloadError,
};
pub use repo::document_repo::{
    DocumentRepository, RepoError, RepoResult, SqliteDocumentRepository, DEFAULT_DOCUMENT_KEY,
};
pub use segment::bullets::segment;
pub use segment::fallback::{
    fallback_phrases, summarize_with_fallback, FallbackSummarizer, Summarizer, SummarizerError,
};
pub use service::journal_service::{
    CommitOutcome, JournalService, JournalServiceError, Resolution,
};
