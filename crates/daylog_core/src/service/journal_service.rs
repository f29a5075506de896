//! Journal use-case service.
//!
//! # Responsibility
//! - Run the session flow: load document, prepare groups, report conflicts,
//!   commit the caller's resolution, save.
//! - Keep CLI/UI callers decoupled from storage and merge details.
//!
//! # Invariants
//! - The stored document changes only after the merge engine succeeded.
//! - `Resolution::Cancel` never touches storage.
//! - "Today" is read once per call from the injected clock.

use crate::config::JournalConfig;
use crate::dates::normalize::{Clock, DateNormalizer, DateParseError, SystemClock};
use crate::merge::conflict::ConflictReport;
use crate::merge::engine::{MergeEngine, MergeError};
use crate::merge::prepare::{prepare_groups, PreparedBatch};
use crate::model::date_key::DateKey;
use crate::model::document::Document;
use crate::model::phrase_group::SummaryPayload;
use crate::payload::{parse_summary_json, PayloadError};
use crate::repo::document_repo::{DocumentRepository, RepoError};
use crate::segment::fallback::{summarize_with_fallback, Summarizer};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for journal use-cases.
#[derive(Debug)]
pub enum JournalServiceError {
    Payload(PayloadError),
    Date(DateParseError),
    Merge(MergeError),
    Repo(RepoError),
}

impl Display for JournalServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Payload(err) => write!(f, "{err}"),
            Self::Date(err) => write!(f, "{err}"),
            Self::Merge(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for JournalServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Payload(err) => Some(err),
            Self::Date(err) => Some(err),
            Self::Merge(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<PayloadError> for JournalServiceError {
    fn from(value: PayloadError) -> Self {
        Self::Payload(value)
    }
}

impl From<DateParseError> for JournalServiceError {
    fn from(value: DateParseError) -> Self {
        Self::Date(value)
    }
}

impl From<MergeError> for JournalServiceError {
    fn from(value: MergeError) -> Self {
        Self::Merge(value)
    }
}

impl From<RepoError> for JournalServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Caller's choice after seeing the conflict report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Append every group; nothing is removed.
    AppendAll,
    /// Replace the bodies of these dates; other groups append.
    OverwriteSelected(Vec<DateKey>),
    /// Discard the batch.
    Cancel,
}

/// Result of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Whether a new document was saved.
    pub saved: bool,
    /// Document text after the commit (unchanged on cancel).
    pub document: String,
    /// Number of groups merged.
    pub groups_applied: usize,
    /// Dates whose bodies were replaced and that existed before.
    pub overwritten: Vec<DateKey>,
}

/// Journal service facade over a document repository.
pub struct JournalService<R: DocumentRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
    config: JournalConfig,
}

impl<R: DocumentRepository> JournalService<R, SystemClock> {
    /// Creates a service reading "today" from the local clock.
    pub fn new(repo: R, config: JournalConfig) -> Self {
        Self::with_clock(repo, SystemClock, config)
    }
}

impl<R: DocumentRepository, C: Clock> JournalService<R, C> {
    pub fn with_clock(repo: R, clock: C, config: JournalConfig) -> Self {
        Self {
            repo,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    /// Normalizer bound to the clock's current date.
    pub fn normalizer(&self) -> DateNormalizer {
        DateNormalizer::from_clock(&self.clock)
    }

    /// Loads and parses the stored document.
    pub fn load_document(&self) -> Result<Document, JournalServiceError> {
        let text = self.repo.load_document(&self.config.document_key)?;
        Ok(Document::parse(&text))
    }

    /// Normalizes an already validated payload.
    pub fn prepare(&self, payload: &SummaryPayload) -> Result<PreparedBatch, JournalServiceError> {
        let batch = prepare_groups(payload, &self.normalizer(), self.config.unparsed_dates)?;
        info!(
            "event=batch_prepare module=service status=ok groups={} failures={}",
            batch.groups.len(),
            batch.failures.len()
        );
        Ok(batch)
    }

    /// Validates summarizer JSON and normalizes it.
    pub fn prepare_json(&self, json: &str) -> Result<PreparedBatch, JournalServiceError> {
        let parsed = parse_summary_json(json)?;
        let mut batch = self.prepare(&parsed.payload)?;
        batch.issues = parsed.issues;
        Ok(batch)
    }

    /// Summarizes an utterance (primary, then local fallback) and normalizes it.
    pub fn prepare_utterance(
        &self,
        utterance: &str,
        primary: Option<&dyn Summarizer>,
    ) -> Result<PreparedBatch, JournalServiceError> {
        let payload = summarize_with_fallback(primary, utterance);
        self.prepare(&payload)
    }

    /// Reports which batch dates already have content in the stored document.
    pub fn conflict_report(
        &self,
        batch: &PreparedBatch,
    ) -> Result<ConflictReport, JournalServiceError> {
        let doc = self.load_document()?;
        Ok(ConflictReport::build(&doc, &batch.groups))
    }

    /// Applies `resolution` to the stored document and saves the result.
    pub fn commit(
        &self,
        batch: &PreparedBatch,
        resolution: &Resolution,
    ) -> Result<CommitOutcome, JournalServiceError> {
        let doc = self.load_document()?;
        let engine = MergeEngine::new(self.config.merge_options());

        let (next, overwritten) = match resolution {
            Resolution::Cancel => {
                info!("event=journal_commit module=service status=cancelled");
                return Ok(CommitOutcome {
                    saved: false,
                    document: doc.serialize(),
                    groups_applied: 0,
                    overwritten: Vec::new(),
                });
            }
            Resolution::AppendAll => (engine.append(&doc, &batch.groups)?, Vec::new()),
            Resolution::OverwriteSelected(dates) => {
                let overwritten = dates
                    .iter()
                    .filter(|key| doc.has_section(key))
                    .filter(|key| {
                        batch
                            .groups
                            .iter()
                            .any(|group| &group.date == *key && !group.entries.is_empty())
                    })
                    .cloned()
                    .collect::<Vec<_>>();
                (
                    engine.overwrite_selected(&doc, &batch.groups, dates)?,
                    overwritten,
                )
            }
        };

        let text = next.serialize();
        self.repo.save_document(&self.config.document_key, &text)?;
        info!(
            "event=journal_commit module=service status=ok groups={} overwritten={} sections={}",
            batch.groups.len(),
            overwritten.len(),
            next.sections().len()
        );

        Ok(CommitOutcome {
            saved: true,
            document: text,
            groups_applied: batch.groups.len(),
            overwritten,
        })
    }
}
