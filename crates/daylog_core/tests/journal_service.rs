use chrono::NaiveDate;
use daylog_core::db::open_db_in_memory;
use daylog_core::{
    DateKey, DocumentRepository, DuplicateHeaderPolicy, EntryGroup, FixedClock, JournalConfig,
    JournalService, JournalServiceError, MergeError, PhraseGroup, PreparedBatch, Resolution,
    SqliteDocumentRepository, Summarizer, SummarizerError, SummaryPayload, UnparsedDatePolicy,
};
use rusqlite::Connection;

fn clock() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2025, 9, 21).unwrap())
}

fn key(value: &str) -> DateKey {
    DateKey::parse_canonical(value).unwrap()
}

fn service(
    conn: &Connection,
    config: JournalConfig,
) -> JournalService<SqliteDocumentRepository<'_>, FixedClock> {
    let repo = SqliteDocumentRepository::try_new(conn).unwrap();
    JournalService::with_clock(repo, clock(), config)
}

fn seed(conn: &Connection, text: &str) {
    let repo = SqliteDocumentRepository::try_new(conn).unwrap();
    repo.save_document(&JournalConfig::default().document_key, text)
        .unwrap();
}

#[test]
fn missing_document_loads_as_empty() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, JournalConfig::default());
    let doc = service.load_document().unwrap();
    assert!(doc.is_empty());
    assert_eq!(doc.serialize(), "");
}

#[test]
fn prepare_conflict_and_overwrite_flow() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, "9.21.2025\n- old1\n- old2\n9.20.2025\n- keep");
    let service = service(&conn, JournalConfig::default());

    let batch = service
        .prepare_json(r#"[{"date": "today", "phrases": ["new1"]}, {"date": "9/19/2025", "phrases": ["older"]}]"#)
        .unwrap();
    let report = service.conflict_report(&batch).unwrap();
    assert_eq!(report.affected, vec![key("9.21.2025"), key("9.19.2025")]);
    assert_eq!(report.existing, vec![key("9.21.2025")]);
    assert_eq!(
        report.preview,
        vec![(key("9.21.2025"), vec!["- old1".to_string(), "- old2".to_string()])]
    );

    let outcome = service
        .commit(&batch, &Resolution::OverwriteSelected(report.existing.clone()))
        .unwrap();
    assert!(outcome.saved);
    assert_eq!(outcome.overwritten, vec![key("9.21.2025")]);
    assert_eq!(
        outcome.document,
        "9.21.2025\n- new1\n9.20.2025\n- keep\n\n9.19.2025\n- older"
    );
    assert_eq!(service.load_document().unwrap().serialize(), outcome.document);
}

#[test]
fn append_all_keeps_existing_content() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, "9.21.2025\n- old\n");
    let service = service(&conn, JournalConfig::default());

    let batch = service.prepare_json(r#"["Walked the dog"]"#).unwrap();
    let outcome = service.commit(&batch, &Resolution::AppendAll).unwrap();
    assert_eq!(outcome.document, "9.21.2025\n- old\n- Walked the dog\n");
    assert_eq!(outcome.groups_applied, 1);
}

#[test]
fn empty_group_is_not_counted_as_overwritten() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, "9.21.2025\n- old");
    let service = service(&conn, JournalConfig::default());

    let batch = PreparedBatch {
        groups: vec![EntryGroup::new(key("9.21.2025"), Vec::new())],
        ..PreparedBatch::default()
    };
    let outcome = service
        .commit(&batch, &Resolution::OverwriteSelected(vec![key("9.21.2025")]))
        .unwrap();
    assert!(outcome.overwritten.is_empty());
    assert_eq!(outcome.document, "9.21.2025\n- old");
}

#[test]
fn cancel_leaves_storage_untouched() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, "9.21.2025\n- old");
    let service = service(&conn, JournalConfig::default());

    let batch = service.prepare_json(r#"["something new"]"#).unwrap();
    let outcome = service.commit(&batch, &Resolution::Cancel).unwrap();
    assert!(!outcome.saved);
    assert_eq!(outcome.document, "9.21.2025\n- old");
    assert_eq!(service.load_document().unwrap().serialize(), "9.21.2025\n- old");
}

#[test]
fn unparsed_dates_are_reported_not_defaulted() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, JournalConfig::default());

    let batch = service
        .prepare_json(r#"[{"date": "the other day", "phrases": ["x"]}, {"phrases": ["y"]}]"#)
        .unwrap();
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].index, 0);
    assert_eq!(batch.failures[0].error.expression(), "the other day");
    assert!(!batch.failures[0].defaulted_to_today);
    assert_eq!(batch.groups.len(), 1);
    assert_eq!(batch.groups[0].date, key("9.21.2025"));
    assert_eq!(batch.groups[0].entries, vec!["- y".to_string()]);
}

#[test]
fn default_to_today_policy_is_explicit_opt_in() {
    let conn = open_db_in_memory().unwrap();
    let config = JournalConfig {
        unparsed_dates: UnparsedDatePolicy::DefaultToToday,
        ..JournalConfig::default()
    };
    let service = service(&conn, config);

    let payload = SummaryPayload::Grouped(vec![PhraseGroup::new("someday", vec!["x".into()])]);
    let batch = service.prepare(&payload).unwrap();
    assert_eq!(batch.failures.len(), 1);
    assert!(batch.failures[0].defaulted_to_today);
    assert_eq!(batch.groups[0].date, key("9.21.2025"));
}

#[test]
fn strict_duplicate_policy_aborts_commit_without_saving() {
    let conn = open_db_in_memory().unwrap();
    let original = "9.21.2025\n- a\n9.21.2025\n- b";
    seed(&conn, original);
    let config = JournalConfig {
        duplicate_headers: DuplicateHeaderPolicy::Reject,
        ..JournalConfig::default()
    };
    let service = service(&conn, config);

    let batch = service.prepare_json(r#"["Went for a run"]"#).unwrap();
    let err = service.commit(&batch, &Resolution::AppendAll).unwrap_err();
    assert!(matches!(
        err,
        JournalServiceError::Merge(MergeError::DuplicateHeader(_))
    ));
    assert_eq!(service.load_document().unwrap().serialize(), original);
}

struct FailingSummarizer;

impl Summarizer for FailingSummarizer {
    fn summarize(&self, _utterance: &str) -> Result<SummaryPayload, SummarizerError> {
        Err(SummarizerError::Unavailable("offline".to_string()))
    }
}

struct FixedSummarizer;

impl Summarizer for FixedSummarizer {
    fn summarize(&self, _utterance: &str) -> Result<SummaryPayload, SummarizerError> {
        Ok(SummaryPayload::Grouped(vec![PhraseGroup::new(
            "yesterday",
            vec!["Fixed the fence".into()],
        )]))
    }
}

#[test]
fn utterances_fall_back_to_local_summarizer() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn, JournalConfig::default());

    let batch = service
        .prepare_utterance("I repaired the old bike. Ok", Some(&FailingSummarizer))
        .unwrap();
    assert_eq!(batch.groups.len(), 1);
    assert_eq!(batch.groups[0].date, key("9.21.2025"));
    assert_eq!(batch.groups[0].entries, vec!["- Repaired the old bike".to_string()]);

    let batch = service
        .prepare_utterance("ignored", Some(&FixedSummarizer))
        .unwrap();
    assert_eq!(batch.groups[0].date, key("9.20.2025"));
}

#[test]
fn custom_document_key_is_isolated() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, "9.1.2025\n- default key");
    let config = JournalConfig {
        document_key: "daylog.other".to_string(),
        ..JournalConfig::default()
    };
    let service = service(&conn, config);
    assert!(service.load_document().unwrap().is_empty());
}

#[test]
fn non_utf8_blob_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
    repo.save_blob("daylog.document", &[0xff, 0xfe]).unwrap();
    let service = service(&conn, JournalConfig::default());
    assert!(matches!(
        service.load_document(),
        Err(JournalServiceError::Repo(_))
    ));
}
