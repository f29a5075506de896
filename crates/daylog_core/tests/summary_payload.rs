use chrono::NaiveDate;
use daylog_core::{
    parse_summary_json, prepare_groups, DateNormalizer, DateParseError, MalformedReason,
    PayloadError, PhraseGroup, SummaryPayload, UnparsedDatePolicy,
};

#[test]
fn grouped_array_is_validated_into_phrase_groups() {
    let parsed = parse_summary_json(
        r#"[
            {"date": "yesterday", "phrases": ["Went hiking", "Saw a heron"]},
            {"date": "9/21", "phrases": ["Baked bread"]}
        ]"#,
    )
    .unwrap();
    assert!(parsed.issues.is_empty());
    assert_eq!(
        parsed.payload,
        SummaryPayload::Grouped(vec![
            PhraseGroup::new("yesterday", vec!["Went hiking".into(), "Saw a heron".into()]),
            PhraseGroup::new("9/21", vec!["Baked bread".into()]),
        ])
    );
}

#[test]
fn malformed_groups_are_filtered_with_issues() {
    let parsed = parse_summary_json(
        r#"{"groups": [
            "not an object",
            {"date": "today"},
            {"date": "today", "phrases": [1, "  ", null]},
            {"date": "today", "phrases": ["kept", 7]},
            {"phrases": ["no date here"]}
        ]}"#,
    )
    .unwrap();

    let reasons: Vec<(usize, MalformedReason)> = parsed
        .issues
        .iter()
        .map(|issue| (issue.index, issue.reason.clone()))
        .collect();
    assert_eq!(
        reasons,
        vec![
            (0, MalformedReason::NotAnObject),
            (1, MalformedReason::MissingPhrases),
            (2, MalformedReason::DiscardedPhrases { count: 3 }),
            (2, MalformedReason::NoUsablePhrases),
            (3, MalformedReason::DiscardedPhrases { count: 1 }),
        ]
    );
    assert_eq!(
        parsed.payload,
        SummaryPayload::Grouped(vec![
            PhraseGroup::new("today", vec!["kept".into()]),
            PhraseGroup::undated(vec!["no date here".into()]),
        ])
    );
}

#[test]
fn null_date_is_missing_but_blank_date_is_kept() {
    let parsed =
        parse_summary_json(r#"[{"date": null, "phrases": ["a"]}, {"date": " ", "phrases": ["b"]}]"#)
            .unwrap();
    assert_eq!(
        parsed.payload,
        SummaryPayload::Grouped(vec![
            PhraseGroup::undated(vec!["a".into()]),
            PhraseGroup::new("", vec!["b".into()]),
        ])
    );
    assert!(parsed.issues.is_empty());
}

#[test]
fn blank_date_is_reported_instead_of_filed_under_today() {
    let normalizer = DateNormalizer::new(NaiveDate::from_ymd_opt(2025, 9, 21).unwrap());
    let parsed = parse_summary_json(r#"[{"date": "", "phrases": ["x"]}]"#).unwrap();

    let batch = prepare_groups(&parsed.payload, &normalizer, UnparsedDatePolicy::Report).unwrap();
    assert!(batch.groups.is_empty());
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.failures[0].index, 0);
    assert_eq!(batch.failures[0].error, DateParseError::Unrecognized(String::new()));

    let batch =
        prepare_groups(&parsed.payload, &normalizer, UnparsedDatePolicy::DefaultToToday).unwrap();
    assert_eq!(batch.groups.len(), 1);
    assert!(batch.failures[0].defaulted_to_today);
}

#[test]
fn unparseable_dates_are_passed_through_for_normalization() {
    let parsed = parse_summary_json(r#"[{"date": "the other day", "phrases": ["a"]}]"#).unwrap();
    assert_eq!(
        parsed.payload,
        SummaryPayload::Grouped(vec![PhraseGroup::new("the other day", vec!["a".into()])])
    );
}

#[test]
fn string_arrays_and_phrase_objects_are_ungrouped() {
    let parsed = parse_summary_json(r#"["Went hiking", "Saw a heron"]"#).unwrap();
    assert_eq!(
        parsed.payload,
        SummaryPayload::Ungrouped(vec!["Went hiking".into(), "Saw a heron".into()])
    );

    let parsed = parse_summary_json(r#"{"phrases": ["Baked bread", 3]}"#).unwrap();
    assert_eq!(
        parsed.payload,
        SummaryPayload::Ungrouped(vec!["Baked bread".into()])
    );
    assert_eq!(parsed.issues.len(), 1);
}

#[test]
fn invalid_json_and_shapes_are_errors() {
    assert!(matches!(parse_summary_json("{"), Err(PayloadError::Json(_))));
    assert!(matches!(
        parse_summary_json("42"),
        Err(PayloadError::UnsupportedShape(_))
    ));
    assert!(matches!(
        parse_summary_json(r#"{"summary": "x"}"#),
        Err(PayloadError::UnsupportedShape(_))
    ));
    assert!(matches!(
        parse_summary_json(r#"{"groups": "x"}"#),
        Err(PayloadError::UnsupportedShape(_))
    ));
}
