use daylog_core::{fallback_phrases, segment, FallbackSummarizer, Summarizer, SummaryPayload};

#[test]
fn splits_on_sentences_semicolons_and_connectives() {
    let pieces = segment(
        "I went to the gym. Then I had lunch with Sam; and then watched a movie, then slept",
    );
    assert_eq!(
        pieces,
        vec![
            "Went to the gym".to_string(),
            "Lunch with Sam".to_string(),
            "Watched a movie".to_string(),
            "Slept".to_string(),
        ]
    );
}

#[test]
fn specific_openers_are_stripped_before_bare_i() {
    assert_eq!(
        segment("I had lunch. I was tired. I went and got coffee"),
        vec!["Lunch".to_string(), "Tired".to_string(), "Got coffee".to_string()]
    );
}

#[test]
fn decimal_points_do_not_split() {
    assert_eq!(segment("ran 3.5 miles"), vec!["Ran 3.5 miles".to_string()]);
}

#[test]
fn strips_filler_and_trailing_punctuation() {
    assert_eq!(
        segment("so I fixed the bike!!; I'm done?"),
        vec!["Fixed the bike".to_string(), "Done".to_string()]
    );
}

#[test]
fn empty_input_yields_nothing() {
    assert!(segment("").is_empty());
    assert!(segment(" . ; then ").is_empty());
}

#[test]
fn fallback_applies_word_floor_and_piece_cap() {
    let utterance = "Woke up early today. Ok. Made some strong coffee. Read the news briefly. \
                     Walked the dog outside. Called my mom back. Cleaned the whole kitchen.";
    let phrases = fallback_phrases(utterance);
    assert_eq!(phrases.len(), 5);
    assert_eq!(phrases[0], "Woke up early today");
    assert!(!phrases.iter().any(|phrase| phrase == "Ok"));
    assert!(phrases.iter().all(|phrase| phrase.split_whitespace().count() >= 3));
}

#[test]
fn fallback_summarizer_returns_ungrouped_payload() {
    let payload = FallbackSummarizer.summarize("Fixed the leaking sink").unwrap();
    assert_eq!(
        payload,
        SummaryPayload::Ungrouped(vec!["Fixed the leaking sink".to_string()])
    );
}
