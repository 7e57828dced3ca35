//! Extractor behavior over realistic malformed model output.
//!
//! Covers the repair scenarios the pipeline exists for: trailing commas,
//! truncated tails, unbalanced quotes, label prefixes, code fences, and the
//! safety property that no input makes extraction fail loudly.


use sift::extract::{
    has_balanced_quotes, normalize_literal, plan_steps, remove_trailing_commas, string_list,
    strip_code_fence, truncate_to_last_bracket,
};

#[test]
fn trailing_comma_list_repairs_cleanly() {
    // "['q1', 'q2',]" must parse to ["q1", "q2"].
    assert_eq!(string_list("['q1', 'q2',]"), vec!["q1", "q2"]);
}

#[test]
fn unbalanced_quote_input_yields_empty_not_panic() {
    // "['q1, 'q2']" has a mismatched quote; repair must abort to empty.
    assert!(string_list("['q1, 'q2']").is_empty());
    assert!(string_list(r#"['q1, "q2']"#).is_empty());
    assert!(string_list(r#"["q1, "q2"]"#).is_empty());
}

#[test]
fn truncated_tail_is_discarded_to_last_complete_list() {
    let raw = r#"["q1", "q2"] and then the model kept talking"#;
    assert_eq!(string_list(raw), vec!["q1", "q2"]);
}

#[test]
fn fenced_and_labeled_output_both_parse() {
    assert_eq!(
        string_list("related_questions: ['a?', 'b?', 'c?']"),
        vec!["a?", "b?", "c?"]
    );
    assert_eq!(
        string_list("```json\n[\"a?\", \"b?\"]\n```"),
        vec!["a?", "b?"]
    );
    let plan = plan_steps(
        "query_plan: ```json\n[{\"id\": 0, \"step\": \"s\", \"dependencies\": []}]\n```",
    );
    assert_eq!(plan.len(), 1);
}

#[test]
fn extractor_is_idempotent_on_already_valid_text() {
    // Running the repair stages over valid structured text must not change
    // what it parses to.
    let valid = r#"["q1", "q2"]"#;
    let repaired = remove_trailing_commas(valid);
    let repaired = truncate_to_last_bracket(&repaired).to_string();
    assert!(has_balanced_quotes(&repaired));
    assert_eq!(string_list(&repaired), string_list(valid));
    assert_eq!(normalize_literal(&repaired), valid);
}

#[test]
fn extractor_never_fails_on_arbitrary_input() {
    let hostile = [
        "",
        "   ",
        "null",
        "42",
        "\"just a string\"",
        "[[[[",
        "]]]]",
        "{\"unclosed\": ",
        "['mixed\", types]",
        "```",
        "``````",
        "data: DONE",
        "query_plan: ",
        "[{\"id\": -1, \"step\": \"neg\"}]",
        "[{\"id\": 0.5, \"step\": \"float\"}]",
        "\u{0}\u{1}\u{2}",
        "['\\'escaped\\'']",
    ];
    for raw in hostile {
        // Either an empty collection or a well-shaped value; never a panic.
        let _ = string_list(raw);
        let _ = plan_steps(raw);
    }
}

#[test]
fn plan_shape_mismatch_is_failure_not_partial_success() {
    // One bad element poisons the list: shape validation is all-or-nothing.
    let raw = r#"[{"id": 0, "step": "ok", "dependencies": []}, {"id": "one", "step": "bad"}]"#;
    assert!(plan_steps(raw).is_empty());
}

#[test]
fn single_quoted_plan_parses_via_literal_stage() {
    let raw = "[{'id': 0, 'step': 'Research pricing', 'dependencies': []}, \
               {'id': 1, 'step': 'Summarize', 'dependencies': [0]}]";
    let plan = plan_steps(raw);
    assert_eq!(plan.len(), 2);
    assert_eq!(plan[1].dependencies, vec![0]);
}

#[test]
fn code_fence_stripping_is_single_layer() {
    // Only one fence pair is removed; nested fences stay (and fail parsing).
    assert_eq!(strip_code_fence("```\n[1]\n```"), "[1]");
    assert!(string_list("```\n```\n['a']\n```\n```").is_empty());
}
