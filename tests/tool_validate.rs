use perplexity_search_mcp::tool::validate::{validate, MAX_QUERY_CHARS};
use perplexity_search_mcp::tool::SearchArgs;
use perplexity_search_mcp::SearchToolError;
use serde_json::json;

fn assert_invalid(args: SearchArgs) -> String {
    match validate(&args) {
        Err(SearchToolError::Validation(msg)) => msg,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_num_results_is_clamped() {
    for (requested, expected) in [(0, 1), (100, 30), (10, 10), (1, 1), (30, 30)] {
        let request = validate(&SearchArgs::new("q").with_num_results(requested)).unwrap();
        assert_eq!(request.num_results(), expected, "requested {requested}");
    }
}

#[test]
fn test_defaults() {
    let request = validate(&SearchArgs::new("rust")).unwrap();
    assert_eq!(request.query(), "rust");
    assert_eq!(request.num_results(), 10);
    assert_eq!(request.domain_filter(), None);
}

#[test]
fn test_query_is_trimmed() {
    let request = validate(&SearchArgs::new("\t  tokio select  \n")).unwrap();
    assert_eq!(request.query(), "tokio select");
}

#[test]
fn test_whitespace_query_rejected() {
    let msg = assert_invalid(SearchArgs::new("   \n\t "));
    assert!(msg.starts_with("empty query"));

    let msg = assert_invalid(SearchArgs::new(""));
    assert!(msg.starts_with("empty query"));
}

#[test]
fn test_query_length_boundary() {
    let at_limit = "a".repeat(MAX_QUERY_CHARS);
    assert!(validate(&SearchArgs::new(at_limit)).is_ok());

    let over = "a".repeat(MAX_QUERY_CHARS + 1);
    let msg = assert_invalid(SearchArgs::new(over));
    assert!(msg.contains("4096"));
}

#[test]
fn test_query_length_counts_characters_not_bytes() {
    let multibyte = "é".repeat(MAX_QUERY_CHARS);
    assert!(validate(&SearchArgs::new(multibyte)).is_ok());
}

#[test]
fn test_domain_filter_deduplicated_in_order() {
    let request = validate(
        &SearchArgs::new("q").with_domain_filter(["a.com", "a.com", "b.com"]),
    )
    .unwrap();
    assert_eq!(
        request.domain_filter(),
        Some(&["a.com".to_string(), "b.com".to_string()][..])
    );
}

#[test]
fn test_domain_filter_lowercased_before_dedup() {
    let request = validate(
        &SearchArgs::new("q").with_domain_filter(["Example.com", " example.COM ", "docs.rs"]),
    )
    .unwrap();
    assert_eq!(
        request.domain_filter(),
        Some(&["example.com".to_string(), "docs.rs".to_string()][..])
    );
}

#[test]
fn test_domain_filter_rejects_paths_and_schemes() {
    for bad in ["bad.com/path", "https://a.com", "a.com:443", "under_score.com", "a b.com"] {
        let msg = assert_invalid(SearchArgs::new("q").with_domain_filter([bad]));
        assert!(msg.contains("search_domain_filter[0]"), "{bad}: {msg}");
    }
}

#[test]
fn test_domain_filter_reports_offending_index() {
    let msg = assert_invalid(SearchArgs::new("q").with_domain_filter(["ok.com", "no/way"]));
    assert!(msg.contains("search_domain_filter[1]"));
}

#[test]
fn test_empty_domain_filter_rejected() {
    let msg = assert_invalid(SearchArgs::new("q").with_domain_filter(Vec::<String>::new()));
    assert!(msg.contains("at least one domain"));

    assert_invalid(SearchArgs::new("q").with_domain_filter(["  "]));
}

#[test]
fn test_overlong_hostname_rejected() {
    let host = format!("{}.com", "a".repeat(250));
    let msg = assert_invalid(SearchArgs::new("q").with_domain_filter([host]));
    assert!(msg.contains("253"));
}

#[test]
fn test_num_results_from_json_arguments() {
    let args: SearchArgs = serde_json::from_value(json!({
        "query": "q",
        "num_results": "12",
        "search_domain_filter": null
    }))
    .unwrap();
    let request = validate(&args).unwrap();
    assert_eq!(request.num_results(), 12);
    assert_eq!(request.domain_filter(), None);

    let args: SearchArgs =
        serde_json::from_value(json!({"query": "q", "num_results": "lots"})).unwrap();
    assert_invalid(args);
}

#[test]
fn test_validation_is_idempotent() {
    let args = SearchArgs::new("  q  ")
        .with_num_results(50)
        .with_domain_filter(["A.com", "a.com"]);
    let first = validate(&args).unwrap();

    let again = SearchArgs {
        query: first.query().to_string(),
        num_results: Some(json!(first.num_results())),
        search_domain_filter: first.domain_filter().map(<[String]>::to_vec),
    };
    assert_eq!(validate(&again).unwrap(), first);
}
