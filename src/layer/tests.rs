use super::{MatchOptions, PathPattern};
use crate::error::PatternErrorKind;
use regex::Regex;

fn compile(pattern: &str) -> PathPattern {
    PathPattern::new(pattern, MatchOptions::default()).unwrap()
}

#[test]
fn test_root_fast_path_matches_everything() {
    let root = PathPattern::new("/", MatchOptions::prefix()).unwrap();
    assert!(root.is_fast_root());
    for path in ["", "/", "/a/b", "anything"] {
        let m = root.matches(path).unwrap().unwrap();
        assert!(m.params.is_empty());
        assert_eq!(m.path, "");
    }
}

#[test]
fn test_root_with_end_is_not_fast() {
    let root = compile("/");
    assert!(!root.is_fast_root());
    assert!(root.matches("/").unwrap().is_some());
    assert!(root.matches("/a").unwrap().is_none());
}

#[test]
fn test_wildcard_fast_path() {
    let star = compile("*");
    assert!(star.is_fast_wildcard());
    let m = star.matches("/a/b").unwrap().unwrap();
    assert_eq!(m.params.get("0"), Some("/a/b"));
    assert_eq!(m.path, "/a/b");

    let m = star.matches("/caf%C3%A9").unwrap().unwrap();
    assert_eq!(m.params.get("0"), Some("/café"));
}

#[test]
fn test_named_parameter() {
    let p = compile("/users/:id");
    assert_eq!(p.keys().len(), 1);
    assert_eq!(p.keys()[0].name.as_ref(), "id");

    let m = p.matches("/users/42").unwrap().unwrap();
    assert_eq!(m.params.get("id"), Some("42"));
    assert_eq!(m.path, "/users/42");
    assert!(p.matches("/users").unwrap().is_none());
    assert!(p.matches("/users/42/posts").unwrap().is_none());
}

#[test]
fn test_trailing_slash_is_optional_unless_strict() {
    let loose = compile("/users/:id");
    assert!(loose.matches("/users/42/").unwrap().is_some());

    let strict = PathPattern::new(
        "/users/:id",
        MatchOptions {
            strict: true,
            ..MatchOptions::default()
        },
    )
    .unwrap();
    assert!(strict.matches("/users/42/").unwrap().is_none());
    assert!(strict.matches("/users/42").unwrap().is_some());
}

#[test]
fn test_case_sensitivity() {
    let insensitive = compile("/Users");
    assert!(insensitive.matches("/users").unwrap().is_some());

    let sensitive = PathPattern::new(
        "/Users",
        MatchOptions {
            sensitive: true,
            ..MatchOptions::default()
        },
    )
    .unwrap();
    assert!(sensitive.matches("/users").unwrap().is_none());
    assert!(sensitive.matches("/Users").unwrap().is_some());
}

#[test]
fn test_optional_parameter() {
    let p = compile("/files/:name?");
    let m = p.matches("/files").unwrap().unwrap();
    assert!(m.params.contains_key("name"));
    assert_eq!(m.params.get("name"), None);

    let m = p.matches("/files/readme").unwrap().unwrap();
    assert_eq!(m.params.get("name"), Some("readme"));
}

#[test]
fn test_repeat_parameters() {
    let plus = compile("/p/:segs+");
    let m = plus.matches("/p/a/b/c").unwrap().unwrap();
    assert_eq!(m.params.get("segs"), Some("a/b/c"));
    assert!(plus.matches("/p").unwrap().is_none());

    let star = compile("/p/:segs*");
    assert!(star.matches("/p").unwrap().is_some());
    assert!(plus.keys()[0].repeat);
    assert!(star.keys()[0].optional);
}

#[test]
fn test_custom_and_unnamed_groups() {
    let p = compile("/n/:num(\\d+)/(\\w+)");
    let m = p.matches("/n/7/abc").unwrap().unwrap();
    assert_eq!(m.params.get("num"), Some("7"));
    assert_eq!(m.params.get("0"), Some("abc"));
    assert!(p.matches("/n/x/abc").unwrap().is_none());
}

#[test]
fn test_dot_prefix() {
    let p = compile("/file.:ext");
    let m = p.matches("/file.json").unwrap().unwrap();
    assert_eq!(m.params.get("ext"), Some("json"));
}

#[test]
fn test_catch_all() {
    let p = compile("/static/*");
    let m = p.matches("/static/css/app.css").unwrap().unwrap();
    assert_eq!(m.params.get("0"), Some("css/app.css"));
}

#[test]
fn test_prefix_matching_stops_at_segment_boundary() {
    let p = PathPattern::new("/api", MatchOptions::prefix()).unwrap();
    let m = p.matches("/api/users").unwrap().unwrap();
    assert_eq!(m.path, "/api");
    assert!(p.matches("/apix").unwrap().is_none());

    let m = p.matches("/api/").unwrap().unwrap();
    assert_eq!(m.path, "/api/");
}

#[test]
fn test_prefix_boundary_picks_longer_alternative() {
    let p = PathPattern::new("/:lang(en|en-us)", MatchOptions::prefix()).unwrap();
    let m = p.matches("/en-us/page").unwrap().unwrap();
    assert_eq!(m.params.get("lang"), Some("en-us"));
    assert_eq!(m.path, "/en-us");

    let m = p.matches("/en/page").unwrap().unwrap();
    assert_eq!(m.params.get("lang"), Some("en"));
    assert_eq!(m.path, "/en");

    assert!(p.matches("/en-gb/page").unwrap().is_none());
}

#[test]
fn test_strict_prefix_keeps_trailing_slash_out_of_path() {
    let p = PathPattern::new(
        "/api",
        MatchOptions {
            strict: true,
            ..MatchOptions::prefix()
        },
    )
    .unwrap();
    assert_eq!(p.matches("/api/v1").unwrap().unwrap().path, "/api");
    assert_eq!(p.matches("/api").unwrap().unwrap().path, "/api");
    assert!(p.matches("/apiv1").unwrap().is_none());
}

#[test]
fn test_prefix_param() {
    let p = PathPattern::new("/users/:id", MatchOptions::prefix()).unwrap();
    let m = p.matches("/users/42/posts").unwrap().unwrap();
    assert_eq!(m.params.get("id"), Some("42"));
    assert_eq!(m.path, "/users/42");
}

#[test]
fn test_percent_decoding() {
    let p = compile("/x/:seg");
    let m = p.matches("/x/hello%20world").unwrap().unwrap();
    assert_eq!(m.params.get("seg"), Some("hello world"));
}

#[test]
fn test_malformed_encoding_fails_match() {
    let p = compile("/x/:seg");
    let err = p.matches("/x/a%E0").unwrap_err();
    assert_eq!(err.param, "a%E0");
}

#[test]
fn test_matching_is_deterministic() {
    let p = compile("/users/:id/:tab?");
    let first = p.matches("/users/7/posts").unwrap();
    let second = p.matches("/users/7/posts").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_path_does_not_match() {
    assert!(compile("/users/:id").matches("").unwrap().is_none());
    assert!(compile("*").matches("").unwrap().is_none());
}

#[test]
fn test_duplicate_names_keep_defined_over_undefined() {
    let re = Regex::new(r"^/(?:a/([^/]+)|b)(?:/([^/]+))?$").unwrap();
    let p = PathPattern::from_regex(re, &["id", "id"]);

    // second capture undefined: first value kept
    let m = p.matches("/a/1").unwrap().unwrap();
    assert_eq!(m.params.get("id"), Some("1"));

    // second capture defined: it lands
    let m = p.matches("/a/1/2").unwrap().unwrap();
    assert_eq!(m.params.get("id"), Some("2"));

    // first undefined, second defined
    let m = p.matches("/b/3").unwrap().unwrap();
    assert_eq!(m.params.get("id"), Some("3"));
}

#[test]
fn test_from_regex_uses_expression_as_given() {
    let re = Regex::new(r"^/v(\d+)").unwrap();
    let p = PathPattern::from_regex(re, &["version"]);
    assert_eq!(p.options(), MatchOptions::default());

    let m = p.matches("/v2/users").unwrap().unwrap();
    assert_eq!(m.path, "/v2");
    let params: Vec<_> = m.params.iter().collect();
    assert_eq!(params, vec![("version", Some("2"))]);
}

#[test]
fn test_from_regex_pads_missing_names() {
    let re = Regex::new(r"^/(\d+)/(\d+)$").unwrap();
    let p = PathPattern::from_regex(re, &["first"]);
    let m = p.matches("/1/2").unwrap().unwrap();
    assert_eq!(m.params.get("first"), Some("1"));
    assert_eq!(m.params.get("1"), Some("2"));
}

#[test]
fn test_syntax_errors() {
    let cases: &[(&str, PatternErrorKind)] = &[
        ("/a/(\\d+", PatternErrorKind::UnbalancedOpen),
        ("/a/b)", PatternErrorKind::UnbalancedClose),
        ("/a/()", PatternErrorKind::EmptyGroup),
        ("/a/:id((\\d+))", PatternErrorKind::CapturingGroup),
        ("/a/:", PatternErrorKind::MissingName),
        (
            "/a/:id/b/:id",
            PatternErrorKind::DuplicateName("id".to_string()),
        ),
        ("/a/?", PatternErrorKind::DanglingModifier('?')),
        ("/a\\", PatternErrorKind::TrailingEscape),
    ];

    for (pattern, kind) in cases {
        let err = PathPattern::new(pattern, MatchOptions::default()).unwrap_err();
        assert_eq!(&err.kind, kind, "pattern {pattern}");
        assert_eq!(err.pattern, *pattern);
    }
}

#[test]
fn test_non_capturing_group_allowed() {
    let p = compile("/v/:ver(v(?:1|2))");
    assert_eq!(
        p.matches("/v/v2").unwrap().unwrap().params.get("ver"),
        Some("v2")
    );
}

#[test]
fn test_escaped_characters_are_literal() {
    let p = compile("/a\\:b");
    assert!(p.keys().is_empty());
    assert!(p.matches("/a:b").unwrap().is_some());
}
