//! Invariants/laws and boundary behaviors.

use jcr::{Parser, ParseErrorKind};
use serde_json::json;

fn parses(schema: &str) -> jcr::Ruleset {
    jcr::parse(schema).unwrap_or_else(|e| panic!("{schema:?} failed to parse: {e}"))
}

/// Law 1: a literal-only schema validates the document formed by erasing
/// its own structural punctuation and keeping the literal values.
#[test]
fn literal_schema_validates_its_own_erasure() {
    let rs = parses(r#"{ "a":1, "b":"x", "c":[2,3] }"#);
    assert!(rs.validate(&json!({"a":1, "b":"x", "c":[2,3]})));
}

/// Law 2: validation is deterministic.
#[test]
fn validate_is_deterministic() {
    let rs = parses(r#"{ "line-count":integer, ?"note":string }"#);
    let doc = json!({"line-count": 12});
    let first = rs.validate(&doc);
    for _ in 0..50 {
        assert_eq!(rs.validate(&doc), first);
    }
}

/// Law 3: validation never mutates the document it's given.
#[test]
fn validate_does_not_mutate_the_document() {
    let rs = parses(r#"{ "a":integer }"#);
    let doc = json!({"a": 1});
    let before = doc.clone();
    rs.validate(&doc);
    rs.validate(&doc);
    assert_eq!(doc, before);
}

/// Law 4: an absent key on a `min==0` (or `Optional`-wrapped) member
/// passes, whether the zero arises from `?` or from an explicit `0*` rep.
#[test]
fn absent_optional_member_passes() {
    let question_mark = parses(r#"{ ?"x":integer }"#);
    assert!(question_mark.validate(&json!({})));

    let explicit_zero_rep = parses(r#"{ 0*"x":integer }"#);
    assert!(explicit_zero_rep.validate(&json!({})));

    let required = parses(r#"{ "x":integer }"#);
    assert!(!required.validate(&json!({})));
}

/// Law 5: adding an optional member to a schema never turns a passing
/// document into a failing one.
#[test]
fn adding_an_optional_member_preserves_passing_documents() {
    let base = parses(r#"{ "a":integer }"#);
    let extended = parses(r#"{ "a":integer, ?"b":string }"#);
    let doc = json!({"a": 5});
    assert!(base.validate(&doc));
    assert!(extended.validate(&doc));
}

#[test]
fn empty_object_matches_any_object() {
    let rs = parses("{}");
    assert!(rs.validate(&json!({})));
    assert!(rs.validate(&json!({"anything": [1, 2, "x"]})));
    assert!(!rs.validate(&json!([1, 2])));
}

#[test]
fn empty_array_matches_any_array() {
    let rs = parses("[]");
    assert!(rs.validate(&json!([])));
    assert!(rs.validate(&json!([1, "a", {"b": 2}])));
    assert!(!rs.validate(&json!({})));
}

/// `*` as a bare repetition prefix is `0*`-unbounded; compared here by
/// behavioral equivalence over several documents rather than by
/// inspecting internal representation.
#[test]
fn bare_star_repetition_equals_zero_star() {
    let bare_star = parses("[*integer]");
    let zero_star = parses("[0*integer]");
    for doc in [json!([]), json!([1]), json!([1, 2, 3]), json!(["x"])] {
        assert_eq!(bare_star.validate(&doc), zero_star.validate(&doc));
    }
}

/// `n..n` as a repetition equals plain `n`.
#[test]
fn exact_range_repetition_equals_bare_count() {
    let bare_two = parses("[2*2 integer]");
    let count_two = parses("[2 integer]");
    for doc in [json!([]), json!([1]), json!([1, 2]), json!([1, 2, 3])] {
        assert_eq!(bare_two.validate(&doc), count_two.validate(&doc));
    }
}

#[test]
fn deepest_legal_nesting_equals_configured_max_depth() {
    let depth = 5;
    let mut schema = String::new();
    for _ in 0..depth {
        schema.push_str("{\"a\":");
    }
    schema.push_str("integer");
    for _ in 0..depth {
        schema.push('}');
    }

    let parser = Parser::with_max_depth(depth);
    assert!(parser.parse(&schema).is_ok());

    let one_too_deep = format!("{{\"a\":{schema}}}");
    let err = Parser::with_max_depth(depth).parse(&one_too_deep).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MaxDepthExceeded);
}
