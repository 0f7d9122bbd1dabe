//! The seven concrete end-to-end scenarios exercising parsing and
//! evaluation together, schema text and verdicts lifted verbatim.

use serde_json::json;

fn parses(schema: &str) -> jcr::Ruleset {
    jcr::parse(schema).unwrap_or_else(|e| panic!("{schema:?} failed to parse: {e}"))
}

#[test]
fn literal_object_equality() {
    let rs = parses(r#"{ "line-count" : 3426, "word-count" : 27886 }"#);
    assert!(rs.validate(&json!({"line-count":3426,"word-count":27886})));
    assert!(!rs.validate(&json!({"line-count":3426,"word-count":27887})));
}

#[test]
fn typed_members() {
    let rs = parses(r#"{ "line-count" : integer, "word-count" : integer }"#);
    assert!(rs.validate(&json!({"line-count":3426,"word-count":27886})));
}

#[test]
fn range_lower_bound() {
    let rs = parses(r#"{ "line-count" : 3427.., "word-count" : 0.. }"#);
    assert!(!rs.validate(&json!({"line-count":3426,"word-count":27886})));
}

#[test]
fn named_rules() {
    let rs = parses(
        "{ fn, lc, wc }\nfn \"file-name\":string\nlc \"line-count\":0..\nwc \"word-count\":0..",
    );
    assert!(rs.validate(&json!({
        "file-name":"rfc7159.txt",
        "line-count":3426,
        "word-count":27886,
    })));
}

#[test]
fn optional_member() {
    let rs = parses("{ m1, ?m2 }\nv1 : 0..3\nm1 \"m1\":v1\nm2 \"m2\":v1");
    assert!(rs.validate(&json!({"m1": 1})));
    assert!(!rs.validate(&json!({"m2": 2})));
}

#[test]
fn repeating_array_element() {
    let rs = parses(
        "[v1,*o1]\nv1:0..3\nm1 \"m1\":v1\nm2 \"m2\":v1\no1:{m1,?m2}",
    );
    assert!(rs.validate(&json!([0, {"m1":1}, {"m1":3}])));
    assert!(!rs.validate(&json!([0, {"m1":1}, {"m1":5}])));
}

#[test]
fn uri_builtin() {
    let rs = parses("uri");
    assert!(rs.validate(&json!("http://www.ietf.org/rfc/rfc2396.txt")));
    assert!(!rs.validate(&json!("{/id*")));
}
