//! A sampling of the fixed error taxonomy (§6), plus the trailing-garbage
//! and max-depth checks that sit outside the per-kind table. Five kinds
//! (`InvalidJcrText`, `IllegalCharacterInString`, `ExpectedValue`,
//! `InvalidValue`, `ExpectedStar`) are part of the fixed enum but unreached
//! by this grammar (see `DESIGN.md` resolution 11) and are not exercised
//! here.

use jcr::{Parser, ParseErrorKind};

fn err_kind(schema: &str) -> ParseErrorKind {
    jcr::parse(schema)
        .err()
        .unwrap_or_else(|| panic!("{schema:?} was expected to fail to parse"))
        .kind
}

#[test]
fn unexpected_eof() {
    assert_eq!(err_kind(r#"{"a":1"#), ParseErrorKind::UnexpectedEof);
}

#[test]
fn extra_character_after_complete_ruleset() {
    assert_eq!(err_kind(r#""x" !"#), ParseErrorKind::ExtraCharacter);
}

#[test]
fn max_depth_exceeded() {
    let err = Parser::with_max_depth(2)
        .parse(r#"{"a":{"b":{"c":1}}}"#)
        .unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MaxDepthExceeded);
}

#[test]
fn single_quote_aborts_by_default() {
    assert_eq!(err_kind("'x'"), ParseErrorKind::SingleQuote);
}

#[test]
fn extra_comma_before_closing_brace() {
    assert_eq!(err_kind(r#"{"a":1,}"#), ParseErrorKind::ExtraComma);
}

#[test]
fn expected_object_member_name() {
    assert_eq!(err_kind("{:1}"), ParseErrorKind::ExpectedName);
}

#[test]
fn expected_name_separator_colon() {
    assert_eq!(err_kind(r#"{"a" 1}"#), ParseErrorKind::ExpectedColon);
}

#[test]
fn illegal_control_character_in_string() {
    let schema = format!("\"a{}b\"", '\u{1}');
    assert_eq!(err_kind(&schema), ParseErrorKind::IllegalControlCharacter);
}

#[test]
fn illegal_escaped_character_in_string() {
    assert_eq!(err_kind(r#""\q""#), ParseErrorKind::IllegalEscapedCharacter);
}

#[test]
fn expects_low_surrogate_after_high_surrogate() {
    assert_eq!(
        err_kind(r#""\uD800""#),
        ParseErrorKind::ExpectedCodepointSurrogatePair
    );
}

#[test]
fn invalid_hex_digit_in_unicode_escape() {
    assert_eq!(err_kind(r#""\u12zz""#), ParseErrorKind::InvalidHexEscapeSequence);
}

#[test]
fn lone_low_surrogate_is_not_a_valid_codepoint() {
    assert_eq!(
        err_kind(r#""\uDC00""#),
        ParseErrorKind::InvalidUnicodeEscapeSequence
    );
}

#[test]
fn leading_zero_in_a_number() {
    assert_eq!(err_kind("007"), ParseErrorKind::LeadingZero);
}

#[test]
fn invalid_number_bare_minus() {
    assert_eq!(err_kind("-a"), ParseErrorKind::InvalidNumber);
}

#[test]
fn expected_comma_or_right_brace() {
    assert_eq!(
        err_kind(r#"{"a":1 "b":2}"#),
        ParseErrorKind::ExpectedCommaOrRightBrace
    );
}

#[test]
fn expected_comma_or_right_bracket() {
    assert_eq!(err_kind("[1 2]"), ParseErrorKind::ExpectedCommaOrRightBracket);
}

#[test]
fn unexpected_right_brace_as_a_rule_body() {
    assert_eq!(err_kind("[}]"), ParseErrorKind::UnexpectedRightBrace);
}

#[test]
fn unexpected_right_bracket_as_a_rule_body() {
    assert_eq!(err_kind(r#"{"a":]}"#), ParseErrorKind::UnexpectedRightBracket);
}

#[test]
fn expected_rule_name_or_value() {
    assert_eq!(err_kind("[:]"), ParseErrorKind::ExpectedRuleOrValue);
}
