/*
 * Copyright 2022, The Cozo Project Authors.
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
 * If a copy of the MPL was not distributed with this file,
 * You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The rule arena and the evaluator that walks it against a JSON value.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use smartstring::{LazyCompact, SmartString};

use crate::status::Status;
use crate::value::{is_float, is_integer, Bound, LiteralValue, Value};

pub(crate) type Name = SmartString<LazyCompact>;

/// A stable index into a [`Ruleset`]'s arena. References between rules
/// (named-rule lookups aside) are always by `RuleId`, never by pointer.
/// Keeps the otherwise-cyclic named-rule graph safe to build and share
/// across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(pub(crate) u32);

/// A regex pattern compiled lazily on first evaluation and cached for the
/// arena's lifetime.
#[derive(Debug)]
pub(crate) struct LazyRegex {
    source: Name,
    compiled: OnceLock<Regex>,
}

impl LazyRegex {
    pub(crate) fn new(source: impl Into<Name>) -> Self {
        LazyRegex {
            source: source.into(),
            compiled: OnceLock::new(),
        }
    }

    /// Compile-on-first-use; an unparsable pattern degenerates to "never
    /// matches" rather than panicking mid-evaluation, since validation is
    /// total (§4.2: "every rule returns exactly one status; no
    /// exceptions").
    fn get(&self) -> &Regex {
        self.compiled.get_or_init(|| {
            log::trace!("compiling regex pattern {:?}", self.source);
            Regex::new(&self.source).unwrap_or_else(|_| Regex::new("\\z\\A\\b^$").unwrap())
        })
    }
}

const UNBOUNDED: u32 = u32::MAX;

/// Every variant from the data model, tagged and holding its own
/// parameters. Children of `Object`/`Array`/`Group` and the inner rule of
/// member/repeat wrappers are stored as `RuleId`s into the owning
/// [`Ruleset`]'s arena.
#[derive(Debug)]
pub(crate) enum Rule {
    AnyBoolean,
    AnyInteger,
    AnyFloat,
    AnyString,
    Null,
    ValueLiteral(LiteralValue),
    From(Bound),
    To(Bound),
    Composite(RuleId, RuleId),
    StringLiteral(Name),
    StringPattern(LazyRegex),
    QStringMember {
        name: Name,
        min: u32,
        max: u32,
        inner: RuleId,
    },
    RegexMember {
        pattern: LazyRegex,
        min: u32,
        max: u32,
        inner: RuleId,
    },
    Optional(RuleId),
    Object {
        sequence: bool,
        children: Vec<RuleId>,
    },
    Array {
        sequence: bool,
        children: Vec<RuleId>,
    },
    Group {
        sequence: bool,
        children: Vec<RuleId>,
    },
    RepeatArrayItem {
        min: u32,
        max: u32,
        inner: RuleId,
    },
    RuleRef(Name),
    Uri,
}

/// The eight names pre-registered before any user text is parsed
/// (`jcr_parser.hpp`'s `init()`).
pub(crate) const BUILTIN_NAMES: [&str; 8] = [
    "boolean", "float", "integer", "string", "true", "false", "null", "uri",
];

/// The complete compiled schema: a flat arena of rules, the designated
/// root, and the name table every `RuleRef` resolves against.
pub struct Ruleset {
    pub(crate) arena: Vec<Rule>,
    pub(crate) root: RuleId,
    pub(crate) named_rules: HashMap<Name, RuleId>,
}

impl Ruleset {
    /// An empty ruleset seeded with the eight builtin rules and a
    /// placeholder root (an always-failing, unreachable rule until the
    /// parser calls [`Ruleset::set_root`]).
    pub(crate) fn with_builtins() -> Self {
        let mut rs = Ruleset {
            arena: Vec::new(),
            root: RuleId(0),
            named_rules: HashMap::new(),
        };
        let b = rs.push(Rule::AnyBoolean);
        rs.named_rules.insert("boolean".into(), b);
        let f = rs.push(Rule::AnyFloat);
        rs.named_rules.insert("float".into(), f);
        let i = rs.push(Rule::AnyInteger);
        rs.named_rules.insert("integer".into(), i);
        let s = rs.push(Rule::AnyString);
        rs.named_rules.insert("string".into(), s);
        let t = rs.push(Rule::ValueLiteral(LiteralValue::Bool(true)));
        rs.named_rules.insert("true".into(), t);
        let fl = rs.push(Rule::ValueLiteral(LiteralValue::Bool(false)));
        rs.named_rules.insert("false".into(), fl);
        let n = rs.push(Rule::Null);
        rs.named_rules.insert("null".into(), n);
        let u = rs.push(Rule::Uri);
        rs.named_rules.insert("uri".into(), u);
        rs.root = rs.push(Rule::Null);
        rs
    }

    pub(crate) fn push(&mut self, rule: Rule) -> RuleId {
        let id = RuleId(self.arena.len() as u32);
        self.arena.push(rule);
        id
    }

    pub(crate) fn set_root(&mut self, id: RuleId) {
        self.root = id;
    }

    /// Binds `name` to `id`, replacing any previous binding (including a
    /// builtin; `Ruleset` invariant: "redefinition replaces").
    pub(crate) fn add_named_rule(&mut self, name: Name, id: RuleId) {
        self.named_rules.insert(name, id);
    }

    fn get(&self, id: RuleId) -> &Rule {
        &self.arena[id.0 as usize]
    }

    /// `validate(json_value) -> bool`: dispatches to the root rule with
    /// `optional = false`, `index = 0`, and collapses the four-valued
    /// status to the public boolean contract.
    pub fn validate(&self, value: &serde_json::Value) -> bool {
        self.evaluate(self.root, value, false, 0).is_truthy()
    }

    pub(crate) fn evaluate(&self, id: RuleId, value: &Value, optional: bool, index: usize) -> Status {
        match self.get(id) {
            Rule::AnyBoolean => bool_status(value.is_boolean()),
            Rule::AnyInteger => bool_status(is_integer(value)),
            Rule::AnyFloat => bool_status(is_float(value)),
            Rule::AnyString => bool_status(value.is_string()),
            Rule::Null => bool_status(value.is_null()),
            Rule::ValueLiteral(lit) => bool_status(lit.matches(value)),
            Rule::From(lo) => bool_status(is_integer(value) && lo.is_low_bound_for(value)),
            Rule::To(hi) => bool_status(is_integer(value) && hi.is_high_bound_for(value)),
            Rule::Composite(a, b) => bool_status(
                self.evaluate(*a, value, optional, index) == Status::Pass
                    && self.evaluate(*b, value, optional, index) == Status::Pass,
            ),
            Rule::StringLiteral(s) => bool_status(value.as_str() == Some(s.as_str())),
            Rule::StringPattern(re) => {
                bool_status(value.as_str().is_some_and(|s| re.get().is_match(s)))
            }
            Rule::Uri => bool_status(is_uri(value)),
            Rule::QStringMember {
                name,
                min,
                max: _,
                inner,
            } => self.evaluate_qstring_member(value, optional, *min, name, *inner, index),
            Rule::RegexMember {
                pattern,
                min,
                max,
                inner,
            } => self.evaluate_regex_member(value, optional, *min, *max, pattern, *inner, index),
            Rule::Optional(inner) => self.evaluate(*inner, value, true, index),
            Rule::RuleRef(name) => match self.named_rules.get(name) {
                Some(id) => self.evaluate(*id, value, optional, index),
                None => Status::Fail,
            },
            Rule::RepeatArrayItem { min, max, inner } => {
                self.evaluate_repeat_array_item(value, optional, *min, *max, *inner, index)
            }
            Rule::Object { sequence, children } => {
                self.evaluate_object(children, *sequence, value, optional, index)
            }
            Rule::Array { sequence, children } => {
                self.evaluate_array(children, *sequence, value, optional)
            }
            Rule::Group { sequence, children } => {
                self.evaluate_group(children, *sequence, value, optional, index)
            }
        }
    }

    fn evaluate_qstring_member(
        &self,
        value: &Value,
        optional: bool,
        min: u32,
        name: &str,
        inner: RuleId,
        index: usize,
    ) -> Status {
        let Some(obj) = value.as_object() else {
            return Status::Fail;
        };
        match obj.get(name) {
            None => bool_status(optional || min == 0),
            Some(v) => self.evaluate(inner, v, false, index),
        }
    }

    fn evaluate_regex_member(
        &self,
        value: &Value,
        optional: bool,
        min: u32,
        max: u32,
        pattern: &LazyRegex,
        inner: RuleId,
        index: usize,
    ) -> Status {
        let Some(obj) = value.as_object() else {
            return Status::Fail;
        };
        let re = pattern.get();
        let count = obj
            .iter()
            .filter(|(k, _)| re.is_match(k))
            .take(max as usize)
            .filter(|(_, v)| self.evaluate(inner, v, optional, index) != Status::Fail)
            .count();
        bool_status(count as u32 >= min)
    }

    fn evaluate_repeat_array_item(
        &self,
        value: &Value,
        optional: bool,
        min: u32,
        max: u32,
        inner: RuleId,
        index: usize,
    ) -> Status {
        if index as u32 >= max {
            return Status::Fail;
        }
        let result = self.evaluate(inner, value, optional, index);
        if result == Status::Fail {
            return Status::Fail;
        }
        if (index as u32) + 1 < min {
            Status::MustRepeat
        } else {
            Status::MayRepeat
        }
    }

    fn evaluate_object(
        &self,
        children: &[RuleId],
        sequence: bool,
        value: &Value,
        optional: bool,
        index: usize,
    ) -> Status {
        let mut result = Status::Pass;
        for &child in children {
            result = self.evaluate(child, value, optional, index);
            if sequence && result == Status::Fail {
                return result;
            }
            if !sequence && result == Status::Pass {
                return result;
            }
        }
        result
    }

    fn evaluate_array(
        &self,
        children: &[RuleId],
        sequence: bool,
        value: &Value,
        optional: bool,
    ) -> Status {
        let Some(items) = value.as_array() else {
            return Status::Fail;
        };
        if items.len() < children.len() {
            return Status::Fail;
        }
        let mut result = Status::Pass;
        let mut i = 0usize;
        let mut j = 0usize;
        while i < children.len() && j < items.len() {
            let mut sub_index = 0usize;
            loop {
                result = self.evaluate(children[i], &items[j], optional, sub_index);
                if sequence && result == Status::Fail {
                    return Status::Fail;
                }
                if !sequence && result == Status::Pass {
                    return Status::Pass;
                }
                j += 1;
                sub_index += 1;
                if !(result.wants_more() && j < items.len()) {
                    break;
                }
            }
            i += 1;
        }
        if result == Status::Fail || result == Status::MustRepeat {
            Status::Fail
        } else {
            Status::Pass
        }
    }

    /// A group's `k`-th element is the active rule for enclosing position
    /// `index`. `may_repeat`/`pass` is decided purely by whether more
    /// elements remain, discarding the selected child's own repetition
    /// status once it isn't a failure (grounded in `group_rule::do_validate`).
    fn evaluate_group(
        &self,
        children: &[RuleId],
        sequence: bool,
        value: &Value,
        optional: bool,
        index: usize,
    ) -> Status {
        if index < children.len() {
            let result = self.evaluate(children[index], value, optional, index);
            if sequence && result == Status::Fail {
                return Status::Fail;
            }
            if !sequence && result == Status::Pass {
                return Status::Pass;
            }
        }
        if index + 1 < children.len() {
            Status::MayRepeat
        } else {
            Status::Pass
        }
    }
}

fn bool_status(b: bool) -> Status {
    if b {
        Status::Pass
    } else {
        Status::Fail
    }
}

/// A tiny automaton: `scheme` must start with a letter and continue over
/// `[A-Za-z0-9+\-.]*`, ending at `:`. Anything after `:` is accepted
/// unconditionally.
fn is_uri(value: &Value) -> bool {
    let Some(s) = value.as_str() else {
        return false;
    };
    let mut chars = s.chars().peekable();
    match chars.peek() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    for c in chars {
        if c == ':' {
            return true;
        }
        if !(c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
            return false;
        }
    }
    false
}

/// `n*m`-style repetition bounds, with `*` represented as [`UNBOUNDED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Repetition {
    pub(crate) min: u32,
    pub(crate) max: u32,
}

impl Repetition {
    pub(crate) fn bare_star() -> Repetition {
        Repetition {
            min: 0,
            max: UNBOUNDED,
        }
    }

    pub(crate) fn exactly(n: u32) -> Repetition {
        Repetition { min: n, max: n }
    }

    pub(crate) fn at_least(n: u32) -> Repetition {
        Repetition {
            min: n,
            max: UNBOUNDED,
        }
    }

    pub(crate) fn at_most(n: u32) -> Repetition {
        Repetition { min: 0, max: n }
    }

    pub(crate) fn between(lo: u32, hi: u32) -> Repetition {
        Repetition { min: lo, max: hi }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rs() -> Ruleset {
        Ruleset::with_builtins()
    }

    #[test]
    fn builtins_resolve_by_name() {
        let rs = rs();
        let integer = *rs.named_rules.get("integer").unwrap();
        assert_eq!(rs.evaluate(integer, &json!(3), false, 0), Status::Pass);
        assert_eq!(rs.evaluate(integer, &json!("x"), false, 0), Status::Fail);
    }

    #[test]
    fn redefining_a_builtin_replaces_it() {
        let mut rs = rs();
        let custom = rs.push(Rule::Null);
        rs.add_named_rule("uri".into(), custom);
        let uri = *rs.named_rules.get("uri").unwrap();
        assert_eq!(rs.evaluate(uri, &json!(null), false, 0), Status::Pass);
        assert_eq!(
            rs.evaluate(uri, &json!("http://x"), false, 0),
            Status::Fail
        );
    }

    #[test]
    fn uri_requires_leading_letter_and_colon() {
        assert!(is_uri(&json!("http://www.ietf.org/rfc/rfc2396.txt")));
        assert!(!is_uri(&json!("{/id*")));
        assert!(!is_uri(&json!("1http://x")));
    }

    /// Scheme-shape cross-check against the upstream's own `uri_rule` test
    /// suite (`uri_rule_tests.cpp`'s `test_good_uri`/`test_bad_uri`): the
    /// automaton never looks past the scheme, so wildly different
    /// authority/path shapes all pass as long as the scheme is well-formed.
    #[test]
    fn uri_scheme_shape_matches_upstream_test_vectors() {
        for good in [
            "ftp://ftp.is.co.za/rfc/rfc1808.txt",
            "ldap://[2001:db8::7]/c=GB?objectClass?one",
            "mailto:John.Doe@example.com",
            "news:comp.infosystems.www.servers.unix",
            "tel:+1-816-555-1212",
            "telnet://192.0.2.16:80/",
            "urn:oasis:names:specification:docbook:dtd:xml:4.1.2",
        ] {
            assert!(is_uri(&json!(good)), "{good} should be a valid uri scheme shape");
        }
        assert!(!is_uri(&json!("{/id*")));
    }

    #[test]
    fn unresolved_rule_ref_fails_closed() {
        let rs = rs();
        let dangling = RuleId(9999);
        // constructing a RuleRef to a name never registered
        let mut rs = rs;
        let id = rs.push(Rule::RuleRef("nope".into()));
        assert_eq!(rs.evaluate(id, &json!(1), false, 0), Status::Fail);
        let _ = dangling;
    }

    #[test]
    fn empty_object_and_array_match_anything_of_that_kind() {
        let mut rs = rs();
        let empty_obj = rs.push(Rule::Object {
            sequence: true,
            children: vec![],
        });
        assert_eq!(
            rs.evaluate(empty_obj, &json!({"a": 1}), false, 0),
            Status::Pass
        );
        assert_eq!(rs.evaluate(empty_obj, &json!([1]), false, 0), Status::Fail);

        let empty_arr = rs.push(Rule::Array {
            sequence: true,
            children: vec![],
        });
        assert_eq!(
            rs.evaluate(empty_arr, &json!([1, 2, 3]), false, 0),
            Status::Pass
        );
    }

    #[test]
    fn qstring_member_absent_key_depends_on_min_and_optional() {
        let mut rs = rs();
        let inner = *rs.named_rules.get("integer").unwrap();
        let required = rs.push(Rule::QStringMember {
            name: "x".into(),
            min: 1,
            max: 1,
            inner,
        });
        let optional_member = rs.push(Rule::QStringMember {
            name: "x".into(),
            min: 0,
            max: 1,
            inner,
        });
        assert_eq!(rs.evaluate(required, &json!({}), false, 0), Status::Fail);
        assert_eq!(
            rs.evaluate(optional_member, &json!({}), false, 0),
            Status::Pass
        );
        assert_eq!(rs.evaluate(required, &json!({}), true, 0), Status::Pass);
    }

    #[test]
    fn regex_member_ignores_optional_flag() {
        let mut rs = rs();
        let inner = *rs.named_rules.get("integer").unwrap();
        let pattern = LazyRegex::new("^m[0-9]+$");
        let member = rs.push(Rule::RegexMember {
            pattern,
            min: 1,
            max: UNBOUNDED,
            inner,
        });
        assert_eq!(
            rs.evaluate(member, &json!({"m1": 1, "m2": "nope"}), false, 0),
            Status::Pass
        );
        assert_eq!(rs.evaluate(member, &json!({}), false, 0), Status::Fail);
    }
}
