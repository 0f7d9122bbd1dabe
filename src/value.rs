/*
 * Copyright 2022, The Cozo Project Authors.
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
 * If a copy of the MPL was not distributed with this file,
 * You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! A thin layer over [`serde_json::Value`], the external JSON value model
//! the evaluator queries but never owns or mutates (§1: out of scope).

use smartstring::{LazyCompact, SmartString};

pub(crate) type Value = serde_json::Value;

/// The constant carried by a `ValueLiteral` rule: `true`/`false`/`null`
/// (null has its own dedicated [`crate::rule::Rule::Null`] variant and
/// never shows up here), an integer, a float, or a quoted string.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LiteralValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(SmartString<LazyCompact>),
}

impl LiteralValue {
    /// `value.is_string() && as_string() == s`-style equality, generalized
    /// to every literal type the grammar's `value_rule` production admits.
    pub(crate) fn matches(&self, value: &Value) -> bool {
        match self {
            LiteralValue::Bool(b) => value.as_bool() == Some(*b),
            LiteralValue::Int(i) => value.as_i64() == Some(*i),
            LiteralValue::UInt(u) => value.as_u64() == Some(*u),
            LiteralValue::Float(f) => value.as_f64() == Some(*f),
            LiteralValue::Str(s) => value.as_str() == Some(s.as_str()),
        }
    }
}

/// An integer range bound (`From`/`To`); the grammar's `range` production
/// only ever produces integer bounds (`int '..' [int]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bound {
    Signed(i64),
    Unsigned(u64),
}

impl Bound {
    pub(crate) fn from_digits(negative: bool, magnitude: u64) -> Bound {
        if negative {
            Bound::Signed(-(magnitude as i128) as i64)
        } else if magnitude <= i64::MAX as u64 {
            Bound::Signed(magnitude as i64)
        } else {
            Bound::Unsigned(magnitude)
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Bound::Signed(i) => i as f64,
            Bound::Unsigned(u) => u as f64,
        }
    }

    /// `value >= self`, for a `From` rule. Both sides are widened to
    /// `f64` for the comparison; JCR ranges bound ordinary document
    /// counters and sizes, not values near the `i64`/`u64`/`f64`
    /// precision edges.
    pub(crate) fn is_low_bound_for(self, value: &Value) -> bool {
        value.as_f64().map(|f| f >= self.as_f64()).unwrap_or(false)
    }

    /// `value <= self`, for a `To` rule.
    pub(crate) fn is_high_bound_for(self, value: &Value) -> bool {
        value.as_f64().map(|f| f <= self.as_f64()).unwrap_or(false)
    }
}

/// Is `value` a JSON number of either integer or floating representation?
pub(crate) fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64()
}

pub(crate) fn is_float(value: &Value) -> bool {
    value.is_f64()
}
