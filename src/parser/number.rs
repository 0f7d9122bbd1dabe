/*
 * Copyright 2022, The Cozo Project Authors.
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
 * If a copy of the MPL was not distributed with this file,
 * You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Digit-run scanning and the completion-character dispatch that decides
//! whether a run of digits is an integer, a float, a range bound, or a
//! repetition count. Same mechanism driving all four; the grammar only
//! tells them apart by what immediately follows the digits.

use crate::error::{ErrorHandler, ParseError, ParseErrorKind};
use crate::rule::{Repetition, Rule, RuleId};
use crate::value::{Bound, LiteralValue};

use super::Scanner;

impl<'a, H: ErrorHandler> Scanner<'a, H> {
    /// Scans a run of one or more ASCII digits. `allow_leading_zero` is
    /// `false` for a numeric value/range/repeat literal (`01` is not a
    /// number) and `true` for a float's fractional part, where a leading
    /// zero is ordinary (`3.05`).
    pub(super) fn scan_digit_run(&mut self, allow_leading_zero: bool) -> Result<String, ParseError> {
        let mut digits = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            digits.push(self.bump().unwrap());
        }
        if digits.is_empty() {
            return Err(self.fatal(ParseErrorKind::InvalidNumber));
        }
        if !allow_leading_zero && digits.len() > 1 && digits.starts_with('0') {
            return Err(self.fatal(ParseErrorKind::LeadingZero));
        }
        Ok(digits)
    }

    fn maybe_scan_exponent(&mut self) -> Result<String, ParseError> {
        if !matches!(self.peek(), Some('e') | Some('E')) {
            return Ok(String::new());
        }
        let mut exp = String::new();
        exp.push(self.bump().unwrap());
        if matches!(self.peek(), Some('+') | Some('-')) {
            exp.push(self.bump().unwrap());
        }
        exp.push_str(&self.scan_digit_run(true)?);
        Ok(exp)
    }

    /// A digit run (`digits`, `negative` recording a leading `-`) has
    /// already been scanned; the next character decides whether it
    /// finishes as a range, a float, or a plain integer `ValueLiteral`.
    pub(super) fn finish_numeric_value(
        &mut self,
        digits: String,
        negative: bool,
    ) -> Result<RuleId, ParseError> {
        if self.peek() == Some('.') && self.peek2() == Some('.') {
            self.bump();
            self.bump();
            let magnitude: u64 = digits.parse().unwrap_or(u64::MAX);
            let lo = Bound::from_digits(negative, magnitude);
            let lo_id = self.ruleset.push(Rule::From(lo));
            return match self.peek() {
                Some(c) if c.is_ascii_digit() || c == '-' => {
                    let hi_negative = self.peek() == Some('-');
                    if hi_negative {
                        self.bump();
                    }
                    let hi_digits = self.scan_digit_run(false)?;
                    let hi_magnitude: u64 = hi_digits.parse().unwrap_or(u64::MAX);
                    let hi = Bound::from_digits(hi_negative, hi_magnitude);
                    let hi_id = self.ruleset.push(Rule::To(hi));
                    Ok(self.ruleset.push(Rule::Composite(lo_id, hi_id)))
                }
                _ => Ok(lo_id),
            };
        }
        if self.peek() == Some('.') {
            self.bump();
            let frac = self.scan_digit_run(true)?;
            let exp = self.maybe_scan_exponent()?;
            let text = format!("{}{}.{}{}", if negative { "-" } else { "" }, digits, frac, exp);
            let value: f64 = match text.parse() {
                Ok(v) => v,
                Err(_) => return Err(self.fatal(ParseErrorKind::InvalidNumber)),
            };
            return Ok(self.ruleset.push(Rule::ValueLiteral(LiteralValue::Float(value))));
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let exp = self.maybe_scan_exponent()?;
            let text = format!("{}{}{}", if negative { "-" } else { "" }, digits, exp);
            let value: f64 = match text.parse() {
                Ok(v) => v,
                Err(_) => return Err(self.fatal(ParseErrorKind::InvalidNumber)),
            };
            return Ok(self.ruleset.push(Rule::ValueLiteral(LiteralValue::Float(value))));
        }
        let magnitude: u64 = digits.parse().unwrap_or(u64::MAX);
        let literal = if negative {
            LiteralValue::Int(-(magnitude as i128) as i64)
        } else if magnitude <= i64::MAX as u64 {
            LiteralValue::Int(magnitude as i64)
        } else {
            LiteralValue::UInt(magnitude)
        };
        Ok(self.ruleset.push(Rule::ValueLiteral(literal)))
    }

    /// Entry point for a `rule_body` beginning with `-` or a digit.
    pub(super) fn parse_numeric_or_range(&mut self) -> Result<RuleId, ParseError> {
        let negative = self.peek() == Some('-');
        if negative {
            self.bump();
        }
        let digits = self.scan_digit_run(false)?;
        self.finish_numeric_value(digits, negative)
    }

    /// `'..' int`, entered with no digits consumed before the leading `.`:
    /// a range with no lower bound. Unlike the `int '..' [int]` form, the
    /// upper bound here is mandatory in the grammar.
    pub(super) fn parse_range_no_lower(&mut self) -> Result<RuleId, ParseError> {
        self.bump();
        self.bump();
        let negative = self.peek() == Some('-');
        if negative {
            self.bump();
        }
        let digits = self.scan_digit_run(false)?;
        let magnitude: u64 = digits.parse().unwrap_or(u64::MAX);
        let hi = Bound::from_digits(negative, magnitude);
        Ok(self.ruleset.push(Rule::To(hi)))
    }

    /// `['?'] [rep]` leading an object member; `None` when no digit or
    /// `*` opens a repetition prefix at all, so the member has the
    /// default `1*1` arity.
    pub(super) fn maybe_parse_repeat(&mut self) -> Result<Option<Repetition>, ParseError> {
        match self.peek() {
            Some('*') => {
                self.bump();
                let max = self.maybe_scan_max_digits()?;
                Ok(Some(match max {
                    Some(m) => Repetition::at_most(m),
                    None => Repetition::bare_star(),
                }))
            }
            Some(c) if c.is_ascii_digit() => {
                let digits = self.scan_digit_run(false)?;
                let n: u32 = digits.parse().unwrap_or(u32::MAX);
                if self.peek() == Some('*') {
                    self.bump();
                    let max = self.maybe_scan_max_digits()?;
                    Ok(Some(match max {
                        Some(m) => Repetition::between(n, m),
                        None => Repetition::at_least(n),
                    }))
                } else {
                    Ok(Some(Repetition::exactly(n)))
                }
            }
            _ => Ok(None),
        }
    }

    pub(super) fn maybe_scan_max_digits(&mut self) -> Result<Option<u32>, ParseError> {
        if matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            let digits = self.scan_digit_run(false)?;
            Ok(Some(digits.parse().unwrap_or(u32::MAX)))
        } else {
            Ok(None)
        }
    }
}
