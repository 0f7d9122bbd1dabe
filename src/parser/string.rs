/*
 * Copyright 2022, The Cozo Project Authors.
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
 * If a copy of the MPL was not distributed with this file,
 * You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Quoted-string and `/regex/` literal scanning, JSON escape decoding, and
//! the member-name-vs-bare-literal lookahead shared by object members,
//! group elements and named-rule bodies.

use crate::error::{ErrorHandler, ParseError, ParseErrorKind};
use crate::rule::{LazyRegex, Rule, RuleId};

use super::Scanner;

impl<'a, H: ErrorHandler> Scanner<'a, H> {
    /// Scans the body of a `"..."`, `'...'` or `/.../` literal. The
    /// opening delimiter has already been consumed. For strings, every
    /// JSON escape is decoded; for regex patterns, only `\/` and `\\` are
    /// unescaped, so ECMAScript class escapes (`\d`, `\s`, `\w`, ...)
    /// reach the `regex` crate unmangled instead of being mis-decoded as
    /// JSON string escapes.
    pub(super) fn scan_literal_body(&mut self, delim: char, is_regex: bool) -> Result<String, ParseError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.fatal(ParseErrorKind::UnexpectedEof)),
                Some(c) if c == delim => return Ok(out),
                Some('\\') => {
                    let escaped = match self.bump() {
                        Some(c) => c,
                        None => return Err(self.fatal(ParseErrorKind::UnexpectedEof)),
                    };
                    if is_regex {
                        match escaped {
                            '/' => out.push('/'),
                            '\\' => out.push('\\'),
                            other => {
                                out.push('\\');
                                out.push(other);
                            }
                        }
                    } else {
                        match escaped {
                            '"' => out.push('"'),
                            '\'' => out.push('\''),
                            '\\' => out.push('\\'),
                            '/' => out.push('/'),
                            'b' => out.push('\u{0008}'),
                            'f' => out.push('\u{000C}'),
                            'n' => out.push('\n'),
                            'r' => out.push('\r'),
                            't' => out.push('\t'),
                            'u' => out.push(self.scan_unicode_escape()?),
                            _ => return Err(self.fatal(ParseErrorKind::IllegalEscapedCharacter)),
                        }
                    }
                }
                Some(c) if (c as u32) < 0x20 => {
                    return Err(self.fatal(ParseErrorKind::IllegalControlCharacter));
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn scan_unicode_escape(&mut self) -> Result<char, ParseError> {
        let high = self.scan_hex4()?;
        if (0xD800..=0xDBFF).contains(&high) {
            if self.peek() != Some('\\') || self.peek2() != Some('u') {
                return Err(self.fatal(ParseErrorKind::ExpectedCodepointSurrogatePair));
            }
            self.bump();
            self.bump();
            let low = self.scan_hex4()?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(self.fatal(ParseErrorKind::ExpectedCodepointSurrogatePair));
            }
            let c = 0x10000u32 + (((high - 0xD800) as u32) << 10) + (low - 0xDC00) as u32;
            match char::from_u32(c) {
                Some(c) => Ok(c),
                None => Err(self.fatal(ParseErrorKind::InvalidUnicodeEscapeSequence)),
            }
        } else {
            match char::from_u32(high as u32) {
                Some(c) => Ok(c),
                None => Err(self.fatal(ParseErrorKind::InvalidUnicodeEscapeSequence)),
            }
        }
    }

    fn scan_hex4(&mut self) -> Result<u16, ParseError> {
        let mut value: u16 = 0;
        for _ in 0..4 {
            let c = match self.bump() {
                Some(c) => c,
                None => return Err(self.fatal(ParseErrorKind::InvalidUnicodeEscapeSequence)),
            };
            let digit = match c.to_digit(16) {
                Some(d) => d,
                None => return Err(self.fatal(ParseErrorKind::InvalidHexEscapeSequence)),
            };
            value = value * 16 + digit as u16;
        }
        Ok(value)
    }

    /// Scans a `"..."`, `'...'` or `/.../` form starting at the current
    /// position, then decides via a trailing `:` whether it names a
    /// member production (`QStringMember`/`RegexMember`, with `inner`
    /// parsed recursively) or is itself a bare string/regex value. Same
    /// ambiguity `jcr_parser.hpp`'s `expect_member_name_or_colon` state
    /// resolves by lookahead, never by backtracking.
    /// `require_colon` makes a missing `:` a hard error instead of a
    /// bare-value fallback, for the strict Object-member position.
    pub(super) fn parse_name_or_literal(
        &mut self,
        min: u32,
        max: u32,
        require_colon: bool,
    ) -> Result<RuleId, ParseError> {
        let is_regex = self.peek() == Some('/');
        let delim = self.peek().expect("caller checked a literal opener");
        self.bump();
        let body = self.scan_literal_body(delim, is_regex)?;
        self.skip_trivia();
        if self.peek() == Some(':') {
            self.bump();
            self.skip_trivia();
            let inner = self.parse_rule_body()?;
            if is_regex {
                Ok(self.ruleset.push(Rule::RegexMember {
                    pattern: LazyRegex::new(body),
                    min,
                    max,
                    inner,
                }))
            } else {
                Ok(self.ruleset.push(Rule::QStringMember {
                    name: body.into(),
                    min,
                    max,
                    inner,
                }))
            }
        } else if require_colon {
            Err(self.fatal(ParseErrorKind::ExpectedColon))
        } else if is_regex {
            Ok(self.ruleset.push(Rule::StringPattern(LazyRegex::new(body))))
        } else {
            Ok(self.ruleset.push(Rule::StringLiteral(body.into())))
        }
    }
}
