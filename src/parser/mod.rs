/*
 * Copyright 2022, The Cozo Project Authors.
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
 * If a copy of the MPL was not distributed with this file,
 * You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Turns JCR source text into a [`Ruleset`]: a recursive-descent,
//! character-at-a-time reader with no backtracking and no intermediate
//! token stream. Ambiguities the grammar admits (a digit run's eventual
//! role, a quoted literal's member-vs-value reading) are resolved by
//! looking at the next character, never by re-reading one already consumed.

mod builder;
mod number;
mod string;

use std::io::Read;

use builder::ContainerBuilder;

use crate::error::{DefaultErrorHandler, ErrorHandler, JcrError, ParseError, ParseErrorKind};
use crate::rule::{Repetition, Rule, RuleId, Ruleset};

/// The upstream `jcr_parser.hpp`'s default for `max_nesting_depth_`.
const DEFAULT_MAX_DEPTH: usize = 1024;

/// A configured parser. The only knob is the maximum container nesting
/// depth (§4.1 point 7); everything else about how JCR text is read is
/// fixed by the grammar.
#[derive(Debug, Clone, Copy)]
pub struct Parser {
    max_depth: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Parser {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Parser { max_depth }
    }

    /// Parses `text`, aborting on the first error encountered.
    pub fn parse(&self, text: &str) -> Result<Ruleset, ParseError> {
        let mut handler = DefaultErrorHandler;
        self.parse_with_handler(text, &mut handler)
    }

    /// Parses `text`, routing every error through `handler` instead of the
    /// always-abort default.
    pub fn parse_with_handler<H: ErrorHandler>(
        &self,
        text: &str,
        handler: &mut H,
    ) -> Result<Ruleset, ParseError> {
        let scanner = Scanner::new(text, handler, self.max_depth);
        scanner.run()
    }

    /// Reads `reader` fully into memory, then parses it. A convenience
    /// wrapper, not a second implementation of the character driver: the
    /// driver only ever needs one pass over an in-memory buffer anyway.
    pub fn parse_reader<R: Read>(&self, mut reader: R) -> Result<Ruleset, JcrError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(self.parse(&text)?)
    }
}

/// `Parser::new().parse(text)`.
pub fn parse(text: &str) -> Result<Ruleset, ParseError> {
    Parser::new().parse(text)
}

/// `Parser::new().parse_with_handler(text, handler)`.
pub fn parse_with_handler<H: ErrorHandler>(text: &str, handler: &mut H) -> Result<Ruleset, ParseError> {
    Parser::new().parse_with_handler(text, handler)
}

/// The character-driven reader. Owns the `Ruleset` being built, since
/// almost every production ends by pushing into its arena.
struct Scanner<'a, H: ErrorHandler> {
    chars: Vec<char>,
    offsets: Vec<usize>,
    pos: usize,
    line: usize,
    column: usize,
    handler: &'a mut H,
    max_depth: usize,
    depth: usize,
    ruleset: Ruleset,
}

impl<'a, H: ErrorHandler> Scanner<'a, H> {
    fn new(text: &str, handler: &'a mut H, max_depth: usize) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut offsets = Vec::with_capacity(text.len() + 1);
        for (offset, c) in text.char_indices() {
            chars.push(c);
            offsets.push(offset);
        }
        offsets.push(text.len());
        Scanner {
            chars,
            offsets,
            pos: 0,
            line: 1,
            column: 1,
            handler,
            max_depth,
            depth: 0,
            ruleset: Ruleset::with_builtins(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn offset(&self) -> usize {
        self.offsets[self.pos.min(self.offsets.len() - 1)]
    }

    /// Skips whitespace and `;`-to-end-of-line comments, which are
    /// interchangeable everywhere between syntactic units.
    fn skip_trivia(&mut self) {
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.bump();
            }
            if self.peek() == Some(';') {
                while !matches!(self.peek(), None | Some('\n')) {
                    self.bump();
                }
                continue;
            }
            break;
        }
    }

    fn fatal(&mut self, kind: ParseErrorKind) -> ParseError {
        let err = ParseError::new(kind, self.line, self.column, self.offset());
        self.handler.fatal_error(kind, self.line, self.column);
        err
    }

    /// A recoverable problem: the parser can keep going past it (used for
    /// `'single quoted'` strings, which the upstream accepts with a
    /// warning rather than rejecting outright).
    fn recoverable(&mut self, kind: ParseErrorKind) -> Result<(), ParseError> {
        let abort = self.handler.error(kind, self.line, self.column);
        if abort {
            Err(ParseError::new(kind, self.line, self.column, self.offset()))
        } else {
            Ok(())
        }
    }

    fn enter_nesting(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.fatal(ParseErrorKind::MaxDepthExceeded));
        }
        Ok(())
    }

    fn leave_nesting(&mut self) {
        self.depth -= 1;
    }

    /// `[A-Za-z][A-Za-z0-9_-]*`. Caller has already confirmed the first
    /// character is an ASCII letter.
    fn scan_identifier(&mut self) -> String {
        let mut s = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            s.push(self.bump().unwrap());
        }
        s
    }

    fn starts_decl(&self, c: char) -> bool {
        c.is_ascii_alphabetic()
            || c.is_ascii_digit()
            || c == '-'
            || c == '.'
            || c == '"'
            || c == '\''
            || c == '/'
            || c == '{'
            || c == '['
            || c == '('
    }

    /// `ruleset := (rule_decl | named_decl)*`. Runs until the next
    /// non-whitespace character can't begin either production, then
    /// requires the rest of the input to be whitespace (the "trailing
    /// garbage" check the upstream runs as a separate `check_done` step
    /// after `end_parse()`, applied unconditionally here for both
    /// `parse` and `parse_with_handler`, §4.1 supplementary behavior).
    fn run(mut self) -> Result<Ruleset, ParseError> {
        self.skip_trivia();
        while matches!(self.peek(), Some(c) if self.starts_decl(c)) {
            self.parse_top_level_decl()?;
            self.skip_trivia();
        }
        if self.peek().is_some() {
            return Err(self.fatal(ParseErrorKind::ExtraCharacter));
        }
        Ok(self.ruleset)
    }

    /// One top-level `rule_decl` or `named_decl`. A `named_decl` (`ident`
    /// immediately followed by a `rule_body`) only registers the name.
    /// It never becomes the schema's root, so a schema's leading unnamed
    /// container can be followed by any number of named-rule declarations
    /// without losing its place as root (scenarios 4-6: the object/array
    /// rule_decl comes first, the `name rule_body` lines that follow only
    /// populate `named_rules`). A bare identifier with no following body
    /// is instead a standalone `rule_decl` whose body happens to be a
    /// `ref`, and (like any other unnamed `rule_decl`) does set root.
    /// Multiple unnamed `rule_decl`s at the top level are not disambiguated
    /// by the grammar; this resolves them as last-one-wins (see
    /// `DESIGN.md`), consistent with the same rule already governing mixed
    /// `,`/`|` separators in a container.
    fn parse_top_level_decl(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => {
                let name = self.scan_identifier();
                self.skip_trivia();
                match self.peek() {
                    Some(':') => {
                        self.bump();
                        self.skip_trivia();
                        let inner = self.parse_rule_body()?;
                        self.ruleset.add_named_rule(name.into(), inner);
                    }
                    Some('"') | Some('\'') | Some('/') => {
                        let inner = self.parse_name_or_literal(1, 1, false)?;
                        self.ruleset.add_named_rule(name.into(), inner);
                    }
                    Some('{') | Some('[') | Some('(') => {
                        let inner = self.parse_rule_body()?;
                        self.ruleset.add_named_rule(name.into(), inner);
                    }
                    _ => {
                        // No binding continuation follows: `name` on its
                        // own is a standalone `ref` rule_decl, not a
                        // named-rule declaration missing its body.
                        let id = self.ruleset.push(Rule::RuleRef(name.into()));
                        self.ruleset.set_root(id);
                    }
                }
                Ok(())
            }
            _ => {
                let id = self.parse_rule_body()?;
                self.ruleset.set_root(id);
                Ok(())
            }
        }
    }

    /// `rule_body`: the single production every container element, member
    /// value and named-rule body eventually bottoms out in.
    fn parse_rule_body(&mut self) -> Result<RuleId, ParseError> {
        match self.peek() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('(') => self.parse_group(),
            Some('"') | Some('/') => self.parse_name_or_literal(1, 1, false),
            Some('\'') => {
                self.recoverable(ParseErrorKind::SingleQuote)?;
                self.parse_name_or_literal(1, 1, false)
            }
            Some('-') => self.parse_numeric_or_range(),
            Some(c) if c.is_ascii_digit() => self.parse_numeric_or_range(),
            Some('.') if self.peek2() == Some('.') => self.parse_range_no_lower(),
            Some(c) if c.is_ascii_alphabetic() => {
                let name = self.scan_identifier();
                Ok(self.ruleset.push(Rule::RuleRef(name.into())))
            }
            Some('}') => Err(self.fatal(ParseErrorKind::UnexpectedRightBrace)),
            Some(']') => Err(self.fatal(ParseErrorKind::UnexpectedRightBracket)),
            Some(_) => Err(self.fatal(ParseErrorKind::ExpectedRuleOrValue)),
            None => Err(self.fatal(ParseErrorKind::UnexpectedEof)),
        }
    }

    fn parse_object(&mut self) -> Result<RuleId, ParseError> {
        self.enter_nesting()?;
        log::trace!("entering object at {}:{}", self.line, self.column);
        self.bump();
        let mut builder = ContainerBuilder::new();
        self.skip_trivia();
        if self.peek() == Some('}') {
            self.bump();
            self.leave_nesting();
            return Ok(self.ruleset.push(builder.into_object()));
        }
        loop {
            self.skip_trivia();
            let member = self.parse_object_member()?;
            builder.push(member);
            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                    builder.set_sequence(true);
                    self.skip_trivia();
                    if self.peek() == Some('}') {
                        return Err(self.fatal(ParseErrorKind::ExtraComma));
                    }
                }
                Some('|') => {
                    self.bump();
                    builder.set_sequence(false);
                    self.skip_trivia();
                    if self.peek() == Some('}') {
                        return Err(self.fatal(ParseErrorKind::ExtraComma));
                    }
                }
                Some('}') => {
                    self.bump();
                    break;
                }
                None => return Err(self.fatal(ParseErrorKind::UnexpectedEof)),
                Some(_) => return Err(self.fatal(ParseErrorKind::ExpectedCommaOrRightBrace)),
            }
        }
        self.leave_nesting();
        log::trace!("leaving object at {}:{}", self.line, self.column);
        Ok(self.ruleset.push(builder.into_object()))
    }

    /// `member := [rep] ['?'] (qstring_member | regex_member) | [rep] ident`.
    /// Repetition prefixes and the `?` optional marker are exclusively an
    /// Object-member construct (§4.1 supplementary detail); a missing `:`
    /// after the member's name is a hard error here, unlike the same
    /// literal appearing as a bare `rule_body`. The bare-`ident` form
    /// refers to a member-rule already declared elsewhere by name (the
    /// `{ fn, lc, wc }` shape) rather than inlining a fresh name/body pair.
    fn parse_object_member(&mut self) -> Result<RuleId, ParseError> {
        let rep = self.maybe_parse_repeat()?;
        if rep.is_some() {
            self.skip_trivia();
        }
        let optional = if self.peek() == Some('?') {
            self.bump();
            self.skip_trivia();
            true
        } else {
            false
        };
        let (min, max) = rep.map(|r| (r.min, r.max)).unwrap_or((1, 1));
        match self.peek() {
            Some('"') | Some('/') => {
                let member_id = self.parse_name_or_literal(min, max, true)?;
                if optional {
                    Ok(self.ruleset.push(Rule::Optional(member_id)))
                } else {
                    Ok(member_id)
                }
            }
            Some('\'') => {
                self.recoverable(ParseErrorKind::SingleQuote)?;
                let member_id = self.parse_name_or_literal(min, max, true)?;
                if optional {
                    Ok(self.ruleset.push(Rule::Optional(member_id)))
                } else {
                    Ok(member_id)
                }
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let name = self.scan_identifier();
                let ref_id = self.ruleset.push(Rule::RuleRef(name.into()));
                // `RuleRef` carries no arity of its own, so a repeat count
                // on this form has nothing to attach to beyond optionality;
                // `min == 0` is treated the same as a leading `?`.
                if optional || min == 0 {
                    Ok(self.ruleset.push(Rule::Optional(ref_id)))
                } else {
                    Ok(ref_id)
                }
            }
            _ => Err(self.fatal(ParseErrorKind::ExpectedName)),
        }
    }

    fn parse_array(&mut self) -> Result<RuleId, ParseError> {
        self.enter_nesting()?;
        log::trace!("entering array at {}:{}", self.line, self.column);
        self.bump();
        let mut builder = ContainerBuilder::new();
        self.skip_trivia();
        if self.peek() == Some(']') {
            self.bump();
            self.leave_nesting();
            return Ok(self.ruleset.push(builder.into_array()));
        }
        loop {
            self.skip_trivia();
            let element = self.parse_array_element()?;
            builder.push(element);
            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                    builder.set_sequence(true);
                }
                Some('|') => {
                    self.bump();
                    builder.set_sequence(false);
                }
                Some(']') => {
                    self.bump();
                    break;
                }
                None => return Err(self.fatal(ParseErrorKind::UnexpectedEof)),
                Some(_) => return Err(self.fatal(ParseErrorKind::ExpectedCommaOrRightBracket)),
            }
        }
        self.leave_nesting();
        log::trace!("leaving array at {}:{}", self.line, self.column);
        Ok(self.ruleset.push(builder.into_array()))
    }

    /// `element := [rep] rule_body`. A leading `*` is unambiguously a
    /// repetition prefix; a leading digit run is ambiguous between a
    /// literal integer value and a repeat-exactly-n prefix (the `n` form
    /// of `rep`) when no `*` follows it, so the scanner looks one
    /// rule_body-start further, past trivia, before deciding. This is the
    /// position-independent repeat lexing documented in `DESIGN.md`.
    fn parse_array_element(&mut self) -> Result<RuleId, ParseError> {
        match self.peek() {
            Some('*') => {
                self.bump();
                let max = self.maybe_scan_max_digits()?;
                let rep = match max {
                    Some(m) => Repetition::at_most(m),
                    None => Repetition::bare_star(),
                };
                self.skip_trivia();
                let inner = self.parse_rule_body()?;
                Ok(self.ruleset.push(Rule::RepeatArrayItem {
                    min: rep.min,
                    max: rep.max,
                    inner,
                }))
            }
            Some(c) if c.is_ascii_digit() => {
                let digits = self.scan_digit_run(false)?;
                match self.peek() {
                    Some('*') => {
                        self.bump();
                        let n: u32 = digits.parse().unwrap_or(u32::MAX);
                        let max = self.maybe_scan_max_digits()?;
                        let rep = match max {
                            Some(m) => Repetition::between(n, m),
                            None => Repetition::at_least(n),
                        };
                        self.skip_trivia();
                        let inner = self.parse_rule_body()?;
                        Ok(self.ruleset.push(Rule::RepeatArrayItem {
                            min: rep.min,
                            max: rep.max,
                            inner,
                        }))
                    }
                    Some('.') | Some('e') | Some('E') => self.finish_numeric_value(digits, false),
                    _ => {
                        self.skip_trivia();
                        if self.looks_like_rule_body_start() {
                            let n: u32 = digits.parse().unwrap_or(u32::MAX);
                            let inner = self.parse_rule_body()?;
                            Ok(self.ruleset.push(Rule::RepeatArrayItem { min: n, max: n, inner }))
                        } else {
                            self.finish_numeric_value(digits, false)
                        }
                    }
                }
            }
            _ => self.parse_rule_body(),
        }
    }

    fn looks_like_rule_body_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(c) if c.is_ascii_digit()
                || c == '-'
                || c == '"'
                || c == '\''
                || c == '/'
                || c == '{'
                || c == '['
                || c == '('
                || c.is_ascii_alphabetic()
        )
    }

    fn parse_group(&mut self) -> Result<RuleId, ParseError> {
        self.enter_nesting()?;
        log::trace!("entering group at {}:{}", self.line, self.column);
        self.bump();
        let mut builder = ContainerBuilder::new();
        self.skip_trivia();
        if self.peek() == Some(')') {
            self.bump();
            self.leave_nesting();
            return Ok(self.ruleset.push(builder.into_group()));
        }
        loop {
            self.skip_trivia();
            let element = self.parse_rule_body()?;
            builder.push(element);
            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                    builder.set_sequence(true);
                }
                Some('|') => {
                    self.bump();
                    builder.set_sequence(false);
                }
                Some(')') => {
                    self.bump();
                    break;
                }
                None => return Err(self.fatal(ParseErrorKind::UnexpectedEof)),
                Some(_) => return Err(self.fatal(ParseErrorKind::ExpectedCommaOrRightBrace)),
            }
        }
        self.leave_nesting();
        log::trace!("leaving group at {}:{}", self.line, self.column);
        Ok(self.ruleset.push(builder.into_group()))
    }
}
