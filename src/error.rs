/*
 * Copyright 2022, The Cozo Project Authors.
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
 * If a copy of the MPL was not distributed with this file,
 * You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Parse-time error taxonomy and the error-handler callback contract.

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Every distinguishable parse failure, with the fixed English message
/// callers are entitled to rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Invalid JCR text")]
    InvalidJcrText,
    #[error("Unexpected non-whitespace character after JSON text")]
    ExtraCharacter,
    #[error("Maximum JSON depth exceeded")]
    MaxDepthExceeded,
    #[error("JSON strings cannot be quoted with single quotes")]
    SingleQuote,
    #[error("Illegal character in string")]
    IllegalCharacterInString,
    #[error("Extra comma")]
    ExtraComma,
    #[error("Expected object member name")]
    ExpectedName,
    #[error("Expected value")]
    ExpectedValue,
    #[error("Invalid value")]
    InvalidValue,
    #[error("Expected name separator ':'")]
    ExpectedColon,
    #[error("Illegal control character in string")]
    IllegalControlCharacter,
    #[error("Illegal escaped character in string")]
    IllegalEscapedCharacter,
    #[error("Invalid codepoint, expected another \\u token…")]
    ExpectedCodepointSurrogatePair,
    #[error("Invalid codepoint, expected hexadecimal digit.")]
    InvalidHexEscapeSequence,
    #[error("Invalid codepoint, expected four hexadecimal digits.")]
    InvalidUnicodeEscapeSequence,
    #[error("A number cannot have a leading zero")]
    LeadingZero,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Expected comma or right brace ']'")]
    ExpectedCommaOrRightBrace,
    #[error("Expected comma or right bracket ']'")]
    ExpectedCommaOrRightBracket,
    #[error("Unexpected right brace '}}'")]
    UnexpectedRightBrace,
    #[error("Unexpected right bracket ']'")]
    UnexpectedRightBracket,
    #[error("Expected rule name or value")]
    ExpectedRuleOrValue,
    #[error("Expected '*'")]
    ExpectedStar,
}

/// A located parse failure: `(kind, line, column)` plus enough of the
/// original source to render a `miette` snippet.
#[derive(Debug, Error, Diagnostic)]
#[error("{kind}")]
#[diagnostic(code(jcr::parse_error))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
    #[label("here")]
    pub span: SourceSpan,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind, line: usize, column: usize, offset: usize) -> Self {
        ParseError {
            kind,
            line,
            column,
            span: SourceSpan::from((offset, 1)),
        }
    }
}

/// Callback contract a parser drives as it encounters errors. `error` is
/// called for a recoverable problem the parser can keep going past (the
/// character is kept and lexing continues); `fatal_error` is called when
/// no sensible recovery exists. The default handler treats the first call
/// to either as fatal.
pub trait ErrorHandler {
    /// A recoverable error was encountered; return `true` to abort anyway.
    fn error(&mut self, kind: ParseErrorKind, line: usize, column: usize) -> bool;
    /// An unrecoverable error was encountered; the parser always aborts
    /// immediately after calling this.
    fn fatal_error(&mut self, kind: ParseErrorKind, line: usize, column: usize) {
        let _ = self.error(kind, line, column);
    }
}

/// The handler used when the caller doesn't supply one: every call, fatal
/// or recoverable, aborts parsing.
#[derive(Debug, Default)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn error(&mut self, _kind: ParseErrorKind, _line: usize, _column: usize) -> bool {
        true
    }
}

/// The error type for [`crate::parser::Parser::parse_reader`], which adds
/// an I/O failure mode on top of ordinary parse errors.
#[derive(Debug, Error, Diagnostic)]
pub enum JcrError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
