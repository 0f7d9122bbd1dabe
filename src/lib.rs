/*
 * Copyright 2022, The Cozo Project Authors.
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
 * If a copy of the MPL was not distributed with this file,
 * You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! JSON Content Rules (JCR): a schema language for describing the shape of
//! JSON documents.
//!
//! ```
//! let ruleset = jcr::parse(r#"{ "name":string, ?"age":integer }"#).unwrap();
//! assert!(ruleset.validate(&serde_json::json!({"name": "Ada"})));
//! assert!(!ruleset.validate(&serde_json::json!({"age": "thirty"})));
//! ```
//!
//! Parsing turns source text into a [`Ruleset`], an arena of rule nodes;
//! [`Ruleset::validate`] then walks that arena against a `serde_json::Value`
//! and collapses the result to a single boolean. Parsing is the only way to
//! build a `Ruleset`; there is no programmatic rule-construction API.

pub use miette::Error;

mod error;
mod parser;
mod rule;
mod status;
mod value;

pub use error::{DefaultErrorHandler, ErrorHandler, JcrError, ParseError, ParseErrorKind};
pub use parser::{parse, parse_with_handler, Parser};
pub use rule::Ruleset;
