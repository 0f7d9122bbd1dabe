/*
 * Copyright 2022, The Cozo Project Authors.
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
 * If a copy of the MPL was not distributed with this file,
 * You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Accumulates the children of an open `Object`/`Array`/`Group` while it's
//! still being parsed.

use crate::rule::{Rule, RuleId};

/// Tracks which separator (`,` or `|`) most recently appeared between two
/// children, so the finished container's `sequence` flag reflects
/// "last separator wins" (an explicit Open Question resolution, see
/// `DESIGN.md`). A fresh container with no separator seen yet defaults to
/// sequence, matching a single-child or empty container reading as a
/// (trivial) conjunction.
pub(super) struct ContainerBuilder {
    children: Vec<RuleId>,
    sequence: bool,
}

impl ContainerBuilder {
    pub(super) fn new() -> Self {
        ContainerBuilder {
            children: Vec::new(),
            sequence: true,
        }
    }

    pub(super) fn push(&mut self, id: RuleId) {
        self.children.push(id);
    }

    pub(super) fn set_sequence(&mut self, sequence: bool) {
        self.sequence = sequence;
    }

    pub(super) fn into_object(self) -> Rule {
        Rule::Object {
            sequence: self.sequence,
            children: self.children,
        }
    }

    pub(super) fn into_array(self) -> Rule {
        Rule::Array {
            sequence: self.sequence,
            children: self.children,
        }
    }

    pub(super) fn into_group(self) -> Rule {
        Rule::Group {
            sequence: self.sequence,
            children: self.children,
        }
    }
}
