/*
 * Copyright 2022, The Cozo Project Authors.
 *
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
 * If a copy of the MPL was not distributed with this file,
 * You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The four-valued validation outcome every rule evaluation returns.

/// Outcome of evaluating a single rule against a single JSON value.
///
/// `MayRepeat`/`MustRepeat` only carry meaning inside a repetition
/// context (`RepeatArrayItem`, or `Array`/`Group` walking their children);
/// outside of one they collapse to [`Status::is_truthy`]'s pass/fail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pass,
    Fail,
    MayRepeat,
    MustRepeat,
}

impl Status {
    /// The public `validate() -> bool` contract: `Pass`/`MayRepeat` are
    /// truthy, `Fail`/`MustRepeat` are not.
    pub fn is_truthy(self) -> bool {
        matches!(self, Status::Pass | Status::MayRepeat)
    }

    /// Does this status, on its own, license another repetition?
    pub fn wants_more(self) -> bool {
        matches!(self, Status::MayRepeat | Status::MustRepeat)
    }

    /// `sequence == true` (`,`): short-circuit on the first `Fail`,
    /// otherwise carry the latest status forward.
    pub fn and_then(self, next: impl FnOnce() -> Status) -> Status {
        if self == Status::Fail {
            Status::Fail
        } else {
            next()
        }
    }

    /// `sequence == false` (`|`): short-circuit on the first passing
    /// status (`Pass` or `MayRepeat`), otherwise carry the latest status
    /// forward.
    pub fn or_else(self, next: impl FnOnce() -> Status) -> Status {
        if self.is_truthy() {
            self
        } else {
            next()
        }
    }
}
