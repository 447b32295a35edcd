// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Progress host that records reports and cancels on a schedule.

use std::cell::Cell;

use motion_rebuild::RebuildHost;

/// [`RebuildHost`] for tests.
///
/// Records every progress report. With [`ScriptedHost::cancel_after`], the
/// first `n` cancellation polls answer `false` and every later one `true`.
#[derive(Debug, Default)]
pub struct ScriptedHost {
    reports: Vec<(f32, String)>,
    polls: Cell<usize>,
    cancel_after: Option<usize>,
}

impl ScriptedHost {
    /// Host that never cancels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that lets `polls` polls through, then cancels.
    pub fn cancel_after(polls: usize) -> Self {
        Self {
            cancel_after: Some(polls),
            ..Self::default()
        }
    }

    /// Progress reports in order.
    pub fn reports(&self) -> &[(f32, String)] {
        &self.reports
    }

    /// Cancellation polls so far.
    pub fn polls(&self) -> usize {
        self.polls.get()
    }
}

impl RebuildHost for ScriptedHost {
    fn report_progress(&mut self, fraction: f32, message: &str) {
        self.reports.push((fraction, message.to_owned()));
    }

    fn is_cancellation_requested(&self) -> bool {
        let seen = self.polls.get();
        self.polls.set(seen + 1);
        self.cancel_after.is_some_and(|limit| seen >= limit)
    }
}
