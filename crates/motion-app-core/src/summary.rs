// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Render-friendly summary of a rebuild report, with dedupe and a length cap.

use std::collections::BTreeSet;

use motion_rebuild::{Completion, IssueKind, RebuildReport};

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NoticeKind {
    /// Informational note.
    Info,
    /// Recoverable issue.
    Warn,
}

/// One line of a summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Short title line.
    pub title: String,
    /// Optional body text.
    pub body: Option<String>,
    /// How many identical notices were folded into this one.
    pub repeat: usize,
}

/// Bounded notice list. Identical notices fold into one with a repeat count.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
    max: usize,
    dropped: BTreeSet<(NoticeKind, String, Option<String>)>,
}

impl NoticeBoard {
    /// Board keeping at most `max` distinct notices.
    pub fn new(max: usize) -> Self {
        Self {
            notices: Vec::new(),
            max,
            dropped: BTreeSet::new(),
        }
    }

    /// Pushes a notice, folding it into an identical earlier one.
    pub fn push<T, B>(&mut self, kind: NoticeKind, title: T, body: B)
    where
        T: Into<String>,
        B: Into<Option<String>>,
    {
        let title = title.into();
        let body = body.into();
        if let Some(existing) = self
            .notices
            .iter_mut()
            .find(|n| n.kind == kind && n.title == title && n.body == body)
        {
            existing.repeat += 1;
            return;
        }
        if self.notices.len() == self.max {
            self.dropped.insert((kind, title, body));
            return;
        }
        self.notices.push(Notice {
            kind,
            title,
            body,
            repeat: 1,
        });
    }

    /// Summary of `report`: one headline, then one notice per diagnostic.
    pub fn from_report(report: &RebuildReport, max: usize) -> Self {
        let mut board = Self::new(max);
        let headline = match report.completion {
            Completion::Finished => format!("rebuilt {} nodes", report.stats.nodes_cloned),
            Completion::Cancelled { stage } => format!(
                "cancelled during {stage} after {} nodes",
                report.stats.nodes_cloned
            ),
        };
        let kind = if report.ledger.is_clean() {
            NoticeKind::Info
        } else {
            NoticeKind::Warn
        };
        board.push(kind, headline, Some(report.ledger.to_string()));
        for diagnostic in report.ledger.diagnostics() {
            board.push(
                NoticeKind::Warn,
                issue_title(diagnostic.kind),
                Some(diagnostic.message.clone()),
            );
        }
        board
    }

    /// Notices in push order.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Distinct notices dropped because the board was full.
    pub fn overflow(&self) -> usize {
        self.dropped.len()
    }
}

/// Short label for an issue kind.
pub fn issue_title(kind: IssueKind) -> &'static str {
    match kind {
        IssueKind::NodeFailed => "node skipped",
        IssueKind::EdgeDropped => "transition dropped",
        IssueKind::PayloadFieldSkipped => "field skipped",
        IssueKind::UnresolvedParameter => "parameter unresolved",
        IssueKind::UnresolvedNodeRef => "node reference unresolved",
        IssueKind::BehaviourSkipped => "behaviour skipped",
        IssueKind::ParameterSkipped => "parameter skipped",
        IssueKind::DefaultRecovered => "default node recovered",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_notices_fold() {
        let mut board = NoticeBoard::new(4);
        board.push(NoticeKind::Warn, "transition dropped", Some("a".to_owned()));
        board.push(NoticeKind::Warn, "transition dropped", Some("a".to_owned()));
        board.push(NoticeKind::Warn, "transition dropped", Some("b".to_owned()));
        assert_eq!(board.notices().len(), 2);
        assert_eq!(board.notices()[0].repeat, 2);
    }

    #[test]
    fn full_board_counts_overflow() {
        let mut board = NoticeBoard::new(1);
        board.push(NoticeKind::Info, "one", None::<String>);
        board.push(NoticeKind::Info, "two", None::<String>);
        assert_eq!(board.notices().len(), 1);
        assert_eq!(board.overflow(), 1);
    }

    #[test]
    fn repeated_drops_count_once() {
        let mut board = NoticeBoard::new(1);
        board.push(NoticeKind::Info, "a", None::<String>);
        for _ in 0..3 {
            board.push(NoticeKind::Warn, "b", None::<String>);
        }
        assert_eq!(board.overflow(), 1);
        // Same title under another kind is a different notice.
        board.push(NoticeKind::Warn, "a", None::<String>);
        assert_eq!(board.overflow(), 2);
        assert_eq!(board.notices()[0].repeat, 1);
    }
}
