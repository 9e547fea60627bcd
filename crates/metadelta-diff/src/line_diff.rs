//! Line-level diff of two serialized entries.
//!
//! Uses the `similar` crate (Myers diff algorithm) to produce hunks with
//! context lines, for showing how a modified entry changed.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

const CONTEXT_LINES: usize = 3;

/// The result of diffing two texts line by line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LineDiff {
    pub hunks: Vec<DiffHunk>,
}

impl LineDiff {
    /// Returns `true` if the two texts are identical.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Total number of lines added across all hunks.
    pub fn additions(&self) -> usize {
        self.lines()
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    /// Total number of lines removed across all hunks.
    pub fn deletions(&self) -> usize {
        self.lines()
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }

    fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.hunks.iter().flat_map(|h| &h.lines)
    }
}

/// A contiguous region of changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffHunk {
    /// 1-based start line in the old text.
    pub old_start: usize,
    /// 1-based start line in the new text.
    pub new_start: usize,
    pub lines: Vec<DiffLine>,
}

/// A single line in a hunk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DiffLine {
    Context(String),
    Added(String),
    Removed(String),
}

/// Compute a line-by-line diff between two texts.
pub fn diff_lines(old: &str, new: &str) -> LineDiff {
    if old == new {
        return LineDiff { hunks: Vec::new() };
    }

    let text_diff = TextDiff::from_lines(old, new);
    let mut hunks = Vec::new();

    for group in text_diff.grouped_ops(CONTEXT_LINES) {
        let Some(first) = group.first() else {
            continue;
        };
        let mut hunk = DiffHunk {
            old_start: first.old_range().start + 1,
            new_start: first.new_range().start + 1,
            lines: Vec::new(),
        };

        for op in &group {
            for change in text_diff.iter_changes(op) {
                let text = change.value().trim_end_matches('\n').to_string();
                hunk.lines.push(match change.tag() {
                    ChangeTag::Equal => DiffLine::Context(text),
                    ChangeTag::Delete => DiffLine::Removed(text),
                    ChangeTag::Insert => DiffLine::Added(text),
                });
            }
        }

        hunks.push(hunk);
    }

    LineDiff { hunks }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts_no_diff() {
        let diff = diff_lines("<a>1</a>\n", "<a>1</a>\n");
        assert!(diff.is_empty());
        assert_eq!(diff.additions(), 0);
    }

    #[test]
    fn changed_value_shows_remove_and_add() {
        let old = "<labels>\n    <fullName>A</fullName>\n    <value>old</value>\n</labels>\n";
        let new = "<labels>\n    <fullName>A</fullName>\n    <value>new</value>\n</labels>\n";
        let diff = diff_lines(old, new);
        assert_eq!(diff.hunks.len(), 1);
        assert_eq!(diff.additions(), 1);
        assert_eq!(diff.deletions(), 1);
        assert!(diff.hunks[0]
            .lines
            .contains(&DiffLine::Added("    <value>new</value>".into())));
    }

    #[test]
    fn hunk_has_context_and_line_numbers() {
        let old = "a\nb\nc\nd\ne\nf\ng\nh\n";
        let new = "a\nb\nc\nd\nX\nf\ng\nh\n";
        let diff = diff_lines(old, new);
        let hunk = &diff.hunks[0];
        assert_eq!(hunk.old_start, 2);
        assert!(hunk.lines.iter().any(|l| matches!(l, DiffLine::Context(_))));
    }
}
