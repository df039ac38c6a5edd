//! Diff between a rendered program on disk and a fresh render.
//!
//! Two views are produced:
//! - a unified text diff of the documents
//! - a per-resource change list (added, removed, modified)
//!
//! # Example
//!
//! ```rust,ignore
//! use edgestack::diff::diff_programs;
//!
//! let diff = diff_programs(&old_yaml, &new_yaml, "Pulumi.yaml", "rendered");
//! if diff.has_changes() {
//!     print!("{}", diff.unified);
//! }
//! ```

use colored::Colorize;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use crate::render::PulumiYamlDocument;

/// Lines of context around each hunk.
pub const CONTEXT_LINES: usize = 3;

/// Counts of a text diff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub insertions: usize,
    pub deletions: usize,
    pub hunks: usize,
}

impl DiffStats {
    pub fn has_changes(&self) -> bool {
        self.insertions > 0 || self.deletions > 0
    }
}

impl std::fmt::Display for DiffStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} insertion(s)(+), {} deletion(s)(-) in {} hunk(s)",
            self.insertions, self.deletions, self.hunks
        )
    }
}

/// Result of comparing two rendered programs
#[derive(Debug, Clone, Serialize)]
pub struct ProgramDiff {
    /// Unified diff text, empty when the documents are equal
    pub unified: String,
    pub stats: DiffStats,
}

impl ProgramDiff {
    pub fn has_changes(&self) -> bool {
        self.stats.has_changes()
    }
}

/// Generate a unified diff between two rendered programs
pub fn diff_programs(old: &str, new: &str, old_label: &str, new_label: &str) -> ProgramDiff {
    let text_diff = TextDiff::from_lines(old, new);

    let mut stats = DiffStats::default();
    for change in text_diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => stats.insertions += 1,
            ChangeTag::Delete => stats.deletions += 1,
            ChangeTag::Equal => {}
        }
    }

    let mut unified_diff = text_diff.unified_diff();
    unified_diff
        .context_radius(CONTEXT_LINES)
        .header(old_label, new_label);
    stats.hunks = unified_diff.iter_hunks().count();

    let unified = if stats.has_changes() {
        unified_diff.to_string()
    } else {
        String::new()
    };

    ProgramDiff { unified, stats }
}

/// Colors a unified diff for the terminal
pub fn colorize(unified: &str) -> String {
    let mut output = String::with_capacity(unified.len());
    for line in unified.lines() {
        let colored = if line.starts_with("+++") || line.starts_with("---") {
            line.bold().to_string()
        } else if line.starts_with("@@") {
            line.cyan().to_string()
        } else if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else {
            line.to_string()
        };
        output.push_str(&colored);
        output.push('\n');
    }
    output
}

/// How one resource differs between two documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "+"),
            ChangeKind::Removed => write!(f, "-"),
            ChangeKind::Modified => write!(f, "~"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceChange {
    pub symbol: String,
    pub type_token: String,
    pub kind: ChangeKind,
}

/// Lists the resources that differ, new document order first, then removals
pub fn resource_changes(
    old: &PulumiYamlDocument,
    new: &PulumiYamlDocument,
) -> Vec<ResourceChange> {
    let mut changes = Vec::new();

    for (symbol, entry) in &new.resources {
        let kind = match old.resources.get(symbol) {
            None => Some(ChangeKind::Added),
            Some(previous) if previous != entry => Some(ChangeKind::Modified),
            Some(_) => None,
        };
        if let Some(kind) = kind {
            changes.push(ResourceChange {
                symbol: symbol.clone(),
                type_token: entry.type_token.clone(),
                kind,
            });
        }
    }

    for (symbol, entry) in &old.resources {
        if !new.resources.contains_key(symbol) {
            changes.push(ResourceChange {
                symbol: symbol.clone(),
                type_token: entry.type_token.clone(),
                kind: ChangeKind::Removed,
            });
        }
    }

    changes
}
