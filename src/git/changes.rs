use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::git::noise::extension;
use crate::git::status::{FileStatus, StatusCode};
use crate::prompt::priority::{FileKind, sort_by_priority};

/// Conventional-commit category. Declaration order is the tie-break
/// precedence: earlier variants win equal vote counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Feature,
    Fix,
    Refactor,
    Chore,
    Test,
    Docs,
    Style,
}

impl ChangeType {
    pub const ALL: [ChangeType; 7] = [
        ChangeType::Feature,
        ChangeType::Fix,
        ChangeType::Refactor,
        ChangeType::Chore,
        ChangeType::Test,
        ChangeType::Docs,
        ChangeType::Style,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChangeType::Feature => "feature",
            ChangeType::Fix => "fix",
            ChangeType::Refactor => "refactor",
            ChangeType::Chore => "chore",
            ChangeType::Test => "test",
            ChangeType::Docs => "docs",
            ChangeType::Style => "style",
        }
    }

    /// The conventional-commit type tag, e.g. `feat`.
    pub fn prefix(self) -> &'static str {
        match self {
            ChangeType::Feature => "feat",
            other => other.label(),
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeMagnitude {
    Small,
    Medium,
    Large,
}

impl ChangeMagnitude {
    pub fn for_file_count(count: usize) -> Self {
        match count {
            0..=3 => ChangeMagnitude::Small,
            4..=10 => ChangeMagnitude::Medium,
            _ => ChangeMagnitude::Large,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangesSummary {
    pub has_staged_changes: bool,
    pub has_unstaged_changes: bool,
    pub has_untracked_files: bool,
    pub total_files: usize,
    pub change_type_counts: BTreeMap<ChangeType, usize>,
    pub primary_change_type: ChangeType,
    pub suggested_prefix: &'static str,
    pub magnitude: ChangeMagnitude,
    pub affected_areas: Vec<String>,
    pub files_by_priority: Vec<FileStatus>,
}

const TEST_MARKERS: &[&str] = &["test", "tests", "testing", "testdata", "spec", "specs"];
const DOC_EXTENSIONS: &[&str] = &["md", "txt", "rst", "adoc"];
const STYLE_EXTENSIONS: &[&str] = &["css", "scss", "sass", "less"];

/// The single vote a changed file casts.
pub fn classify(file: &FileStatus) -> ChangeType {
    if is_test_path(&file.path) {
        return ChangeType::Test;
    }

    let ext = extension(&file.path).map(|e| e.to_ascii_lowercase());
    let ext = ext.as_deref();
    if ext.is_some_and(|e| DOC_EXTENSIONS.contains(&e)) {
        return ChangeType::Docs;
    }
    if ext.is_some_and(|e| STYLE_EXTENSIONS.contains(&e)) {
        return ChangeType::Style;
    }
    if FileKind::of(&file.path) != FileKind::Source {
        return ChangeType::Chore;
    }

    let codes = [file.index_status, file.work_status];
    if file.is_renamed || codes.contains(&StatusCode::Renamed) {
        ChangeType::Refactor
    } else if file.is_untracked || codes.contains(&StatusCode::Added) {
        ChangeType::Feature
    } else if codes.contains(&StatusCode::Modified) {
        ChangeType::Fix
    } else {
        ChangeType::Chore
    }
}

/// Plurality label; ties go to the earlier [`ChangeType`] variant. An empty
/// tally yields `Chore`.
pub fn primary_change_type(counts: &BTreeMap<ChangeType, usize>) -> ChangeType {
    ChangeType::ALL
        .iter()
        .copied()
        .filter_map(|kind| counts.get(&kind).map(|&n| (kind, n)))
        .filter(|&(_, n)| n > 0)
        .fold(None, |best: Option<(ChangeType, usize)>, (kind, n)| match best {
            Some((_, best_n)) if best_n >= n => best,
            _ => Some((kind, n)),
        })
        .map(|(kind, _)| kind)
        .unwrap_or(ChangeType::Chore)
}

/// Summarize a merged status listing.
pub fn summarize(files: &[FileStatus]) -> ChangesSummary {
    let mut counts: BTreeMap<ChangeType, usize> = BTreeMap::new();
    for file in files {
        *counts.entry(classify(file)).or_default() += 1;
    }

    let primary = primary_change_type(&counts);

    ChangesSummary {
        has_staged_changes: files.iter().any(|f| f.index_status.is_changed()),
        has_unstaged_changes: files.iter().any(|f| f.work_status.is_changed()),
        has_untracked_files: files.iter().any(|f| f.is_untracked),
        total_files: files.len(),
        change_type_counts: counts,
        primary_change_type: primary,
        suggested_prefix: primary.prefix(),
        magnitude: ChangeMagnitude::for_file_count(files.len()),
        affected_areas: affected_areas(files),
        files_by_priority: sort_by_priority(files),
    }
}

fn is_test_path(path: &str) -> bool {
    path.split(|c: char| matches!(c, '/' | '\\' | '.' | '_' | '-'))
        .any(|token| TEST_MARKERS.contains(&token.to_ascii_lowercase().as_str()))
}

fn affected_areas(files: &[FileStatus]) -> Vec<String> {
    files
        .iter()
        .map(|f| match f.path.split_once('/') {
            Some((top, _)) if !top.is_empty() => top.to_string(),
            _ => "root".to_string(),
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
