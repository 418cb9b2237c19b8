use std::collections::HashMap;

use serde::Serialize;

/// One dimension (staged or unstaged) of a porcelain status code.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// No change in this dimension (a space in porcelain output).
    #[default]
    Unmodified,
    Added,
    Modified,
    Deleted,
    Renamed,
    Copied,
    Unmerged,
    TypeChanged,
}

impl StatusCode {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            ' ' | '.' => Some(StatusCode::Unmodified),
            'A' => Some(StatusCode::Added),
            'M' => Some(StatusCode::Modified),
            'D' => Some(StatusCode::Deleted),
            'R' => Some(StatusCode::Renamed),
            'C' => Some(StatusCode::Copied),
            'U' => Some(StatusCode::Unmerged),
            'T' => Some(StatusCode::TypeChanged),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            StatusCode::Unmodified => ' ',
            StatusCode::Added => 'A',
            StatusCode::Modified => 'M',
            StatusCode::Deleted => 'D',
            StatusCode::Renamed => 'R',
            StatusCode::Copied => 'C',
            StatusCode::Unmerged => 'U',
            StatusCode::TypeChanged => 'T',
        }
    }

    pub fn is_changed(self) -> bool {
        self != StatusCode::Unmodified
    }
}

/// State of one path, merged across the staged, unstaged and untracked views.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatus {
    pub path: String,
    /// Source path of a rename or copy, empty otherwise.
    pub old_path: String,
    pub index_status: StatusCode,
    pub work_status: StatusCode,
    pub is_renamed: bool,
    pub is_untracked: bool,
}

impl FileStatus {
    pub fn untracked(path: impl Into<String>) -> Self {
        FileStatus {
            path: path.into(),
            is_untracked: true,
            ..Default::default()
        }
    }

    /// Whether this record describes any change at all.
    pub fn has_change(&self) -> bool {
        self.index_status.is_changed() || self.work_status.is_changed() || self.is_untracked
    }

    /// Porcelain-style code with the unchanged dimensions dropped, e.g. `M`,
    /// `MM`, `R` or `??`.
    pub fn short_code(&self) -> String {
        if self.is_untracked && !self.index_status.is_changed() && !self.work_status.is_changed() {
            return "??".to_string();
        }
        let code: String = [self.index_status.as_char(), self.work_status.as_char()]
            .iter()
            .collect();
        code.trim().to_string()
    }

    /// `<code>: <path>`, or `<code>: <old> -> <new>` for renames.
    pub fn summary_line(&self) -> String {
        if self.is_renamed {
            format!("{}: {} -> {}", self.short_code(), self.old_path, self.path)
        } else {
            format!("{}: {}", self.short_code(), self.path)
        }
    }

    fn refresh_rename_flag(&mut self) {
        self.is_renamed = !self.old_path.is_empty() && self.old_path != self.path;
    }
}

/// Branch plus the changed files, in discovery order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatusSummary {
    /// Empty on a detached HEAD.
    pub branch_name: String,
    pub files: Vec<FileStatus>,
}

/// Output of `git status --porcelain -b`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PorcelainStatus {
    pub branch: Option<String>,
    pub files: Vec<FileStatus>,
}

/// Parse a porcelain v1 listing. Malformed lines are skipped.
pub fn parse_porcelain(output: &str) -> PorcelainStatus {
    let mut status = PorcelainStatus::default();

    for line in output.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix("## ") {
            status.branch = Some(parse_branch_header(header));
            continue;
        }

        match parse_status_line(line) {
            Some(file) => status.files.push(file),
            None => log::trace!("skipping malformed status line {line:?}"),
        }
    }

    status
}

/// Parse a single `XY path` or `XY old -> new` line.
pub fn parse_status_line(line: &str) -> Option<FileStatus> {
    let mut chars = line.chars();
    let x = chars.next()?;
    let y = chars.next()?;
    if chars.next()? != ' ' {
        return None;
    }
    let rest = chars.as_str();
    if rest.is_empty() {
        return None;
    }

    match (x, y) {
        ('?', '?') => return Some(FileStatus::untracked(unquote(rest))),
        ('!', '!') => return None,
        _ => {}
    }

    let index_status = StatusCode::from_char(x)?;
    let work_status = StatusCode::from_char(y)?;

    let (old_path, path) = match rest.split_once(" -> ") {
        Some((old, new)) => (unquote(old), unquote(new)),
        None => (String::new(), unquote(rest)),
    };
    if path.is_empty() {
        return None;
    }

    let mut file = FileStatus {
        path,
        old_path,
        index_status,
        work_status,
        is_renamed: false,
        is_untracked: false,
    };
    file.refresh_rename_flag();

    file.has_change().then_some(file)
}

/// Parse a bare path listing such as `git ls-files --others`.
pub fn parse_untracked(output: &str) -> Vec<FileStatus> {
    output
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
        .map(|l| FileStatus::untracked(unquote(l)))
        .collect()
}

fn parse_branch_header(header: &str) -> String {
    let header = header.trim();

    for prefix in ["No commits yet on ", "Initial commit on "] {
        if let Some(name) = header.strip_prefix(prefix) {
            return name.trim().to_string();
        }
    }
    if header.starts_with("HEAD (no branch)") {
        return String::new();
    }

    let name = match header.find("...") {
        Some(idx) => &header[..idx],
        None => header,
    };
    name.split_whitespace().next().unwrap_or_default().to_string()
}

/// Undo git's C-style quoting of unusual paths.
fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    let Some(inner) = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    else {
        return raw.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut iter = inner.bytes().peekable();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        match iter.next() {
            Some(b'n') => bytes.push(b'\n'),
            Some(b't') => bytes.push(b'\t'),
            Some(d @ b'0'..=b'7') => {
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    match iter.peek() {
                        Some(&o @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(o - b'0');
                            iter.next();
                        }
                        _ => break,
                    }
                }
                bytes.push((value & 0xff) as u8);
            }
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

/// Accumulates records keyed by path. A later record overwrites only the
/// fields it actually sets; first-seen order is kept.
#[derive(Debug, Default)]
pub struct StatusMerger {
    files: Vec<FileStatus>,
    by_path: HashMap<String, usize>,
}

impl StatusMerger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, incoming: FileStatus) {
        let Some(&idx) = self.by_path.get(&incoming.path) else {
            self.by_path.insert(incoming.path.clone(), self.files.len());
            self.files.push(incoming);
            return;
        };

        let existing = &mut self.files[idx];
        if incoming.index_status.is_changed() {
            existing.index_status = incoming.index_status;
        }
        if incoming.work_status.is_changed() {
            existing.work_status = incoming.work_status;
        }
        if !incoming.old_path.is_empty() {
            existing.old_path = incoming.old_path;
        }
        existing.is_untracked |= incoming.is_untracked;
        existing.refresh_rename_flag();
    }

    pub fn extend(&mut self, files: impl IntoIterator<Item = FileStatus>) {
        for file in files {
            self.add(file);
        }
    }

    /// Merged records that carry a change, in discovery order.
    pub fn finish(self) -> Vec<FileStatus> {
        self.files.into_iter().filter(FileStatus::has_change).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_modification() {
        let file = parse_status_line("M  file.go").unwrap();
        assert_eq!(file.path, "file.go");
        assert_eq!(file.index_status, StatusCode::Modified);
        assert_eq!(file.work_status, StatusCode::Unmodified);
        assert!(!file.is_renamed);
        assert!(!file.is_untracked);
    }

    #[test]
    fn unstaged_modification_keeps_leading_space() {
        let file = parse_status_line(" M src/lib.rs").unwrap();
        assert_eq!(file.path, "src/lib.rs");
        assert_eq!(file.index_status, StatusCode::Unmodified);
        assert_eq!(file.work_status, StatusCode::Modified);
    }

    #[test]
    fn rename_splits_paths() {
        let file = parse_status_line("R  old.go -> new.go").unwrap();
        assert_eq!(file.old_path, "old.go");
        assert_eq!(file.path, "new.go");
        assert_eq!(file.index_status, StatusCode::Renamed);
        assert!(file.is_renamed);
        assert_eq!(file.summary_line(), "R: old.go -> new.go");
    }

    #[test]
    fn untracked_line() {
        let file = parse_status_line("?? notes.txt").unwrap();
        assert!(file.is_untracked);
        assert_eq!(file.index_status, StatusCode::Unmodified);
        assert_eq!(file.work_status, StatusCode::Unmodified);
        assert_eq!(file.summary_line(), "??: notes.txt");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let parsed = parse_porcelain("M  ok.rs\nX\nZZ weird.rs\nMMfile.rs\n!! ignored.log\n A added.rs\n");
        let paths: Vec<_> = parsed.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["ok.rs", "added.rs"]);
    }

    #[test]
    fn quoted_paths_are_unescaped() {
        let file = parse_status_line(r#"A  "dir/with space.txt""#).unwrap();
        assert_eq!(file.path, "dir/with space.txt");

        let file = parse_status_line(r#"?? "caf\303\251.md""#).unwrap();
        assert_eq!(file.path, "café.md");
    }

    #[test]
    fn branch_headers() {
        let cases = [
            ("## main...origin/main [ahead 2]", "main"),
            ("## feature/login", "feature/login"),
            ("## No commits yet on trunk", "trunk"),
            ("## HEAD (no branch)", ""),
        ];
        for (line, expected) in cases {
            let parsed = parse_porcelain(line);
            assert_eq!(parsed.branch.as_deref(), Some(expected), "{line}");
        }
    }

    #[test]
    fn merger_combines_listings_per_path() {
        let mut merger = StatusMerger::new();
        merger.extend(parse_porcelain("M  a.rs\n M b.rs\n?? c.txt\n").files);
        merger.add(FileStatus {
            path: "b.rs".into(),
            index_status: StatusCode::Modified,
            ..Default::default()
        });
        merger.extend(parse_untracked("c.txt\nd.txt\n"));

        let files = merger.finish();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a.rs", "b.rs", "c.txt", "d.txt"]);

        assert_eq!(files[1].index_status, StatusCode::Modified);
        assert_eq!(files[1].work_status, StatusCode::Modified);
        assert_eq!(files[1].short_code(), "MM");
        assert!(files[2].is_untracked);
    }

    #[test]
    fn merger_does_not_reset_fields_with_defaults() {
        let mut merger = StatusMerger::new();
        merger.add(parse_status_line("A  new.rs").unwrap());
        merger.add(FileStatus {
            path: "new.rs".into(),
            work_status: StatusCode::Modified,
            ..Default::default()
        });

        let files = merger.finish();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].index_status, StatusCode::Added);
        assert_eq!(files[0].work_status, StatusCode::Modified);
    }

    #[test]
    fn merger_drops_records_without_changes() {
        let mut merger = StatusMerger::new();
        merger.add(FileStatus {
            path: "clean.rs".into(),
            ..Default::default()
        });
        assert!(merger.finish().is_empty());
    }
}
