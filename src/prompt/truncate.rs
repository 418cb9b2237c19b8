//! Head/tail excerpts of oversized diffs.
//!
//! Both modes share [`bounded_excerpt`]: measure the text, and if it is over
//! the limit keep a leading and a trailing slice around a marker. They differ
//! only in how size is measured and where the slices are cut.

use std::borrow::Cow;

use crate::prompt::budget::estimate_tokens;

/// Diffs with at most this many lines are never cut by line.
pub const MIN_TRUNCATABLE_LINES: usize = 20;

/// Marker used by the byte-budget mode unless the caller provides one.
pub const DEFAULT_BYTE_MARKER: &str = "(diff truncated)";

struct Cut<'a> {
    head: &'a str,
    marker: String,
    tail: &'a str,
}

fn bounded_excerpt<'a>(
    text: &'a str,
    limit: usize,
    measure: impl Fn(&str) -> usize,
    cut: impl FnOnce(&'a str) -> Option<Cut<'a>>,
) -> Cow<'a, str> {
    if measure(text) <= limit {
        return Cow::Borrowed(text);
    }
    let Some(cut) = cut(text) else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(cut.head.len() + cut.marker.len() + cut.tail.len());
    out.push_str(cut.head);
    out.push_str(&cut.marker);
    out.push_str(cut.tail);

    // A marker longer than what it replaces buys nothing.
    if out.len() >= text.len() {
        return Cow::Borrowed(text);
    }
    Cow::Owned(out)
}

/// Fit `diff` under `token_limit` estimated tokens by keeping whole lines
/// from both ends.
///
/// Returns the input untouched when it already fits or has no more than
/// [`MIN_TRUNCATABLE_LINES`] lines. Otherwise keeps `token_limit / 6` lines
/// at each end, at least one and at most a third of the document.
pub fn truncate_tokens(diff: &str, token_limit: usize) -> Cow<'_, str> {
    bounded_excerpt(diff, token_limit, estimate_tokens, |text| {
        let breaks: Vec<usize> = text.match_indices('\n').map(|(idx, _)| idx).collect();
        let total = breaks.len() + 1;
        if total <= MIN_TRUNCATABLE_LINES {
            return None;
        }

        let keep = (token_limit / 6).clamp(1, total / 3);
        let head = &text[..breaks[keep - 1]];
        let tail = &text[breaks[total - keep - 1] + 1..];
        let elided = total - 2 * keep;

        Some(Cut {
            head,
            marker: format!(
                "\n\n--- Diff truncated: {elided} of {total} lines omitted \
                 (showing {keep} head + {keep} tail lines) ---\n\n"
            ),
            tail,
        })
    })
}

/// Fit `diff` under `byte_limit` bytes by keeping the first and last
/// `byte_limit / 2` bytes around `marker`. A limit of zero means unlimited.
/// Cuts never split a UTF-8 sequence.
pub fn truncate_bytes<'a>(diff: &'a str, byte_limit: usize, marker: &str) -> Cow<'a, str> {
    if byte_limit == 0 {
        return Cow::Borrowed(diff);
    }

    bounded_excerpt(diff, byte_limit, str::len, |text| {
        let half = byte_limit / 2;
        let head_end = floor_boundary(text, half);
        let tail_start = ceil_boundary(text, text.len() - half);

        Some(Cut {
            head: &text[..head_end],
            marker: format!("\n{marker}\n"),
            tail: &text[tail_start..],
        })
    })
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_boundary(text: &str, mut idx: usize) -> usize {
    while !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
