//! Text edits against a compilation unit's source

use super::Span;
use crate::errors::{Result, SemaError};

/// Replace `span` with `replacement`; an empty replacement deletes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub span: Span,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    pub fn delete(span: Span) -> Self {
        Self::replace(span, String::new())
    }
}

/// Apply all edits at once. Edits are positioned against the original
/// source, so their order in `edits` does not matter, but two edits may not
/// touch overlapping ranges.
pub fn apply_edits(source: &str, mut edits: Vec<TextEdit>) -> Result<String> {
    edits.sort_by_key(|e| (e.span.start, e.span.end));
    for pair in edits.windows(2) {
        if pair[1].span.start < pair[0].span.end {
            return Err(SemaError::OverlappingEdits {
                offset: pair[1].span.start,
            });
        }
    }

    let mut result = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in &edits {
        result.push_str(&source[cursor..edit.span.start]);
        result.push_str(&edit.replacement);
        cursor = edit.span.end;
    }
    result.push_str(&source[cursor..]);
    log::trace!("Applied {} edits", edits.len());
    Ok(result)
}

/// Span to delete for a statement: the whole line when the statement is
/// alone on it, otherwise the statement plus trailing blanks
pub fn deletion_span_for_statement(source: &str, span: Span) -> Span {
    let bytes = source.as_bytes();
    let line_start = source[..span.start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let only_blank_before = source[line_start..span.start]
        .chars()
        .all(|c| c == ' ' || c == '\t');

    let mut end = span.end;
    while end < bytes.len() && (bytes[end] == b' ' || bytes[end] == b'\t') {
        end += 1;
    }
    let at_line_end = end >= bytes.len() || bytes[end] == b'\n' || bytes[end] == b'\r';

    if only_blank_before && at_line_end {
        let mut line_end = end;
        if line_end < bytes.len() && bytes[line_end] == b'\r' {
            line_end += 1;
        }
        if line_end < bytes.len() && bytes[line_end] == b'\n' {
            line_end += 1;
        }
        Span::new(line_start, line_end)
    } else if at_line_end {
        Span::new(span.start, end)
    } else {
        Span::new(span.start, end.max(span.end))
    }
}

/// Leading whitespace of the line containing `offset`
pub fn indentation_at(source: &str, offset: usize) -> &str {
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let rest = &source[line_start..];
    let width = rest
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(rest.len());
    &rest[..width]
}
