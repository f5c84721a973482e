//! Glossary term injection for free-text résumé fields.
//!
//! # Responsibility
//! - Find known glossary terms in free text.
//! - Wrap each occurrence in a layout-specific annotation carrying the
//!   term's description.
//!
//! # Invariants
//! - Matching is case-sensitive and respects word boundaries on word-character
//!   edges of the term.
//! - Which terms apply is decided against the original text.
//! - Annotated output is never scanned again, so a term that also appears in
//!   another term's annotation is not injected twice.

use crate::latex;
use crate::listutil::{listify, unique};
use crate::model::{AttributeRecord, EntryResult, FromAttrMap, GlossaryEntry};
use log::debug;
use regex::Regex;

/// Selects the annotation markup emitted around matched terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Modern,
    Retro,
}

enum Segment {
    Plain(String),
    Annotated(String),
}

/// Annotates every glossary term occurring in `text`.
///
/// Terms come from all glossary entries, deduplicated in stored order; a
/// term's description is taken from the first entry carrying that term.
/// Text without any glossary term is returned unchanged.
pub fn glossary_inject(
    text: &str,
    glossary: &[AttributeRecord],
    mode: RenderMode,
) -> EntryResult<String> {
    let entries = listify(glossary)
        .iter()
        .map(|entity| GlossaryEntry::from_map(&entity.fields))
        .collect::<EntryResult<Vec<_>>>()?;
    let terms = unique(entries.iter().map(|entry| entry.term.as_str()));

    let mut segments = vec![Segment::Plain(text.to_string())];
    for term in terms {
        let Some(pattern) = term_pattern(term) else {
            continue;
        };
        if !pattern.is_match(text) {
            continue;
        }
        let Some(entry) = entries.iter().find(|entry| entry.term == term) else {
            continue;
        };

        let annotation = match mode {
            RenderMode::Modern => latex::annotation(term, &entry.description),
            RenderMode::Retro => latex::tooltip(term, &entry.description),
        };
        debug!(
            "event=glossary_inject module=glossary status=ok term_len={}",
            term.len()
        );
        segments = segments
            .into_iter()
            .flat_map(|segment| split_segment(segment, &pattern, &annotation))
            .collect();
    }

    Ok(segments
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(value) | Segment::Annotated(value) => value,
        })
        .collect())
}

fn term_pattern(term: &str) -> Option<Regex> {
    let first = term.chars().next()?;
    let last = term.chars().last()?;
    let mut pattern = String::new();
    if is_word_char(first) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(term));
    if is_word_char(last) {
        pattern.push_str(r"\b");
    }
    Regex::new(&pattern).ok()
}

fn is_word_char(value: char) -> bool {
    value.is_alphanumeric() || value == '_'
}

fn split_segment(segment: Segment, pattern: &Regex, annotation: &str) -> Vec<Segment> {
    let Segment::Plain(value) = segment else {
        return vec![segment];
    };

    let mut parts = Vec::new();
    let mut cursor = 0;
    for found in pattern.find_iter(&value) {
        if found.start() > cursor {
            parts.push(Segment::Plain(value[cursor..found.start()].to_string()));
        }
        parts.push(Segment::Annotated(annotation.to_string()));
        cursor = found.end();
    }
    if cursor < value.len() {
        parts.push(Segment::Plain(value[cursor..].to_string()));
    }
    parts
}
