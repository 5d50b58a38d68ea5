//! In-memory note filtering for the list screen.
//!
//! # Invariants
//! - Locked notes never match; their cached text is not searchable.
//! - Input order is preserved in every result.

use crate::model::note::Note;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Returns unlocked notes whose title, description, label or checkpoint text
/// contains `query`, ignoring case.
///
/// Runs of whitespace in the query match any whitespace run in the note.
/// A blank query returns every unlocked note.
pub fn search_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let unlocked = notes.iter().filter(|note| !note.locked);
    match build_matcher(query) {
        Some(matcher) => unlocked.filter(|note| matches_note(&matcher, note)).collect(),
        None => unlocked.collect(),
    }
}

/// Groups notes by label. Unlabeled notes land under `""`.
pub fn group_by_label(notes: &[Note]) -> BTreeMap<String, Vec<&Note>> {
    let mut groups: BTreeMap<String, Vec<&Note>> = BTreeMap::new();
    for note in notes {
        let key = note.label.as_deref().map(str::trim).unwrap_or_default();
        groups.entry(key.to_string()).or_default().push(note);
    }
    groups
}

fn build_matcher(query: &str) -> Option<Regex> {
    let terms: Vec<String> = WHITESPACE_RE
        .split(query.trim())
        .filter(|term| !term.is_empty())
        .map(regex::escape)
        .collect();
    if terms.is_empty() {
        return None;
    }

    // Escaped input always yields a valid pattern.
    RegexBuilder::new(&terms.join(r"\s+"))
        .case_insensitive(true)
        .build()
        .ok()
}

fn matches_note(matcher: &Regex, note: &Note) -> bool {
    [&note.title, &note.description, &note.label]
        .into_iter()
        .flatten()
        .any(|text| matcher.is_match(text))
        || note
            .checkpoints
            .iter()
            .any(|checkpoint| matcher.is_match(&checkpoint.content))
}
