//! Find and Replace over the active document
//!
//! The search engine is a pull-based stepper: it holds an explicit
//! [`SearchSession`] (no hidden statics), scans forward or backward one
//! match at a time, and never prompts on its own. The interactive
//! yes/no/cancel loop is an external driver ([`run_interactive`]) wired
//! to whatever [`InteractivePrompt`] collaborator the caller supplies.
//!
//! Matching is literal substring, non-overlapping: the next scan position
//! is always the end of the previous match.

use crate::buffer::DocumentBuffer;
use log::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Search Session
// ─────────────────────────────────────────────────────────────────────────────

/// Options and history for the current search, owned by the search
/// engine for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    /// Last-used search string
    pub query: String,
    /// Whether matching is case-sensitive
    pub case_sensitive: bool,
    /// Previously entered queries, oldest first; persisted across restarts
    pub history: Vec<String>,
}

impl SearchSession {
    /// Append a query to the history unless it repeats the last entry.
    fn remember(&mut self, query: &str) {
        if query.is_empty() {
            return;
        }
        if self.history.last().map(String::as_str) != Some(query) {
            self.history.push(query.to_string());
        }
    }
}

/// Whether a search is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// No match is current
    Idle,
    /// A match is current and next/previous steps continue from it
    Scanning,
}

/// Result of one search step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A match at the given byte range
    Match { start: usize, end: usize },
    /// The query does not occur at all (or is empty)
    NotFound,
    /// Forward scan exhausted; no wrap-around to the start
    NoMoreOccurrences,
    /// Backward scan exhausted; no wrap-around to the end
    NoPreviousOccurrences,
}

// ─────────────────────────────────────────────────────────────────────────────
// Search Engine
// ─────────────────────────────────────────────────────────────────────────────

/// Stateful, resumable substring search over a document's text.
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    /// Query, options, and history
    pub session: SearchSession,
    /// The current match as (start, end) byte positions
    current: Option<(usize, usize)>,
}

impl SearchEngine {
    /// Create an engine with no session state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a restored query history.
    pub fn with_history(history: Vec<String>) -> Self {
        Self {
            session: SearchSession {
                history,
                ..SearchSession::default()
            },
            current: None,
        }
    }

    /// Whether a search is in progress.
    pub fn state(&self) -> SearchState {
        if self.current.is_some() {
            SearchState::Scanning
        } else {
            SearchState::Idle
        }
    }

    /// The current match, if scanning.
    pub fn current_match(&self) -> Option<(usize, usize)> {
        self.current
    }

    /// Begin a new search from the start of the document.
    ///
    /// Records the query and options into the session (appending to the
    /// history when distinct from the last entry) and performs the first
    /// forward match from position 0. An empty query never matches.
    pub fn start_search(&mut self, text: &str, query: &str, case_sensitive: bool) -> SearchOutcome {
        self.session.query = query.to_string();
        self.session.case_sensitive = case_sensitive;
        self.session.remember(query);
        self.current = None;

        if query.is_empty() {
            return SearchOutcome::NotFound;
        }

        match find_forward(text, query, case_sensitive, 0) {
            Some((start, end)) => {
                debug!("Search '{}' matched at {}..{}", query, start, end);
                self.current = Some((start, end));
                SearchOutcome::Match { start, end }
            }
            None => SearchOutcome::NotFound,
        }
    }

    /// Continue the forward scan from the end of the current match.
    ///
    /// Does not wrap around to the beginning; at exhaustion the current
    /// match is kept so a backward step can still resume from it.
    pub fn find_next(&mut self, text: &str) -> SearchOutcome {
        let Some((_, end)) = self.current else {
            return if self.session.query.is_empty() {
                SearchOutcome::NotFound
            } else {
                SearchOutcome::NoMoreOccurrences
            };
        };

        match find_forward(text, &self.session.query, self.session.case_sensitive, end) {
            Some((start, end)) => {
                self.current = Some((start, end));
                SearchOutcome::Match { start, end }
            }
            None => SearchOutcome::NoMoreOccurrences,
        }
    }

    /// Scan backward from just before the current match.
    ///
    /// Does not wrap around to the end of the document.
    pub fn find_previous(&mut self, text: &str) -> SearchOutcome {
        let Some((start, _)) = self.current else {
            return SearchOutcome::NoPreviousOccurrences;
        };

        match find_backward(text, &self.session.query, self.session.case_sensitive, start) {
            Some((start, end)) => {
                self.current = Some((start, end));
                SearchOutcome::Match { start, end }
            }
            None => SearchOutcome::NoPreviousOccurrences,
        }
    }
}

/// First occurrence of `query` at or after `from`.
///
/// Case-insensitive matching folds both sides to lowercase character by
/// character, so the reported `(start, end)` are always byte positions
/// in the original text even where lowercasing changes byte lengths
/// (e.g. 'İ', 'ẞ'). The buffer itself is never altered.
fn find_forward(
    text: &str,
    query: &str,
    case_sensitive: bool,
    from: usize,
) -> Option<(usize, usize)> {
    if query.is_empty() || from > text.len() {
        return None;
    }
    if case_sensitive {
        return text[from..]
            .find(query)
            .map(|p| (from + p, from + p + query.len()));
    }

    let mut start = from;
    loop {
        if let Some(len) = folded_prefix_len(&text[start..], query) {
            return Some((start, start + len));
        }
        match text[start..].chars().next() {
            Some(c) => start += c.len_utf8(),
            None => return None,
        }
    }
}

/// Last occurrence of `query` ending at or before `before`.
fn find_backward(
    text: &str,
    query: &str,
    case_sensitive: bool,
    before: usize,
) -> Option<(usize, usize)> {
    if query.is_empty() || before > text.len() {
        return None;
    }
    if case_sensitive {
        return text[..before]
            .rfind(query)
            .map(|p| (p, p + query.len()));
    }

    let mut best = None;
    let mut start = 0;
    while start < before {
        if let Some(len) = folded_prefix_len(&text[start..], query) {
            if start + len <= before {
                best = Some((start, start + len));
            }
        }
        match text[start..].chars().next() {
            Some(c) => start += c.len_utf8(),
            None => break,
        }
    }
    best
}

/// Byte length of the prefix of `text` that matches `query`
/// case-insensitively, comparing the lowercase expansion of both sides
/// character by character.
fn folded_prefix_len(text: &str, query: &str) -> Option<usize> {
    let mut wanted = query.chars().flat_map(char::to_lowercase);
    let mut pending = wanted.next();
    let mut len = 0;

    for ch in text.chars() {
        if pending.is_none() {
            break;
        }
        for folded in ch.to_lowercase() {
            match pending {
                Some(q) if q == folded => pending = wanted.next(),
                _ => return None,
            }
        }
        len += ch.len_utf8();
        if pending.is_none() {
            return Some(len);
        }
    }

    if pending.is_none() {
        Some(len)
    } else {
        None
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Replace All
// ─────────────────────────────────────────────────────────────────────────────

/// Replace every non-overlapping occurrence of `find_text` in the buffer.
///
/// Each replacement inherits the character format in effect at the start
/// of the matched span, not a default format. The scan position always
/// advances past the just-inserted replacement, so replacement text that
/// happens to contain `find_text` is never re-matched. The whole pass is
/// recorded as a single undo step.
///
/// Returns the number of replacements made; an empty `find_text` is a
/// no-op returning 0.
pub fn replace_all(buffer: &mut DocumentBuffer, find_text: &str, replace_text: &str) -> usize {
    if find_text.is_empty() {
        return 0;
    }

    let old = buffer.begin_edit();
    let mut count = 0;
    let mut pos = 0;

    while let Some(offset) = buffer.text()[pos..].find(find_text) {
        let start = pos + offset;
        let end = start + find_text.len();

        // Capture the original span's format before replacing the text
        let format = buffer.capture_char_format(start);
        buffer.splice(start..end, replace_text);
        buffer.apply_char_format(start..start + replace_text.len(), format);

        count += 1;
        pos = start + replace_text.len();
    }

    if count > 0 {
        buffer.commit_edit(old);
        debug!("Replaced {} occurrences of '{}'", count, find_text);
    }
    count
}

// ─────────────────────────────────────────────────────────────────────────────
// Interactive Driver
// ─────────────────────────────────────────────────────────────────────────────

/// Answer to a yes/no/cancel question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Cancel,
}

/// The interactive prompt collaborator.
///
/// Supplies the question/notification surface for the step-wise find
/// loop, so the same engine works with a console, a GUI dialog, or a
/// scripted test double.
pub trait InteractivePrompt {
    /// Ask a yes/no/cancel question.
    fn confirm(&mut self, question: &str) -> Answer;
    /// Show a one-way message.
    fn inform(&mut self, message: &str);
}

/// Drive a full interactive find over `text`.
///
/// Starts a search and then repeatedly asks whether to continue: Yes
/// steps forward, No offers a backward step, Cancel stops. Exhaustion in
/// either direction is reported and ends the loop. The engine keeps the
/// session state, so a later call reuses the same history.
pub fn run_interactive<P: InteractivePrompt>(
    engine: &mut SearchEngine,
    text: &str,
    query: &str,
    case_sensitive: bool,
    ui: &mut P,
) {
    match engine.start_search(text, query, case_sensitive) {
        SearchOutcome::Match { start, .. } => {
            ui.inform(&format!("Found \"{}\" at offset {}", query, start));
        }
        _ => {
            ui.inform(&format!("Cannot find \"{}\"", query));
            return;
        }
    }

    loop {
        match ui.confirm("Do you want to find the next occurrence?") {
            Answer::Yes => match engine.find_next(text) {
                SearchOutcome::Match { start, .. } => {
                    ui.inform(&format!("Found \"{}\" at offset {}", query, start));
                }
                _ => {
                    ui.inform(&format!("No more occurrences of \"{}\"", query));
                    break;
                }
            },
            Answer::No => match ui.confirm("Do you want to find the previous occurrence?") {
                Answer::Yes => match engine.find_previous(text) {
                    SearchOutcome::Match { start, .. } => {
                        ui.inform(&format!("Found \"{}\" at offset {}", query, start));
                    }
                    _ => {
                        ui.inform(&format!("No previous occurrences of \"{}\"", query));
                        break;
                    }
                },
                _ => break,
            },
            Answer::Cancel => break,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
