//! Document buffers and the buffer arena
//!
//! A [`DocumentBuffer`] owns the text of one open document together with
//! its per-range character formatting and a bounded undo history. Buffers
//! live in a [`BufferArena`] and are addressed by an opaque [`BufferId`]
//! handle; a handle is never reused once its buffer is released, so a
//! stale handle can always be detected by a failed lookup.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

/// Maximum number of undo states retained per buffer.
const MAX_UNDO_SIZE: usize = 100;

// ─────────────────────────────────────────────────────────────────────────────
// Character Formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Per-character rich-text attributes.
///
/// Applying a format to a range overlays it verbatim: the range ends up
/// with exactly this format. Capturing at a position returns the format
/// in effect there, or the default when the position is unformatted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharFormat {
    /// Bold weight
    pub bold: bool,
    /// Italic style
    pub italic: bool,
    /// Underline decoration
    pub underline: bool,
    /// Strikethrough decoration
    pub strikethrough: bool,
    /// Background highlight color as an RGB triple
    pub highlight: Option<[u8; 3]>,
}

impl CharFormat {
    /// Whether this format carries no attributes at all.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A contiguous byte range of the document carrying one format.
///
/// Runs are kept sorted by `start`, non-overlapping, non-empty, and only
/// exist for non-default formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatRun {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Format applied to the range
    pub format: CharFormat,
}

// ─────────────────────────────────────────────────────────────────────────────
// Document Buffer
// ─────────────────────────────────────────────────────────────────────────────

/// A saved edit state, used as one undo history entry.
#[derive(Debug, Clone)]
pub struct EditState {
    content: String,
    runs: Vec<FormatRun>,
}

/// In-memory text content plus formatting for one open document.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuffer {
    /// Document text
    content: String,
    /// Formatting runs over `content` (sorted, non-overlapping)
    runs: Vec<FormatRun>,
    /// Content at the last save (for modification detection)
    original_content: String,
    /// Undo history stack
    undo_stack: Vec<EditState>,
    /// Redo history stack
    redo_stack: Vec<EditState>,
}

impl DocumentBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer seeded with content, treated as unmodified.
    pub fn with_content(content: String) -> Self {
        Self {
            original_content: content.clone(),
            content,
            ..Self::default()
        }
    }

    /// The document text.
    pub fn text(&self) -> &str {
        &self.content
    }

    /// The formatting runs (sorted, non-overlapping).
    pub fn runs(&self) -> &[FormatRun] {
        &self.runs
    }

    /// Check if the buffer has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.content != self.original_content
    }

    /// Mark the current content as saved.
    pub fn mark_saved(&mut self) {
        self.original_content = self.content.clone();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Formatting
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the format in effect at a byte position.
    ///
    /// Returns the default format when no run covers the position.
    pub fn capture_char_format(&self, pos: usize) -> CharFormat {
        self.runs
            .iter()
            .find(|r| r.start <= pos && pos < r.end)
            .map(|r| r.format)
            .unwrap_or_default()
    }

    /// Overlay a format onto a byte range.
    ///
    /// Existing runs overlapping the range are trimmed to its edges; the
    /// range itself ends up carrying exactly `format`. Applying the
    /// default format clears formatting from the range.
    pub fn apply_char_format(&mut self, range: Range<usize>, format: CharFormat) {
        if range.start >= range.end {
            return;
        }

        let mut next: Vec<FormatRun> = Vec::with_capacity(self.runs.len() + 1);
        for run in &self.runs {
            if run.end <= range.start || run.start >= range.end {
                next.push(*run);
                continue;
            }
            // Keep the portions outside the new range
            if run.start < range.start {
                next.push(FormatRun {
                    start: run.start,
                    end: range.start,
                    format: run.format,
                });
            }
            if run.end > range.end {
                next.push(FormatRun {
                    start: range.end,
                    end: run.end,
                    format: run.format,
                });
            }
        }

        if !format.is_default() {
            next.push(FormatRun {
                start: range.start,
                end: range.end,
                format,
            });
        }

        next.sort_by_key(|r| r.start);
        self.runs = coalesce(next);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Text Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace a byte range of text, keeping format runs attached to the
    /// characters they described.
    ///
    /// Runs wholly inside the removed range are dropped, runs straddling
    /// it are trimmed, and runs after it shift by the length difference.
    /// Inserted text starts out unformatted; callers that want it to
    /// inherit a format re-apply one explicitly.
    ///
    /// This is a low-level primitive and does not record undo history;
    /// see [`begin_edit`](Self::begin_edit) / [`commit_edit`](Self::commit_edit).
    pub fn splice(&mut self, range: Range<usize>, replacement: &str) {
        debug_assert!(range.start <= range.end && range.end <= self.content.len());

        let removed = range.end - range.start;
        let inserted = replacement.len();
        self.content.replace_range(range.clone(), replacement);

        let mut next: Vec<FormatRun> = Vec::with_capacity(self.runs.len());
        for run in &self.runs {
            if run.end <= range.start {
                next.push(*run);
                continue;
            }
            // Left portion, before the removed range
            if run.start < range.start {
                next.push(FormatRun {
                    start: run.start,
                    end: range.start.min(run.end),
                    format: run.format,
                });
            }
            // Right portion, shifted by the length difference
            if run.end > range.end {
                let start = run.start.max(range.end) - removed + inserted;
                let end = run.end - removed + inserted;
                next.push(FormatRun {
                    start,
                    end,
                    format: run.format,
                });
            }
        }
        self.runs = coalesce(next);
    }

    /// Set new content as a single undoable edit.
    pub fn set_content(&mut self, new_content: String) {
        if new_content != self.content {
            let old = self.begin_edit();
            self.content = new_content;
            self.runs.clear();
            self.commit_edit(old);
        }
    }

    /// Capture the current edit state before a compound mutation.
    pub fn begin_edit(&self) -> EditState {
        EditState {
            content: self.content.clone(),
            runs: self.runs.clone(),
        }
    }

    /// Record a compound mutation as one undo step.
    ///
    /// Pushes the pre-edit state captured by [`begin_edit`](Self::begin_edit)
    /// onto the undo stack (if the content actually changed) and clears
    /// the redo stack.
    pub fn commit_edit(&mut self, old: EditState) {
        if old.content != self.content {
            self.undo_stack.push(old);
            if self.undo_stack.len() > MAX_UNDO_SIZE {
                self.undo_stack.remove(0);
            }
            self.redo_stack.clear();
        }
    }

    /// Undo the last edit. Returns `true` if undo was performed.
    pub fn undo(&mut self) -> bool {
        if let Some(previous) = self.undo_stack.pop() {
            self.redo_stack.push(EditState {
                content: std::mem::replace(&mut self.content, previous.content),
                runs: std::mem::replace(&mut self.runs, previous.runs),
            });
            true
        } else {
            false
        }
    }

    /// Redo the last undone edit. Returns `true` if redo was performed.
    pub fn redo(&mut self) -> bool {
        if let Some(next) = self.redo_stack.pop() {
            self.undo_stack.push(EditState {
                content: std::mem::replace(&mut self.content, next.content),
                runs: std::mem::replace(&mut self.runs, next.runs),
            });
            true
        } else {
            false
        }
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

/// Merge touching runs that carry the same format and drop empty ones.
fn coalesce(runs: Vec<FormatRun>) -> Vec<FormatRun> {
    let mut out: Vec<FormatRun> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.start >= run.end {
            continue;
        }
        match out.last_mut() {
            Some(prev) if prev.end == run.start && prev.format == run.format => {
                prev.end = run.end;
            }
            _ => out.push(run),
        }
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Buffer Arena
// ─────────────────────────────────────────────────────────────────────────────

/// Stable opaque identity for a buffer, independent of any UI widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(u64);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owner of all live document buffers, keyed by [`BufferId`].
///
/// Ids come from a monotonic counter and are never reused after a buffer
/// is released, so lookups on closed buffers reliably return `None`.
#[derive(Debug, Default)]
pub struct BufferArena {
    buffers: HashMap<BufferId, DocumentBuffer>,
    next_id: u64,
}

impl BufferArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a buffer and return its new handle.
    pub fn insert(&mut self, buffer: DocumentBuffer) -> BufferId {
        let id = BufferId(self.next_id);
        self.next_id += 1;
        self.buffers.insert(id, buffer);
        id
    }

    /// Look up a buffer by handle.
    pub fn get(&self, id: BufferId) -> Option<&DocumentBuffer> {
        self.buffers.get(&id)
    }

    /// Look up a buffer mutably by handle.
    pub fn get_mut(&mut self, id: BufferId) -> Option<&mut DocumentBuffer> {
        self.buffers.get_mut(&id)
    }

    /// Release a buffer, returning it if the handle was live.
    pub fn remove(&mut self, id: BufferId) -> Option<DocumentBuffer> {
        self.buffers.remove(&id)
    }

    /// Number of live buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether the arena holds no buffers.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn bold() -> CharFormat {
        CharFormat {
            bold: true,
            ..CharFormat::default()
        }
    }

    fn italic() -> CharFormat {
        CharFormat {
            italic: true,
            ..CharFormat::default()
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Formatting Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_capture_default_when_unformatted() {
        let buf = DocumentBuffer::with_content("hello".to_string());
        assert!(buf.capture_char_format(0).is_default());
        assert!(buf.capture_char_format(4).is_default());
    }

    #[test]
    fn test_apply_and_capture() {
        let mut buf = DocumentBuffer::with_content("hello world".to_string());
        buf.apply_char_format(0..5, bold());
        assert_eq!(buf.capture_char_format(0), bold());
        assert_eq!(buf.capture_char_format(4), bold());
        assert!(buf.capture_char_format(5).is_default());
    }

    #[test]
    fn test_apply_splits_existing_run() {
        let mut buf = DocumentBuffer::with_content("abcdefgh".to_string());
        buf.apply_char_format(0..8, bold());
        buf.apply_char_format(3..5, italic());
        assert_eq!(buf.capture_char_format(2), bold());
        assert_eq!(buf.capture_char_format(3), italic());
        assert_eq!(buf.capture_char_format(4), italic());
        assert_eq!(buf.capture_char_format(5), bold());
        assert_eq!(buf.runs().len(), 3);
    }

    #[test]
    fn test_apply_default_clears_range() {
        let mut buf = DocumentBuffer::with_content("abcdef".to_string());
        buf.apply_char_format(0..6, bold());
        buf.apply_char_format(2..4, CharFormat::default());
        assert_eq!(buf.capture_char_format(1), bold());
        assert!(buf.capture_char_format(2).is_default());
        assert_eq!(buf.capture_char_format(4), bold());
    }

    #[test]
    fn test_apply_empty_range_is_noop() {
        let mut buf = DocumentBuffer::with_content("abc".to_string());
        buf.apply_char_format(1..1, bold());
        assert!(buf.runs().is_empty());
    }

    #[test]
    fn test_coalesce_adjacent_equal_runs() {
        let mut buf = DocumentBuffer::with_content("abcdef".to_string());
        buf.apply_char_format(0..3, bold());
        buf.apply_char_format(3..6, bold());
        assert_eq!(buf.runs().len(), 1);
        assert_eq!(buf.runs()[0], FormatRun {
            start: 0,
            end: 6,
            format: bold(),
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Splice Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_splice_replaces_text() {
        let mut buf = DocumentBuffer::with_content("hello world".to_string());
        buf.splice(6..11, "there");
        assert_eq!(buf.text(), "hello there");
    }

    #[test]
    fn test_splice_shifts_following_runs() {
        let mut buf = DocumentBuffer::with_content("aa bb cc".to_string());
        buf.apply_char_format(6..8, bold()); // "cc"
        buf.splice(3..5, "bbbb"); // "aa bbbb cc"
        assert_eq!(buf.text(), "aa bbbb cc");
        assert_eq!(buf.runs(), &[FormatRun {
            start: 8,
            end: 10,
            format: bold(),
        }]);
    }

    #[test]
    fn test_splice_drops_runs_inside_removed_range() {
        let mut buf = DocumentBuffer::with_content("abcdef".to_string());
        buf.apply_char_format(2..4, bold()); // "cd"
        buf.splice(1..5, "X");
        assert_eq!(buf.text(), "aXf");
        assert!(buf.runs().is_empty());
    }

    #[test]
    fn test_splice_trims_straddling_run() {
        let mut buf = DocumentBuffer::with_content("abcdef".to_string());
        buf.apply_char_format(0..6, bold());
        buf.splice(2..4, "XYZ"); // "abXYZef"
        assert_eq!(buf.text(), "abXYZef");
        // "ab" keeps bold, inserted "XYZ" is unformatted, "ef" keeps bold
        assert_eq!(buf.capture_char_format(0), bold());
        assert!(buf.capture_char_format(2).is_default());
        assert!(buf.capture_char_format(4).is_default());
        assert_eq!(buf.capture_char_format(5), bold());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Undo/Redo Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_set_content_is_one_undo_step() {
        let mut buf = DocumentBuffer::with_content("one".to_string());
        buf.set_content("two".to_string());
        assert!(buf.can_undo());
        assert!(buf.undo());
        assert_eq!(buf.text(), "one");
        assert!(buf.redo());
        assert_eq!(buf.text(), "two");
    }

    #[test]
    fn test_compound_edit_is_one_undo_step() {
        let mut buf = DocumentBuffer::with_content("aaa".to_string());
        let old = buf.begin_edit();
        buf.splice(0..1, "b");
        buf.splice(1..2, "b");
        buf.splice(2..3, "b");
        buf.commit_edit(old);
        assert_eq!(buf.text(), "bbb");
        assert!(buf.undo());
        assert_eq!(buf.text(), "aaa");
        assert!(!buf.can_undo());
    }

    #[test]
    fn test_undo_restores_formatting() {
        let mut buf = DocumentBuffer::with_content("abc".to_string());
        buf.apply_char_format(0..3, bold());
        let old = buf.begin_edit();
        buf.splice(0..3, "xyz");
        buf.commit_edit(old);
        assert!(buf.runs().is_empty());
        assert!(buf.undo());
        assert_eq!(buf.capture_char_format(1), bold());
    }

    #[test]
    fn test_unchanged_commit_records_nothing() {
        let mut buf = DocumentBuffer::with_content("abc".to_string());
        let old = buf.begin_edit();
        buf.commit_edit(old);
        assert!(!buf.can_undo());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Modification Tracking Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_is_modified() {
        let mut buf = DocumentBuffer::with_content("abc".to_string());
        assert!(!buf.is_modified());
        buf.set_content("abcd".to_string());
        assert!(buf.is_modified());
        buf.mark_saved();
        assert!(!buf.is_modified());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Arena Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_arena_insert_and_get() {
        let mut arena = BufferArena::new();
        let id = arena.insert(DocumentBuffer::with_content("x".to_string()));
        assert_eq!(arena.get(id).unwrap().text(), "x");
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_arena_remove_releases_buffer() {
        let mut arena = BufferArena::new();
        let id = arena.insert(DocumentBuffer::new());
        assert!(arena.remove(id).is_some());
        assert!(arena.get(id).is_none());
        assert!(arena.is_empty());
    }

    #[test]
    fn test_arena_ids_never_reused() {
        let mut arena = BufferArena::new();
        let first = arena.insert(DocumentBuffer::new());
        arena.remove(first);
        let second = arena.insert(DocumentBuffer::new());
        assert_ne!(first, second);
        // The stale handle stays dead
        assert!(arena.get(first).is_none());
        assert!(arena.get(second).is_some());
    }
}
