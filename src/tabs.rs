//! Tab registry: the ordered collection of open documents
//!
//! This module associates document buffers with optional backing files
//! and display labels, and tracks which tab is active. Buffers are owned
//! by a [`BufferArena`] and referenced by handle, so every association is
//! keyed by a stable [`BufferId`] rather than any widget identity.

use crate::buffer::{BufferArena, BufferId, DocumentBuffer};
use crate::error::{Error, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Tab Entry
// ─────────────────────────────────────────────────────────────────────────────

/// One user-visible tab: a buffer handle plus its file association.
#[derive(Debug, Clone)]
pub struct TabEntry {
    /// Handle of the buffer this tab owns
    pub buffer: BufferId,
    /// Backing file path; `None` for untitled documents
    pub file_path: Option<PathBuf>,
}

impl TabEntry {
    /// Display label derived from the file path, or `"Untitled"`.
    ///
    /// The label is always computed from the current path, so it can
    /// never fall out of sync after a save or save-as.
    pub fn display_label(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .unwrap_or("Untitled")
            .to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tab Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered collection of open tabs with an active index.
///
/// Insertion order is display order. The active index is valid whenever
/// the registry is non-empty; callers must check [`is_empty`](Self::is_empty)
/// before document operations after closing the last tab.
#[derive(Debug, Default)]
pub struct TabRegistry {
    arena: BufferArena,
    tabs: Vec<TabEntry>,
    active: usize,
}

impl TabRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open tabs.
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Whether no tabs are open.
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// All tab entries in display order.
    pub fn entries(&self) -> &[TabEntry] {
        &self.tabs
    }

    /// Index of the active tab. Meaningless when the registry is empty.
    pub fn active_index(&self) -> usize {
        self.active
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tab Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new tab, make it active, and return its buffer handle.
    pub fn create_tab(&mut self, initial_content: String, file_path: Option<PathBuf>) -> BufferId {
        let id = self.arena.insert(DocumentBuffer::with_content(initial_content));
        self.tabs.push(TabEntry {
            buffer: id,
            file_path,
        });
        self.active = self.tabs.len() - 1;
        debug!("Created tab {} at index {}", id, self.active);
        id
    }

    /// Open a file in a new tab.
    ///
    /// If the file is already open, switches to its tab instead of
    /// opening a duplicate. Fails with [`Error::Unreadable`] when the
    /// file cannot be read.
    pub fn open_from_file(&mut self, path: PathBuf) -> Result<BufferId> {
        if let Some(index) = self.find_tab_by_path(&path) {
            self.active = index;
            info!("File already open, switching to tab {}", index);
            return Ok(self.tabs[index].buffer);
        }

        let content = fs::read_to_string(&path).map_err(|e| Error::Unreadable {
            path: path.clone(),
            source: e,
        })?;

        info!("Opened file: {}", path.display());
        Ok(self.create_tab(content, Some(path)))
    }

    /// Close the tab owning `id`, releasing its buffer.
    ///
    /// If the closed tab was active, the active index is repaired to the
    /// nearest remaining tab. Unknown handles are a no-op.
    pub fn close_tab(&mut self, id: BufferId) {
        let Some(index) = self.tabs.iter().position(|t| t.buffer == id) else {
            debug!("close_tab: no tab owns buffer {}", id);
            return;
        };

        self.tabs.remove(index);
        self.arena.remove(id);

        // Repair the active index
        if index < self.active || (self.active >= self.tabs.len() && !self.tabs.is_empty()) {
            self.active -= 1;
        }
        if self.tabs.is_empty() {
            self.active = 0;
        }
        debug!("Closed tab {}, active is now {}", index, self.active);
    }

    /// Find the index of the tab backed by `path`, if any.
    pub fn find_tab_by_path(&self, path: &Path) -> Option<usize> {
        self.tabs
            .iter()
            .position(|t| t.file_path.as_deref() == Some(path))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Active Tab
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle of the active tab's buffer, or `None` when empty.
    pub fn active_tab(&self) -> Option<BufferId> {
        self.tabs.get(self.active).map(|t| t.buffer)
    }

    /// The active tab entry, or `None` when empty.
    pub fn active_entry(&self) -> Option<&TabEntry> {
        self.tabs.get(self.active)
    }

    /// The active tab's buffer, or `None` when empty.
    pub fn active_buffer(&self) -> Option<&DocumentBuffer> {
        self.active_tab().and_then(|id| self.arena.get(id))
    }

    /// The active tab's buffer mutably, or `None` when empty.
    pub fn active_buffer_mut(&mut self) -> Option<&mut DocumentBuffer> {
        let id = self.active_tab()?;
        self.arena.get_mut(id)
    }

    /// Look up any buffer by handle.
    pub fn buffer(&self, id: BufferId) -> Option<&DocumentBuffer> {
        self.arena.get(id)
    }

    /// Switch the active tab. Out-of-range indices are a logged no-op.
    pub fn set_active_index(&mut self, index: usize) {
        if index < self.tabs.len() {
            self.active = index;
            debug!("Switched to tab {}", index);
        } else {
            warn!("Invalid tab index: {}", index);
        }
    }

    /// Display label for tab `index`, with a `*` marker when modified.
    pub fn tab_label(&self, index: usize) -> Option<String> {
        let entry = self.tabs.get(index)?;
        let label = entry.display_label();
        let modified = self
            .arena
            .get(entry.buffer)
            .map(|b| b.is_modified())
            .unwrap_or(false);
        Some(if modified {
            format!("{}*", label)
        } else {
            label
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Saving
    // ─────────────────────────────────────────────────────────────────────────

    /// Save the active tab's content to disk.
    ///
    /// With a path this is Save-As: the tab is re-associated before the
    /// write, and its display label follows from the new path. Without
    /// one the existing association is used, or [`Error::NoAssociatedFile`]
    /// is returned so the caller can prompt for a destination. Write
    /// failures surface the underlying I/O message unmodified.
    pub fn save_active(&mut self, path: Option<PathBuf>) -> Result<()> {
        let Some(entry) = self.tabs.get_mut(self.active) else {
            return Err(Error::NoAssociatedFile);
        };

        let target = match path {
            Some(p) => {
                entry.file_path = Some(p.clone());
                p
            }
            None => entry
                .file_path
                .clone()
                .ok_or(Error::NoAssociatedFile)?,
        };

        let id = entry.buffer;
        let content = self
            .arena
            .get(id)
            .map(|b| b.text().to_string())
            .unwrap_or_default();

        fs::write(&target, content).map_err(|e| Error::Unwritable {
            path: target.clone(),
            source: e,
        })?;

        if let Some(buffer) = self.arena.get_mut(id) {
            buffer.mark_saved();
        }
        info!("Saved {}", target.display());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry_with_tabs(n: usize) -> TabRegistry {
        let mut reg = TabRegistry::new();
        for i in 0..n {
            reg.create_tab(format!("tab {}", i), None);
        }
        reg
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tab Lifecycle Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_create_tab_becomes_active() {
        let mut reg = TabRegistry::new();
        let first = reg.create_tab(String::new(), None);
        assert_eq!(reg.active_tab(), Some(first));
        let second = reg.create_tab(String::new(), None);
        assert_eq!(reg.active_tab(), Some(second));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_handles_are_unique_across_tabs() {
        let reg = registry_with_tabs(5);
        let mut ids: Vec<_> = reg.entries().iter().map(|t| t.buffer).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_close_tab_unknown_handle_is_noop() {
        let mut reg = registry_with_tabs(2);
        let id = reg.active_tab().unwrap();
        reg.close_tab(id);
        assert_eq!(reg.len(), 1);
        // Closing the same handle again does nothing
        reg.close_tab(id);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_close_active_tab_repairs_index() {
        let mut reg = registry_with_tabs(3);
        assert_eq!(reg.active_index(), 2);
        reg.close_tab(reg.active_tab().unwrap());
        assert_eq!(reg.active_index(), 1);
        assert!(reg.active_tab().is_some());
    }

    #[test]
    fn test_close_tab_before_active_shifts_index() {
        let mut reg = registry_with_tabs(3);
        reg.set_active_index(2);
        let first = reg.entries()[0].buffer;
        reg.close_tab(first);
        assert_eq!(reg.active_index(), 1);
        assert_eq!(reg.active_buffer().unwrap().text(), "tab 2");
    }

    #[test]
    fn test_close_last_tab_then_operations_do_not_panic() {
        let mut reg = registry_with_tabs(1);
        reg.close_tab(reg.active_tab().unwrap());
        assert!(reg.is_empty());
        assert!(reg.active_tab().is_none());
        assert!(reg.active_buffer().is_none());
        assert!(reg.active_buffer_mut().is_none());
        assert!(matches!(
            reg.save_active(None),
            Err(Error::NoAssociatedFile)
        ));
    }

    #[test]
    fn test_active_index_valid_across_arbitrary_sequences() {
        // Deterministic pseudo-random create/close churn
        let mut reg = TabRegistry::new();
        let mut seed: u64 = 0x5eed;
        for _ in 0..200 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            if seed % 3 == 0 || reg.is_empty() {
                reg.create_tab(String::new(), None);
            } else {
                let victim = reg.entries()[(seed as usize / 3) % reg.len()].buffer;
                reg.close_tab(victim);
            }
            if !reg.is_empty() {
                assert!(reg.active_index() < reg.len());
                assert!(reg.active_tab().is_some());
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // File Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_open_from_file_reads_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.txt");
        fs::write(&path, "file body").unwrap();

        let mut reg = TabRegistry::new();
        let id = reg.open_from_file(path.clone()).unwrap();
        assert_eq!(reg.buffer(id).unwrap().text(), "file body");
        assert_eq!(reg.active_entry().unwrap().file_path, Some(path));
    }

    #[test]
    fn test_open_from_file_unreadable() {
        let dir = TempDir::new().unwrap();
        let mut reg = TabRegistry::new();
        let result = reg.open_from_file(dir.path().join("does-not-exist.txt"));
        assert!(matches!(result, Err(Error::Unreadable { .. })));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_open_same_file_twice_switches_instead_of_duplicating() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.txt");
        fs::write(&path, "x").unwrap();

        let mut reg = TabRegistry::new();
        let first = reg.open_from_file(path.clone()).unwrap();
        reg.create_tab(String::new(), None);
        let again = reg.open_from_file(path).unwrap();
        assert_eq!(first, again);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.active_index(), 0);
    }

    #[test]
    fn test_save_active_without_association() {
        let mut reg = registry_with_tabs(1);
        assert!(matches!(
            reg.save_active(None),
            Err(Error::NoAssociatedFile)
        ));
    }

    #[test]
    fn test_save_as_associates_and_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");

        let mut reg = TabRegistry::new();
        reg.create_tab("body".to_string(), None);
        assert_eq!(reg.tab_label(0).unwrap(), "Untitled");

        reg.save_active(Some(path.clone())).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "body");
        assert_eq!(reg.active_entry().unwrap().display_label(), "out.txt");
        assert!(!reg.active_buffer().unwrap().is_modified());

        // Plain save now reuses the association
        reg.active_buffer_mut().unwrap().set_content("body 2".to_string());
        reg.save_active(None).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "body 2");
    }

    #[test]
    fn test_save_failure_surfaces_io_error() {
        let dir = TempDir::new().unwrap();
        let mut reg = TabRegistry::new();
        reg.create_tab("body".to_string(), None);
        // Writing to a directory path fails
        let err = reg.save_active(Some(dir.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, Error::Unwritable { .. }));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Label Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_display_label_untitled() {
        let mut reg = TabRegistry::new();
        reg.create_tab(String::new(), None);
        assert_eq!(reg.active_entry().unwrap().display_label(), "Untitled");
    }

    #[test]
    fn test_display_label_base_name() {
        let mut reg = TabRegistry::new();
        reg.create_tab(String::new(), Some(PathBuf::from("/a/b/notes.txt")));
        assert_eq!(reg.active_entry().unwrap().display_label(), "notes.txt");
    }

    #[test]
    fn test_tab_label_modified_marker() {
        let mut reg = TabRegistry::new();
        reg.create_tab("x".to_string(), None);
        assert_eq!(reg.tab_label(0).unwrap(), "Untitled");
        reg.active_buffer_mut().unwrap().set_content("y".to_string());
        assert_eq!(reg.tab_label(0).unwrap(), "Untitled*");
    }

    #[test]
    fn test_set_active_index_bounds_checked() {
        let mut reg = registry_with_tabs(2);
        reg.set_active_index(0);
        assert_eq!(reg.active_index(), 0);
        reg.set_active_index(9);
        assert_eq!(reg.active_index(), 0);
    }
}
