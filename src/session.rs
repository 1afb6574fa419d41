//! Session persistence: snapshot and restore of all open tabs
//!
//! At shutdown the whole tab registry (every tab's backing path and raw
//! text, plus the active index) is written wholesale to a flat key-value
//! document; at startup it is read back and the registry reconstructed.
//! Formatting is intentionally not persisted, so the round-trip is lossy
//! on formatting and exact on text and paths.
//!
//! The store is one JSON object with the key scheme
//! `tabCount` / `tab<i>_filePath` / `tab<i>_content` / `currentTab`,
//! plus `searchHistory` for the find dialog's query history. A missing,
//! empty, or corrupt snapshot degrades to a single fresh untitled tab.

use crate::error::{Error, Result, ResultExt};
use crate::tabs::TabRegistry;
use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "quillpad";

/// Session file name
const SESSION_FILE_NAME: &str = "session.json";

/// Scratch file name used during atomic writes
const SESSION_BACKUP_NAME: &str = "session.json.bak";

// ─────────────────────────────────────────────────────────────────────────────
// Paths
// ─────────────────────────────────────────────────────────────────────────────

/// Platform-specific directory holding the session file.
///
/// Linux `~/.config/quillpad/`, macOS `~/Library/Application
/// Support/quillpad/`, Windows `%APPDATA%\quillpad\`.
pub fn get_session_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Full path to the session file.
pub fn get_session_file_path() -> Result<PathBuf> {
    Ok(get_session_dir()?.join(SESSION_FILE_NAME))
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Snapshot
// ─────────────────────────────────────────────────────────────────────────────

/// Persisted form of one tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedTab {
    /// Backing file path; `None` for untitled tabs (stored as "")
    pub file_path: Option<PathBuf>,
    /// Raw text content
    pub content: String,
}

/// The full serialized state of all tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Tabs in display order
    pub tabs: Vec<PersistedTab>,
    /// Persisted active tab index (clamped into range on restore)
    pub current_tab: usize,
    /// Search query history
    pub search_history: Vec<String>,
}

impl SessionSnapshot {
    /// Capture the registry's tabs and the search history.
    pub fn capture(registry: &TabRegistry, search_history: &[String]) -> Self {
        let tabs = registry
            .entries()
            .iter()
            .map(|entry| PersistedTab {
                file_path: entry.file_path.clone(),
                content: registry
                    .buffer(entry.buffer)
                    .map(|b| b.text().to_string())
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            tabs,
            current_tab: registry.active_index(),
            search_history: search_history.to_vec(),
        }
    }

    /// Rebuild a registry from the snapshot.
    ///
    /// Buffer content is seeded verbatim and the active index is clamped
    /// into range. An empty snapshot yields a registry with one fresh
    /// untitled tab; startup never sees an empty registry.
    pub fn restore(self) -> (TabRegistry, Vec<String>) {
        let mut registry = TabRegistry::new();
        for tab in self.tabs {
            registry.create_tab(tab.content, tab.file_path);
        }
        if registry.is_empty() {
            registry.create_tab(String::new(), None);
        }
        registry.set_active_index(self.current_tab.min(registry.len() - 1));

        info!(
            "Restored {} tab(s), active tab index: {}",
            registry.len(),
            registry.active_index()
        );
        (registry, self.search_history)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Wire Format
    // ─────────────────────────────────────────────────────────────────────────

    /// Serialize into the flat key-value document.
    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("tabCount".to_string(), Value::from(self.tabs.len()));
        for (i, tab) in self.tabs.iter().enumerate() {
            let path = tab
                .file_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            map.insert(format!("tab{}_filePath", i), Value::from(path));
            map.insert(format!("tab{}_content", i), Value::from(tab.content.clone()));
        }
        map.insert("currentTab".to_string(), Value::from(self.current_tab));
        map.insert(
            "searchHistory".to_string(),
            Value::from(self.search_history.clone()),
        );
        Value::Object(map)
    }

    /// Parse the flat key-value document.
    fn from_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| Error::SessionCorrupt {
            message: "snapshot is not a key-value object".to_string(),
        })?;

        let tab_count = map
            .get("tabCount")
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::SessionCorrupt {
                message: "missing or invalid tabCount".to_string(),
            })? as usize;

        let mut tabs = Vec::with_capacity(tab_count);
        for i in 0..tab_count {
            let path = map
                .get(&format!("tab{}_filePath", i))
                .and_then(Value::as_str)
                .ok_or_else(|| Error::SessionCorrupt {
                    message: format!("missing tab{}_filePath", i),
                })?;
            let content = map
                .get(&format!("tab{}_content", i))
                .and_then(Value::as_str)
                .ok_or_else(|| Error::SessionCorrupt {
                    message: format!("missing tab{}_content", i),
                })?;
            tabs.push(PersistedTab {
                file_path: if path.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(path))
                },
                content: content.to_string(),
            });
        }

        let current_tab = map
            .get("currentTab")
            .and_then(Value::as_u64)
            .ok_or_else(|| Error::SessionCorrupt {
                message: "missing or invalid currentTab".to_string(),
            })? as usize;

        let search_history = map
            .get("searchHistory")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            tabs,
            current_tab,
            search_history,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Load / Save
// ─────────────────────────────────────────────────────────────────────────────

/// Write a snapshot to `path`, overwriting any prior one.
///
/// Uses the write-then-rename pattern so a crash mid-write never leaves
/// a truncated session file behind.
pub fn save_session_to(snapshot: &SessionSnapshot, path: &PathBuf) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            debug!("Creating session directory: {}", dir.display());
            fs::create_dir_all(dir).map_err(|e| Error::Unwritable {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
    }

    let json = serde_json::to_string_pretty(&snapshot.to_value())?;
    let backup = path.with_file_name(SESSION_BACKUP_NAME);

    fs::write(&backup, json).map_err(|e| Error::Unwritable {
        path: backup.clone(),
        source: e,
    })?;
    fs::rename(&backup, path).map_err(|e| Error::Unwritable {
        path: path.clone(),
        source: e,
    })?;

    info!("Session saved to {}", path.display());
    Ok(())
}

/// Write a snapshot to the default session file location.
pub fn save_session(snapshot: &SessionSnapshot) -> Result<()> {
    save_session_to(snapshot, &get_session_file_path()?)
}

/// Read a snapshot from `path`.
///
/// A missing or empty file is not an error; it yields an empty snapshot.
/// Malformed content fails with [`Error::SessionCorrupt`].
pub fn load_session_from(path: &PathBuf) -> Result<SessionSnapshot> {
    if !path.exists() {
        debug!("No session file at {}, starting fresh", path.display());
        return Ok(SessionSnapshot::default());
    }

    let contents = fs::read_to_string(path).map_err(|e| Error::Unreadable {
        path: path.clone(),
        source: e,
    })?;

    if contents.trim().is_empty() {
        debug!("Session file is empty, starting fresh");
        return Ok(SessionSnapshot::default());
    }

    let value: Value = serde_json::from_str(&contents)?;
    let snapshot = SessionSnapshot::from_value(&value)?;
    info!(
        "Session loaded from {} ({} tab(s))",
        path.display(),
        snapshot.tabs.len()
    );
    Ok(snapshot)
}

/// Restore the previous session, falling back to a single fresh tab.
///
/// Never fails: an unreadable or corrupt snapshot is logged and replaced
/// with the default empty snapshot before restoring.
pub fn restore_session() -> (TabRegistry, Vec<String>) {
    let snapshot = get_session_file_path()
        .and_then(|path| load_session_from(&path))
        .unwrap_or_warn_default(SessionSnapshot::default(), "Failed to load session");
    snapshot.restore()
}

/// Snapshot the registry and persist it, best effort.
///
/// Failure is logged but never interrupts shutdown.
pub fn persist_session(registry: &TabRegistry, search_history: &[String]) -> bool {
    let snapshot = SessionSnapshot::capture(registry, search_history);
    match save_session(&snapshot) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save session: {}", e);
            false
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
