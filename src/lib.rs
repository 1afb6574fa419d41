//! Quillpad session core
//!
//! The state machinery behind a multi-document text editor: a tab
//! registry associating document buffers with backing files, a stateful
//! resumable find/replace engine, a deadline-based auto-save scheduler,
//! and wholesale session snapshot/restore across process restarts.
//!
//! Everything here is single-threaded and event-driven: operations run
//! to completion on the one control thread in response to discrete
//! triggers (commands, timer ticks), so no locking is needed.

pub mod autosave;
pub mod buffer;
pub mod error;
pub mod find_replace;
pub mod session;
pub mod stats;
pub mod tabs;

pub use autosave::{AutoSaveScheduler, AutoSaveState};
pub use buffer::{BufferArena, BufferId, CharFormat, DocumentBuffer, FormatRun};
pub use error::{Error, Result};
pub use find_replace::{
    replace_all, run_interactive, Answer, InteractivePrompt, SearchEngine, SearchOutcome,
    SearchSession, SearchState,
};
pub use session::{restore_session, persist_session, PersistedTab, SessionSnapshot};
pub use stats::TextStats;
pub use tabs::{TabEntry, TabRegistry};
