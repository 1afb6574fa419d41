//! Quillpad - Main Entry Point
//!
//! A line-oriented shell around the session core. Every command and
//! every auto-save tick is one serialized event on this thread: the loop
//! polls the scheduler between commands, so a timer tick never
//! interleaves with a user-invoked save of the same tab.

use log::{info, warn};
use quillpad::autosave::{AutoSaveScheduler, AutoSaveState};
use quillpad::error::Error;
use quillpad::find_replace::{replace_all, run_interactive, Answer, InteractivePrompt, SearchEngine};
use quillpad::session;
use quillpad::stats::TextStats;
use quillpad::tabs::TabRegistry;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

/// Application name constant.
const APP_NAME: &str = "Quillpad";

/// Console implementation of the interactive prompt collaborator.
struct ConsolePrompt;

impl InteractivePrompt for ConsolePrompt {
    fn confirm(&mut self, question: &str) -> Answer {
        loop {
            print!("{} [y/n/c] ", question);
            let _ = io::stdout().flush();
            let mut line = String::new();
            if io::stdin().read_line(&mut line).is_err() {
                return Answer::Cancel;
            }
            match line.trim().to_lowercase().as_str() {
                "y" | "yes" => return Answer::Yes,
                "n" | "no" => return Answer::No,
                "c" | "cancel" | "" => return Answer::Cancel,
                _ => println!("Please answer y, n, or c."),
            }
        }
    }

    fn inform(&mut self, message: &str) {
        println!("{}", message);
    }
}

fn print_help() {
    println!("Commands:");
    println!("  new                    open a new untitled tab");
    println!("  open <path>            open a file in a new tab");
    println!("  save                   save the active tab to its file");
    println!("  saveas <path>          save the active tab to a new file");
    println!("  tabs                   list open tabs");
    println!("  switch <n>             activate tab n");
    println!("  close                  close the active tab");
    println!("  insert <text>          append a line to the active tab");
    println!("  show                   print the active tab's content");
    println!("  stats                  word/character/line counts");
    println!("  find <text>            interactive find");
    println!("  replace <from> <to>    replace all occurrences");
    println!("  autosave               toggle auto-save");
    println!("  interval <minutes>     set the auto-save interval (1-60)");
    println!("  quit                   save the session and exit");
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {}", APP_NAME);

    // Restore the previous session (or a single fresh tab)
    let (mut registry, history) = session::restore_session();
    let mut engine = SearchEngine::with_history(history);
    let mut scheduler = AutoSaveScheduler::new();
    let mut prompt = ConsolePrompt;

    println!("{} - type 'help' for commands", APP_NAME);

    let stdin = io::stdin();
    loop {
        // Timer ticks are serialized with commands on this one thread
        if scheduler.poll(Instant::now()) {
            autosave_tick(&mut registry);
        }

        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break, // EOF
            Ok(_) => {}
        }

        let line = line.trim();
        let (command, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "help" => print_help(),
            "new" => {
                registry.create_tab(String::new(), None);
                println!("Opened new tab");
            }
            "open" => {
                if rest.is_empty() {
                    println!("Usage: open <path>");
                } else {
                    match registry.open_from_file(PathBuf::from(rest)) {
                        Ok(_) => println!("Opened {}", rest),
                        Err(e) => println!("{}", e),
                    }
                }
            }
            "save" => match registry.save_active(None) {
                Ok(()) => println!("Saved"),
                Err(Error::NoAssociatedFile) => {
                    println!("No file associated with this tab. Use 'saveas <path>'.")
                }
                Err(e) => println!("{}", e),
            },
            "saveas" => {
                if rest.is_empty() {
                    println!("Usage: saveas <path>");
                } else {
                    match registry.save_active(Some(PathBuf::from(rest))) {
                        Ok(()) => println!("Saved {}", rest),
                        Err(e) => println!("{}", e),
                    }
                }
            }
            "tabs" => {
                if registry.is_empty() {
                    println!("No open tabs");
                }
                for i in 0..registry.len() {
                    let marker = if i == registry.active_index() { "*" } else { " " };
                    if let Some(label) = registry.tab_label(i) {
                        println!("{} [{}] {}", marker, i, label);
                    }
                }
            }
            "switch" => match rest.parse::<usize>() {
                Ok(i) => registry.set_active_index(i),
                Err(_) => println!("Usage: switch <n>"),
            },
            "close" => {
                if let Some(id) = registry.active_tab() {
                    registry.close_tab(id);
                    println!("Closed tab");
                } else {
                    println!("No open tabs");
                }
            }
            "insert" => {
                if let Some(buffer) = registry.active_buffer_mut() {
                    let mut content = buffer.text().to_string();
                    content.push_str(rest);
                    content.push('\n');
                    buffer.set_content(content);
                } else {
                    println!("No open tabs");
                }
            }
            "show" => match registry.active_buffer() {
                Some(buffer) => print!("{}", buffer.text()),
                None => println!("No open tabs"),
            },
            "stats" => match registry.active_buffer() {
                Some(buffer) => println!("{}", TextStats::from_text(buffer.text()).status_line()),
                None => println!("No open tabs"),
            },
            "find" => {
                if rest.is_empty() {
                    println!("Usage: find <text>");
                } else if let Some(buffer) = registry.active_buffer() {
                    let case_sensitive = prompt.confirm("Match case?") == Answer::Yes;
                    let text = buffer.text().to_string();
                    run_interactive(&mut engine, &text, rest, case_sensitive, &mut prompt);
                } else {
                    println!("No open tabs");
                }
            }
            "replace" => {
                let mut parts = rest.splitn(2, ' ');
                let find_text = parts.next().unwrap_or("");
                let replace_text = parts.next().unwrap_or("");
                if find_text.is_empty() {
                    println!("Usage: replace <from> <to>");
                } else if let Some(buffer) = registry.active_buffer_mut() {
                    let count = replace_all(buffer, find_text, replace_text);
                    println!("Replaced {} occurrences of '{}'.", count, find_text);
                } else {
                    println!("No open tabs");
                }
            }
            "autosave" => match scheduler.toggle(Instant::now()) {
                AutoSaveState::Armed => println!(
                    "Auto-save enabled. Documents will be saved every {} minute(s).",
                    scheduler.interval_minutes()
                ),
                AutoSaveState::Disabled => println!("Auto-save disabled."),
            },
            "interval" => match rest.parse::<u64>() {
                Ok(minutes) => {
                    scheduler.set_interval(minutes, Instant::now());
                    println!(
                        "Auto-save interval set to {} minute(s).",
                        scheduler.interval_minutes()
                    );
                }
                Err(_) => println!("Usage: interval <minutes>"),
            },
            "quit" | "exit" => break,
            other => println!("Unknown command '{}'. Type 'help'.", other),
        }
    }

    // Snapshot the whole session on the way out, best effort
    session::persist_session(&registry, &engine.session.history);
    info!("Exiting {}", APP_NAME);
}

/// One auto-save tick: save the active tab if it has a backing file.
///
/// Failures are reported but leave the scheduler armed; a tab with no
/// associated file makes the tick a silent no-op (no prompt from a
/// background tick). Returns `false` when a save was attempted and
/// failed.
fn autosave_tick(registry: &mut TabRegistry) -> bool {
    let has_file = registry
        .active_entry()
        .map(|e| e.file_path.is_some())
        .unwrap_or(false);
    if !has_file {
        return true;
    }
    if let Err(e) = registry.save_active(None) {
        warn!("Auto-save failed: {}", e);
        println!("Auto-save failed: {}", e);
        return false;
    }
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
