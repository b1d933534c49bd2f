//! Session state for a run of UI interactions.
//!
//! This module provides the [`Session`] type, which records every action an
//! [`InteractionExecutor`](crate::executor::InteractionExecutor) performs
//! and broadcasts it to subscribers.
//!
//! # Architecture
//!
//! - Performed actions are logged to the session with their outcome
//! - Subscribers receive [`SessionEvent`]s via a broadcast channel
//! - The action log is maintained as a ring buffer to limit memory usage
//! - Actions can be persisted to JSON Lines files, by default in
//!   `~/.tapwright/logs/`
//!
//! # Example
//!
//! ```no_run
//! use tapwright_core::session::Session;
//! use tapwright_core::action::ActionResult;
//!
//! #[tokio::main]
//! async fn main() {
//!     let session = Session::new("checkout-flow");
//!
//!     let mut rx = session.subscribe();
//!
//!     session.log_action("single click", "Button{id=pay}", ActionResult::Success, Some(180)).await;
//! }
//! ```

use std::collections::VecDeque;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::warn;
use uuid::Uuid;

use crate::action::{ActionLog, ActionResult};
use crate::config::tapwright_dir;

/// Maximum number of action log entries to retain in the ring buffer.
const MAX_ACTION_LOG_SIZE: usize = 1000;

/// Returns the default logs directory path (`~/.tapwright/logs/`).
pub fn logs_dir() -> PathBuf {
    tapwright_dir().join("logs")
}

/// Events broadcast to subscribers when session state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A new action was logged to the session.
    ActionLogged(ActionLog),

    /// The session has started.
    Started {
        /// The unique identifier for this session.
        session_id: Uuid,
    },

    /// The session has ended.
    Ended,
}

/// Shared state for a run of UI interactions.
///
/// The session maintains:
/// - A unique identifier and creation timestamp
/// - A ring buffer of recent actions (up to 1000 entries)
/// - A broadcast channel for notifying subscribers
/// - An optional JSON Lines log file
///
/// Sessions are created via [`Session::new`] or [`Session::with_log_dir`],
/// which return an `Arc<Session>` for sharing across async tasks.
pub struct Session {
    /// The unique identifier for this session.
    pub id: Uuid,

    /// Name given at creation; prefixes the log file name.
    pub name: String,

    /// When this session was created.
    pub created_at: DateTime<Utc>,

    action_log: RwLock<VecDeque<ActionLog>>,

    event_tx: broadcast::Sender<SessionEvent>,

    log_writer: Mutex<Option<BufWriter<std::fs::File>>>,
}

impl Session {
    /// Creates a session logging to `~/.tapwright/logs/{name}_{timestamp}.jsonl`.
    pub fn new(session_name: &str) -> Arc<Self> {
        Self::with_log_dir(session_name, Some(logs_dir().as_path()))
    }

    /// Creates a session logging into `log_dir`, or only in memory when
    /// `log_dir` is `None`.
    ///
    /// A log file that cannot be created is reported and skipped; the
    /// session still works in memory.
    pub fn with_log_dir(session_name: &str, log_dir: Option<&Path>) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(100);
        let created_at = Utc::now();

        let log_writer = log_dir.and_then(|dir| {
            let timestamp = created_at.format("%Y%m%d_%H%M%S");
            let log_path = dir.join(format!("{}_{}.jsonl", session_name, timestamp));
            let file = std::fs::create_dir_all(dir).and_then(|_| std::fs::File::create(&log_path));
            match file {
                Ok(file) => Some(BufWriter::new(file)),
                Err(e) => {
                    warn!(path = %log_path.display(), error = %e, "cannot create session log file");
                    None
                }
            }
        });

        let session = Arc::new(Self {
            id: Uuid::new_v4(),
            name: session_name.to_string(),
            created_at,
            action_log: RwLock::new(VecDeque::with_capacity(MAX_ACTION_LOG_SIZE)),
            event_tx,
            log_writer: Mutex::new(log_writer),
        });
        let _ = session.event_tx.send(SessionEvent::Started {
            session_id: session.id,
        });
        session
    }

    /// Subscribes to session events.
    ///
    /// Note that broadcast receivers may miss events if they lag too far
    /// behind.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Logs an action and broadcasts it to subscribers.
    ///
    /// When the ring buffer is full the oldest entry is dropped. The entry
    /// is also appended to the log file, if the session has one.
    pub async fn log_action(
        &self,
        action: impl Into<String>,
        view: impl Into<String>,
        result: ActionResult,
        duration_ms: Option<u64>,
    ) -> ActionLog {
        let log = ActionLog::new(action, view, result, duration_ms);

        {
            let mut action_log = self.action_log.write().await;
            if action_log.len() >= MAX_ACTION_LOG_SIZE {
                action_log.pop_front();
            }
            action_log.push_back(log.clone());
        }

        {
            let mut writer_guard = self.log_writer.lock().await;
            if let Some(ref mut writer) = *writer_guard {
                if let Ok(json) = serde_json::to_string(&log) {
                    let _ = writeln!(writer, "{}", json);
                    let _ = writer.flush();
                }
            }
        }

        // Ignore send errors; having no subscribers is expected.
        let _ = self.event_tx.send(SessionEvent::ActionLogged(log.clone()));

        log
    }

    /// Returns all retained action log entries in chronological order.
    pub async fn get_action_log(&self) -> Vec<ActionLog> {
        self.action_log.read().await.iter().cloned().collect()
    }

    /// Broadcasts [`SessionEvent::Ended`] and flushes the log file.
    pub async fn end(&self) {
        if let Some(writer) = self.log_writer.lock().await.as_mut() {
            let _ = writer.flush();
        }
        let _ = self.event_tx.send(SessionEvent::Ended);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("created_at", &self.created_at)
            .field("action_log", &"<RwLock<VecDeque<ActionLog>>>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("log_writer", &"<Mutex<Option<BufWriter<File>>>>")
            .finish()
    }
}
