// Asynchronous decision logging
//
// Fire-and-forget JSONL writes so the planning cycle never blocks on disk.
// The first record of a file is the episode header (map metadata); every
// tick after that appends the decision taken, together with the raw
// observation so the replay tool can re-run the episode.

use log::error;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::planner::Goal;
use crate::types::{Direction, MapInfo, Observation};

/// One line of the decision log
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogRecord {
    Header(HeaderRecord),
    Decision(DecisionRecord),
}

/// Episode metadata, written once when the log is opened
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HeaderRecord {
    pub agent: String,
    pub map: MapInfo,
    pub timestamp: String,
}

/// One tick's decision
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DecisionRecord {
    pub step: u64,
    pub observation: Observation,
    pub goal: Goal,
    pub action: Direction,
    pub plan_len: usize,
    pub elapsed_ms: u64,
    pub timestamp: String,
}

/// Shared decision logger
/// Uses Arc<Mutex<Option<File>>> so spawned write tasks share one handle
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new decision logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return DebugLogger {
                file: Arc::new(Mutex::new(None)),
                enabled: false,
            };
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Decision logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create decision log file '{}': {}", log_file_path, e);
                DebugLogger {
                    file: Arc::new(Mutex::new(None)),
                    enabled: false,
                }
            }
        }
    }

    /// Creates a disabled logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    /// Writes the episode header asynchronously
    pub fn log_header(&self, agent: &str, map: &MapInfo) {
        self.log_record(LogRecord::Header(HeaderRecord {
            agent: agent.to_string(),
            map: map.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }));
    }

    /// Logs one tick's decision asynchronously (fire-and-forget)
    pub fn log_decision(&self, record: DecisionRecord) {
        self.log_record(LogRecord::Decision(record));
    }

    fn log_record(&self, record: LogRecord) {
        if !self.enabled {
            return;
        }

        let file_handle = self.file.clone();

        // Spawn fire-and-forget task
        tokio::spawn(async move {
            Self::write_record(file_handle, record).await;
        });
    }

    async fn write_record(file_handle: Arc<Mutex<Option<File>>>, record: LogRecord) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&record) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write decision log record: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush decision log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize decision log record: {}", e);
                }
            }
        }
    }
}
