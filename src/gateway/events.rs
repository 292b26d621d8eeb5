//! Observability sink fired after a job is dispatched.

use chrono::Utc;
use rusqlite::params;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::db::Db;

/// Fire-and-forget event log. Implementations must never fail the caller.
pub trait EventSink: Send + Sync {
    fn log_event(&self, request_id: &str, message: &str, fields: Map<String, Value>);
}

/// Writes events to the `log` facade only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn log_event(&self, request_id: &str, message: &str, fields: Map<String, Value>) {
        log::info!("[{}] {} {}", request_id, message, Value::Object(fields));
    }
}

/// Logs the event and records it in the `operation_events` table.
///
/// The insert runs on a spawned blocking task; a failed insert is logged at
/// `warn` and dropped.
#[derive(Debug, Clone)]
pub struct AuditEventSink {
    db: Db,
}

impl AuditEventSink {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

impl EventSink for AuditEventSink {
    fn log_event(&self, request_id: &str, message: &str, fields: Map<String, Value>) {
        let fields = Value::Object(fields);
        log::info!("[{}] {} {}", request_id, message, fields);

        let event_id = Uuid::new_v4().to_string();
        let timestamp = Utc::now().to_rfc3339();
        let request_id = request_id.to_string();
        let message = message.to_string();
        let fields_json = fields.to_string();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::warn!("No async runtime; event {} not persisted", event_id);
            return;
        };

        let path = self.db.path().to_path_buf();
        runtime.spawn_blocking(move || {
            let result = Db::new(&path).open_connection().and_then(|conn| {
                conn.execute(
                    "INSERT INTO operation_events (event_id, request_id, timestamp, message, fields_json)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![event_id, request_id, timestamp, message, fields_json],
                )?;
                Ok(())
            });
            if let Err(e) = result {
                log::warn!("Failed to persist event {}: {}", event_id, e);
            }
        });
    }
}
