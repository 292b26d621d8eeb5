//! Default executor backend: a SQLite `jobs` table that external workers poll.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::db::Db;
use crate::error::Result;
use crate::jobs::executor::{ExecutorCall, JobExecutor, JobHandle, JobStatus};

pub const STATUS_PENDING: &str = "PENDING";

pub struct SqliteJobQueue {
    db: Db,
}

impl SqliteJobQueue {
    /// The database must already be migrated.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Number of jobs still waiting for a worker
    pub async fn pending_count(&self) -> Result<i64> {
        self.db
            .with_connection(|conn| {
                let count = conn.query_row(
                    "SELECT COUNT(*) FROM jobs WHERE status = ?1",
                    params![STATUS_PENDING],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await
    }
}

#[async_trait]
impl JobExecutor for SqliteJobQueue {
    async fn submit(&self, task: &str, call: ExecutorCall) -> Result<JobHandle> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let args_json = serde_json::to_string(&call.args)?;
        let kwargs_json = serde_json::to_string(&call.kwargs)?;
        let task = task.to_string();
        let job_id = id.clone();

        self.db
            .with_connection(move |conn| {
                conn.execute(
                    "INSERT INTO jobs (id, task, args_json, kwargs_json, status, submitted_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                    params![job_id, task, args_json, kwargs_json, STATUS_PENDING, now],
                )?;
                Ok(())
            })
            .await?;

        log::debug!("Enqueued job {}", id);
        Ok(JobHandle { id })
    }

    async fn status(&self, id: &str) -> Result<Option<JobStatus>> {
        let id = id.to_string();
        self.db
            .with_connection(move |conn| {
                let status = conn
                    .query_row(
                        "SELECT id, task, status, submitted_at, updated_at FROM jobs WHERE id = ?1",
                        params![id],
                        |row| {
                            Ok(JobStatus {
                                id: row.get(0)?,
                                task: row.get(1)?,
                                status: row.get(2)?,
                                submitted_at: row.get(3)?,
                                updated_at: row.get(4)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(status)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate;
    use crate::jobs::executor::ExecutorKwargs;
    use serde_json::json;
    use tempfile::TempDir;

    async fn migrated_queue(temp: &TempDir) -> SqliteJobQueue {
        let db = Db::new(temp.path().join("queue.db"));
        db.with_connection(|conn| migrate::run_migrations(conn)).await.unwrap();
        SqliteJobQueue::new(db)
    }

    #[tokio::test]
    async fn test_submit_then_status() {
        let temp = TempDir::new().unwrap();
        let queue = migrated_queue(&temp).await;

        let call = ExecutorCall {
            args: (75.0, true, false, "2026-10-19T12:00:00.000000".to_string()),
            kwargs: ExecutorKwargs::Network(json!({"nodes": ["a", "b"]})),
        };
        let handle = queue.submit("netgate.construct_network", call).await.unwrap();
        assert!(Uuid::parse_str(&handle.id).is_ok());

        let status = queue.status(&handle.id).await.unwrap().unwrap();
        assert_eq!(status.id, handle.id);
        assert_eq!(status.task, "netgate.construct_network");
        assert_eq!(status.status, STATUS_PENDING);
        assert_eq!(queue.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stored_call_shape() {
        let temp = TempDir::new().unwrap();
        let queue = migrated_queue(&temp).await;

        let call = ExecutorCall {
            args: (50.0, false, true, "ts".to_string()),
            kwargs: ExecutorKwargs::Filepath("/srv/alice/net.json".to_string()),
        };
        let handle = queue.submit("netgate.construct_network_for_provider", call).await.unwrap();

        let id = handle.id.clone();
        let (args, kwargs): (String, String) = queue
            .db
            .with_connection(move |conn| {
                Ok(conn.query_row(
                    "SELECT args_json, kwargs_json FROM jobs WHERE id = ?1",
                    params![id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?)
            })
            .await
            .unwrap();

        let args: serde_json::Value = serde_json::from_str(&args).unwrap();
        let kwargs: serde_json::Value = serde_json::from_str(&kwargs).unwrap();
        assert_eq!(args, json!([50.0, false, true, "ts"]));
        assert_eq!(kwargs, json!({"filepath": "/srv/alice/net.json"}));
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let temp = TempDir::new().unwrap();
        let queue = migrated_queue(&temp).await;
        assert!(queue.status("missing").await.unwrap().is_none());
    }
}
