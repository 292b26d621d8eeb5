//! Gateway resource and the collaborators it reports to.

pub mod events;
pub mod resource;
pub mod response;

pub use events::{AuditEventSink, EventSink, LogEventSink};
pub use resource::{Gateway, Stage};
pub use response::{build_accepted, AcceptedResponse, OPERATIONS_PREFIX, OPERATION_LOCATION_HEADER};

use std::sync::Arc;

use crate::config::Config;
use crate::db::{migrate, Db};
use crate::error::Result;
use crate::jobs::build_executor;

/// Migrate the database and assemble a gateway for the configured backend.
pub async fn build_gateway(config: &Config) -> Result<Gateway> {
    if let Some(parent) = config.db_path().parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let db = Db::new(config.db_path());
    db.with_connection(|conn| migrate::run_migrations(conn)).await?;
    log::info!("Database ready at {}", config.db_path().display());

    let executor = build_executor(config, db.clone())?;
    let events = Arc::new(AuditEventSink::new(db));
    Ok(Gateway::new(executor, events))
}
