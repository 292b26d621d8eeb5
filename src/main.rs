use anyhow::Result;
use netgate::db::{migrate, Db};
use netgate::http::HttpGateway;
use netgate::{build_gateway, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("serve");

    let config = Config::load()?;

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.gateway.log_level.as_str()),
    )
    .init();

    match command {
        "serve" => run_http_server(config).await?,
        "verify" => run_schema_verification(config).await?,
        other => anyhow::bail!("Unknown command '{}'. Use 'serve' or 'verify'.", other),
    }

    Ok(())
}

/// Run the HTTP gateway
async fn run_http_server(config: Config) -> Result<()> {
    log::info!("Starting netgate v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Storage root: {}", config.storage_root().display());
    log::info!("Executor backend: {:?}", config.executor.backend);

    let gateway = build_gateway(&config).await?;
    let server = HttpGateway::new(config, gateway)?;
    server.run().await?;

    Ok(())
}

/// Migrate the database and check that every expected table exists
async fn run_schema_verification(config: Config) -> Result<()> {
    log::info!("Database path: {}", config.db_path().display());

    // Creates the parent directory and applies pending migrations.
    build_gateway(&config).await?;

    let db = Db::new(config.db_path());
    let (missing, applied) = db
        .with_connection(|conn| {
            let missing = migrate::missing_tables(conn)?;
            let applied = migrate::get_applied_migrations(conn)?;
            Ok((missing, applied))
        })
        .await?;

    for table in &missing {
        log::error!("Missing table: {}", table);
    }
    if !missing.is_empty() {
        anyhow::bail!("Not all required tables exist");
    }

    log::info!("✓ {} migrations applied: {}", applied.len(), applied.join(", "));
    log::info!("Schema verification passed");
    Ok(())
}
