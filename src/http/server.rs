use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, HttpServerConfig};
use crate::error::{GatewayError, Result};
use crate::gateway::{AcceptedResponse, Gateway};
use crate::http::extract::{Caller, RequestId, SubmissionInput};
use crate::jobs::JobStatus;

/// HTTP front end for the gateway
pub struct HttpGateway {
    state: AppState,
    config: Config,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub api_key: String,
    pub allowed_origins: Vec<String>,
    pub authless: bool,
    pub storage_root: PathBuf,
}

impl HttpGateway {
    pub fn new(config: Config, gateway: Gateway) -> Result<Self> {
        // API key is optional if authless mode is enabled
        let api_key = if config.http_server.authless {
            log::warn!("Authless mode enabled: every request is accepted");
            String::new()
        } else {
            std::env::var(&config.http_server.api_key_env).map_err(|_| {
                GatewayError::Config(format!(
                    "Environment variable {} not set. Set it in your .env file or as an environment variable, or enable authless mode.",
                    config.http_server.api_key_env
                ))
            })?
        };

        let state = AppState {
            gateway: Arc::new(gateway),
            api_key,
            allowed_origins: config.http_server.allowed_origins.clone(),
            authless: config.http_server.authless,
            storage_root: config.storage_root().to_path_buf(),
        };

        Ok(Self { state, config })
    }

    /// Run the HTTP server
    pub async fn run(&self) -> Result<()> {
        let app = self.router();
        let addr = self.config.bind_address();

        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            let message = if e.kind() == std::io::ErrorKind::AddrInUse {
                format!(
                    "Address {} is already in use. Stop the other process or set http_server.port in config.toml",
                    addr
                )
            } else {
                format!("Failed to bind to {}: {}", addr, e)
            };
            GatewayError::Io(std::io::Error::new(e.kind(), message))
        })?;

        log::info!("Starting network gateway on http://{}", addr);
        log::info!("Submit endpoint: http://{}/v1.0/networks/{{standard|provider}}", addr);

        axum::serve(listener, app).await.map_err(|e| {
            GatewayError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP server error: {}", e),
            ))
        })?;

        Ok(())
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone(), &self.config.http_server)
    }
}

fn create_router(state: AppState, http: &HttpServerConfig) -> Router {
    // Restrict CORS to the configured origins so preflight matches enforcement.
    let cors = if http.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = http
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(Any)
    };

    Router::new()
        .route("/v1.0/networks/:kind", post(handle_submit))
        .route("/v1.0/operations/:id", get(handle_operation))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(http.max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// POST /v1.0/networks/{kind}
async fn handle_submit(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Caller(caller): Caller,
    RequestId(request_id): RequestId,
    SubmissionInput(input): SubmissionInput,
) -> std::result::Result<AcceptedResponse, GatewayError> {
    log::info!(
        "[{}] POST /v1.0/networks/{} from {}",
        request_id,
        kind,
        caller.user_id()
    );
    state.gateway.submit(&kind, input, &caller, &request_id).await
}

/// GET /v1.0/operations/{id}
async fn handle_operation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Caller(_caller): Caller,
) -> std::result::Result<Json<JobStatus>, GatewayError> {
    state.gateway.operation(&id).await.map(Json)
}

async fn handle_health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "netgate",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
        .into_response()
}
