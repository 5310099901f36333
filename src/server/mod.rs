//! HTTP front door: thin JSON routes over the workflow engine and tool clients.
//!
//! Handlers hand every blocking backend call to `spawn_blocking`, so one slow
//! run never stalls the runtime's worker threads.

pub mod error;
pub mod handlers;

pub use error::{ApiError, ServerError};
pub use handlers::{
    ChatBody, ChatResponse, ProcessImageResponse, UploadResponse, VehicleLookupResponse,
    CHAT_INITIATED,
};

use crate::config::Settings;
use crate::orchestration::ChatWorkflowEngine;
use crate::shared::EventLog;
use crate::tools::{PlateReaderClient, VehicleRegistryClient};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatWorkflowEngine>,
    /// `None` when no registry base URL is configured.
    pub registry: Option<Arc<VehicleRegistryClient>>,
    pub plate_reader: Option<Arc<PlateReaderClient>>,
    pub log: EventLog,
}

impl AppState {
    pub fn new(engine: ChatWorkflowEngine, log: EventLog) -> Self {
        Self {
            engine: Arc::new(engine),
            registry: None,
            plate_reader: None,
            log,
        }
    }

    pub fn with_registry(mut self, registry: VehicleRegistryClient) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    pub fn with_plate_reader(mut self, plate_reader: PlateReaderClient) -> Self {
        self.plate_reader = Some(Arc::new(plate_reader));
        self
    }

    pub fn from_settings(settings: &Settings, log: EventLog) -> Self {
        let mut state = Self::new(
            ChatWorkflowEngine::from_settings(settings, log.clone()),
            log.clone(),
        );
        if let Ok(registry) = VehicleRegistryClient::from_settings(settings, log.clone()) {
            state = state.with_registry(registry);
        }
        if let Ok(reader) = PlateReaderClient::from_settings(settings, log) {
            state = state.with_plate_reader(reader);
        }
        state
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/chat", post(handlers::chat))
        .route("/api/v1/files", post(handlers::upload))
        .route("/api/v1/vehicle-lookup", post(handlers::vehicle_lookup))
        .route("/api/v1/process-base64-image", post(handlers::process_image))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

pub async fn serve(state: AppState, bind: &str) -> Result<(), ServerError> {
    let log = state.log.clone();
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: bind.to_string(),
            source,
        })?;
    log.info("server.start", &format!("listening on {bind}"));
    axum::serve(listener, router(state))
        .await
        .map_err(ServerError::Serve)
}
