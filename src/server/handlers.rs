use super::{ApiError, AppState};
use crate::orchestration::{ingest_document, ChatRequest, WorkflowOptions};
use crate::shared::{FileId, KnowledgeId};
use crate::tools::ToolError;
use axum::extract::multipart::Multipart;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

pub const CHAT_INITIATED: &str = "chat process initiated";

#[derive(Debug, Clone, Deserialize)]
pub struct ChatBody {
    pub prompt: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub knowledge_id: Option<String>,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub chat_id: String,
    pub assistant_message_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    #[serde(rename = "fileID")]
    pub file_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VehicleLookupBody {
    pub registration_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VehicleLookupResponse {
    pub owner_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessImageBody {
    pub image_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessImageResponse {
    pub registration_id: String,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    state.log.info("server.request", "POST /api/v1/chat");

    if body.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("prompt must be non-empty"));
    }
    let knowledge_id = optional_id(body.knowledge_id.as_deref(), KnowledgeId::parse)?;
    let document_id = optional_id(body.document_id.as_deref(), FileId::parse)?;
    let options = WorkflowOptions {
        await_completion: body.wait,
        ..WorkflowOptions::default()
    };

    let mut request = ChatRequest::new(body.prompt);
    request.content = body.content;
    request.knowledge_id = knowledge_id;
    request.document_id = document_id;
    let engine = state.engine.clone();
    let report = tokio::task::spawn_blocking(move || engine.run(&request, options)).await??;

    Ok(Json(ChatResponse {
        chat_id: report.chat_id,
        assistant_message_id: report.assistant_message_id,
        status: CHAT_INITIATED.to_string(),
        content: report.content,
    }))
}

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    state.log.info("server.request", "POST /api/v1/files");
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut knowledge_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(err.body_text()))?
    {
        match field.name() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "document".to_string());
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::bad_request(err.body_text()))?;
                file = Some((filename, content_type, bytes.to_vec()));
            }
            Some("knowledgeID") => {
                knowledge_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| ApiError::bad_request(err.body_text()))?,
                );
            }
            _ => {}
        }
    }

    let (filename, content_type, bytes) =
        file.ok_or_else(|| ApiError::bad_request("multipart field `file` is required"))?;
    let knowledge_id = optional_id(knowledge_id.as_deref(), KnowledgeId::parse)?
        .ok_or_else(|| ApiError::bad_request("multipart field `knowledgeID` is required"))?;

    let engine = state.engine.clone();
    let file_id = tokio::task::spawn_blocking(move || {
        ingest_document(
            engine.client(),
            &knowledge_id,
            &filename,
            content_type.as_deref(),
            &bytes,
        )
    })
    .await??;
    Ok(Json(UploadResponse {
        file_id: file_id.to_string(),
    }))
}

pub async fn vehicle_lookup(
    State(state): State<AppState>,
    payload: Result<Json<VehicleLookupBody>, JsonRejection>,
) -> Result<Json<VehicleLookupResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    state.log.info("server.request", "POST /api/v1/vehicle-lookup");
    let registry = state.registry.clone().ok_or_else(|| {
        ApiError::from(ToolError::NotConfigured {
            tool: "vehicle registry",
            setting: crate::config::ENV_REGISTRY_URL,
        })
    })?;
    let owner_id =
        tokio::task::spawn_blocking(move || registry.owner_id(&body.registration_id)).await??;
    Ok(Json(VehicleLookupResponse { owner_id }))
}

pub async fn process_image(
    State(state): State<AppState>,
    payload: Result<Json<ProcessImageBody>, JsonRejection>,
) -> Result<Json<ProcessImageResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    state
        .log
        .info("server.request", "POST /api/v1/process-base64-image");
    let reader = state.plate_reader.clone().ok_or_else(|| {
        ApiError::from(ToolError::NotConfigured {
            tool: "plate reader",
            setting: crate::config::ENV_PLATE_READER_URL,
        })
    })?;
    let registration_id =
        tokio::task::spawn_blocking(move || reader.registration_from_image(&body.image_base64))
            .await??;
    Ok(Json(ProcessImageResponse { registration_id }))
}

/// Blank values count as absent.
fn optional_id<T>(
    raw: Option<&str>,
    parse: fn(&str) -> Result<T, String>,
) -> Result<Option<T>, ApiError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse(value).map(Some).map_err(ApiError::bad_request),
        None => Ok(None),
    }
}
