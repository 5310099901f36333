use crate::shared::{FileId, KnowledgeId};
use crate::webui::{AddFileRequest, TransportError, WebUiClient};
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("failed to read document {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to upload file: {0}")]
    Upload(#[source] TransportError),
    #[error("failed to extract file id from upload response: {0}")]
    InvalidFileId(String),
    #[error("failed to add file `{file_id}` to knowledge collection `{knowledge_id}`: {source}")]
    AddToCollection {
        file_id: String,
        knowledge_id: String,
        #[source]
        source: TransportError,
    },
}

/// Uploads `bytes` as `filename` and adds the stored file to `knowledge_id`.
pub fn ingest_document(
    client: &WebUiClient,
    knowledge_id: &KnowledgeId,
    filename: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<FileId, KnowledgeError> {
    let uploaded = client
        .upload_file(filename, content_type, bytes)
        .map_err(KnowledgeError::Upload)?;
    let raw_id = uploaded
        .non_empty_id()
        .ok_or_else(|| KnowledgeError::InvalidFileId("response has no `id`".to_string()))?;
    let file_id = FileId::parse(raw_id).map_err(KnowledgeError::InvalidFileId)?;

    let path = format!("api/v1/knowledge/{knowledge_id}/file/add");
    client
        .post_json_discard(
            &path,
            &AddFileRequest {
                file_id: file_id.to_string(),
            },
        )
        .map_err(|source| KnowledgeError::AddToCollection {
            file_id: file_id.to_string(),
            knowledge_id: knowledge_id.to_string(),
            source,
        })?;
    Ok(file_id)
}

/// Ingests caller-supplied text as a uniquely named markdown document.
pub fn ingest_content(
    client: &WebUiClient,
    knowledge_id: &KnowledgeId,
    content: &str,
) -> Result<FileId, KnowledgeError> {
    let filename = format!("chat-content-{}.md", uuid::Uuid::new_v4());
    ingest_document(
        client,
        knowledge_id,
        &filename,
        Some("text/markdown"),
        content.as_bytes(),
    )
}

pub fn ingest_path(
    client: &WebUiClient,
    knowledge_id: &KnowledgeId,
    path: &Path,
) -> Result<FileId, KnowledgeError> {
    let read_error = |source: std::io::Error| KnowledgeError::Read {
        path: path.display().to_string(),
        source,
    };
    let bytes = {
        let mut file = File::open(path).map_err(read_error)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(read_error)?;
        bytes
    };
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document");
    ingest_document(client, knowledge_id, filename, None, &bytes)
}
