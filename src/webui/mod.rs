pub mod client;
pub mod error;
pub mod types;

pub use client::{WebUiClient, DEFAULT_REQUEST_TIMEOUT, FILE_UPLOAD_PATH};
pub use error::TransportError;
pub use types::{
    AddFileRequest, BackgroundTasks, Chat, ChatEnvelope, CompletedRequest, CompletionRequest,
    CreatedResource, EnvironmentVariables, Features, FileReference, FileReferenceKind, History,
    Message, ROLE_ASSISTANT, ROLE_USER,
};
