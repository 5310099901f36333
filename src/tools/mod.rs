//! Single-call lookups the chat model's tools are backed by.

pub mod plate_reader;
pub mod registry;

pub use plate_reader::{PlateReaderClient, PlateReading, ProcessImageRequest};
pub use registry::{owner_id_for_registration, VehicleRecord, VehicleRegistryClient};

use crate::egress::{egress_refusal, EgressError};
use crate::shared::EventLog;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{tool} is not configured: set {setting}")]
    NotConfigured {
        tool: &'static str,
        setting: &'static str,
    },
    #[error("{tool} received empty input")]
    EmptyInput { tool: &'static str },
    #[error(transparent)]
    EgressBlocked(EgressError),
    #[error("failed to execute {tool} request to {url}: {reason}")]
    Request {
        tool: &'static str,
        url: String,
        reason: String,
    },
    #[error("{tool} call failed with status {status}: {body}")]
    Status {
        tool: &'static str,
        status: u16,
        body: String,
    },
    #[error("failed to decode {tool} response: {reason}")]
    Decode { tool: &'static str, reason: String },
    #[error("failed to map registration `{registration}` to an owner id")]
    UnmappedRegistration { registration: String },
    #[error("plate reader found no license plate results")]
    NoPlateResults,
    #[error("plate reader result was empty: no readable text")]
    EmptyPlateText,
}

impl ToolError {
    /// True when the caller's input, not the remote service, is at fault.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::EmptyInput { .. })
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Reads a tool response, classifying failures the same way for every tool.
pub(crate) fn decode_response<T: DeserializeOwned>(
    tool: &'static str,
    method: &str,
    url: &str,
    outcome: Result<ureq::Response, ureq::Error>,
    log: &EventLog,
) -> Result<T, ToolError> {
    let response = match outcome {
        Ok(response) => response,
        Err(ureq::Error::Status(status, response)) => {
            log.warn("tool.request", &format!("{tool} {method} {url} status={status}"));
            return Err(ToolError::Status {
                tool,
                status,
                body: response.into_string().unwrap_or_default(),
            });
        }
        Err(err) => {
            if let Some(refusal) = egress_refusal(&err) {
                return Err(ToolError::EgressBlocked(refusal));
            }
            log.error("tool.request", &format!("{tool} {method} {url} failed: {err}"));
            return Err(ToolError::Request {
                tool,
                url: url.to_string(),
                reason: err.to_string(),
            });
        }
    };
    log.info(
        "tool.request",
        &format!("{tool} {method} {url} status={}", response.status()),
    );
    let body = response.into_string().map_err(|err| ToolError::Decode {
        tool,
        reason: err.to_string(),
    })?;
    serde_json::from_str(&body).map_err(|err| ToolError::Decode {
        tool,
        reason: err.to_string(),
    })
}
