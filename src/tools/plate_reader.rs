use super::{decode_response, join_url, ToolError};
use crate::config::{Settings, ENV_PLATE_READER_URL};
use crate::shared::EventLog;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TOOL: &str = "plate reader";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessImageRequest {
    pub image_base64: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlateReading {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub size_bytes: u64,
    #[serde(default)]
    pub inferred_mime_type: String,
    #[serde(default)]
    pub alpr_results: Vec<AlprResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AlprResult {
    #[serde(default)]
    pub detection: Detection,
    #[serde(default)]
    pub ocr: Ocr,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Detection {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub bounding_box: BoundingBox,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Ocr {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
}

impl PlateReading {
    /// The first result is taken as the best one.
    pub fn registration(&self) -> Result<String, ToolError> {
        let first = self.alpr_results.first().ok_or(ToolError::NoPlateResults)?;
        let text = first.ocr.text.trim();
        if text.is_empty() {
            return Err(ToolError::EmptyPlateText);
        }
        Ok(text.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct PlateReaderClient {
    base_url: String,
    agent: ureq::Agent,
    log: EventLog,
}

impl PlateReaderClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, log: EventLog) -> Self {
        Self {
            base_url: base_url.into(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            log,
        }
    }

    pub fn from_settings(settings: &Settings, log: EventLog) -> Result<Self, ToolError> {
        let reader = &settings.plate_reader;
        let base_url = reader.configured_base_url().ok_or(ToolError::NotConfigured {
            tool: TOOL,
            setting: ENV_PLATE_READER_URL,
        })?;
        Ok(Self::new(base_url, reader.timeout(), log))
    }

    pub fn read_plate(&self, image_base64: &str) -> Result<PlateReading, ToolError> {
        let image_base64 = image_base64.trim();
        if image_base64.is_empty() {
            return Err(ToolError::EmptyInput { tool: TOOL });
        }
        let url = join_url(&self.base_url, "process-base64-image/");
        let body = serde_json::to_value(ProcessImageRequest {
            image_base64: image_base64.to_string(),
        })
        .map_err(|err| ToolError::Request {
            tool: TOOL,
            url: url.clone(),
            reason: err.to_string(),
        })?;
        let outcome = self.agent.post(&url).send_json(body);
        decode_response(TOOL, "POST", &url, outcome, &self.log)
    }

    pub fn registration_from_image(&self, image_base64: &str) -> Result<String, ToolError> {
        self.read_plate(image_base64)?.registration()
    }
}
