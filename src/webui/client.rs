use super::types::CreatedResource;
use super::TransportError;
use crate::config::Settings;
use crate::shared::EventLog;
use reqwest::blocking::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const FILE_UPLOAD_PATH: &str = "api/v1/files/";

/// Bearer-authenticated JSON client for the chat backend.
#[derive(Debug, Clone)]
pub struct WebUiClient {
    base_url: String,
    token: String,
    timeout: Duration,
    agent: ureq::Agent,
    log: EventLog,
}

impl WebUiClient {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
        log: EventLog,
    ) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout,
            agent,
            log,
        }
    }

    pub fn from_settings(settings: &Settings, log: EventLog) -> Self {
        Self::new(
            settings.backend.base_url.trim(),
            settings.backend.token.trim(),
            settings.backend.request_timeout(),
            log,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let url = self.endpoint(path);
        let outcome = self.authorized(self.agent.get(&url)).call();
        let body = self.complete("GET", &url, outcome)?;
        decode(&url, &body)
    }

    pub fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, TransportError> {
        let url = self.endpoint(path);
        let response = self.send_json(&url, body)?;
        decode(&url, &response)
    }

    /// POST whose response body is not needed; only the status is checked.
    pub fn post_json_discard<B: Serialize>(&self, path: &str, body: &B) -> Result<(), TransportError> {
        let url = self.endpoint(path);
        self.send_json(&url, body).map(|_| ())
    }

    /// Uploads one file as the multipart field `file`.
    pub fn upload_file(
        &self,
        filename: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<CreatedResource, TransportError> {
        let url = self.endpoint(FILE_UPLOAD_PATH);
        let request_error = |err: reqwest::Error| TransportError::Request {
            url: url.clone(),
            reason: err.to_string(),
        };
        let mut part = Part::bytes(bytes.to_vec()).file_name(filename.to_string());
        if let Some(content_type) = content_type {
            part = part.mime_str(content_type).map_err(request_error)?;
        }
        let form = Form::new().part("file", part);

        self.log.info(
            "webui.upload",
            &format!("POST {url} file={filename} bytes={}", bytes.len()),
        );
        // built per call: the blocking client owns a runtime that must not be
        // dropped on an async worker thread
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(request_error)?;
        let response = client
            .post(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .map_err(|err| {
                self.log
                    .error("webui.request", &format!("POST {url} failed: {err}"));
                request_error(err)
            })?;
        let status = response.status().as_u16();
        let body = response.text().map_err(request_error)?;
        if !(200..300).contains(&status) {
            self.log
                .warn("webui.request", &format!("POST {url} status={status}"));
            return Err(TransportError::Status { url, status, body });
        }
        self.log
            .info("webui.request", &format!("POST {url} status={status}"));
        decode(&url, &body)
    }

    fn send_json<B: Serialize>(&self, url: &str, body: &B) -> Result<String, TransportError> {
        let payload = serde_json::to_string(body).map_err(|source| TransportError::Encode {
            url: url.to_string(),
            source,
        })?;
        let outcome = self
            .authorized(self.agent.post(url))
            .set("Content-Type", "application/json")
            .send_string(&payload);
        self.complete("POST", url, outcome)
    }

    fn authorized(&self, request: ureq::Request) -> ureq::Request {
        request.set("Authorization", &format!("Bearer {}", self.token))
    }

    fn complete(
        &self,
        method: &str,
        url: &str,
        outcome: Result<ureq::Response, ureq::Error>,
    ) -> Result<String, TransportError> {
        match outcome {
            Ok(response) => {
                let status = response.status();
                let body = response
                    .into_string()
                    .map_err(|source| TransportError::ReadBody {
                        url: url.to_string(),
                        source,
                    })?;
                self.log
                    .info("webui.request", &format!("{method} {url} status={status}"));
                if !(200..300).contains(&status) {
                    return Err(TransportError::Status {
                        url: url.to_string(),
                        status,
                        body,
                    });
                }
                Ok(body)
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                self.log
                    .warn("webui.request", &format!("{method} {url} status={status}"));
                Err(TransportError::Status {
                    url: url.to_string(),
                    status,
                    body,
                })
            }
            Err(err) => {
                self.log
                    .error("webui.request", &format!("{method} {url} failed: {err}"));
                Err(TransportError::Request {
                    url: url.to_string(),
                    reason: err.to_string(),
                })
            }
        }
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, TransportError> {
    serde_json::from_str(body).map_err(|err| TransportError::Decode {
        url: url.to_string(),
        reason: err.to_string(),
        body: body.to_string(),
    })
}
