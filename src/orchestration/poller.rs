use crate::config::PollingConfig;
use crate::shared::{ChatId, EventLog, MessageId};
use crate::webui::{Chat, TransportError, WebUiClient, ROLE_ASSISTANT};
use std::thread;
use std::time::Duration;

/// Why a fetched chat state does not yet hold the assistant's answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotReady {
    #[error("chat response array was empty")]
    EmptyResponse,
    #[error("assistant message id not yet present in history")]
    MessageAbsent,
    #[error("found message, but role is `{role}` instead of `assistant`")]
    WrongRole { role: String },
    #[error("assistant message content is empty")]
    EmptyContent,
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("failed to fetch chat state: {0}")]
    Transport(#[from] TransportError),
    #[error("completion not ready after {attempts} attempts: {last}")]
    Timeout { attempts: u32, last: NotReady },
}

impl PollError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingBudget {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollingBudget {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 15,
        }
    }
}

impl PollingBudget {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }
}

impl From<PollingConfig> for PollingBudget {
    fn from(value: PollingConfig) -> Self {
        Self::new(value.interval(), value.max_attempts)
    }
}

/// Checks one fetched state. Content is all-or-nothing per fetch.
pub fn evaluate_chat_state(chats: &[Chat], assistant_id: &str) -> Result<String, NotReady> {
    let chat = chats.first().ok_or(NotReady::EmptyResponse)?;
    let message = chat
        .history
        .messages
        .get(assistant_id)
        .ok_or(NotReady::MessageAbsent)?;
    if message.role != ROLE_ASSISTANT {
        return Err(NotReady::WrongRole {
            role: message.role.clone(),
        });
    }
    if message.content.is_empty() {
        return Err(NotReady::EmptyContent);
    }
    Ok(message.content.clone())
}

#[derive(Debug, Clone)]
pub struct CompletionPoller {
    budget: PollingBudget,
    log: EventLog,
}

impl CompletionPoller {
    pub fn new(budget: PollingBudget, log: EventLog) -> Self {
        Self { budget, log }
    }

    pub fn budget(&self) -> PollingBudget {
        self.budget
    }

    pub fn poll(
        &self,
        client: &WebUiClient,
        chat_id: &ChatId,
        assistant_id: &MessageId,
    ) -> Result<String, PollError> {
        let path = format!("api/v1/chats/{chat_id}");
        self.poll_with(assistant_id.as_str(), || client.get_json::<Vec<Chat>>(&path))
    }

    /// Transport failures end polling immediately; only [`NotReady`] states
    /// consume the attempt budget.
    pub fn poll_with<F>(&self, assistant_id: &str, mut fetch: F) -> Result<String, PollError>
    where
        F: FnMut() -> Result<Vec<Chat>, TransportError>,
    {
        let mut last = NotReady::EmptyResponse;
        for attempt in 1..=self.budget.max_attempts {
            let chats = fetch()?;
            match evaluate_chat_state(&chats, assistant_id) {
                Ok(content) => {
                    self.log.info(
                        "poller.resolved",
                        &format!("assistant message `{assistant_id}` ready after {attempt} attempts"),
                    );
                    return Ok(content);
                }
                Err(reason) => {
                    self.log.info(
                        "poller.not_ready",
                        &format!(
                            "attempt {attempt}/{} for `{assistant_id}`: {reason}",
                            self.budget.max_attempts
                        ),
                    );
                    last = reason;
                }
            }
            if attempt < self.budget.max_attempts {
                thread::sleep(self.budget.interval);
            }
        }
        Err(PollError::Timeout {
            attempts: self.budget.max_attempts,
            last,
        })
    }
}
