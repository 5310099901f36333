//! Per-run conversation state and the request builders that read it.
//!
//! A [`PendingConversation`] holds the user turn until the backend assigns a
//! chat id; it then becomes a [`ConversationRun`] that owns both turns for the
//! rest of the run. Nothing here is shared between runs.

use crate::config::Settings;
use crate::orchestration::error::WorkflowError;
use crate::shared::{ChatId, FileId, KnowledgeId, MessageId};
use crate::webui::{
    BackgroundTasks, Chat, ChatEnvelope, CompletedRequest, CompletionRequest,
    EnvironmentVariables, Features, FileReference, FileReferenceKind, History, Message,
    ROLE_ASSISTANT, ROLE_USER,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;

/// Model and feature settings applied to every run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionProfile {
    pub model: String,
    pub tools: Vec<String>,
    pub background_tasks: BackgroundTasks,
    pub features: Features,
    pub user_name: String,
    pub user_language: String,
    pub timezone: Tz,
}

impl CompletionProfile {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            tools: vec!["DVSA Lookup".to_string()],
            background_tasks: BackgroundTasks {
                title_generation: true,
                tags_generation: false,
                follow_up_generation: false,
            },
            features: Features {
                code_interpreter: false,
                web_search: false,
                image_generation: false,
                memory: false,
            },
            user_name: String::new(),
            user_language: "en-US".to_string(),
            timezone: Tz::UTC,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let completion = &settings.completion;
        Self {
            model: settings.backend.model.trim().to_string(),
            tools: settings.backend.tools.clone(),
            background_tasks: BackgroundTasks {
                title_generation: completion.title_generation,
                tags_generation: completion.tags_generation,
                follow_up_generation: completion.follow_up_generation,
            },
            features: Features {
                code_interpreter: completion.code_interpreter,
                web_search: completion.web_search,
                image_generation: completion.image_generation,
                memory: completion.memory,
            },
            user_name: settings.environment.user_name.clone(),
            user_language: settings.environment.user_language.clone(),
            timezone: settings.environment.resolve_timezone().unwrap_or(Tz::UTC),
        }
    }

    pub fn environment(&self, now: DateTime<Utc>) -> EnvironmentVariables {
        EnvironmentVariables {
            user_name: self.user_name.clone(),
            user_language: self.user_language.clone(),
            current_datetime: now
                .with_timezone(&self.timezone)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            current_timezone: self.timezone.name().to_string(),
        }
    }
}

/// Supporting content attached to the completion request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachments {
    pub knowledge_id: Option<KnowledgeId>,
    pub document_id: Option<FileId>,
}

impl Attachments {
    pub fn file_references(&self) -> Vec<FileReference> {
        let mut files = Vec::new();
        if let Some(knowledge_id) = &self.knowledge_id {
            files.push(FileReference {
                kind: FileReferenceKind::Collection,
                id: knowledge_id.to_string(),
            });
        }
        if let Some(document_id) = &self.document_id {
            files.push(FileReference {
                kind: FileReferenceKind::File,
                id: document_id.to_string(),
            });
        }
        files
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConversation {
    title: String,
    model: String,
    tools: Vec<String>,
    user_message: Message,
}

impl PendingConversation {
    pub fn new(prompt: &str, profile: &CompletionProfile, now_ms: i64) -> Self {
        let user_message = Message {
            id: MessageId::generate().to_string(),
            role: ROLE_USER.to_string(),
            content: prompt.to_string(),
            timestamp: now_ms,
            models: vec![profile.model.clone()],
            ..Message::default()
        };
        Self {
            title: prompt.to_string(),
            model: profile.model.clone(),
            tools: profile.tools.clone(),
            user_message,
        }
    }

    pub fn user_message(&self) -> &Message {
        &self.user_message
    }

    /// The user turn is both the sole message and the current history entry.
    pub fn create_payload(&self) -> ChatEnvelope {
        let user = self.user_message.clone();
        ChatEnvelope {
            chat: Chat {
                id: String::new(),
                title: self.title.clone(),
                models: vec![self.model.clone()],
                messages: vec![user.clone()],
                tools: self.tools.clone(),
                history: History {
                    current_id: Some(user.id.clone()),
                    messages: BTreeMap::from([(user.id.clone(), user)]),
                },
            },
        }
    }

    pub fn into_run(self, chat_id: ChatId) -> ConversationRun {
        ConversationRun {
            chat_id,
            title: self.title,
            model: self.model,
            tools: self.tools,
            user_message: self.user_message,
            assistant_id: MessageId::generate(),
            completion_triggered: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRun {
    chat_id: ChatId,
    title: String,
    model: String,
    tools: Vec<String>,
    user_message: Message,
    assistant_id: MessageId,
    completion_triggered: bool,
}

impl ConversationRun {
    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    pub fn user_message(&self) -> &Message {
        &self.user_message
    }

    pub fn assistant_id(&self) -> &MessageId {
        &self.assistant_id
    }

    pub fn completion_triggered(&self) -> bool {
        self.completion_triggered
    }

    /// Empty assistant slot for the backend to stream into, stamped `now_ms`.
    pub fn assistant_message(&self, now_ms: i64) -> Message {
        Message {
            id: self.assistant_id.to_string(),
            role: ROLE_ASSISTANT.to_string(),
            content: String::new(),
            timestamp: now_ms,
            parent_id: Some(self.user_message.id.clone()),
            model_name: Some(self.model.clone()),
            model_idx: Some(0),
            models: vec![self.model.clone()],
        }
    }

    /// Full-document update: the backend rejects deltas, so every update
    /// carries both turns and the whole history map.
    pub fn update_payload(&self, now_ms: i64) -> ChatEnvelope {
        let user = self.user_message.clone();
        let assistant = self.assistant_message(now_ms);
        ChatEnvelope {
            chat: Chat {
                id: self.chat_id.to_string(),
                title: self.title.clone(),
                models: vec![self.model.clone()],
                messages: vec![user.clone(), assistant.clone()],
                tools: self.tools.clone(),
                history: History {
                    current_id: Some(assistant.id.clone()),
                    messages: BTreeMap::from([
                        (user.id.clone(), user),
                        (assistant.id.clone(), assistant),
                    ]),
                },
            },
        }
    }

    /// Builds the one completion request of this run. A second call fails:
    /// resubmitting would make the backend generate twice.
    pub fn completion_request(
        &mut self,
        profile: &CompletionProfile,
        attachments: &Attachments,
        now: DateTime<Utc>,
    ) -> Result<CompletionRequest, WorkflowError> {
        if self.completion_triggered {
            return Err(WorkflowError::CompletionAlreadyTriggered {
                message_id: self.assistant_id.to_string(),
            });
        }
        self.completion_triggered = true;
        Ok(CompletionRequest {
            chat_id: self.chat_id.to_string(),
            message_id: self.assistant_id.to_string(),
            messages: vec![self.user_message.clone()],
            model: self.model.clone(),
            stream: true,
            background_tasks: profile.background_tasks,
            features: profile.features,
            environment: profile.environment(now),
            session_id: Some(self.chat_id.to_string()),
            files: attachments.file_references(),
        })
    }

    pub fn completed_request(&self) -> CompletedRequest {
        CompletedRequest {
            chat_id: self.chat_id.to_string(),
            message_id: self.assistant_id.to_string(),
            model: self.model.clone(),
            session_id: Some(self.chat_id.to_string()),
        }
    }
}
