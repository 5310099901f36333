use crate::config::Settings;
use crate::orchestration::error::WorkflowError;
use crate::orchestration::knowledge::ingest_content;
use crate::orchestration::poller::{CompletionPoller, PollingBudget};
use crate::orchestration::run::{
    Attachments, CompletionProfile, ConversationRun, PendingConversation,
};
use crate::orchestration::step::WorkflowStep;
use crate::shared::{now_millis, ChatId, EventLog, FileId, KnowledgeId, MessageId};
use crate::webui::{CreatedResource, WebUiClient};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub prompt: String,
    /// Text ingested into `knowledge_id` before the chat starts; the stored
    /// file replaces `document_id`.
    pub content: Option<String>,
    pub knowledge_id: Option<KnowledgeId>,
    pub document_id: Option<FileId>,
}

impl ChatRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            content: None,
            knowledge_id: None,
            document_id: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_knowledge_id(mut self, knowledge_id: KnowledgeId) -> Self {
        self.knowledge_id = Some(knowledge_id);
        self
    }

    pub fn with_document_id(mut self, document_id: FileId) -> Self {
        self.document_id = Some(document_id);
        self
    }
}

/// Optional steps after the completion trigger. The default stops there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowOptions {
    pub refresh_model_details: bool,
    pub mark_completed: bool,
    pub await_completion: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRunReport {
    pub chat_id: String,
    pub user_message_id: String,
    pub assistant_message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    pub completed_steps: Vec<WorkflowStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Drives one conversation through the chat backend's protocol.
///
/// Steps run strictly in order, each blocking on its round trip. The first
/// failure aborts the run and is returned annotated with its step; nothing is
/// retried. The engine itself is stateless across runs: all per-run values live
/// in a [`ConversationRun`] created inside [`ChatWorkflowEngine::run`], so
/// concurrent runs can share one engine.
#[derive(Debug, Clone)]
pub struct ChatWorkflowEngine {
    client: WebUiClient,
    profile: CompletionProfile,
    poller: CompletionPoller,
    log: EventLog,
}

impl ChatWorkflowEngine {
    pub fn new(client: WebUiClient, profile: CompletionProfile) -> Self {
        Self {
            client,
            profile,
            poller: CompletionPoller::new(PollingBudget::default(), EventLog::default()),
            log: EventLog::default(),
        }
    }

    pub fn from_settings(settings: &Settings, log: EventLog) -> Self {
        Self::new(
            WebUiClient::from_settings(settings, log.clone()),
            CompletionProfile::from_settings(settings),
        )
        .with_poller(CompletionPoller::new(settings.polling.into(), log.clone()))
        .with_log(log)
    }

    pub fn with_poller(mut self, poller: CompletionPoller) -> Self {
        self.poller = poller;
        self
    }

    pub fn with_log(mut self, log: EventLog) -> Self {
        self.log = log;
        self
    }

    pub fn client(&self) -> &WebUiClient {
        &self.client
    }

    pub fn profile(&self) -> &CompletionProfile {
        &self.profile
    }

    pub fn run(
        &self,
        request: &ChatRequest,
        options: WorkflowOptions,
    ) -> Result<ChatRunReport, WorkflowError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(WorkflowError::InvalidRequest(
                "prompt must be non-empty".to_string(),
            ));
        }
        let document_id = match self.ingest_request_content(request)? {
            Some(file_id) => Some(file_id),
            None => request.document_id.clone(),
        };
        let attachments = Attachments {
            knowledge_id: request.knowledge_id.clone(),
            document_id,
        };
        let mut completed_steps = Vec::new();

        let pending = PendingConversation::new(prompt, &self.profile, now_millis());
        let chat_id = self.create_chat(&pending)?;
        completed_steps.push(WorkflowStep::CreateChat);

        let mut run = pending.into_run(chat_id);
        self.update_chat(&run, WorkflowStep::InjectAssistantMessage)?;
        completed_steps.push(WorkflowStep::InjectAssistantMessage);

        self.trigger_completion(&mut run, &attachments)?;
        completed_steps.push(WorkflowStep::TriggerCompletion);

        if options.refresh_model_details {
            self.update_chat(&run, WorkflowStep::RefreshModelDetails)?;
            completed_steps.push(WorkflowStep::RefreshModelDetails);
        }
        if options.mark_completed {
            self.mark_completed(&run)?;
            completed_steps.push(WorkflowStep::MarkCompleted);
        }
        let content = if options.await_completion {
            let content = self.await_completion(run.chat_id(), run.assistant_id())?;
            completed_steps.push(WorkflowStep::AwaitCompletion);
            Some(content)
        } else {
            None
        };

        Ok(ChatRunReport {
            chat_id: run.chat_id().to_string(),
            user_message_id: run.user_message().id.clone(),
            assistant_message_id: run.assistant_id().to_string(),
            document_id: attachments.document_id.as_ref().map(ToString::to_string),
            completed_steps,
            content,
        })
    }

    /// Waits for the backend to stream content into `assistant_id`.
    pub fn await_completion(
        &self,
        chat_id: &ChatId,
        assistant_id: &MessageId,
    ) -> Result<String, WorkflowError> {
        let outcome = self
            .poller
            .poll(&self.client, chat_id, assistant_id)
            .map_err(WorkflowError::from);
        self.record(WorkflowStep::AwaitCompletion, chat_id.as_str(), outcome)
    }

    fn ingest_request_content(
        &self,
        request: &ChatRequest,
    ) -> Result<Option<FileId>, WorkflowError> {
        let Some(content) = request
            .content
            .as_deref()
            .filter(|content| !content.trim().is_empty())
        else {
            return Ok(None);
        };
        let knowledge_id = request.knowledge_id.as_ref().ok_or_else(|| {
            WorkflowError::InvalidRequest(
                "knowledge_id is required when content is provided".to_string(),
            )
        })?;
        match ingest_content(&self.client, knowledge_id, content) {
            Ok(file_id) => {
                self.log.info(
                    "workflow.content.ingested",
                    &format!("file `{file_id}` added to knowledge `{knowledge_id}`"),
                );
                Ok(Some(file_id))
            }
            Err(err) => {
                let err = WorkflowError::from(err);
                self.log.error("workflow.content.failed", &err.to_string());
                Err(err)
            }
        }
    }

    fn create_chat(&self, pending: &PendingConversation) -> Result<ChatId, WorkflowError> {
        let step = WorkflowStep::CreateChat;
        let outcome = self
            .client
            .post_json::<_, CreatedResource>("api/v1/chats/new", &pending.create_payload())
            .map_err(|source| WorkflowError::Step { step, source })
            .and_then(|created| {
                created
                    .non_empty_id()
                    .and_then(|raw| ChatId::parse(raw).ok())
                    .ok_or(WorkflowError::MissingField { step, field: "id" })
            });
        self.record(step, "-", outcome)
    }

    fn update_chat(&self, run: &ConversationRun, step: WorkflowStep) -> Result<(), WorkflowError> {
        let path = format!("api/v1/chats/{}", run.chat_id());
        let outcome = self
            .client
            .post_json_discard(&path, &run.update_payload(now_millis()))
            .map_err(|source| WorkflowError::Step { step, source });
        self.record(step, run.chat_id().as_str(), outcome)
    }

    fn trigger_completion(
        &self,
        run: &mut ConversationRun,
        attachments: &Attachments,
    ) -> Result<(), WorkflowError> {
        let step = WorkflowStep::TriggerCompletion;
        let chat_id = run.chat_id().to_string();
        let outcome = run
            .completion_request(&self.profile, attachments, chrono::Utc::now())
            .and_then(|request| {
                self.client
                    .post_json_discard("api/chat/completions", &request)
                    .map_err(|source| WorkflowError::Step { step, source })
            });
        self.record(step, &chat_id, outcome)
    }

    fn mark_completed(&self, run: &ConversationRun) -> Result<(), WorkflowError> {
        let step = WorkflowStep::MarkCompleted;
        let outcome = self
            .client
            .post_json_discard("api/chat/completed", &run.completed_request())
            .map_err(|source| WorkflowError::Step { step, source });
        self.record(step, run.chat_id().as_str(), outcome)
    }

    fn record<T>(
        &self,
        step: WorkflowStep,
        chat_id: &str,
        outcome: Result<T, WorkflowError>,
    ) -> Result<T, WorkflowError> {
        match &outcome {
            Ok(_) => self.log.info(
                "workflow.step.ok",
                &format!("chat `{chat_id}` step `{}` done", step.as_str()),
            ),
            Err(err) => self.log.error(
                "workflow.step.failed",
                &format!("chat `{chat_id}` step `{}`: {err}", step.as_str()),
            ),
        }
        outcome
    }
}
