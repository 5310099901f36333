use crate::orchestration::knowledge::KnowledgeError;
use crate::orchestration::poller::PollError;
use crate::orchestration::step::WorkflowStep;
use crate::webui::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("invalid chat request: {0}")]
    InvalidRequest(String),
    #[error("failed to {step}: {source}")]
    Step {
        step: WorkflowStep,
        #[source]
        source: TransportError,
    },
    #[error("failed to {step}: response is missing a usable `{field}`")]
    MissingField {
        step: WorkflowStep,
        field: &'static str,
    },
    #[error("completion for assistant message `{message_id}` was already triggered")]
    CompletionAlreadyTriggered { message_id: String },
    #[error("failed to fetch final chat content: {source}")]
    Poll {
        #[source]
        source: PollError,
    },
    #[error("failed to add content to knowledge collection: {0}")]
    Knowledge(#[from] KnowledgeError),
}

impl WorkflowError {
    pub fn step(&self) -> Option<WorkflowStep> {
        match self {
            Self::Step { step, .. } | Self::MissingField { step, .. } => Some(*step),
            Self::CompletionAlreadyTriggered { .. } => Some(WorkflowStep::TriggerCompletion),
            Self::Poll { .. } => Some(WorkflowStep::AwaitCompletion),
            Self::InvalidRequest(_) | Self::Knowledge(_) => None,
        }
    }

    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }
}

impl From<PollError> for WorkflowError {
    fn from(source: PollError) -> Self {
        Self::Poll { source }
    }
}
