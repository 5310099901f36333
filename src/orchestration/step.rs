use serde::{Deserialize, Serialize};

/// One call in the chat protocol, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    CreateChat,
    InjectAssistantMessage,
    TriggerCompletion,
    RefreshModelDetails,
    MarkCompleted,
    AwaitCompletion,
}

impl WorkflowStep {
    pub fn label(self) -> &'static str {
        match self {
            Self::CreateChat => "create chat",
            Self::InjectAssistantMessage => "inject empty assistant message",
            Self::TriggerCompletion => "trigger completion",
            Self::RefreshModelDetails => "update chat with model details",
            Self::MarkCompleted => "mark completion",
            Self::AwaitCompletion => "fetch final chat content",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateChat => "create_chat",
            Self::InjectAssistantMessage => "inject_assistant_message",
            Self::TriggerCompletion => "trigger_completion",
            Self::RefreshModelDetails => "refresh_model_details",
            Self::MarkCompleted => "mark_completed",
            Self::AwaitCompletion => "await_completion",
        }
    }
}

impl std::fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
