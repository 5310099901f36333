pub mod error;
pub mod knowledge;
pub mod poller;
pub mod run;
pub mod step;
pub mod workflow_engine;

pub use error::WorkflowError;
pub use knowledge::{ingest_content, ingest_document, ingest_path, KnowledgeError};
pub use poller::{evaluate_chat_state, CompletionPoller, NotReady, PollError, PollingBudget};
pub use run::{Attachments, CompletionProfile, ConversationRun, PendingConversation};
pub use step::WorkflowStep;
pub use workflow_engine::{ChatRequest, ChatRunReport, ChatWorkflowEngine, WorkflowOptions};
