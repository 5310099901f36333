pub mod clock;
pub mod ids;
pub mod logging;

pub use clock::{now_millis, now_secs};
pub use ids::{ChatId, FileId, KnowledgeId, MessageId};
pub use logging::{EventLog, LogLevel};
