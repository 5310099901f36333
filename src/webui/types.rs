//! Wire shapes of the chat backend API.
//!
//! Request types mirror the payloads the backend expects byte for byte;
//! response types carry only the fields this crate reads.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub const ROLE_USER: &str = "user";
pub const ROLE_ASSISTANT: &str = "assistant";

/// Backend payloads send `null` where a field has no value yet.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: i64,
    #[serde(rename = "parentId", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(rename = "modelName", default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(rename = "modelIdx", default, skip_serializing_if = "Option::is_none")]
    pub model_idx: Option<u32>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub models: Vec<String>,
}

/// Keyed-by-id snapshot of every turn plus a pointer to the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub current_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: BTreeMap<String, Message>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub models: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tools: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: History,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEnvelope {
    pub chat: Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundTasks {
    pub title_generation: bool,
    pub tags_generation: bool,
    pub follow_up_generation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub code_interpreter: bool,
    pub web_search: bool,
    pub image_generation: bool,
    pub memory: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariables {
    #[serde(rename = "{{USER_NAME}}")]
    pub user_name: String,
    #[serde(rename = "{{USER_LANGUAGE}}")]
    pub user_language: String,
    #[serde(rename = "{{CURRENT_DATETIME}}")]
    pub current_datetime: String,
    #[serde(rename = "{{CURRENT_TIMEZONE}}")]
    pub current_timezone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileReferenceKind {
    Collection,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    #[serde(rename = "type")]
    pub kind: FileReferenceKind,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub chat_id: String,
    #[serde(rename = "id")]
    pub message_id: String,
    pub messages: Vec<Message>,
    pub model: String,
    pub stream: bool,
    pub background_tasks: BackgroundTasks,
    pub features: Features,
    #[serde(rename = "variables")]
    pub environment: EnvironmentVariables,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedRequest {
    pub chat_id: String,
    #[serde(rename = "id")]
    pub message_id: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddFileRequest {
    pub file_id: String,
}

/// Minimal shape of any "create" response: only the assigned id is read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreatedResource {
    #[serde(default)]
    pub id: Option<String>,
}

impl CreatedResource {
    pub fn non_empty_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_uses_backend_field_names() {
        let message = Message {
            id: "a1".to_string(),
            role: ROLE_ASSISTANT.to_string(),
            content: String::new(),
            timestamp: 1_700_000_000_000,
            parent_id: Some("u1".to_string()),
            model_name: Some("llama3".to_string()),
            model_idx: Some(0),
            models: vec!["llama3".to_string()],
        };

        let value = serde_json::to_value(&message).expect("encode");
        assert_eq!(value["parentId"], "u1");
        assert_eq!(value["modelName"], "llama3");
        assert_eq!(value["modelIdx"], 0);
        assert!(value.get("parent_id").is_none());
    }

    #[test]
    fn user_message_omits_assistant_only_fields() {
        let message = Message {
            id: "u1".to_string(),
            role: ROLE_USER.to_string(),
            content: "hi".to_string(),
            timestamp: 1,
            parent_id: None,
            model_name: None,
            model_idx: None,
            models: vec!["llama3".to_string()],
        };

        let value = serde_json::to_value(&message).expect("encode");
        assert!(value.get("parentId").is_none());
        assert!(value.get("modelName").is_none());
        assert!(value.get("modelIdx").is_none());
    }

    #[test]
    fn chat_state_tolerates_sparse_backend_payloads() {
        let chats: Vec<Chat> = serde_json::from_value(json!([{
            "id": "c1",
            "history": {
                "current_id": null,
                "messages": {"a1": {"id": "a1", "role": "assistant"}}
            }
        }]))
        .expect("decode");

        assert_eq!(chats[0].history.messages["a1"].content, "");
        assert_eq!(chats[0].history.current_id, None);
    }

    #[test]
    fn null_fields_decode_as_empty_values() {
        let chats: Vec<Chat> = serde_json::from_value(json!([{
            "id": "c1",
            "title": null,
            "models": null,
            "messages": null,
            "history": {
                "current_id": "a1",
                "messages": {"a1": {
                    "id": "a1",
                    "role": "assistant",
                    "content": null,
                    "timestamp": null,
                    "models": null
                }}
            }
        }]))
        .expect("decode");

        let chat = &chats[0];
        assert_eq!(chat.title, "");
        assert!(chat.models.is_empty());
        assert!(chat.messages.is_empty());
        assert_eq!(chat.history.messages["a1"].content, "");
        assert_eq!(chat.history.messages["a1"].timestamp, 0);

        let empty: History = serde_json::from_value(json!({"messages": null})).expect("decode");
        assert!(empty.messages.is_empty());
    }

    #[test]
    fn completion_request_renames_environment_and_file_kinds() {
        let request = CompletionRequest {
            chat_id: "c1".to_string(),
            message_id: "a1".to_string(),
            messages: Vec::new(),
            model: "llama3".to_string(),
            stream: true,
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
            environment: EnvironmentVariables {
                user_name: String::new(),
                user_language: "en-US".to_string(),
                current_datetime: "2024-01-01 10:00:00".to_string(),
                current_timezone: "Europe/London".to_string(),
            },
            session_id: Some("c1".to_string()),
            files: vec![FileReference {
                kind: FileReferenceKind::Collection,
                id: "kb1".to_string(),
            }],
        };

        let value = serde_json::to_value(&request).expect("encode");
        assert_eq!(value["id"], "a1");
        assert_eq!(value["variables"]["{{USER_LANGUAGE}}"], "en-US");
        assert_eq!(value["files"][0]["type"], "collection");
        assert_eq!(value["session_id"], "c1");
    }

    #[test]
    fn created_resource_ignores_blank_ids() {
        let blank: CreatedResource = serde_json::from_str(r#"{"id": "  "}"#).expect("decode");
        assert_eq!(blank.non_empty_id(), None);
        let missing: CreatedResource = serde_json::from_str(r#"{"title": "x"}"#).expect("decode");
        assert_eq!(missing.non_empty_id(), None);
    }
}
