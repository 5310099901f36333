use crate::app::command_support::{event_log, load_settings, parse_args};
use crate::orchestration::{ChatRequest, ChatWorkflowEngine, WorkflowOptions};
use crate::shared::{ChatId, FileId, KnowledgeId, MessageId};
use std::path::Path;

const CHAT_USAGE: &str = "usage: chat <prompt> [--content <text>] [--knowledge-id <id>] [--document-id <id>] [--refresh] [--mark-completed] [--wait]";

pub fn cmd_chat(config: Option<&Path>, args: &[String]) -> Result<String, String> {
    let parsed = parse_args(
        args,
        &["content", "knowledge-id", "document-id"],
        &["refresh", "mark-completed", "wait"],
    )?;
    if parsed.positional.is_empty() {
        return Err(CHAT_USAGE.to_string());
    }
    let prompt = parsed.positional.join(" ");
    if prompt.trim().is_empty() {
        return Err("prompt must be non-empty".to_string());
    }
    let knowledge_id = parsed
        .value("knowledge-id")
        .map(KnowledgeId::parse)
        .transpose()?;
    let document_id = parsed
        .value("document-id")
        .map(FileId::parse)
        .transpose()?;
    let content = parsed
        .value("content")
        .filter(|content| !content.trim().is_empty());
    if content.is_some() && knowledge_id.is_none() {
        return Err("--content requires --knowledge-id".to_string());
    }
    let options = WorkflowOptions {
        refresh_model_details: parsed.switch("refresh"),
        mark_completed: parsed.switch("mark-completed"),
        await_completion: parsed.switch("wait"),
    };

    let settings = load_settings(config)?;
    let engine = ChatWorkflowEngine::from_settings(&settings, event_log(&settings));

    let mut request = ChatRequest::new(prompt);
    request.content = content.map(str::to_string);
    request.knowledge_id = knowledge_id;
    request.document_id = document_id;

    let report = engine.run(&request, options).map_err(|e| e.to_string())?;
    let mut lines = vec![format!("chat_id={}", report.chat_id)];
    if let Some(document_id) = &report.document_id {
        lines.push(format!("document_id={document_id}"));
    }
    lines.push(format!("user_message_id={}", report.user_message_id));
    lines.push(format!("assistant_message_id={}", report.assistant_message_id));
    lines.push(format!(
        "steps={}",
        report
            .completed_steps
            .iter()
            .map(|step| step.as_str())
            .collect::<Vec<_>>()
            .join(",")
    ));
    if let Some(content) = report.content {
        lines.push(format!("content={content}"));
    }
    Ok(lines.join("\n"))
}

pub fn cmd_poll(config: Option<&Path>, args: &[String]) -> Result<String, String> {
    if args.len() != 2 {
        return Err("usage: poll <chat_id> <assistant_message_id>".to_string());
    }
    let chat_id = ChatId::parse(&args[0])?;
    let assistant_id = MessageId::parse(&args[1])?;

    let settings = load_settings(config)?;
    let engine = ChatWorkflowEngine::from_settings(&settings, event_log(&settings));
    let content = engine
        .await_completion(&chat_id, &assistant_id)
        .map_err(|e| e.to_string())?;
    Ok(format!("chat_id={chat_id}\ncontent={content}"))
}
