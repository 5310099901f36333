mod support;

use chatrelay::orchestration::{
    ChatRequest, ChatWorkflowEngine, KnowledgeError, WorkflowError, WorkflowOptions, WorkflowStep,
};
use chatrelay::shared::{EventLog, KnowledgeId};
use std::sync::{Arc, Mutex};
use support::{chat_state, ok, test_settings, MockHttpServer, RecordedRequest};

fn engine_for(server: &MockHttpServer) -> ChatWorkflowEngine {
    ChatWorkflowEngine::from_settings(&test_settings(&server.base_url), EventLog::discard())
}

fn protocol_responder(request: &RecordedRequest) -> (u16, String) {
    match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/api/v1/chats/new") => ok(r#"{"id":"chat-1","title":"t"}"#),
        ("POST", "/api/v1/chats/chat-1") => ok(r#"{"id":"chat-1"}"#),
        ("POST", "/api/chat/completions") => ok(r#"{"status":true}"#),
        ("POST", "/api/chat/completed") => ok("{}"),
        _ => (404, r#"{"detail":"not found"}"#.to_string()),
    }
}

#[test]
fn default_run_creates_chat_injects_assistant_and_triggers_once() {
    let server = MockHttpServer::start(3, protocol_responder);
    let engine = engine_for(&server);

    let report = engine
        .run(
            &ChatRequest::new("What is the capital of France?"),
            WorkflowOptions::default(),
        )
        .expect("run");
    let requests = server.finish();

    assert_eq!(report.chat_id, "chat-1");
    assert_eq!(
        report.completed_steps,
        vec![
            WorkflowStep::CreateChat,
            WorkflowStep::InjectAssistantMessage,
            WorkflowStep::TriggerCompletion
        ]
    );
    assert_eq!(report.content, None);
    assert!(requests
        .iter()
        .all(|request| request.auth_header == "Bearer sk-test"));

    let create = requests[0].json();
    let user_id = report.user_message_id.as_str();
    assert_eq!(create["chat"]["title"], "What is the capital of France?");
    assert_eq!(create["chat"]["models"][0], "llama3");
    assert_eq!(create["chat"]["tools"][0], "DVSA Lookup");
    assert_eq!(create["chat"]["history"]["current_id"], user_id);
    assert_eq!(create["chat"]["messages"][0]["role"], "user");

    let update = requests[1].json();
    let assistant_id = report.assistant_message_id.as_str();
    assert_eq!(requests[1].path, "/api/v1/chats/chat-1");
    assert_eq!(update["chat"]["history"]["current_id"], assistant_id);
    let assistant = &update["chat"]["history"]["messages"][assistant_id];
    assert_eq!(assistant["parentId"], user_id);
    assert_eq!(assistant["role"], "assistant");
    assert_eq!(assistant["content"], "");
    assert_eq!(assistant["modelName"], "llama3");
    assert_eq!(update["chat"]["messages"].as_array().map(Vec::len), Some(2));

    let completion = requests[2].json();
    assert_eq!(requests[2].path, "/api/chat/completions");
    assert_eq!(completion["chat_id"], "chat-1");
    assert_eq!(completion["id"], assistant_id);
    assert_eq!(completion["session_id"], "chat-1");
    assert_eq!(completion["stream"], true);
    assert_eq!(completion["background_tasks"]["title_generation"], true);
    assert_eq!(completion["variables"]["{{CURRENT_TIMEZONE}}"], "UTC");
    assert!(completion.get("files").is_none());
    assert_eq!(
        requests
            .iter()
            .filter(|request| request.path == "/api/chat/completions")
            .count(),
        1
    );
}

#[test]
fn full_run_refreshes_marks_completed_and_waits_for_content() {
    let assistant_id: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let seen = Arc::clone(&assistant_id);
    let polls = Arc::new(Mutex::new(0_u32));
    let server = MockHttpServer::start(8, move |request| {
        if request.method == "POST" && request.path == "/api/v1/chats/chat-1" {
            let current = request.json()["chat"]["history"]["current_id"]
                .as_str()
                .map(str::to_string);
            *seen.lock().expect("lock") = current;
        }
        if request.method == "GET" && request.path == "/api/v1/chats/chat-1" {
            let id = seen.lock().expect("lock").clone().unwrap_or_default();
            let mut count = polls.lock().expect("lock");
            *count += 1;
            return match *count {
                1 => ok("[]"),
                2 => ok(&chat_state(&id, "")),
                _ => ok(&chat_state(&id, "Paris")),
            };
        }
        protocol_responder(request)
    });
    let engine = engine_for(&server);

    let report = engine
        .run(
            &ChatRequest::new("What is the capital of France?"),
            WorkflowOptions {
                refresh_model_details: true,
                mark_completed: true,
                await_completion: true,
            },
        )
        .expect("run");
    let requests = server.finish();

    assert_eq!(report.content.as_deref(), Some("Paris"));
    assert_eq!(report.completed_steps.len(), 6);
    assert_eq!(
        assistant_id.lock().expect("lock").as_deref(),
        Some(report.assistant_message_id.as_str())
    );
    let paths: Vec<&str> = requests.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/api/v1/chats/new",
            "/api/v1/chats/chat-1",
            "/api/chat/completions",
            "/api/v1/chats/chat-1",
            "/api/chat/completed",
            "/api/v1/chats/chat-1",
            "/api/v1/chats/chat-1",
            "/api/v1/chats/chat-1",
        ]
    );
    let completed = requests[4].json();
    assert_eq!(completed["id"], report.assistant_message_id);
    assert_eq!(completed["model"], "llama3");
}

#[test]
fn content_is_ingested_and_attached_as_file_reference() {
    let server = MockHttpServer::start(5, |request| {
        match (request.method.as_str(), request.path.as_str()) {
            ("POST", "/api/v1/files/") => ok(r#"{"id":"file-7","filename":"x.md"}"#),
            ("POST", "/api/v1/knowledge/kb1/file/add") => ok(r#"{"id":"kb1"}"#),
            _ => protocol_responder(request),
        }
    });
    let engine = engine_for(&server);
    let request = ChatRequest::new("Summarise my notes")
        .with_content("notes")
        .with_knowledge_id(KnowledgeId::parse("kb1").expect("kb"));
    let report = engine
        .run(&request, WorkflowOptions::default())
        .expect("run");
    let requests = server.finish();

    assert_eq!(report.document_id.as_deref(), Some("file-7"));

    let upload = &requests[0];
    assert!(upload
        .content_type
        .starts_with("multipart/form-data; boundary="));
    assert!(upload.body.contains("name=\"file\"; filename=\"chat-content-"));
    assert!(upload.body.contains("Content-Type: text/markdown"));
    assert!(upload.body.contains("notes"));
    assert_eq!(requests[1].json()["file_id"], "file-7");

    let completion = requests[4].json();
    assert_eq!(completion["files"][0]["type"], "collection");
    assert_eq!(completion["files"][0]["id"], "kb1");
    assert_eq!(completion["files"][1]["type"], "file");
    assert_eq!(completion["files"][1]["id"], "file-7");
}

#[test]
fn failed_content_ingestion_aborts_before_the_chat_is_created() {
    let server = MockHttpServer::start(1, |_| (500, r#"{"detail":"disk full"}"#.to_string()));
    let engine = engine_for(&server);

    let request = ChatRequest::new("Summarise my notes")
        .with_content("notes")
        .with_knowledge_id(KnowledgeId::parse("kb1").expect("kb"));
    let err = engine
        .run(&request, WorkflowOptions::default())
        .expect_err("upload fails");
    let requests = server.finish();

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/api/v1/files/");
    assert!(matches!(
        err,
        WorkflowError::Knowledge(KnowledgeError::Upload(_))
    ));
    assert_eq!(err.step(), None);
    assert!(err
        .to_string()
        .starts_with("failed to add content to knowledge collection: failed to upload file"));
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn content_without_knowledge_id_is_rejected_before_any_request() {
    let engine = ChatWorkflowEngine::from_settings(
        &test_settings("http://127.0.0.1:9"),
        EventLog::discard(),
    );

    let err = engine
        .run(
            &ChatRequest::new("Summarise").with_content("notes"),
            WorkflowOptions::default(),
        )
        .expect_err("needs knowledge id");

    assert!(err.is_caller_error());
    assert!(err.to_string().contains("knowledge_id is required"));
}

#[test]
fn failing_step_aborts_run_with_step_context() {
    let server = MockHttpServer::start(2, |request| {
        if request.path == "/api/v1/chats/chat-1" {
            return (500, r#"{"detail":"db down"}"#.to_string());
        }
        protocol_responder(request)
    });
    let engine = engine_for(&server);

    let err = engine
        .run(&ChatRequest::new("hello"), WorkflowOptions::default())
        .expect_err("update fails");
    let requests = server.finish();

    assert_eq!(requests.len(), 2);
    assert_eq!(err.step(), Some(WorkflowStep::InjectAssistantMessage));
    let message = err.to_string();
    assert!(message.starts_with("failed to inject empty assistant message"));
    assert!(message.contains("500"));
    assert!(message.contains("db down"));
}

#[test]
fn create_response_without_id_is_reported() {
    let server = MockHttpServer::start(1, |_| ok(r#"{"title":"no id here"}"#));
    let engine = engine_for(&server);

    let err = engine
        .run(&ChatRequest::new("hello"), WorkflowOptions::default())
        .expect_err("missing id");
    server.finish();

    assert!(matches!(
        err,
        WorkflowError::MissingField {
            step: WorkflowStep::CreateChat,
            field: "id"
        }
    ));
}

#[test]
fn blank_prompt_never_reaches_the_backend() {
    let engine = ChatWorkflowEngine::from_settings(
        &test_settings("http://127.0.0.1:9"),
        EventLog::discard(),
    );
    let err = engine
        .run(&ChatRequest::new("  \n"), WorkflowOptions::default())
        .expect_err("blank");
    assert!(err.is_caller_error());
}
