use crate::app::command_support::{event_log, load_settings};
use crate::orchestration::ingest_path;
use crate::shared::KnowledgeId;
use crate::webui::WebUiClient;
use std::path::Path;

pub fn cmd_upload(config: Option<&Path>, args: &[String]) -> Result<String, String> {
    if args.len() != 2 {
        return Err("usage: upload <path> <knowledge_id>".to_string());
    }
    let path = Path::new(&args[0]);
    let knowledge_id = KnowledgeId::parse(&args[1])?;

    let settings = load_settings(config)?;
    let client = WebUiClient::from_settings(&settings, event_log(&settings));
    let file_id = ingest_path(&client, &knowledge_id, path).map_err(|e| e.to_string())?;
    Ok(format!("file_id={file_id}\nknowledge_id={knowledge_id}"))
}
