use crate::app::command_support::{event_log, load_settings, parse_args};
use crate::server::{serve, AppState};
use std::path::Path;

pub fn cmd_serve(config: Option<&Path>, args: &[String]) -> Result<String, String> {
    let parsed = parse_args(args, &["bind"], &[])?;
    if !parsed.positional.is_empty() {
        return Err("usage: serve [--bind <addr>]".to_string());
    }
    let settings = load_settings(config)?;
    let bind = parsed
        .value("bind")
        .map(str::to_string)
        .unwrap_or_else(|| settings.server.bind.clone());
    let state = AppState::from_settings(&settings, event_log(&settings));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start async runtime: {e}"))?;
    runtime
        .block_on(serve(state, &bind))
        .map_err(|e| e.to_string())?;
    Ok(format!("server_stopped={bind}"))
}
