use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    Chat,
    Poll,
    Upload,
    Vehicle,
    Plate,
    Serve,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "chat" => CliVerb::Chat,
        "poll" => CliVerb::Poll,
        "upload" => CliVerb::Upload,
        "vehicle" => CliVerb::Vehicle,
        "plate" => CliVerb::Plate,
        "serve" => CliVerb::Serve,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Usage: chatrelay [--config <path>] <command> [args]".to_string(),
        String::new(),
        "Commands:".to_string(),
        "  chat <prompt> [options]              Start a chat and trigger the model's reply".to_string(),
        "      --content <text>                 Ingest text into the knowledge collection first"
            .to_string(),
        "      --knowledge-id <id>              Attach a knowledge collection".to_string(),
        "      --document-id <id>               Attach an already uploaded file".to_string(),
        "      --refresh                        Re-send the chat with model details".to_string(),
        "      --mark-completed                 Tell the backend the completion is done"
            .to_string(),
        "      --wait                           Poll until the reply is available".to_string(),
        "  poll <chat_id> <assistant_id>        Fetch a reply once the backend has written it"
            .to_string(),
        "  upload <path> <knowledge_id>         Upload a file into a knowledge collection"
            .to_string(),
        "  vehicle <registration_id>            Look up the owner id for a registration".to_string(),
        "  plate <image_base64|@path>           Read a registration from a plate image".to_string(),
        "  serve [--bind <addr>]                Run the HTTP front door".to_string(),
        "  help                                 Show this help".to_string(),
        String::new(),
        "Settings come from --config, then CHATRELAY_CONFIG, then environment variables."
            .to_string(),
    ]
}

pub fn help_text() -> String {
    cli_help_lines().join("\n")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub config_path: Option<PathBuf>,
}

/// Pulls `--config <path>` out of `args` wherever it appears.
pub fn split_global_options(args: Vec<String>) -> Result<(GlobalOptions, Vec<String>), String> {
    let mut options = GlobalOptions::default();
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let path = iter
                .next()
                .ok_or_else(|| "--config requires a path".to_string())?;
            options.config_path = Some(PathBuf::from(path));
        } else if let Some(path) = arg.strip_prefix("--config=") {
            options.config_path = Some(PathBuf::from(path));
        } else {
            rest.push(arg);
        }
    }
    Ok((options, rest))
}
