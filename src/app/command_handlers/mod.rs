use crate::app::cli::{help_text, parse_cli_verb, split_global_options, CliVerb, GlobalOptions};

pub mod chat;
pub mod knowledge;
pub mod serve;
pub mod tools;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let (options, args) = split_global_options(args)?;
    if args.is_empty() {
        return Ok(help_text());
    }
    dispatch(&options, &args)
}

fn dispatch(options: &GlobalOptions, args: &[String]) -> Result<String, String> {
    let config = options.config_path.as_deref();
    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Chat => chat::cmd_chat(config, &args[1..]),
        CliVerb::Poll => chat::cmd_poll(config, &args[1..]),
        CliVerb::Upload => knowledge::cmd_upload(config, &args[1..]),
        CliVerb::Vehicle => tools::cmd_vehicle(config, &args[1..]),
        CliVerb::Plate => tools::cmd_plate(config, &args[1..]),
        CliVerb::Serve => serve::cmd_serve(config, &args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
