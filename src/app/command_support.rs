use crate::config::{load_settings as config_load_settings, ConfigError, Settings};
use crate::shared::EventLog;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

pub fn load_settings(config_path: Option<&Path>) -> Result<Settings, String> {
    config_load_settings(config_path).map_err(map_config_err)
}

pub fn event_log(settings: &Settings) -> EventLog {
    EventLog::from_path(settings.log_path.as_deref())
}

/// Command arguments split into positionals, `--flag <value>` pairs and
/// bare `--switch` flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub positional: Vec<String>,
    pub values: BTreeMap<String, String>,
    pub switches: BTreeSet<String>,
}

impl ParsedArgs {
    pub fn value(&self, flag: &str) -> Option<&str> {
        self.values.get(flag).map(String::as_str)
    }

    pub fn switch(&self, flag: &str) -> bool {
        self.switches.contains(flag)
    }
}

pub fn parse_args(
    args: &[String],
    value_flags: &[&str],
    switch_flags: &[&str],
) -> Result<ParsedArgs, String> {
    let mut parsed = ParsedArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(flag) = arg.strip_prefix("--") {
            if value_flags.contains(&flag) {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("--{flag} requires a value"))?;
                parsed.values.insert(flag.to_string(), value.clone());
            } else if switch_flags.contains(&flag) {
                parsed.switches.insert(flag.to_string());
            } else {
                return Err(format!("unknown option `{arg}`"));
            }
        } else {
            parsed.positional.push(arg.clone());
        }
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn separates_positionals_values_and_switches() {
        let parsed = parse_args(
            &args(&["hello", "--knowledge-id", "kb1", "--wait", "world"]),
            &["knowledge-id"],
            &["wait"],
        )
        .expect("parse");
        assert_eq!(parsed.positional, args(&["hello", "world"]));
        assert_eq!(parsed.value("knowledge-id"), Some("kb1"));
        assert!(parsed.switch("wait"));
        assert!(!parsed.switch("refresh"));
    }

    #[test]
    fn rejects_unknown_and_incomplete_options() {
        assert!(parse_args(&args(&["--bogus"]), &[], &[]).is_err());
        assert!(parse_args(&args(&["--bind"]), &["bind"], &[]).is_err());
    }
}
