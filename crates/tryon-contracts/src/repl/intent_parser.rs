use std::collections::BTreeMap;

use serde_json::Value;

use super::command_registry::{
    CommandSpec, CLEAR_COMMAND, DROP_COMMAND, KEY_COMMAND, NO_ARG_COMMANDS, PICK_COMMAND,
    SAVE_COMMAND, SINGLE_PATH_COMMANDS,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub action: String,
    pub raw: String,
    pub command_args: BTreeMap<String, Value>,
}

impl Intent {
    fn new(action: &str, raw: &str) -> Self {
        Self {
            action: action.to_string(),
            raw: raw.to_string(),
            command_args: BTreeMap::new(),
        }
    }
}

fn find_action(command: &str, specs: &[CommandSpec]) -> Option<&'static str> {
    specs
        .iter()
        .find(|spec| spec.command == command)
        .map(|spec| spec.action)
}

fn parse_path_args(arg: &str) -> Vec<String> {
    if arg.trim().is_empty() {
        return Vec::new();
    }
    match shell_words::split(arg) {
        Ok(parts) => parts
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect(),
        Err(_) => arg
            .split_whitespace()
            .map(str::to_string)
            .filter(|value| !value.is_empty())
            .collect(),
    }
}

fn parse_single_path_arg(arg: &str) -> String {
    let parts = parse_path_args(arg);
    match parts.len() {
        0 => String::new(),
        1 => parts[0].clone(),
        _ => parts.join(" "),
    }
}

pub fn parse_intent(text: &str) -> Intent {
    let raw_trimmed = text.trim();
    if raw_trimmed.is_empty() {
        return Intent::new("noop", text);
    }

    let Some(slash_tail) = raw_trimmed.strip_prefix('/') else {
        return Intent::new("freeform", text);
    };

    let command_len = slash_tail
        .chars()
        .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .count();
    if command_len == 0 {
        return Intent::new("freeform", text);
    }

    let command = slash_tail[..command_len].to_ascii_lowercase();
    let remainder = &slash_tail[command_len..];
    let arg = if remainder.is_empty() {
        ""
    } else {
        remainder.trim()
    };

    if command == KEY_COMMAND.command {
        let mut intent = Intent::new(KEY_COMMAND.action, text);
        intent
            .command_args
            .insert("credential".to_string(), Value::String(arg.to_string()));
        return intent;
    }

    if let Some(action) = find_action(&command, SINGLE_PATH_COMMANDS) {
        let mut intent = Intent::new(action, text);
        intent.command_args.insert(
            "path".to_string(),
            Value::String(parse_single_path_arg(arg)),
        );
        return intent;
    }

    if command == DROP_COMMAND.command {
        let mut parts = parse_path_args(arg);
        let mut intent = Intent::new(DROP_COMMAND.action, text);
        let slot = if parts.is_empty() {
            String::new()
        } else {
            parts.remove(0)
        };
        intent
            .command_args
            .insert("slot".to_string(), Value::String(slot));
        intent.command_args.insert(
            "path".to_string(),
            Value::String(match parts.len() {
                0 => String::new(),
                1 => parts[0].clone(),
                _ => parts.join(" "),
            }),
        );
        return intent;
    }

    if command == CLEAR_COMMAND.command {
        let mut intent = Intent::new(CLEAR_COMMAND.action, text);
        intent
            .command_args
            .insert("slot".to_string(), Value::String(arg.to_string()));
        return intent;
    }

    if command == PICK_COMMAND.command {
        let mut intent = Intent::new(PICK_COMMAND.action, text);
        intent.command_args.insert(
            "index".to_string(),
            arg.parse::<u64>()
                .map(|value| Value::Number(value.into()))
                .unwrap_or(Value::Null),
        );
        return intent;
    }

    if command == SAVE_COMMAND.command {
        let mut intent = Intent::new(SAVE_COMMAND.action, text);
        let dir = parse_single_path_arg(arg);
        intent.command_args.insert(
            "dir".to_string(),
            if dir.is_empty() {
                Value::Null
            } else {
                Value::String(dir)
            },
        );
        return intent;
    }

    if let Some(action) = find_action(&command, NO_ARG_COMMANDS) {
        return Intent::new(action, text);
    }

    let mut intent = Intent::new("unknown", text);
    intent
        .command_args
        .insert("command".to_string(), Value::String(command));
    intent
        .command_args
        .insert("arg".to_string(), Value::String(arg.to_string()));
    intent
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_intent;

    #[test]
    fn parse_person_quoted_path() {
        let intent = parse_intent("/person \"/tmp/self portrait.jpg\"");
        assert_eq!(intent.action, "load_person");
        assert_eq!(intent.command_args["path"], json!("/tmp/self portrait.jpg"));
    }

    #[test]
    fn parse_garment_plain_path() {
        let intent = parse_intent("/garment shirts/blue.png");
        assert_eq!(intent.action, "load_garment");
        assert_eq!(intent.command_args["path"], json!("shirts/blue.png"));
    }

    #[test]
    fn parse_key_keeps_raw_argument() {
        let intent = parse_intent("/key AIzaSy-example");
        assert_eq!(intent.action, "set_credential");
        assert_eq!(intent.command_args["credential"], json!("AIzaSy-example"));
    }

    #[test]
    fn parse_drop_takes_slot_then_path() {
        let intent = parse_intent("/drop garment \"/tmp/a b.png\"");
        assert_eq!(intent.action, "drop_file");
        assert_eq!(intent.command_args["slot"], json!("garment"));
        assert_eq!(intent.command_args["path"], json!("/tmp/a b.png"));
    }

    #[test]
    fn parse_pick_index() {
        let intent = parse_intent("/pick 2");
        assert_eq!(intent.action, "pick_garment");
        assert_eq!(intent.command_args["index"], json!(2));

        let bad = parse_intent("/pick two");
        assert_eq!(bad.command_args["index"], json!(null));
    }

    #[test]
    fn parse_clear_slot() {
        let intent = parse_intent("/clear person");
        assert_eq!(intent.action, "clear_slot");
        assert_eq!(intent.command_args["slot"], json!("person"));
    }

    #[test]
    fn parse_save_with_and_without_dir() {
        let bare = parse_intent("/save");
        assert_eq!(bare.action, "save_result");
        assert_eq!(bare.command_args["dir"], json!(null));

        let with_dir = parse_intent("/save out/results");
        assert_eq!(with_dir.command_args["dir"], json!("out/results"));
    }

    #[test]
    fn parse_no_arg_commands() {
        assert_eq!(parse_intent("/generate").action, "generate");
        assert_eq!(parse_intent("/models").action, "list_models");
        assert_eq!(parse_intent("/catalog").action, "show_catalog");
        assert_eq!(parse_intent("/status").action, "status");
        assert_eq!(parse_intent("/quit").action, "quit");
        assert_eq!(parse_intent("/exit").action, "quit");
    }

    #[test]
    fn parse_unknown_command() {
        let intent = parse_intent("/magic foo bar");
        assert_eq!(intent.action, "unknown");
        assert_eq!(intent.command_args["command"], json!("magic"));
        assert_eq!(intent.command_args["arg"], json!("foo bar"));
    }

    #[test]
    fn freeform_text_is_not_a_command() {
        assert_eq!(parse_intent("hello there").action, "freeform");
        assert_eq!(parse_intent("   ").action, "noop");
    }
}
