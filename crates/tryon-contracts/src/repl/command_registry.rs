#[derive(Clone, Copy, Debug)]
pub(crate) struct CommandSpec {
    pub command: &'static str,
    pub action: &'static str,
}

pub(crate) const NO_ARG_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "help",
        action: "help",
    },
    CommandSpec {
        command: "status",
        action: "status",
    },
    CommandSpec {
        command: "catalog",
        action: "show_catalog",
    },
    CommandSpec {
        command: "generate",
        action: "generate",
    },
    CommandSpec {
        command: "models",
        action: "list_models",
    },
    CommandSpec {
        command: "quit",
        action: "quit",
    },
    CommandSpec {
        command: "exit",
        action: "quit",
    },
];

pub(crate) const SINGLE_PATH_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        command: "person",
        action: "load_person",
    },
    CommandSpec {
        command: "garment",
        action: "load_garment",
    },
];

/// `/drop <person|garment> <path>` mirrors the two drop zones.
pub(crate) const DROP_COMMAND: CommandSpec = CommandSpec {
    command: "drop",
    action: "drop_file",
};

pub(crate) const CLEAR_COMMAND: CommandSpec = CommandSpec {
    command: "clear",
    action: "clear_slot",
};

pub(crate) const PICK_COMMAND: CommandSpec = CommandSpec {
    command: "pick",
    action: "pick_garment",
};

pub(crate) const KEY_COMMAND: CommandSpec = CommandSpec {
    command: "key",
    action: "set_credential",
};

pub(crate) const SAVE_COMMAND: CommandSpec = CommandSpec {
    command: "save",
    action: "save_result",
};

pub const SESSION_HELP_COMMANDS: &[&str] = &[
    "/key <api-key>",
    "/person <path>",
    "/garment <path>",
    "/drop <person|garment> <path>",
    "/catalog",
    "/pick <index>",
    "/clear <person|garment>",
    "/generate",
    "/save [dir]",
    "/models",
    "/status",
    "/help",
    "/quit",
];
