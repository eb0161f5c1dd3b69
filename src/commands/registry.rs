use super::CommandKind;

/// The identity the quiz command is reserved for; the same identity is
/// barred from summaries.
pub const QUIZ_HOST: &str = "madhav";

/// Who may run a command, checked against the local identity.
#[derive(Clone, Copy)]
pub enum Access {
    Only(&'static str),
    Except(&'static str),
}

impl Access {
    pub fn permits(&self, identity: &str) -> bool {
        match self {
            Access::Only(who) => identity == *who,
            Access::Except(who) => identity != *who,
        }
    }

    pub fn denial_notice(&self, name: &str) -> String {
        match self {
            Access::Only(who) => format!("/{name} is restricted to '{who}'."),
            Access::Except(who) => format!("/{name} is not allowed for '{who}'."),
        }
    }
}

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub access: Access,
    pub kind: CommandKind,
}

const COMMANDS: &[Command] = &[
    Command {
        name: "quiz",
        usage: "/quiz [topic]",
        access: Access::Only(QUIZ_HOST),
        kind: CommandKind::Quiz,
    },
    Command {
        name: "summary",
        usage: "/summary <text>",
        access: Access::Except(QUIZ_HOST),
        kind: CommandKind::Summary,
    },
];

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}
