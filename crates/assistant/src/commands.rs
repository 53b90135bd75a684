//! The prefix command surface: a static registry plus the parser.
//!
//! Help output is generated from the registry, so a command is visible to
//! users exactly when it is listed here.

use crate::scaffold::ScaffoldKind;

/// One entry in the command registry.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
    pub admin_only: bool,
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "ask",
        usage: "ask <question>",
        description: "Ask a one-off question",
        admin_only: false,
    },
    CommandSpec {
        name: "analyze",
        usage: "analyze <code>",
        description: "Review pasted code in depth",
        admin_only: false,
    },
    CommandSpec {
        name: "fix",
        usage: "fix <code or attachment>",
        description: "Rewrite broken code",
        admin_only: false,
    },
    CommandSpec {
        name: "convert",
        usage: "convert <language> <code>",
        description: "Translate code to another language",
        admin_only: false,
    },
    CommandSpec {
        name: "buildapk",
        usage: "buildapk <app idea>",
        description: "Walk through building an Android app",
        admin_only: false,
    },
    CommandSpec {
        name: "buildweb",
        usage: "buildweb <site idea>",
        description: "Scaffold a static web app",
        admin_only: false,
    },
    CommandSpec {
        name: "buildproject",
        usage: "buildproject <project idea>",
        description: "Scaffold a full project",
        admin_only: false,
    },
    CommandSpec {
        name: "github",
        usage: "github <project idea>",
        description: "Plan a repository layout and CI starter",
        admin_only: false,
    },
    CommandSpec {
        name: "buildservices",
        usage: "buildservices",
        description: "List build and deploy services",
        admin_only: false,
    },
    CommandSpec {
        name: "clear",
        usage: "clear",
        description: "Forget our conversation",
        admin_only: false,
    },
    CommandSpec {
        name: "stats",
        usage: "stats",
        description: "Show your usage stats",
        admin_only: false,
    },
    CommandSpec {
        name: "ping",
        usage: "ping",
        description: "Check that I'm awake",
        admin_only: false,
    },
    CommandSpec {
        name: "help",
        usage: "help",
        description: "Show this list",
        admin_only: false,
    },
    CommandSpec {
        name: "setchannel",
        usage: "setchannel",
        description: "Reply to every message in this channel",
        admin_only: true,
    },
    CommandSpec {
        name: "removechannel",
        usage: "removechannel",
        description: "Stop auto-replying in this server",
        admin_only: true,
    },
    CommandSpec {
        name: "aistatus",
        usage: "aistatus",
        description: "Show the auto-response binding",
        admin_only: true,
    },
    CommandSpec {
        name: "botinfo",
        usage: "botinfo",
        description: "Version, uptime, and totals",
        admin_only: true,
    },
    CommandSpec {
        name: "serverstats",
        usage: "serverstats",
        description: "Usage totals for this server",
        admin_only: true,
    },
];

/// A parsed command. Argument validation happens at dispatch, so an empty
/// argument still parses and gets a usage hint instead of silence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask { question: String },
    Analyze { code: String },
    Fix { code: String },
    Convert { language: String, code: String },
    Scaffold { kind: ScaffoldKind, brief: String },
    Clear,
    Stats,
    Ping,
    Help,
    SetChannel,
    RemoveChannel,
    AiStatus,
    BotInfo,
    ServerStats,
}

/// Parse a message into a command. `None` means the message is ordinary
/// chat: wrong prefix or an unregistered name.
pub fn parse(prefix: &str, content: &str) -> Option<Command> {
    let rest = content.trim().strip_prefix(prefix)?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next()?.to_ascii_lowercase();
    let arg = parts.next().unwrap_or("").trim().to_string();

    let command = match name.as_str() {
        "ask" => Command::Ask { question: arg },
        "analyze" => Command::Analyze { code: arg },
        "fix" => Command::Fix { code: arg },
        "convert" => {
            let mut inner = arg.splitn(2, char::is_whitespace);
            let language = inner.next().unwrap_or("").to_string();
            let code = inner.next().unwrap_or("").trim().to_string();
            Command::Convert { language, code }
        }
        "buildapk" => Command::Scaffold {
            kind: ScaffoldKind::Apk,
            brief: arg,
        },
        "buildweb" => Command::Scaffold {
            kind: ScaffoldKind::Web,
            brief: arg,
        },
        "buildproject" => Command::Scaffold {
            kind: ScaffoldKind::Project,
            brief: arg,
        },
        "github" => Command::Scaffold {
            kind: ScaffoldKind::Github,
            brief: arg,
        },
        "buildservices" => Command::Scaffold {
            kind: ScaffoldKind::Services,
            brief: arg,
        },
        "clear" => Command::Clear,
        "stats" => Command::Stats,
        "ping" => Command::Ping,
        "help" => Command::Help,
        "setchannel" => Command::SetChannel,
        "removechannel" => Command::RemoveChannel,
        "aistatus" => Command::AiStatus,
        "botinfo" => Command::BotInfo,
        "serverstats" => Command::ServerStats,
        _ => return None,
    };
    Some(command)
}

/// Look up a registry entry by name.
pub fn spec_for(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == name)
}

/// Render the help list from the registry.
pub fn help_text(prefix: &str) -> String {
    let mut out = String::from("\u{1f4d6} **Commands**\n");
    for spec in COMMANDS.iter().filter(|spec| !spec.admin_only) {
        out.push_str(&format!("`{prefix}{}`: {}\n", spec.usage, spec.description));
    }
    out.push_str("\n**Admin**\n");
    for spec in COMMANDS.iter().filter(|spec| spec.admin_only) {
        out.push_str(&format!("`{prefix}{}`: {}\n", spec.usage, spec.description));
    }
    out.push_str("\nYou can also just upload a file and I'll take a look.");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_chat_is_not_a_command() {
        assert_eq!(parse("!", "hello there"), None);
        assert_eq!(parse("!", "!notacommand do things"), None);
    }

    #[test]
    fn ask_captures_the_question() {
        assert_eq!(
            parse("!", "!ask why is the sky blue"),
            Some(Command::Ask {
                question: "why is the sky blue".to_string()
            })
        );
    }

    #[test]
    fn command_names_are_case_insensitive() {
        assert_eq!(parse("!", "!PING"), Some(Command::Ping));
        assert_eq!(parse("!", "!Help"), Some(Command::Help));
    }

    #[test]
    fn empty_arguments_still_parse() {
        assert_eq!(
            parse("!", "!ask"),
            Some(Command::Ask {
                question: String::new()
            })
        );
        assert_eq!(
            parse("!", "!fix"),
            Some(Command::Fix {
                code: String::new()
            })
        );
    }

    #[test]
    fn convert_splits_language_from_code() {
        assert_eq!(
            parse("!", "!convert rust def add(a, b): return a + b"),
            Some(Command::Convert {
                language: "rust".to_string(),
                code: "def add(a, b): return a + b".to_string()
            })
        );
    }

    #[test]
    fn scaffolds_route_to_their_kind() {
        assert_eq!(
            parse("!", "!buildapk a todo app"),
            Some(Command::Scaffold {
                kind: ScaffoldKind::Apk,
                brief: "a todo app".to_string()
            })
        );
        assert_eq!(
            parse("!", "!buildservices"),
            Some(Command::Scaffold {
                kind: ScaffoldKind::Services,
                brief: String::new()
            })
        );
    }

    #[test]
    fn custom_prefixes_work() {
        assert_eq!(parse("?", "?ping"), Some(Command::Ping));
        assert_eq!(parse("?", "!ping"), None);
    }

    #[test]
    fn registry_names_are_unique() {
        let mut names: Vec<&str> = COMMANDS.iter().map(|spec| spec.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), COMMANDS.len());
    }

    #[test]
    fn help_lists_every_registered_command() {
        let help = help_text("!");
        for spec in COMMANDS {
            assert!(help.contains(spec.name), "missing {}", spec.name);
        }
    }
}
