//! Line command parsing.
//!
//! Lines starting with `/` are commands; anything else is a message to the
//! selected chat.

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/chats`: request the chat list again.
    Chats,
    /// `/select <id>`: select a chat.
    Select {
        /// Chat id.
        chat_id: String,
    },
    /// `/create <name> <email,email>`: create a chat.
    Create {
        /// Display name.
        name: String,
        /// Emails of the other members.
        participant_emails: Vec<String>,
    },
    /// `/more`: load older messages of the selected chat.
    More,
    /// `/reconnect`: open a new connection.
    Reconnect,
    /// `/quit`: exit.
    Quit,
    /// Plain text to send.
    Message {
        /// Message text.
        content: String,
    },
    /// Unrecognized command.
    Unknown {
        /// The line as typed.
        input: String,
    },
    /// Known command with bad arguments.
    InvalidArgs {
        /// Command name without the slash.
        command: &'static str,
        /// Usage hint.
        error: &'static str,
    },
}

/// Parse one input line.
pub fn parse(line: &str) -> Command {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Message { content: line.to_string() };
    };

    let (name, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let args = args.trim();

    match name {
        "chats" => Command::Chats,
        "more" => Command::More,
        "reconnect" => Command::Reconnect,
        "quit" | "q" => Command::Quit,
        "select" => match args.split_whitespace().collect::<Vec<_>>().as_slice() {
            [chat_id] => Command::Select { chat_id: (*chat_id).to_string() },
            _ => Command::InvalidArgs { command: "select", error: "usage: /select <chat id>" },
        },
        "create" => match args.rsplit_once(char::is_whitespace) {
            Some((name, emails)) if !name.trim().is_empty() => Command::Create {
                name: name.trim().to_string(),
                participant_emails: emails
                    .split(',')
                    .map(str::trim)
                    .filter(|email| !email.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
            _ => Command::InvalidArgs {
                command: "create",
                error: "usage: /create <name> <email,email>",
            },
        },
        _ => Command::Unknown { input: line.to_string() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(parse("  Hey there "), Command::Message { content: "Hey there".into() });
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("/chats"), Command::Chats);
        assert_eq!(parse("/more"), Command::More);
        assert_eq!(parse("/reconnect"), Command::Reconnect);
        assert_eq!(parse("/quit"), Command::Quit);
        assert_eq!(parse("/q"), Command::Quit);
    }

    #[test]
    fn select_takes_one_id() {
        assert_eq!(parse("/select 42"), Command::Select { chat_id: "42".into() });
        assert!(matches!(parse("/select"), Command::InvalidArgs { command: "select", .. }));
        assert!(matches!(parse("/select 1 2"), Command::InvalidArgs { command: "select", .. }));
    }

    #[test]
    fn create_splits_name_and_emails() {
        assert_eq!(parse("/create Weekend plans bob@x.io,eve@x.io"), Command::Create {
            name: "Weekend plans".into(),
            participant_emails: vec!["bob@x.io".into(), "eve@x.io".into()],
        });
        assert_eq!(parse("/create Team bob@x.io,,"), Command::Create {
            name: "Team".into(),
            participant_emails: vec!["bob@x.io".into()],
        });
        assert!(matches!(parse("/create"), Command::InvalidArgs { command: "create", .. }));
        assert!(matches!(parse("/create onlyname"), Command::InvalidArgs { command: "create", .. }));
    }

    #[test]
    fn unknown_command_keeps_input() {
        assert_eq!(parse("/dance now"), Command::Unknown { input: "/dance now".into() });
    }
}
