//! Closed command set.
//!
//! The transport adapter extracts a command name + argument string from the
//! incoming update; everything after that is an exhaustive match over these
//! variants instead of a string-keyed handler table.

use crate::domain::TopicId;

pub const HELP_TEXT: &str = "Supported commands:\n\
\n\
/addtopic <text> — add a topic to the long list (or reply to a message)\n\
/remove <id> — remove a topic from the long list by id\n\
/list — show the current long list\n\
/recreate — re-send and re-pin the long list message\n\
/shortlist — print the shortlist\n\
/shortlist add <id> — mark a topic for immediate discussion\n\
/shortlist remove <id> — unmark a topic\n\
/shortlist done — drop all shortlisted topics from the long list\n\
/export — dump the bot's database as a file\n\
/help — this message";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    AddTopic { text: String },
    Remove { topic_id: TopicId },
    List,
    Recreate,
    ShortlistAdd { topic_id: TopicId },
    ShortlistRemove { topic_id: TopicId },
    ShortlistPrint,
    ShortlistDone,
    Export,
    Help,
}

/// Rejected input. The `Display` text is what gets sent back to the chat.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Sorry, empty topic")]
    EmptyTopic,

    #[error("Provide me with one numeric topic id!")]
    BadTopicId,

    #[error("done does not accept any params")]
    DoneTakesNoArgs,

    #[error("Unknown subcommand: {0}")]
    UnknownSubcommand(String),

    #[error("Unknown command: /{0}")]
    UnknownCommand(String),
}

impl Command {
    /// Resolve a command name + argument string (and, for `/addtopic`, the
    /// text of the replied-to message, which takes precedence over inline
    /// arguments).
    pub fn parse(
        name: &str,
        args: &str,
        reply_text: Option<&str>,
    ) -> std::result::Result<Command, ParseError> {
        match name {
            "addtopic" => {
                let text = reply_text
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| args.trim());
                if text.is_empty() {
                    return Err(ParseError::EmptyTopic);
                }
                Ok(Command::AddTopic {
                    text: text.to_string(),
                })
            }
            "remove" => Ok(Command::Remove {
                topic_id: parse_topic_id(args)?,
            }),
            "list" => Ok(Command::List),
            "recreate" => Ok(Command::Recreate),
            "shortlist" => parse_shortlist(args),
            "export" => Ok(Command::Export),
            "help" | "start" => Ok(Command::Help),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

fn parse_shortlist(args: &str) -> std::result::Result<Command, ParseError> {
    let mut parts = args.trim().splitn(2, char::is_whitespace);
    let sub = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim();

    match sub {
        "" | "print" => Ok(Command::ShortlistPrint),
        "add" => Ok(Command::ShortlistAdd {
            topic_id: parse_topic_id(rest)?,
        }),
        "remove" => Ok(Command::ShortlistRemove {
            topic_id: parse_topic_id(rest)?,
        }),
        "done" => {
            if !rest.is_empty() {
                return Err(ParseError::DoneTakesNoArgs);
            }
            Ok(Command::ShortlistDone)
        }
        other => Err(ParseError::UnknownSubcommand(other.to_string())),
    }
}

/// Exactly one numeric argument.
fn parse_topic_id(args: &str) -> std::result::Result<TopicId, ParseError> {
    let mut parts = args.split_whitespace();
    let first = parts.next().ok_or(ParseError::BadTopicId)?;
    if parts.next().is_some() {
        return Err(ParseError::BadTopicId);
    }
    first
        .parse::<u32>()
        .map(TopicId)
        .map_err(|_| ParseError::BadTopicId)
}
