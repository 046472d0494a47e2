use crate::domain::TopicId;

/// Core error type.
///
/// Domain failures carry enough context to render a user-facing reply;
/// adapter crates map their transport errors into `Transport` so the core
/// can handle failures consistently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no topic {0} in this chat")]
    NotFound(TopicId),

    #[error("no channel record for this chat")]
    UnsupportedChat,

    #[error("topic {0} is already shortlisted")]
    AlreadyShortlisted(TopicId),

    #[error("topic {0} is not shortlisted")]
    NotShortlisted(TopicId),

    #[error("unknown topic {0}")]
    UnknownTopic(TopicId),

    #[error("topic {0} is still shortlisted")]
    StillShortlisted(TopicId),

    #[error("shortlist is empty")]
    EmptyShortlist,

    #[error("pinned message sync failed: {0}")]
    SyncFailure(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Short reply shown in the chat when a command fails.
    pub fn user_text(&self) -> String {
        match self {
            Error::NotFound(id) => format!("No topic {id} in this chat (╯°□°)╯︵ ┻━┻"),
            Error::UnsupportedChat => "Unsupported chat! (╯°□°)╯︵ ┻━┻".to_string(),
            Error::AlreadyShortlisted(id) => {
                format!("Topic {id} is already in the shortlist")
            }
            Error::NotShortlisted(id) => format!("Topic {id} is not in the shortlist"),
            Error::UnknownTopic(id) => {
                format!("Incorrect topic id! The long list has no topic {id}")
            }
            Error::StillShortlisted(id) => format!(
                "Topic {id} is in the shortlist, /shortlist remove {id} first"
            ),
            Error::EmptyShortlist => "No shortlist yet!".to_string(),
            Error::SyncFailure(_) => "Failed to update the pinned message".to_string(),
            Error::Config(_) | Error::Io(_) | Error::Json(_) | Error::Transport(_) => {
                "Something went wrong (╯°□°)╯︵ ┻━┻".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
