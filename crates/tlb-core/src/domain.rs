use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Chat id (numeric, Telegram-compatible).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

/// Message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i32);

/// Per-channel topic id. Allocated monotonically, never reused.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TopicId(pub u32);

impl std::fmt::Display for TopicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A stable reference to a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Per-chat bookkeeping record. Created lazily on the first topic add.
///
/// `next_topic_id` is strictly increasing; ids are never reclaimed, even
/// across deletions. `pinned_message_id` is the single pinned message the
/// synchronizer keeps consistent with the long list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub chat_id: ChatId,
    pub next_topic_id: u32,
    pub pinned_message_id: Option<MessageId>,
}

/// One discussion topic on a chat's long list. Keyed by (chat_id, topic_id).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub topic_id: TopicId,
    pub chat_id: ChatId,
    pub text: String,
    pub author: String,
    pub date: NaiveDate,
}

/// Membership edge marking a topic for immediate discussion.
///
/// Always references an existing `Topic` in the same chat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortlistEntry {
    pub chat_id: ChatId,
    pub topic_id: TopicId,
}

/// Pre-migration record: the whole long list as rendered strings, topic
/// number implied by 1-based position. Read once by the migrator, then
/// purged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyThemeInfo {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    #[serde(default)]
    pub tasks: Vec<String>,
}

/// Pre-migration shortlist: `id` is the 1-based position in the legacy task
/// list at the time of shortlisting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyShortList {
    pub chat_id: ChatId,
    #[serde(default)]
    pub topics: Vec<LegacyShortlistTopic>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyShortlistTopic {
    pub id: u32,
    pub text: String,
}
