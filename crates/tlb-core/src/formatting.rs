//! Rendering of topic lists into chat text.
//!
//! The line shape is load-bearing: the migrator parses the legacy variant of
//! it back into fields, and the pinned message must display exactly this
//! rendering after every list mutation.

use crate::domain::Topic;

/// Fixed text shown when a channel's long list is empty.
pub const NO_TOPICS_PLACEHOLDER: &str = "No topics yet ¯\\_(ツ)_/¯";

pub fn render_topic_line(topic: &Topic) -> String {
    format!(
        "{}. \u{1F4CC} {}: {} | by {}",
        topic.topic_id, topic.date, topic.text, topic.author
    )
}

/// The long list as a single message body.
pub fn render_long_list(topics: &[Topic]) -> String {
    if topics.is_empty() {
        return NO_TOPICS_PLACEHOLDER.to_string();
    }
    topics
        .iter()
        .map(render_topic_line)
        .collect::<Vec<_>>()
        .join("\n")
}
