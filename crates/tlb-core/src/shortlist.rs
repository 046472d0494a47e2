//! Shortlist manager: membership edges over topics, plus the `done`
//! finalization that removes shortlisted topics from the long list.

use crate::{
    domain::{ChatId, ShortlistEntry, Topic, TopicId},
    store::StoreData,
    Error, Result,
};

/// Add a topic to the channel's shortlist.
///
/// Rejects orphans: the topic must exist in the registry for this channel.
pub fn add(data: &mut StoreData, chat_id: ChatId, topic_id: TopicId) -> Result<()> {
    if !data
        .topics
        .iter()
        .any(|t| t.chat_id == chat_id && t.topic_id == topic_id)
    {
        return Err(Error::UnknownTopic(topic_id));
    }
    if data
        .shortlist
        .iter()
        .any(|e| e.chat_id == chat_id && e.topic_id == topic_id)
    {
        return Err(Error::AlreadyShortlisted(topic_id));
    }

    data.shortlist.push(ShortlistEntry { chat_id, topic_id });
    Ok(())
}

pub fn remove(data: &mut StoreData, chat_id: ChatId, topic_id: TopicId) -> Result<()> {
    if !data
        .shortlist
        .iter()
        .any(|e| e.chat_id == chat_id && e.topic_id == topic_id)
    {
        return Err(Error::NotShortlisted(topic_id));
    }

    data.shortlist
        .retain(|e| !(e.chat_id == chat_id && e.topic_id == topic_id));
    Ok(())
}

/// The shortlisted topics resolved against the registry, ascending by id.
pub fn print(data: &StoreData, chat_id: ChatId) -> Vec<Topic> {
    let mut topics: Vec<Topic> = data
        .topics
        .iter()
        .filter(|t| {
            t.chat_id == chat_id
                && data
                    .shortlist
                    .iter()
                    .any(|e| e.chat_id == chat_id && e.topic_id == t.topic_id)
        })
        .cloned()
        .collect();
    topics.sort_by_key(|t| t.topic_id);
    topics
}

/// "Done": delete every shortlisted topic from the long list and clear the
/// shortlist, in one step. This intentionally bypasses the
/// `StillShortlisted` guard in `registry::remove_topic` — the intent is
/// explicit here. Returns the removed topic ids.
pub fn finalize(data: &mut StoreData, chat_id: ChatId) -> Result<Vec<TopicId>> {
    let removed: Vec<TopicId> = data
        .shortlist
        .iter()
        .filter(|e| e.chat_id == chat_id)
        .map(|e| e.topic_id)
        .collect();
    if removed.is_empty() {
        return Err(Error::EmptyShortlist);
    }

    data.topics
        .retain(|t| t.chat_id != chat_id || !removed.contains(&t.topic_id));
    data.shortlist.retain(|e| e.chat_id != chat_id);
    Ok(removed)
}
