//! Topic registry: per-channel id allocation and CRUD over `Topic` records.
//!
//! All functions operate on `StoreData` and are called inside a single
//! `Store::mutate`/`read`, which is what makes each operation atomic with
//! respect to same-channel readers.

use chrono::NaiveDate;

use crate::{
    domain::{Channel, ChatId, Topic, TopicId},
    store::StoreData,
    Error, Result,
};

/// Allocate the next topic id for a channel.
///
/// Creates the `Channel` record on first use (`next_topic_id = 2`, returning
/// 1). Ids are strictly increasing and never reclaimed after deletion.
pub fn allocate(data: &mut StoreData, chat_id: ChatId) -> TopicId {
    match data.channel_mut(chat_id) {
        Some(channel) => {
            let id = channel.next_topic_id;
            channel.next_topic_id += 1;
            TopicId(id)
        }
        None => {
            data.channels.push(Channel {
                chat_id,
                next_topic_id: 2,
                pinned_message_id: None,
            });
            TopicId(1)
        }
    }
}

/// Insert a new topic. Non-empty text is guaranteed by the command layer.
pub fn add_topic(
    data: &mut StoreData,
    chat_id: ChatId,
    text: &str,
    author: &str,
    date: NaiveDate,
) -> Topic {
    let topic = Topic {
        topic_id: allocate(data, chat_id),
        chat_id,
        text: text.to_string(),
        author: author.to_string(),
        date,
    };
    data.topics.push(topic.clone());
    topic
}

/// Remove a topic from the long list.
///
/// Refuses with `StillShortlisted` while a shortlist entry references the
/// topic; the user has to take it off the shortlist first. The only path
/// that removes both together is `shortlist::finalize`.
pub fn remove_topic(data: &mut StoreData, chat_id: ChatId, topic_id: TopicId) -> Result<()> {
    if !data
        .topics
        .iter()
        .any(|t| t.chat_id == chat_id && t.topic_id == topic_id)
    {
        return Err(Error::NotFound(topic_id));
    }
    if data
        .shortlist
        .iter()
        .any(|e| e.chat_id == chat_id && e.topic_id == topic_id)
    {
        return Err(Error::StillShortlisted(topic_id));
    }

    data.topics
        .retain(|t| !(t.chat_id == chat_id && t.topic_id == topic_id));
    Ok(())
}

/// The channel's long list, ascending by topic id. This ordering is the
/// numbered list users reference in `/remove` and `/shortlist`.
pub fn list_topics(data: &StoreData, chat_id: ChatId) -> Vec<Topic> {
    let mut topics: Vec<Topic> = data
        .topics
        .iter()
        .filter(|t| t.chat_id == chat_id)
        .cloned()
        .collect();
    topics.sort_by_key(|t| t.topic_id);
    topics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShortlistEntry;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
    }

    #[test]
    fn allocator_counts_from_one_per_channel() {
        let mut data = StoreData::default();
        for expected in 1..=5u32 {
            assert_eq!(allocate(&mut data, ChatId(10)), TopicId(expected));
        }
        // Another channel starts over at 1.
        assert_eq!(allocate(&mut data, ChatId(20)), TopicId(1));
        assert_eq!(allocate(&mut data, ChatId(20)), TopicId(2));
        assert_eq!(data.channel(ChatId(10)).unwrap().next_topic_id, 6);
    }

    #[test]
    fn ids_are_never_reused_after_removal() {
        let mut data = StoreData::default();
        let a = add_topic(&mut data, ChatId(1), "a", "alice", date());
        let b = add_topic(&mut data, ChatId(1), "b", "bob", date());
        remove_topic(&mut data, ChatId(1), b.topic_id).unwrap();
        remove_topic(&mut data, ChatId(1), a.topic_id).unwrap();

        let c = add_topic(&mut data, ChatId(1), "c", "carol", date());
        assert_eq!(c.topic_id, TopicId(3));
    }

    #[test]
    fn list_is_ascending_by_id() {
        let mut data = StoreData::default();
        for text in ["a", "b", "c"] {
            add_topic(&mut data, ChatId(1), text, "alice", date());
        }
        remove_topic(&mut data, ChatId(1), TopicId(2)).unwrap();
        add_topic(&mut data, ChatId(1), "d", "alice", date());

        let ids: Vec<u32> = list_topics(&data, ChatId(1))
            .iter()
            .map(|t| t.topic_id.0)
            .collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn list_is_scoped_to_the_channel() {
        let mut data = StoreData::default();
        add_topic(&mut data, ChatId(1), "ours", "alice", date());
        add_topic(&mut data, ChatId(2), "theirs", "bob", date());

        let topics = list_topics(&data, ChatId(1));
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].text, "ours");
    }

    #[test]
    fn remove_unknown_topic_is_not_found() {
        let mut data = StoreData::default();
        add_topic(&mut data, ChatId(1), "a", "alice", date());
        let err = remove_topic(&mut data, ChatId(1), TopicId(9)).unwrap_err();
        assert!(matches!(err, Error::NotFound(TopicId(9))));
    }

    #[test]
    fn remove_shortlisted_topic_is_rejected_and_leaves_both_records() {
        let mut data = StoreData::default();
        let t = add_topic(&mut data, ChatId(1), "a", "alice", date());
        data.shortlist.push(ShortlistEntry {
            chat_id: ChatId(1),
            topic_id: t.topic_id,
        });

        let err = remove_topic(&mut data, ChatId(1), t.topic_id).unwrap_err();
        assert!(matches!(err, Error::StillShortlisted(_)));
        assert_eq!(data.topics.len(), 1);
        assert_eq!(data.shortlist.len(), 1);
    }
}
