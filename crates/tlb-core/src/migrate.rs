//! One-shot schema migration from the legacy embedded-list records to the
//! normalized Channel/Topic/ShortlistEntry collections.
//!
//! Legacy `ThemeInfo` held the whole long list as rendered strings, with the
//! topic number implied by 1-based position; the legacy shortlist referenced
//! topics by that position. Migration parses each task string back into its
//! fields, assigns the positional id as the real topic id, and purges the
//! legacy records. With nothing left to migrate it is a no-op, so running it
//! on every start is safe.

use chrono::{Local, NaiveDate};
use regex::Regex;
use tracing::{info, warn};

use crate::{
    domain::{Channel, ChatId, ShortlistEntry, Topic, TopicId},
    store::{Store, StoreData},
    Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub channels: usize,
    pub topics: usize,
    pub shortlisted: usize,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.channels == 0 && self.topics == 0 && self.shortlisted == 0
    }
}

/// Run the migration. Called once at startup, before any command is served.
pub fn run(store: &Store) -> Result<MigrationReport> {
    let report = store.mutate(|data| Ok(migrate_data(data)))?;
    if !report.is_noop() {
        info!(
            channels = report.channels,
            topics = report.topics,
            shortlisted = report.shortlisted,
            "migrated legacy store records"
        );
    }
    Ok(report)
}

fn migrate_data(data: &mut StoreData) -> MigrationReport {
    let mut report = MigrationReport::default();
    let today = Local::now().date_naive();

    let themes = std::mem::take(&mut data.legacy_themes);
    for theme in themes {
        if data.channel(theme.chat_id).is_some() {
            // A normalized channel already exists; never clobber it.
            warn!(chat_id = theme.chat_id.0, "legacy record for an already-migrated chat, dropping");
            continue;
        }

        let task_count = theme.tasks.len() as u32;
        for (idx, raw) in theme.tasks.iter().enumerate() {
            // Topic id is the 1-based position in the legacy list; that is
            // what the legacy shortlist references.
            let topic_id = TopicId(idx as u32 + 1);
            let (date, text, author) = match parse_task_line(raw) {
                Some(parsed) => parsed,
                None => {
                    warn!(
                        chat_id = theme.chat_id.0,
                        task = raw.as_str(),
                        "unparseable legacy task, keeping raw text"
                    );
                    (today, raw.clone(), "unknown".to_string())
                }
            };
            data.topics.push(Topic {
                topic_id,
                chat_id: theme.chat_id,
                text,
                author,
                date,
            });
            report.topics += 1;
        }

        data.channels.push(Channel {
            chat_id: theme.chat_id,
            next_topic_id: task_count + 1,
            pinned_message_id: Some(theme.message_id),
        });
        report.channels += 1;
    }

    let shortlists = std::mem::take(&mut data.legacy_shortlists);
    for shortlist in shortlists {
        for entry in shortlist.topics {
            let topic_id = TopicId(entry.id);
            let exists = data
                .topics
                .iter()
                .any(|t| t.chat_id == shortlist.chat_id && t.topic_id == topic_id);
            if !exists {
                // Position-based legacy ids can dangle if the long list was
                // reordered before migration; dropping beats inventing a
                // topic the user never saw.
                warn!(
                    chat_id = shortlist.chat_id.0,
                    id = entry.id,
                    "legacy shortlist entry references no migrated topic, dropping"
                );
                continue;
            }
            let duplicate = data
                .shortlist
                .iter()
                .any(|e| e.chat_id == shortlist.chat_id && e.topic_id == topic_id);
            if duplicate {
                continue;
            }
            data.shortlist.push(ShortlistEntry {
                chat_id: shortlist.chat_id,
                topic_id,
            });
            report.shortlisted += 1;
        }
    }

    report
}

/// Parse a legacy task string: date between the pin glyph and the colon
/// (tolerating the old `_..._` italics), text between colon and pipe, author
/// after "by".
fn parse_task_line(raw: &str) -> Option<(NaiveDate, String, String)> {
    let re = Regex::new(r"^\u{1F4CC}\s*(.+?)\s*:\s*(.*\S)\s*\|\s*by\s+(.+?)\s*$")
        .expect("valid regex");
    let caps = re.captures(raw.trim())?;

    let date_part = caps[1].trim_matches('_').trim();
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    Some((date, caps[2].to_string(), caps[3].to_string()))
}
