//! Application service: executes parsed commands against the store and keeps
//! the pinned message in sync.
//!
//! Mutations take a per-channel lock around the local read-modify-write; the
//! synchronizer's transport round trip runs after the lock is released, so a
//! slow edit on one chat never stalls another.

use std::{collections::HashMap, fs, path::PathBuf, sync::Arc};

use chrono::Local;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

use crate::{
    commands::{Command, HELP_TEXT},
    domain::{ChatId, MessageId},
    formatting::{render_long_list, render_topic_line},
    messaging::port::MessagingPort,
    registry, shortlist,
    store::Store,
    sync::{PinnedSynchronizer, SyncOutcome},
    Error, Result,
};

/// Who sent the command, and from which message.
#[derive(Clone, Debug)]
pub struct CommandContext {
    pub chat_id: ChatId,
    pub author: String,
    pub message_id: Option<MessageId>,
}

/// What the handler should send back for a finished command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Acknowledge with ✔️.
    Ok,
    /// Acknowledge with ❌ (the board may still have been repaired).
    Failed,
    Text(String),
    /// The command produced its own output (e.g. a document).
    Silent,
}

#[derive(Default)]
pub struct ChannelLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChannelLocks {
    pub async fn lock(&self, chat_id: ChatId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(chat_id.0)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

pub struct BoardService {
    store: Arc<Store>,
    messenger: Arc<dyn MessagingPort>,
    sync: PinnedSynchronizer,
    locks: ChannelLocks,
    temp_dir: PathBuf,
}

impl BoardService {
    pub fn new(
        store: Arc<Store>,
        messenger: Arc<dyn MessagingPort>,
        temp_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            sync: PinnedSynchronizer::new(messenger.clone()),
            messenger,
            locks: ChannelLocks::default(),
            temp_dir,
        }
    }

    pub async fn execute(&self, ctx: &CommandContext, cmd: Command) -> Result<Reply> {
        let chat_id = ctx.chat_id;
        match cmd {
            Command::AddTopic { text } => {
                {
                    let _guard = self.locks.lock(chat_id).await;
                    self.store.mutate(|data| {
                        Ok(registry::add_topic(
                            data,
                            chat_id,
                            &text,
                            &ctx.author,
                            Local::now().date_naive(),
                        ))
                    })?;
                }
                self.sync_reply(chat_id).await
            }

            Command::Remove { topic_id } => {
                {
                    let _guard = self.locks.lock(chat_id).await;
                    self.store
                        .mutate(|data| registry::remove_topic(data, chat_id, topic_id))?;
                }
                self.sync_reply(chat_id).await
            }

            Command::List => {
                let rendered = self
                    .store
                    .read(|data| render_long_list(&registry::list_topics(data, chat_id)));
                Ok(Reply::Text(rendered))
            }

            Command::Recreate => {
                let known = self.store.read(|data| data.channel(chat_id).is_some());
                if !known {
                    return Err(Error::UnsupportedChat);
                }
                self.sync.recreate(&self.store, chat_id).await?;
                Ok(Reply::Ok)
            }

            Command::ShortlistAdd { topic_id } => {
                let _guard = self.locks.lock(chat_id).await;
                self.store
                    .mutate(|data| shortlist::add(data, chat_id, topic_id))?;
                Ok(Reply::Ok)
            }

            Command::ShortlistRemove { topic_id } => {
                let _guard = self.locks.lock(chat_id).await;
                self.store
                    .mutate(|data| shortlist::remove(data, chat_id, topic_id))?;
                Ok(Reply::Ok)
            }

            Command::ShortlistPrint => {
                let topics = self.store.read(|data| shortlist::print(data, chat_id));
                if topics.is_empty() {
                    return Err(Error::EmptyShortlist);
                }
                let lines: Vec<String> = topics.iter().map(render_topic_line).collect();
                Ok(Reply::Text(lines.join("\n")))
            }

            Command::ShortlistDone => {
                {
                    let _guard = self.locks.lock(chat_id).await;
                    self.store
                        .mutate(|data| shortlist::finalize(data, chat_id))?;
                }
                self.sync_reply(chat_id).await
            }

            Command::Export => {
                let path = self.store.export_to(&self.temp_dir)?;
                let caption = format!("#dump from {}", Local::now().date_naive());
                let sent = self
                    .messenger
                    .send_document(chat_id, &path, &caption, ctx.message_id)
                    .await;
                let _ = fs::remove_file(&path);
                sent?;
                Ok(Reply::Silent)
            }

            Command::Help => Ok(Reply::Text(HELP_TEXT.to_string())),
        }
    }

    /// Run the synchronizer for a mutated channel and fold the outcome into
    /// the user-visible acknowledgement: a recreate-recovery or a failed
    /// sync both surface as ❌ while the registry mutation itself stands.
    async fn sync_reply(&self, chat_id: ChatId) -> Result<Reply> {
        match self.sync.sync(&self.store, chat_id).await {
            Ok(SyncOutcome::Created) | Ok(SyncOutcome::Edited) => Ok(Reply::Ok),
            Ok(SyncOutcome::Recreated) => Ok(Reply::Failed),
            Err(Error::SyncFailure(e)) => {
                warn!(chat_id = chat_id.0, "pinned message sync failed: {e}");
                Ok(Reply::Failed)
            }
            Err(e) => Err(e),
        }
    }
}
