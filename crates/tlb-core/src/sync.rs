//! Pinned-message synchronizer.
//!
//! Per channel the pinned message is either absent (Unpinned) or recorded on
//! the `Channel` record (Pinned). After every long-list mutation the message
//! is brought back in line with the current rendering: edit in place when
//! possible, recreate when the edit fails (message deleted externally, edit
//! window expired). The transport round trip happens outside any store lock;
//! the recorded id only changes once the outcome of the external call is
//! known.

use std::sync::Arc;

use tracing::warn;

use crate::{
    domain::{ChatId, MessageRef},
    formatting::render_long_list,
    messaging::port::MessagingPort,
    registry,
    store::Store,
    Error, Result,
};

/// How the pinned message was brought in line with the list.
///
/// `Recreated` means the in-place edit failed and a fresh message was pinned
/// instead; the triggering command is reported as failed so the user knows
/// the edit's direct effect did not happen, even though the board is
/// consistent again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Edited,
    Recreated,
}

pub struct PinnedSynchronizer {
    messenger: Arc<dyn MessagingPort>,
}

impl PinnedSynchronizer {
    pub fn new(messenger: Arc<dyn MessagingPort>) -> Self {
        Self { messenger }
    }

    /// Reconcile the pinned message with the current long list.
    pub async fn sync(&self, store: &Store, chat_id: ChatId) -> Result<SyncOutcome> {
        let (rendered, pinned) = snapshot(store, chat_id);

        let Some(pinned) = pinned else {
            self.create_pinned(store, chat_id, &rendered).await?;
            return Ok(SyncOutcome::Created);
        };

        match self.messenger.edit_text(pinned, &rendered).await {
            Ok(()) => {
                // Re-pin to refresh the chat's notification state.
                let _ = self.messenger.pin_message(pinned).await;
                Ok(SyncOutcome::Edited)
            }
            Err(e) => {
                warn!(
                    chat_id = chat_id.0,
                    message_id = pinned.message_id.0,
                    "pinned message edit failed, recreating: {e}"
                );
                let _ = self.messenger.unpin_message(pinned).await;
                self.create_pinned(store, chat_id, &rendered).await?;
                Ok(SyncOutcome::Recreated)
            }
        }
    }

    /// `/recreate`: unconditionally send and pin a fresh message, regardless
    /// of whatever id is currently recorded. Manual recovery tool for when
    /// the bot's notion of the pinned message has drifted from reality.
    pub async fn recreate(&self, store: &Store, chat_id: ChatId) -> Result<MessageRef> {
        let (rendered, _) = snapshot(store, chat_id);
        self.create_pinned(store, chat_id, &rendered).await
    }

    async fn create_pinned(
        &self,
        store: &Store,
        chat_id: ChatId,
        rendered: &str,
    ) -> Result<MessageRef> {
        let msg = self
            .messenger
            .send_text(chat_id, rendered, None)
            .await
            .map_err(|e| Error::SyncFailure(e.to_string()))?;
        self.messenger
            .pin_message(msg)
            .await
            .map_err(|e| Error::SyncFailure(e.to_string()))?;

        // Commit the transition only now that the external calls succeeded.
        store.mutate(|data| {
            if let Some(channel) = data.channel_mut(chat_id) {
                channel.pinned_message_id = Some(msg.message_id);
            }
            Ok(())
        })?;
        Ok(msg)
    }
}

fn snapshot(store: &Store, chat_id: ChatId) -> (String, Option<MessageRef>) {
    store.read(|data| {
        let rendered = render_long_list(&registry::list_topics(data, chat_id));
        let pinned = data
            .channel(chat_id)
            .and_then(|c| c.pinned_message_id)
            .map(|message_id| MessageRef {
                chat_id,
                message_id,
            });
        (rendered, pinned)
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{ChatId, MessageId, MessageRef};
    use crate::store::tests::tmp_store;
    use crate::{registry, Error};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct FakeMessenger {
        pub sent: Mutex<Vec<(ChatId, String, Option<MessageId>)>>,
        pub edits: Mutex<Vec<(MessageRef, String)>>,
        pub pins: Mutex<Vec<MessageRef>>,
        pub unpins: Mutex<Vec<MessageRef>>,
        pub documents: Mutex<Vec<(ChatId, String, String)>>,
        pub fail_send: AtomicBool,
        pub fail_edit: AtomicBool,
        pub next_id: AtomicI32,
    }

    impl FakeMessenger {
        pub fn new() -> Self {
            let fake = Self::default();
            fake.next_id.store(100, Ordering::SeqCst);
            fake
        }
    }

    #[async_trait]
    impl MessagingPort for FakeMessenger {
        async fn send_text(
            &self,
            chat_id: ChatId,
            text: &str,
            reply_to: Option<MessageId>,
        ) -> crate::Result<MessageRef> {
            if self.fail_send.load(Ordering::SeqCst) {
                return Err(Error::Transport("send refused".to_string()));
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.sent
                .lock()
                .unwrap()
                .push((chat_id, text.to_string(), reply_to));
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(id),
            })
        }

        async fn edit_text(&self, msg: MessageRef, text: &str) -> crate::Result<()> {
            if self.fail_edit.load(Ordering::SeqCst) {
                return Err(Error::Transport("message to edit not found".to_string()));
            }
            self.edits.lock().unwrap().push((msg, text.to_string()));
            Ok(())
        }

        async fn pin_message(&self, msg: MessageRef) -> crate::Result<()> {
            self.pins.lock().unwrap().push(msg);
            Ok(())
        }

        async fn unpin_message(&self, msg: MessageRef) -> crate::Result<()> {
            self.unpins.lock().unwrap().push(msg);
            Ok(())
        }

        async fn send_document(
            &self,
            chat_id: ChatId,
            path: &Path,
            caption: &str,
            _reply_to: Option<MessageId>,
        ) -> crate::Result<MessageRef> {
            self.documents.lock().unwrap().push((
                chat_id,
                path.display().to_string(),
                caption.to_string(),
            ));
            Ok(MessageRef {
                chat_id,
                message_id: MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            })
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()
    }

    fn seeded_store(prefix: &str, texts: &[&str]) -> crate::store::Store {
        let store = tmp_store(prefix);
        store
            .mutate(|d| {
                for text in texts {
                    registry::add_topic(d, ChatId(1), text, "Alice", date());
                }
                Ok(())
            })
            .unwrap();
        store
    }

    fn pinned_id(store: &crate::store::Store) -> Option<MessageId> {
        store.read(|d| d.channel(ChatId(1)).and_then(|c| c.pinned_message_id))
    }

    #[tokio::test]
    async fn first_sync_creates_and_pins() {
        let store = seeded_store("tlb-sync-create", &["Buy milk"]);
        let fake = Arc::new(FakeMessenger::new());
        let sync = PinnedSynchronizer::new(fake.clone());

        let outcome = sync.sync(&store, ChatId(1)).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Created);

        let sent = fake.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "1. \u{1F4CC} 2021-01-01: Buy milk | by Alice");

        let recorded = pinned_id(&store).unwrap();
        assert_eq!(fake.pins.lock().unwrap()[0].message_id, recorded);
    }

    #[tokio::test]
    async fn pinned_sync_edits_in_place_and_repins() {
        let store = seeded_store("tlb-sync-edit", &["a", "b"]);
        let fake = Arc::new(FakeMessenger::new());
        let sync = PinnedSynchronizer::new(fake.clone());
        sync.sync(&store, ChatId(1)).await.unwrap();
        let first = pinned_id(&store).unwrap();

        let outcome = sync.sync(&store, ChatId(1)).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Edited);
        assert_eq!(pinned_id(&store).unwrap(), first);

        let edits = fake.edits.lock().unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].0.message_id, first);
        // Re-pinned after the successful edit.
        assert_eq!(fake.pins.lock().unwrap().last().unwrap().message_id, first);
    }

    #[tokio::test]
    async fn edit_failure_recovers_by_recreating() {
        let store = seeded_store("tlb-sync-recover", &["a"]);
        let fake = Arc::new(FakeMessenger::new());
        let sync = PinnedSynchronizer::new(fake.clone());
        sync.sync(&store, ChatId(1)).await.unwrap();
        let original = pinned_id(&store).unwrap();

        fake.fail_edit.store(true, Ordering::SeqCst);
        let outcome = sync.sync(&store, ChatId(1)).await.unwrap();
        assert_eq!(outcome, SyncOutcome::Recreated);

        let recorded = pinned_id(&store).unwrap();
        assert_ne!(recorded, original);
        // The stale message was unpinned and the replacement carries the text
        // the edit attempted to apply.
        assert_eq!(fake.unpins.lock().unwrap()[0].message_id, original);
        let sent = fake.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].1, "1. \u{1F4CC} 2021-01-01: a | by Alice");
    }

    #[tokio::test]
    async fn send_failure_leaves_state_unpinned() {
        let store = seeded_store("tlb-sync-sendfail", &["a"]);
        let fake = Arc::new(FakeMessenger::new());
        fake.fail_send.store(true, Ordering::SeqCst);
        let sync = PinnedSynchronizer::new(fake.clone());

        let err = sync.sync(&store, ChatId(1)).await.unwrap_err();
        assert!(matches!(err, Error::SyncFailure(_)));
        assert_eq!(pinned_id(&store), None);
    }

    #[tokio::test]
    async fn recreate_replaces_the_recorded_message_unconditionally() {
        let store = seeded_store("tlb-sync-recreate", &["a"]);
        let fake = Arc::new(FakeMessenger::new());
        let sync = PinnedSynchronizer::new(fake.clone());
        sync.sync(&store, ChatId(1)).await.unwrap();
        let original = pinned_id(&store).unwrap();

        sync.recreate(&store, ChatId(1)).await.unwrap();
        assert_ne!(pinned_id(&store).unwrap(), original);
        // Recreate never edits, it always sends fresh.
        assert!(fake.edits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_list_syncs_the_placeholder() {
        let store = tmp_store("tlb-sync-placeholder");
        store
            .mutate(|d| {
                let t = registry::add_topic(d, ChatId(1), "only", "Alice", date());
                registry::remove_topic(d, ChatId(1), t.topic_id)
            })
            .unwrap();

        let fake = Arc::new(FakeMessenger::new());
        let sync = PinnedSynchronizer::new(fake.clone());
        sync.sync(&store, ChatId(1)).await.unwrap();

        assert_eq!(
            fake.sent.lock().unwrap()[0].1,
            crate::formatting::NO_TOPICS_PLACEHOLDER
        );
    }
}
