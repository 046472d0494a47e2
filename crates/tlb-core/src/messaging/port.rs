use std::path::Path;

use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageId, MessageRef},
    Result,
};

/// Messaging port.
///
/// Telegram is the first implementation; the shape is the minimal set of
/// operations the core consumes: send/edit text, pin/unpin, and a document
/// upload for `/export`.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageRef>;

    async fn edit_text(&self, msg: MessageRef, text: &str) -> Result<()>;

    /// Pin with notifications disabled.
    async fn pin_message(&self, msg: MessageRef) -> Result<()>;

    async fn unpin_message(&self, msg: MessageRef) -> Result<()>;

    async fn send_document(
        &self,
        chat_id: ChatId,
        path: &Path,
        caption: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageRef>;
}
