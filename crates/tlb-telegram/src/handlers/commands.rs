use std::sync::Arc;

use teloxide::prelude::*;
use tracing::error;

use tlb_core::{
    commands::Command,
    domain::{ChatId, MessageId},
    messaging::port::MessagingPort,
    service::{CommandContext, Reply},
    Error,
};

use crate::router::AppState;

const OK_MARK: &str = "\u{2714}\u{FE0F}";
const FAIL_MARK: &str = "\u{274C}";

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

fn author_display(msg: &Message) -> String {
    match msg.from() {
        Some(user) => user
            .username
            .clone()
            .unwrap_or_else(|| user.full_name()),
        None => "anonymous".to_string(),
    }
}

pub async fn handle_command(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let chat_id = ChatId(msg.chat.id.0);
    let message_id = MessageId(msg.id.0);
    let (cmd, args) = parse_command(text);
    let reply_text = msg.reply_to_message().and_then(|m| m.text());

    let command = match Command::parse(&cmd, &args, reply_text) {
        Ok(command) => command,
        Err(e) => {
            let _ = state
                .messenger
                .send_text(chat_id, &e.to_string(), Some(message_id))
                .await;
            return Ok(());
        }
    };

    let ctx = CommandContext {
        chat_id,
        author: author_display(&msg),
        message_id: Some(message_id),
    };

    match state.service.execute(&ctx, command).await {
        Ok(Reply::Ok) => {
            let _ = state
                .messenger
                .send_text(chat_id, OK_MARK, Some(message_id))
                .await;
        }
        Ok(Reply::Failed) => {
            let _ = state
                .messenger
                .send_text(chat_id, FAIL_MARK, Some(message_id))
                .await;
        }
        Ok(Reply::Text(body)) => {
            let _ = state.messenger.send_text(chat_id, &body, None).await;
        }
        Ok(Reply::Silent) => {}
        Err(e) => {
            if matches!(e, Error::Io(_) | Error::Json(_) | Error::Transport(_)) {
                error!(chat_id = chat_id.0, "command failed: {e}");
            }
            let _ = state
                .messenger
                .send_text(chat_id, &e.user_text(), Some(message_id))
                .await;
        }
    }

    Ok(())
}
