//! Command dispatch and the built-in relay handlers.

use std::sync::Arc;
use std::time::Duration;

use teloxide::types::{ChatId, Recipient};
use tracing::{debug, error, warn};

use super::registry::{CommandRegistry, HandlerFuture};
use super::types::{Command, HandlerError, Inbound, TextMessage, UserRef, parse_recipient};
use crate::cache::LastMessageCache;
use crate::media::MediaItem;
use crate::scheduler::DeferredScheduler;
use crate::telegram::{MIN_MEDIA_GROUP_ITEMS, Transport};

/// Keyword that switches the echo fallback to the greeting reply.
const GREETING_KEYWORD: &str = "你好";

const USAGE_SEND_MESSAGE: &str = "usage: /send_message <recipient> <text>";
const USAGE_SEND_PHOTO: &str = "usage: /send_photo <recipient> <photo url or file id>";
const USAGE_SEND_DOCUMENT: &str = "usage: /send_document <recipient> <document url or file id>";
const USAGE_SEND_MEDIA_GROUP: &str = "usage: /send_media_group <recipient> <url> <url> ...";
const USAGE_TIMER: &str = "usage: /timer <delay seconds> <text>";

const INVALID_DELAY: &str = "must be a positive integer";
const NO_VALID_MEDIA: &str = "no valid media found";

/// Shared state handed to every command handler.
#[derive(Clone)]
pub struct RelayContext {
    /// Outbound transport for immediate sends.
    pub transport: Arc<dyn Transport>,

    /// Scheduler for deferred deliveries.
    pub scheduler: DeferredScheduler,

    /// Most recent plain-text message per user.
    pub last_messages: LastMessageCache,
}

/// Routes inbound messages to handlers and reports failures back to the
/// origin chat.
pub struct CommandDispatcher {
    registry: CommandRegistry,
    ctx: RelayContext,
}

impl CommandDispatcher {
    /// Creates a dispatcher over a registry and shared context.
    #[must_use]
    pub fn new(registry: CommandRegistry, ctx: RelayContext) -> Self {
        Self { registry, ctx }
    }

    /// Handles one inbound message end to end.
    pub async fn handle(&self, inbound: Inbound) {
        match inbound {
            Inbound::Command(cmd) => self.dispatch(cmd).await,
            Inbound::Text(text) => self.echo(text).await,
        }
    }

    /// Dispatches a parsed command to its registered handler.
    ///
    /// Unknown command names are dropped. Every handler outcome, success or
    /// failure, turns into exactly one reply to the origin chat.
    pub async fn dispatch(&self, cmd: Command) {
        let Some(handler) = self.registry.get(&cmd.name) else {
            debug!("Ignoring unknown command /{}", cmd.name);
            return;
        };

        debug!("Handling /{} with {} args", cmd.name, cmd.args.len());

        let reply = match handler(&self.ctx, &cmd).await {
            Ok(reply) => reply,
            Err(e) => {
                log_failure(&cmd, &e);
                e.user_reply()
            }
        };

        self.reply(cmd.chat_id, &reply).await;
    }

    /// Echo fallback for plain text.
    ///
    /// The text is cached per sender before any reply is attempted.
    async fn echo(&self, msg: TextMessage) {
        if let Some(ref user) = msg.from {
            self.ctx.last_messages.record(user.id, msg.text.clone());
        }

        let reply = if msg.text.contains(GREETING_KEYWORD) {
            "你好！很高兴为你服务。".to_owned()
        } else {
            format!("你发送的消息是：{}", msg.text)
        };

        self.reply(msg.chat_id, &reply).await;
    }

    /// Sends a reply to the origin chat, swallowing (but logging) failures.
    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self
            .ctx
            .transport
            .send_text(Recipient::Id(chat_id), text)
            .await
        {
            warn!("Failed to reply in chat {}: {}", chat_id, e);
        }
    }
}

/// Logs a handler failure at the level its class calls for.
fn log_failure(cmd: &Command, err: &HandlerError) {
    match err {
        HandlerError::Usage(_) | HandlerError::Invalid(_) => {
            debug!("Command /{} rejected: {}", cmd.name, err);
        }
        HandlerError::Send { .. } => {
            warn!("Command /{} failed: {}", cmd.name, err);
        }
        HandlerError::Internal(e) => {
            error!("Command /{} failed unexpectedly: {:?}", cmd.name, e);
        }
    }
}

/// `/start`: localized greeting naming the invoking user.
pub(crate) fn start<'a>(_ctx: &'a RelayContext, cmd: &'a Command) -> HandlerFuture<'a> {
    Box::pin(async move {
        let reply = match cmd.from {
            Some(UserRef { ref first_name, .. }) => {
                format!("嗨，{first_name}！我是一个可以接收和发送消息的机器人，可以用于定时消息推送、关键词回复等场景。")
            }
            None => "嗨！我是一个可以接收和发送消息的机器人，可以用于定时消息推送、关键词回复等场景。".to_owned(),
        };
        Ok(reply)
    })
}

/// `/send_message <recipient> <text>`: relays text to another chat.
pub(crate) fn send_message<'a>(ctx: &'a RelayContext, cmd: &'a Command) -> HandlerFuture<'a> {
    Box::pin(async move {
        if cmd.args.len() < 2 {
            return Err(HandlerError::Usage(USAGE_SEND_MESSAGE));
        }

        let recipient = parse_recipient(&cmd.args[0])?;
        let text = cmd.args[1..].join(" ");

        ctx.transport
            .send_text(recipient, &text)
            .await
            .map_err(|e| HandlerError::Send {
                what: "message",
                source: e,
            })?;

        Ok(format!("message sent to user {}", cmd.args[0]))
    })
}

/// `/send_photo <recipient> <url or file id>`: relays a single photo.
pub(crate) fn send_photo<'a>(ctx: &'a RelayContext, cmd: &'a Command) -> HandlerFuture<'a> {
    Box::pin(async move {
        if cmd.args.len() < 2 {
            return Err(HandlerError::Usage(USAGE_SEND_PHOTO));
        }

        let recipient = parse_recipient(&cmd.args[0])?;

        ctx.transport
            .send_photo(recipient, &cmd.args[1])
            .await
            .map_err(|e| HandlerError::Send {
                what: "photo",
                source: e,
            })?;

        Ok(format!("photo sent to user {}", cmd.args[0]))
    })
}

/// `/send_document <recipient> <url or file id>`: relays a single document.
pub(crate) fn send_document<'a>(ctx: &'a RelayContext, cmd: &'a Command) -> HandlerFuture<'a> {
    Box::pin(async move {
        if cmd.args.len() < 2 {
            return Err(HandlerError::Usage(USAGE_SEND_DOCUMENT));
        }

        let recipient = parse_recipient(&cmd.args[0])?;

        ctx.transport
            .send_document(recipient, &cmd.args[1])
            .await
            .map_err(|e| HandlerError::Send {
                what: "document",
                source: e,
            })?;

        Ok(format!("document sent to user {}", cmd.args[0]))
    })
}

/// `/send_media_group <recipient> <url...>`: relays several media as one
/// ordered batch.
pub(crate) fn send_media_group<'a>(ctx: &'a RelayContext, cmd: &'a Command) -> HandlerFuture<'a> {
    Box::pin(async move {
        if cmd.args.len() < 2 {
            return Err(HandlerError::Usage(USAGE_SEND_MEDIA_GROUP));
        }

        let recipient = parse_recipient(&cmd.args[0])?;
        let items: Vec<MediaItem> = cmd.args[1..]
            .iter()
            .map(|url| MediaItem::from_url(url.as_str()))
            .collect();

        // The transport refuses batches below its minimum; report that
        // here instead of sending a doomed request.
        if items.len() < MIN_MEDIA_GROUP_ITEMS {
            return Err(HandlerError::Invalid(NO_VALID_MEDIA.to_owned()));
        }

        ctx.transport
            .send_media_group(recipient, items)
            .await
            .map_err(|e| HandlerError::Send {
                what: "media group",
                source: e,
            })?;

        Ok(format!("media group sent to user {}", cmd.args[0]))
    })
}

/// `/timer <delay seconds> <text>`: schedules text for deferred delivery
/// back to the origin chat.
pub(crate) fn timer<'a>(ctx: &'a RelayContext, cmd: &'a Command) -> HandlerFuture<'a> {
    Box::pin(async move {
        // A u64 parse rejects negatives along with everything non-numeric.
        let delay_secs: u64 = cmd
            .args
            .first()
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| HandlerError::Invalid(INVALID_DELAY.to_owned()))?;

        if cmd.args.len() < 2 {
            return Err(HandlerError::Usage(USAGE_TIMER));
        }

        let payload = cmd.args[1..].join(" ");
        let id = ctx
            .scheduler
            .schedule(Duration::from_secs(delay_secs), cmd.chat_id, payload);
        debug!("Timer task {} armed for chat {}", id, cmd.chat_id);

        Ok(format!("scheduled, will fire in {delay_secs} seconds"))
    })
}
