//! Update routing and dispatcher setup.
//!
//! Wires incoming Telegram updates into the command dispatcher. Only
//! message updates carry commands or relayable text, so the handler
//! tree filters everything else out up front.

use std::sync::Arc;

use anyhow::Result;
use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use tracing::{debug, info};

use crate::commands::{CommandDispatcher, Inbound, UserRef};
use crate::telegram::ThrottledBot;

/// Identity of the running bot, resolved once at startup.
///
/// The username is needed to strip `@mention` suffixes from commands
/// addressed to this bot in group chats.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    /// Bot username without the leading `@`.
    pub username: String,
}

/// Builds the update handler tree.
fn schema() -> UpdateHandler<anyhow::Error> {
    Update::filter_message().endpoint(on_message)
}

/// Handles a single incoming message.
async fn on_message(
    msg: Message,
    dispatcher: Arc<CommandDispatcher>,
    identity: BotIdentity,
) -> Result<()> {
    let Some(text) = msg.text() else {
        debug!("Ignoring non-text message in chat {}", msg.chat.id);
        return Ok(());
    };

    let from = msg.from.as_ref().map(|user| UserRef {
        id: user.id,
        first_name: user.first_name.clone(),
    });

    let Some(inbound) = Inbound::parse(text, msg.chat.id, from, &identity.username) else {
        return Ok(());
    };

    dispatcher.handle(inbound).await;
    Ok(())
}

/// Runs the bot until shutdown.
///
/// Blocks on long polling and returns when the dispatcher stops
/// (e.g. on Ctrl-C).
pub async fn run(bot: ThrottledBot, dispatcher: Arc<CommandDispatcher>, identity: BotIdentity) {
    info!("Starting update dispatcher as @{}", identity.username);

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![dispatcher, identity])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
