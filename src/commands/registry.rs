//! Command routing table.

use std::collections::HashMap;

use futures::future::BoxFuture;

use super::handler::{self, RelayContext};
use super::types::{Command, HandlerError};

/// Outcome of a command handler: the reply text on success.
pub type HandlerResult = Result<String, HandlerError>;

/// Boxed future returned by command handlers.
pub type HandlerFuture<'a> = BoxFuture<'a, HandlerResult>;

/// A command handler function.
///
/// Handlers are plain functions; shared state rides in the context.
pub type Handler = for<'a> fn(&'a RelayContext, &'a Command) -> HandlerFuture<'a>;

/// Maps command names to their handlers.
///
/// Lookup is exact and case-sensitive.
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Handler>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in relay commands.
    #[must_use]
    pub fn with_default_commands() -> Self {
        let mut registry = Self::new();
        registry.register("start", handler::start);
        registry.register("send_message", handler::send_message);
        registry.register("send_photo", handler::send_photo);
        registry.register("send_document", handler::send_document);
        registry.register("send_media_group", handler::send_media_group);
        registry.register("timer", handler::timer);
        registry
    }

    /// Registers a handler, replacing any previous one under the same name.
    pub fn register(&mut self, name: &'static str, handler: Handler) {
        self.handlers.insert(name, handler);
    }

    /// Looks up a handler by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).copied()
    }

    /// Whether a handler is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Names of all registered commands, sorted.
    #[must_use]
    pub fn command_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.command_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use teloxide::types::ChatId;

    use crate::cache::LastMessageCache;
    use crate::scheduler::DeferredScheduler;
    use crate::telegram::mock::RecordingTransport;

    fn context() -> RelayContext {
        let transport = Arc::new(RecordingTransport::new());
        RelayContext {
            transport: transport.clone(),
            scheduler: DeferredScheduler::new(transport),
            last_messages: LastMessageCache::new(),
        }
    }

    #[test]
    fn test_default_commands_are_registered() {
        let registry = CommandRegistry::with_default_commands();

        assert_eq!(
            registry.command_names(),
            vec![
                "send_document",
                "send_media_group",
                "send_message",
                "send_photo",
                "start",
                "timer",
            ]
        );
    }

    #[test]
    fn test_lookup_is_exact_and_case_sensitive() {
        let registry = CommandRegistry::with_default_commands();

        assert!(registry.contains("send_message"));
        assert!(!registry.contains("SEND_MESSAGE"));
        assert!(!registry.contains("send_message "));
        assert!(!registry.contains("frobnicate"));
    }

    #[tokio::test]
    async fn test_registered_handler_is_invocable() {
        fn shout<'a>(_ctx: &'a RelayContext, cmd: &'a Command) -> HandlerFuture<'a> {
            Box::pin(async move { Ok(format!("heard {}", cmd.name)) })
        }

        let mut registry = CommandRegistry::new();
        registry.register("shout", shout);

        let cmd = Command {
            name: "shout".to_owned(),
            args: Vec::new(),
            chat_id: ChatId(1),
            from: None,
        };

        let handler = registry.get("shout").unwrap();
        let reply = handler(&context(), &cmd).await.unwrap();
        assert_eq!(reply, "heard shout");
    }

    #[test]
    fn test_register_replaces_existing_handler() {
        fn first<'a>(_ctx: &'a RelayContext, _cmd: &'a Command) -> HandlerFuture<'a> {
            Box::pin(async move { Ok("first".to_owned()) })
        }
        fn second<'a>(_ctx: &'a RelayContext, _cmd: &'a Command) -> HandlerFuture<'a> {
            Box::pin(async move { Ok("second".to_owned()) })
        }

        let mut registry = CommandRegistry::new();
        registry.register("cmd", first);
        registry.register("cmd", second);

        assert_eq!(registry.command_names(), vec!["cmd"]);
    }
}
