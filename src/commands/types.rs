//! Inbound message types and parsing.

use teloxide::types::{ChatId, Recipient, UserId};
use thiserror::Error;

use crate::telegram::TransportError;

/// Sender of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    /// Telegram user id.
    pub id: UserId,

    /// First name, used in greetings.
    pub first_name: String,
}

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command name without the leading slash or bot mention.
    pub name: String,

    /// Whitespace-separated arguments following the name.
    pub args: Vec<String>,

    /// Chat the command arrived from; replies go here.
    pub chat_id: ChatId,

    /// Sender, when the transport provides one.
    pub from: Option<UserRef>,
}

/// A plain text message without a command prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    /// Chat the message arrived from.
    pub chat_id: ChatId,

    /// Sender, when the transport provides one.
    pub from: Option<UserRef>,

    /// Message text, trimmed.
    pub text: String,
}

/// A routable inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Slash command addressed to this bot.
    Command(Command),

    /// Anything else with text content.
    Text(TextMessage),
}

impl Inbound {
    /// Parses an inbound message text.
    ///
    /// Text starting with `/` becomes a command; a `@mention` suffix on the
    /// command name is stripped when it names this bot, and commands
    /// addressed to a different bot return `None`. Anything else comes back
    /// as plain text.
    #[must_use]
    pub fn parse(
        text: &str,
        chat_id: ChatId,
        from: Option<UserRef>,
        bot_username: &str,
    ) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        let Some(rest) = trimmed.strip_prefix('/') else {
            return Some(Self::Text(TextMessage {
                chat_id,
                from,
                text: trimmed.to_owned(),
            }));
        };

        let mut parts = rest.split_whitespace();
        let head = parts.next()?;

        let name = match head.split_once('@') {
            Some((name, mention)) => {
                if !mention.eq_ignore_ascii_case(bot_username) {
                    // Addressed to another bot in the same chat.
                    return None;
                }
                name
            }
            None => head,
        };

        if name.is_empty() {
            return None;
        }

        let args: Vec<String> = parts.map(str::to_owned).collect();

        Some(Self::Command(Command {
            name: name.to_owned(),
            args,
            chat_id,
            from,
        }))
    }
}

/// Errors a command handler can produce.
///
/// Each variant maps to exactly one reply at the dispatch boundary.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Arguments missing or malformed; the reply is the usage line.
    #[error("{0}")]
    Usage(&'static str),

    /// Input rejected by validation.
    #[error("{0}")]
    Invalid(String),

    /// The transport refused an outbound send.
    #[error("failed to send {what}: {source}")]
    Send {
        what: &'static str,
        source: TransportError,
    },

    /// Unexpected failure inside a handler.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    /// Reply text shown to the user for this error.
    ///
    /// Internal failures get a generic line; everything else displays
    /// as-is.
    #[must_use]
    pub fn user_reply(&self) -> String {
        match self {
            Self::Internal(_) => "something went wrong, please try again later".to_owned(),
            other => other.to_string(),
        }
    }
}

/// Validates and normalizes a user-supplied recipient identifier.
///
/// A numeric identifier (negative included, as used for groups and
/// channels) becomes a chat id; any other non-empty string passes through
/// as a username for the transport to resolve or reject.
pub fn parse_recipient(raw: &str) -> Result<Recipient, HandlerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(HandlerError::Invalid(
            "recipient must not be empty".to_owned(),
        ));
    }

    match trimmed.parse::<i64>() {
        Ok(id) => Ok(Recipient::Id(ChatId(id))),
        Err(_) => Ok(Recipient::ChannelUsername(trimmed.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT_USERNAME: &str = "relay_bot";

    fn chat() -> ChatId {
        ChatId(100)
    }

    #[test]
    fn test_parse_plain_text() {
        let inbound = Inbound::parse("good morning", chat(), None, BOT_USERNAME);

        assert_eq!(
            inbound,
            Some(Inbound::Text(TextMessage {
                chat_id: chat(),
                from: None,
                text: "good morning".to_owned(),
            }))
        );
    }

    #[test]
    fn test_parse_command_with_args() {
        let inbound = Inbound::parse("/send_message 42 hello there", chat(), None, BOT_USERNAME);

        assert_eq!(
            inbound,
            Some(Inbound::Command(Command {
                name: "send_message".to_owned(),
                args: vec!["42".to_owned(), "hello".to_owned(), "there".to_owned()],
                chat_id: chat(),
                from: None,
            }))
        );
    }

    #[test]
    fn test_parse_command_without_args() {
        let inbound = Inbound::parse("/start", chat(), None, BOT_USERNAME);

        match inbound {
            Some(Inbound::Command(cmd)) => {
                assert_eq!(cmd.name, "start");
                assert!(cmd.args.is_empty());
            }
            other => panic!("expected a command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_strips_own_mention_case_insensitively() {
        let inbound = Inbound::parse("/timer@Relay_Bot 5 hi", chat(), None, BOT_USERNAME);

        match inbound {
            Some(Inbound::Command(cmd)) => {
                assert_eq!(cmd.name, "timer");
                assert_eq!(cmd.args, vec!["5".to_owned(), "hi".to_owned()]);
            }
            other => panic!("expected a command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_drops_commands_for_other_bots() {
        let inbound = Inbound::parse("/timer@other_bot 5 hi", chat(), None, BOT_USERNAME);
        assert_eq!(inbound, None);
    }

    #[test]
    fn test_parse_rejects_degenerate_input() {
        assert_eq!(Inbound::parse("", chat(), None, BOT_USERNAME), None);
        assert_eq!(Inbound::parse("   ", chat(), None, BOT_USERNAME), None);
        assert_eq!(Inbound::parse("/", chat(), None, BOT_USERNAME), None);
        assert_eq!(Inbound::parse("/@relay_bot", chat(), None, BOT_USERNAME), None);
    }

    #[test]
    fn test_parse_keeps_sender() {
        let user = UserRef {
            id: UserId(7),
            first_name: "Alice".to_owned(),
        };
        let inbound = Inbound::parse("/start", chat(), Some(user.clone()), BOT_USERNAME);

        match inbound {
            Some(Inbound::Command(cmd)) => assert_eq!(cmd.from, Some(user)),
            other => panic!("expected a command, got {other:?}"),
        }
    }

    #[test]
    fn test_recipient_numeric_becomes_chat_id() {
        assert_eq!(parse_recipient("42").unwrap(), Recipient::Id(ChatId(42)));
        assert_eq!(
            parse_recipient("-1001234567").unwrap(),
            Recipient::Id(ChatId(-1_001_234_567)),
        );
    }

    #[test]
    fn test_recipient_other_strings_pass_through() {
        assert_eq!(
            parse_recipient("@news_channel").unwrap(),
            Recipient::ChannelUsername("@news_channel".to_owned()),
        );
    }

    #[test]
    fn test_recipient_empty_is_rejected() {
        let err = parse_recipient("   ").unwrap_err();
        assert_eq!(err.user_reply(), "recipient must not be empty");
    }
}
