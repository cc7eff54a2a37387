//! Message Relay Bot Library
//!
//! A Telegram bot for command-driven message relay and deferred delivery.
//!
//! This crate provides the core functionality for:
//! - Parsing slash commands and plain text from incoming messages
//! - Relaying text, photos, documents, and media groups to recipients
//! - Scheduling messages for deferred delivery back to the requester
//! - Echoing and caching the last plain-text message per sender

pub mod bot;
pub mod cache;
pub mod commands;
pub mod config;
pub mod media;
pub mod scheduler;
pub mod telegram;
