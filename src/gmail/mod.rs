//! Gmail API plumbing: OAuth credentials, wire models, and the REST client.

pub mod auth;
pub mod client;
pub mod types;

pub use client::{GmailClient, Mailbox, get_or_create_label};
pub use types::{Header, Label, Message, MessageBody, MessagePayload};
