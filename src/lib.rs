//! Gmail triage poller — sweeps unread mail, classifies it, and stars,
//! labels, or trashes each message.

pub mod config;
pub mod digest;
pub mod error;
pub mod gmail;
pub mod pipeline;
pub mod poller;
pub mod store;
