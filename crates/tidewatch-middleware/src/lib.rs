//! `tidewatch-middleware` – The Message Plumbing
//!
//! Routes signals into the supervisor and its requests out, without caring
//! about their meaning.
//!
//! # Modules
//!
//! - [`bus`] – in-process, topic-based publish/subscribe event bus built on
//!   Tokio broadcast channels.

pub mod bus;

pub use bus::{EventBus, Topic, TopicReceiver};
