//! Entry point for talking to the assistant
//!
//! A [`SessionFactory`] holds the device identity, the default audio
//! configuration and the transport. It creates text and audio sessions, and
//! runs one-shot queries that pair a session with the response merger.

mod factory;
mod identity;

pub use factory::{QueryInput, QueryOptions, SessionFactory};
pub use identity::Identity;
