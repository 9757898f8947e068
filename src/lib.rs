//! Dad joke generator backed by an LLM chat-completion API.
//!
//! - `contexts`: the joke client, its seen-jokes cache, API key handling,
//!   key-value stores and the backend history client
//! - `data`: wire types, joke results and the `KeyValueStore` trait
//! - `registries`: the HTTP upstream and file-based settings

pub mod contexts;
pub mod data;
pub mod registries;
