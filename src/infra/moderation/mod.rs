// Moderation infra layer.
// - `eden_client.rs` talks to the Eden AI HTTP API.

#[path = "eden_client.rs"]
pub mod eden_client;

pub use eden_client::{EdenApiClient, EdenApiConfig};
