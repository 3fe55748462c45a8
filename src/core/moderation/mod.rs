// Core moderation module - submit/poll workflow and result interpretation.
// Following the same pattern as the batch module.

pub mod moderation_models;
pub mod moderation_service;

pub use moderation_models::*;
pub use moderation_service::*;
