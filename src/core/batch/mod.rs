// Core batch module - row-by-row sheet processing with per-row isolation.
// Following the same pattern as the moderation module.

pub mod batch_models;
pub mod batch_service;

pub use batch_models::*;
pub use batch_service::*;
