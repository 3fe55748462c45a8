// This is the entry point of the moderation batch client.
//
// **Architecture Overview:**
// - `core/` = Business logic (submit/poll workflow, scoring, batch runner)
// - `infra/` = Implementations of core traits (Eden AI HTTP client, xlsx I/O)
// - `cli/` = Interactive adapter (menu, prompts, result printing)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Hand off to the interactive menu

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "cli/cli_layer.rs"]
mod cli;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use std::time::Duration;

use crate::core::batch::BatchService;
use crate::core::moderation::{ModerationService, PollConfig, DEFAULT_REJECTION_THRESHOLD};
use crate::infra::moderation::{EdenApiClient, EdenApiConfig};
use crate::infra::sheet::XlsxSheetStore;

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let api_key = std::env::var("API_KEY")
        .expect("Missing API_KEY environment variable! Create a .env file with your Eden AI key.");
    let submit_url =
        std::env::var("API_URL_POST").expect("Missing API_URL_POST environment variable!");
    let result_url_template =
        std::env::var("API_URL_GET").expect("Missing API_URL_GET environment variable!");

    // Optional tuning knobs with sensible defaults.
    let poll_interval_secs = std::env::var("MODERATION_POLL_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(5);
    let poll_max_attempts = std::env::var("MODERATION_POLL_MAX_ATTEMPTS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(60);
    let rejection_threshold = std::env::var("MODERATION_REJECTION_THRESHOLD")
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(DEFAULT_REJECTION_THRESHOLD);

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let config = EdenApiConfig {
        api_key,
        submit_url,
        result_url_template,
    };
    let client = EdenApiClient::new(config).expect("Failed to create Eden AI client");

    let poll = PollConfig {
        interval: Duration::from_secs(poll_interval_secs),
        max_attempts: poll_max_attempts,
    };
    let moderation = ModerationService::with_config(client, poll, rejection_threshold);
    let batch = BatchService::new(moderation.clone(), XlsxSheetStore::new());

    cli::menu::run(&moderation, &batch).await;
}
