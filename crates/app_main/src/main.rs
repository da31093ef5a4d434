//! ImageTagger - keyboard-driven image tagging
//!
//! Main entry point. The file system work happens in the `tag_host`
//! process, which this binary spawns next to itself.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod bridge;

use anyhow::Result;

fn main() -> Result<()> {
    // Initialize logging and panic hook first
    app_log::init()?;

    // Clean up old logs (7 days)
    if let Err(e) = app_log::cleanup_old_logs(7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("ImageTagger starting...");

    // Load configuration
    let config = app_core::AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("{}; using defaults", e.user_message());
        app_core::AppConfig::default()
    });

    // Run the application
    app::run(config)
}
