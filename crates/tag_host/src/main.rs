//! ImageTagger backend host
//!
//! Spawned by the UI process. Requests arrive as JSON lines on stdin and
//! replies/pushes leave as JSON lines on stdout, so all logging goes to stderr.

use anyhow::Result;
use tag_host::{bridge, RfdPicker, TaggingBackend};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Tag host starting (pid {})", std::process::id());

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut backend = TaggingBackend::new(RfdPicker);

    bridge::run(stdin.lock(), stdout.lock(), &mut backend)
}
