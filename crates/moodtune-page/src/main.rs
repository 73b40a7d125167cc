#![forbid(unsafe_code)]
#![deny(
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Moodtune page entry point: starts the page controller on wasm32 and replays
//! scenario files natively.

#[cfg(target_arch = "wasm32")]
fn main() {
    moodtune_page::run_page();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use std::io::{self, Write};
    use std::path::PathBuf;

    use anyhow::Context;
    use moodtune_page::scenario::{self, Scenario};
    use moodtune_telemetry::{LogFormat, LoggingConfig, init_logging};

    init_logging(&LoggingConfig {
        format: LogFormat::from_env(),
        ..LoggingConfig::default()
    })?;

    let path = std::env::args_os().nth(1).map(PathBuf::from).context(
        "usage: moodtune-page <scenario.json> (the browser build targets wasm32; use `trunk build`)",
    )?;
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read scenario '{}'", path.display()))?;
    let scenario = Scenario::from_json(&raw)
        .with_context(|| format!("failed to load scenario '{}'", path.display()))?;
    let snapshot = scenario::run(&scenario).context("scenario replay failed")?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &snapshot)?;
    writeln!(stdout)?;
    Ok(())
}
