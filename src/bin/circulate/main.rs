//! circulate - terminal front end for the circulate effect
//!
//! Plays a test signal through the effect and lets you turn the knobs live.
//!
//! Run with: cargo run --bin circulate [saw|noise|pulse]
//! Logs go to `circulate.log`; set `RUST_LOG` to change the level.

mod app;
mod source;
mod ui;

use std::{fs::File, sync::Mutex};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use app::Circulate;
use source::SourceKind;

const LOG_FILE: &str = "circulate.log";

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    let source = match std::env::args().nth(1) {
        Some(name) => name.parse::<SourceKind>()?,
        None => SourceKind::Saw,
    };

    Circulate::new().source(source).run()
}

/// The terminal belongs to the TUI, so logs go to a file.
fn init_logging() -> EyreResult<()> {
    let file = File::create(LOG_FILE).wrap_err_with(|| format!("failed to create {LOG_FILE}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
