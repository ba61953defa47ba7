use crate::api::models::Message;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
pub const LOG_FILTER_ENV: &str = "ROOMCHAT_LOG";

/// Where diagnostics should go for the current command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceTarget {
    File(PathBuf),
    Stderr,
    /// The TUI owns the terminal, so without a file nothing is installed.
    Disabled,
}

/// Install the global `tracing` subscriber.
///
/// Calling this twice is harmless; the second install is ignored.
pub fn init_tracing(target: TraceTarget) -> Result<(), Box<dyn std::error::Error>> {
    match target {
        TraceTarget::Disabled => Ok(()),
        TraceTarget::Stderr => {
            let filter = env_filter("warn");
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .with_target(false)
                .try_init();
            Ok(())
        }
        TraceTarget::File(path) => {
            let file = open_append(&path)?;
            let filter = env_filter("debug");
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
            Ok(())
        }
    }
}

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive))
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Plain-text transcript of the messages sent during a session.
///
/// Messages never reach the server, so this file is the only record of them
/// once the client exits.
pub struct TranscriptLog {
    file_path: Option<PathBuf>,
}

impl TranscriptLog {
    pub fn new(file_path: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(path) = &file_path {
            // fail at startup rather than on the first message
            open_append(path)?.flush()?;
        }
        Ok(Self { file_path })
    }

    pub fn record(&self, room_name: &str, message: &Message) -> io::Result<()> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };

        let mut writer = BufWriter::new(open_append(path)?);
        let mut lines = message.content.lines();
        let first = lines.next().unwrap_or_default();
        writeln!(
            writer,
            "{} [{}] {}: {}",
            message.timestamp, room_name, message.sender, first
        )?;
        for line in lines {
            writeln!(writer, "    {line}")?;
        }
        writer.flush()
    }
}
