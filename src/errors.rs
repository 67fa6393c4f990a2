// Error types for f1replay

use snafu::Snafu;
use std::{io, path::PathBuf};

#[derive(Debug, Snafu)]
pub enum ExportError {
    // Errors while loading a recorded session
    #[snafu(display("No recorded session for {year} round {round} at {path:?}"))]
    SessionNotFound {
        year: u16,
        round: u32,
        path: PathBuf,
    },
    #[snafu(display("Error reading session file"))]
    SessionReadError { source: io::Error },
    #[snafu(display("Invalid session data: {reason}"))]
    SessionParseError { reason: String },

    // Session cache errors
    #[snafu(display("Session cache operation failed: {operation}"))]
    CacheIOError {
        operation: String,
        source: io::Error,
    },
    #[snafu(display("Error serializing cached session"))]
    CacheSerializeError { source: serde_json::Error },

    // Config management errors
    #[snafu(display("Could not find application config directory"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Errors for the export writer
    #[snafu(display("Error encoding export bundle"))]
    SerializeError { source: serde_json::Error },
    #[snafu(display("Error writing export file {path:?}"))]
    WriterError { path: PathBuf, source: io::Error },
}
