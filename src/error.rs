//! Error types shared by the interrupt parser and collector
//!
//! Unlike most of what sits in /proc, /proc/interrupts has a layout that varies
//! across kernel versions and architectures, so we cannot get away with
//! panicking on unexpected contents. Everything that can go wrong during a
//! collection cycle is reported through this enum instead.

use std::io;
use std::num::ParseFloatError;
use std::path::PathBuf;
use thiserror::Error;


/// Everything that can go wrong while collecting interrupt statistics
#[derive(Debug, Error)]
pub enum Error {
    /// The pseudo-file could not be opened or read
    #[error("couldn't read {}: {source}", .path.display())]
    SourceUnavailable {
        /// Location of the pseudo-file that we tried to access
        path: PathBuf,

        /// Underlying OS-level failure
        #[source]
        source: io::Error,
    },

    /// A stream that was already open could not be read any further
    #[error("couldn't read interrupt table: {0}")]
    Io(#[from] io::Error),

    /// The table does not have the expected overall structure
    #[error("malformed interrupt table: {0}")]
    Format(&'static str),

    /// A per-CPU counter could not be parsed as a floating-point number
    #[error("invalid value {value} in interrupts (interrupt {identifier}): {source}")]
    ValueParse {
        /// Literal counter text which failed to parse
        value: String,

        /// Interrupt that this counter belongs to
        identifier: String,

        #[source]
        source: ParseFloatError,
    },

    /// The collector was configured with something it cannot work with
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The metric registry machinery rejected our metric description
    #[error("metric error: {0}")]
    Metric(#[from] prometheus::Error),

    /// Nobody is listening on the other end of the metric channel anymore
    #[error("metric channel disconnected")]
    Disconnected,
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        Error::Config(e.to_string())
    }
}


/// Result type used throughout this crate
pub type Result<T> = std::result::Result<T, Error>;
