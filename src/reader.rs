//! A sampling-oriented reader for Linux pseudo-files
//!
//! Linux pseudo-files, such as those from /proc, have a number of special
//! characteristics that are best accounted for through a special abstraction
//! when performing sampling measurements:
//!
//! - They are small (a few kB at most) and generated on the host CPU, so there
//!   is no performance benefit in reading them asynchronously.
//! - They almost exclusively contain ASCII-encoded text, organized in lines.
//! - Their contents are regenerated every time they are opened and read.
//!
//! The ProcFileReader provided by this module opens its pseudo-file once per
//! sample and hands a buffered stream to a user-provided parser. The file is
//! closed before sample() returns, whether the parser succeeded or not, so no
//! handle is kept open between two collection cycles.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};


/// Sampling-oriented reader for procfs pseudo-files
#[derive(Clone, Debug)]
pub(crate) struct ProcFileReader {
    /// Location of the pseudo-file being sampled
    path: PathBuf,
}
//
impl ProcFileReader {
    /// Prepare to sample a proc pseudo-file
    ///
    /// The file is not opened until the first sample is requested, so that a
    /// collector can be built on a host where the file is missing and report
    /// that condition on every collection cycle instead.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_owned(),
        }
    }

    /// Location of the pseudo-file being sampled
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire a new sample of data from the file
    ///
    /// This method opens the file and hands a buffered reader over it to a
    /// user-provided parser, whose output is then returned. Failure to open
    /// or read the file is reported as Error::SourceUnavailable, other parser
    /// errors are forwarded untouched.
    ///
    pub fn sample<F, R>(&self, parser: F) -> Result<R>
        where F: FnOnce(BufReader<File>) -> Result<R>
    {
        // Open the pseudo-file, which makes the kernel generate its contents
        let file_handle = File::open(&self.path).map_err(|source| {
            Error::SourceUnavailable { path: self.path.clone(), source }
        })?;

        // Run the user-provided parser, which consumes (and closes) the file.
        // Read errors only know about the stream, so we add the path back.
        parser(BufReader::new(file_handle)).map_err(|e| match e {
            Error::Io(source) => {
                Error::SourceUnavailable { path: self.path.clone(), source }
            },
            other => other,
        })
    }
}
