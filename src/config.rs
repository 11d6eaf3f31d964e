//! Collector configuration
//!
//! Flag handling belongs to whoever embeds this crate, so all we provide here
//! is a plain struct with sensible defaults and builder-style setters.

use crate::error::Result;
use regex::Regex;
use std::env;
use std::path::PathBuf;


lazy_static! {
    /// Mount point of procfs, which can be overridden through the environment
    /// when sampling a containerized host from the outside
    static ref DEFAULT_PROCFS_ROOT: PathBuf =
        env::var_os("PROCFS_PATH").map(PathBuf::from)
                                  .unwrap_or_else(|| PathBuf::from("/proc"));
}

/// Namespace prefixed to the name of the exported metric
pub const DEFAULT_NAMESPACE: &str = "node";


/// Settings of the interrupt collector
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Where procfs is mounted
    pub procfs_root: PathBuf,

    /// Metric namespace, the metric will be called "<namespace>_interrupts"
    pub namespace: String,

    /// Only export interrupts whose identifier matches this pattern
    pub include: Option<String>,

    /// Never export interrupts whose identifier matches this pattern
    pub exclude: Option<String>,
}
//
impl Default for Config {
    fn default() -> Self {
        Self {
            procfs_root: DEFAULT_PROCFS_ROOT.clone(),
            namespace: DEFAULT_NAMESPACE.to_owned(),
            include: None,
            exclude: None,
        }
    }
}
//
impl Config {
    /// Sample procfs from a different mount point
    pub fn procfs_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.procfs_root = root.into();
        self
    }

    /// Use a different metric namespace
    pub fn namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Restrict the export to interrupts matching a pattern
    pub fn include<S: Into<String>>(mut self, pattern: S) -> Self {
        self.include = Some(pattern.into());
        self
    }

    /// Hide interrupts matching a pattern
    pub fn exclude<S: Into<String>>(mut self, pattern: S) -> Self {
        self.exclude = Some(pattern.into());
        self
    }

    /// Compile the identifier filter described by this configuration
    pub(crate) fn filter(&self) -> Result<InterruptFilter> {
        InterruptFilter::new(self.include.as_deref(), self.exclude.as_deref())
    }
}


/// Include/exclude filter on interrupt identifiers
///
/// An identifier passes if it matches the include pattern (when there is one)
/// and does not match the exclude pattern (when there is one). A filter built
/// without patterns lets everything through.
#[derive(Clone, Debug)]
pub(crate) struct InterruptFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}
//
impl InterruptFilter {
    /// Compile a filter from optional textual patterns
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        Ok(
            Self {
                include: include.map(Regex::new).transpose()?,
                exclude: exclude.map(Regex::new).transpose()?,
            }
        )
    }

    /// Tell whether an interrupt should be exported
    pub fn accepts(&self, identifier: &str) -> bool {
        let included = self.include.as_ref()
                                   .map_or(true, |re| re.is_match(identifier));
        let excluded = self.exclude.as_ref()
                                   .map_or(false, |re| re.is_match(identifier));
        included && !excluded
    }
}
