//! This module contains parsers for the contents of procfs.
//!
//! Each submodule corresponds to one file in /proc, and is named as close to
//! that file as allowed by the Rust module system.

pub mod interrupts;

use std::path::{Path, PathBuf};


/// Location of a pseudo-file, given the mount point of procfs
pub fn proc_file_path<P: AsRef<Path>>(procfs_root: P, name: &str) -> PathBuf {
    procfs_root.as_ref().join(name)
}
