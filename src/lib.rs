//! Interrupt statistics exporter
//!
//! This crate samples the kernel's interrupt accounting table, /proc/interrupts,
//! and exposes it as a labeled Prometheus counter family named
//! "<namespace>_interrupts", with one counter per (interrupt, CPU) pair.
//!
//! The crate is organized as follows:
//!
//! - `reader` opens a pseudo-file for one sample and feeds it to a parser.
//! - `procfs` holds the parser of /proc/interrupts itself.
//! - `metric` stores the counters and exposes them in Prometheus format.
//! - `collector` glues everything together into something that an external
//!   scheduler can drive, once per collection cycle.
//!
//! Scheduling, HTTP exposition and flag handling are left to the embedding
//! program, which builds an InterruptsCollector from a Config, registers a
//! clone of it in its prometheus Registry, and calls update() periodically.

#[macro_use] extern crate lazy_static;
#[macro_use] extern crate log;

pub mod collector;
pub mod config;
pub mod error;
pub mod metric;
pub mod procfs;
mod reader;

pub use collector::Collector;
pub use collector::interrupts::InterruptsCollector;
pub use config::Config;
pub use error::{Error, Result};
pub use procfs::interrupts::{parse_interrupts, InterruptRecord, Snapshot};
