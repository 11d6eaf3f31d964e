//! This module defines what a metric collector is
//!
//! A collector is driven by an external scheduler, which asks it to refresh its
//! metrics once per collection cycle. The collector then samples whatever
//! system information it is about, updates its metrics accordingly, and sends
//! them down a channel towards the exposition layer.
//!
//! Each submodule implements one collector.

pub mod interrupts;

use crate::error::Result;
use prometheus::proto::MetricFamily;
use std::sync::mpsc::Sender;


/// Interface contract which must be met by every collector
pub trait Collector {
    /// Refresh the collector's metrics and send them down the channel
    ///
    /// On success, every current metric has been sent. On failure, nothing
    /// was sent and the metrics still hold the values of the last successful
    /// collection cycle.
    ///
    fn update(&self, ch: &Sender<MetricFamily>) -> Result<()>;
}
