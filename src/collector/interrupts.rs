//! This module contains a collector for the kernel's interrupt statistics
//!
//! Each collection cycle parses /proc/interrupts and exports one counter per
//! (interrupt, CPU) pair, labeled with the CPU index, the interrupt identifier,
//! and the interrupt's description and devices.

use crate::config::{Config, InterruptFilter};
use crate::error::{Error, Result};
use crate::metric::{CounterFamily, LabelValues};
use crate::procfs::{self, interrupts::{parse_interrupts, Snapshot}};
use crate::reader::ProcFileReader;
use prometheus::core::Desc;
use prometheus::proto::MetricFamily;
use prometheus::Opts;
use std::sync::mpsc::Sender;
use super::Collector;


/// Name of the exported metric, without its namespace
pub const METRIC_NAME: &str = "interrupts";

/// Help text of the exported metric
pub const METRIC_HELP: &str = "Interrupt details.";

/// Labels of the exported metric, in the order of their values
pub const LABEL_NAMES: [&str; 4] = ["CPU", "type", "info", "devices"];


/// Collector of interrupt statistics from /proc/interrupts
///
/// Clones share the same counters, so one clone can be handed over to a
/// prometheus Registry while the scheduler keeps updating another.
///
#[derive(Clone)]
pub struct InterruptsCollector {
    /// Reader object for /proc/interrupts
    reader: ProcFileReader,

    /// Which interrupts should be exported
    filter: InterruptFilter,

    /// Exported interrupt counters
    metric: CounterFamily,
}
//
impl InterruptsCollector {
    /// Set up an interrupt collector
    ///
    /// This does not touch /proc/interrupts yet: a missing file is reported at
    /// collection time, on every cycle, rather than preventing startup.
    ///
    pub fn new(config: &Config) -> Result<Self> {
        let labels = LABEL_NAMES.iter().map(|&l| l.to_owned()).collect();
        let metric = CounterFamily::new(
            Opts::new(METRIC_NAME, METRIC_HELP).namespace(config.namespace.clone())
                                               .variable_labels(labels)
        )?;
        Ok(
            Self {
                reader: ProcFileReader::new(
                    procfs::proc_file_path(&config.procfs_root, "interrupts")
                ),
                filter: config.filter()?,
                metric,
            }
        )
    }

    /// Exported interrupt counters
    pub fn metric(&self) -> &CounterFamily {
        &self.metric
    }

    /// Parse the current contents of /proc/interrupts
    pub fn snapshot(&self) -> Result<Snapshot> {
        self.reader.sample(parse_interrupts)
    }

    /// Sample the interrupt table and turn it into counter observations
    fn observe(&self) -> Result<Vec<(LabelValues, f64)>> {
        let snapshot = self.snapshot()?;
        let observations = project(&snapshot, &self.filter)?;
        debug!("Sampled {} interrupt sources from {} into {} counters",
               snapshot.len(), self.reader.path().display(), observations.len());
        Ok(observations)
    }

    /// Run one collection cycle, without logging its failures
    fn cycle(&self, ch: &Sender<MetricFamily>) -> Result<()> {
        // Sample everything before touching the counters, so that a bad
        // snapshot leaves the values from the last good one in place
        let observations = self.observe()?;
        self.metric.set_all(observations)?;
        self.metric.flush(ch)
    }
}
//
impl Collector for InterruptsCollector {
    fn update(&self, ch: &Sender<MetricFamily>) -> Result<()> {
        self.cycle(ch).map_err(|e| {
            warn!("couldn't get interrupts: {}", e);
            e
        })
    }
}
//
impl prometheus::core::Collector for InterruptsCollector {
    fn desc(&self) -> Vec<&Desc> {
        prometheus::core::Collector::desc(&self.metric)
    }

    fn collect(&self) -> Vec<MetricFamily> {
        prometheus::core::Collector::collect(&self.metric)
    }
}


/// Turn an interrupt snapshot into counter observations
///
/// Every per-CPU value must parse as a floating-point number: if one does not,
/// the whole snapshot is rejected, so that we never export half of a sample.
///
fn project(snapshot: &Snapshot,
           filter: &InterruptFilter) -> Result<Vec<(LabelValues, f64)>> {
    let mut observations = Vec::new();
    for (identifier, record) in snapshot {
        if !filter.accepts(identifier) {
            continue;
        }
        for (cpu, value) in record.per_cpu_values.iter().enumerate() {
            let parsed = value.parse::<f64>().map_err(|source| {
                Error::ValueParse {
                    value: value.clone(),
                    identifier: identifier.clone(),
                    source,
                }
            })?;
            observations.push((
                vec![cpu.to_string(),
                     identifier.clone(),
                     record.info.clone(),
                     record.devices.clone()],
                parsed,
            ));
        }
    }
    Ok(observations)
}
