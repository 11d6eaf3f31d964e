//! Labeled counter storage and exposition
//!
//! Kernel interrupt counters are cumulative, so what we export are counters.
//! But unlike a regular Prometheus counter, which is incremented locally, ours
//! are set to whatever the kernel reports at each collection cycle. The
//! CounterFamily below stores one such value per label tuple, and exposes them
//! as a counter-typed metric family, either by pushing them down a channel or
//! through the prometheus Collector interface when registered in a Registry.
//!
//! Values from one collection cycle are committed in a single write-locked
//! step, so concurrent readers see either the previous or the new values of a
//! cycle, never a mix of both.

use crate::error::{Error, Result};
use itertools::Itertools;
use prometheus::core::{Collector, Desc, Describer};
use prometheus::proto::{Counter, LabelPair, Metric, MetricFamily, MetricType};
use prometheus::Opts;
use std::collections::BTreeMap;
use std::sync::mpsc::Sender;
use std::sync::{Arc, PoisonError, RwLock};


/// Values of the labels identifying one counter, in label name order
pub type LabelValues = Vec<String>;


/// Family of counters sharing a name and a set of label names
///
/// This is a cheap handle: clones share the same underlying storage, so that
/// one copy can live in a Registry while another one gets updated.
///
#[derive(Clone)]
pub struct CounterFamily {
    inner: Arc<FamilyInner>,
}
//
struct FamilyInner {
    /// Metric description (name, help, label names)
    desc: Desc,

    /// Order in which label pairs are emitted, i.e. sorted by label name
    label_order: Vec<usize>,

    /// Current counter values, keyed by label values
    values: RwLock<BTreeMap<LabelValues, f64>>,
}
//
impl CounterFamily {
    /// Describe a new counter family, e.g.
    /// `Opts::new("interrupts", "Interrupt details.").namespace("node")
    ///                                              .variable_labels(labels)`
    pub fn new(opts: Opts) -> Result<Self> {
        let desc = opts.describe()?;
        let label_order = (0..desc.variable_labels.len())
                              .sorted_by_key(|&idx| &desc.variable_labels[idx])
                              .collect_vec();
        Ok(
            Self {
                inner: Arc::new(
                    FamilyInner {
                        desc,
                        label_order,
                        values: RwLock::new(BTreeMap::new()),
                    }
                ),
            }
        )
    }

    /// Fully qualified metric name
    pub fn fq_name(&self) -> &str {
        &self.inner.desc.fq_name
    }

    /// Label names, in the order expected by set() and set_all()
    pub fn label_names(&self) -> &[String] {
        &self.inner.desc.variable_labels
    }

    /// Set the value of the counter identified by some label values
    pub fn set(&self, label_values: &[&str], value: f64) -> Result<()> {
        let key = label_values.iter().map(|&v| v.to_owned()).collect_vec();
        self.set_all(vec![(key, value)])
    }

    /// Set many counter values at once
    ///
    /// Either every value is stored or, if some label tuple does not have the
    /// right amount of labels, nothing is. Label tuples which are not
    /// mentioned keep their previous value.
    ///
    pub fn set_all<I>(&self, observations: I) -> Result<()>
        where I: IntoIterator<Item=(LabelValues, f64)>
    {
        // Check the observations before touching the shared storage
        let observations = observations.into_iter().collect_vec();
        let expected = self.label_names().len();
        if let Some((labels, _)) = observations.iter()
                                               .find(|(l, _)| l.len() != expected)
        {
            return Err(
                prometheus::Error::InconsistentCardinality {
                    expect: expected,
                    got: labels.len(),
                }.into()
            );
        }

        // Commit them in one go
        let mut values = self.inner.values.write()
                                          .unwrap_or_else(PoisonError::into_inner);
        values.extend(observations);
        Ok(())
    }

    /// Current value of the counter identified by some label values
    pub fn get(&self, label_values: &[&str]) -> Option<f64> {
        let key = label_values.iter().map(|&v| v.to_owned()).collect_vec();
        self.inner.values.read()
                         .unwrap_or_else(PoisonError::into_inner)
                         .get(&key)
                         .cloned()
    }

    /// Number of label tuples that have a value
    pub fn len(&self) -> usize {
        self.inner.values.read()
                         .unwrap_or_else(PoisonError::into_inner)
                         .len()
    }

    /// Tell whether no value has been set yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Send the current state of the counter family down a channel
    pub fn flush(&self, ch: &Sender<MetricFamily>) -> Result<()> {
        for family in self.collect() {
            ch.send(family).map_err(|_| Error::Disconnected)?;
        }
        Ok(())
    }

    /// Build the exposition-format representation of one counter
    fn make_metric(&self, label_values: &[String], value: f64) -> Metric {
        let label_names = self.label_names();
        let mut metric = Metric::default();
        for &idx in &self.inner.label_order {
            let mut pair = LabelPair::default();
            pair.set_name(label_names[idx].clone());
            pair.set_value(label_values[idx].clone());
            metric.mut_label().push(pair);
        }
        let mut counter = Counter::default();
        counter.set_value(value);
        metric.set_counter(counter);
        metric
    }
}
//
impl Collector for CounterFamily {
    fn desc(&self) -> Vec<&Desc> {
        vec![&self.inner.desc]
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let desc = &self.inner.desc;
        let mut family = MetricFamily::default();
        family.set_name(desc.fq_name.clone());
        family.set_help(desc.help.clone());
        family.set_field_type(MetricType::COUNTER);

        let values = self.inner.values.read()
                                      .unwrap_or_else(PoisonError::into_inner);
        for (label_values, &value) in values.iter() {
            family.mut_metric().push(self.make_metric(label_values, value));
        }
        vec![family]
    }
}
