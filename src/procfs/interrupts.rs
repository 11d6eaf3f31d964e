//! This module contains a parser for /proc/interrupts
//!
//! The interrupt table is one of the least regular files in procfs. It starts
//! with a header line listing the active CPUs, followed by one line per
//! interrupt source, e.g.:
//!
//! ```text
//!            CPU0       CPU1
//!   0:         36          0   IO-APIC   2-edge      timer
//!   8:          0          1   IO-APIC   8-edge      rtc0
//! NMI:          0          0   Non-maskable interrupts
//! ERR:          0
//! ```
//!
//! Numbered hardware IRQs carry a controller description and a list of device
//! names after their counters, whereas named interrupt sources only carry a
//! free-form description, and a couple of them (ERR, MIS) carry a single
//! global counter. The exact set of columns also varies across kernel
//! versions and architectures, so this parser is deliberately lenient: lines
//! which do not have enough columns are skipped rather than reported.

use crate::error::{Error, Result};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::io::{self, BufRead};


/// Parsed contents of /proc/interrupts, keyed by interrupt identifier
///
/// A BTreeMap is used so that walking a snapshot always yields interrupts in
/// the same order for identical input.
pub type Snapshot = BTreeMap<String, InterruptRecord>;


/// One row of the interrupt table
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterruptRecord {
    /// Interrupt identifier, i.e. the first column without its trailing colon
    pub identifier: String,

    /// Raw counter text for each CPU, in header order (index 0 is CPU0)
    ///
    /// Beware that this holds one entry less than the header has CPU columns:
    /// the value block is taken from columns [1, cpu_count) of each row, so
    /// the counter of the last CPU is neither stored here nor in "info". This
    /// is likely an off-by-one, but node-style exporters have always exported
    /// the table this way, and fixing it would change the exported series.
    ///
    pub per_cpu_values: Vec<String>,

    /// Interrupt type or controller description (e.g. "IO-APIC-edge")
    pub info: String,

    /// Devices attached to the interrupt line, space-separated. Always empty
    /// for named interrupt sources.
    pub devices: String,
}


/// Nature of an interrupt source, as told by its identifier
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InterruptId<'a> {
    /// Numbered hardware IRQ line
    Numeric(i64),

    /// Named interrupt source (NMI, LOC, TLB, ...)
    Symbolic(&'a str),
}
//
impl<'a> InterruptId<'a> {
    /// Classify an interrupt identifier. Failing to parse it as an integer is
    /// not an error, it just means that we are facing a named source.
    pub fn classify(identifier: &'a str) -> Self {
        match identifier.parse::<i64>() {
            Ok(irq) => InterruptId::Numeric(irq),
            Err(_) => InterruptId::Symbolic(identifier),
        }
    }
}


/// Parse the interrupt table from a line-oriented text stream
///
/// Fails with Error::Format if the stream does not even contain a header line
/// or is not valid UTF-8, and with Error::Io if the stream cannot be read.
/// Rows with too few columns
/// to hold one counter per CPU plus a description are silently dropped. If an
/// identifier appears twice, the last row wins.
///
pub fn parse_interrupts<R: BufRead>(reader: R) -> Result<Snapshot> {
    let mut lines = reader.lines();

    // The header holds one column per active CPU, which is all we need to know
    let header = lines.next()
                      .ok_or(Error::Format("interrupts empty"))?
                      .map_err(read_error)?;
    let cpu_count = header.split_whitespace().count();

    // Parse the interrupt rows that follow
    let mut snapshot = Snapshot::new();
    for line in lines {
        let line = line.map_err(read_error)?;
        if let Some(record) = parse_row(&line, cpu_count) {
            snapshot.insert(record.identifier.clone(), record);
        }
    }
    Ok(snapshot)
}


/// Tell garbled text apart from actual read failures
fn read_error(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::InvalidData => Error::Format("interrupts not valid UTF-8"),
        _ => Error::Io(e),
    }
}


/// Parse one row of the interrupt table, given the header's CPU count, or
/// return None if the row does not have enough columns to be exported
fn parse_row(line: &str, cpu_count: usize) -> Option<InterruptRecord> {
    // Rows need the identifier, one column per CPU and a description. This
    // rules out ERR and MIS, which only have a single global counter.
    let columns = line.split_whitespace().collect_vec();
    if columns.len() < cpu_count + 2 {
        return None;
    }

    // Get rid of the colon at the end of the identifier
    let mut identifier = columns[0].to_owned();
    identifier.pop();

    // Collect the value block, see InterruptRecord::per_cpu_values for why it
    // stops one column short. A header without any CPU yields no value.
    let per_cpu_values = columns[1..cpu_count.max(1)].iter()
                                                     .map(|&v| v.to_owned())
                                                     .collect();

    // Numbered IRQs separate the controller from the device list, named
    // interrupt sources only have a free-form description
    let (info, devices) = match InterruptId::classify(&identifier) {
        InterruptId::Numeric(_) => (
            columns[cpu_count + 1].to_owned(),
            columns[cpu_count + 2..].iter().join(" "),
        ),
        InterruptId::Symbolic(_) => (
            columns[cpu_count + 1..].iter().join(" "),
            String::new(),
        ),
    };

    Some(
        InterruptRecord {
            identifier,
            per_cpu_values,
            info,
            devices,
        }
    )
}


/// Unit tests
#[cfg(test)]
mod tests {
    use crate::error::Error;
    use std::io::{self, BufReader, Read};
    use super::{parse_interrupts, parse_row, InterruptId, InterruptRecord};

    /// Interrupt table from a two-CPU x86 machine, abridged
    const X86_TABLE: &str = "\
           CPU0       CPU1
  0:         36          0   IO-APIC   2-edge      timer
  1:          0          9   IO-APIC   1-edge      i8042
  8:          0          1   IO-APIC   8-edge      rtc0
  9:          0          0   IO-APIC   9-fasteoi   acpi
 16:        412          0   IO-APIC  16-fasteoi   ehci_hcd:usb1, snd_hda_intel
NMI:          0          0   Non-maskable interrupts
LOC:    1830401    1791133   Local timer interrupts
ERR:          0
MIS:          0
";

    /// Build a record without the boilerplate
    fn record(identifier: &str, values: &[&str], info: &str, devices: &str)
        -> InterruptRecord
    {
        InterruptRecord {
            identifier: identifier.to_owned(),
            per_cpu_values: values.iter().map(|&v| v.to_owned()).collect(),
            info: info.to_owned(),
            devices: devices.to_owned(),
        }
    }

    /// Check that identifiers are classified as expected
    #[test]
    fn classify_identifiers() {
        assert_eq!(InterruptId::classify("0"), InterruptId::Numeric(0));
        assert_eq!(InterruptId::classify("122"), InterruptId::Numeric(122));
        assert_eq!(InterruptId::classify("NMI"), InterruptId::Symbolic("NMI"));
        assert_eq!(InterruptId::classify("PIW"), InterruptId::Symbolic("PIW"));
        assert_eq!(InterruptId::classify(""), InterruptId::Symbolic(""));
    }

    /// Check the numbered IRQ row layout. Only one value is captured out of
    /// the two CPU columns, the counter of the last CPU is skipped.
    #[test]
    fn numeric_row() {
        assert_eq!(parse_row("0: 1234 567 IO-APIC-edge timer", 2),
                   Some(record("0", &["1234"], "IO-APIC-edge", "timer")));
        assert_eq!(parse_row("  8:    0    1   IO-APIC-edge", 2),
                   Some(record("8", &["0"], "IO-APIC-edge", "")));
    }

    /// Check the named interrupt row layout
    #[test]
    fn symbolic_row() {
        assert_eq!(parse_row("NMI: 10 12 Non-maskable interrupts", 2),
                   Some(record("NMI", &["10"], "Non-maskable interrupts", "")));
    }

    /// Check that rows with too few columns are dropped
    #[test]
    fn short_rows() {
        assert_eq!(parse_row("ERR: 3", 2), None);
        assert_eq!(parse_row("0: 1 2", 2), None);
        assert_eq!(parse_row("", 2), None);
        assert!(parse_row("0: 1 2 edge", 2).is_some());
    }

    /// Check that an empty stream is an error rather than an empty snapshot
    #[test]
    fn empty_input() {
        match parse_interrupts("".as_bytes()) {
            Err(Error::Format(_)) => {},
            other => panic!("Unexpected parse result: {:?}", other),
        }
    }

    /// Check that a header alone makes for a valid, empty snapshot
    #[test]
    fn header_only() {
        let snapshot = parse_interrupts("    CPU0    CPU1\n".as_bytes())
                                       .expect("Header alone should parse");
        assert!(snapshot.is_empty());
    }

    /// Check that a header without any CPU does not break the parser
    #[test]
    fn blank_header() {
        let snapshot = parse_interrupts("\nNMI: Non-maskable\n".as_bytes())
                                       .expect("Blank header should parse");
        assert_eq!(snapshot["NMI"], record("NMI", &[], "Non-maskable", ""));
    }

    /// Check that a realistic interrupt table is parsed well
    #[test]
    fn full_table() {
        let snapshot = parse_interrupts(X86_TABLE.as_bytes())
                                       .expect("Failed to parse x86 table");
        assert_eq!(snapshot.len(), 7);
        assert_eq!(snapshot["0"],
                   record("0", &["36"], "IO-APIC", "2-edge timer"));
        assert_eq!(snapshot["16"],
                   record("16", &["412"], "IO-APIC",
                          "16-fasteoi ehci_hcd:usb1, snd_hda_intel"));
        assert_eq!(snapshot["LOC"],
                   record("LOC", &["1830401"], "Local timer interrupts", ""));
        assert!(!snapshot.contains_key("ERR"));
        assert!(!snapshot.contains_key("MIS"));

        // All accepted rows have one value less than the header has CPUs
        assert!(snapshot.values().all(|r| r.per_cpu_values.len() == 1));

        // Symbolic rows never have devices
        assert!(snapshot.values()
                        .filter(|r| r.identifier.parse::<i64>().is_err())
                        .all(|r| r.devices.is_empty()));
    }

    /// Check that parsing is deterministic
    #[test]
    fn deterministic() {
        let first = parse_interrupts(X86_TABLE.as_bytes()).unwrap();
        let second = parse_interrupts(X86_TABLE.as_bytes()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.keys().collect::<Vec<_>>(),
                   second.keys().collect::<Vec<_>>());
    }

    /// Check that duplicated identifiers are resolved in favor of the last row
    #[test]
    fn duplicate_identifiers() {
        let table = "CPU0 CPU1\n\
                     0: 1 2 IO-APIC timer\n\
                     0: 3 4 PCI-MSI eth0\n";
        let snapshot = parse_interrupts(table.as_bytes()).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["0"], record("0", &["3"], "PCI-MSI", "eth0"));
    }

    /// Check that wider machines capture one value less than their CPU count
    #[test]
    fn four_cpus() {
        let table = "  CPU0 CPU1 CPU2 CPU3\n\
                     24: 1 2 3 4 PCI-MSI 512000-edge ahci[0000:00:1f.2]\n\
                     RES: 5 6 7 8 Rescheduling interrupts\n";
        let snapshot = parse_interrupts(table.as_bytes()).unwrap();
        assert_eq!(snapshot["24"],
                   record("24", &["1", "2", "3"], "PCI-MSI",
                          "512000-edge ahci[0000:00:1f.2]"));
        assert_eq!(snapshot["RES"],
                   record("RES", &["5", "6", "7"], "Rescheduling interrupts",
                          ""));
    }

    /// Check that values are kept as raw text, even when they are not numbers
    #[test]
    fn raw_values() {
        let table = "CPU0 CPU1\n0: abc 567 IO-APIC-edge timer\n";
        let snapshot = parse_interrupts(table.as_bytes()).unwrap();
        assert_eq!(snapshot["0"].per_cpu_values, vec!["abc".to_owned()]);
    }

    /// Stream which fails after delivering its header
    struct FailingStream {
        header_sent: bool,
    }
    //
    impl Read for FailingStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.header_sent {
                Err(io::Error::new(io::ErrorKind::Other, "device went away"))
            } else {
                self.header_sent = true;
                let header = b"CPU0 CPU1\n";
                buf[..header.len()].copy_from_slice(header);
                Ok(header.len())
            }
        }
    }

    /// Check that read failures are propagated instead of truncating output
    #[test]
    fn read_failure() {
        let stream = BufReader::new(FailingStream { header_sent: false });
        match parse_interrupts(stream) {
            Err(Error::Io(_)) => {},
            other => panic!("Unexpected parse result: {:?}", other),
        }
    }

    /// Check that garbled device names are format errors, not read errors
    #[test]
    fn invalid_utf8() {
        match parse_interrupts(&b"CPU0 CPU1\n0: 1 2 e \xff\n"[..]) {
            Err(Error::Format(_)) => {},
            other => panic!("Unexpected parse result: {:?}", other),
        }
        match parse_interrupts(&b"CPU0 \xff\n"[..]) {
            Err(Error::Format(_)) => {},
            other => panic!("Unexpected parse result: {:?}", other),
        }
    }

    /// Check that the host's interrupt table can be parsed, if there is one
    #[test]
    #[cfg(target_os = "linux")]
    fn host_table() {
        // Some sandboxes do not emulate this file, nothing to check there
        let file = match ::std::fs::File::open("/proc/interrupts") {
            Ok(file) => file,
            Err(_) => return,
        };
        let snapshot = parse_interrupts(BufReader::new(file))
                                       .expect("Failed to parse host table");
        let value_counts = snapshot.values()
                                   .map(|r| r.per_cpu_values.len())
                                   .collect::<Vec<_>>();
        assert!(value_counts.windows(2).all(|w| w[0] == w[1]));
    }
}
