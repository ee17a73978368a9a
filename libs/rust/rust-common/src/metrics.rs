//! Prometheus metrics helpers.
//!
//! Lock-free counters and gauges that render themselves in the Prometheus
//! text exposition format. Components own their metrics and expose them
//! through [`render`].

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

/// A metric that can be written in Prometheus text format.
pub trait Metric {
    /// Metric name.
    fn name(&self) -> &str;

    /// Append `# HELP`, `# TYPE` and the sample line to `out`.
    fn write_prometheus(&self, out: &mut String);
}

/// A monotonically increasing counter.
#[derive(Debug)]
pub struct Counter {
    name: String,
    help: String,
    value: AtomicU64,
}

impl Counter {
    /// Create a new counter.
    #[must_use]
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            value: AtomicU64::new(0),
        }
    }

    /// Increment the counter by 1.
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the counter by a specific amount.
    pub fn inc_by(&self, amount: u64) {
        self.value.fetch_add(amount, Ordering::Relaxed);
    }

    /// Get the current value.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Metric for Counter {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_prometheus(&self, out: &mut String) {
        write_sample(out, &self.name, &self.help, "counter", self.get());
    }
}

/// A value that can go up and down.
#[derive(Debug)]
pub struct Gauge {
    name: String,
    help: String,
    value: AtomicU64,
}

impl Gauge {
    /// Create a new gauge.
    #[must_use]
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            value: AtomicU64::new(0),
        }
    }

    /// Set the gauge value.
    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Get the current value.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Metric for Gauge {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_prometheus(&self, out: &mut String) {
        write_sample(out, &self.name, &self.help, "gauge", self.get());
    }
}

/// Render a set of metrics as one Prometheus text document.
#[must_use]
pub fn render(metrics: &[&dyn Metric]) -> String {
    let mut out = String::new();
    for metric in metrics {
        metric.write_prometheus(&mut out);
    }
    out
}

fn write_sample(out: &mut String, name: &str, help: &str, kind: &str, value: u64) {
    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "# HELP {name} {help}\n# TYPE {name} {kind}\n{name} {value}\n"
    );
}
