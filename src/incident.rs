//! Append-only incident log.

use std::fmt;

use anyhow::Result;
use serde::Serialize;

/// One detected motion event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct IncidentRecord {
    pub timestamp_ms: u64,
    pub camera: usize,
}

/// Ordered record of every incident in a run. Append-only; never mutated
/// or truncated while the run lives.
#[derive(Default)]
pub struct IncidentLog {
    records: Vec<IncidentRecord>,
}

impl IncidentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, timestamp_ms: u64, camera: usize) {
        self.records.push(IncidentRecord {
            timestamp_ms,
            camera,
        });
    }

    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize the full log for export.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }
}

impl fmt::Display for IncidentLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.records.is_empty() {
            return write!(f, "no incidents");
        }
        for (idx, rec) in self.records.iter().enumerate() {
            writeln!(
                f,
                "index: {} || time(s): {:.2} || camera: {}",
                idx,
                rec.timestamp_ms as f64 / 1000.0,
                rec.camera
            )?;
        }
        Ok(())
    }
}
