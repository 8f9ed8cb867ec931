//! Per-endpoint call counters.
//!
//! Recorded by the runtime when a call finishes; one slot per endpoint.

use crate::ids::EndpointId;
use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

///
/// MetricSlot
///

#[derive(Debug, Default)]
struct MetricSlot {
    calls: u64,
    errors: u64,
}

impl MetricSlot {
    const fn increment(&mut self, ok: bool) {
        self.calls = self.calls.saturating_add(1);
        if !ok {
            self.errors = self.errors.saturating_add(1);
        }
    }
}

///
/// MetricEntry
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MetricEntry {
    pub endpoint: EndpointId,
    pub calls: u64,
    pub errors: u64,
}

///
/// EndpointMetrics
///

#[derive(Debug, Default)]
pub struct EndpointMetrics {
    table: Mutex<HashMap<EndpointId, MetricSlot>>,
}

impl EndpointMetrics {
    /// Record one finished call.
    pub fn record(&self, endpoint: EndpointId, ok: bool) {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        table.entry(endpoint).or_default().increment(ok);
    }

    /// Snapshot all counters, sorted by endpoint.
    #[must_use]
    pub fn entries(&self) -> Vec<MetricEntry> {
        let table = self.table.lock().unwrap_or_else(PoisonError::into_inner);

        let mut out: Vec<MetricEntry> = table
            .iter()
            .map(|(endpoint, slot)| MetricEntry {
                endpoint: *endpoint,
                calls: slot.calls,
                errors: slot.errors,
            })
            .collect();

        out.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));
        out
    }

    pub fn reset(&self) {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
