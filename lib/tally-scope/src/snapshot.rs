/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;

use tally_types::metrics::{MetricTagMap, identity};

use crate::Scope;

#[derive(Clone, Debug, PartialEq)]
pub struct CounterSnapshot {
    pub name: String,
    pub tags: MetricTagMap,
    /// Value accumulated since the last report pass.
    pub value: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GaugeSnapshot {
    pub name: String,
    pub tags: MetricTagMap,
    pub value: f64,
}

/// An immutable view of metric values, keyed by the identity of
/// (full name, tags).
///
/// Taking a snapshot does not touch report state.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    counters: HashMap<String, CounterSnapshot>,
    gauges: HashMap<String, GaugeSnapshot>,
}

impl Snapshot {
    pub fn counters(&self) -> &HashMap<String, CounterSnapshot> {
        &self.counters
    }

    pub fn gauges(&self) -> &HashMap<String, GaugeSnapshot> {
        &self.gauges
    }

    pub fn counter(&self, full_name: &str, tags: &MetricTagMap) -> Option<&CounterSnapshot> {
        self.counters.get(&identity(full_name, tags))
    }

    pub fn gauge(&self, full_name: &str, tags: &MetricTagMap) -> Option<&GaugeSnapshot> {
        self.gauges.get(&identity(full_name, tags))
    }

    pub(crate) fn add_scope(&mut self, scope: &Scope) {
        let tags = scope.tags();
        for (name, counter) in scope.counters() {
            self.counters.insert(
                identity(&name, tags),
                CounterSnapshot {
                    name: name.to_string(),
                    tags: tags.clone(),
                    value: counter.snapshot(),
                },
            );
        }
        for (name, gauge) in scope.gauges() {
            self.gauges.insert(
                identity(&name, tags),
                GaugeSnapshot {
                    name: name.to_string(),
                    tags: tags.clone(),
                    value: gauge.value(),
                },
            );
        }
    }
}
