/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, Weak};

use foldhash::fast::FixedState;
use log::warn;
use smol_str::SmolStr;

use tally_types::metrics::{MetricTagMap, NodeName, identity};

use crate::{Counter, Gauge, ScopeRegistry, Snapshot};

struct Registered<T> {
    full_name: Arc<str>,
    metric: Arc<T>,
}

type MetricMap<T> = HashMap<String, Registered<T>, FixedState>;

fn get_or_register<T: Default>(
    lock: &RwLock<MetricMap<T>>,
    name: &str,
    full_name: impl FnOnce() -> String,
) -> Arc<T> {
    if let Some(r) = lock.read().unwrap().get(name) {
        return r.metric.clone();
    }

    let mut map = lock.write().unwrap();
    map.entry(name.to_string())
        .or_insert_with(|| Registered {
            full_name: Arc::from(full_name()),
            metric: Arc::new(T::default()),
        })
        .metric
        .clone()
}

fn registered_list<T>(lock: &RwLock<MetricMap<T>>) -> Vec<(Arc<str>, Arc<T>)> {
    let map = lock.read().unwrap();
    map.values()
        .map(|r| (r.full_name.clone(), r.metric.clone()))
        .collect()
}

/// A named and tagged namespace of counters and gauges.
///
/// Scopes are created by [`crate::RootScope`] and derived with
/// [`Scope::tagged`] and [`Scope::sub_scope`]. Deriving the same prefix and
/// tags twice yields the same instance.
pub struct Scope {
    prefix: String,
    separator: SmolStr,
    tags: MetricTagMap,
    identity: String,
    registry: Weak<ScopeRegistry>,
    counters: RwLock<MetricMap<Counter>>,
    gauges: RwLock<MetricMap<Gauge>>,
}

impl Scope {
    pub(crate) fn new(
        prefix: String,
        separator: SmolStr,
        tags: MetricTagMap,
        identity: String,
        registry: Weak<ScopeRegistry>,
    ) -> Self {
        Scope {
            prefix,
            separator,
            tags,
            identity,
            registry,
            counters: RwLock::new(HashMap::with_hasher(FixedState::with_seed(0))),
            gauges: RwLock::new(HashMap::with_hasher(FixedState::with_seed(0))),
        }
    }

    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[inline]
    pub fn tags(&self) -> &MetricTagMap {
        &self.tags
    }

    #[inline]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Get the counter registered under `name`, creating it on first use.
    ///
    /// Names are not validated. They are expected to be compile time constants.
    pub fn counter(&self, name: &str) -> Arc<Counter> {
        get_or_register(&self.counters, name, || self.full_name(name))
    }

    /// Get the gauge registered under `name`, creating it on first use.
    pub fn gauge(&self, name: &str) -> Arc<Gauge> {
        get_or_register(&self.gauges, name, || self.full_name(name))
    }

    /// Derive a scope with the same prefix and `tags` merged over ours.
    pub fn tagged(&self, tags: &MetricTagMap) -> Arc<Scope> {
        let merged = self.tags.merged(tags);
        self.derive(self.prefix.clone(), merged)
    }

    /// Derive a scope with `part` appended to our prefix and the same tags.
    pub fn sub_scope(&self, part: &NodeName) -> Arc<Scope> {
        let prefix = self.full_name(part.as_str());
        self.derive(prefix, self.tags.clone())
    }

    pub fn full_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            return name.to_string();
        }
        let mut s = String::with_capacity(self.prefix.len() + self.separator.len() + name.len());
        s.push_str(&self.prefix);
        s.push_str(&self.separator);
        s.push_str(name);
        s
    }

    /// Point-in-time view of every scope sharing our registry.
    pub fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot::default();
        match self.registry.upgrade() {
            Some(registry) => {
                for scope in registry.scopes() {
                    snap.add_scope(&scope);
                }
            }
            None => snap.add_scope(self),
        }
        snap
    }

    pub(crate) fn counters(&self) -> Vec<(Arc<str>, Arc<Counter>)> {
        registered_list(&self.counters)
    }

    pub(crate) fn gauges(&self) -> Vec<(Arc<str>, Arc<Gauge>)> {
        registered_list(&self.gauges)
    }

    fn derive(&self, prefix: String, tags: MetricTagMap) -> Arc<Scope> {
        let key = identity(&prefix, &tags);
        match self.registry.upgrade() {
            Some(registry) => {
                let weak = Arc::downgrade(&registry);
                registry.get_or_create(&key, || {
                    Scope::new(prefix, self.separator.clone(), tags, key.clone(), weak)
                })
            }
            None => {
                warn!(
                    "metrics registry has been dropped, scope {key} will not be reported"
                );
                Arc::new(Scope::new(
                    prefix,
                    self.separator.clone(),
                    tags,
                    key,
                    Weak::new(),
                ))
            }
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("prefix", &self.prefix)
            .field("tags", &self.tags)
            .field("identity", &self.identity)
            .finish()
    }
}
