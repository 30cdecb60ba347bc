/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use foldhash::fast::FixedState;

use crate::Scope;

/// Every scope derived from one root, keyed by identity.
///
/// Scopes are never evicted. They point back here with a `Weak` reference.
pub struct ScopeRegistry {
    subscopes: RwLock<HashMap<String, Arc<Scope>, FixedState>>,
}

impl ScopeRegistry {
    pub(crate) fn new() -> Self {
        ScopeRegistry {
            subscopes: RwLock::new(HashMap::with_hasher(FixedState::with_seed(0))),
        }
    }

    pub fn get(&self, identity: &str) -> Option<Arc<Scope>> {
        let ht = self.subscopes.read().unwrap();
        ht.get(identity).cloned()
    }

    /// Return the scope stored for `identity`, creating it with `factory` if
    /// it is absent.
    ///
    /// The factory runs at most once per identity, even under concurrent calls.
    pub fn get_or_create<F>(&self, identity: &str, factory: F) -> Arc<Scope>
    where
        F: FnOnce() -> Scope,
    {
        if let Some(scope) = self.get(identity) {
            return scope;
        }

        let mut ht = self.subscopes.write().unwrap();
        ht.entry(identity.to_string())
            .or_insert_with(|| Arc::new(factory()))
            .clone()
    }

    /// Clone the current scope list, so no lock is held while reporting.
    pub fn scopes(&self) -> Vec<Arc<Scope>> {
        let ht = self.subscopes.read().unwrap();
        ht.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.subscopes.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscopes.read().unwrap().is_empty()
    }
}
