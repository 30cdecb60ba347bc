/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

/// A monotonic-by-convention signed counter.
///
/// Each report pass emits the difference between the current value and the
/// value seen at the previous pass.
#[derive(Debug, Default)]
pub struct Counter {
    curr: AtomicI64,
    prev: AtomicI64,
}

impl Counter {
    #[inline]
    pub fn inc(&self, delta: i64) {
        self.curr.fetch_add(delta, Ordering::Relaxed);
    }

    /// Current accumulated value.
    #[inline]
    pub fn value(&self) -> i64 {
        self.curr.load(Ordering::Relaxed)
    }

    /// Value accumulated since the last report pass, without consuming it.
    pub fn snapshot(&self) -> i64 {
        // the baseline must be read first, a later current value is never
        // behind the one it was taken from
        let prev = self.prev.load(Ordering::Acquire);
        let curr = self.curr.load(Ordering::Relaxed);
        curr.wrapping_sub(prev)
    }

    /// Consume the value accumulated since the last call.
    ///
    /// Concurrent callers never see the same increment twice.
    pub fn consume_delta(&self) -> i64 {
        let mut prev = self.prev.load(Ordering::Acquire);
        loop {
            let curr = self.curr.load(Ordering::Relaxed);
            match self
                .prev
                .compare_exchange(prev, curr, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return curr.wrapping_sub(prev),
                Err(p) => prev = p,
            }
        }
    }
}

/// A last-value-wins floating point gauge.
///
/// A gauge is only reported when it was updated since the last report pass.
#[derive(Debug, Default)]
pub struct Gauge {
    bits: AtomicU64,
    updated: AtomicBool,
}

impl Gauge {
    #[inline]
    pub fn update(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
        self.updated.store(true, Ordering::Release);
    }

    #[inline]
    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    /// Return the latest value and whether it was updated since the last call,
    /// clearing the updated flag.
    pub fn consume_if_dirty(&self) -> (f64, bool) {
        let dirty = self.updated.swap(false, Ordering::Acquire);
        (self.value(), dirty)
    }
}
