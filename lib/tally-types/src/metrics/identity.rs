/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::LazyLock;

use flume::{Receiver, Sender};

use super::{MetricTagMap, NAME_SEPARATOR, PAIR_SEPARATOR, PREFIX_SEPARATOR};

const DEFAULT_POOL_SIZE: usize = 512;
const DEFAULT_BUFFER_CAPACITY: usize = 256;

static GLOBAL_IDENTITY_POOL: LazyLock<IdentityPool> =
    LazyLock::new(|| IdentityPool::new(DEFAULT_POOL_SIZE, DEFAULT_BUFFER_CAPACITY));

/// Compute the identity key of a (prefix, tags) pair with the global pool.
///
/// The key is `prefix+k1=v1,k2=v2` with tags in name order. The `+` is left
/// out when the prefix is empty.
pub fn identity(prefix: &str, tags: &MetricTagMap) -> String {
    GLOBAL_IDENTITY_POOL.identity(prefix, tags)
}

/// A bounded pool of scratch buffers used to build identity keys.
///
/// The key is built in a pooled buffer and then copied out at its exact
/// length, so the pool only saves the regrowth of scratch space. An empty
/// pool falls back to a fresh allocation. A full pool, or a buffer grown past
/// `buffer_capacity`, drops the returned buffer. Callers never block.
pub struct IdentityPool {
    sender: Sender<String>,
    receiver: Receiver<String>,
    buffer_capacity: usize,
}

impl IdentityPool {
    pub fn new(size: usize, buffer_capacity: usize) -> Self {
        let (sender, receiver) = flume::bounded(size);
        IdentityPool {
            sender,
            receiver,
            buffer_capacity,
        }
    }

    pub fn identity(&self, prefix: &str, tags: &MetricTagMap) -> String {
        let mut buf = self.get();
        write_identity(&mut buf, prefix, tags);
        let key = buf.as_str().to_string();
        self.put(buf);
        key
    }

    /// Number of buffers currently parked in the pool.
    pub fn idle(&self) -> usize {
        self.receiver.len()
    }

    fn get(&self) -> String {
        self.receiver
            .try_recv()
            .unwrap_or_else(|_| String::with_capacity(self.buffer_capacity))
    }

    fn put(&self, mut buf: String) {
        if buf.capacity() > self.buffer_capacity {
            return;
        }
        buf.clear();
        let _ = self.sender.try_send(buf);
    }
}

fn write_identity(buf: &mut String, prefix: &str, tags: &MetricTagMap) {
    if !prefix.is_empty() {
        buf.push_str(prefix);
        buf.push(PREFIX_SEPARATOR);
    }

    let mut iter = tags.iter();
    let Some((name, value)) = iter.next() else {
        return;
    };
    buf.push_str(name.as_str());
    buf.push(NAME_SEPARATOR);
    buf.push_str(value.as_str());

    for (name, value) in iter {
        buf.push(PAIR_SEPARATOR);
        buf.push_str(name.as_str());
        buf.push(NAME_SEPARATOR);
        buf.push_str(value.as_str());
    }
}
