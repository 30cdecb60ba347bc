/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;
use std::fmt::{self, Write};
use std::str::FromStr;

use crate::metrics::{MetricTagName, MetricTagValue, ParseError};

/// Tags ordered by name, so iteration order is stable for identity keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricTagMap {
    inner: BTreeMap<MetricTagName, MetricTagValue>,
}

impl MetricTagMap {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn insert(&mut self, name: MetricTagName, value: MetricTagValue) -> Option<MetricTagValue> {
        self.inner.insert(name, value)
    }

    #[inline]
    pub fn contains(&self, key: &MetricTagName) -> bool {
        self.inner.contains_key(key)
    }

    #[inline]
    pub fn get(&self, key: &MetricTagName) -> Option<&MetricTagValue> {
        self.inner.get(key)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&MetricTagName, &MetricTagValue)> {
        self.inner.iter()
    }

    /// Build a map from raw string pairs, validating each name and value.
    ///
    /// A later pair wins over an earlier one with the same name.
    pub fn try_from_pairs<I, K, V>(pairs: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = MetricTagMap::default();
        for (k, v) in pairs {
            let name = MetricTagName::from_str(k.as_ref())?;
            let value = MetricTagValue::from_str(v.as_ref())?;
            map.insert(name, value);
        }
        Ok(map)
    }

    /// Return a copy of `self` overlaid with `other`.
    ///
    /// Entries in `other` replace entries in `self` with the same name.
    pub fn merged(&self, other: &MetricTagMap) -> MetricTagMap {
        if other.is_empty() {
            return self.clone();
        }
        let mut map = self.clone();
        for (name, value) in other.iter() {
            map.insert(name.clone(), value.clone());
        }
        map
    }

    pub fn display_statsd(&self) -> DisplayTagMap<'_> {
        DisplayTagMap {
            inner: self,
            assign_delimiter: ':',
            next_delimiter: ',',
        }
    }
}

impl FromIterator<(MetricTagName, MetricTagValue)> for MetricTagMap {
    fn from_iter<T: IntoIterator<Item = (MetricTagName, MetricTagValue)>>(iter: T) -> Self {
        MetricTagMap {
            inner: BTreeMap::from_iter(iter),
        }
    }
}

pub struct DisplayTagMap<'a> {
    inner: &'a MetricTagMap,
    assign_delimiter: char,
    next_delimiter: char,
}

impl fmt::Display for DisplayTagMap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.inner.inner.iter();
        let Some((name, value)) = iter.next() else {
            return Ok(());
        };
        f.write_str(name.as_str())?;
        f.write_char(self.assign_delimiter)?;
        f.write_str(value.as_str())?;

        for (name, value) in iter {
            f.write_char(self.next_delimiter)?;
            f.write_str(name.as_str())?;
            f.write_char(self.assign_delimiter)?;
            f.write_str(value.as_str())?;
        }
        Ok(())
    }
}
