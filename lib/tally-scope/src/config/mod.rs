/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use smol_str::SmolStr;

use tally_types::metrics::{MetricTagMap, NodeName, ParseError};

#[cfg(feature = "yaml")]
mod yaml;

const DEFAULT_SEPARATOR: &str = ".";
const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ScopeConfig {
    prefix: Option<NodeName>,
    tags: MetricTagMap,
    separator: SmolStr,
    /// Zero disables the background report thread.
    pub report_interval: Duration,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        ScopeConfig {
            prefix: None,
            tags: MetricTagMap::default(),
            separator: SmolStr::new_static(DEFAULT_SEPARATOR),
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }
}

impl ScopeConfig {
    pub fn with_prefix(prefix: NodeName) -> Self {
        ScopeConfig {
            prefix: Some(prefix),
            ..Default::default()
        }
    }

    pub fn set_prefix(&mut self, prefix: NodeName) {
        self.prefix = Some(prefix);
    }

    pub fn set_tags(&mut self, tags: MetricTagMap) {
        self.tags = tags;
    }

    /// Set the string joining prefix nodes and metric names.
    ///
    /// The same rules as for node names apply.
    pub fn set_separator(&mut self, separator: &str) -> Result<(), ParseError> {
        let s = NodeName::from_str(separator)?;
        self.separator = SmolStr::new(s.as_str());
        Ok(())
    }

    pub fn prefix(&self) -> &str {
        self.prefix.as_ref().map(|p| p.as_str()).unwrap_or_default()
    }

    pub fn tags(&self) -> &MetricTagMap {
        &self.tags
    }

    pub fn separator(&self) -> &SmolStr {
        &self.separator
    }
}
