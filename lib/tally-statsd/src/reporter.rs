/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};

use tally_scope::StatsReporter;
use tally_types::metrics::{MetricTagMap, NodeName};

use crate::{StatsdMetricsSink, StatsdTagGroup};

enum MetricType {
    Count,
    Gauge,
}

impl MetricType {
    fn as_str(&self) -> &'static str {
        match self {
            MetricType::Count => "c",
            MetricType::Gauge => "g",
        }
    }
}

/// A [`StatsReporter`] writing the dogstatsd line format over a datagram
/// socket.
pub struct StatsdReporter {
    prefix: NodeName,
    sink: StatsdMetricsSink,
    tags: StatsdTagGroup,
    line: Vec<u8>,
}

impl StatsdReporter {
    pub(crate) fn new(prefix: NodeName, sink: StatsdMetricsSink) -> Self {
        StatsdReporter {
            prefix,
            sink,
            tags: StatsdTagGroup::default(),
            line: Vec::with_capacity(256),
        }
    }

    /// Add a tag sent with every metric.
    pub fn with_tag<T: AsRef<str>>(mut self, key: &str, value: T) -> Self {
        self.tags.add_tag(key, value);
        self
    }

    /// Add static tags sent with every metric.
    pub fn with_tag_map(mut self, tags: &MetricTagMap) -> Self {
        self.tags.add_tag_map(tags);
        self
    }

    fn emit(
        &mut self,
        metric_type: MetricType,
        name: &str,
        value: &[u8],
        tags: &MetricTagMap,
    ) -> anyhow::Result<()> {
        let buf = &mut self.line;
        buf.clear();
        if !self.prefix.is_empty() {
            buf.extend_from_slice(self.prefix.as_str().as_bytes());
            buf.push(b'.');
        }
        buf.extend_from_slice(name.as_bytes());
        buf.push(b':');
        buf.extend_from_slice(value);
        buf.push(b'|');
        buf.extend_from_slice(metric_type.as_str().as_bytes());

        if !self.tags.is_empty() || !tags.is_empty() {
            buf.extend_from_slice(b"|#");
            buf.extend_from_slice(self.tags.as_bytes());
            let mut append_tags = !self.tags.is_empty();
            for (k, v) in tags.iter() {
                if append_tags {
                    buf.push(b',');
                }
                buf.extend_from_slice(k.as_str().as_bytes());
                buf.push(b':');
                buf.extend_from_slice(v.as_str().as_bytes());
                append_tags = true;
            }
        }

        self.sink
            .emit(&self.line)
            .context("failed to send statsd metrics")
    }
}

impl StatsReporter for StatsdReporter {
    fn report_counter(
        &mut self,
        name: &str,
        tags: &MetricTagMap,
        value: i64,
    ) -> anyhow::Result<()> {
        let mut buffer = itoa::Buffer::new();
        let value = buffer.format(value);
        self.emit(MetricType::Count, name, value.as_bytes(), tags)
    }

    fn report_gauge(
        &mut self,
        name: &str,
        tags: &MetricTagMap,
        value: f64,
    ) -> anyhow::Result<()> {
        if !value.is_finite() {
            return Err(anyhow!("gauge {name} has non-finite value {value}"));
        }
        let mut buffer = ryu::Buffer::new();
        let value = buffer.format_finite(value);
        self.emit(MetricType::Gauge, name, value.as_bytes(), tags)
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        self.sink.flush().context("failed to send statsd metrics")
    }

    fn close(&mut self) -> anyhow::Result<()> {
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tally_scope::{RootScope, ScopeConfig};

    type Packets = Arc<Mutex<Vec<Vec<u8>>>>;

    fn new_reporter(prefix: &str, cache_size: usize) -> (Packets, StatsdReporter) {
        let packets = Arc::new(Mutex::new(Vec::new()));
        let sink = StatsdMetricsSink::buf_with_capacity(packets.clone(), cache_size, 4096);
        let prefix = if prefix.is_empty() {
            NodeName::default()
        } else {
            NodeName::from_str(prefix).unwrap()
        };
        (packets, StatsdReporter::new(prefix, sink))
    }

    fn joined(packets: &Packets) -> Vec<u8> {
        packets.lock().unwrap().join(&b'|')
    }

    #[test]
    fn count_simple() {
        let (packets, mut reporter) = new_reporter("test", 32);
        reporter
            .report_counter("count", &MetricTagMap::default(), 20)
            .unwrap();
        reporter.flush().unwrap();
        assert_eq!(joined(&packets), b"test.count:20|c");
    }

    #[test]
    fn gauge_with_tags_no_prefix() {
        let (packets, mut reporter) = new_reporter("", 32);
        let tags = MetricTagMap::try_from_pairs([("t", "v")]).unwrap();
        reporter.report_gauge("gauge", &tags, 20.5).unwrap();
        reporter.flush().unwrap();
        assert_eq!(joined(&packets), b"gauge:20.5|g|#t:v");
    }

    #[test]
    fn count_with_tags() {
        let (packets, reporter) = new_reporter("test", 64);
        let static_tags = MetricTagMap::try_from_pairs([("tag1", "1234")]).unwrap();
        let mut reporter = reporter.with_tag_map(&static_tags);
        let tags = MetricTagMap::try_from_pairs([("tag2", "a")]).unwrap();
        reporter.report_counter("count", &tags, -3).unwrap();
        reporter
            .report_counter("count", &MetricTagMap::default(), 30)
            .unwrap();
        reporter.flush().unwrap();
        assert_eq!(
            joined(&packets),
            b"test.count:-3|c|#tag1:1234,tag2:a\ntest.count:30|c|#tag1:1234"
        );
    }

    #[test]
    fn gauge_non_finite() {
        let (packets, mut reporter) = new_reporter("test", 32);
        let tags = MetricTagMap::default();
        assert!(reporter.report_gauge("g", &tags, f64::NAN).is_err());
        assert!(reporter.report_gauge("g", &tags, f64::INFINITY).is_err());
        reporter.flush().unwrap();
        assert!(packets.lock().unwrap().is_empty());
    }

    #[test]
    fn batch_overflow() {
        let (packets, mut reporter) = new_reporter("test", 32);
        let tags = MetricTagMap::default();
        reporter.report_counter("count", &tags, 20).unwrap();
        reporter.report_counter("count", &tags, 30).unwrap();
        reporter.report_counter("count", &tags, 40).unwrap();
        reporter.flush().unwrap();

        let packets = packets.lock().unwrap();
        assert_eq!(
            packets.as_slice(),
            &[
                b"test.count:20|c\ntest.count:30|c".to_vec(),
                b"test.count:40|c".to_vec()
            ]
        );
    }

    #[test]
    fn root_scope_pass() {
        let (packets, reporter) = new_reporter("agent", 1024);
        let mut config = ScopeConfig::default();
        config.report_interval = Duration::ZERO;
        let root = RootScope::new(&config, reporter).unwrap();

        root.counter("PollCount").inc(3);
        root.gauge("Alloc").update(1024.0);
        let summary = root.report();
        assert_eq!(summary.counters, 1);
        assert_eq!(summary.gauges, 1);
        assert_eq!(summary.errors, 0);

        let packets = packets.lock().unwrap();
        assert_eq!(packets.len(), 1);
        let text = String::from_utf8(packets[0].clone()).unwrap();
        let mut lines: Vec<&str> = text.split('\n').collect();
        lines.sort();
        assert_eq!(lines, vec!["agent.Alloc:1024.0|g", "agent.PollCount:3|c"]);
    }
}
