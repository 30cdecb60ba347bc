/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use tally_types::metrics::MetricTagMap;

/// The sink a report pass forwards metric values to.
///
/// Calls within one pass are serialized, and `flush` is called once at the end
/// of every pass. An error is logged and counted by the caller. The values
/// passed to the failing call are not retried.
pub trait StatsReporter: Send {
    fn report_counter(&mut self, name: &str, tags: &MetricTagMap, value: i64)
        -> anyhow::Result<()>;

    fn report_gauge(&mut self, name: &str, tags: &MetricTagMap, value: f64)
        -> anyhow::Result<()>;

    fn flush(&mut self) -> anyhow::Result<()>;

    /// Called once after the final pass when the root scope is closed.
    fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
