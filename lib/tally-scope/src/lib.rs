/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::ScopeConfig;

mod metric;
pub use metric::{Counter, Gauge};

mod registry;
pub use registry::ScopeRegistry;

mod report;
pub use report::{FlushSummary, LoopState, RootScope};

mod reporter;
pub use reporter::StatsReporter;

mod scope;
pub use scope::Scope;

mod snapshot;
pub use snapshot::{CounterSnapshot, GaugeSnapshot, Snapshot};
