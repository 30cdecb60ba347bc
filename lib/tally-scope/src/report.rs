/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::ops::Deref;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use flume::{Receiver, RecvTimeoutError, Sender};
use log::{debug, info, warn};

use tally_types::metrics::identity;

use crate::{Scope, ScopeConfig, ScopeRegistry, StatsReporter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// No background thread, passes only run on [`RootScope::report`].
    Idle,
    Running,
    Closing,
    Closed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushSummary {
    pub counters: usize,
    pub gauges: usize,
    pub errors: usize,
}

struct ReportErrorLog {
    create_instant: Instant,
    last_error_report: Option<u64>,
}

impl ReportErrorLog {
    fn new() -> Self {
        ReportErrorLog {
            create_instant: Instant::now(),
            last_error_report: None,
        }
    }

    fn handle(&mut self, e: &anyhow::Error) {
        let time_slice = self.create_instant.elapsed().as_secs() >> 6; // every 64s
        if self.last_error_report != Some(time_slice) {
            warn!("sending metrics error: {e:?}");
            self.last_error_report = Some(time_slice);
        }
    }
}

struct ReportState {
    loop_state: LoopState,
    reporter: Option<Box<dyn StatsReporter>>,
    error_log: ReportErrorLog,
}

struct Reporting {
    registry: Arc<ScopeRegistry>,
    state: Mutex<ReportState>,
}

impl Reporting {
    fn run_pass(&self) -> FlushSummary {
        let mut state = self.state.lock().unwrap();
        match state.loop_state {
            LoopState::Closing | LoopState::Closed => FlushSummary::default(),
            LoopState::Idle | LoopState::Running => self.flush_locked(&mut state),
        }
    }

    /// Run the final pass and close the reporter.
    ///
    /// Returns `None` if another caller already did.
    fn close(&self) -> Option<anyhow::Result<()>> {
        let mut state = self.state.lock().unwrap();
        match state.loop_state {
            LoopState::Closing | LoopState::Closed => return None,
            LoopState::Idle | LoopState::Running => {}
        }
        state.loop_state = LoopState::Closing;
        let summary = self.flush_locked(&mut state);
        info!(
            "metrics final report: {} counters, {} gauges, {} errors",
            summary.counters, summary.gauges, summary.errors
        );

        let r = match state.reporter.as_mut() {
            Some(reporter) => reporter.close().context("failed to close metrics reporter"),
            None => Ok(()),
        };
        state.loop_state = LoopState::Closed;
        Some(r)
    }

    fn flush_locked(&self, state: &mut ReportState) -> FlushSummary {
        let mut summary = FlushSummary::default();
        let ReportState {
            reporter,
            error_log,
            ..
        } = state;
        let Some(reporter) = reporter.as_mut() else {
            return summary;
        };

        for scope in self.registry.scopes() {
            let tags = scope.tags();
            for (name, counter) in scope.counters() {
                let delta = counter.consume_delta();
                if delta == 0 {
                    continue;
                }
                match reporter.report_counter(&name, tags, delta) {
                    Ok(_) => summary.counters += 1,
                    Err(e) => {
                        summary.errors += 1;
                        error_log.handle(&e.context(format!(
                            "failed to report counter {}",
                            identity(&name, tags)
                        )));
                    }
                }
            }
            for (name, gauge) in scope.gauges() {
                let (value, dirty) = gauge.consume_if_dirty();
                if !dirty {
                    continue;
                }
                match reporter.report_gauge(&name, tags, value) {
                    Ok(_) => summary.gauges += 1,
                    Err(e) => {
                        summary.errors += 1;
                        error_log.handle(&e.context(format!(
                            "failed to report gauge {}",
                            identity(&name, tags)
                        )));
                    }
                }
            }
        }

        if let Err(e) = reporter.flush() {
            summary.errors += 1;
            error_log.handle(&e.context("failed to flush metrics reporter"));
        }
        debug!(
            "metrics report pass: {} counters, {} gauges, {} errors",
            summary.counters, summary.gauges, summary.errors
        );
        summary
    }

    fn loop_state(&self) -> LoopState {
        self.state.lock().unwrap().loop_state
    }
}

/// Wait until `interval` after `instant_start`.
///
/// Returns false if the quit channel fired or was disconnected.
fn wait_interval(quit: &Receiver<()>, interval: Duration, instant_start: Instant) -> bool {
    let r = match instant_start.checked_add(interval) {
        Some(instant_next) => quit.recv_deadline(instant_next),
        None => quit.recv_timeout(interval),
    };
    matches!(r, Err(RecvTimeoutError::Timeout))
}

fn spawn_report_thread(
    reporting: Arc<Reporting>,
    interval: Duration,
    quit: Receiver<()>,
) -> anyhow::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("stat-report".to_string())
        .spawn(move || {
            info!("metrics report thread started");
            let mut instant_start = Instant::now();
            while wait_interval(&quit, interval, instant_start) {
                instant_start = Instant::now();
                reporting.run_pass();
                if reporting.loop_state() != LoopState::Running {
                    break;
                }
            }
            info!("metrics report thread stopped");
        })
        .map_err(|e| anyhow!("failed to spawn thread: {e:?}"))
}

struct ReportWorker {
    quit: Sender<()>,
    handle: JoinHandle<()>,
}

/// The owner of a scope tree and its report loop.
///
/// Dereferences to the root [`Scope`]. Dropping it closes the loop.
pub struct RootScope {
    scope: Arc<Scope>,
    reporting: Arc<Reporting>,
    worker: Mutex<Option<ReportWorker>>,
}

impl RootScope {
    /// Create a root scope reporting to `reporter`.
    ///
    /// A background thread runs a pass every `report_interval`. With a zero
    /// interval only [`RootScope::report`] and [`RootScope::close`] run passes.
    pub fn new<R>(config: &ScopeConfig, reporter: R) -> anyhow::Result<Self>
    where
        R: StatsReporter + 'static,
    {
        RootScope::build(config, Box::new(reporter))
    }

    /// Create a root scope that never reports. Snapshots still work.
    pub fn without_reporter(config: &ScopeConfig) -> Self {
        let (scope, reporting) = RootScope::register(config, None, LoopState::Idle);
        RootScope {
            scope,
            reporting,
            worker: Mutex::new(None),
        }
    }

    fn build(config: &ScopeConfig, reporter: Box<dyn StatsReporter>) -> anyhow::Result<Self> {
        let interval = config.report_interval;
        if interval.is_zero() {
            info!("metrics report interval is zero, automatic reporting disabled");
            let (scope, reporting) = RootScope::register(config, Some(reporter), LoopState::Idle);
            return Ok(RootScope {
                scope,
                reporting,
                worker: Mutex::new(None),
            });
        }

        let (scope, reporting) = RootScope::register(config, Some(reporter), LoopState::Running);
        let (quit, quit_receiver) = flume::bounded(1);
        let handle = spawn_report_thread(reporting.clone(), interval, quit_receiver)
            .context("failed to spawn metrics report thread")?;
        Ok(RootScope {
            scope,
            reporting,
            worker: Mutex::new(Some(ReportWorker { quit, handle })),
        })
    }

    fn register(
        config: &ScopeConfig,
        reporter: Option<Box<dyn StatsReporter>>,
        loop_state: LoopState,
    ) -> (Arc<Scope>, Arc<Reporting>) {
        let registry = Arc::new(ScopeRegistry::new());
        let prefix = config.prefix();
        let tags = config.tags().clone();
        let key = identity(prefix, &tags);
        let weak = Arc::downgrade(&registry);
        let scope = registry.get_or_create(&key, || {
            Scope::new(
                prefix.to_string(),
                config.separator().clone(),
                tags,
                key.clone(),
                weak,
            )
        });

        let reporting = Arc::new(Reporting {
            registry,
            state: Mutex::new(ReportState {
                loop_state,
                reporter,
                error_log: ReportErrorLog::new(),
            }),
        });
        (scope, reporting)
    }

    #[inline]
    pub fn scope(&self) -> &Arc<Scope> {
        &self.scope
    }

    #[inline]
    pub fn registry(&self) -> &Arc<ScopeRegistry> {
        &self.reporting.registry
    }

    pub fn state(&self) -> LoopState {
        self.reporting.loop_state()
    }

    /// Run one report pass now. Does nothing after close.
    pub fn report(&self) -> FlushSummary {
        self.reporting.run_pass()
    }

    /// Stop the report thread, run the final pass and close the reporter.
    ///
    /// Only the first call does any work, later calls return `Ok(())`.
    pub fn close(&self) -> anyhow::Result<()> {
        let worker = self.worker.lock().unwrap().take();
        let r = self.reporting.close().unwrap_or(Ok(()));
        if let Some(worker) = worker {
            drop(worker.quit);
            if worker.handle.join().is_err() {
                warn!("metrics report thread panicked");
            }
        }
        r
    }
}

impl Deref for RootScope {
    type Target = Scope;

    fn deref(&self) -> &Scope {
        &self.scope
    }
}

impl Drop for RootScope {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("failed to close metrics root scope: {e:?}");
        }
    }
}
