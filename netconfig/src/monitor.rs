//! Live monitor: re-resolve every registered interface on a fixed interval and redraw the
//! status table in place until cancelled.
//!
//! ```text
//! Idle -> Rendering -> Waiting -> Rendering -> ... -> Stopped
//! ```

use crate::{
    registry::Registry,
    render::{MONITOR_HINT, MONITOR_TITLE, Renderer, status_table},
    resolver::StatusResolver,
};
use chrono::{Local, NaiveDate};
use netconfig_data::TimeSeriesProvider;
use std::{future::Future, io, time::Duration};
use tracing::{debug, info};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
pub const STOPPED_NOTICE: &str = "Real-time monitoring stopped";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Rendering,
    Waiting,
    Stopped,
}

/// Drives the monitor state machine against a [`Renderer`].
#[derive(Debug)]
pub struct LiveMonitor<'a, P, R> {
    resolver: &'a StatusResolver<P>,
    renderer: R,
    interval: Duration,
    state: MonitorState,
    /// Lines printed by the last cycle; `None` before the first full render
    previous_line_count: Option<usize>,
    cycles: usize,
    today: Option<NaiveDate>,
}

impl<'a, P, R> LiveMonitor<'a, P, R>
where
    P: TimeSeriesProvider,
    R: Renderer,
{
    pub fn new(resolver: &'a StatusResolver<P>, renderer: R) -> Self {
        Self {
            resolver,
            renderer,
            interval: DEFAULT_REFRESH_INTERVAL,
            state: MonitorState::Idle,
            previous_line_count: None,
            cycles: 0,
            today: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Pin the trailing-window end date instead of following the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }

    pub fn previous_line_count(&self) -> Option<usize> {
        self.previous_line_count
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Resolve every registered interface and print the table: in full on the first cycle,
    /// in place afterwards. Returns the number of lines printed.
    ///
    /// The row count is taken from `registry` on every call.
    pub async fn render_cycle(&mut self, registry: &Registry) -> io::Result<usize> {
        self.state = MonitorState::Rendering;

        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let results = self.resolver.resolve_all_at(registry, today).await;
        let lines = status_table(MONITOR_TITLE, &results, Local::now(), Some(MONITOR_HINT));

        match self.previous_line_count {
            None => self.renderer.render_full(&lines)?,
            Some(previous) => self.renderer.update_in_place(&lines, previous)?,
        }

        self.previous_line_count = Some(lines.len());
        self.cycles += 1;
        debug!(cycle = self.cycles, lines = lines.len(), "monitor cycle rendered");
        Ok(lines.len())
    }

    /// Run until `shutdown` completes. Cancellation is honoured while rendering and while
    /// waiting; a cycle interrupted mid-resolution prints nothing.
    pub async fn run<F>(&mut self, registry: &Registry, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(interval = ?self.interval, interfaces = registry.len(), "starting live monitor");

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                rendered = self.render_cycle(registry) => { rendered?; }
            }

            self.state = MonitorState::Waiting;
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        self.state = MonitorState::Stopped;
        self.renderer.notice("")?;
        self.renderer.notice(STOPPED_NOTICE)?;
        info!(cycles = self.cycles, "live monitor stopped");
        Ok(())
    }
}
