// Recording loop state machine.
//
// The loop never owns a timer: tick() and clock_advance() are single steps
// that report whether the caller should schedule the next one. The shell
// drives them off its event loop; tests drive them directly. Stopping is
// cooperative: a step that finds the loop Idle does nothing and asks not
// to be rescheduled.

use crate::models::{LiveRow, Record};
use crate::probe::MetricsProbe;
use crate::store::RecordStore;
use tokio::time::Duration;

pub const MIN_TICK_INTERVAL_MS: u64 = 1;
pub const MAX_TICK_INTERVAL_MS: u64 = 1000;

/// Delay between clock advances (wall-clock seconds counter).
pub const CLOCK_INTERVAL: Duration = Duration::from_millis(1000);

/// Narrow interface the core renders through. The shell implements this on
/// its display state; tests implement it on a recording buffer.
pub trait Presenter {
    fn render_live_row(&mut self, row: LiveRow);
    fn render_clock(&mut self, text: &str);
    fn render_history(&mut self, records: &[Record]);
}

/// `elapsed_seconds` as `MM:SS`, zero-padded, minutes unbounded past 59.
pub fn format_clock(elapsed_seconds: u64) -> String {
    format!("{:02}:{:02}", elapsed_seconds / 60, elapsed_seconds % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LoopState {
    active: bool,
    elapsed_seconds: u64,
    tick_interval_ms: u64,
}

pub struct SampleLoop<P> {
    probe: P,
    store: RecordStore,
    state: LoopState,
}

impl<P: MetricsProbe> SampleLoop<P> {
    /// `tick_interval_ms` must already be validated (config does).
    pub fn new(probe: P, store: RecordStore, tick_interval_ms: u64) -> Self {
        Self {
            probe,
            store,
            state: LoopState {
                active: false,
                elapsed_seconds: 0,
                tick_interval_ms,
            },
        }
    }

    pub fn is_recording(&self) -> bool {
        self.state.active
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.state.elapsed_seconds
    }

    /// Current tick interval; a change applies to the next schedule, never
    /// to a delay already in flight.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.state.tick_interval_ms)
    }

    /// Idle -> Running. Resets the elapsed clock. No-op while Running.
    pub fn start(&mut self) {
        if self.state.active {
            return;
        }
        self.state.active = true;
        self.state.elapsed_seconds = 0;
        tracing::info!(
            tick_interval_ms = self.state.tick_interval_ms,
            "recording started"
        );
    }

    /// Running -> Idle. Resets the elapsed clock; in-flight steps observe
    /// the Idle state and self-terminate instead of rescheduling.
    pub fn stop(&mut self) {
        if !self.state.active {
            return;
        }
        self.state.active = false;
        self.state.elapsed_seconds = 0;
        tracing::info!("recording stopped");
    }

    /// Apply a new tick interval. Only 1..=1000 ms is accepted; anything
    /// else leaves the state untouched and returns false.
    pub fn set_tick_interval(&mut self, ms: u64) -> bool {
        if !(MIN_TICK_INTERVAL_MS..=MAX_TICK_INTERVAL_MS).contains(&ms) {
            tracing::warn!(ms, "tick interval out of range, ignored");
            return false;
        }
        self.state.tick_interval_ms = ms;
        tracing::info!(ms, "tick interval changed");
        true
    }

    /// One sampling step: read, render the three live rows, persist.
    /// Returns whether the caller should schedule the next tick. A tick
    /// that lands after stop() does nothing. Probe and store errors
    /// propagate; there is no retry.
    pub async fn tick(&mut self, presenter: &mut dyn Presenter) -> anyhow::Result<bool> {
        if !self.state.active {
            return Ok(false);
        }

        let sample = self.probe.read_sample()?;
        for row in <[LiveRow; 3]>::from(&sample) {
            presenter.render_live_row(row);
        }
        let id = self.store.append(&sample).await?;
        tracing::debug!(id, cpu = sample.cpu_percent, "sample recorded");

        Ok(self.state.active)
    }

    /// One clock step: bump the elapsed counter and render it as MM:SS.
    /// Returns whether the caller should schedule the next advance.
    pub fn clock_advance(&mut self, presenter: &mut dyn Presenter) -> bool {
        if !self.state.active {
            return false;
        }
        self.state.elapsed_seconds += 1;
        presenter.render_clock(&format_clock(self.state.elapsed_seconds));
        self.state.active
    }

    /// Render every stored sample, oldest first.
    pub async fn history(&self, presenter: &mut dyn Presenter) -> anyhow::Result<()> {
        let records = self.store.all().await?;
        presenter.render_history(&records);
        Ok(())
    }

    /// Release the store. Consumes the loop; nothing can run afterwards.
    pub async fn shutdown(self) {
        self.store.close().await;
    }
}
