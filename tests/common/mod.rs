// Shared test helpers

#![allow(dead_code)]

use sysrec::models::{LiveRow, Record, Sample};
use sysrec::probe::{MetricsProbe, ProbeError};
use sysrec::recorder::Presenter;

pub fn fixed_sample() -> Sample {
    Sample {
        cpu_percent: 10.5,
        memory_free_kb: 1024,
        memory_total_kb: 2048,
        disk_free_kb: 512,
        disk_total_kb: 1024,
    }
}

/// Probe that returns the same reading on every tick.
pub struct FixedProbe(pub Sample);

impl MetricsProbe for FixedProbe {
    fn read_cpu(&mut self) -> f64 {
        self.0.cpu_percent
    }

    fn read_memory(&mut self) -> (u64, u64) {
        (self.0.memory_free_kb, self.0.memory_total_kb)
    }

    fn read_disk(&mut self) -> Result<(u64, u64), ProbeError> {
        Ok((self.0.disk_free_kb, self.0.disk_total_kb))
    }
}

/// Presenter that records every render call for assertions.
#[derive(Default)]
pub struct RecordingPresenter {
    pub live_rows: Vec<LiveRow>,
    pub clocks: Vec<String>,
    pub history: Vec<Vec<Record>>,
}

impl Presenter for RecordingPresenter {
    fn render_live_row(&mut self, row: LiveRow) {
        self.live_rows.push(row);
    }

    fn render_clock(&mut self, text: &str) {
        self.clocks.push(text.to_string());
    }

    fn render_history(&mut self, records: &[Record]) {
        self.history.push(records.to_vec());
    }
}
