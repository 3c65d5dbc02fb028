// Domain models

use serde::{Deserialize, Serialize};

/// One polled reading of CPU/memory/disk. Immutable once produced.
/// `cpu_percent` is [0,100]; the remaining fields are KiB (bytes / 1024, truncated).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub cpu_percent: f64,
    pub memory_free_kb: u64,
    pub memory_total_kb: u64,
    pub disk_free_kb: u64,
    pub disk_total_kb: u64,
}

/// A sample as persisted: the store-assigned identifier plus the reading.
/// Identifiers are unique and strictly increasing in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub sample: Sample,
}

/// Metric source shown in the live table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Memory,
    Disk,
}

impl Device {
    pub fn label(self) -> &'static str {
        match self {
            Device::Cpu => "CPU",
            Device::Memory => "MEM",
            Device::Disk => "DISK",
        }
    }
}

/// Cell value in a live table row. CPU has no free/total split, so its row
/// carries the percentage in the "free" column and a dash in "total".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowValue {
    Percent(f64),
    Kib(u64),
    Dash,
}

impl std::fmt::Display for RowValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowValue::Percent(p) => write!(f, "{}", p),
            RowValue::Kib(kb) => write!(f, "{}", kb),
            RowValue::Dash => write!(f, "-"),
        }
    }
}

/// One row of the live table, as handed to the presentation layer each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveRow {
    pub device: Device,
    pub free: RowValue,
    pub total: RowValue,
}

impl LiveRow {
    pub fn cpu(percent: f64) -> Self {
        Self {
            device: Device::Cpu,
            free: RowValue::Percent(percent),
            total: RowValue::Dash,
        }
    }

    pub fn memory(free_kb: u64, total_kb: u64) -> Self {
        Self {
            device: Device::Memory,
            free: RowValue::Kib(free_kb),
            total: RowValue::Kib(total_kb),
        }
    }

    pub fn disk(free_kb: u64, total_kb: u64) -> Self {
        Self {
            device: Device::Disk,
            free: RowValue::Kib(free_kb),
            total: RowValue::Kib(total_kb),
        }
    }
}

impl From<&Sample> for [LiveRow; 3] {
    fn from(s: &Sample) -> Self {
        [
            LiveRow::cpu(s.cpu_percent),
            LiveRow::memory(s.memory_free_kb, s.memory_total_kb),
            LiveRow::disk(s.disk_free_kb, s.disk_total_kb),
        ]
    }
}
