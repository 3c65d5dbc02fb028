// Hardware metrics via sysinfo (psutil equivalent).
// Disk usage goes through statvfs per mount point: sysinfo's Disks never
// reports a per-partition failure, and the contract here is that a mount
// we are not allowed to query is excluded from the totals entirely.

use crate::models::Sample;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use sysinfo::{Disks, System};

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("disk usage for {mount}: {source}")]
    Disk {
        mount: PathBuf,
        source: std::io::Error,
    },
}

/// Reads the current hardware metrics. One implementation per metrics
/// source; tests substitute a fixed-value probe.
pub trait MetricsProbe {
    /// Instantaneous CPU utilization percentage, [0,100].
    fn read_cpu(&mut self) -> f64;

    /// (available, total) physical memory in KiB (bytes / 1024, truncated).
    fn read_memory(&mut self) -> (u64, u64);

    /// (free, total) KiB summed over every mounted partition. Partitions
    /// that deny the usage query are skipped; any other failure aborts the
    /// whole read.
    fn read_disk(&mut self) -> Result<(u64, u64), ProbeError>;

    fn read_sample(&mut self) -> Result<Sample, ProbeError> {
        let cpu_percent = self.read_cpu();
        let (memory_free_kb, memory_total_kb) = self.read_memory();
        let (disk_free_kb, disk_total_kb) = self.read_disk()?;
        Ok(Sample {
            cpu_percent,
            memory_free_kb,
            memory_total_kb,
            disk_free_kb,
            disk_total_kb,
        })
    }
}

/// Sum free/total bytes over per-partition query results, then truncate to
/// KiB. A `PermissionDenied` result excludes that partition from both sums;
/// any other error fails the aggregation.
pub fn aggregate_partitions<I>(partitions: I) -> Result<(u64, u64), ProbeError>
where
    I: IntoIterator<Item = (PathBuf, std::io::Result<(u64, u64)>)>,
{
    let mut free_bytes = 0u64;
    let mut total_bytes = 0u64;
    for (mount, usage) in partitions {
        match usage {
            Ok((free, total)) => {
                free_bytes += free;
                total_bytes += total;
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                tracing::debug!(mount = %mount.display(), "partition not readable, skipped");
            }
            Err(source) => return Err(ProbeError::Disk { mount, source }),
        }
    }
    Ok((free_bytes / 1024, total_bytes / 1024))
}

fn statvfs_usage(mount: &Path) -> std::io::Result<(u64, u64)> {
    let vfs = nix::sys::statvfs::statvfs(mount)
        .map_err(|errno| std::io::Error::from_raw_os_error(errno as i32))?;
    let frsize = vfs.fragment_size() as u64;
    Ok((
        vfs.blocks_available() as u64 * frsize,
        vfs.blocks() as u64 * frsize,
    ))
}

/// Production probe over sysinfo. CPU usage is computed between consecutive
/// refreshes, so the first read after construction reports 0.
pub struct SysinfoProbe {
    sys: System,
    disks: Disks,
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();
        let disks = Disks::new_with_refreshed_list();
        Self { sys, disks }
    }
}

impl MetricsProbe for SysinfoProbe {
    fn read_cpu(&mut self) -> f64 {
        self.sys.refresh_cpu_all();
        (self.sys.global_cpu_usage() as f64).clamp(0.0, 100.0)
    }

    fn read_memory(&mut self) -> (u64, u64) {
        self.sys.refresh_memory();
        (
            self.sys.available_memory() / 1024,
            self.sys.total_memory() / 1024,
        )
    }

    fn read_disk(&mut self) -> Result<(u64, u64), ProbeError> {
        self.disks.refresh(false);
        aggregate_partitions(self.disks.list().iter().map(|d| {
            let mount = d.mount_point().to_path_buf();
            let usage = statvfs_usage(&mount);
            (mount, usage)
        }))
    }
}
