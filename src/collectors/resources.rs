use crate::collectors::round2;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::path::Path;
use sysinfo::{DiskExt, ProcessExt, System, SystemExt};
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct ResourceSnapshot {
    pub memory_usage_mb: f64,
    pub peak_memory_mb: f64,
    pub cpu_load: CpuLoad,
    pub disk_free_gb: f64,
    pub disk_total_gb: f64,
}

/// One/five/fifteen minute load averages, or a sentinel on platforms
/// without a load-average facility.
#[derive(Debug, Clone, PartialEq)]
pub enum CpuLoad {
    Available(Vec<f64>),
    Unavailable,
}

impl CpuLoad {
    pub fn display_values(&self) -> Vec<String> {
        match self {
            CpuLoad::Available(values) => {
                values.iter().map(|value| format!("{value:.2}")).collect()
            }
            CpuLoad::Unavailable => vec!["N/A".to_string()],
        }
    }
}

impl Serialize for CpuLoad {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let values = self.display_values();
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&value)?;
        }
        seq.end()
    }
}

pub fn sample_resources(system: &mut System, disk_path: &str) -> ResourceSnapshot {
    system.refresh_memory();
    system.refresh_disks_list();
    system.refresh_disks();

    let memory_usage_mb = current_process_memory_mb(system);
    let peak_memory_mb = peak_process_memory_mb().unwrap_or(memory_usage_mb);
    let (disk_free_gb, disk_total_gb) = disk_space_gb(system, disk_path);

    ResourceSnapshot {
        memory_usage_mb,
        peak_memory_mb,
        cpu_load: sample_load_average(system),
        disk_free_gb,
        disk_total_gb,
    }
}

fn current_process_memory_mb(system: &mut System) -> f64 {
    let Ok(pid) = sysinfo::get_current_pid() else {
        debug!("current pid unavailable");
        return 0.0;
    };
    system.refresh_process(pid);
    system
        .process(pid)
        .map(|process| round2(process.memory() as f64 / 1024.0 / 1024.0))
        .unwrap_or(0.0)
}

// VmHWM is the process high-water mark in kB.
#[cfg(target_os = "linux")]
fn peak_process_memory_mb() -> Option<f64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|line| line.starts_with("VmHWM:"))?;
    let kb: f64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(round2(kb / 1024.0))
}

#[cfg(not(target_os = "linux"))]
fn peak_process_memory_mb() -> Option<f64> {
    None
}

fn sample_load_average(system: &System) -> CpuLoad {
    if cfg!(windows) {
        return CpuLoad::Unavailable;
    }
    let avg = system.load_average();
    CpuLoad::Available(vec![round2(avg.one), round2(avg.five), round2(avg.fifteen)])
}

/// Free/total space of the disk whose mount point is the longest
/// prefix of `disk_path`. Unmatched paths report 0.0 for both.
fn disk_space_gb(system: &System, disk_path: &str) -> (f64, f64) {
    let target = Path::new(disk_path);
    let best = system
        .disks()
        .iter()
        .filter(|disk| target.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len());

    match best {
        Some(disk) => (
            round2(disk.available_space() as f64 / 1024.0 / 1024.0 / 1024.0),
            round2(disk.total_space() as f64 / 1024.0 / 1024.0 / 1024.0),
        ),
        None => {
            debug!(path = %disk_path, "no disk matches the configured path");
            (0.0, 0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_fields_are_non_negative() {
        let mut system = System::new_all();
        let snapshot = sample_resources(&mut system, "/");
        assert!(snapshot.memory_usage_mb >= 0.0);
        assert!(snapshot.peak_memory_mb >= 0.0);
        assert!(snapshot.disk_free_gb >= 0.0);
        assert!(snapshot.disk_total_gb >= 0.0);
    }

    #[test]
    fn cpu_load_display_is_never_empty() {
        let mut system = System::new_all();
        let snapshot = sample_resources(&mut system, "/");
        let values = snapshot.cpu_load.display_values();
        assert!(!values.is_empty());
        match snapshot.cpu_load {
            CpuLoad::Available(ref loads) => {
                assert_eq!(loads.len(), 3);
                assert!(loads.iter().all(|value| *value >= 0.0));
            }
            CpuLoad::Unavailable => assert_eq!(values, ["N/A"]),
        }
    }

    #[test]
    fn unavailable_load_serializes_as_sentinel_sequence() {
        let json = serde_json::to_string(&CpuLoad::Unavailable).unwrap();
        assert_eq!(json, r#"["N/A"]"#);
    }

    #[test]
    fn available_load_formats_two_decimals() {
        let load = CpuLoad::Available(vec![0.5, 1.0, 2.25]);
        assert_eq!(load.display_values(), ["0.50", "1.00", "2.25"]);
    }

    #[test]
    fn unmatched_disk_path_degrades_to_zero() {
        let system = System::new();
        let (free, total) = disk_space_gb(&system, "/definitely/not/mounted");
        assert_eq!(free, 0.0);
        assert_eq!(total, 0.0);
    }
}
