use crate::collectors::{MetricsSource, SampleError};
use crate::snapshot::{
    CpuStat, DiskStat, HostInfo, InterfaceStat, MemoryStat, NetworkStat, ProcessInfo, SystemStat,
};
#[cfg(target_os = "linux")]
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::{CpuExt, DiskExt, NetworkExt, NetworksExt, PidExt, ProcessExt, System, SystemExt};

/// `MetricsSource` backed by a long-lived `sysinfo::System`. Each sample
/// refreshes only the subsystems it needs; CPU percentages become
/// meaningful from the second refresh onwards, which the periodic
/// collector provides for free.
pub struct SystemSource {
    system: System,
    disk_path: PathBuf,
}

impl SystemSource {
    pub fn new(disk_path: impl Into<PathBuf>) -> Self {
        Self {
            system: System::new_all(),
            disk_path: disk_path.into(),
        }
    }
}

impl MetricsSource for SystemSource {
    fn sample_host(&mut self) -> Result<HostInfo, SampleError> {
        Ok(HostInfo {
            hostname: self.system.host_name(),
            os: std::env::consts::OS.to_string(),
            platform: self.system.name(),
            platform_version: self.system.os_version(),
            kernel_version: self.system.kernel_version(),
            uptime_seconds: self.system.uptime(),
        })
    }

    fn sample_cpu(&mut self) -> Result<CpuStat, SampleError> {
        self.system.refresh_cpu();
        let cpus = self.system.cpus();
        if cpus.is_empty() {
            return Err(SampleError::Unavailable("cpu"));
        }
        let sum: f64 = cpus.iter().map(|c| c.cpu_usage() as f64).sum();
        let percent = sum / cpus.len() as f64;
        let load = self.system.load_average();

        Ok(CpuStat {
            percent,
            cores_physical: self.system.physical_core_count().unwrap_or(0) as u32,
            cores_logical: cpus.len() as u32,
            frequency_mhz: cpus.first().map(|c| c.frequency()).unwrap_or(0),
            load_1: load.one,
            load_5: load.five,
            load_15: load.fifteen,
        })
    }

    fn sample_memory(&mut self) -> Result<MemoryStat, SampleError> {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        let used = self.system.used_memory();
        let percent = if total > 0 {
            (used as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let swap_total = self.system.total_swap();
        let swap_used = self.system.used_swap();
        let swap_percent = if swap_total > 0 {
            (swap_used as f64 / swap_total as f64) * 100.0
        } else {
            0.0
        };
        let (cached_bytes, buffered_bytes) = read_meminfo_cache_stats();

        Ok(MemoryStat {
            total_bytes: total,
            available_bytes: self.system.available_memory(),
            used_bytes: used,
            free_bytes: self.system.free_memory(),
            percent,
            swap_total_bytes: swap_total,
            swap_used_bytes: swap_used,
            swap_percent,
            cached_bytes,
            buffered_bytes,
        })
    }

    fn sample_disk(&mut self) -> Result<DiskStat, SampleError> {
        self.system.refresh_disks_list();
        self.system.refresh_disks();

        // Pick the mounted filesystem whose mount point is the longest
        // prefix of the configured path, so "/" still resolves when the
        // path sits on a nested mount.
        let disk = self
            .system
            .disks()
            .iter()
            .filter(|d| self.disk_path.starts_with(d.mount_point()))
            .max_by_key(|d| d.mount_point().as_os_str().len())
            .ok_or_else(|| SampleError::DiskNotFound(self.disk_path.display().to_string()))?;

        let total = disk.total_space();
        let free = disk.available_space();
        let used = total.saturating_sub(free);
        let percent = if total > 0 {
            (used as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        let mount = disk.mount_point().to_path_buf();

        // sysinfo has no global IO counters; the summed per-process disk
        // usage is the closest cumulative read/write figure available.
        self.system.refresh_processes();
        let mut io_read_bytes = 0_u64;
        let mut io_write_bytes = 0_u64;
        for process in self.system.processes().values() {
            let usage = process.disk_usage();
            io_read_bytes = io_read_bytes.saturating_add(usage.total_read_bytes);
            io_write_bytes = io_write_bytes.saturating_add(usage.total_written_bytes);
        }

        let (inodes_total, inodes_used, inodes_free) = read_inode_stats(&mount);
        let inodes_percent = if inodes_total > 0 {
            (inodes_used as f64 / inodes_total as f64) * 100.0
        } else {
            0.0
        };

        Ok(DiskStat {
            path: mount.display().to_string(),
            total_bytes: total,
            free_bytes: free,
            used_bytes: used,
            percent,
            inodes_total,
            inodes_used,
            inodes_free,
            inodes_percent,
            io_read_bytes,
            io_write_bytes,
        })
    }

    fn sample_network(&mut self) -> Result<NetworkStat, SampleError> {
        self.system.refresh_networks_list();
        self.system.refresh_networks();

        let networks = self.system.networks();
        let mut stat = NetworkStat::default();
        let mut seen = false;
        for (_iface, data) in networks.iter() {
            seen = true;
            stat.bytes_sent = stat.bytes_sent.saturating_add(data.total_transmitted());
            stat.bytes_recv = stat.bytes_recv.saturating_add(data.total_received());
            stat.packets_sent = stat
                .packets_sent
                .saturating_add(data.total_packets_transmitted());
            stat.packets_recv = stat
                .packets_recv
                .saturating_add(data.total_packets_received());
            stat.err_in = stat.err_in.saturating_add(data.total_errors_on_received());
            stat.err_out = stat
                .err_out
                .saturating_add(data.total_errors_on_transmitted());
        }

        if !seen {
            return Err(SampleError::NoNetworkInterfaces);
        }
        Ok(stat)
    }

    fn sample_system(&mut self) -> Result<SystemStat, SampleError> {
        self.system.refresh_processes();
        let process_count = self.system.processes().len() as u64;

        let pid = sysinfo::get_current_pid().map_err(|e| SampleError::SelfProcess(e.to_string()))?;
        let own = self
            .system
            .process(pid)
            .ok_or_else(|| {
                SampleError::SelfProcess(format!("pid {} not in process table", pid.as_u32()))
            })?;

        Ok(SystemStat {
            // Runtime task/worker counts are filled in by the monitor.
            tasks_alive: 0,
            worker_threads: 0,
            process_count,
            self_mem_rss_bytes: own.memory(),
            self_mem_vms_bytes: own.virtual_memory(),
        })
    }

    fn list_processes(&mut self) -> Result<Vec<ProcessInfo>, SampleError> {
        self.system.refresh_processes();
        let mut list: Vec<ProcessInfo> = self
            .system
            .processes()
            .values()
            .map(|p| ProcessInfo {
                pid: p.pid().as_u32(),
                name: p.name().to_string(),
                cpu: p.cpu_usage() as f64,
                mem_rss: p.memory(),
                mem_vms: p.virtual_memory(),
            })
            .collect();
        list.sort_unstable_by_key(|p| p.pid);
        Ok(list)
    }

    fn list_interfaces(&mut self) -> Result<Vec<InterfaceStat>, SampleError> {
        self.system.refresh_networks_list();
        self.system.refresh_networks();

        let mut list: Vec<InterfaceStat> = self
            .system
            .networks()
            .iter()
            .map(|(iface, data)| InterfaceStat {
                iface: iface.to_string(),
                rx_bytes_total: data.total_received(),
                tx_bytes_total: data.total_transmitted(),
                rx_packets_total: data.total_packets_received(),
                tx_packets_total: data.total_packets_transmitted(),
                rx_errors_total: data.total_errors_on_received(),
                tx_errors_total: data.total_errors_on_transmitted(),
            })
            .collect();
        if list.is_empty() {
            return Err(SampleError::NoNetworkInterfaces);
        }
        list.sort_unstable_by(|a, b| a.iface.cmp(&b.iface));
        Ok(list)
    }
}

/// Cached/buffered page counts from /proc/meminfo, zero elsewhere.
#[cfg(target_os = "linux")]
fn read_meminfo_cache_stats() -> (u64, u64) {
    let Ok(text) = fs::read_to_string("/proc/meminfo") else {
        return (0, 0);
    };

    let mut cached = 0_u64;
    let mut buffered = 0_u64;
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("Cached:") {
            cached = parse_meminfo_kib(rest);
        } else if let Some(rest) = line.strip_prefix("Buffers:") {
            buffered = parse_meminfo_kib(rest);
        }
    }
    (cached, buffered)
}

#[cfg(not(target_os = "linux"))]
fn read_meminfo_cache_stats() -> (u64, u64) {
    (0, 0)
}

#[cfg(target_os = "linux")]
fn parse_meminfo_kib(rest: &str) -> u64 {
    rest.split_whitespace()
        .next()
        .and_then(|v| v.parse::<u64>().ok())
        .map(|kib| kib.saturating_mul(1024))
        .unwrap_or(0)
}

/// Inode totals are not exposed by sysinfo; zero-valued on every
/// platform until a dedicated statvfs reader is worth carrying.
fn read_inode_stats(_mount: &Path) -> (u64, u64, u64) {
    (0, 0, 0)
}
