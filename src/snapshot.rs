use std::time::{SystemTime, UNIX_EPOCH};

/// One collected reading of the whole host. Built once per tick (or per
/// on-demand query) and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Snapshot {
    pub timestamp_unix: i64,
    pub host: HostInfo,
    pub cpu: CpuStat,
    pub memory: MemoryStat,
    pub disk: DiskStat,
    pub network: Option<NetworkStat>,
    pub system: SystemStat,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct HostInfo {
    pub hostname: Option<String>,
    pub os: String,
    pub platform: Option<String>,
    pub platform_version: Option<String>,
    pub kernel_version: Option<String>,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct CpuStat {
    pub percent: f64,
    pub cores_physical: u32,
    pub cores_logical: u32,
    pub frequency_mhz: u64,
    pub load_1: f64,
    pub load_5: f64,
    pub load_15: f64,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct MemoryStat {
    pub total_bytes: u64,
    pub available_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub percent: f64,
    pub swap_total_bytes: u64,
    pub swap_used_bytes: u64,
    pub swap_percent: f64,
    pub cached_bytes: u64,
    pub buffered_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct DiskStat {
    pub path: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub used_bytes: u64,
    pub percent: f64,
    pub inodes_total: u64,
    pub inodes_used: u64,
    pub inodes_free: u64,
    pub inodes_percent: f64,
    pub io_read_bytes: u64,
    pub io_write_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct NetworkStat {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub err_in: u64,
    pub err_out: u64,
    pub drop_in: u64,
    pub drop_out: u64,
}

/// Runtime self-accounting, the daemon-side counterpart of the host
/// metrics: async task and worker counts plus our own memory footprint.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct SystemStat {
    pub tasks_alive: u64,
    pub worker_threads: u64,
    pub process_count: u64,
    pub self_mem_rss_bytes: u64,
    pub self_mem_vms_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertMetric {
    Cpu,
    Memory,
    Disk,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub metric: AlertMetric,
    pub message: String,
    pub value: f64,
    pub timestamp_unix: i64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub cpu: f64,
    pub mem_rss: u64,
    pub mem_vms: u64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct InterfaceStat {
    pub iface: String,
    pub rx_bytes_total: u64,
    pub tx_bytes_total: u64,
    pub rx_packets_total: u64,
    pub tx_packets_total: u64,
    pub rx_errors_total: u64,
    pub tx_errors_total: u64,
}

pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
