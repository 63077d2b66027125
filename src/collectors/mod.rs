pub mod system;

use crate::snapshot::{
    CpuStat, DiskStat, HostInfo, InterfaceStat, MemoryStat, NetworkStat, ProcessInfo, SystemStat,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("{0} sampling unavailable")]
    Unavailable(&'static str),
    #[error("no mounted disk matches path {0}")]
    DiskNotFound(String),
    #[error("no network interfaces detected")]
    NoNetworkInterfaces,
    #[error("cannot resolve own process: {0}")]
    SelfProcess(String),
}

/// Boundary over the OS-level metric readers. Every call is independently
/// fallible; callers degrade a failed block to its zero value instead of
/// aborting the collection cycle.
pub trait MetricsSource: Send {
    fn sample_host(&mut self) -> Result<HostInfo, SampleError>;
    fn sample_cpu(&mut self) -> Result<CpuStat, SampleError>;
    fn sample_memory(&mut self) -> Result<MemoryStat, SampleError>;
    fn sample_disk(&mut self) -> Result<DiskStat, SampleError>;
    fn sample_network(&mut self) -> Result<NetworkStat, SampleError>;
    fn sample_system(&mut self) -> Result<SystemStat, SampleError>;
    fn list_processes(&mut self) -> Result<Vec<ProcessInfo>, SampleError>;
    fn list_interfaces(&mut self) -> Result<Vec<InterfaceStat>, SampleError>;
}
