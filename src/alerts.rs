use crate::snapshot::{Alert, AlertLevel, AlertMetric};

const CPU_CRITICAL_PERCENT: f64 = 90.0;
const CPU_WARNING_PERCENT: f64 = 75.0;
const MEMORY_CRITICAL_PERCENT: f64 = 90.0;
const MEMORY_WARNING_PERCENT: f64 = 80.0;
const DISK_CRITICAL_PERCENT: f64 = 90.0;

/// Derives threshold alerts for one reading. Pure and stateless: every
/// tick is evaluated from scratch, with no memory of earlier alerts.
/// At most one alert per metric; critical takes precedence over warning.
/// Non-finite or negative inputs produce no alert for that metric.
pub fn evaluate(
    cpu_percent: f64,
    memory_percent: f64,
    disk_percent: f64,
    now_unix: i64,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if valid_percent(cpu_percent) {
        if cpu_percent > CPU_CRITICAL_PERCENT {
            alerts.push(Alert {
                level: AlertLevel::Critical,
                metric: AlertMetric::Cpu,
                message: format!("CPU usage critical: {cpu_percent:.1}%"),
                value: cpu_percent,
                timestamp_unix: now_unix,
            });
        } else if cpu_percent > CPU_WARNING_PERCENT {
            alerts.push(Alert {
                level: AlertLevel::Warning,
                metric: AlertMetric::Cpu,
                message: format!("CPU usage high: {cpu_percent:.1}%"),
                value: cpu_percent,
                timestamp_unix: now_unix,
            });
        }
    }

    if valid_percent(memory_percent) {
        if memory_percent > MEMORY_CRITICAL_PERCENT {
            alerts.push(Alert {
                level: AlertLevel::Critical,
                metric: AlertMetric::Memory,
                message: format!("Memory usage critical: {memory_percent:.1}%"),
                value: memory_percent,
                timestamp_unix: now_unix,
            });
        } else if memory_percent > MEMORY_WARNING_PERCENT {
            alerts.push(Alert {
                level: AlertLevel::Warning,
                metric: AlertMetric::Memory,
                message: format!("Memory usage high: {memory_percent:.1}%"),
                value: memory_percent,
                timestamp_unix: now_unix,
            });
        }
    }

    if valid_percent(disk_percent) && disk_percent > DISK_CRITICAL_PERCENT {
        alerts.push(Alert {
            level: AlertLevel::Critical,
            metric: AlertMetric::Disk,
            message: format!("Disk usage critical: {disk_percent:.1}%"),
            value: disk_percent,
            timestamp_unix: now_unix,
        });
    }

    alerts
}

fn valid_percent(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
