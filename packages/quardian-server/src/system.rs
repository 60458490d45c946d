//! Host load and memory for `/api/system`.

use serde::Serialize;

/// Host statistics, formatted the way the dashboard expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSnapshot {
    /// 1-minute load average
    pub cpu_load: String,
    #[serde(rename = "memoryUsedMB")]
    pub memory_used_mb: String,
    #[serde(rename = "memoryTotalMB")]
    pub memory_total_mb: String,
}

impl SystemSnapshot {
    /// Read the load average and memory totals from the host.
    pub fn collect() -> Result<Self, sys_info::Error> {
        let load = sys_info::loadavg()?;
        let mem = sys_info::mem_info()?;
        Ok(Self::from_raw(load.one, mem.total, mem.free))
    }

    /// Build from a load average and memory figures in KB.
    pub fn from_raw(load_one: f64, total_kb: u64, free_kb: u64) -> Self {
        let total_mb = total_kb as f64 / 1024.0;
        let used_mb = total_kb.saturating_sub(free_kb) as f64 / 1024.0;
        Self {
            cpu_load: format!("{:.2}", load_one),
            memory_used_mb: format!("{:.2}", used_mb),
            memory_total_mb: format!("{:.2}", total_mb),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_formatting() {
        let snap = SystemSnapshot::from_raw(0.5, 8 * 1024 * 1024, 2 * 1024 * 1024);
        assert_eq!(snap.cpu_load, "0.50");
        assert_eq!(snap.memory_used_mb, "6144.00");
        assert_eq!(snap.memory_total_mb, "8192.00");
    }

    #[test]
    fn test_free_larger_than_total() {
        let snap = SystemSnapshot::from_raw(1.234, 100, 200);
        assert_eq!(snap.cpu_load, "1.23");
        assert_eq!(snap.memory_used_mb, "0.00");
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(SystemSnapshot::from_raw(0.0, 1024, 0)).unwrap();
        assert_eq!(json["cpuLoad"], "0.00");
        assert_eq!(json["memoryUsedMB"], "1.00");
        assert_eq!(json["memoryTotalMB"], "1.00");
    }
}
