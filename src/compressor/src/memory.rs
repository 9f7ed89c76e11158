//! Host memory pressure sampling
//!
//! The engine gives no allocation callbacks, so the supervisor watches the
//! host's aggregate memory use and preempts an attempt before the machine
//! itself runs out.

use std::sync::Mutex;

use common::config::{ExecutorSettings, MEMORY_1GB};
use sysinfo::System;

/// Instantaneous host memory reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemorySample {
    pub used_percent: f64,
    pub total_bytes: u64,
}

/// Source of host memory readings
pub trait MemoryProbe: Send + Sync {
    fn sample(&self) -> MemorySample;
}

/// Reads memory use of the local host through `sysinfo`
pub struct SystemMemoryProbe {
    system: Mutex<System>,
}

impl SystemMemoryProbe {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemMemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SystemMemoryProbe {
    fn sample(&self) -> MemorySample {
        let mut system = match self.system.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        system.refresh_memory();

        let total_bytes = system.total_memory();
        let available = system.available_memory();
        let used_percent = if total_bytes == 0 {
            0.0
        } else {
            100.0 * total_bytes.saturating_sub(available) as f64 / total_bytes as f64
        };

        MemorySample {
            used_percent,
            total_bytes,
        }
    }
}

/// When host memory use counts as an out-of-memory condition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressurePolicy {
    /// Threshold used when the headroom rule would be looser
    pub threshold_percent: f64,
    /// Memory that must stay free regardless of host size
    pub headroom_bytes: u64,
}

impl Default for PressurePolicy {
    fn default() -> Self {
        Self {
            threshold_percent: 95.0,
            headroom_bytes: MEMORY_1GB,
        }
    }
}

impl From<&ExecutorSettings> for PressurePolicy {
    fn from(settings: &ExecutorSettings) -> Self {
        Self {
            threshold_percent: settings.threshold_percent,
            headroom_bytes: settings.headroom_bytes,
        }
    }
}

impl PressurePolicy {
    /// Preemption threshold in percent for a host with `total_bytes` of memory.
    ///
    /// On large hosts the flat percentage leaves more than the headroom
    /// unused; the threshold then tightens to keep exactly the headroom free.
    pub fn threshold_percent(&self, total_bytes: u64) -> f64 {
        let total = total_bytes as f64;
        let flat_reserve = total * (100.0 - self.threshold_percent) / 100.0;

        if flat_reserve > self.headroom_bytes as f64 {
            100.0 * (total - self.headroom_bytes as f64) / total
        } else {
            self.threshold_percent
        }
    }

    pub fn is_exceeded(&self, sample: &MemorySample) -> bool {
        sample.used_percent > self.threshold_percent(sample.total_bytes)
    }
}
