//! Memory and parallelism ceiling offered to one attempt

use std::fmt;

use common::config::MEMORY_1GB;
use serde::{Deserialize, Serialize};

/// Memory (in GB) and thread ceiling of one attempt.
///
/// Only the executor's retry loop changes a budget, and only downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceBudget {
    pub memory_limit_gb: f64,
    pub thread_limit: usize,
}

impl ResourceBudget {
    pub fn new(memory_limit_gb: f64, thread_limit: usize) -> Self {
        Self {
            memory_limit_gb,
            thread_limit: thread_limit.max(1),
        }
    }

    /// Whole host: total memory rounded up to GB, every available core
    pub fn for_host(total_memory_bytes: u64, available_threads: usize) -> Self {
        let memory_limit_gb = total_memory_bytes.div_ceil(MEMORY_1GB) as f64;
        Self::new(memory_limit_gb, available_threads)
    }

    /// Memory ceiling in bytes as handed to the engine's memory pool
    pub fn memory_limit_bytes(&self) -> usize {
        (self.memory_limit_gb * MEMORY_1GB as f64) as usize
    }

    /// Next, smaller budget after an attempt ran out of memory.
    ///
    /// Returns `None` once the memory ceiling is already below 1 GB: there is
    /// no smaller budget worth trying. A ceiling that is not a finite number
    /// has no successor either. Otherwise memory halves (rounded up while
    /// above 1 GB, exactly halved at 1 GB) and threads halve rounded up.
    pub fn shrink(&self) -> Option<Self> {
        if !self.memory_limit_gb.is_finite() || self.memory_limit_gb < 1.0 {
            return None;
        }

        let memory_limit_gb = if self.memory_limit_gb == 1.0 {
            self.memory_limit_gb / 2.0
        } else {
            (self.memory_limit_gb / 2.0).ceil()
        };

        Some(Self::new(memory_limit_gb, self.thread_limit.div_ceil(2)))
    }
}

impl fmt::Display for ResourceBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}GB, {} threads",
            self.memory_limit_gb, self.thread_limit
        )
    }
}
