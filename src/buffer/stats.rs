use std::fmt;

/// Buffer manager counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Page fetches and allocations
    pub accesses: u64,
    /// Pages read from a file on a miss
    pub disk_reads: u64,
    /// Dirty pages written back
    pub disk_writes: u64,
}

impl BufferStats {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for BufferStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accesses:{} disk_reads:{} disk_writes:{}",
            self.accesses, self.disk_reads, self.disk_writes
        )
    }
}
