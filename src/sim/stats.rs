use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccessStats {
    hits: u64,
    misses: u64,
    reads: u64,
    writes: u64,
    evictions: u64,
    write_backs: u64,
}

impl AccessStats {
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn write_backs(&self) -> u64 {
        self.write_backs
    }

    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Percentage of accesses that hit; 0 before the first access.
    pub fn hit_ratio(&self) -> f64 {
        match self.accesses() {
            0 => 0.0,
            total => self.hits as f64 / total as f64 * 100.0,
        }
    }

    pub fn record_read(&mut self, hit: bool) {
        self.reads = self.reads.saturating_add(1);
        self.record_outcome(hit);
    }

    pub fn record_write(&mut self, hit: bool) {
        self.writes = self.writes.saturating_add(1);
        self.record_outcome(hit);
    }

    fn record_outcome(&mut self, hit: bool) {
        if hit {
            self.hits = self.hits.saturating_add(1);
        } else {
            self.misses = self.misses.saturating_add(1);
        }
    }

    pub fn record_write_back(&mut self) {
        self.write_backs = self.write_backs.saturating_add(1);
    }

    pub fn set_evictions(&mut self, evictions: u64) {
        self.evictions = evictions;
    }
}

impl fmt::Display for AccessStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hits: {} | Misses: {}", self.hits, self.misses)?;
        writeln!(f, "Hit/Miss Ratio: {:.2}%", self.hit_ratio())?;
        write!(
            f,
            "Reads: {} | Writes: {} | Evictions: {} | Write-backs: {}",
            self.reads, self.writes, self.evictions, self.write_backs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_zero_without_accesses() {
        let stats = AccessStats::default();
        assert_eq!(stats.hit_ratio(), 0.0);
        assert!(stats.to_string().starts_with("Hits: 0 | Misses: 0\nHit/Miss Ratio: 0.00%"));
    }

    #[test]
    fn ratio_counts_reads_and_writes() {
        let mut stats = AccessStats::default();
        stats.record_read(false);
        stats.record_read(true);
        stats.record_write(true);
        stats.record_write(true);
        assert_eq!((stats.hits(), stats.misses()), (3, 1));
        assert_eq!((stats.reads(), stats.writes()), (2, 2));
        assert_eq!(stats.hit_ratio(), 75.0);
        assert!(stats.to_string().contains("Hit/Miss Ratio: 75.00%"));
    }
}
