use std::io::{self, Write};

use serde::Serialize;

/// Counter block for a single-level cache. Raw counters advance on every
/// access; the derived totals and rates are filled in by `compute`.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SingleStats {
    pub read_hits: u64,
    pub read_misses: u64,
    pub write_hits: u64,
    pub write_misses: u64,
    pub evictions: u64,

    pub computed_final_stats: bool,
    pub reads: u64,
    pub writes: u64,
    pub hits: u64,
    pub misses: u64,
    pub read_hit_rate: f64,
    pub read_miss_rate: f64,
    pub write_hit_rate: f64,
    pub write_miss_rate: f64,
    /// Evictions per miss, not per access.
    pub eviction_rate: f64,
}

impl SingleStats {
    pub fn compute(&mut self) {
        if self.computed_final_stats {
            return;
        }
        self.reads = self.read_hits + self.read_misses;
        self.writes = self.write_hits + self.write_misses;
        self.hits = self.read_hits + self.write_hits;
        self.misses = self.read_misses + self.write_misses;

        if self.reads != 0 {
            self.read_hit_rate = self.read_hits as f64 / self.reads as f64;
            self.read_miss_rate = self.read_misses as f64 / self.reads as f64;
        }
        if self.writes != 0 {
            self.write_hit_rate = self.write_hits as f64 / self.writes as f64;
            self.write_miss_rate = self.write_misses as f64 / self.writes as f64;
        }
        if self.misses != 0 {
            self.eviction_rate = self.evictions as f64 / self.misses as f64;
        }

        self.computed_final_stats = true;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "------------ Cache Statistics ------------")?;
        writeln!(
            out,
            "READ_HITS\t{} ({:.2}%)",
            self.read_hits,
            self.read_hit_rate * 100.0
        )?;
        writeln!(
            out,
            "WRITE_HITS\t{} ({:.2}%)",
            self.write_hits,
            self.write_hit_rate * 100.0
        )?;
        writeln!(
            out,
            "READ_MISSES\t{} ({:.2}%)",
            self.read_misses,
            self.read_miss_rate * 100.0
        )?;
        writeln!(
            out,
            "WRITE_MISSES\t{} ({:.2}%)",
            self.write_misses,
            self.write_miss_rate * 100.0
        )?;
        writeln!(
            out,
            "EVICTIONS\t{} ({:.2}%)",
            self.evictions,
            self.eviction_rate * 100.0
        )
    }
}

/// Counter block for the inclusive L1/L2 pair. The six raw counters are
/// mutually exclusive per access: an L1 miss that hits L2 is counted only as
/// an L2 hit, and a miss in both levels only as an L2 miss.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TwoLevelStats {
    pub l1_read_hits: u64,
    pub l2_read_hits: u64,
    pub l2_read_misses: u64,
    pub l1_write_hits: u64,
    pub l2_write_hits: u64,
    pub l2_write_misses: u64,

    pub computed_final_stats: bool,
    pub reads: u64,
    pub writes: u64,
    pub l1_read_hit_rate: f64,
    pub l2_read_hit_rate: f64,
    pub l2_read_miss_rate: f64,
    pub l1_write_hit_rate: f64,
    pub l2_write_hit_rate: f64,
    pub l2_write_miss_rate: f64,
}

impl TwoLevelStats {
    pub fn compute(&mut self) {
        if self.computed_final_stats {
            return;
        }
        self.reads = self.l1_read_hits + self.l2_read_hits + self.l2_read_misses;
        self.writes = self.l1_write_hits + self.l2_write_hits + self.l2_write_misses;

        if self.reads != 0 {
            let reads = self.reads as f64;
            self.l1_read_hit_rate = self.l1_read_hits as f64 / reads;
            self.l2_read_hit_rate = self.l2_read_hits as f64 / reads;
            self.l2_read_miss_rate = self.l2_read_misses as f64 / reads;
        }
        if self.writes != 0 {
            let writes = self.writes as f64;
            self.l1_write_hit_rate = self.l1_write_hits as f64 / writes;
            self.l2_write_hit_rate = self.l2_write_hits as f64 / writes;
            self.l2_write_miss_rate = self.l2_write_misses as f64 / writes;
        }

        self.computed_final_stats = true;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "------------ Cache Statistics ------------")?;
        writeln!(
            out,
            "L1:    RH: {} ({:.2}%)    WH: {} ({:.2}%)",
            self.l1_read_hits,
            self.l1_read_hit_rate * 100.0,
            self.l1_write_hits,
            self.l1_write_hit_rate * 100.0
        )?;
        writeln!(
            out,
            "L2:    RH: {} ({:.2}%)    WH: {} ({:.2}%)",
            self.l2_read_hits,
            self.l2_read_hit_rate * 100.0,
            self.l2_write_hits,
            self.l2_write_hit_rate * 100.0
        )?;
        writeln!(
            out,
            "Mem:   RH: {} ({:.2}%)    WH: {} ({:.2}%)",
            self.l2_read_misses,
            self.l2_read_miss_rate * 100.0,
            self.l2_write_misses,
            self.l2_write_miss_rate * 100.0
        )
    }
}
