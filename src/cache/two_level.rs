use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use log::debug;

use crate::cache::addr::{fast_hash, line_addr, set_index};
use crate::cache::config::TwoLevelConfig;
use crate::cache::lru::LruSet;
use crate::cache::stats::TwoLevelStats;
use crate::error::ConfigError;

/// Inclusive L1/L2 pair. Every access touches both levels unconditionally,
/// so L1 residency implies the line was also installed in L2; classification
/// follows the priority L1-hit, then L2-hit, then miss to memory.
///
/// A line evicted from L2 while still resident in L1 is deliberately not
/// invalidated in L1. L1 lookups happen first, so the gap only inflates the
/// reported L2 hit rate relative to strictly inclusive hardware; that is the
/// modeled behavior, not an oversight.
#[derive(Debug)]
pub struct TwoLevelCache {
    l1_sets: Vec<LruSet>,
    l2_banks: Vec<Vec<LruSet>>,
    l1_set_count: usize,
    l2_bank_count: usize,
    l2_sets_per_bank: usize,
    line_bytes_log2: u32,
    stats: TwoLevelStats,
}

impl TwoLevelCache {
    pub fn new(config: TwoLevelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let l1_set_count = config.l1_sets();
        let l2_sets_per_bank = config.l2_sets_per_bank();
        let l1_sets = (0..l1_set_count)
            .map(|_| LruSet::new(config.l1_ways))
            .collect();
        let l2_banks: Vec<Vec<LruSet>> = (0..config.l2_banks)
            .map(|_| {
                (0..l2_sets_per_bank)
                    .map(|_| LruSet::new(config.l2_ways))
                    .collect()
            })
            .collect();
        debug!(
            "two-level cache: L1 {} lines x {} ways, L2 {} lines x {} ways in {} banks, {} B lines",
            config.l1_lines,
            config.l1_ways,
            config.l2_lines,
            config.l2_ways,
            config.l2_banks,
            config.line_bytes
        );
        Ok(Self {
            l1_sets,
            l2_banks,
            l1_set_count,
            l2_bank_count: config.l2_banks,
            l2_sets_per_bank,
            line_bytes_log2: config.line_bytes.trailing_zeros(),
            stats: TwoLevelStats::default(),
        })
    }

    pub fn line_bytes_log2(&self) -> u32 {
        self.line_bytes_log2
    }

    /// Replay one memory reference through both levels. Exactly one of the
    /// six hit/miss counters advances.
    #[inline]
    pub fn access(&mut self, addr: u64, is_write: bool) {
        let line = line_addr(addr, self.line_bytes_log2);
        let l1_set_idx = set_index(line, self.l1_set_count);
        let l2_bank_idx = fast_hash(line, self.l2_bank_count);
        let l2_set_idx = set_index(line, self.l2_sets_per_bank);

        let l1_hit = touch_simple(&mut self.l1_sets[l1_set_idx], line);
        let l2_hit = touch_simple(&mut self.l2_banks[l2_bank_idx][l2_set_idx], line);

        if !is_write {
            if l1_hit {
                self.stats.l1_read_hits += 1;
            } else if l2_hit {
                self.stats.l2_read_hits += 1;
            } else {
                self.stats.l2_read_misses += 1;
            }
        } else if l1_hit {
            self.stats.l1_write_hits += 1;
        } else if l2_hit {
            self.stats.l2_write_hits += 1;
        } else {
            self.stats.l2_write_misses += 1;
        }
    }

    pub fn zero_counters(&mut self) {
        self.stats.reset();
    }

    pub fn compute_stats(&mut self) {
        self.stats.compute();
    }

    pub fn stats(&self) -> TwoLevelStats {
        self.stats
    }

    pub fn dump_text<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if !self.stats.computed_final_stats {
            debug!("stats not computed yet; computing before dump");
            self.stats.compute();
        }
        self.stats.write_text(out)
    }

    pub fn dump_text_path(&mut self, path: &Path) -> io::Result<()> {
        let mut out = OpenOptions::new().create(true).append(true).open(path)?;
        self.dump_text(&mut out)
    }

    #[cfg(test)]
    pub(crate) fn iter_sets(&self) -> impl Iterator<Item = &LruSet> {
        self.l1_sets.iter().chain(self.l2_banks.iter().flatten())
    }
}

/// `touch` with the allocation policy hard-coded to admit on every access:
/// no miss log, no eviction counter, victims are dropped silently.
fn touch_simple(set: &mut LruSet, line: u64) -> bool {
    let present = set.remove(line);
    if !present && set.is_full() {
        set.evict_lru();
    }
    set.push_mru(line);
    present
}
