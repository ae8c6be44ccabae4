use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use log::debug;

use crate::cache::addr::{fast_hash, line_addr, set_index};
use crate::cache::config::SingleLevelConfig;
use crate::cache::lru::LruSet;
use crate::cache::miss_log::MissLog;
use crate::cache::stats::SingleStats;
use crate::error::ConfigError;

/// One level of set-associative LRU storage, partitioned into independent
/// banks. In write-only-allocate mode the level behaves like a write buffer:
/// read misses pass through without installing the line or evicting anybody.
#[derive(Debug)]
pub struct SingleLevelCache {
    banks: Vec<Vec<LruSet>>,
    n_banks: usize,
    sets_per_bank: usize,
    line_bytes_log2: u32,
    allocate_on_write_only: bool,
    stats: SingleStats,
    miss_log: MissLog,
}

impl SingleLevelCache {
    pub fn new(config: SingleLevelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sets_per_bank = config.sets_per_bank();
        let banks: Vec<Vec<LruSet>> = (0..config.banks)
            .map(|_| (0..sets_per_bank).map(|_| LruSet::new(config.ways)).collect())
            .collect();
        debug!(
            "single-level cache: {} lines, {} ways, {} banks, {} sets/bank, {} B lines, write_only_allocate={}",
            config.n_lines,
            config.ways,
            config.banks,
            sets_per_bank,
            config.line_bytes,
            config.allocate_on_write_only
        );
        Ok(Self {
            banks,
            n_banks: config.banks,
            sets_per_bank,
            line_bytes_log2: config.line_bytes.trailing_zeros(),
            allocate_on_write_only: config.allocate_on_write_only,
            stats: SingleStats::default(),
            miss_log: MissLog::default(),
        })
    }

    pub fn line_bytes_log2(&self) -> u32 {
        self.line_bytes_log2
    }

    /// Replay one memory reference. Infallible: geometry was validated at
    /// construction and nothing here allocates in the steady state.
    #[inline]
    pub fn access(&mut self, addr: u64, is_write: bool) {
        let line = line_addr(addr, self.line_bytes_log2);
        let set_idx = set_index(line, self.sets_per_bank);
        let bank_idx = fast_hash(line, self.n_banks);

        let set = &mut self.banks[bank_idx][set_idx];
        let was_hit = touch(
            set,
            &mut self.stats,
            &mut self.miss_log,
            line,
            self.allocate_on_write_only,
            is_write,
        );

        match (is_write, was_hit) {
            (false, true) => self.stats.read_hits += 1,
            (false, false) => self.stats.read_misses += 1,
            (true, true) => self.stats.write_hits += 1,
            (true, false) => self.stats.write_misses += 1,
        }
    }

    /// Terminate a warm-up phase: counters and the miss log are dropped but
    /// the resident lines stay where they are.
    pub fn zero_counters(&mut self) {
        self.stats.reset();
        self.miss_log.clear();
    }

    pub fn compute_stats(&mut self) {
        self.stats.compute();
    }

    pub fn stats(&self) -> SingleStats {
        self.stats
    }

    pub fn miss_log(&self) -> &MissLog {
        &self.miss_log
    }

    pub fn dump_text<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if !self.stats.computed_final_stats {
            debug!("stats not computed yet; computing before dump");
            self.stats.compute();
        }
        self.stats.write_text(out)
    }

    /// Append-mode text dump, matching the sink behavior of repeated runs
    /// writing into one stats file.
    pub fn dump_text_path(&mut self, path: &Path) -> io::Result<()> {
        let mut out = OpenOptions::new().create(true).append(true).open(path)?;
        self.dump_text(&mut out)
    }

    pub fn dump_binary(&mut self, path: &Path) -> io::Result<()> {
        if !self.stats.computed_final_stats {
            self.stats.compute();
        }
        self.miss_log.dump_binary(path)
    }

    #[cfg(test)]
    pub(crate) fn iter_sets(&self) -> impl Iterator<Item = &LruSet> {
        self.banks.iter().flatten()
    }
}

/// Move `line` to the MRU position of `set`, admitting and evicting as the
/// allocation policy dictates. Returns whether the line was resident before
/// the touch.
///
/// A resident line is re-appended even when the access would not have been
/// allowed to admit it; skipping that would let reads rot the recency order
/// in write-only-allocate mode.
fn touch(
    set: &mut LruSet,
    stats: &mut SingleStats,
    miss_log: &mut MissLog,
    line: u64,
    allocate_on_write_only: bool,
    is_write: bool,
) -> bool {
    let present = set.remove(line);
    let should_admit = !allocate_on_write_only || is_write;
    let should_update = should_admit || present;

    if !present && set.is_full() && should_admit {
        // The victim will need writing back at the next level, so it lands in
        // the miss log's write channel.
        if let Some(victim) = set.evict_lru() {
            stats.evictions += 1;
            miss_log.record(victim, true);
        }
    }

    if should_update {
        set.push_mru(line);
    }

    if !present && !is_write {
        miss_log.record(line, false);
    }

    present
}
