use std::io;
use std::path::Path;

use log::info;
use rustc_hash::FxHashMap;

use crate::cache::addr::is_power_of_two;
use crate::cache::miss_log::{dump_binary_records, AccessCounts};
use crate::error::ConfigError;

/// Word-granularity access histogram. A standalone collector: it shares no
/// state with the caches and tallies every access, hit or miss.
#[derive(Debug)]
pub struct WordHistogram {
    bytes_per_word_log2: u32,
    hist: FxHashMap<u64, AccessCounts>,
}

impl WordHistogram {
    pub fn new(bytes_per_word: usize) -> Result<Self, ConfigError> {
        if !is_power_of_two(bytes_per_word) {
            return Err(ConfigError::WordBytesNotPowerOfTwo { bytes_per_word });
        }
        Ok(Self {
            bytes_per_word_log2: bytes_per_word.trailing_zeros(),
            hist: FxHashMap::default(),
        })
    }

    pub fn access(&mut self, addr: u64, is_write: bool) {
        let word = addr >> self.bytes_per_word_log2;
        let counts = self.hist.entry(word).or_default();
        if is_write {
            counts.n_writes += 1;
        } else {
            counts.n_reads += 1;
        }
    }

    pub fn zero_counters(&mut self) {
        self.hist.clear();
    }

    pub fn len(&self) -> usize {
        self.hist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hist.is_empty()
    }

    pub fn get(&self, word: u64) -> Option<AccessCounts> {
        self.hist.get(&word).copied()
    }

    /// Same flat record format as the miss log: `word_addr | n_reads |
    /// n_writes` in host byte order until EOF.
    pub fn dump_binary(&self, path: &Path) -> io::Result<()> {
        info!("dumping access histogram ({} words)", self.hist.len());
        dump_binary_records(path, self.hist.iter().map(|(&w, &c)| (w, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_power_of_two_word() {
        assert!(WordHistogram::new(12).is_err());
        assert!(WordHistogram::new(0).is_err());
    }

    #[test]
    fn collapses_addresses_within_a_word() {
        let mut hist = WordHistogram::new(8).expect("valid word size");
        hist.access(0, false);
        hist.access(7, false);
        hist.access(8, true);
        assert_eq!(hist.len(), 2);
        assert_eq!(
            hist.get(0),
            Some(AccessCounts {
                n_reads: 2,
                n_writes: 0
            })
        );
        assert_eq!(
            hist.get(1),
            Some(AccessCounts {
                n_reads: 0,
                n_writes: 1
            })
        );
    }

    #[test]
    fn zero_counters_drops_everything() {
        let mut hist = WordHistogram::new(4).expect("valid word size");
        hist.access(16, true);
        hist.zero_counters();
        assert!(hist.is_empty());
    }
}
