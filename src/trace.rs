//! Trace ingestion: turns a text access trace into `(address, is_write)`
//! tuples and replays them into an engine, with optional warm-up handling.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;

use crate::cache::{SingleLevelCache, TwoLevelCache};
use crate::collect::WordHistogram;
use crate::error::{Error, Result};

/// One memory reference from a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    pub addr: u64,
    pub is_write: bool,
}

/// Anything that can consume a replayed trace.
pub trait Accessor {
    fn access(&mut self, addr: u64, is_write: bool);
    fn zero_counters(&mut self);
}

impl Accessor for SingleLevelCache {
    fn access(&mut self, addr: u64, is_write: bool) {
        SingleLevelCache::access(self, addr, is_write);
    }

    fn zero_counters(&mut self) {
        SingleLevelCache::zero_counters(self);
    }
}

impl Accessor for TwoLevelCache {
    fn access(&mut self, addr: u64, is_write: bool) {
        TwoLevelCache::access(self, addr, is_write);
    }

    fn zero_counters(&mut self) {
        TwoLevelCache::zero_counters(self);
    }
}

impl Accessor for WordHistogram {
    fn access(&mut self, addr: u64, is_write: bool) {
        WordHistogram::access(self, addr, is_write);
    }

    fn zero_counters(&mut self) {
        WordHistogram::zero_counters(self);
    }
}

/// Line-oriented reader for text traces. One access per line, `r <addr>` or
/// `w <addr>` (case-insensitive, hex with `0x` prefix or decimal); blank
/// lines and `#` comments are skipped.
pub struct TraceReader<R> {
    input: R,
    line_no: usize,
    buf: String,
}

impl TraceReader<BufReader<File>> {
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line_no: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.input.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line_no += 1;
            match parse_line(&self.buf) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(reason) => {
                    return Some(Err(Error::Trace {
                        line: self.line_no,
                        reason,
                    }))
                }
            }
        }
    }
}

fn parse_line(line: &str) -> std::result::Result<Option<TraceRecord>, String> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }
    let mut fields = line.split_whitespace();
    let op = fields.next().unwrap_or("");
    let is_write = match op {
        "r" | "R" => false,
        "w" | "W" => true,
        other => return Err(format!("unknown op '{other}'; expected r or w")),
    };
    let addr_text = fields
        .next()
        .ok_or_else(|| "missing address".to_string())?;
    if fields.next().is_some() {
        return Err("trailing fields after address".to_string());
    }
    let addr = parse_addr(addr_text)?;
    Ok(Some(TraceRecord { addr, is_write }))
}

fn parse_addr(text: &str) -> std::result::Result<u64, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|_| format!("bad address '{text}'"))
}

/// Replays records into an engine. A nonzero warm-up zeroes the engine's
/// counters after that many accesses, so the reported stats cover only the
/// steady-state tail of the trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceDriver {
    pub warmup: u64,
}

impl TraceDriver {
    pub fn new(warmup: u64) -> Self {
        Self { warmup }
    }

    /// Returns the number of accesses replayed, warm-up included.
    pub fn run<A: Accessor>(
        &self,
        engine: &mut A,
        records: impl IntoIterator<Item = Result<TraceRecord>>,
    ) -> Result<u64> {
        let mut replayed = 0u64;
        for record in records {
            let record = record?;
            engine.access(record.addr, record.is_write);
            replayed += 1;
            if replayed == self.warmup {
                info!("warm-up done after {replayed} accesses; zeroing counters");
                engine.zero_counters();
            }
        }
        info!("replayed {replayed} accesses");
        Ok(replayed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{SingleLevelCache, SingleLevelConfig};

    fn read_all(text: &str) -> Vec<TraceRecord> {
        TraceReader::new(text.as_bytes())
            .collect::<Result<Vec<_>>>()
            .expect("trace should parse")
    }

    #[test]
    fn parses_hex_and_decimal_addresses() {
        let records = read_all("r 0x40\nw 64\nR 0X80\nW 0\n");
        assert_eq!(
            records,
            vec![
                TraceRecord {
                    addr: 0x40,
                    is_write: false
                },
                TraceRecord {
                    addr: 64,
                    is_write: true
                },
                TraceRecord {
                    addr: 0x80,
                    is_write: false
                },
                TraceRecord {
                    addr: 0,
                    is_write: true
                },
            ]
        );
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let records = read_all("# header\n\nr 0x10 # inline note\n   \nw 0x20\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].addr, 0x10);
        assert!(records[1].is_write);
    }

    #[test]
    fn reports_line_number_on_bad_op() {
        let err = TraceReader::new("r 0x10\nx 0x20\n".as_bytes())
            .collect::<Result<Vec<_>>>()
            .expect_err("second line is malformed");
        match err {
            Error::Trace { line, .. } => assert_eq!(line, 2),
            other => panic!("expected trace error, got {other}"),
        }
    }

    #[test]
    fn reports_missing_address() {
        let err = TraceReader::new("w\n".as_bytes())
            .collect::<Result<Vec<_>>>()
            .expect_err("address is missing");
        assert!(matches!(err, Error::Trace { line: 1, .. }));
    }

    #[test]
    fn driver_zeroes_counters_at_warmup_boundary() {
        let mut cache = SingleLevelCache::new(SingleLevelConfig {
            n_lines: 64,
            ways: 4,
            banks: 1,
            line_bytes: 64,
            allocate_on_write_only: false,
        })
        .expect("valid config");

        // Two cold misses during warm-up, then the same two lines hit.
        let records = read_all("r 0x0\nr 0x40\nr 0x0\nr 0x40\n").into_iter().map(Ok);
        let replayed = TraceDriver::new(2)
            .run(&mut cache, records)
            .expect("replay succeeds");

        assert_eq!(replayed, 4);
        let stats = cache.stats();
        assert_eq!(stats.read_hits, 2);
        assert_eq!(stats.read_misses, 0);
    }

    #[test]
    fn driver_without_warmup_keeps_all_counters() {
        let mut cache = SingleLevelCache::new(SingleLevelConfig {
            n_lines: 64,
            ways: 4,
            banks: 1,
            line_bytes: 64,
            allocate_on_write_only: false,
        })
        .expect("valid config");

        let records = read_all("r 0x0\nr 0x0\n").into_iter().map(Ok);
        TraceDriver::default()
            .run(&mut cache, records)
            .expect("replay succeeds");

        let stats = cache.stats();
        assert_eq!(stats.read_misses, 1);
        assert_eq!(stats.read_hits, 1);
    }
}
