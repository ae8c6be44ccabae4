use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Read/write tallies for one line of backing memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccessCounts {
    pub n_reads: i64,
    pub n_writes: i64,
}

/// Per-line histogram of miss events: read misses bump a line's read count,
/// and evicting a line bumps its write count, standing in for the write-back
/// the victim would cost at the next level.
#[derive(Debug, Default)]
pub struct MissLog {
    entries: FxHashMap<u64, AccessCounts>,
}

impl MissLog {
    pub fn record(&mut self, line: u64, is_write: bool) {
        let counts = self.entries.entry(line).or_default();
        if is_write {
            counts.n_writes += 1;
        } else {
            counts.n_reads += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, line: u64) -> Option<AccessCounts> {
        self.entries.get(&line).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, AccessCounts)> + '_ {
        self.entries.iter().map(|(&line, &counts)| (line, counts))
    }

    pub fn dump_binary(&self, path: &Path) -> io::Result<()> {
        info!("{} lines in the miss log", self.entries.len());
        dump_binary_records(path, self.iter())
    }
}

/// Flat record stream in host byte order: `addr (u64) | n_reads (i64) |
/// n_writes (i64)`, no header or count; readers consume until EOF.
pub(crate) fn dump_binary_records(
    path: &Path,
    records: impl Iterator<Item = (u64, AccessCounts)>,
) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for (addr, counts) in records {
        out.write_all(&addr.to_ne_bytes())?;
        out.write_all(&counts.n_reads.to_ne_bytes())?;
        out.write_all(&counts.n_writes.to_ne_bytes())?;
    }
    out.flush()
}
