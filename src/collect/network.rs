use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use rustc_hash::FxHashMap;

/// Per-destination byte counter for simulated network sends. Pure accounting;
/// nothing is transmitted anywhere.
#[derive(Debug, Default)]
pub struct NetworkBytes {
    rank: Option<u32>,
    dest_bytes: FxHashMap<u32, u64>,
}

impl NetworkBytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rank(rank: u32) -> Self {
        Self {
            rank: Some(rank),
            dest_bytes: FxHashMap::default(),
        }
    }

    pub fn set_rank(&mut self, rank: u32) {
        self.rank = Some(rank);
    }

    pub fn send_to(&mut self, dest: u32, n_bytes: u64) {
        *self.dest_bytes.entry(dest).or_default() += n_bytes;
    }

    pub fn bytes_to(&self, dest: u32) -> u64 {
        self.dest_bytes.get(&dest).copied().unwrap_or(0)
    }

    pub fn total_bytes(&self) -> u64 {
        self.dest_bytes.values().sum()
    }

    pub fn zero_counters(&mut self) {
        self.dest_bytes.clear();
    }

    pub fn dump_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        // -1 marks a rank that was never filled in
        let rank = self.rank.map(i64::from).unwrap_or(-1);
        writeln!(out, "------------ Network Statistics ------------")?;
        let mut total = 0u64;
        for (&dest, &n_bytes) in &self.dest_bytes {
            writeln!(out, "{} => {} : {} bytes", rank, dest, n_bytes)?;
            total += n_bytes;
        }
        writeln!(out, "Total bytes sent by us ({}): {}", rank, total)
    }

    pub fn dump_text_path(&self, path: &Path) -> io::Result<()> {
        let mut out = OpenOptions::new().create(true).append(true).open(path)?;
        self.dump_text(&mut out)
    }
}
