use serde::Deserialize;

use crate::cache::addr::is_power_of_two;
use crate::config::Config;
use crate::error::ConfigError;

/// Geometry of a single-level cache. `n_lines` is the total line capacity
/// across all banks; every bank holds `(n_lines / banks) / ways` sets.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SingleLevelConfig {
    pub n_lines: usize,
    pub ways: usize,
    pub banks: usize,
    pub line_bytes: usize,
    /// Write-buffer mode: read misses neither allocate nor evict.
    pub allocate_on_write_only: bool,
}

impl Config for SingleLevelConfig {}

impl Default for SingleLevelConfig {
    fn default() -> Self {
        Self {
            n_lines: 1 << 13,
            ways: 8,
            banks: 1,
            line_bytes: 64,
            allocate_on_write_only: false,
        }
    }
}

impl SingleLevelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_level(self.n_lines, self.ways, self.banks)?;
        validate_line_bytes(self.line_bytes)
    }

    pub fn sets_per_bank(&self) -> usize {
        (self.n_lines / self.banks) / self.ways
    }
}

/// Geometry of the inclusive L1/L2 pair. L1 is a single implicit bank; both
/// levels allocate on every access and replace LRU.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TwoLevelConfig {
    pub l1_lines: usize,
    pub l1_ways: usize,
    pub l2_lines: usize,
    pub l2_ways: usize,
    pub l2_banks: usize,
    pub line_bytes: usize,
}

impl Config for TwoLevelConfig {}

impl Default for TwoLevelConfig {
    fn default() -> Self {
        Self {
            l1_lines: 512,
            l1_ways: 8,
            l2_lines: 1 << 20,
            l2_ways: 8,
            l2_banks: 64,
            line_bytes: 64,
        }
    }
}

impl TwoLevelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_level(self.l1_lines, self.l1_ways, 1)?;
        validate_level(self.l2_lines, self.l2_ways, self.l2_banks)?;
        validate_line_bytes(self.line_bytes)
    }

    pub fn l1_sets(&self) -> usize {
        self.l1_lines / self.l1_ways
    }

    pub fn l2_sets_per_bank(&self) -> usize {
        (self.l2_lines / self.l2_banks) / self.l2_ways
    }
}

fn validate_level(n_lines: usize, ways: usize, banks: usize) -> Result<(), ConfigError> {
    if n_lines == 0 {
        return Err(ConfigError::ZeroField { field: "n_lines" });
    }
    if ways == 0 {
        return Err(ConfigError::ZeroField { field: "ways" });
    }
    if banks == 0 {
        return Err(ConfigError::ZeroField { field: "banks" });
    }
    if n_lines % ways != 0 {
        return Err(ConfigError::LinesNotDivisibleByWays { n_lines, ways });
    }
    if n_lines % banks != 0 {
        return Err(ConfigError::LinesNotDivisibleByBanks { n_lines, banks });
    }
    let bank_lines = n_lines / banks;
    if bank_lines % ways != 0 {
        return Err(ConfigError::BankLinesNotDivisibleByWays { bank_lines, ways });
    }
    let sets = bank_lines / ways;
    if !is_power_of_two(sets) {
        return Err(ConfigError::SetsNotPowerOfTwo { sets });
    }
    Ok(())
}

fn validate_line_bytes(line_bytes: usize) -> Result<(), ConfigError> {
    if !is_power_of_two(line_bytes) {
        return Err(ConfigError::LineBytesNotPowerOfTwo { line_bytes });
    }
    Ok(())
}
