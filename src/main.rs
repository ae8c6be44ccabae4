use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use clap::Parser;

use cachesim::cache::{SingleLevelCache, SingleLevelConfig, TwoLevelCache, TwoLevelConfig};
use cachesim::config::{Config, RunConfig};
use cachesim::error::Result;
use cachesim::trace::{TraceDriver, TraceReader};

#[derive(Parser)]
#[command(version, about)]
struct CachesimArgs {
    /// Text trace to replay; overrides [run].trace from the config file
    trace_path: Option<PathBuf>,

    /// TOML config with [run], [single] and [two_level] sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulate the inclusive L1/L2 pair instead of a single level
    #[arg(long)]
    two_level: bool,

    /// Zero the counters after this many accesses
    #[arg(long)]
    warmup: Option<u64>,

    #[arg(long)]
    lines: Option<usize>,
    #[arg(long)]
    ways: Option<usize>,
    #[arg(long)]
    banks: Option<usize>,
    #[arg(long)]
    line_bytes: Option<usize>,
    /// Only writes allocate; read misses pass through
    #[arg(long)]
    write_only_allocate: bool,

    #[arg(long)]
    l1_lines: Option<usize>,
    #[arg(long)]
    l1_ways: Option<usize>,
    #[arg(long)]
    l2_lines: Option<usize>,
    #[arg(long)]
    l2_ways: Option<usize>,
    #[arg(long)]
    l2_banks: Option<usize>,

    /// Append text stats to this file instead of stdout
    #[arg(long)]
    stats_out: Option<PathBuf>,
    /// Write the binary per-line miss log here (single-level only)
    #[arg(long)]
    miss_log_out: Option<PathBuf>,
    /// Write a JSON stats snapshot here
    #[arg(long)]
    json_out: Option<PathBuf>,
}

pub fn main() {
    env_logger::init();
    let argv = CachesimArgs::parse();
    if let Err(e) = run(argv) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(argv: CachesimArgs) -> Result<()> {
    let root = match &argv.config {
        Some(path) => fs::read_to_string(path)?
            .parse::<toml::Value>()
            .expect("cannot parse config file"),
        None => toml::Value::Table(Default::default()),
    };

    let mut run_cfg = RunConfig::from_section(root.get("run"));
    if let Some(path) = &argv.trace_path {
        run_cfg.trace = path.display().to_string();
    }
    if let Some(warmup) = argv.warmup {
        run_cfg.warmup = warmup;
    }
    if argv.two_level {
        run_cfg.two_level = true;
    }
    if let Some(path) = &argv.stats_out {
        run_cfg.stats_out = Some(path.display().to_string());
    }
    if let Some(path) = &argv.miss_log_out {
        run_cfg.miss_log_out = Some(path.display().to_string());
    }
    if let Some(path) = &argv.json_out {
        run_cfg.json_out = Some(path.display().to_string());
    }
    if run_cfg.trace.is_empty() {
        return Err(io::Error::new(
            ErrorKind::InvalidInput,
            "no trace given (positional argument or [run].trace)",
        )
        .into());
    }

    let reader = TraceReader::from_path(Path::new(&run_cfg.trace))?;
    let driver = TraceDriver::new(run_cfg.warmup);

    if run_cfg.two_level {
        let mut cfg = TwoLevelConfig::from_section(root.get("two_level"));
        cfg.l1_lines = argv.l1_lines.unwrap_or(cfg.l1_lines);
        cfg.l1_ways = argv.l1_ways.unwrap_or(cfg.l1_ways);
        cfg.l2_lines = argv.l2_lines.unwrap_or(cfg.l2_lines);
        cfg.l2_ways = argv.l2_ways.unwrap_or(cfg.l2_ways);
        cfg.l2_banks = argv.l2_banks.unwrap_or(cfg.l2_banks);
        cfg.line_bytes = argv.line_bytes.unwrap_or(cfg.line_bytes);

        let mut cache = TwoLevelCache::new(cfg)?;
        driver.run(&mut cache, reader)?;
        cache.compute_stats();

        match &run_cfg.stats_out {
            Some(path) => cache.dump_text_path(Path::new(path))?,
            None => cache.dump_text(&mut io::stdout().lock())?,
        }
        if run_cfg.miss_log_out.is_some() {
            log::warn!("miss log is only maintained by the single-level cache; ignoring");
        }
        if let Some(path) = &run_cfg.json_out {
            let payload =
                serde_json::to_string_pretty(&cache.stats()).expect("cannot serialize stats");
            fs::write(path, payload)?;
        }
    } else {
        let mut cfg = SingleLevelConfig::from_section(root.get("single"));
        cfg.n_lines = argv.lines.unwrap_or(cfg.n_lines);
        cfg.ways = argv.ways.unwrap_or(cfg.ways);
        cfg.banks = argv.banks.unwrap_or(cfg.banks);
        cfg.line_bytes = argv.line_bytes.unwrap_or(cfg.line_bytes);
        if argv.write_only_allocate {
            cfg.allocate_on_write_only = true;
        }

        let mut cache = SingleLevelCache::new(cfg)?;
        driver.run(&mut cache, reader)?;
        cache.compute_stats();

        match &run_cfg.stats_out {
            Some(path) => cache.dump_text_path(Path::new(path))?,
            None => cache.dump_text(&mut io::stdout().lock())?,
        }
        if let Some(path) = &run_cfg.miss_log_out {
            cache.dump_binary(Path::new(path))?;
        }
        if let Some(path) = &run_cfg.json_out {
            let payload =
                serde_json::to_string_pretty(&cache.stats()).expect("cannot serialize stats");
            fs::write(path, payload)?;
        }
    }

    Ok(())
}
