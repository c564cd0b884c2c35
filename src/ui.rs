use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;
use toml::Table;

use crate::cache::policy::ReplacementKind;
use crate::cache::WritePolicy;
use crate::command::{verbs, Command, CommandError};
use crate::error::SimResult;
use crate::sim::config::{CacheConfig, Config, SimConfig};
use crate::sim::log::Logger;
use crate::sim::stats::AccessStats;
use crate::sim::top::Simulator;
use crate::util::{bin_str, hex_str};

#[derive(Parser, Debug, Default)]
#[command(version, about = "Simulate the cache of a CPU.")]
pub struct CacheSimArgs {
    #[arg(help = "Size of main memory in 2^N bytes")]
    pub memory: Option<u32>,
    #[arg(help = "Size of the cache in 2^N bytes")]
    pub cache: Option<u32>,
    #[arg(help = "Size of a block of memory in 2^N bytes")]
    pub block: Option<u32>,
    #[arg(help = "Mapping policy for cache in 2^N ways")]
    pub mapping: Option<u32>,
    #[arg(help = "Replacement policy for cache {LRU, LFU, FIFO, RAND}")]
    pub replace: Option<ReplacementKind>,
    #[arg(help = "Write policy for cache {WB, WT}")]
    pub write: Option<WritePolicy>,
    #[arg(long, help = "Path to config.toml")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Seed for random traffic and RAND replacement")]
    pub seed: Option<u64>,
    #[arg(long, help = "Enable access trace at level (0:none, 1:info, 2:debug)")]
    pub log: Option<u64>,
    #[arg(long, help = "Trace file (default .simulator.log, '-' for stderr)")]
    pub log_file: Option<String>,
    #[arg(long, help = "Write final statistics as JSON to this path")]
    pub results_json: Option<String>,
    #[arg(long, help = "Do not install blocks on write-through write misses")]
    pub no_write_allocate: bool,
}

/// Build both config sections from TOML, then apply CLI overrides if given.
pub fn make_configs(
    toml_string: &str,
    cli_args: Option<&CacheSimArgs>,
) -> anyhow::Result<(SimConfig, CacheConfig)> {
    let config_table: Table = toml::from_str(toml_string).context("cannot parse config toml")?;
    let mut sim_config = SimConfig::from_section(config_table.get("sim"))?;
    let mut cache_config = CacheConfig::from_section(config_table.get("cache"))?;

    if let Some(args) = cli_args {
        cache_config.memory = args.memory.unwrap_or(cache_config.memory);
        cache_config.cache = args.cache.unwrap_or(cache_config.cache);
        cache_config.block = args.block.unwrap_or(cache_config.block);
        cache_config.mapping = args.mapping.unwrap_or(cache_config.mapping);
        cache_config.replacement = args.replace.unwrap_or(cache_config.replacement);
        cache_config.write = args.write.unwrap_or(cache_config.write);
        cache_config.write_allocate &= !args.no_write_allocate;
        sim_config.seed = args.seed.unwrap_or(sim_config.seed);
        sim_config.log_level = args.log.unwrap_or(sim_config.log_level);
        if args.log_file.is_some() {
            sim_config.log_file = args.log_file.clone();
        }
        if args.results_json.is_some() {
            sim_config.results_json = args.results_json.clone();
        }
    }

    Ok((sim_config, cache_config))
}

/// Make a Simulator from the TOML configuration.
/// If `cli_args` is given, override TOML options with CLI arguments.
pub fn make_sim(
    toml_string: &str,
    cli_args: Option<&CacheSimArgs>,
) -> anyhow::Result<(Simulator, SimConfig)> {
    let (sim_config, cache_config) = make_configs(toml_string, cli_args)?;
    let logger = Logger::new(sim_config.log_level, sim_config.trace_path())
        .context("cannot open trace log")?;
    let sim = Simulator::new(&cache_config, sim_config.seed, logger)?;
    info!("simulator ready: {:?}", cache_config);
    Ok((sim, sim_config))
}

pub fn dump_results(stats: &AccessStats, path: &str) -> anyhow::Result<()> {
    let payload = serde_json::to_string_pretty(stats)?;
    fs::write(path, payload).with_context(|| format!("cannot write results to {}", path))?;
    info!("statistics written to {}", path);
    Ok(())
}

/// Run one command against the simulator and render its output.
pub fn execute(sim: &mut Simulator, cmd: Command) -> SimResult<String> {
    let bits = sim.address_bits();
    let text = match cmd {
        Command::Read { address } => {
            let byte = sim.simulate_read(address)?;
            format!(
                "\nByte 0x{} read from {}\n",
                hex_str(byte as usize, 2),
                bin_str(address, bits)
            )
        }
        Command::Write { address, byte } => {
            sim.simulate_write(address, byte)?;
            format!(
                "\nByte 0x{} written to {}\n",
                hex_str(byte as usize, 2),
                bin_str(address, bits)
            )
        }
        Command::RandRead { amount } => {
            sim.rand_read(amount)?;
            format!("\n{} bytes read from memory\n", amount)
        }
        Command::RandWrite { amount } => {
            sim.rand_write(amount)?;
            format!("\n{} bytes written to memory\n", amount)
        }
        Command::PrintCache { start, amount } => sim.print_cache(start, amount)?,
        Command::PrintMem { start, amount } => sim.print_mem(start, amount)?,
        Command::Stats => format!("\n{}\n", sim.stats()),
        Command::Quit => String::new(),
    };
    Ok(text)
}

/// Prompt-read-execute loop until `quit` or end of input.
pub fn run_repl<R: BufRead, W: Write>(
    sim: &mut Simulator,
    input: R,
    out: &mut W,
) -> anyhow::Result<()> {
    writeln!(out, "\n{}\n", sim.banner())?;
    writeln!(out, "Commands: {}\n", verbs().join(", "))?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;

        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(cmd) => match execute(sim, cmd) {
                Ok(text) => writeln!(out, "{}", text)?,
                Err(err) => writeln!(out, "\nERROR: {}\n", err)?,
            },
            Err(CommandError::Empty) => continue,
            Err(err) => writeln!(out, "\nERROR: {}\n", err)?,
        }
    }
    Ok(())
}
