use std::fs;
use std::io;

use anyhow::Context;
use clap::Parser;
use cachesim::ui::{dump_results, make_sim, run_repl, CacheSimArgs};

pub fn main() -> anyhow::Result<()> {
    env_logger::init();

    let argv = CacheSimArgs::parse();
    let config = match &argv.config {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?,
        None => String::new(),
    };

    let (mut sim, sim_config) = make_sim(&config, Some(&argv))?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_repl(&mut sim, stdin.lock(), &mut stdout)?;

    if let Some(path) = &sim_config.results_json {
        dump_results(&sim.stats(), path)?;
    }
    Ok(())
}
