use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::base::mem::HasMemory;
use crate::cache::{Cache, WritePolicy};
use crate::error::{SimError, SimResult};
use crate::sim::config::CacheConfig;
use crate::sim::flat_mem::FlatMemory;
use crate::sim::log::Logger;
use crate::sim::stats::AccessStats;
use crate::util::hash_u64;
use crate::{trace_debug, trace_info};

/// One memory, one cache, and the bookkeeping around them.
///
/// All accesses go through `simulate_read`/`simulate_write`, which drive the
/// miss path (fetch, load, victim write-back) the cache leaves to its caller.
#[derive(Debug)]
pub struct Simulator {
    config: CacheConfig,
    memory: FlatMemory,
    cache: Cache,
    stats: AccessStats,
    rng: StdRng,
    logger: Logger,
}

impl Simulator {
    pub fn new(config: &CacheConfig, seed: u64, logger: Logger) -> SimResult<Self> {
        let geometry = config.validate()?;
        let memory = FlatMemory::new(geometry.memory_size, geometry.block_size)?;
        let cache = Cache::new(
            geometry.cache_size,
            geometry.memory_size,
            geometry.block_size,
            geometry.associativity,
            config.replacement,
            config.write,
            hash_u64(seed),
        )?;
        Ok(Self {
            config: *config,
            memory,
            cache,
            stats: AccessStats::default(),
            rng: StdRng::seed_from_u64(seed),
            logger,
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn memory(&self) -> &FlatMemory {
        &self.memory
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn stats(&self) -> AccessStats {
        self.stats
    }

    pub fn banner(&self) -> String {
        let g = self.cache.geometry();
        format!(
            "Memory size: {} bytes ({} blocks)\n\
             Cache size: {} bytes ({} lines)\n\
             Block size: {} bytes\n\
             Mapping policy: {}\n\
             Replacement policy: {} | Write policy: {}",
            g.memory_size,
            self.memory.num_blocks(),
            g.cache_size,
            g.num_lines,
            g.block_size,
            self.config.mapping_str(),
            self.cache.replacement(),
            self.cache.write_policy()
        )
    }

    /// Bring the block holding `addr` into the cache, persisting any dirty victim.
    fn fill(&mut self, addr: usize) -> SimResult<()> {
        let block = self.memory.get_block(addr)?;
        if let Some(victim) = self.cache.load(addr, &block)? {
            trace_debug!(self.logger, "write back block @ {:#x}", victim.address);
            self.memory.set_block(victim.address, &victim.block)?;
            self.stats.record_write_back();
        }
        self.stats.set_evictions(self.cache.evictions());
        Ok(())
    }

    pub fn simulate_read(&mut self, addr: usize) -> SimResult<u8> {
        let parts = self.cache.decompose(addr)?;
        if let Some(block) = self.cache.read(addr)? {
            self.stats.record_read(true);
            trace_info!(self.logger, "read {:#x}: hit (set {})", addr, parts.index);
            return Ok(block[parts.offset]);
        }
        self.stats.record_read(false);
        trace_info!(self.logger, "read {:#x}: miss (set {})", addr, parts.index);

        self.fill(addr)?;
        let block = self
            .cache
            .read(addr)?
            .ok_or(SimError::RetryMissed { address: addr })?;
        Ok(block[self.cache.get_offset(addr)])
    }

    pub fn simulate_write(&mut self, addr: usize, byte: u8) -> SimResult<()> {
        let parts = self.cache.decompose(addr)?;
        let hit = self.cache.write(addr, byte)?;
        self.stats.record_write(hit);
        trace_info!(
            self.logger,
            "write {:#x} <- {:#04x}: {} (set {})",
            addr,
            byte,
            if hit { "hit" } else { "miss" },
            parts.index
        );

        match self.cache.write_policy() {
            WritePolicy::WriteThrough => {
                let mut block = self.memory.get_block(addr)?;
                block[parts.offset] = byte;
                self.memory.set_block(addr, &block)?;
                if !hit && self.config.write_allocate {
                    self.fill(addr)?;
                }
            }
            WritePolicy::WriteBack => {
                if !hit {
                    self.fill(addr)?;
                    if !self.cache.write(addr, byte)? {
                        return Err(SimError::RetryMissed { address: addr });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn random_address(&mut self) -> usize {
        self.rng.gen_range(0..self.memory.size())
    }

    pub fn rand_read(&mut self, amount: usize) -> SimResult<()> {
        for _ in 0..amount {
            let addr = self.random_address();
            self.simulate_read(addr)?;
        }
        Ok(())
    }

    pub fn rand_write(&mut self, amount: usize) -> SimResult<()> {
        for _ in 0..amount {
            let addr = self.random_address();
            let byte: u8 = self.rng.gen();
            self.simulate_write(addr, byte)?;
        }
        Ok(())
    }

    pub fn print_cache(&self, start: usize, amount: usize) -> SimResult<String> {
        self.cache.print_section(start, amount)
    }

    pub fn print_mem(&self, start: usize, amount: usize) -> SimResult<String> {
        self.memory.print_section(start, amount)
    }

    pub fn address_bits(&self) -> usize {
        self.config.memory as usize
    }
}
