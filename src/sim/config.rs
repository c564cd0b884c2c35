use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use toml::Value;

use crate::cache::policy::ReplacementKind;
use crate::cache::{CacheGeometry, WritePolicy};
use crate::error::{SimError, SimResult};

pub const DEFAULT_LOG_FILE: &str = ".simulator.log";
/// Largest simulated address space, 2^32 bytes.
pub const MAX_MEMORY_EXPONENT: u32 = 32;
/// `log_file` value that sends the trace to stderr.
pub const STDERR_LOG_FILE: &str = "-";

pub trait Config: DeserializeOwned + Default {
    fn from_section(section: Option<&Value>) -> SimResult<Self> {
        match section {
            Some(value) => value
                .clone()
                .try_into()
                .map_err(|err| SimError::InvalidConfiguration(format!("{}", err))),
            None => {
                warn!("config section not found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub log_level: u64,
    /// Event trace destination; `"-"` sends it to stderr.
    pub log_file: Option<String>,
    pub seed: u64,
    pub results_json: Option<String>,
}

impl Config for SimConfig {}

impl SimConfig {
    /// File the trace is appended to, `None` for stderr.
    pub fn trace_path(&self) -> Option<&str> {
        self.log_file.as_deref().filter(|&path| path != STDERR_LOG_FILE)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            log_level: 0,
            log_file: Some(DEFAULT_LOG_FILE.to_string()),
            seed: 0,
            results_json: None,
        }
    }
}

/// Cache and memory shape. Sizes are exponents of two.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub memory: u32,
    pub cache: u32,
    pub block: u32,
    pub mapping: u32,
    pub replacement: ReplacementKind,
    pub write: WritePolicy,
    /// Install the block on a write-through write miss.
    pub write_allocate: bool,
}

impl Config for CacheConfig {}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            memory: 16,
            cache: 8,
            block: 3,
            mapping: 0,
            replacement: ReplacementKind::LRU,
            write: WritePolicy::WriteBack,
            write_allocate: true,
        }
    }
}

impl CacheConfig {
    pub fn memory_size(&self) -> usize {
        1 << self.memory
    }

    pub fn cache_size(&self) -> usize {
        1 << self.cache
    }

    pub fn block_size(&self) -> usize {
        1 << self.block
    }

    pub fn associativity(&self) -> usize {
        1 << self.mapping
    }

    /// Reject shapes the cache cannot be built with, before anything is allocated.
    pub fn validate(&self) -> SimResult<CacheGeometry> {
        if self.memory > MAX_MEMORY_EXPONENT {
            return Err(SimError::InvalidConfiguration(format!(
                "memory exponent {} is too large (at most {})",
                self.memory, MAX_MEMORY_EXPONENT
            )));
        }
        if self.block > self.cache || self.cache > self.memory {
            return Err(SimError::InvalidConfiguration(format!(
                "need block (2^{}) <= cache (2^{}) <= memory (2^{})",
                self.block, self.cache, self.memory
            )));
        }
        if self.mapping > self.cache - self.block {
            return Err(SimError::InvalidConfiguration(format!(
                "2^{}-way mapping needs more than the cache's {} lines",
                self.mapping,
                1usize << (self.cache - self.block)
            )));
        }
        CacheGeometry::new(
            self.cache_size(),
            self.memory_size(),
            self.block_size(),
            self.associativity(),
        )
    }

    pub fn mapping_str(&self) -> String {
        if self.mapping == 0 {
            "direct".to_string()
        } else {
            format!("2^{}-way associative", self.mapping)
        }
    }
}
