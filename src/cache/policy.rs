use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum ReplacementKind {
    #[default]
    LRU,
    LFU,
    FIFO,
    RAND,
}

impl FromStr for ReplacementKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "LRU" => Ok(Self::LRU),
            "LFU" => Ok(Self::LFU),
            "FIFO" => Ok(Self::FIFO),
            "RAND" => Ok(Self::RAND),
            _ => Err(format!(
                "unsupported replacement policy '{}', expected one of: LRU, LFU, FIFO, RAND",
                value
            )),
        }
    }
}

impl fmt::Display for ReplacementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LRU => "LRU",
            Self::LFU => "LFU",
            Self::FIFO => "FIFO",
            Self::RAND => "RAND",
        };
        f.write_str(name)
    }
}

/// Per-line bookkeeping for one replacement strategy, kept alongside the
/// cache's line array and indexed by `(set, way)`.
///
/// The cache only asks for a victim once every way in the set is valid;
/// invalid ways are always filled first.
pub trait ReplacementPolicy: fmt::Debug {
    /// A block was just installed in `way`.
    fn on_fill(&mut self, set: usize, way: usize);
    /// A read or write hit `way`.
    fn on_hit(&mut self, set: usize, way: usize);
    /// Pick the way to evict from a full set.
    fn victim(&mut self, set: usize) -> usize;
    /// Short rendering of the metadata for diagnostic dumps.
    fn describe(&self, set: usize, way: usize) -> String;
}

pub fn build_policy(
    kind: ReplacementKind,
    sets: usize,
    ways: usize,
    seed: u64,
) -> Box<dyn ReplacementPolicy> {
    match kind {
        ReplacementKind::LRU => Box::new(Lru::new(sets, ways)),
        ReplacementKind::LFU => Box::new(Lfu::new(sets, ways)),
        ReplacementKind::FIFO => Box::new(Fifo::new(sets, ways)),
        ReplacementKind::RAND => Box::new(RandomEvict::new(ways, seed)),
    }
}

fn stamp_table(sets: usize, ways: usize) -> Vec<Vec<u64>> {
    vec![vec![0; ways.max(1)]; sets.max(1)]
}

fn oldest(stamps: &[u64]) -> usize {
    stamps
        .iter()
        .enumerate()
        .min_by_key(|&(_, &stamp)| stamp)
        .map_or(0, |(way, _)| way)
}

#[derive(Debug)]
pub struct Lru {
    last_touch: Vec<Vec<u64>>,
    clock: u64,
}

impl Lru {
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            last_touch: stamp_table(sets, ways),
            clock: 0,
        }
    }

    fn touch(&mut self, set: usize, way: usize) {
        self.clock += 1;
        self.last_touch[set][way] = self.clock;
    }
}

impl ReplacementPolicy for Lru {
    fn on_fill(&mut self, set: usize, way: usize) {
        self.touch(set, way);
    }

    fn on_hit(&mut self, set: usize, way: usize) {
        self.touch(set, way);
    }

    fn victim(&mut self, set: usize) -> usize {
        oldest(&self.last_touch[set])
    }

    fn describe(&self, set: usize, way: usize) -> String {
        format!("last={}", self.last_touch[set][way])
    }
}

#[derive(Debug)]
pub struct Lfu {
    uses: Vec<Vec<u64>>,
    inserted: Vec<Vec<u64>>,
    clock: u64,
}

impl Lfu {
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            uses: stamp_table(sets, ways),
            inserted: stamp_table(sets, ways),
            clock: 0,
        }
    }
}

impl ReplacementPolicy for Lfu {
    fn on_fill(&mut self, set: usize, way: usize) {
        self.clock += 1;
        self.uses[set][way] = 1;
        self.inserted[set][way] = self.clock;
    }

    fn on_hit(&mut self, set: usize, way: usize) {
        self.uses[set][way] = self.uses[set][way].saturating_add(1);
    }

    // ties go to the earliest insertion
    fn victim(&mut self, set: usize) -> usize {
        let uses = &self.uses[set];
        let inserted = &self.inserted[set];
        (0..uses.len())
            .min_by_key(|&way| (uses[way], inserted[way]))
            .unwrap_or(0)
    }

    fn describe(&self, set: usize, way: usize) -> String {
        format!("uses={}", self.uses[set][way])
    }
}

#[derive(Debug)]
pub struct Fifo {
    inserted: Vec<Vec<u64>>,
    clock: u64,
}

impl Fifo {
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            inserted: stamp_table(sets, ways),
            clock: 0,
        }
    }
}

impl ReplacementPolicy for Fifo {
    fn on_fill(&mut self, set: usize, way: usize) {
        self.clock += 1;
        self.inserted[set][way] = self.clock;
    }

    fn on_hit(&mut self, _set: usize, _way: usize) {}

    fn victim(&mut self, set: usize) -> usize {
        oldest(&self.inserted[set])
    }

    fn describe(&self, set: usize, way: usize) -> String {
        format!("in={}", self.inserted[set][way])
    }
}

#[derive(Debug)]
pub struct RandomEvict {
    ways: usize,
    rng: StdRng,
}

impl RandomEvict {
    pub fn new(ways: usize, seed: u64) -> Self {
        Self {
            ways: ways.max(1),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ReplacementPolicy for RandomEvict {
    fn on_fill(&mut self, _set: usize, _way: usize) {}

    fn on_hit(&mut self, _set: usize, _way: usize) {}

    fn victim(&mut self, _set: usize) -> usize {
        self.rng.gen_range(0..self.ways)
    }

    fn describe(&self, _set: usize, _way: usize) -> String {
        String::new()
    }
}
