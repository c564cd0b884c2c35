pub mod policy;

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::base::mem::Block;
use crate::error::{SimError, SimResult};
use crate::util::{bin_str, hex_str};
use policy::{build_policy, ReplacementKind, ReplacementPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum WritePolicy {
    #[default]
    #[serde(rename = "WB")]
    WriteBack,
    #[serde(rename = "WT")]
    WriteThrough,
}

impl FromStr for WritePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "WB" => Ok(Self::WriteBack),
            "WT" => Ok(Self::WriteThrough),
            _ => Err(format!(
                "unsupported write policy '{}', expected one of: WB, WT",
                value
            )),
        }
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteBack => f.write_str("WB"),
            Self::WriteThrough => f.write_str("WT"),
        }
    }
}

/// Sizes derived once from the construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    pub cache_size: usize,
    pub memory_size: usize,
    pub block_size: usize,
    pub associativity: usize,
    pub num_lines: usize,
    pub num_sets: usize,
    pub offset_bits: u32,
    pub index_bits: u32,
    pub tag_bits: u32,
}

impl CacheGeometry {
    pub fn new(
        cache_size: usize,
        memory_size: usize,
        block_size: usize,
        associativity: usize,
    ) -> SimResult<Self> {
        for (name, value) in [
            ("cache size", cache_size),
            ("memory size", memory_size),
            ("block size", block_size),
            ("associativity", associativity),
        ] {
            if !value.is_power_of_two() {
                return Err(SimError::InvalidConfiguration(format!(
                    "{} {} is not a power of two",
                    name, value
                )));
            }
        }
        if block_size > cache_size {
            return Err(SimError::InvalidConfiguration(format!(
                "block size {} exceeds cache size {}",
                block_size, cache_size
            )));
        }
        if cache_size > memory_size {
            return Err(SimError::InvalidConfiguration(format!(
                "cache size {} exceeds memory size {}",
                cache_size, memory_size
            )));
        }
        let num_lines = cache_size / block_size;
        if associativity > num_lines || num_lines % associativity != 0 {
            return Err(SimError::InvalidConfiguration(format!(
                "associativity {} does not divide {} lines",
                associativity, num_lines
            )));
        }
        let num_sets = num_lines / associativity;
        let offset_bits = block_size.trailing_zeros();
        let index_bits = num_sets.trailing_zeros();
        let tag_bits = memory_size.trailing_zeros() - index_bits - offset_bits;

        Ok(Self {
            cache_size,
            memory_size,
            block_size,
            associativity,
            num_lines,
            num_sets,
            offset_bits,
            index_bits,
            tag_bits,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressParts {
    pub tag: usize,
    pub index: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLine {
    pub valid: bool,
    pub dirty: bool,
    pub tag: usize,
    pub data: Block,
}

impl CacheLine {
    fn empty(block_size: usize) -> Self {
        Self {
            valid: false,
            dirty: false,
            tag: 0,
            data: vec![0u8; block_size],
        }
    }
}

/// A dirty line pushed out by `load`; the caller owes memory this block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Victim {
    pub address: usize,
    pub block: Block,
}

/// Set-associative cache over a block-addressed memory.
///
/// The cache never talks to memory itself. `read` and `write` only report
/// hit or miss; on a miss the caller fetches the block and hands it to
/// `load`, which in turn hands back any dirty victim for the caller to
/// persist.
#[derive(Debug)]
pub struct Cache {
    geometry: CacheGeometry,
    replacement: ReplacementKind,
    write_policy: WritePolicy,
    sets: Vec<Vec<CacheLine>>,
    policy: Box<dyn ReplacementPolicy>,
    evictions: u64,
}

impl Cache {
    /// `seed` only feeds the RAND policy.
    pub fn new(
        cache_size: usize,
        memory_size: usize,
        block_size: usize,
        associativity: usize,
        replacement: ReplacementKind,
        write_policy: WritePolicy,
        seed: u64,
    ) -> SimResult<Self> {
        let geometry = CacheGeometry::new(cache_size, memory_size, block_size, associativity)?;
        let sets = (0..geometry.num_sets)
            .map(|_| vec![CacheLine::empty(block_size); associativity])
            .collect();
        let policy = build_policy(replacement, geometry.num_sets, associativity, seed);

        Ok(Self {
            geometry,
            replacement,
            write_policy,
            sets,
            policy,
            evictions: 0,
        })
    }

    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    pub fn replacement(&self) -> ReplacementKind {
        self.replacement
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.write_policy
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn decompose(&self, addr: usize) -> SimResult<AddressParts> {
        if addr >= self.geometry.memory_size {
            return Err(SimError::AddressOutOfRange {
                address: addr,
                limit: self.geometry.memory_size,
            });
        }
        let g = &self.geometry;
        Ok(AddressParts {
            tag: addr >> (g.offset_bits + g.index_bits),
            index: (addr >> g.offset_bits) & (g.num_sets - 1),
            offset: addr & (g.block_size - 1),
        })
    }

    pub fn get_offset(&self, addr: usize) -> usize {
        addr & (self.geometry.block_size - 1)
    }

    fn find_way(&self, index: usize, tag: usize) -> Option<usize> {
        self.sets[index]
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    fn rebuild_addr(&self, tag: usize, index: usize) -> usize {
        let g = &self.geometry;
        (tag << (g.offset_bits + g.index_bits)) | (index << g.offset_bits)
    }

    /// The line currently holding `addr`, if any. Does not count as an access.
    pub fn line_for(&self, addr: usize) -> SimResult<Option<&CacheLine>> {
        let parts = self.decompose(addr)?;
        Ok(self
            .find_way(parts.index, parts.tag)
            .map(|way| &self.sets[parts.index][way]))
    }

    pub fn read(&mut self, addr: usize) -> SimResult<Option<Block>> {
        let AddressParts { tag, index, .. } = self.decompose(addr)?;
        let Some(way) = self.find_way(index, tag) else {
            return Ok(None);
        };
        self.policy.on_hit(index, way);
        Ok(Some(self.sets[index][way].data.clone()))
    }

    pub fn write(&mut self, addr: usize, byte: u8) -> SimResult<bool> {
        let AddressParts { tag, index, offset } = self.decompose(addr)?;
        let Some(way) = self.find_way(index, tag) else {
            return Ok(false);
        };
        self.policy.on_hit(index, way);
        let line = &mut self.sets[index][way];
        line.data[offset] = byte;
        if self.write_policy == WritePolicy::WriteBack {
            line.dirty = true;
        }
        Ok(true)
    }

    /// Install `block` as the line for `addr`. Afterwards the next `read` or
    /// `write` of `addr` hits.
    ///
    /// If the block is already resident its cached copy is kept untouched,
    /// since that copy may be newer than what memory just returned.
    pub fn load(&mut self, addr: usize, block: &[u8]) -> SimResult<Option<Victim>> {
        let AddressParts { tag, index, .. } = self.decompose(addr)?;
        if block.len() != self.geometry.block_size {
            return Err(SimError::SizeMismatch {
                expected: self.geometry.block_size,
                actual: block.len(),
            });
        }
        if let Some(way) = self.find_way(index, tag) {
            self.policy.on_hit(index, way);
            return Ok(None);
        }

        let way = match self.sets[index].iter().position(|line| !line.valid) {
            Some(way) => way,
            None => self.policy.victim(index),
        };

        let old = std::mem::replace(
            &mut self.sets[index][way],
            CacheLine {
                valid: true,
                dirty: false,
                tag,
                data: block.to_vec(),
            },
        );
        self.policy.on_fill(index, way);

        if !old.valid {
            return Ok(None);
        }
        self.evictions += 1;
        let old_addr = self.rebuild_addr(old.tag, index);
        debug!(
            "set {} way {}: evicted block @ {:#x} (dirty={}) for {:#x}",
            index, way, old_addr, old.dirty, addr
        );
        Ok(old.dirty.then(|| Victim {
            address: old_addr,
            block: old.data,
        }))
    }

    /// Dump `amount` lines starting at flat line number `start` (set-major).
    pub fn print_section(&self, start: usize, amount: usize) -> SimResult<String> {
        let g = &self.geometry;
        let end = start.checked_add(amount).filter(|&end| end <= g.num_lines);
        let Some(end) = end else {
            return Err(SimError::SectionOutOfRange {
                start,
                amount,
                limit: g.num_lines,
            });
        };

        let tag_width = (g.tag_bits as usize).max(3);
        let index_width = (g.index_bits as usize).max(5);
        let mut out = format!(
            "\n{:>4} {:<iw$} {:>3} V D {:<tw$} Data\n",
            "Line",
            "Index",
            "Way",
            "Tag",
            iw = index_width,
            tw = tag_width
        );
        for line_no in start..end {
            let (index, way) = (line_no / g.associativity, line_no % g.associativity);
            let line = &self.sets[index][way];
            let data: Vec<String> = line.data.iter().map(|&b| hex_str(b as usize, 2)).collect();
            out.push_str(&format!(
                "{:>4} {:<iw$} {:>3} {} {} {:<tw$} {} {}\n",
                line_no,
                bin_str(index, g.index_bits as usize),
                way,
                line.valid as u8,
                line.dirty as u8,
                bin_str(line.tag, g.tag_bits as usize),
                data.join(" "),
                self.policy.describe(index, way),
                iw = index_width,
                tw = tag_width
            ));
        }
        Ok(out)
    }
}
