use crate::base::mem::HasMemory;
use crate::error::{SimError, SimResult};
use crate::util::{bin_str, hex_str};

/// Zero-initialized byte vector covering the whole simulated address space,
/// carved into fixed-size blocks.
#[derive(Debug, Clone)]
pub struct FlatMemory {
    bytes: Vec<u8>,
    block_size: usize,
}

impl HasMemory for FlatMemory {
    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn read_impl(&self, block_idx: usize) -> &[u8] {
        let start = block_idx * self.block_size;
        &self.bytes[start..start + self.block_size]
    }

    fn write_impl(&mut self, block_idx: usize, data: &[u8]) {
        let start = block_idx * self.block_size;
        self.bytes[start..start + self.block_size].copy_from_slice(data);
    }
}

impl FlatMemory {
    pub fn new(size: usize, block_size: usize) -> SimResult<Self> {
        if !size.is_power_of_two() || !block_size.is_power_of_two() || block_size > size {
            return Err(SimError::InvalidConfiguration(format!(
                "memory of {} bytes cannot be split into {}-byte blocks",
                size, block_size
            )));
        }
        Ok(Self {
            bytes: vec![0u8; size],
            block_size,
        })
    }

    pub fn num_blocks(&self) -> usize {
        self.bytes.len() / self.block_size
    }

    /// Dump `amount` bytes starting at `start`, one row per block touched.
    pub fn print_section(&self, start: usize, amount: usize) -> SimResult<String> {
        let end = start.checked_add(amount).filter(|&end| end <= self.size());
        let Some(end) = end else {
            return Err(SimError::SectionOutOfRange {
                start,
                amount,
                limit: self.size(),
            });
        };

        let addr_bits = self.size().trailing_zeros() as usize;
        let mut out = String::from("\nAddress  Data\n");
        let mut addr = start;
        while addr < end {
            let block_end = ((addr / self.block_size) + 1) * self.block_size;
            let row_end = block_end.min(end);
            let row: Vec<String> = self.bytes[addr..row_end]
                .iter()
                .map(|&b| hex_str(b as usize, 2))
                .collect();
            out.push_str(&format!("{}  {}\n", bin_str(addr, addr_bits), row.join(" ")));
            addr = row_end;
        }
        Ok(out)
    }
}
