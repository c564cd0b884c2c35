use crate::error::{SimError, SimResult};

/// Unit of transfer between memory and cache.
pub type Block = Vec<u8>;

/// Trait for simulated memories that are only accessed one block at a time.
pub trait HasMemory {
    fn size(&self) -> usize;
    fn block_size(&self) -> usize;

    fn read_impl(&self, block_idx: usize) -> &[u8];
    fn get_block(&self, addr: usize) -> SimResult<Block> {
        self.check_addr(addr)?;
        Ok(self.read_impl(addr / self.block_size()).to_vec())
    }

    fn write_impl(&mut self, block_idx: usize, data: &[u8]);
    fn set_block(&mut self, addr: usize, data: &[u8]) -> SimResult<()> {
        self.check_addr(addr)?;
        if data.len() != self.block_size() {
            return Err(SimError::SizeMismatch {
                expected: self.block_size(),
                actual: data.len(),
            });
        }
        self.write_impl(addr / self.block_size(), data);
        Ok(())
    }

    fn check_addr(&self, addr: usize) -> SimResult<()> {
        if addr >= self.size() {
            return Err(SimError::AddressOutOfRange {
                address: addr,
                limit: self.size(),
            });
        }
        Ok(())
    }
}
