use thiserror::Error;

/// Failures raised by the memory, the cache and the simulator built on them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("address {address:#x} out of range (memory is {limit} bytes)")]
    AddressOutOfRange { address: usize, limit: usize },

    #[error("block of {actual} bytes does not match block size {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("section [{start}, {start}+{amount}) out of range (limit {limit})")]
    SectionOutOfRange {
        start: usize,
        amount: usize,
        limit: usize,
    },

    #[error("access to {address:#x} missed right after its block was loaded")]
    RetryMissed { address: usize },
}

pub type SimResult<T> = Result<T, SimError>;
