pub mod config;
pub mod flat_mem;
pub mod log;
pub mod stats;
pub mod top;
