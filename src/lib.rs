use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub mod common;
pub mod config;
pub mod dedup;
pub mod error;
pub mod format;
pub mod partition;
pub mod pipeline;
pub mod sink;
pub mod source;

#[cfg(test)]
mod test_support;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
