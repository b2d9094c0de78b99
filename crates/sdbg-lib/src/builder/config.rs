//! Build configuration
//!
//! Parameters for edge-sequence construction, validated before any work
//! starts.

use crate::constants::{is_valid_k, MAX_K, MIN_K};
use super::BuildError;

/// Configuration for a [`GraphBuilder`](super::GraphBuilder) run.
#[derive(Debug, Clone)]
pub struct BuildConfiguration {
    /// Edge length (node length + 1); 2 ≤ k ≤ 63
    pub k: u32,

    /// Threads for parallel sorting (0 = all available cores)
    pub num_threads: usize,

    /// Index the reverse complement of every edge as well
    pub add_reverse_complements: bool,

    /// Verbose progress output
    pub verbose: bool,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        Self {
            k: 27,
            num_threads: 0,
            add_reverse_complements: false,
            verbose: true,
        }
    }
}

impl BuildConfiguration {
    /// Configuration with the given edge length and defaults elsewhere.
    pub fn new(k: u32) -> Result<Self, BuildError> {
        let config = Self { k, ..Self::default() };
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges.
    ///
    /// Whether the chosen storage width can hold `k` is checked again when
    /// the build is monomorphized.
    pub fn validate(&self) -> Result<(), BuildError> {
        if !is_valid_k(self.k) {
            return Err(BuildError::InvalidK { k: self.k, min: MIN_K, max: MAX_K });
        }
        Ok(())
    }

    /// Log configuration parameters via tracing
    pub fn print(&self) {
        tracing::info!("Build configuration:");
        tracing::info!("  k = {}", self.k);
        if self.num_threads == 0 {
            tracing::info!("  num_threads = all available cores");
        } else {
            tracing::info!("  num_threads = {}", self.num_threads);
        }
        tracing::info!("  add_reverse_complements = {}", self.add_reverse_complements);
        tracing::debug!("  verbose = {}", self.verbose);
    }
}
