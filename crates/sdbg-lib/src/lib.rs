// sdbg: succinct de Bruijn graph edge-sequence construction
//
// Builds the BOSS-style edge sequence of a k-mer set: standard edges and
// synthetic dummy edges interleaved in canonical sorted order, streamed to
// pluggable visitors together with the per-edge flags a succinct encoder
// needs.

#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod constants;
pub mod encoding;
pub mod kmer;
pub mod builder;
pub mod output;

// Re-export common types at crate root
pub use builder::{
    BuildConfiguration, BuildError, BuildStats, CountingVisitor, EdgeTag, EdgeVisitor,
    GraphBuilder, RecordingVisitor,
};
pub use kmer::KmerStorage;
pub use output::{AsciiEdgeWriter, AsciiLabelWriter, PackedEdgeWriter};

/// Version information
pub fn version() -> (u8, u8, u8) {
    constants::VERSION
}
