//! Construction pipeline for the BOSS edge sequence
//!
//! The pipeline runs in six steps:
//! 1. Extract edge k-mers and sort them into tables A and B
//! 2. Count incoming-dummy seeds (sizing pass)
//! 3. Collect the seeds into an exactly-sized buffer
//! 4. Expand each seed into its chain of shortened dummies
//! 5. Sort the dummy array
//! 6. Three-way merge A, B and the dummies into the visitor

pub mod annotate;
pub mod config;
pub mod dummies;
pub mod graph_builder;
pub mod merge;
pub mod parse;
pub mod tables;

pub use annotate::{CountingVisitor, EdgeTag, EdgeVisitor, FirstFlagger, RecordingVisitor, Uniquify};
pub use config::BuildConfiguration;
pub use dummies::{count_incoming_dummies, expand_dummies, find_incoming_dummies, sort_dummies};
pub use graph_builder::{BuildStats, GraphBuilder};
pub use merge::merge;
pub use tables::{build_tables, EdgeTables};

use thiserror::Error;

/// Errors raised by the construction pipeline.
///
/// Precondition violations are reported at call entry; once a merge starts
/// emitting events it runs to completion or propagates a visitor error
/// unchanged.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Tables A and B must describe the same edge multiset
    #[error("edge tables differ in length: table A has {a} entries, table B has {b}")]
    TableLengthMismatch {
        /// Length of table A
        a: usize,
        /// Length of table B
        b: usize,
    },

    /// The dummy array and its parallel length array must match
    #[error("dummy array has {dummies} entries but length array has {lengths}")]
    DummyLengthMismatch {
        /// Dummy k-mer count
        dummies: usize,
        /// Length entry count
        lengths: usize,
    },

    /// A caller-provided buffer cannot hold the expanded dummies
    #[error("dummy buffer too small: need {needed} slots, have {have}")]
    BufferTooSmall {
        /// Required slot count (`num_seeds * k`)
        needed: usize,
        /// Provided slot count
        have: usize,
    },

    /// `num_seeds * k` does not fit in the platform size type
    #[error("dummy slot count {num_seeds} * {k} overflows usize")]
    SlotCountOverflow {
        /// Number of discovered seeds
        num_seeds: usize,
        /// Edge length
        k: u32,
    },

    /// Edge length outside the supported range for the chosen storage
    #[error("k = {k} unsupported: need {min} <= k <= {max}")]
    InvalidK {
        /// Requested edge length
        k: u32,
        /// Minimum supported
        min: u32,
        /// Maximum supported by the storage width in use
        max: u32,
    },

    /// Rayon pool construction failed
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    /// Invalid input sequence data
    #[error(transparent)]
    Encoding(#[from] crate::encoding::EncodingError),

    /// I/O failure raised by an output visitor
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
