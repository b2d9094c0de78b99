//! Build orchestration
//!
//! Coordinates the pipeline end to end: table construction, the two dummy
//! discovery passes, expansion, the dummy sort and the final merge into the
//! caller's visitor.

use super::annotate::{EdgeTag, EdgeVisitor};
use super::config::BuildConfiguration;
use super::dummies::{count_incoming_dummies, expand_dummies, find_incoming_dummies, sort_dummies};
use super::merge::merge;
use super::tables::build_tables;
use super::BuildError;
use crate::constants::MIN_K;
use crate::kmer::KmerStorage;
use tracing::info;

/// Counters reported by a completed build.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuildStats {
    /// Distinct edges indexed
    pub num_edges: usize,
    /// Nodes that required an incoming dummy chain
    pub num_dummy_seeds: usize,
    /// Total dummy slots after expansion (`num_dummy_seeds * k`)
    pub num_dummy_slots: usize,
    /// Standard edges emitted
    pub standard: u64,
    /// Incoming dummies emitted
    pub in_dummies: u64,
    /// Outgoing dummies emitted
    pub out_dummies: u64,
    /// Node groups emitted (events carrying the first-flag)
    pub groups: u64,
}

impl BuildStats {
    /// Total events emitted.
    pub fn total_events(&self) -> u64 {
        self.standard + self.in_dummies + self.out_dummies
    }
}

/// Tallies events on their way to the user visitor.
struct TallyVisitor<'a, V> {
    inner: &'a mut V,
    stats: BuildStats,
}

impl<S: KmerStorage, V: EdgeVisitor<S>> EdgeVisitor<S> for TallyVisitor<'_, V> {
    fn visit(&mut self, tag: EdgeTag, kmer: S, length: u8, first: bool) -> Result<(), BuildError> {
        match tag {
            EdgeTag::Standard => self.stats.standard += 1,
            EdgeTag::InDummy => self.stats.in_dummies += 1,
            EdgeTag::OutDummy => self.stats.out_dummies += 1,
        }
        if first {
            self.stats.groups += 1;
        }
        self.inner.visit(tag, kmer, length, first)
    }
}

/// Drives the construction pipeline for one configuration.
pub struct GraphBuilder {
    config: BuildConfiguration,
}

impl GraphBuilder {
    /// Create a builder with a validated configuration.
    pub fn new(config: BuildConfiguration) -> Result<Self, BuildError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Build the edge sequence of `sequences` into `visitor`.
    ///
    /// The storage type must be wide enough for the configured k; use
    /// [`dispatch_kmer_storage!`](crate::dispatch_kmer_storage) to pick it
    /// at runtime.
    pub fn build_from_sequences<S: KmerStorage, V: EdgeVisitor<S> + Send>(
        &self,
        sequences: &[Vec<u8>],
        visitor: &mut V,
    ) -> Result<BuildStats, BuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.num_threads)
            .build()
            .map_err(|e| BuildError::ThreadPool(e.to_string()))?;

        pool.install(|| self.build_inner::<S, V>(sequences, visitor))
    }

    fn build_inner<S: KmerStorage, V: EdgeVisitor<S>>(
        &self,
        sequences: &[Vec<u8>],
        visitor: &mut V,
    ) -> Result<BuildStats, BuildError> {
        let k = self.config.k;
        if k < MIN_K || k > S::MAX_K {
            return Err(BuildError::InvalidK { k, min: MIN_K, max: S::MAX_K });
        }
        if self.config.verbose {
            self.config.print();
        }

        info!("Step 1: building edge tables...");
        let tables = build_tables::<S>(sequences, k, self.config.add_reverse_complements)?;
        info!("  {} distinct edges", tables.num_edges());

        info!("Step 2: counting incoming dummies...");
        let num_seeds = count_incoming_dummies(&tables.table_a, &tables.table_b, k);
        let num_slots = num_seeds
            .checked_mul(k as usize)
            .ok_or(BuildError::SlotCountOverflow { num_seeds, k })?;
        info!("  {} nodes need incoming dummies ({} slots)", num_seeds, num_slots);

        info!("Step 3: collecting dummy seeds...");
        let mut dummies = vec![S::zero(); num_slots];
        let mut lengths = vec![0u8; num_slots];
        let mut next = 0;
        find_incoming_dummies(&tables.table_a, &tables.table_b, k, |seed| {
            dummies[next] = seed;
            next += 1;
        });
        debug_assert_eq!(next, num_seeds);

        info!("Step 4: expanding dummy chains...");
        expand_dummies(&mut dummies, &mut lengths, num_seeds, k)?;

        info!("Step 5: sorting dummies...");
        sort_dummies(&mut dummies, &mut lengths);

        info!("Step 6: merging edge sequence...");
        let mut tally = TallyVisitor { inner: visitor, stats: BuildStats::default() };
        merge(&tables.table_a, &tables.table_b, k, &dummies, &lengths, &mut tally)?;

        let mut stats = tally.stats;
        stats.num_edges = tables.num_edges();
        stats.num_dummy_seeds = num_seeds;
        stats.num_dummy_slots = num_slots;
        info!(
            "Build complete: {} events ({} standard, {} incoming, {} outgoing) over {} node groups",
            stats.total_events(),
            stats.standard,
            stats.in_dummies,
            stats.out_dummies,
            stats.groups
        );
        Ok(stats)
    }
}
