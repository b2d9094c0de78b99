//! Three-way merge of tables A, B and the expanded dummy array
//!
//! Walks the three sorted inputs with one index each, emitting the globally
//! ordered edge sequence through the [`Uniquify`]/[`FirstFlagger`] stack.
//! All comparisons happen at node level via [`KmerStorage::node_key`]; the
//! dummy flush is non-strict (`<=`) because dummies sort before anything
//! whose bits equal theirs. A node appearing in B but not in A gets an
//! outgoing dummy; equal A/B nodes yield the standard edge and advance B
//! through all ties.
//!
//! O(N + M), a pure forward scan, no allocation.

use super::annotate::{EdgeSink, EdgeTag, EdgeVisitor, FirstFlagger, Uniquify};
use super::BuildError;
use crate::constants::MIN_K;
use crate::kmer::KmerStorage;

/// Emit every dummy at or below `threshold` (a node-key value).
fn flush_dummies<S: KmerStorage, T: EdgeSink<S>>(
    dummies: &[S],
    lengths: &[u8],
    d_idx: &mut usize,
    threshold: S,
    sink: &mut T,
) -> Result<(), BuildError> {
    while *d_idx < dummies.len() && dummies[*d_idx].node_key() <= threshold {
        sink.push(EdgeTag::InDummy, dummies[*d_idx], lengths[*d_idx])?;
        *d_idx += 1;
    }
    Ok(())
}

/// Merge the edge tables and the sorted dummy array into `visitor`.
///
/// Preconditions are checked before the first visitor call: equal table
/// lengths, matching dummy/length arrays, supported k. After that the merge
/// either runs to completion or propagates a visitor error unchanged.
pub fn merge<S: KmerStorage, V: EdgeVisitor<S>>(
    table_a: &[S],
    table_b: &[S],
    k: u32,
    dummies: &[S],
    lengths: &[u8],
    visitor: &mut V,
) -> Result<(), BuildError> {
    if k < MIN_K || k > S::MAX_K {
        return Err(BuildError::InvalidK { k, min: MIN_K, max: S::MAX_K });
    }
    if table_a.len() != table_b.len() {
        return Err(BuildError::TableLengthMismatch { a: table_a.len(), b: table_b.len() });
    }
    if dummies.len() != lengths.len() {
        return Err(BuildError::DummyLengthMismatch {
            dummies: dummies.len(),
            lengths: lengths.len(),
        });
    }

    let n = table_a.len();
    let mut sink = Uniquify::new(FirstFlagger::new(visitor));
    let (mut a_idx, mut b_idx, mut d_idx) = (0, 0, 0);

    while a_idx < n && b_idx < n {
        let edge = table_a[a_idx];
        let sn = edge.start_node();
        let en = table_b[b_idx].end_node(k);
        if en < sn {
            // B \ A: this target node has no outgoing edge.
            flush_dummies(dummies, lengths, &mut d_idx, en.node_key(), &mut sink)?;
            sink.push(EdgeTag::OutDummy, en, k as u8)?;
            b_idx += 1;
            while b_idx < n && table_b[b_idx].end_node(k) == en {
                b_idx += 1;
            }
        } else {
            flush_dummies(dummies, lengths, &mut d_idx, edge.node_key(), &mut sink)?;
            sink.push(EdgeTag::Standard, edge, k as u8)?;
            a_idx += 1;
            if en == sn {
                b_idx += 1;
                while b_idx < n && table_b[b_idx].end_node(k) == en {
                    b_idx += 1;
                }
            }
        }
    }

    // A may retain entries after B is depleted, and vice versa.
    while a_idx < n {
        let edge = table_a[a_idx];
        flush_dummies(dummies, lengths, &mut d_idx, edge.node_key(), &mut sink)?;
        sink.push(EdgeTag::Standard, edge, k as u8)?;
        a_idx += 1;
    }
    while b_idx < n {
        let en = table_b[b_idx].end_node(k);
        flush_dummies(dummies, lengths, &mut d_idx, en.node_key(), &mut sink)?;
        // Ties collapse in the uniquifier.
        sink.push(EdgeTag::OutDummy, en, k as u8)?;
        b_idx += 1;
    }

    while d_idx < dummies.len() {
        sink.push(EdgeTag::InDummy, dummies[d_idx], lengths[d_idx])?;
        d_idx += 1;
    }
    Ok(())
}
