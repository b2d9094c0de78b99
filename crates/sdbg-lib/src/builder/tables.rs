//! Edge table extraction and sorting
//!
//! Turns input sequences into the two sorted edge tables the merge
//! consumes: table A ordered by source node then label (the BOSS edge
//! order), table B ordered by target node then label. Both tables hold the
//! same deduplicated edge multiset.

use super::BuildError;
use crate::encoding::encode_base;
use crate::kmer::KmerStorage;
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::debug;

/// The pair of sorted edge tables.
#[derive(Debug, Clone)]
pub struct EdgeTables<S> {
    /// Edges sorted by `(node_key, label)`
    pub table_a: Vec<S>,
    /// The same edges sorted by `(end_node, label)`
    pub table_b: Vec<S>,
}

impl<S> EdgeTables<S> {
    /// Number of edges in each table.
    pub fn num_edges(&self) -> usize {
        self.table_a.len()
    }
}

/// Table-A comparison: source node colex order, ties by the remaining bits
/// (the label slot).
pub fn edge_ordering<S: KmerStorage>(a: &S, b: &S) -> Ordering {
    a.node_key().cmp(&b.node_key()).then(a.cmp(b))
}

/// Extract, deduplicate and sort the edge k-mers of `sequences`.
///
/// Sequences shorter than k contribute nothing. With `add_rev_comp` the
/// reverse complement of every edge is indexed as well, the usual way to
/// make the graph orientation-complete.
pub fn build_tables<S: KmerStorage>(
    sequences: &[Vec<u8>],
    k: u32,
    add_rev_comp: bool,
) -> Result<EdgeTables<S>, BuildError> {
    let mut edges: Vec<S> = Vec::new();
    for seq in sequences {
        if seq.len() < k as usize {
            continue;
        }
        let mut window = S::zero();
        for (i, &base) in seq.iter().enumerate() {
            window = window.push_base(encode_base(base)?, k);
            if i + 1 >= k as usize {
                edges.push(window);
            }
        }
    }

    if add_rev_comp {
        let rc: Vec<S> = edges.par_iter().map(|e| e.reverse_complement(k)).collect();
        edges.extend(rc);
    }

    edges.par_sort_unstable_by(edge_ordering);
    edges.dedup();
    debug!("extracted {} distinct edges", edges.len());

    let mut table_b = edges.clone();
    table_b.par_sort_unstable_by(|a, b| a.end_node(k).cmp(&b.end_node(k)).then(a.cmp(b)));

    Ok(EdgeTables { table_a: edges, table_b })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seqs(strs: &[&str]) -> Vec<Vec<u8>> {
        strs.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_window_extraction() {
        let t = build_tables::<u64>(&seqs(&["ACGT"]), 3, false).unwrap();
        assert_eq!(t.num_edges(), 2);
        assert_eq!(t.table_a[0].unpack(3), "ACG");
        assert_eq!(t.table_a[1].unpack(3), "CGT");
    }

    #[test]
    fn test_short_sequences_skipped() {
        let t = build_tables::<u64>(&seqs(&["AC", "ACG"]), 3, false).unwrap();
        assert_eq!(t.num_edges(), 1);
    }

    #[test]
    fn test_dedup() {
        let t = build_tables::<u64>(&seqs(&["ACGT", "ACGT"]), 3, false).unwrap();
        assert_eq!(t.num_edges(), 2);
    }

    #[test]
    fn test_table_a_node_order_beats_label_order() {
        // Raw colex of full edges would put GGA (label A) before ACG
        // (label G); table A must order by node first: AC < GG.
        let t = build_tables::<u64>(&seqs(&["ACG", "GGA"]), 3, false).unwrap();
        assert_eq!(t.table_a[0].unpack(3), "ACG");
        assert_eq!(t.table_a[1].unpack(3), "GGA");
    }

    #[test]
    fn test_table_a_label_tiebreak() {
        let t = build_tables::<u64>(&seqs(&["ACT", "ACG", "ACA"]), 3, false).unwrap();
        let rendered: Vec<String> = t.table_a.iter().map(|e| e.unpack(3)).collect();
        assert_eq!(rendered, vec!["ACA", "ACG", "ACT"]);
    }

    #[test]
    fn test_table_b_sorted_by_end_node() {
        let t = build_tables::<u64>(&seqs(&["ACGT", "TTG"]), 3, false).unwrap();
        for pair in t.table_b.windows(2) {
            assert!(pair[0].end_node(3) <= pair[1].end_node(3));
        }
        // Same multiset in both tables.
        let mut a = t.table_a.clone();
        let mut b = t.table_b.clone();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn test_reverse_complements_added() {
        let t = build_tables::<u64>(&seqs(&["ACG"]), 3, true).unwrap();
        // ACG plus its reverse complement CGT.
        assert_eq!(t.num_edges(), 2);
        let rendered: Vec<String> = t.table_a.iter().map(|e| e.unpack(3)).collect();
        assert!(rendered.contains(&"ACG".to_string()));
        assert!(rendered.contains(&"CGT".to_string()));
    }

    #[test]
    fn test_invalid_base_rejected() {
        assert!(build_tables::<u64>(&seqs(&["ACGN"]), 3, false).is_err());
    }
}
