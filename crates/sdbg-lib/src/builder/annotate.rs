//! Annotation adapters between the merge and the visitor
//!
//! The merge pushes raw `(tag, kmer, length)` events into a two-stage
//! adapter stack: [`Uniquify`] drops consecutive duplicate events, then
//! [`FirstFlagger`] attaches the first-flag that delimits node groups and
//! forwards the completed tuple to the user visitor.
//!
//! Both adapters keep their "last seen" state in instance fields and are
//! constructed fresh for every merge; they are single-threaded by contract.

use super::BuildError;
use crate::kmer::KmerStorage;

/// Classification of an emitted edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeTag {
    /// An edge present in the input
    Standard,
    /// A synthetic `$`-padded edge giving a node an incoming path
    InDummy,
    /// A synthetic edge giving a node a sentinel outgoing edge
    OutDummy,
}

/// Final consumer of the annotated edge sequence.
pub trait EdgeVisitor<S: KmerStorage> {
    /// Receive one edge. `length` is the number of represented symbols
    /// (always k except for shortened incoming dummies); `first` marks the
    /// first edge of its node group.
    fn visit(&mut self, tag: EdgeTag, kmer: S, length: u8, first: bool) -> Result<(), BuildError>;
}

impl<S: KmerStorage, V: EdgeVisitor<S>> EdgeVisitor<S> for &mut V {
    fn visit(&mut self, tag: EdgeTag, kmer: S, length: u8, first: bool) -> Result<(), BuildError> {
        (**self).visit(tag, kmer, length, first)
    }
}

/// An intermediate stage of the adapter stack: accepts un-flagged events.
pub trait EdgeSink<S: KmerStorage> {
    /// Accept one raw `(tag, kmer, length)` event.
    fn push(&mut self, tag: EdgeTag, kmer: S, length: u8) -> Result<(), BuildError>;
}

/// Suppresses an event exactly equal to the previously forwarded one.
///
/// This collapses the degenerate duplicates introduced by odd-k palindromic
/// inputs and by coincident shortened dummies, without a hash set.
pub struct Uniquify<S, T> {
    inner: T,
    last: Option<(EdgeTag, S, u8)>,
}

impl<S: KmerStorage, T: EdgeSink<S>> Uniquify<S, T> {
    /// Wrap the next stage.
    pub fn new(inner: T) -> Self {
        Self { inner, last: None }
    }
}

impl<S: KmerStorage, T: EdgeSink<S>> EdgeSink<S> for Uniquify<S, T> {
    fn push(&mut self, tag: EdgeTag, kmer: S, length: u8) -> Result<(), BuildError> {
        if self.last == Some((tag, kmer, length)) {
            return Ok(());
        }
        self.last = Some((tag, kmer, length));
        self.inner.push(tag, kmer, length)
    }
}

/// Computes the first-flag and completes the event tuple.
///
/// An event is `first` iff it is the first overall or its
/// `(start_node, length)` pair differs from the previous event's. One
/// `first = true` per maximal node-group run is the foundational signal of
/// the succinct representation.
pub struct FirstFlagger<S, V> {
    visitor: V,
    last_group: Option<(S, u8)>,
}

impl<S: KmerStorage, V: EdgeVisitor<S>> FirstFlagger<S, V> {
    /// Wrap the user visitor.
    pub fn new(visitor: V) -> Self {
        Self { visitor, last_group: None }
    }
}

impl<S: KmerStorage, V: EdgeVisitor<S>> EdgeSink<S> for FirstFlagger<S, V> {
    fn push(&mut self, tag: EdgeTag, kmer: S, length: u8) -> Result<(), BuildError> {
        let group = (kmer.start_node(), length);
        let first = self.last_group != Some(group);
        self.last_group = Some(group);
        self.visitor.visit(tag, kmer, length, first)
    }
}

/// Test/debug visitor that appends every tuple to a list.
#[derive(Debug, Default)]
pub struct RecordingVisitor<S> {
    /// Events in visit order
    pub events: Vec<(EdgeTag, S, u8, bool)>,
}

impl<S: KmerStorage> RecordingVisitor<S> {
    /// Empty recorder.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl<S: KmerStorage> EdgeVisitor<S> for RecordingVisitor<S> {
    fn visit(&mut self, tag: EdgeTag, kmer: S, length: u8, first: bool) -> Result<(), BuildError> {
        self.events.push((tag, kmer, length, first));
        Ok(())
    }
}

/// Visitor that only tallies events per tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingVisitor {
    /// Standard edges seen
    pub standard: u64,
    /// Incoming dummies seen
    pub in_dummies: u64,
    /// Outgoing dummies seen
    pub out_dummies: u64,
    /// Node groups seen (events with the first-flag set)
    pub groups: u64,
}

impl CountingVisitor {
    /// Zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total events across all tags.
    pub fn total(&self) -> u64 {
        self.standard + self.in_dummies + self.out_dummies
    }
}

impl<S: KmerStorage> EdgeVisitor<S> for CountingVisitor {
    fn visit(&mut self, tag: EdgeTag, _kmer: S, _length: u8, first: bool) -> Result<(), BuildError> {
        match tag {
            EdgeTag::Standard => self.standard += 1,
            EdgeTag::InDummy => self.in_dummies += 1,
            EdgeTag::OutDummy => self.out_dummies += 1,
        }
        if first {
            self.groups += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmer::KmerStorage;

    fn push_all<T: EdgeSink<u64>>(sink: &mut T, events: &[(EdgeTag, u64, u8)]) {
        for &(tag, kmer, len) in events {
            sink.push(tag, kmer, len).unwrap();
        }
    }

    #[test]
    fn test_uniquify_collapses_consecutive_duplicates() {
        let mut rec = RecordingVisitor::<u64>::new();
        {
            let mut stack = Uniquify::new(FirstFlagger::new(&mut rec));
            let acg = u64::pack(b"ACG", 3).unwrap();
            let cgt = u64::pack(b"CGT", 3).unwrap();
            push_all(
                &mut stack,
                &[
                    (EdgeTag::Standard, acg, 3),
                    (EdgeTag::Standard, acg, 3), // palindromic duplicate
                    (EdgeTag::Standard, cgt, 3),
                ],
            );
        }
        assert_eq!(rec.events.len(), 2);
    }

    #[test]
    fn test_uniquify_keeps_tag_and_length_distinctions() {
        let mut rec = RecordingVisitor::<u64>::new();
        {
            let mut stack = Uniquify::new(FirstFlagger::new(&mut rec));
            let x = u64::pack(b"ACG", 3).unwrap().start_node();
            // Same bits as an in-dummy seed and as a standard edge: both kept.
            push_all(&mut stack, &[(EdgeTag::InDummy, x, 3), (EdgeTag::Standard, x, 3)]);
            // Same bits, different length: kept.
            push_all(&mut stack, &[(EdgeTag::InDummy, x, 2)]);
        }
        assert_eq!(rec.events.len(), 3);
    }

    #[test]
    fn test_first_flagger_marks_node_groups() {
        let mut rec = RecordingVisitor::<u64>::new();
        {
            let mut stack = Uniquify::new(FirstFlagger::new(&mut rec));
            let acg = u64::pack(b"ACG", 3).unwrap();
            let act = u64::pack(b"ACT", 3).unwrap();
            let cgt = u64::pack(b"CGT", 3).unwrap();
            push_all(
                &mut stack,
                &[
                    (EdgeTag::Standard, acg, 3),
                    (EdgeTag::Standard, act, 3), // same node AC
                    (EdgeTag::Standard, cgt, 3), // node CG
                ],
            );
        }
        let firsts: Vec<bool> = rec.events.iter().map(|e| e.3).collect();
        assert_eq!(firsts, vec![true, false, true]);
    }

    #[test]
    fn test_first_flagger_splits_on_length() {
        let mut rec = RecordingVisitor::<u64>::new();
        {
            let mut stack = Uniquify::new(FirstFlagger::new(&mut rec));
            let x = u64::pack(b"ACG", 3).unwrap().start_node();
            push_all(&mut stack, &[(EdgeTag::InDummy, x, 2), (EdgeTag::InDummy, x, 3)]);
        }
        let firsts: Vec<bool> = rec.events.iter().map(|e| e.3).collect();
        assert_eq!(firsts, vec![true, true]);
    }

    #[test]
    fn test_counting_visitor() {
        let mut counts = CountingVisitor::new();
        let x = u64::pack(b"ACG", 3).unwrap();
        EdgeVisitor::<u64>::visit(&mut counts, EdgeTag::Standard, x, 3, true).unwrap();
        EdgeVisitor::<u64>::visit(&mut counts, EdgeTag::InDummy, x, 2, true).unwrap();
        EdgeVisitor::<u64>::visit(&mut counts, EdgeTag::OutDummy, x, 3, false).unwrap();
        assert_eq!(counts.standard, 1);
        assert_eq!(counts.in_dummies, 1);
        assert_eq!(counts.out_dummies, 1);
        assert_eq!(counts.groups, 2);
        assert_eq!(counts.total(), 3);
    }
}
