//! Output writers for the edge sequence
//!
//! Three visitor implementations cover the planned output formats: ASCII
//! rows carrying the full edge string, ASCII label columns, and a packed
//! binary format spending five bits of information per record (stored one
//! record per byte so downstream parsing stays trivial).
//!
//! The repeated-edge-label flag is a visitor concern: each writer tracks
//! the `(node_suffix, length)` group of the edges it sees and flags a label
//! already seen inside the current group. Sentinel-labeled edges (outgoing
//! dummies and seed dummies) never flag.

use crate::builder::annotate::{EdgeTag, EdgeVisitor};
use crate::builder::BuildError;
use crate::constants::{ALPHABET_SIZE, SENTINEL};
use crate::encoding::decode_base;
use crate::kmer::KmerStorage;
use std::io::Write;

/// Render one edge as its k-character string, `$`-padded as its tag and
/// length dictate.
pub fn edge_string<S: KmerStorage>(tag: EdgeTag, kmer: S, length: u8, k: u32) -> String {
    let mut out = String::with_capacity(k as usize);
    match tag {
        EdgeTag::Standard => {
            for i in 0..k {
                out.push(decode_base(kmer.symbol_at(i, k)) as char);
            }
        }
        // Outgoing dummies and seeds are a node followed by a sentinel label.
        EdgeTag::OutDummy | EdgeTag::InDummy if length as u32 == k => {
            for i in 0..k - 1 {
                out.push(decode_base(kmer.symbol_at(i, k)) as char);
            }
            out.push(SENTINEL as char);
        }
        EdgeTag::InDummy => {
            let pad = k - length as u32;
            for _ in 0..pad {
                out.push(SENTINEL as char);
            }
            for i in pad..k {
                out.push(decode_base(kmer.symbol_at(i, k)) as char);
            }
        }
        EdgeTag::OutDummy => unreachable!("outgoing dummies always have length k"),
    }
    out
}

/// The outgoing label of an edge as an ASCII character, `$` for
/// sentinel-labeled edges.
pub fn label_char<S: KmerStorage>(tag: EdgeTag, kmer: S, length: u8, k: u32) -> u8 {
    if is_sentinel_labeled(tag, length, k) {
        SENTINEL
    } else {
        decode_base(kmer.edge_label())
    }
}

#[inline]
fn is_sentinel_labeled(tag: EdgeTag, length: u8, k: u32) -> bool {
    match tag {
        EdgeTag::OutDummy => true,
        EdgeTag::InDummy => length as u32 == k,
        EdgeTag::Standard => false,
    }
}

/// Tracks repeated outgoing labels within a node-suffix group.
#[derive(Debug)]
struct EdgeFlagTracker<S> {
    last_group: Option<(S, u8)>,
    seen: [bool; ALPHABET_SIZE],
}

impl<S: KmerStorage> EdgeFlagTracker<S> {
    fn new() -> Self {
        Self { last_group: None, seen: [false; ALPHABET_SIZE] }
    }

    /// Feed one edge; returns true when its label already appeared in the
    /// current group.
    fn observe(&mut self, tag: EdgeTag, kmer: S, length: u8, k: u32) -> bool {
        let group = (kmer.node_suffix(k), length);
        if self.last_group != Some(group) {
            self.last_group = Some(group);
            self.seen = [false; ALPHABET_SIZE];
        }
        if is_sentinel_labeled(tag, length, k) {
            return false;
        }
        let label = kmer.edge_label() as usize;
        let flagged = self.seen[label];
        self.seen[label] = true;
        flagged
    }
}

/// Writes `first edge-string edge-flag` rows, one per edge.
pub struct AsciiEdgeWriter<S, W> {
    writer: W,
    k: u32,
    flags: EdgeFlagTracker<S>,
}

impl<S: KmerStorage, W: Write> AsciiEdgeWriter<S, W> {
    /// Wrap an output stream.
    pub fn new(writer: W, k: u32) -> Self {
        Self { writer, k, flags: EdgeFlagTracker::new() }
    }

    /// Flush buffered output.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl<S: KmerStorage, W: Write> EdgeVisitor<S> for AsciiEdgeWriter<S, W> {
    fn visit(&mut self, tag: EdgeTag, kmer: S, length: u8, first: bool) -> Result<(), BuildError> {
        let flag = self.flags.observe(tag, kmer, length, self.k);
        writeln!(
            self.writer,
            "{} {} {}",
            first as u8,
            edge_string(tag, kmer, length, self.k),
            flag as u8
        )?;
        Ok(())
    }
}

/// Writes only the label column, one character per line; a repeated label
/// inside its node group is written lowercase.
pub struct AsciiLabelWriter<S, W> {
    writer: W,
    k: u32,
    flags: EdgeFlagTracker<S>,
}

impl<S: KmerStorage, W: Write> AsciiLabelWriter<S, W> {
    /// Wrap an output stream.
    pub fn new(writer: W, k: u32) -> Self {
        Self { writer, k, flags: EdgeFlagTracker::new() }
    }

    /// Flush buffered output.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl<S: KmerStorage, W: Write> EdgeVisitor<S> for AsciiLabelWriter<S, W> {
    fn visit(&mut self, tag: EdgeTag, kmer: S, length: u8, _first: bool) -> Result<(), BuildError> {
        let flag = self.flags.observe(tag, kmer, length, self.k);
        let mut c = label_char(tag, kmer, length, self.k);
        if flag {
            c = c.to_ascii_lowercase();
        }
        self.writer.write_all(&[c, b'\n'])?;
        Ok(())
    }
}

/// Packed binary writer: one byte per record holding five significant bits.
///
/// Bit layout: bits 0..3 = symbol (0 for `$`, 1..=4 for A, C, G, T),
/// bit 3 = first-flag, bit 4 = edge-label flag.
pub struct PackedEdgeWriter<S, W> {
    writer: W,
    k: u32,
    flags: EdgeFlagTracker<S>,
}

impl<S: KmerStorage, W: Write> PackedEdgeWriter<S, W> {
    /// Wrap an output stream.
    pub fn new(writer: W, k: u32) -> Self {
        Self { writer, k, flags: EdgeFlagTracker::new() }
    }

    /// Flush buffered output.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl<S: KmerStorage, W: Write> EdgeVisitor<S> for PackedEdgeWriter<S, W> {
    fn visit(&mut self, tag: EdgeTag, kmer: S, length: u8, first: bool) -> Result<(), BuildError> {
        let flag = self.flags.observe(tag, kmer, length, self.k);
        let symbol = if is_sentinel_labeled(tag, length, self.k) {
            0u8
        } else {
            kmer.edge_label() + 1
        };
        let record = symbol | ((first as u8) << 3) | ((flag as u8) << 4);
        self.writer.write_all(&[record])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acg() -> u64 {
        u64::pack(b"ACG", 3).unwrap()
    }

    #[test]
    fn test_edge_string_standard() {
        assert_eq!(edge_string(EdgeTag::Standard, acg(), 3, 3), "ACG");
    }

    #[test]
    fn test_edge_string_dummies() {
        let seed = acg().start_node();
        let d1 = seed.shift_symbol();
        let d2 = d1.shift_symbol();
        assert_eq!(edge_string(EdgeTag::InDummy, seed, 3, 3), "AC$");
        assert_eq!(edge_string(EdgeTag::InDummy, d1, 2, 3), "$AC");
        assert_eq!(edge_string(EdgeTag::InDummy, d2, 1, 3), "$$A");
        assert_eq!(edge_string(EdgeTag::OutDummy, acg().end_node(3), 3, 3), "CG$");
    }

    #[test]
    fn test_label_char() {
        assert_eq!(label_char(EdgeTag::Standard, acg(), 3, 3), b'G');
        assert_eq!(label_char(EdgeTag::OutDummy, acg().end_node(3), 3, 3), b'$');
        let seed = acg().start_node();
        assert_eq!(label_char(EdgeTag::InDummy, seed, 3, 3), b'$');
        assert_eq!(label_char(EdgeTag::InDummy, seed.shift_symbol(), 2, 3), b'C');
    }

    #[test]
    fn test_ascii_edge_writer_rows() {
        let mut buf = Vec::new();
        {
            let mut w = AsciiEdgeWriter::<u64, _>::new(&mut buf, 3);
            let acg = acg();
            let act = u64::pack(b"ACT", 3).unwrap();
            w.visit(EdgeTag::Standard, acg, 3, true).unwrap();
            w.visit(EdgeTag::Standard, act, 3, false).unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "1 ACG 0\n0 ACT 0\n");
    }

    #[test]
    fn test_edge_flag_set_on_repeated_label() {
        let mut buf = Vec::new();
        {
            let mut w = AsciiEdgeWriter::<u64, _>::new(&mut buf, 3);
            // ACG and TCG share the node suffix "C" and the label G: the
            // second occurrence carries the flag.
            let acg = acg();
            let tcg = u64::pack(b"TCG", 3).unwrap();
            w.visit(EdgeTag::Standard, acg, 3, true).unwrap();
            w.visit(EdgeTag::Standard, tcg, 3, true).unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "1 ACG 0\n1 TCG 1\n");
    }

    #[test]
    fn test_edge_flag_resets_on_new_suffix_group() {
        let mut buf = Vec::new();
        {
            let mut w = AsciiEdgeWriter::<u64, _>::new(&mut buf, 3);
            let acg = acg();
            let cgt = u64::pack(b"CGT", 3).unwrap();
            w.visit(EdgeTag::Standard, acg, 3, true).unwrap();
            w.visit(EdgeTag::Standard, cgt, 3, true).unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "1 ACG 0\n1 CGT 0\n");
    }

    #[test]
    fn test_label_writer_lowercases_repeats() {
        let mut buf = Vec::new();
        {
            let mut w = AsciiLabelWriter::<u64, _>::new(&mut buf, 3);
            let acg = acg();
            let tcg = u64::pack(b"TCG", 3).unwrap();
            w.visit(EdgeTag::Standard, acg, 3, true).unwrap();
            w.visit(EdgeTag::Standard, tcg, 3, true).unwrap();
            w.visit(EdgeTag::OutDummy, tcg.end_node(3), 3, true).unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "G\ng\n$\n");
    }

    #[test]
    fn test_packed_writer_records() {
        let mut buf = Vec::new();
        {
            let mut w = PackedEdgeWriter::<u64, _>::new(&mut buf, 3);
            let acg = acg();
            w.visit(EdgeTag::Standard, acg, 3, true).unwrap();
            w.visit(EdgeTag::OutDummy, acg.end_node(3), 3, false).unwrap();
        }
        // G = code 2 -> symbol 3, first bit set.
        assert_eq!(buf[0], 0b0000_1011);
        // Sentinel symbol 0, no flags.
        assert_eq!(buf[1], 0b0000_0000);
    }
}
