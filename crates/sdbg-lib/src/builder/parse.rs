//! Sequence input
//!
//! FASTA/FASTQ reading for the table builder, with transparent gzip via
//! needletail. Alphabet checking reuses the 2-bit encoder: a base is
//! accepted exactly when it can be packed, so the reader and the tables can
//! never disagree about what counts as valid input. Violations surface as
//! the crate's typed errors; anyhow context is added only at the
//! file/record boundary.

use super::BuildError;
use crate::encoding::{encode_base, EncodingError};
use anyhow::{Context, Result};
use needletail::parse_fastx_file;
use std::path::Path;
use tracing::debug;

/// Position of the first byte of `seq` the 2-bit encoder rejects, if any.
pub fn first_invalid_base(seq: &[u8]) -> Option<usize> {
    seq.iter().position(|&base| encode_base(base).is_err())
}

/// Validate one record against the packed alphabet.
pub fn check_alphabet(seq: &[u8]) -> Result<(), BuildError> {
    match first_invalid_base(seq) {
        None => Ok(()),
        Some(pos) => Err(EncodingError::InvalidBase(seq[pos]).into()),
    }
}

/// Read every record of a FASTA/FASTQ file into memory, alphabet-checked.
///
/// # Errors
/// Fails if the file cannot be opened or parsed, or if any record contains
/// a base outside {A, C, G, T} (either case). The underlying error is the
/// typed [`BuildError`]; the record id and path are attached as context.
pub fn read_sequences<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<u8>>> {
    let path = path.as_ref();
    let mut reader = parse_fastx_file(path)
        .with_context(|| format!("cannot open sequence input {}", path.display()))?;

    let mut sequences = Vec::new();
    let mut total_bases = 0usize;
    while let Some(record) = reader.next() {
        let record = record.with_context(|| format!("malformed record in {}", path.display()))?;
        let seq = record.seq().into_owned();
        check_alphabet(&seq).with_context(|| {
            format!("record '{}' in {}", String::from_utf8_lossy(record.id()), path.display())
        })?;
        total_bases += seq.len();
        sequences.push(seq);
    }
    debug!("read {} sequences ({} bases)", sequences.len(), total_bases);
    Ok(sequences)
}
