//! FASTA/FASTQ reading and writing.
//!
//! The on-disk format is detected from the first byte of the stream (`>` for
//! FASTA, `@` for FASTQ), so callers never have to declare it. Records are
//! surfaced through a single [`SeqRecord`] type regardless of format; FASTA
//! records simply have no qualities. Record framing is handled by `seq_io`.
//!
//! # Example
//!
//! ```no_run
//! use seqpool_lib::fastx::FastxReader;
//!
//! # fn main() -> anyhow::Result<()> {
//! let reader = FastxReader::from_path("reads.fq")?;
//! for record in reader {
//!     let record = record?;
//!     println!("{}\t{}", record.id, record.seq.len());
//! }
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use seq_io::fasta::{self, Record as _};
use seq_io::fastq::{self, Record as _};

/// The two supported sequence text formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastxFormat {
    /// `>`-headed records, optional multi-line sequence, no qualities.
    Fasta,
    /// `@`-headed four-line records with Phred qualities.
    Fastq,
}

impl FastxFormat {
    /// Detect the format from the first byte of a stream.
    #[must_use]
    pub fn detect(first_byte: u8) -> Option<Self> {
        match first_byte {
            b'>' => Some(Self::Fasta),
            b'@' => Some(Self::Fastq),
            _ => None,
        }
    }
}

/// One sequence record, format-agnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqRecord {
    /// Record identifier: the header up to the first whitespace.
    pub id: String,
    /// The rest of the header line, if any.
    pub description: Option<String>,
    /// Sequence letters, newlines removed.
    pub seq: Vec<u8>,
    /// Phred+33 quality bytes; `None` for FASTA input.
    pub qual: Option<Vec<u8>>,
}

impl SeqRecord {
    /// Sequence length in letters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    /// Whether the sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

/// A reader over either format, yielding [`SeqRecord`]s.
pub enum FastxReader<R: BufRead> {
    /// FASTA-framed input.
    Fasta(fasta::Reader<R>),
    /// FASTQ-framed input.
    Fastq(fastq::Reader<R>),
}

impl FastxReader<BufReader<File>> {
    /// Open a file and detect its format from the first byte.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or starts with neither `>` nor `@`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Self::new(BufReader::new(file))
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

impl<R: BufRead> FastxReader<R> {
    /// Wrap a buffered reader, detecting the format from the first byte.
    ///
    /// An empty stream is treated as FASTA and yields no records.
    ///
    /// # Errors
    ///
    /// Fails if the stream starts with neither `>` nor `@`.
    pub fn new(mut reader: R) -> Result<Self> {
        let first = reader.fill_buf().context("Failed to read stream head")?.first().copied();
        match first {
            None | Some(b'>') => Ok(Self::Fasta(fasta::Reader::new(reader))),
            Some(b'@') => Ok(Self::Fastq(fastq::Reader::new(reader))),
            Some(byte) => {
                bail!("Not FASTA or FASTQ: first byte is {:?}, expected '>' or '@'", byte as char)
            }
        }
    }

    /// The detected format.
    #[must_use]
    pub fn format(&self) -> FastxFormat {
        match self {
            Self::Fasta(_) => FastxFormat::Fasta,
            Self::Fastq(_) => FastxFormat::Fastq,
        }
    }

    /// Read the next record, or `None` at end of input.
    pub fn read_next(&mut self) -> Option<Result<SeqRecord>> {
        match self {
            Self::Fasta(reader) => {
                let record = match reader.next()? {
                    Ok(record) => record,
                    Err(e) => return Some(Err(e.into())),
                };
                let (id, description) = split_head(record.head());
                let seq = record.full_seq().into_owned();
                Some(Ok(SeqRecord { id, description, seq, qual: None }))
            }
            Self::Fastq(reader) => {
                let record = match reader.next()? {
                    Ok(record) => record,
                    Err(e) => return Some(Err(e.into())),
                };
                let (id, description) = split_head(record.head());
                Some(Ok(SeqRecord {
                    id,
                    description,
                    seq: record.seq().to_vec(),
                    qual: Some(record.qual().to_vec()),
                }))
            }
        }
    }
}

impl<R: BufRead> Iterator for FastxReader<R> {
    type Item = Result<SeqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next()
    }
}

/// Split a header line into id and optional description.
fn split_head(head: &[u8]) -> (String, Option<String>) {
    let head = String::from_utf8_lossy(head);
    if let Some((id, desc)) = head.split_once(char::is_whitespace) {
        let desc = desc.trim();
        return (id.to_string(), (!desc.is_empty()).then(|| desc.to_string()));
    }
    (head.into_owned(), None)
}

/// Write one record in FASTA format, wrapping the sequence at `line_length`
/// letters (0 means no wrapping).
///
/// # Errors
///
/// Propagates I/O errors from the writer.
pub fn write_fasta<W: Write>(
    writer: &mut W,
    record: &SeqRecord,
    line_length: usize,
) -> io::Result<()> {
    match &record.description {
        Some(desc) => writeln!(writer, ">{} {}", record.id, desc)?,
        None => writeln!(writer, ">{}", record.id)?,
    }
    let line_length = if line_length == 0 { record.seq.len().max(1) } else { line_length };
    for chunk in record.seq.chunks(line_length) {
        writer.write_all(chunk)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}
