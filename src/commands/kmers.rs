//! Count k-mers across a sequence file on the ordered worker pool.
//!
//! Records stream off the reader thread into the pool; each worker encodes
//! nothing itself - records arrive pre-translated to alphabet codes - and
//! counts the k-mers of its record. Results come back in file order, so the
//! optional per-record report is deterministic no matter how the workers
//! interleave, and the per-record counts are merged into a global table as
//! they arrive.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use itertools::Itertools;
use log::info;
use seqpool_dna::{Alphabet, KmerCodec};
use seqpool_lib::fastx::FastxReader;
use seqpool_lib::logging::{OperationTimer, format_count, format_percent};
use seqpool_lib::pool::OrderedPool;
use seqpool_lib::progress::ProgressTracker;
use seqpool_lib::validation::{validate_at_least_one, validate_file_exists};

use crate::commands::command::Command;

/// Count k-mers in a FASTA/FASTQ file.
#[derive(Debug, Parser)]
#[command(
    name = "kmers",
    about = "Count k-mers in a FASTA/FASTQ file in parallel",
    long_about = r#"
Count k-mers across all records of a FASTA/FASTQ file.

Records are processed by a fixed pool of worker threads; results are merged
in file order, so output is identical run to run regardless of thread count.
Windows containing a wildcard (N for DNA, X for protein) are skipped and
reported as masked.

EXAMPLES:

  # Top 10 8-mers of a FASTA file on 4 threads
  seqpool kmers -i genome.fa

  # 5-mers of a protein FASTQ, one summary line per record
  seqpool kmers -i peptides.fq -k 5 --protein --per-record
"#
)]
pub struct Kmers {
    /// Input FASTA or FASTQ file.
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// K-mer length.
    #[arg(short = 'k', long = "kmer-length", default_value = "8")]
    pub k: usize,

    /// Number of worker threads.
    #[arg(short = 't', long = "threads", default_value = "4")]
    pub threads: usize,

    /// Number of most-frequent k-mers to print.
    #[arg(short = 'n', long = "top", default_value = "10")]
    pub top: usize,

    /// Use the protein alphabet instead of DNA.
    #[arg(long = "protein", default_value = "false")]
    pub protein: bool,

    /// Print one summary line per record, in file order.
    #[arg(long = "per-record", default_value = "false")]
    pub per_record: bool,
}

/// One record's worth of work: codes in, counts out.
struct KmerJob {
    id: String,
    codes: Vec<u8>,
    counts: HashMap<usize, u64>,
    windows: u64,
    masked: u64,
}

/// Running totals merged from per-record results, in submission order.
#[derive(Default)]
struct Totals {
    counts: HashMap<usize, u64>,
    windows: u64,
    masked: u64,
    records: u64,
}

impl Totals {
    fn merge(&mut self, job: KmerJob, per_record: bool) {
        if per_record {
            println!("{}\t{} windows\t{} masked", job.id, job.windows, job.masked);
        }
        for (number, count) in job.counts {
            *self.counts.entry(number).or_insert(0) += count;
        }
        self.windows += job.windows;
        self.masked += job.masked;
        self.records += 1;
    }
}

impl Command for Kmers {
    fn execute(&self, _command_line: &str) -> Result<()> {
        validate_file_exists(&self.input, "Input sequence")?;
        validate_at_least_one("threads", self.threads)?;

        let alphabet = if self.protein { Alphabet::protein() } else { Alphabet::dna() };
        let codec = KmerCodec::new(alphabet.len(), self.k).ok_or_else(|| {
            anyhow!("k-mer space overflows for k={} over {} letters", self.k, alphabet.len())
        })?;

        info!("Input: {}", self.input.display());
        info!("K-mer length: {} ({} possible k-mers)", self.k, format_count(codec.num_kmers() as u64));
        info!("Threads: {}", self.threads);
        info!("Alphabet: {}", if self.protein { "protein" } else { "DNA" });

        let timer = OperationTimer::new("Counting k-mers");
        let tracker = ProgressTracker::new("Processed records").with_interval(10_000);

        let codec = Arc::new(codec);
        let scan_codec = Arc::clone(&codec);
        let mut pool = OrderedPool::new(self.threads, move |_worker_id, job: &mut KmerJob| {
            for number in scan_codec.scan(&job.codes) {
                job.windows += 1;
                match number {
                    Some(number) => *job.counts.entry(number).or_insert(0) += 1,
                    None => job.masked += 1,
                }
            }
        })?;
        pool.start()?;

        let mut totals = Totals::default();
        let reader = FastxReader::from_path(&self.input)?;
        for record in reader {
            let record = record.context("Failed to parse sequence record")?;
            pool.submit(KmerJob {
                id: record.id,
                codes: alphabet.encode(&record.seq),
                counts: HashMap::new(),
                windows: 0,
                masked: 0,
            })?;

            // Merge whatever is already finished while we keep reading.
            while let Some(job) = pool.poll_result() {
                tracker.log_if_needed(1);
                totals.merge(job, self.per_record);
            }
        }
        pool.close();

        while !pool.is_complete() {
            match pool.poll_result() {
                Some(job) => {
                    tracker.log_if_needed(1);
                    totals.merge(job, self.per_record);
                }
                None => thread::sleep(Duration::from_millis(1)),
            }
        }
        pool.shutdown()?;
        tracker.log_final();

        let ranked = totals
            .counts
            .iter()
            .map(|(&number, &count)| (number, count))
            .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
            .take(self.top);
        for (number, count) in ranked {
            let letters = alphabet.decode(&codec.decode(number));
            println!("{}\t{}", String::from_utf8_lossy(&letters), count);
        }

        info!(
            "{} records, {} windows, {} masked ({})",
            format_count(totals.records),
            format_count(totals.windows),
            format_count(totals.masked),
            format_percent(
                if totals.windows > 0 { totals.masked as f64 / totals.windows as f64 } else { 0.0 },
                2
            )
        );
        timer.log_completion(totals.records);
        Ok(())
    }
}
