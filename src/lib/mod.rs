#![deny(unsafe_code)]
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

//! # seqpool - ordered parallel sequence-processing toolkit
//!
//! The heart of this library is [`pool`]: a fixed pool of worker threads
//! that executes a caller-supplied function on submitted jobs and delivers
//! results back in exact submission order, however the workers interleave.
//! Everything else is the sequential toolkit around it:
//!
//! - **[`fastx`]** - FASTA/FASTQ reading with format auto-detection
//! - **[`rpn`]** - a compiled reverse-Polish calculator
//! - **[`errors`]** - typed errors shared across the library
//! - **[`logging`]** / **[`progress`]** - formatted log output and
//!   interval-based progress tracking
//! - **[`validation`]** - input validation with consistent messages
//!
//! Alphabets and k-mer encoding live in the companion `seqpool-dna` crate.
//!
//! ## Quick start
//!
//! ```
//! use seqpool_lib::pool::OrderedPool;
//!
//! # fn main() -> seqpool_lib::errors::Result<()> {
//! let mut pool = OrderedPool::new(2, |_worker, text: &mut String| {
//!     *text = text.to_uppercase();
//! })?;
//! pool.start()?;
//! pool.submit("first".to_string())?;
//! pool.submit("second".to_string())?;
//! pool.close();
//!
//! let mut results = Vec::new();
//! while !pool.is_complete() {
//!     match pool.poll_result() {
//!         Some(text) => results.push(text),
//!         None => std::thread::sleep(std::time::Duration::from_millis(1)),
//!     }
//! }
//! pool.shutdown()?;
//! assert_eq!(results, vec!["FIRST", "SECOND"]);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod fastx;
pub mod logging;
pub mod pool;
pub mod progress;
pub mod rpn;
pub mod validation;

// Re-export the pool types for convenient access
pub use pool::{OrderedPool, PoolStatus};
