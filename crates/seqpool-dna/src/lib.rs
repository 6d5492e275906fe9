#![deny(unsafe_code)]

//! Sequence alphabets and numeric k-mer encoding.
//!
//! This crate provides the letter-level building blocks of the toolkit:
//! - Alphabets with letter/code translation, wildcards and DNA complement
//! - Complement and reverse-complement of raw DNA bytes
//! - Radix encoding of k-mers to integers with O(1) rolling updates

pub mod alphabet;
pub mod dna;
pub mod kmer;

// Re-export submodule contents at crate root for convenience
pub use alphabet::Alphabet;
pub use dna::{complement_base, reverse_complement};
pub use kmer::{KmerCodec, KmerScan};
