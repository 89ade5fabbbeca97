//! Genomic coordinates.
//!
//! - [`GenomicLocation`]: a closed interval on one chromosome with an
//!   optional strand. This is the query type of every annotation call.
//! - [`ContigIntervalMap`]: a per-chromosome interval index used by the
//!   in-memory feature store.
//! - [`chrom_rank`]: natural chromosome ordering for position-sorted output.

mod interval_map;
mod location;

pub use interval_map::ContigIntervalMap;
pub use location::{
    chrom_rank,
    GenomicLocation,
};

#[cfg(test)]
mod tests;
