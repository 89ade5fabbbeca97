//! Core data structures of the `geneannot` crate.
//!
//! - [`coords`]: [`GenomicLocation`](coords::GenomicLocation), natural
//!   chromosome ordering and a per-chromosome interval index.
//! - Common enumerations, [`Strand`] and [`FeatureType`].
//! - [`FeatureLevels`]: which feature levels a caller wants in a tree.
//! - [`promoter`]: strand-aware promoter windows and TSS distances.
//! - [`OverlapFlags`] and [`make_label`]: the overlap classifier.
//! - [`FeatureRow`], the flat row consumed by the tree builder, and
//!   [`GenomicFeature`], the node it produces.
//! - [`GeneAnnotation`]: the per-location result.
//! - [`typedef`]: aliases for positions, distances and identifiers.

mod annotation;
pub mod coords;
mod enums;
mod feature;
mod label;
mod levels;
pub mod promoter;
pub mod typedef;

pub use annotation::GeneAnnotation;
pub use enums::{
    FeatureType,
    Strand,
};
pub use feature::{
    FeatureRow,
    GenomicFeature,
};
pub use label::{
    make_label,
    OverlapFlags,
};
pub use levels::FeatureLevels;
pub use promoter::PromoterWindow;
