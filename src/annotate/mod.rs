//! The annotation engine.
//!
//! [`FeatureTreeBuilder`] groups store rows into gene trees,
//! [`ClosestGeneResolver`] ranks nearest genes,
//! [`AnnotationResolver`] combines both for one location and
//! [`BatchAnnotator`] runs it over a list of locations.

mod batch;
mod closest;
mod resolver;
mod tree;

pub use batch::{
    BatchAnnotator,
    CancelToken,
};
pub use closest::ClosestGeneResolver;
pub use resolver::{
    exon_features,
    overlapping_features,
    search_features,
    within_features,
    AnnotationResolver,
};
pub use tree::FeatureTreeBuilder;
