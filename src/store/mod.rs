//! Gene model storage.
//!
//! [`FeatureStore`] is the read-only query surface consumed by the
//! annotation engine. Every operation yields [`FeatureRow`]s sorted by
//! `(gene id, transcript id, feature start, feature end)`, which is the
//! order [`FeatureTreeBuilder`](crate::annotate::FeatureTreeBuilder)
//! groups on.
//!
//! [`GeneModelStore`] is the in-memory implementation, usually loaded from
//! a GTF file with [`load_gtf`]; [`StoreCache`] keeps one store per
//! assembly.

mod cache;
mod gtf;
mod model;

pub use cache::{
    normalize_assembly,
    ModelInfo,
    StoreCache,
};
pub use gtf::{
    load_gtf,
    read_gtf,
};
pub use model::{
    GeneInfo,
    GeneModelBuilder,
    GeneModelStore,
    SubFeature,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::coords::GenomicLocation;
use crate::data_structs::{
    FeatureLevels,
    FeatureRow,
    PromoterWindow,
};
use crate::error::{
    AnnotError,
    Result,
};
use crate::with_field_fn;

/// Upper bound on the number of genes a name search returns.
pub const MAX_SEARCH_RESULTS: usize = 100;
/// Shortest accepted search term.
pub const MIN_SEARCH_LEN: usize = 2;

/// Lazily produced, pre-sorted rows.
pub type RowIter<'a> = Box<dyn Iterator<Item = Result<FeatureRow>> + Send + 'a>;

/// Options of an overlap query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapQuery {
    pub levels:         FeatureLevels,
    pub window:         PromoterWindow,
    pub canonical_only: bool,
    pub biotype:        Option<String>,
}

impl Default for OverlapQuery {
    fn default() -> Self {
        Self {
            levels:         FeatureLevels::genes(),
            window:         PromoterWindow::default(),
            canonical_only: false,
            biotype:        None,
        }
    }
}

impl OverlapQuery {
    with_field_fn!(levels, FeatureLevels);

    with_field_fn!(window, PromoterWindow);

    with_field_fn!(canonical_only, bool);

    with_field_fn!(biotype, Option<String>);
}

/// Options of a name search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query:          String,
    pub levels:         FeatureLevels,
    pub fuzzy:          bool,
    pub canonical_only: bool,
    pub biotype:        Option<String>,
    pub n:              usize,
}

impl SearchQuery {
    pub fn new<S: Into<String>>(query: S) -> Self {
        Self {
            query:          query.into(),
            levels:         FeatureLevels::genes(),
            fuzzy:          false,
            canonical_only: false,
            biotype:        None,
            n:              10,
        }
    }

    with_field_fn!(levels, FeatureLevels);

    with_field_fn!(fuzzy, bool);

    with_field_fn!(canonical_only, bool);

    with_field_fn!(biotype, Option<String>);

    with_field_fn!(n, usize);

    /// Lowercased search term, rejecting terms shorter than
    /// [`MIN_SEARCH_LEN`] characters or containing `chr:`.
    pub fn normalized_term(&self) -> Result<String> {
        let term = self.query.trim().to_lowercase();
        if term.chars().count() < MIN_SEARCH_LEN || term.contains("chr:") {
            return Err(AnnotError::InvalidSearch(self.query.clone()));
        }
        Ok(term)
    }

    /// Result limit clamped to `1..=MAX_SEARCH_RESULTS`.
    pub fn limit(&self) -> usize {
        self.n.clamp(1, MAX_SEARCH_RESULTS)
    }
}

/// Primitive geometric and name queries over the gene model of one
/// assembly.
///
/// Implementations are shared read-only between concurrent resolutions.
pub trait FeatureStore: Send + Sync {
    /// Rows of transcripts whose span overlaps `location`.
    fn overlapping(
        &self,
        location: &GenomicLocation,
        query: &OverlapQuery,
    ) -> Result<RowIter<'_>>;

    /// Rows of transcripts whose span or promoter window overlaps
    /// `location`.
    fn within_promoter_window(
        &self,
        location: &GenomicLocation,
        window: &PromoterWindow,
    ) -> Result<RowIter<'_>>;

    /// Exon, CDS and UTR rows of one transcript that overlap `location`.
    fn features_in_exon(
        &self,
        transcript_id: &str,
        location: &GenomicLocation,
    ) -> Result<RowIter<'_>>;

    /// Rows of the (up to) `n` longest transcripts nearest to `location`
    /// by absolute TSS distance.
    fn closest(
        &self,
        location: &GenomicLocation,
        window: &PromoterWindow,
        n: usize,
    ) -> Result<RowIter<'_>>;

    /// Rows of genes or transcripts matching a name or identifier.
    fn search_by_name(
        &self,
        search: &SearchQuery,
    ) -> Result<RowIter<'_>>;
}
