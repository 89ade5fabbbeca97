use std::cmp::Ordering;

use itertools::Itertools;
use log::debug;

use super::batch::CancelToken;
use super::closest::ClosestGeneResolver;
use super::tree::FeatureTreeBuilder;
use crate::config::AnnotateConfig;
use crate::data_structs::coords::GenomicLocation;
use crate::data_structs::{
    FeatureLevels,
    FeatureRow,
    GeneAnnotation,
    GenomicFeature,
    PromoterWindow,
};
use crate::error::Result;
use crate::store::{
    FeatureStore,
    OverlapQuery,
    SearchQuery,
};

/// Case-insensitive biotype match; no biotype keeps every row.
fn has_biotype(
    row: &FeatureRow,
    biotype: Option<&str>,
) -> bool {
    biotype.map_or(true, |biotype| row.biotype.eq_ignore_ascii_case(biotype))
}

/// Resolves single locations against one [`FeatureStore`].
pub struct AnnotationResolver<'a, S: FeatureStore + ?Sized> {
    store:          &'a S,
    canonical_only: bool,
    biotype:        Option<String>,
    cancel:         CancelToken,
}

impl<'a, S: FeatureStore + ?Sized> AnnotationResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            canonical_only: false,
            biotype: None,
            cancel: CancelToken::default(),
        }
    }

    /// Emit only canonical transcripts in `withinGenes`.
    pub fn with_canonical_only(
        mut self,
        canonical_only: bool,
    ) -> Self {
        self.canonical_only = canonical_only;
        self
    }

    /// Keep only genes of this biotype (case-insensitive) in `withinGenes`.
    pub fn with_biotype(
        mut self,
        biotype: Option<String>,
    ) -> Self {
        self.biotype = biotype;
        self
    }

    pub fn with_cancel(
        mut self,
        cancel: CancelToken,
    ) -> Self {
        self.cancel = cancel;
        self
    }

    /// Genes in or near `location` plus its `closest_n` nearest genes.
    ///
    /// `withinGenes` honours `levels`; `closestGenes` is always gene-level.
    /// A store failure aborts the call.
    pub fn annotate(
        &self,
        location: &GenomicLocation,
        window: &PromoterWindow,
        closest_n: usize,
        levels: FeatureLevels,
    ) -> Result<GeneAnnotation> {
        self.cancel.check()?;
        let rows = self
            .store
            .within_promoter_window(location, window)?
            .filter_ok(|row| has_biotype(row, self.biotype.as_deref()));
        let within = FeatureTreeBuilder::new(levels)
            .with_canonical_only(self.canonical_only)
            .build(rows)?;

        self.cancel.check()?;
        let rows = self.store.closest(location, window, closest_n)?;
        let closest = ClosestGeneResolver::new(closest_n).resolve(rows)?;

        debug!(
            "{location}: {} genes within, {} closest",
            within.len(),
            closest.len()
        );
        Ok(GeneAnnotation::new(location.clone(), within, closest))
    }

    /// [`annotate`](Self::annotate) with the settings of `config`.
    pub fn annotate_with(
        &self,
        location: &GenomicLocation,
        config: &AnnotateConfig,
    ) -> Result<GeneAnnotation> {
        self.annotate(location, &config.window, config.closest_n, config.levels)
    }
}

/// Genes, transcripts and features whose transcript span overlaps
/// `location`, as a tree shaped by `query.levels`.
pub fn overlapping_features<S: FeatureStore + ?Sized>(
    store: &S,
    location: &GenomicLocation,
    query: &OverlapQuery,
) -> Result<Vec<GenomicFeature>> {
    let rows = store.overlapping(location, query)?;
    FeatureTreeBuilder::new(query.levels)
        .with_canonical_only(query.canonical_only)
        .build(rows)
}

/// Genes whose transcript span or promoter window (`query.window`)
/// overlaps `location`: the `withinGenes` part of an annotation on its own.
pub fn within_features<S: FeatureStore + ?Sized>(
    store: &S,
    location: &GenomicLocation,
    query: &OverlapQuery,
) -> Result<Vec<GenomicFeature>> {
    let rows = store
        .within_promoter_window(location, &query.window)?
        .filter_ok(|row| has_biotype(row, query.biotype.as_deref()));
    FeatureTreeBuilder::new(query.levels)
        .with_canonical_only(query.canonical_only)
        .build(rows)
}

/// Exon, CDS and UTR nodes of one transcript overlapping `location`.
pub fn exon_features<S: FeatureStore + ?Sized>(
    store: &S,
    transcript_id: &str,
    location: &GenomicLocation,
    levels: FeatureLevels,
) -> Result<Vec<GenomicFeature>> {
    let rows = store.features_in_exon(transcript_id, location)?;
    FeatureTreeBuilder::new(levels).build(rows)
}

fn position_cmp(
    a: &GenomicFeature,
    b: &GenomicFeature,
) -> Ordering {
    a.location().position_cmp(b.location())
}

/// Name search results as a tree, roots ordered by genomic position.
pub fn search_features<S: FeatureStore + ?Sized>(
    store: &S,
    search: &SearchQuery,
) -> Result<Vec<GenomicFeature>> {
    let rows = store.search_by_name(search)?;
    let mut roots = FeatureTreeBuilder::new(search.levels)
        .with_canonical_only(search.canonical_only)
        .build(rows)?;
    roots.sort_by(position_cmp);
    Ok(roots)
}
