use serde::Serialize;

use crate::data_structs::coords::GenomicLocation;
use crate::data_structs::feature::GenomicFeature;
use crate::getter_fn;

/// Result of resolving one location against a gene model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneAnnotation {
    location:      GenomicLocation,
    within_genes:  Vec<GenomicFeature>,
    closest_genes: Vec<GenomicFeature>,
}

impl GeneAnnotation {
    getter_fn!(location, GenomicLocation);

    getter_fn!(within_genes, Vec<GenomicFeature>);

    getter_fn!(closest_genes, Vec<GenomicFeature>);

    pub fn new(
        location: GenomicLocation,
        within_genes: Vec<GenomicFeature>,
        closest_genes: Vec<GenomicFeature>,
    ) -> Self {
        Self {
            location,
            within_genes,
            closest_genes,
        }
    }

    /// Whether the location overlaps no gene or promoter.
    pub fn is_intergenic(&self) -> bool {
        self.within_genes.is_empty()
    }
}
