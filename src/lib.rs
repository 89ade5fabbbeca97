//! # geneannot
//!
//! `geneannot` resolves genomic intervals against a gene model. For every
//! query location it reports the genes the location falls inside or near,
//! whether it hits a promoter, an exon or an intron, its signed distance to
//! each gene's transcription start site and the nearest genes when nothing
//! overlaps.
//!
//! ## Key Features
//!
//! * **Streaming tree construction**: [`FeatureTreeBuilder`] groups sorted
//!   gene/transcript/feature rows into nested [`GenomicFeature`] trees in a
//!   single pass, aggregating overlap flags bottom-up.
//! * **Strand-aware geometry**: promoter windows and TSS distances follow
//!   one sign convention on both strands (negative is upstream).
//! * **Deterministic ranking**: [`ClosestGeneResolver`] keeps one
//!   representative transcript per gene and breaks distance ties by gene id.
//! * **In-memory gene models**: [`GeneModelStore`] loads GTF files (plain
//!   or gzip) and answers overlap, promoter, nearest-gene and name queries
//!   through the [`FeatureStore`] trait; [`StoreCache`] keeps one model per
//!   assembly.
//! * **Batches**: [`BatchAnnotator`] annotates up to 100 locations either
//!   sequentially (fail-fast) or in parallel with per-location results.
//!
//! Number of threads used for parallel batches can be configured with the
//! `GENEANNOT_NUM_THREADS` environment variable.
//!
//! ## Usage
//!
//! ```no_run
//! use geneannot::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = load_gtf("annotation/grch38.gtf.gz")?;
//!     let location: GenomicLocation = "chr17:43,044,295-43,125,483".parse()?;
//!
//!     let annotation = AnnotationResolver::new(&store).annotate(
//!         &location,
//!         &PromoterWindow::new(2000, 1000),
//!         5,
//!         FeatureLevels::genes(),
//!     )?;
//!     for gene in annotation.within_genes() {
//!         println!("{} {} {}", gene.gene_symbol(), gene.label(), gene.tss_dist());
//!     }
//!     Ok(())
//! }
//! ```

pub mod annotate;
pub mod config;
pub mod data_structs;
pub mod error;
pub mod io;
pub mod prelude;
pub mod store;
pub mod utils;

pub use crate::annotate::{
    AnnotationResolver,
    BatchAnnotator,
    CancelToken,
    ClosestGeneResolver,
    FeatureTreeBuilder,
};
pub use crate::config::AnnotateConfig;
pub use crate::data_structs::coords::GenomicLocation;
pub use crate::data_structs::{
    FeatureLevels,
    FeatureRow,
    FeatureType,
    GeneAnnotation,
    GenomicFeature,
    PromoterWindow,
    Strand,
};
pub use crate::error::{
    AnnotError,
    Result,
};
pub use crate::store::{
    load_gtf,
    FeatureStore,
    GeneModelStore,
    StoreCache,
};
