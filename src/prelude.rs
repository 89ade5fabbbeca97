pub use crate::annotate::{
    exon_features,
    overlapping_features,
    search_features,
    within_features,
    AnnotationResolver,
    BatchAnnotator,
    CancelToken,
    ClosestGeneResolver,
    FeatureTreeBuilder,
};
pub use crate::config::{
    parse_window_or_default,
    AnnotateConfig,
    DEFAULT_CLOSEST_N,
    MAX_ANNOTATIONS,
};
pub use crate::data_structs::coords::{
    chrom_rank,
    ContigIntervalMap,
    GenomicLocation,
};
pub use crate::data_structs::typedef::{
    DistType,
    IdStr,
    PosType,
};
pub use crate::data_structs::{
    make_label,
    FeatureLevels,
    FeatureRow,
    FeatureType,
    GeneAnnotation,
    GenomicFeature,
    OverlapFlags,
    PromoterWindow,
    Strand,
};
pub use crate::error::AnnotError;
pub use crate::io::{
    write_annotations_tsv,
    write_features_tsv,
    write_json,
    write_models_tsv,
};
pub use crate::store::{
    load_gtf,
    normalize_assembly,
    read_gtf,
    FeatureStore,
    GeneModelStore,
    ModelInfo,
    OverlapQuery,
    SearchQuery,
    StoreCache,
};
