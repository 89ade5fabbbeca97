//! Output formats: the tab-separated annotation table, flat feature
//! tables, the gene model listing and JSON.

mod export;

pub use export::{
    annotation_header,
    annotation_record,
    flatten_features,
    write_annotations_tsv,
    write_features_tsv,
    write_json,
    write_models_tsv,
    FeatureRecord,
};
