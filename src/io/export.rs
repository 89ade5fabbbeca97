use std::io::Write;

use itertools::Itertools;
use serde::Serialize;

use crate::data_structs::{
    FeatureType,
    GeneAnnotation,
    GenomicFeature,
    PromoterWindow,
    Strand,
};
use crate::error::Result;
use crate::store::ModelInfo;

/// Column names of the annotation table for `closest_n` closest genes.
pub fn annotation_header(
    window: &PromoterWindow,
    closest_n: usize,
) -> Vec<String> {
    let prom = window.kb_label();
    let mut header = vec![
        "Location".to_string(),
        "Gene Id".to_string(),
        "Gene Symbol".to_string(),
        format!("Relative To Gene ({prom})"),
        "TSS Distance".to_string(),
    ];
    for i in 1..=closest_n {
        header.push(format!("#{i} Closest Id"));
        header.push(format!("#{i} Closest Gene Symbol"));
        header.push(format!("#{i} Relative To Closest Gene ({prom})"));
        header.push(format!("#{i} TSS Closest Distance"));
    }
    header
}

fn join_within<F>(
    within: &[GenomicFeature],
    f: F,
) -> String
where
    F: Fn(&GenomicFeature) -> String, {
    within.iter().map(f).join("|")
}

/// One table row. Within-gene values are joined with `|`; the row is
/// padded or cut to the header width.
pub fn annotation_record(
    annotation: &GeneAnnotation,
    closest_n: usize,
) -> Vec<String> {
    let within = annotation.within_genes();
    let mut record = vec![
        annotation.location().to_string(),
        join_within(within, |g| g.gene_id().to_string()),
        join_within(within, |g| g.gene_symbol().to_string()),
        join_within(within, |g| g.label().to_string()),
        join_within(within, |g| g.tss_dist().to_string()),
    ];
    for gene in annotation.closest_genes().iter().take(closest_n) {
        record.push(gene.gene_id().to_string());
        record.push(gene.stranded_symbol());
        record.push(gene.label().to_string());
        record.push(gene.tss_dist().to_string());
    }
    record.resize(5 + 4 * closest_n, String::new());
    record
}

/// Writes annotations as a tab-separated table.
pub fn write_annotations_tsv<W: Write>(
    writer: W,
    annotations: &[GeneAnnotation],
    window: &PromoterWindow,
    closest_n: usize,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::default()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);
    writer
        .write_record(annotation_header(window, closest_n))
        .map_err(std::io::Error::from)?;
    for annotation in annotations {
        writer
            .write_record(annotation_record(annotation, closest_n))
            .map_err(std::io::Error::from)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the gene models of a directory as a tab-separated table.
pub fn write_models_tsv<W: Write>(
    writer: W,
    models: &[ModelInfo],
) -> Result<()> {
    let mut writer = csv::WriterBuilder::default()
        .delimiter(b'\t')
        .has_headers(true)
        .from_writer(writer);
    for model in models {
        writer
            .serialize(model)
            .map_err(std::io::Error::from)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes any serialisable result as pretty JSON.
pub fn write_json<W: Write, T: Serialize + ?Sized>(
    writer: W,
    value: &T,
) -> Result<()> {
    serde_json::to_writer_pretty(writer, value).map_err(std::io::Error::from)?;
    Ok(())
}

/// Flat view of one tree node, used for overlap and search tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureRecord {
    pub id:            String,
    #[serde(rename = "type")]
    pub feature_type:  FeatureType,
    pub chr:           String,
    pub start:         u32,
    pub end:           u32,
    pub strand:        Strand,
    pub gene_id:       String,
    pub gene_symbol:   String,
    pub biotype:       String,
    pub transcript_id: String,
    pub label:         String,
    pub tss_dist:      i64,
    pub is_canonical:  bool,
    pub is_longest:    bool,
}

impl From<&GenomicFeature> for FeatureRecord {
    fn from(value: &GenomicFeature) -> Self {
        Self {
            id:            value.id().to_string(),
            feature_type:  value.feature_type(),
            chr:           value.location().chr().to_string(),
            start:         value.location().start(),
            end:           value.location().end(),
            strand:        value.location().strand(),
            gene_id:       value.gene_id().to_string(),
            gene_symbol:   value.gene_symbol().to_string(),
            biotype:       value.biotype().to_string(),
            transcript_id: value
                .transcript_id()
                .as_deref()
                .unwrap_or_default()
                .to_string(),
            label:         value.label().to_string(),
            tss_dist:      value.tss_dist(),
            is_canonical:  value.is_canonical(),
            is_longest:    value.is_longest(),
        }
    }
}

/// Depth-first flattening of a feature tree, parents before children.
pub fn flatten_features(roots: &[GenomicFeature]) -> Vec<FeatureRecord> {
    fn walk(
        node: &GenomicFeature,
        out: &mut Vec<FeatureRecord>,
    ) {
        out.push(FeatureRecord::from(node));
        node.children()
            .iter()
            .for_each(|child| walk(child, out));
    }
    let mut out = Vec::new();
    roots.iter().for_each(|root| walk(root, &mut out));
    out
}

/// Writes a feature tree as a flat tab-separated table.
pub fn write_features_tsv<W: Write>(
    writer: W,
    roots: &[GenomicFeature],
) -> Result<()> {
    let mut writer = csv::WriterBuilder::default()
        .delimiter(b'\t')
        .has_headers(true)
        .from_writer(writer);
    for record in flatten_features(roots) {
        writer
            .serialize(record)
            .map_err(std::io::Error::from)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::FeatureTreeBuilder;
    use crate::data_structs::coords::GenomicLocation;
    use crate::data_structs::{
        FeatureLevels,
        FeatureRow,
        OverlapFlags,
    };

    fn gene(
        gene_id: &str,
        strand: Strand,
        flags: OverlapFlags,
        tss_dist: i64,
    ) -> GenomicFeature {
        let row = FeatureRow {
            chr: "chr1".into(),
            strand,
            gene_id: gene_id.into(),
            gene_symbol: format!("{gene_id}sym").as_str().into(),
            gene_start: 100,
            gene_end: 200,
            transcript_id: "T".into(),
            transcript_start: 100,
            transcript_end: 200,
            feature_start: 100,
            feature_end: 120,
            flags,
            tss_dist,
            ..Default::default()
        };
        FeatureTreeBuilder::new(FeatureLevels::genes())
            .build(vec![Ok(row)])
            .unwrap()
            .remove(0)
    }

    fn annotation() -> GeneAnnotation {
        GeneAnnotation::new(
            GenomicLocation::unstranded("chr1", 150, 150).unwrap(),
            vec![
                gene("G1", Strand::Forward, OverlapFlags::new(false, true, true), 50),
                gene("G2", Strand::Reverse, OverlapFlags::new(true, false, false), -5),
            ],
            vec![gene("G2", Strand::Reverse, OverlapFlags::new(true, false, false), -5)],
        )
    }

    #[test]
    fn test_header() {
        let header = annotation_header(&PromoterWindow::new(5000, 2000), 2);
        assert_eq!(header.len(), 13);
        assert_eq!(header[3], "Relative To Gene (prom=-5/+2kb)");
        assert_eq!(header[5], "#1 Closest Id");
        assert_eq!(header[12], "#2 TSS Closest Distance");
    }

    #[test]
    fn test_record_joins_and_pads() {
        let record = annotation_record(&annotation(), 2);
        assert_eq!(record.len(), 13);
        assert_eq!(record[0], "chr1:150-150");
        assert_eq!(record[1], "G1|G2");
        assert_eq!(record[3], "exonic,intragenic|promoter,intergenic");
        assert_eq!(record[4], "50|-5");
        assert_eq!(record[6], "G2sym:-");
        assert!(record[9..].iter().all(String::is_empty));
    }

    #[test]
    fn test_empty_within_genes_have_empty_cells() {
        let annotation = GeneAnnotation::new(
            GenomicLocation::unstranded("chr1", 150, 150).unwrap(),
            vec![],
            vec![],
        );
        let record = annotation_record(&annotation, 1);
        assert_eq!(record.len(), 9);
        assert!(record[1..].iter().all(String::is_empty));
    }

    #[test]
    fn test_write_tsv() {
        let mut out = Vec::new();
        write_annotations_tsv(&mut out, &[annotation()], &PromoterWindow::default(), 1).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Location\tGene Id\tGene Symbol\tRelative To Gene (prom=-2/+1kb)"));
        assert_eq!(lines[1].split('\t').count(), 9);
    }

    #[test]
    fn test_write_json_camel_case() {
        let mut out = Vec::new();
        write_json(&mut out, &annotation()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["withinGenes"][0]["geneSymbol"], "G1sym");
        assert_eq!(value["closestGenes"][0]["tssDist"], -5);
        assert_eq!(value["location"]["chr"], "chr1");
    }

    #[test]
    fn test_write_models_tsv() {
        let models = vec![
            ModelInfo {
                assembly: "dm6".to_string(),
                path:     "models/dm6.gtf.gz".into(),
                loaded:   false,
            },
            ModelInfo {
                assembly: "grch38".to_string(),
                path:     "models/grch38.gtf".into(),
                loaded:   true,
            },
        ];
        let mut out = Vec::new();
        write_models_tsv(&mut out, &models).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines = text.lines().collect_vec();
        assert_eq!(lines, vec![
            "assembly\tpath\tloaded",
            "dm6\tmodels/dm6.gtf.gz\tfalse",
            "grch38\tmodels/grch38.gtf\ttrue",
        ]);
    }

    #[test]
    fn test_flatten_features() {
        let annotation = annotation();
        let records = flatten_features(annotation.within_genes());
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].gene_id, "G2");
        assert_eq!(records[1].strand, Strand::Reverse);
        let mut out = Vec::new();
        write_features_tsv(&mut out, annotation.within_genes()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("id\ttype\tchr\tstart\tend\tstrand"));
    }
}
