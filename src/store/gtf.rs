use std::fs::File;
use std::io::{
    BufReader,
    Read,
};
use std::path::Path;
use std::str::FromStr;

use anyhow::anyhow;
use bio::io::gff::{
    GffType,
    Reader,
    Record,
};
use flate2::read::MultiGzDecoder;
use log::{
    debug,
    info,
};

use super::model::{
    GeneInfo,
    GeneModelBuilder,
    GeneModelStore,
    SubFeature,
};
use crate::data_structs::coords::GenomicLocation;
use crate::data_structs::typedef::{
    IdStr,
    PosType,
};
use crate::data_structs::{
    FeatureType,
    Strand,
};
use crate::error::{
    AnnotError,
    Result,
};

/// Transcript tags that mark the canonical isoform of a gene.
const CANONICAL_TAGS: [&str; 2] = ["Ensembl_canonical", "MANE_Select"];
const CANONICAL_TAG_PREFIX: &str = "appris_principal";

/// Drops an Ensembl-style version suffix: `ENSG00000139618.15` becomes
/// `ENSG00000139618`.
fn strip_version(id: &str) -> &str {
    match id.rsplit_once('.') {
        Some((base, version))
            if !base.is_empty()
                && !version.is_empty()
                && version.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        },
        _ => id,
    }
}

fn attribute<'a>(
    record: &'a Record,
    key: &str,
) -> Option<&'a str> {
    record
        .attributes()
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

fn is_canonical(record: &Record) -> bool {
    record
        .attributes()
        .get_vec("tag")
        .map(|tags| {
            tags.iter().any(|tag| {
                CANONICAL_TAGS.contains(&tag.as_str()) || tag.starts_with(CANONICAL_TAG_PREFIX)
            })
        })
        .unwrap_or(false)
}

fn to_pos(
    value: u64,
    record: &Record,
) -> Result<PosType> {
    PosType::try_from(value).map_err(|_| {
        AnnotError::store(anyhow!(
            "coordinate {} on {} does not fit into a 32-bit position",
            value,
            record.seqname()
        ))
    })
}

fn location(record: &Record) -> Result<GenomicLocation> {
    let strand = record
        .strand()
        .map(Strand::from)
        .unwrap_or_default();
    GenomicLocation::try_new(
        record.seqname(),
        to_pos(*record.start(), record)?,
        to_pos(*record.end(), record)?,
        strand,
    )
}

/// Reads a GTF2 stream into a [`GeneModelStore`].
///
/// Only `gene`, `transcript`, `exon`, `CDS` and `UTR` records are used,
/// every other feature type is ignored.
pub fn read_gtf<R: Read>(reader: R) -> Result<GeneModelStore> {
    let mut reader = Reader::new(reader, GffType::GTF2);
    let mut builder = GeneModelBuilder::new();
    let mut n_records = 0usize;

    for record in reader.records() {
        let record = record.map_err(AnnotError::store)?;
        let feature_type = match FeatureType::from_str(record.feature_type()) {
            Ok(feature_type) => feature_type,
            Err(_) => continue,
        };
        let Some(gene_id) = attribute(&record, "gene_id").map(strip_version)
        else {
            debug!(
                "Skipping {} record at {}:{} without gene_id",
                record.feature_type(),
                record.seqname(),
                record.start()
            );
            continue;
        };
        let gene = GeneInfo::new(
            gene_id,
            attribute(&record, "gene_name").unwrap_or(gene_id),
            attribute(&record, "gene_biotype")
                .or_else(|| attribute(&record, "gene_type"))
                .unwrap_or(""),
        );
        let location = location(&record)?;
        n_records += 1;

        if feature_type == FeatureType::Gene {
            builder.add_gene(gene, location);
            continue;
        }

        let Some(transcript_id) = attribute(&record, "transcript_id").map(strip_version)
        else {
            debug!("Skipping {feature_type} record of {gene_id} without transcript_id");
            continue;
        };
        match feature_type {
            FeatureType::Transcript => {
                builder.add_transcript(&gene, transcript_id, location, is_canonical(&record));
            },
            _ => {
                let exon_id = attribute(&record, "exon_id")
                    .map(strip_version)
                    .map(IdStr::from);
                let exon_number =
                    attribute(&record, "exon_number").and_then(|v| v.parse::<u32>().ok());
                builder.add_feature(
                    &gene,
                    transcript_id,
                    SubFeature::new(feature_type, location).with_exon(exon_id, exon_number),
                );
                if is_canonical(&record) {
                    builder.mark_canonical(transcript_id);
                }
            },
        }
    }

    let store = builder.build()?;
    info!(
        "Loaded gene model from {} records: {} genes, {} transcripts, {} features",
        n_records,
        store.n_genes(),
        store.n_transcripts(),
        store.n_features()
    );
    Ok(store)
}

/// Loads a GTF file, gzip-compressed when the name ends with `.gz`.
pub fn load_gtf<P: AsRef<Path>>(path: P) -> Result<GeneModelStore> {
    let path = path.as_ref();
    info!("Reading gene model from {}", path.display());
    let file = BufReader::new(File::open(path)?);
    if path.extension().is_some_and(|ext| ext == "gz") {
        read_gtf(MultiGzDecoder::new(file))
    }
    else {
        read_gtf(file)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    use super::*;
    use crate::store::{
        FeatureStore,
        SearchQuery,
    };

    const GTF: &str = "\
chr1\ttest\tgene\t1000\t2000\t.\t+\t.\tgene_id \"G1.3\"; gene_name \"ALPHA\"; gene_biotype \"protein_coding\";
chr1\ttest\ttranscript\t1000\t2000\t.\t+\t.\tgene_id \"G1.3\"; transcript_id \"T1.1\"; gene_name \"ALPHA\"; tag \"basic\"; tag \"Ensembl_canonical\";
chr1\ttest\texon\t1000\t1100\t.\t+\t.\tgene_id \"G1.3\"; transcript_id \"T1.1\"; exon_number \"1\"; exon_id \"E1.1\";
chr1\ttest\texon\t1400\t1450\t.\t+\t.\tgene_id \"G1.3\"; transcript_id \"T1.1\"; exon_number \"2\"; exon_id \"E2.1\";
chr1\ttest\tCDS\t1400\t1450\t.\t+\t0\tgene_id \"G1.3\"; transcript_id \"T1.1\"; exon_number \"2\";
chr1\ttest\tstart_codon\t1400\t1402\t.\t+\t0\tgene_id \"G1.3\"; transcript_id \"T1.1\";
chr1\ttest\ttranscript\t1200\t1500\t.\t+\t.\tgene_id \"G1.3\"; transcript_id \"T2.1\"; gene_name \"ALPHA\";
chr1\ttest\texon\t1200\t1500\t.\t+\t.\tgene_id \"G1.3\"; transcript_id \"T2.1\"; exon_number \"1\";
chr2\ttest\texon\t500\t600\t.\t-\t.\tgene_id \"G2\"; transcript_id \"T3\"; gene_name \"BETA\"; gene_type \"lncRNA\";
chr2\ttest\texon\t800\t900\t.\t-\t.\tgene_id \"G2\"; transcript_id \"T3\"; gene_name \"BETA\"; gene_type \"lncRNA\";
";

    #[test]
    fn test_strip_version() {
        assert_eq!(strip_version("ENSG00000139618.15"), "ENSG00000139618");
        assert_eq!(strip_version("ENSG00000139618"), "ENSG00000139618");
        assert_eq!(strip_version("gene.a"), "gene.a");
        assert_eq!(strip_version(".1"), ".1");
    }

    #[test]
    fn test_read_gtf_counts() {
        let store = read_gtf(GTF.as_bytes()).unwrap();
        assert_eq!(store.n_genes(), 2);
        assert_eq!(store.n_transcripts(), 3);
        assert_eq!(store.n_features(), 6);
        assert_eq!(store.longest_transcript("G1"), Some("T1"));
        assert_eq!(store.longest_transcript("G2"), Some("T3"));
    }

    #[test]
    fn test_read_gtf_synthesises_parents() {
        let store = read_gtf(GTF.as_bytes()).unwrap();
        let location = GenomicLocation::unstranded("chr2", 850, 850).unwrap();
        let rows = store
            .overlapping(&location, &Default::default())
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        let row = &rows[0];
        assert_eq!(row.gene_id.as_str(), "G2");
        assert_eq!(row.gene_symbol.as_str(), "BETA");
        assert_eq!(row.biotype.as_str(), "lncRNA");
        assert_eq!((row.gene_start, row.gene_end), (500, 900));
        assert_eq!((row.transcript_start, row.transcript_end), (500, 900));
        assert_eq!(row.strand, Strand::Reverse);
        assert!(row.is_longest);
        assert!(!row.is_canonical);
    }

    #[test]
    fn test_read_gtf_canonical_and_exon_ids() {
        let store = read_gtf(GTF.as_bytes()).unwrap();
        let rows = store
            .search_by_name(&SearchQuery::new("alpha"))
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        let t1 = rows
            .iter()
            .filter(|r| r.transcript_id.as_str() == "T1")
            .collect::<Vec<_>>();
        assert_eq!(t1.len(), 3);
        assert!(t1.iter().all(|r| r.is_canonical));
        assert_eq!(t1[0].exon_id.as_deref(), Some("E1"));
        assert_eq!(t1[0].exon_number, Some(1));
        assert!(rows
            .iter()
            .filter(|r| r.transcript_id.as_str() == "T2")
            .all(|r| !r.is_canonical));
    }

    #[test]
    fn test_load_gzipped_gtf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.gtf.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(GTF.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let store = load_gtf(&path).unwrap();
        assert_eq!(store.n_genes(), 2);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_gtf("/nonexistent/model.gtf").unwrap_err();
        assert!(matches!(err, AnnotError::Io(_)));
    }
}
