use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::coords::GenomicLocation;
use crate::data_structs::enums::{
    FeatureType,
    Strand,
};
use crate::data_structs::label::OverlapFlags;
use crate::data_structs::typedef::{
    DistType,
    IdStr,
    PosType,
};
use crate::error::{
    AnnotError,
    Result,
};
use crate::getter_fn;

/// One (gene, transcript, feature) join row as returned by a
/// [`FeatureStore`](crate::store::FeatureStore).
///
/// Overlap flags and the TSS distance are computed by the store against
/// the query location that produced the row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRow {
    pub chr:              IdStr,
    pub strand:           Strand,
    pub gene_id:          IdStr,
    pub gene_symbol:      IdStr,
    pub biotype:          IdStr,
    pub gene_start:       PosType,
    pub gene_end:         PosType,
    pub transcript_id:    IdStr,
    pub transcript_start: PosType,
    pub transcript_end:   PosType,
    pub is_canonical:     bool,
    pub is_longest:       bool,
    pub feature_type:     FeatureType,
    pub feature_start:    PosType,
    pub feature_end:      PosType,
    pub exon_id:          Option<IdStr>,
    pub exon_number:      Option<u32>,
    pub flags:            OverlapFlags,
    pub tss_dist:         DistType,
}

impl FeatureRow {
    fn location(
        &self,
        feature: &'static str,
        id: &str,
        start: PosType,
        end: PosType,
    ) -> Result<GenomicLocation> {
        if start > end {
            return Err(AnnotError::Construction {
                feature,
                id: id.to_string(),
                start,
                end,
            });
        }
        GenomicLocation::try_new(self.chr.as_str(), start, end, self.strand)
    }

    pub fn gene_location(&self) -> Result<GenomicLocation> {
        self.location("gene", &self.gene_id, self.gene_start, self.gene_end)
    }

    pub fn transcript_location(&self) -> Result<GenomicLocation> {
        self.location(
            "transcript",
            &self.transcript_id,
            self.transcript_start,
            self.transcript_end,
        )
    }

    pub fn feature_location(&self) -> Result<GenomicLocation> {
        self.location(
            self.feature_type.as_str(),
            self.exon_id
                .as_deref()
                .unwrap_or(self.transcript_id.as_str()),
            self.feature_start,
            self.feature_end,
        )
    }

    /// Checks gene, transcript and feature geometry.
    pub fn validate(&self) -> Result<()> {
        self.gene_location()?;
        self.transcript_location()?;
        self.feature_location()?;
        Ok(())
    }

    /// Grouping order expected by the tree builder.
    pub fn sort_key(&self) -> (&str, &str, PosType, PosType, FeatureType) {
        (
            self.gene_id.as_str(),
            self.transcript_id.as_str(),
            self.feature_start,
            self.feature_end,
            self.feature_type,
        )
    }
}

/// A node of a resolved gene model tree.
///
/// Genes own transcripts and transcripts own exon, CDS and UTR features.
/// When a level is not requested its children are attached to the nearest
/// requested ancestor instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenomicFeature {
    id:            IdStr,
    location:      GenomicLocation,
    #[serde(rename = "type")]
    feature_type:  FeatureType,
    gene_id:       IdStr,
    gene_symbol:   IdStr,
    biotype:       IdStr,
    #[serde(skip_serializing_if = "Option::is_none")]
    transcript_id: Option<IdStr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exon_id:       Option<IdStr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exon_number:   Option<u32>,
    tss_dist:      DistType,
    #[serde(skip)]
    flags:         OverlapFlags,
    label:         String,
    is_canonical:  bool,
    is_longest:    bool,
    children:      Vec<GenomicFeature>,
}

impl GenomicFeature {
    getter_fn!(id, IdStr);

    getter_fn!(location, GenomicLocation);

    getter_fn!(gene_id, IdStr);

    getter_fn!(gene_symbol, IdStr);

    getter_fn!(biotype, IdStr);

    getter_fn!(transcript_id, Option<IdStr>);

    getter_fn!(exon_id, Option<IdStr>);

    getter_fn!(exon_number, Option<u32>);

    getter_fn!(flags, OverlapFlags);

    getter_fn!(children, Vec<GenomicFeature>);

    fn blank(
        row: &FeatureRow,
        id: IdStr,
        location: GenomicLocation,
        feature_type: FeatureType,
    ) -> Self {
        Self {
            id,
            location,
            feature_type,
            gene_id: row.gene_id.clone(),
            gene_symbol: row.gene_symbol.clone(),
            biotype: row.biotype.clone(),
            transcript_id: None,
            exon_id: None,
            exon_number: None,
            tss_dist: row.tss_dist,
            flags: row.flags,
            label: String::new(),
            is_canonical: row.is_canonical,
            is_longest: row.is_longest,
            children: Vec::new(),
        }
    }

    /// Gene node seeded from the first row of a gene run.
    pub fn gene_from_row(row: &FeatureRow) -> Result<Self> {
        let location = row.gene_location()?;
        Ok(Self::blank(
            row,
            row.gene_id.clone(),
            location,
            FeatureType::Gene,
        ))
    }

    /// Transcript node seeded from the first row of a transcript run.
    pub fn transcript_from_row(row: &FeatureRow) -> Result<Self> {
        let location = row.transcript_location()?;
        let mut node = Self::blank(
            row,
            row.transcript_id.clone(),
            location,
            FeatureType::Transcript,
        );
        node.transcript_id = Some(row.transcript_id.clone());
        Ok(node)
    }

    /// Exon, CDS or UTR leaf built from a single row.
    pub fn feature_from_row(row: &FeatureRow) -> Result<Self> {
        let location = row.feature_location()?;
        let id = row
            .exon_id
            .clone()
            .unwrap_or_else(|| row.transcript_id.clone());
        let mut node = Self::blank(row, id, location, row.feature_type);
        node.transcript_id = Some(row.transcript_id.clone());
        node.exon_id = row.exon_id.clone();
        node.exon_number = row.exon_number;
        Ok(node)
    }

    pub fn feature_type(&self) -> FeatureType {
        self.feature_type
    }

    /// Signed distance from the query midpoint to this node's TSS.
    pub fn tss_dist(&self) -> DistType {
        self.tss_dist
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_canonical(&self) -> bool {
        self.is_canonical
    }

    pub fn is_longest(&self) -> bool {
        self.is_longest
    }

    /// Strand-suffixed symbol, e.g. `BRCA1:-`.
    pub fn stranded_symbol(&self) -> String {
        format!("{}:{}", self.gene_symbol, self.location.strand())
    }

    pub(crate) fn merge_flags(
        &mut self,
        flags: OverlapFlags,
    ) {
        self.flags |= flags;
    }

    pub(crate) fn merge_representative(
        &mut self,
        row: &FeatureRow,
    ) {
        self.is_canonical |= row.is_canonical;
        self.is_longest |= row.is_longest;
    }

    pub(crate) fn set_tss_dist(
        &mut self,
        tss_dist: DistType,
    ) {
        self.tss_dist = tss_dist;
    }

    pub(crate) fn push_child(
        &mut self,
        child: GenomicFeature,
    ) {
        self.children.push(child);
    }

    /// Fixes the label from the accumulated flags. Called once, when the
    /// builder is done with the node.
    pub(crate) fn seal(&mut self) {
        self.label = self.flags.label();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> FeatureRow {
        FeatureRow {
            chr: "chr1".into(),
            strand: Strand::Forward,
            gene_id: "G1".into(),
            gene_symbol: "GENE1".into(),
            biotype: "protein_coding".into(),
            gene_start: 1000,
            gene_end: 2000,
            transcript_id: "T1".into(),
            transcript_start: 1000,
            transcript_end: 2000,
            is_canonical: true,
            is_longest: true,
            feature_type: FeatureType::Exon,
            feature_start: 1400,
            feature_end: 1450,
            exon_id: Some("E1".into()),
            exon_number: Some(1),
            flags: OverlapFlags::new(false, true, true),
            tss_dist: 420,
        }
    }

    #[test]
    fn test_nodes_from_row() {
        let row = row();
        let gene = GenomicFeature::gene_from_row(&row).unwrap();
        assert_eq!(gene.feature_type(), FeatureType::Gene);
        assert_eq!(gene.id().as_str(), "G1");
        assert!(gene.transcript_id().is_none());

        let exon = GenomicFeature::feature_from_row(&row).unwrap();
        assert_eq!(exon.id().as_str(), "E1");
        assert_eq!(exon.location().start(), 1400);
        assert_eq!(exon.transcript_id().as_deref(), Some("T1"));
        assert_eq!(exon.stranded_symbol(), "GENE1:+");
    }

    #[test]
    fn test_malformed_geometry_is_construction_error() {
        let mut bad = row();
        bad.feature_start = 1500;
        bad.feature_end = 1400;
        let err = GenomicFeature::feature_from_row(&bad).unwrap_err();
        assert!(matches!(err, AnnotError::Construction { feature: "exon", .. }));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_seal_sets_label() {
        let mut gene = GenomicFeature::gene_from_row(&row()).unwrap();
        assert_eq!(gene.label(), "");
        gene.merge_flags(OverlapFlags::new(true, false, false));
        gene.seal();
        assert_eq!(gene.label(), "promoter,exonic,intragenic");
    }

    #[test]
    fn test_json_field_names() {
        let mut exon = GenomicFeature::feature_from_row(&row()).unwrap();
        exon.seal();
        let json = serde_json::to_value(&exon).unwrap();
        assert_eq!(json["type"], "exon");
        assert_eq!(json["geneId"], "G1");
        assert_eq!(json["tssDist"], 420);
        assert_eq!(json["label"], "exonic,intragenic");
        assert_eq!(json["isCanonical"], true);
    }

    #[test]
    fn test_json_carries_label_not_flags() {
        let mut gene = GenomicFeature::gene_from_row(&row()).unwrap();
        gene.merge_flags(OverlapFlags::new(true, false, false));
        gene.seal();
        let json = serde_json::to_value(&gene).unwrap();
        assert_eq!(json["label"], "promoter,exonic,intragenic");
        assert!(json.get("flags").is_none());
        assert!(json.get("transcriptId").is_none());
        assert_eq!(json["children"], serde_json::json!([]));
    }
}
