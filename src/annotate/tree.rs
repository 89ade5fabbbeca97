use log::debug;

use crate::data_structs::{
    FeatureLevels,
    FeatureRow,
    FeatureType,
    GenomicFeature,
};
use crate::error::Result;
use crate::with_field_fn;

#[derive(Debug)]
struct OpenGene {
    node:      GenomicFeature,
    best_dist: u64,
}

/// Turns a stream of [`FeatureRow`]s into a gene → transcript → feature
/// tree in a single pass.
///
/// Rows must arrive grouped by gene id and then by transcript id. Grouping
/// is run-length based: a gene id that reappears after another gene
/// produces a second gene node, it is never merged into the first one.
///
/// Overlap flags are OR-ed bottom-up while nodes are open. Labels are
/// computed once, when a node is closed.
#[derive(Debug)]
pub struct FeatureTreeBuilder {
    levels:         FeatureLevels,
    canonical_only: bool,
    roots:          Vec<GenomicFeature>,
    gene:           Option<OpenGene>,
    transcript:     Option<GenomicFeature>,
    n_rows:         usize,
}

impl FeatureTreeBuilder {
    pub fn new(levels: FeatureLevels) -> Self {
        Self {
            levels,
            canonical_only: false,
            roots: Vec::new(),
            gene: None,
            transcript: None,
            n_rows: 0,
        }
    }

    with_field_fn!(canonical_only, bool);

    fn close_transcript(&mut self) {
        if let Some(mut transcript) = self.transcript.take() {
            transcript.seal();
            match self.gene.as_mut() {
                Some(gene) => gene.node.push_child(transcript),
                None => self.roots.push(transcript),
            }
        }
    }

    fn close_gene(&mut self) {
        self.close_transcript();
        if let Some(OpenGene { mut node, .. }) = self.gene.take() {
            node.seal();
            self.roots.push(node);
        }
    }

    fn update_gene(
        &mut self,
        row: &FeatureRow,
    ) -> Result<()> {
        let dist = row.tss_dist.unsigned_abs();
        let same = self
            .gene
            .as_ref()
            .is_some_and(|g| g.node.gene_id() == &row.gene_id);
        if !same {
            self.close_gene();
            self.gene = Some(OpenGene {
                node:      GenomicFeature::gene_from_row(row)?,
                best_dist: dist,
            });
            return Ok(());
        }
        if let Some(gene) = self.gene.as_mut() {
            gene.node.merge_flags(row.flags);
            gene.node.merge_representative(row);
            // First row wins on equal distance.
            if dist < gene.best_dist {
                gene.best_dist = dist;
                gene.node.set_tss_dist(row.tss_dist);
            }
        }
        Ok(())
    }

    fn update_transcript(
        &mut self,
        row: &FeatureRow,
        keep: bool,
    ) -> Result<()> {
        let same = self
            .transcript
            .as_ref()
            .is_some_and(|t| t.transcript_id().as_ref() == Some(&row.transcript_id));
        if same {
            if let Some(transcript) = self.transcript.as_mut() {
                transcript.merge_flags(row.flags);
                transcript.merge_representative(row);
            }
            return Ok(());
        }
        self.close_transcript();
        if keep {
            self.transcript = Some(GenomicFeature::transcript_from_row(row)?);
        }
        Ok(())
    }

    fn attach_feature(
        &mut self,
        row: &FeatureRow,
    ) -> Result<()> {
        let mut feature = GenomicFeature::feature_from_row(row)?;
        feature.seal();
        if let Some(transcript) = self.transcript.as_mut() {
            transcript.push_child(feature);
        }
        else if let Some(gene) = self.gene.as_mut() {
            gene.node.push_child(feature);
        }
        else {
            self.roots.push(feature);
        }
        Ok(())
    }

    /// Consumes one row.
    pub fn push(
        &mut self,
        row: &FeatureRow,
    ) -> Result<()> {
        row.validate()?;
        self.n_rows += 1;
        let keep = !self.canonical_only || row.is_canonical;

        if self.levels.contains(FeatureType::Gene) {
            self.update_gene(row)?;
        }
        if self.levels.contains(FeatureType::Transcript) {
            self.update_transcript(row, keep)?;
        }
        if keep && row.feature_type.is_sub_feature() && self.levels.contains(row.feature_type)
        {
            self.attach_feature(row)?;
        }
        Ok(())
    }

    /// Closes all open nodes and returns the roots.
    pub fn finish(mut self) -> Vec<GenomicFeature> {
        self.close_gene();
        debug!(
            "Built {} root features from {} rows",
            self.roots.len(),
            self.n_rows
        );
        self.roots
    }

    /// Consumes a whole row stream. The first error aborts the build and no
    /// partial tree is returned.
    pub fn build<I>(
        mut self,
        rows: I,
    ) -> Result<Vec<GenomicFeature>>
    where
        I: IntoIterator<Item = Result<FeatureRow>>, {
        for row in rows {
            self.push(&row?)?;
        }
        Ok(self.finish())
    }
}
