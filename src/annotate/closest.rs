use itertools::Itertools;

use super::tree::FeatureTreeBuilder;
use crate::data_structs::{
    FeatureLevels,
    FeatureRow,
    GenomicFeature,
};
use crate::error::Result;

/// Ranks candidate rows into at most `n` gene nodes, nearest TSS first.
///
/// Only rows of each gene's longest transcript are considered. Equal
/// absolute distances are ordered by gene id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosestGeneResolver {
    n: usize,
}

impl ClosestGeneResolver {
    pub fn new(n: usize) -> Self {
        Self { n }
    }

    pub fn resolve<I>(
        &self,
        rows: I,
    ) -> Result<Vec<GenomicFeature>>
    where
        I: IntoIterator<Item = Result<FeatureRow>>, {
        let mut candidates = rows
            .into_iter()
            .filter_ok(|row| row.is_longest)
            .collect::<Result<Vec<_>>>()?;
        candidates.sort_by(|a, b| {
            (&a.gene_id, &a.transcript_id, a.feature_start, a.feature_end).cmp(&(
                &b.gene_id,
                &b.transcript_id,
                b.feature_start,
                b.feature_end,
            ))
        });

        let genes = FeatureTreeBuilder::new(FeatureLevels::genes())
            .build(candidates.into_iter().map(Ok))?;
        Ok(genes
            .into_iter()
            .sorted_by(|a, b| {
                a.tss_dist()
                    .unsigned_abs()
                    .cmp(&b.tss_dist().unsigned_abs())
                    .then_with(|| a.gene_id().cmp(b.gene_id()))
            })
            .unique_by(|g| g.gene_id().clone())
            .take(self.n)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structs::{
        FeatureType,
        Strand,
    };
    use crate::error::AnnotError;

    fn row(
        gene_id: &str,
        tss_dist: i64,
        is_longest: bool,
    ) -> FeatureRow {
        FeatureRow {
            chr: "chr1".into(),
            strand: Strand::Forward,
            gene_id: gene_id.into(),
            gene_symbol: gene_id.into(),
            transcript_id: format!("{gene_id}-T{}", is_longest as u8).as_str().into(),
            gene_start: 100,
            gene_end: 200,
            transcript_start: 100,
            transcript_end: 200,
            feature_type: FeatureType::Exon,
            feature_start: 100,
            feature_end: 150,
            is_longest,
            tss_dist,
            ..Default::default()
        }
    }

    fn ids(genes: &[GenomicFeature]) -> Vec<&str> {
        genes.iter().map(|g| g.gene_id().as_str()).collect()
    }

    #[test]
    fn test_closest_ordering_with_ties() {
        let rows = vec![
            row("G2", 50, true),
            row("G1", -50, true),
            row("G3", 10, true),
            row("G4", 200, true),
        ];
        let genes = ClosestGeneResolver::new(3)
            .resolve(rows.into_iter().map(Ok))
            .unwrap();
        assert_eq!(ids(&genes), vec!["G3", "G1", "G2"]);
        assert_eq!(genes[1].tss_dist(), -50);
    }

    #[test]
    fn test_closest_ignores_non_longest_transcripts() {
        let rows = vec![
            row("G1", 500, true),
            row("G1", 5, false),
            row("G2", 100, true),
        ];
        let genes = ClosestGeneResolver::new(5)
            .resolve(rows.into_iter().map(Ok))
            .unwrap();
        assert_eq!(ids(&genes), vec!["G2", "G1"]);
        assert_eq!(genes[1].tss_dist(), 500);
    }

    #[test]
    fn test_closest_one_node_per_gene() {
        let mut second_exon = row("G1", 30, true);
        second_exon.feature_start = 160;
        second_exon.feature_end = 190;
        let rows = vec![row("G1", 30, true), second_exon, row("G2", 40, true)];
        let genes = ClosestGeneResolver::new(5)
            .resolve(rows.into_iter().map(Ok))
            .unwrap();
        assert_eq!(ids(&genes), vec!["G1", "G2"]);
        assert!(genes.len() <= 5);
    }

    #[test]
    fn test_closest_label_from_own_flags() {
        let mut inside = row("G1", 20, true);
        inside.flags.is_intragenic = true;
        let genes = ClosestGeneResolver::new(1)
            .resolve(vec![Ok(inside), Ok(row("G2", 40, true))])
            .unwrap();
        assert_eq!(genes.len(), 1);
        assert_eq!(genes[0].label(), "intronic,intragenic");
    }

    #[test]
    fn test_closest_propagates_row_errors() {
        let rows = vec![
            Ok(row("G1", 1, true)),
            Err(AnnotError::store(anyhow::anyhow!("broken pipe"))),
        ];
        assert!(ClosestGeneResolver::new(5).resolve(rows).is_err());
    }
}
