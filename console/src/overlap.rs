use clap::Args;
use geneannot::prelude::*;

use crate::utils::{LocationArgs, LocationFeatures, OutputArgs, StoreArgs, UtilsArgs};

#[derive(Args, Debug, Clone)]
pub(crate) struct OverlapArgs {
    #[clap(flatten)]
    store:      StoreArgs,
    #[clap(flatten)]
    locations:  LocationArgs,
    #[clap(flatten)]
    output:     OutputArgs,

    #[arg(
        short = 'p',
        long,
        default_value = "2000,1000",
        help = "Promoter window as upstream,downstream bases around the TSS."
    )]
    promoter:   String,
    #[arg(
        short = 'l',
        long,
        default_value = "gene,transcript",
        help = "Comma-separated levels of the output tree \
                (gene, transcript, exon, cds, utr). Empty string selects all."
    )]
    levels:     FeatureLevels,
    #[arg(
        short = 't',
        long,
        required = false,
        help = "Report exon, CDS and UTR features of this transcript instead of \
                overlapping genes."
    )]
    transcript: Option<String>,
    #[arg(
        short = 'w',
        long,
        default_value_t = false,
        conflicts_with = "transcript",
        help = "Also report genes whose promoter window overlaps the location, \
                as in the withinGenes part of annotate."
    )]
    within:     bool,
    #[arg(
        long,
        default_value_t = false,
        help_heading = "FILTER ARGS",
        help = "Report canonical transcripts only."
    )]
    canonical:  bool,
    #[arg(
        long,
        required = false,
        help_heading = "FILTER ARGS",
        help = "Keep genes of this biotype only (case-insensitive)."
    )]
    biotype:    Option<String>,
}

impl OverlapArgs {
    pub fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let locations = self.locations.read()?;
        let store = self.store.open()?;
        let query = OverlapQuery::default()
            .with_levels(self.levels)
            .with_window(parse_window_or_default(&self.promoter))
            .with_canonical_only(self.canonical)
            .with_biotype(self.biotype.clone());

        let progress_bar = utils.progress_bar(locations.len())?;
        let mut groups = Vec::with_capacity(locations.len());
        for location in locations {
            let features = match self.transcript.as_deref() {
                Some(transcript_id) => {
                    exon_features(store.as_ref(), transcript_id, &location, self.levels)?
                },
                None if self.within => within_features(store.as_ref(), &location, &query)?,
                None => overlapping_features(store.as_ref(), &location, &query)?,
            };
            groups.push(LocationFeatures { location, features });
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();

        self.output.write_groups(&groups)
    }
}
