use clap::Args;
use geneannot::prelude::*;
use log::info;

use crate::utils::{OutputArgs, StoreArgs, UtilsArgs};

#[derive(Args, Debug, Clone)]
pub(crate) struct SearchArgs {
    #[clap(flatten)]
    store:     StoreArgs,
    #[clap(flatten)]
    output:    OutputArgs,

    #[arg(help = "Gene id, gene symbol or transcript id (at least 2 characters).")]
    query:     String,
    #[arg(
        long,
        default_value_t = false,
        help = "Match substrings instead of whole identifiers."
    )]
    fuzzy:     bool,
    #[arg(
        short = 'n',
        long = "limit",
        default_value_t = 10,
        help = "Maximum number of genes reported (1-100)."
    )]
    n:         usize,
    #[arg(
        short = 'l',
        long,
        default_value = "gene",
        help = "Comma-separated levels of the output tree. Transcript ids are \
                matched when the transcript level is requested."
    )]
    levels:    FeatureLevels,
    #[arg(
        long,
        default_value_t = false,
        help_heading = "FILTER ARGS",
        help = "Report canonical transcripts only."
    )]
    canonical: bool,
    #[arg(
        long,
        required = false,
        help_heading = "FILTER ARGS",
        help = "Keep genes of this biotype only (case-insensitive)."
    )]
    biotype:   Option<String>,
}

impl SearchArgs {
    pub fn run(
        &self,
        _utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let search = SearchQuery::new(self.query.as_str())
            .with_fuzzy(self.fuzzy)
            .with_n(self.n)
            .with_levels(self.levels)
            .with_canonical_only(self.canonical)
            .with_biotype(self.biotype.clone());
        // Reject malformed terms before the gene model is loaded.
        search.normalized_term()?;

        let store = self.store.open()?;
        let features = search_features(store.as_ref(), &search)?;
        info!("Found {} genes matching '{}'", features.len(), self.query);

        self.output.write_features(&features)
    }
}
