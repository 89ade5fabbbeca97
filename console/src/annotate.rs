use clap::Args;
use console::style;
use geneannot::prelude::*;

use crate::utils::{LocationArgs, OutputArgs, OutputFormat, StoreArgs, UtilsArgs};

#[derive(Args, Debug, Clone)]
pub(crate) struct AnnotateArgs {
    #[clap(flatten)]
    store:     StoreArgs,
    #[clap(flatten)]
    locations: LocationArgs,
    #[clap(flatten)]
    output:    OutputArgs,

    #[arg(
        short = 'p',
        long,
        default_value = "2000,1000",
        help_heading = "ANNOTATION ARGS",
        help = "Promoter window as upstream,downstream bases around the TSS. \
                Malformed values fall back to 2000,1000."
    )]
    promoter:  String,
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_CLOSEST_N,
        help_heading = "ANNOTATION ARGS",
        help = "Number of closest genes reported per location."
    )]
    closest:   usize,
    #[arg(
        short = 'l',
        long,
        default_value = "gene",
        help_heading = "ANNOTATION ARGS",
        help = "Comma-separated levels of the overlapping genes tree \
                (gene, transcript, exon, cds, utr). Empty string selects all."
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
    #[arg(
        long,
        default_value_t = false,
        help = "Annotate in parallel. Failed locations are reported and skipped \
                instead of aborting the run."
    )]
    parallel:  bool,
}

impl AnnotateArgs {
    fn config(&self) -> AnnotateConfig {
        AnnotateConfig::default()
            .with_window(parse_window_or_default(&self.promoter))
            .with_closest_n(self.closest)
            .with_levels(self.levels)
            .with_canonical_only(self.canonical)
            .with_biotype(self.biotype.clone())
    }

    pub fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let locations = self.locations.read()?;
        let store = self.store.open()?;
        let config = self.config();
        let annotator = BatchAnnotator::new(store.as_ref(), config.clone());

        let progress_bar = utils.progress_bar(locations.len())?;
        let mut annotations = Vec::with_capacity(locations.len());
        for chunk in locations.chunks(config.max_batch) {
            if self.parallel {
                for (location, result) in chunk.iter().zip(annotator.annotate_each(chunk)) {
                    match result {
                        Ok(annotation) => annotations.push(annotation),
                        Err(err) => {
                            eprintln!(
                                "Skipping {}: {}",
                                style(location).yellow(),
                                style(err).red()
                            )
                        },
                    }
                }
            }
            else {
                annotations.extend(annotator.annotate_all(chunk)?);
            }
            progress_bar.inc(chunk.len() as u64);
        }
        progress_bar.finish_and_clear();

        let writer = self.output.writer()?;
        match self.output.format {
            OutputFormat::Tsv => {
                write_annotations_tsv(writer, &annotations, &config.window, config.closest_n)?
            },
            OutputFormat::Json => write_json(writer, &annotations)?,
        }
        Ok(())
    }
}
