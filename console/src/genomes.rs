use std::path::PathBuf;

use clap::Args;
use console::style;
use geneannot::prelude::*;
use log::info;

use crate::utils::{OutputArgs, UtilsArgs};

#[derive(Args, Debug, Clone)]
pub(crate) struct GenomesArgs {
    #[arg(
        short = 'd',
        long,
        default_value = ".",
        help = "Directory with gene models named <assembly>.gtf or <assembly>.gtf.gz."
    )]
    dir:    PathBuf,
    #[clap(flatten)]
    output: OutputArgs,
}

impl GenomesArgs {
    pub fn run(
        &self,
        _utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let models = StoreCache::new(&self.dir).available()?;
        if models.is_empty() {
            eprintln!(
                "No gene models found in {}",
                style(self.dir.display()).yellow()
            );
        }
        info!("Found {} gene models in {}", models.len(), self.dir.display());

        self.output.write_models(&models)
    }
}
