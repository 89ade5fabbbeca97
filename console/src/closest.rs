use clap::Args;
use geneannot::prelude::*;

use crate::utils::{LocationArgs, LocationFeatures, OutputArgs, StoreArgs, UtilsArgs};

#[derive(Args, Debug, Clone)]
pub(crate) struct ClosestArgs {
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
        help = "Promoter window used to label the closest genes."
    )]
    promoter:  String,
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_CLOSEST_N,
        help = "Number of closest genes reported per location."
    )]
    closest:   usize,
}

impl ClosestArgs {
    pub fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let locations = self.locations.read()?;
        let store = self.store.open()?;
        let window = parse_window_or_default(&self.promoter);
        let resolver = ClosestGeneResolver::new(self.closest);

        let progress_bar = utils.progress_bar(locations.len())?;
        let mut groups = Vec::with_capacity(locations.len());
        for location in locations {
            let rows = store.closest(&location, &window, self.closest)?;
            let features = resolver.resolve(rows)?;
            groups.push(LocationFeatures { location, features });
            progress_bar.inc(1);
        }
        progress_bar.finish_and_clear();

        self.output.write_groups(&groups)
    }
}
