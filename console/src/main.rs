mod annotate;
mod closest;
mod genomes;
mod overlap;
mod search;
mod utils;

use annotate::AnnotateArgs;
use clap::{Parser, Subcommand};
use closest::ClosestArgs;
use genomes::GenomesArgs;
use overlap::OverlapArgs;
use search::SearchArgs;
use utils::UtilsArgs;
use wild::ArgsOs;

#[derive(Parser, Debug)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,)]
struct Cli {
    #[command(subcommand)]
    command: MainMenu,
}

#[derive(Subcommand, Debug)]
enum MainMenu {
    /// Overlapping genes, promoter/exon/intron labels and closest genes.
    Annotate {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  AnnotateArgs,
    },

    /// Genes, transcripts or features overlapping each location.
    Overlap {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  OverlapArgs,
    },

    /// Nearest genes by TSS distance.
    Closest {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  ClosestArgs,
    },

    /// Find genes by id or symbol.
    Search {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  SearchArgs,
    },

    /// List the gene models available in a directory.
    Genomes {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  GenomesArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let args: ArgsOs = wild::args_os();
    let cli = Cli::parse_from(args);

    match cli.command {
        MainMenu::Annotate { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
        MainMenu::Overlap { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
        MainMenu::Closest { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
        MainMenu::Search { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
        MainMenu::Genomes { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
    }
    Ok(())
}
