use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, ValueEnum};
use geneannot::prelude::*;
use geneannot::utils::NUM_THREADS_ENV;
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use log::LevelFilter;
use serde::Serialize;

#[derive(Args, Debug, Clone)]
pub(crate) struct UtilsArgs {
    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v info, -vv debug). RUST_LOG is used when omitted."
    )]
    pub verbose:  u8,
    #[arg(
        long,
        required = false,
        default_value_t = false,
        help = "Display progress bar."
    )]
    pub progress: bool,
    #[arg(
        long,
        required = false,
        help = "Number of threads for parallel annotation. Defaults to all cores."
    )]
    pub threads:  Option<usize>,
}

impl UtilsArgs {
    pub fn setup(&self) -> anyhow::Result<()> {
        let mut builder = pretty_env_logger::formatted_builder();
        match self.verbose {
            0 => {
                let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
                builder.parse_filters(&filters);
            },
            1 => {
                builder.filter_level(LevelFilter::Info);
            },
            _ => {
                builder.filter_level(LevelFilter::Debug);
            },
        }
        builder.try_init()?;

        if let Some(threads) = self.threads {
            std::env::set_var(NUM_THREADS_ENV, threads.to_string());
        }
        Ok(())
    }

    pub fn progress_bar(
        &self,
        total: usize,
    ) -> anyhow::Result<ProgressBar> {
        if self.progress {
            init_pbar(total)
        }
        else {
            Ok(ProgressBar::hidden())
        }
    }
}

pub fn init_pbar(total: usize) -> anyhow::Result<ProgressBar> {
    let progress_bar = ProgressBar::new(total as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}, ETA: {eta}] [{bar:40.cyan/blue}] {pos:>5.green}/{len:5} {msg}")?
            .progress_chars("#>-"),
    );
    progress_bar.set_message("Processing...");
    Ok(progress_bar)
}

#[derive(Args, Debug, Clone)]
pub(crate) struct StoreArgs {
    #[arg(
        short = 'd',
        long,
        default_value = ".",
        help = "Directory with gene models named <assembly>.gtf or <assembly>.gtf.gz."
    )]
    pub dir:      PathBuf,
    #[arg(
        short = 'a',
        long,
        default_value = "hg38",
        help = "Genome assembly. hg19, hg38 and mm10 are resolved to their GRC names."
    )]
    pub assembly: String,
}

impl StoreArgs {
    pub fn open(&self) -> anyhow::Result<Arc<GeneModelStore>> {
        StoreCache::new(&self.dir)
            .get(&self.assembly)
            .with_context(|| {
                format!(
                    "Failed to load gene model for {} from {}",
                    self.assembly,
                    self.dir.display()
                )
            })
    }
}

#[derive(Args, Debug, Clone)]
pub(crate) struct LocationArgs {
    #[arg(
        value_parser,
        num_args = 0..,
        help = "Locations in chr:start-end[:strand] form."
    )]
    pub locations: Vec<String>,
    #[arg(
        short = 'i',
        long,
        required = false,
        help = "File with one location per line. Empty lines and lines starting with '#' are skipped."
    )]
    pub input:     Option<PathBuf>,
}

impl LocationArgs {
    pub fn read(&self) -> anyhow::Result<Vec<GenomicLocation>> {
        let mut lines = self.locations.clone();
        if let Some(path) = self.input.as_ref() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            for line in BufReader::new(file).lines() {
                lines.push(line?);
            }
        }
        let locations = lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                line.parse::<GenomicLocation>()
                    .with_context(|| format!("Invalid location '{line}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        if locations.is_empty() {
            anyhow::bail!("No locations given");
        }
        Ok(locations)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum OutputFormat {
    Tsv,
    Json,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct OutputArgs {
    #[arg(
        short = 'o',
        long,
        required = false,
        help = "Output file. Defaults to stdout."
    )]
    pub output: Option<PathBuf>,
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value_t = OutputFormat::Tsv,
        help = "Output format."
    )]
    pub format: OutputFormat,
}

impl OutputArgs {
    pub fn writer(&self) -> anyhow::Result<Box<dyn Write>> {
        let sink: Box<dyn Write> = match self.output.as_ref() {
            Some(path) => {
                Box::new(File::create(path).with_context(|| {
                    format!("Failed to create {}", path.display())
                })?)
            },
            None => Box::new(std::io::stdout().lock()),
        };
        Ok(Box::new(BufWriter::new(sink)))
    }

    /// Writes per-location feature trees. TSV output is one flat table of
    /// every node, JSON keeps the grouping by location.
    pub fn write_groups(
        &self,
        groups: &[LocationFeatures],
    ) -> anyhow::Result<()> {
        let writer = self.writer()?;
        match self.format {
            OutputFormat::Tsv => {
                let roots = groups
                    .iter()
                    .flat_map(|group| group.features.iter().cloned())
                    .collect_vec();
                write_features_tsv(writer, &roots)?
            },
            OutputFormat::Json => write_json(writer, groups)?,
        }
        Ok(())
    }

    pub fn write_features(
        &self,
        features: &[GenomicFeature],
    ) -> anyhow::Result<()> {
        let writer = self.writer()?;
        match self.format {
            OutputFormat::Tsv => write_features_tsv(writer, features)?,
            OutputFormat::Json => write_json(writer, features)?,
        }
        Ok(())
    }

    pub fn write_models(
        &self,
        models: &[ModelInfo],
    ) -> anyhow::Result<()> {
        let writer = self.writer()?;
        match self.format {
            OutputFormat::Tsv => write_models_tsv(writer, models)?,
            OutputFormat::Json => write_json(writer, models)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LocationFeatures {
    pub location: GenomicLocation,
    pub features: Vec<GenomicFeature>,
}
