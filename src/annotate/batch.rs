use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::Arc;

use log::{
    info,
    warn,
};
use rayon::prelude::*;

use super::resolver::AnnotationResolver;
use crate::config::AnnotateConfig;
use crate::data_structs::coords::GenomicLocation;
use crate::data_structs::GeneAnnotation;
use crate::error::{
    AnnotError,
    Result,
};
use crate::store::FeatureStore;
use crate::utils::{
    n_threads,
    THREAD_POOL,
};

/// Shared flag a caller sets to abort running resolutions.
///
/// Checked before every location and before every store query.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(AnnotError::Cancelled)` once [`cancel`](Self::cancel) was called.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(AnnotError::Cancelled)
        }
        else {
            Ok(())
        }
    }
}

/// Annotates lists of locations with one configuration.
///
/// Input lists are truncated to `config.max_batch` locations.
pub struct BatchAnnotator<'a, S: FeatureStore + ?Sized> {
    store:  &'a S,
    config: AnnotateConfig,
    cancel: CancelToken,
}

impl<'a, S: FeatureStore + ?Sized> BatchAnnotator<'a, S> {
    pub fn new(
        store: &'a S,
        config: AnnotateConfig,
    ) -> Self {
        Self {
            store,
            config,
            cancel: CancelToken::default(),
        }
    }

    pub fn with_cancel(
        mut self,
        cancel: CancelToken,
    ) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &AnnotateConfig {
        &self.config
    }

    fn resolver(&self) -> AnnotationResolver<'a, S> {
        AnnotationResolver::new(self.store)
            .with_canonical_only(self.config.canonical_only)
            .with_biotype(self.config.biotype.clone())
            .with_cancel(self.cancel.clone())
    }

    fn truncated<'l>(
        &self,
        locations: &'l [GenomicLocation],
    ) -> &'l [GenomicLocation] {
        if locations.len() > self.config.max_batch {
            warn!(
                "Batch of {} locations truncated to {}",
                locations.len(),
                self.config.max_batch
            );
            &locations[..self.config.max_batch]
        }
        else {
            locations
        }
    }

    /// Annotates locations in order. The first failure aborts the batch
    /// and no annotations are returned.
    pub fn annotate_all(
        &self,
        locations: &[GenomicLocation],
    ) -> Result<Vec<GeneAnnotation>> {
        let locations = self.truncated(locations);
        let resolver = self.resolver();
        let annotations = locations
            .iter()
            .map(|location| {
                self.cancel.check()?;
                resolver.annotate_with(location, &self.config)
            })
            .collect::<Result<Vec<_>>>()?;
        info!("Annotated {} locations", annotations.len());
        Ok(annotations)
    }

    /// Annotates locations on the shared thread pool, reporting each
    /// location's outcome separately. Results keep the input order.
    pub fn annotate_each(
        &self,
        locations: &[GenomicLocation],
    ) -> Vec<Result<GeneAnnotation>> {
        let locations = self.truncated(locations);
        let resolver = self.resolver();
        let results: Vec<Result<GeneAnnotation>> = THREAD_POOL.install(|| {
            locations
                .par_iter()
                .map(|location| {
                    self.cancel.check()?;
                    resolver
                        .annotate_with(location, &self.config)
                        .inspect_err(|err| warn!("Failed to annotate {location}: {err}"))
                })
                .collect()
        });
        info!(
            "Annotated {} of {} locations on {} threads",
            results.iter().filter(|r| r.is_ok()).count(),
            results.len(),
            n_threads()
        );
        results
    }
}
