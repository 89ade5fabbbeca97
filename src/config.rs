use std::str::FromStr;

use log::warn;
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::{
    FeatureLevels,
    PromoterWindow,
};
use crate::store::OverlapQuery;
use crate::with_field_fn;

/// Number of closest genes reported when the caller does not ask for a
/// specific count.
pub const DEFAULT_CLOSEST_N: usize = 5;
/// Largest number of locations a batch annotates.
pub const MAX_ANNOTATIONS: usize = 100;

/// Options shared by every location of an annotation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnnotateConfig {
    pub window:         PromoterWindow,
    pub closest_n:      usize,
    pub levels:         FeatureLevels,
    pub canonical_only: bool,
    pub biotype:        Option<String>,
    pub max_batch:      usize,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            window:         PromoterWindow::default(),
            closest_n:      DEFAULT_CLOSEST_N,
            levels:         FeatureLevels::genes(),
            canonical_only: false,
            biotype:        None,
            max_batch:      MAX_ANNOTATIONS,
        }
    }
}

impl AnnotateConfig {
    with_field_fn!(window, PromoterWindow);

    with_field_fn!(closest_n, usize);

    with_field_fn!(levels, FeatureLevels);

    with_field_fn!(canonical_only, bool);

    with_field_fn!(biotype, Option<String>);

    with_field_fn!(max_batch, usize);

    /// Options for a plain overlap query with the same settings.
    pub fn overlap_query(&self) -> OverlapQuery {
        OverlapQuery::default()
            .with_levels(self.levels)
            .with_window(self.window)
            .with_canonical_only(self.canonical_only)
            .with_biotype(self.biotype.clone())
    }
}

/// Parses an `upstream,downstream` promoter window, falling back to the
/// default window when the text is malformed.
pub fn parse_window_or_default(value: &str) -> PromoterWindow {
    PromoterWindow::from_str(value).unwrap_or_else(|err| {
        warn!("{err}, using default promoter window");
        PromoterWindow::default()
    })
}
