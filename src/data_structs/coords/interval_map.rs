use hashbrown::HashMap;
use itertools::Itertools;
use rust_lapper::{
    Interval,
    Lapper,
};

use super::GenomicLocation;
use crate::data_structs::typedef::{
    IdStr,
    PosType,
};

/// Per-chromosome interval index over closed `[start, end]` intervals.
///
/// `rust_lapper` works on half-open intervals, so every interval is stored
/// with `stop = end + 1` and queries are widened the same way.
#[derive(Clone, Debug)]
pub struct ContigIntervalMap<V>
where
    V: Sync + Send + Eq + Clone, {
    inner: HashMap<IdStr, Lapper<PosType, V>>,
}

impl<V> Default for ContigIntervalMap<V>
where
    V: Sync + Send + Eq + Clone,
{
    fn default() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }
}

impl<V> FromIterator<(GenomicLocation, V)> for ContigIntervalMap<V>
where
    V: Sync + Send + Eq + Clone,
{
    fn from_iter<T: IntoIterator<Item = (GenomicLocation, V)>>(iter: T) -> Self {
        let multimap = iter
            .into_iter()
            .map(|(loc, v)| (IdStr::from(loc.chr()), (loc, v)))
            .into_group_map();

        let mut inner = HashMap::with_capacity(multimap.len());
        for (chr, kv_pairs) in multimap.into_iter() {
            let imap = Lapper::new(
                kv_pairs
                    .into_iter()
                    .map(|(loc, val)| {
                        Interval {
                            start: loc.start(),
                            stop: loc.end().saturating_add(1),
                            val,
                        }
                    })
                    .collect_vec(),
            );
            inner.insert(chr, imap);
        }

        Self { inner }
    }
}

impl<V> ContigIntervalMap<V>
where
    V: Sync + Send + Eq + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_intervals(&self) -> usize {
        self.inner.values().map(|v| v.len()).sum()
    }

    pub fn n_chr(&self) -> usize {
        self.inner.len()
    }

    pub fn chr_names(&self) -> Vec<IdStr> {
        self.inner.keys().cloned().collect()
    }

    /// Values whose interval overlaps `[start, end]` on `chr` (inclusive).
    pub fn find(
        &self,
        chr: &str,
        start: PosType,
        end: PosType,
    ) -> Vec<&V> {
        self.inner
            .get(chr)
            .map(|imap| {
                imap.find(start, end.saturating_add(1))
                    .map(|e| &e.val)
                    .collect_vec()
            })
            .unwrap_or_default()
    }

    /// Values whose interval overlaps `location`.
    pub fn find_location(
        &self,
        location: &GenomicLocation,
    ) -> Vec<&V> {
        self.find(location.chr(), location.start(), location.end())
    }
}
