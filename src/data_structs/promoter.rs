//! Strand-aware promoter windows and TSS distances.
//!
//! Distances follow one convention regardless of strand: negative values
//! are upstream of the TSS, positive values downstream of it.

use std::fmt::Display;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::coords::GenomicLocation;
use crate::data_structs::typedef::{
    DistType,
    PosType,
};
use crate::error::AnnotError;

pub const DEFAULT_UPSTREAM: PosType = 2000;
pub const DEFAULT_DOWNSTREAM: PosType = 1000;

/// Offsets around a transcript's TSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PromoterWindow {
    pub upstream:   PosType,
    pub downstream: PosType,
}

impl Default for PromoterWindow {
    fn default() -> Self {
        Self {
            upstream:   DEFAULT_UPSTREAM,
            downstream: DEFAULT_DOWNSTREAM,
        }
    }
}

impl PromoterWindow {
    pub fn new(
        upstream: PosType,
        downstream: PosType,
    ) -> Self {
        Self {
            upstream,
            downstream,
        }
    }

    /// Closed window `[start, end]` for `transcript`. May start below 1 near
    /// the chromosome origin, hence the signed type.
    pub fn span(
        &self,
        transcript: &GenomicLocation,
    ) -> (DistType, DistType) {
        let upstream = self.upstream as DistType;
        let downstream = self.downstream as DistType;
        if transcript.strand().is_reverse() {
            let tss = transcript.end() as DistType;
            (tss - downstream, tss + upstream)
        }
        else {
            let tss = transcript.start() as DistType;
            (tss - upstream, tss + downstream)
        }
    }

    /// Largest offset on either side; used to widen index lookups.
    pub fn max_offset(&self) -> PosType {
        self.upstream.max(self.downstream)
    }

    /// Header fragment used by the TSV exporter, e.g. `prom=-2/+1kb`.
    pub fn kb_label(&self) -> String {
        format!("prom=-{}/+{}kb", self.upstream / 1000, self.downstream / 1000)
    }
}

impl FromStr for PromoterWindow {
    type Err = AnnotError;

    /// Parses `upstream,downstream`, e.g. `2000,1000`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (up, down) = s
            .split_once(',')
            .ok_or_else(|| AnnotError::parse("promoter window", s))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<PosType>()
                .map_err(|_| AnnotError::parse("promoter window", s))
        };
        Ok(Self::new(parse(up)?, parse(down)?))
    }
}

impl Display for PromoterWindow {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{},{}", self.upstream, self.downstream)
    }
}

/// Position of the transcription start site.
pub fn tss(transcript: &GenomicLocation) -> PosType {
    if transcript.strand().is_reverse() {
        transcript.end()
    }
    else {
        transcript.start()
    }
}

/// Inclusive overlap between `location` and the promoter window of
/// `transcript`.
pub fn is_in_promoter_window(
    location: &GenomicLocation,
    transcript: &GenomicLocation,
    window: &PromoterWindow,
) -> bool {
    let (window_start, window_end) = window.span(transcript);
    (location.start() as DistType) <= window_end
        && (location.end() as DistType) >= window_start
}

/// Signed distance from the TSS of `transcript` to the midpoint of
/// `location`.
pub fn tss_distance(
    location: &GenomicLocation,
    transcript: &GenomicLocation,
) -> DistType {
    let mid = location.mid() as DistType;
    if transcript.strand().is_reverse() {
        transcript.end() as DistType - mid
    }
    else {
        mid - transcript.start() as DistType
    }
}
