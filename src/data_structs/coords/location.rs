use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::enums::Strand;
use crate::data_structs::typedef::{
    IdStr,
    PosType,
};
use crate::error::{
    AnnotError,
    Result,
};

/// A closed genomic interval `[start, end]` on one chromosome with an
/// optional strand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawLocation")]
pub struct GenomicLocation {
    chr:    IdStr,
    start:  PosType,
    end:    PosType,
    strand: Strand,
}

#[derive(Deserialize)]
struct RawLocation {
    chr:    String,
    start:  PosType,
    end:    PosType,
    #[serde(default)]
    strand: Strand,
}

impl TryFrom<RawLocation> for GenomicLocation {
    type Error = AnnotError;

    fn try_from(value: RawLocation) -> Result<Self> {
        GenomicLocation::try_new(value.chr, value.start, value.end, value.strand)
    }
}

impl GenomicLocation {
    /// Creates a new location, rejecting `start > end`.
    pub fn try_new<S: AsRef<str>>(
        chr: S,
        start: PosType,
        end: PosType,
        strand: Strand,
    ) -> Result<Self> {
        if start > end {
            return Err(AnnotError::InvalidLocation {
                chr: chr.as_ref().to_string(),
                start,
                end,
            });
        }
        Ok(Self {
            chr: IdStr::from(chr.as_ref()),
            start,
            end,
            strand,
        })
    }

    /// Creates an unstranded location.
    pub fn unstranded<S: AsRef<str>>(
        chr: S,
        start: PosType,
        end: PosType,
    ) -> Result<Self> {
        Self::try_new(chr, start, end, Strand::None)
    }

    /// Returns the chromosome name.
    pub fn chr(&self) -> &str {
        self.chr.as_str()
    }

    /// Returns the start position.
    pub fn start(&self) -> PosType {
        self.start
    }

    /// Returns the end position.
    pub fn end(&self) -> PosType {
        self.end
    }

    /// Returns the strand.
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Midpoint, rounded down.
    pub fn mid(&self) -> PosType {
        ((self.start as u64 + self.end as u64) / 2) as PosType
    }

    /// Number of bases covered.
    pub fn length(&self) -> PosType {
        self.end - self.start + 1
    }

    /// Inclusive overlap with `[start, end]` on the same chromosome.
    pub fn overlaps_range(
        &self,
        start: PosType,
        end: PosType,
    ) -> bool {
        self.start <= end && self.end >= start
    }

    /// Inclusive overlap test between two locations.
    pub fn overlaps(
        &self,
        other: &Self,
    ) -> bool {
        self.chr == other.chr && self.overlaps_range(other.start, other.end)
    }

    /// Checks if this location is fully contained within another one.
    pub fn is_in(
        &self,
        other: &Self,
    ) -> bool {
        self.chr == other.chr && self.start >= other.start && self.end <= other.end
    }

    /// Sort key ordering chromosomes naturally, then by start and end.
    pub fn position_cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        chrom_rank(self.chr())
            .cmp(&chrom_rank(other.chr()))
            .then(self.start.cmp(&other.start))
            .then(self.end.cmp(&other.end))
    }
}

/// Natural chromosome order: `chr1..chr22`, `chrX`, `chrY`, `chrM`, then
/// any other contig name lexicographically.
pub fn chrom_rank(chr: &str) -> (u32, &str) {
    let bare = chr.strip_prefix("chr").unwrap_or(chr);
    match bare {
        "X" | "x" => (1001, ""),
        "Y" | "y" => (1002, ""),
        "M" | "MT" | "m" | "mt" => (1003, ""),
        _ => {
            match bare.parse::<u32>() {
                Ok(n) if n < 1000 => (n, ""),
                _ => (u32::MAX, chr),
            }
        },
    }
}

fn parse_pos(value: &str) -> Result<PosType> {
    value
        .trim()
        .replace(',', "")
        .parse::<PosType>()
        .map_err(|_| AnnotError::parse("position", value))
}

impl FromStr for GenomicLocation {
    type Err = AnnotError;

    /// Parses `chr1:100-200` or `chr1:100-200:+`. Thousands separators are
    /// accepted in the coordinates.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut parts = s.split(':');
        let chr = parts
            .next()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AnnotError::parse("location", s))?;
        let range = parts
            .next()
            .ok_or_else(|| AnnotError::parse("location", s))?;
        let strand = match parts.next() {
            Some(strand) => Strand::from_str(strand).unwrap_or_default(),
            None => Strand::None,
        };
        if parts.next().is_some() {
            return Err(AnnotError::parse("location", s));
        }

        let (start, end) = match range.split_once('-') {
            Some((start, end)) => (parse_pos(start)?, parse_pos(end)?),
            None => {
                let pos = parse_pos(range)?;
                (pos, pos)
            },
        };

        GenomicLocation::try_new(chr, start, end, strand)
    }
}

impl Display for GenomicLocation {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.chr, self.start, self.end)
    }
}
