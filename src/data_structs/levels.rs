use std::fmt::Display;
use std::str::FromStr;

use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::enums::FeatureType;
use crate::error::AnnotError;

/// Set of feature levels a caller wants in the output tree, e.g.
/// `gene,transcript,exon`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FeatureLevels {
    gene:       bool,
    transcript: bool,
    exon:       bool,
    cds:        bool,
    utr:        bool,
}

impl FeatureLevels {
    pub const fn all() -> Self {
        Self {
            gene:       true,
            transcript: true,
            exon:       true,
            cds:        true,
            utr:        true,
        }
    }

    pub const fn genes() -> Self {
        Self {
            gene:       true,
            transcript: false,
            exon:       false,
            cds:        false,
            utr:        false,
        }
    }

    pub const fn transcripts() -> Self {
        Self {
            gene:       false,
            transcript: true,
            exon:       false,
            cds:        false,
            utr:        false,
        }
    }

    pub fn with(
        mut self,
        feature_type: FeatureType,
    ) -> Self {
        match feature_type {
            FeatureType::Gene => self.gene = true,
            FeatureType::Transcript => self.transcript = true,
            FeatureType::Exon => self.exon = true,
            FeatureType::Cds => self.cds = true,
            FeatureType::Utr => self.utr = true,
        }
        self
    }

    pub fn contains(
        &self,
        feature_type: FeatureType,
    ) -> bool {
        match feature_type {
            FeatureType::Gene => self.gene,
            FeatureType::Transcript => self.transcript,
            FeatureType::Exon => self.exon,
            FeatureType::Cds => self.cds,
            FeatureType::Utr => self.utr,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.gene || self.transcript || self.exon || self.cds || self.utr)
    }

    /// The coarsest requested level, used to label a result set.
    pub fn top_level(&self) -> Option<FeatureType> {
        FeatureType::ALL
            .into_iter()
            .find(|t| self.contains(*t))
    }
}

impl FromIterator<FeatureType> for FeatureLevels {
    fn from_iter<T: IntoIterator<Item = FeatureType>>(iter: T) -> Self {
        iter.into_iter()
            .fold(FeatureLevels::default(), |acc, t| acc.with(t))
    }
}

impl FromStr for FeatureLevels {
    type Err = AnnotError;

    /// Parses a comma separated list. An empty string selects every level.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(FeatureLevels::all());
        }
        let levels = s
            .split(',')
            .filter(|t| !t.trim().is_empty())
            .map(FeatureType::from_str)
            .collect::<Result<FeatureLevels, _>>()
            .map_err(|_| AnnotError::InvalidLevels(s.to_string()))?;
        Ok(levels)
    }
}

impl Display for FeatureLevels {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let joined = FeatureType::ALL
            .iter()
            .filter(|t| self.contains(**t))
            .map(|t| t.as_str())
            .join(",");
        f.write_str(&joined)
    }
}

impl Serialize for FeatureLevels {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FeatureLevels {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        FeatureLevels::from_str(&s).map_err(serde::de::Error::custom)
    }
}
