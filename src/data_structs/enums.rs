use std::convert::Infallible;
use std::fmt::Display;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::AnnotError;

#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Default)]
pub enum Strand {
    /// Forward strand.
    Forward,
    /// Reverse strand.
    Reverse,
    /// No strand.
    #[default]
    None,
}

impl Strand {
    /// Reverse-strand transcripts have their TSS at the high coordinate;
    /// everything else is treated as forward.
    pub fn is_reverse(&self) -> bool {
        matches!(self, Strand::Reverse)
    }
}

impl FromStr for Strand {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Ok(Strand::None),
        }
    }
}

impl From<Strand> for Option<bool> {
    fn from(value: Strand) -> Option<bool> {
        match value {
            Strand::Forward => Some(true),
            Strand::Reverse => Some(false),
            Strand::None => None,
        }
    }
}

impl From<Option<bool>> for Strand {
    fn from(value: Option<bool>) -> Strand {
        match value {
            Some(true) => Strand::Forward,
            Some(false) => Strand::Reverse,
            None => Strand::None,
        }
    }
}

impl From<bio_types::strand::Strand> for Strand {
    fn from(value: bio_types::strand::Strand) -> Self {
        match value {
            bio_types::strand::Strand::Forward => Strand::Forward,
            bio_types::strand::Strand::Reverse => Strand::Reverse,
            bio_types::strand::Strand::Unknown => Strand::None,
        }
    }
}

impl From<Strand> for char {
    fn from(value: Strand) -> Self {
        match value {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::None => '.',
        }
    }
}

impl Display for Strand {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

impl Serialize for Strand {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Strand {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        Strand::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Kind of node in a gene model tree.
///
/// Rows coming from a store always describe an exon, CDS or UTR feature;
/// `Gene` and `Transcript` only appear on aggregated nodes.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Default)]
pub enum FeatureType {
    Gene,
    Transcript,
    #[default]
    Exon,
    Cds,
    Utr,
}

impl FeatureType {
    pub const ALL: [FeatureType; 5] = [
        FeatureType::Gene,
        FeatureType::Transcript,
        FeatureType::Exon,
        FeatureType::Cds,
        FeatureType::Utr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Gene => "gene",
            FeatureType::Transcript => "transcript",
            FeatureType::Exon => "exon",
            FeatureType::Cds => "cds",
            FeatureType::Utr => "utr",
        }
    }

    /// Whether this type lives below a transcript.
    pub fn is_sub_feature(&self) -> bool {
        matches!(self, FeatureType::Exon | FeatureType::Cds | FeatureType::Utr)
    }
}

impl FromStr for FeatureType {
    type Err = AnnotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gene" | "genes" => Ok(FeatureType::Gene),
            "transcript" | "transcripts" | "mrna" => Ok(FeatureType::Transcript),
            "exon" | "exons" => Ok(FeatureType::Exon),
            "cds" => Ok(FeatureType::Cds),
            "utr" | "utrs" | "five_prime_utr" | "three_prime_utr" => {
                Ok(FeatureType::Utr)
            },
            _ => Err(AnnotError::parse("feature type", s)),
        }
    }
}

impl Display for FeatureType {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FeatureType {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FeatureType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        FeatureType::from_str(&s).map_err(serde::de::Error::custom)
    }
}
