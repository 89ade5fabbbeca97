use smallstr::SmallString;

pub const SMALLSTR_SIZE: usize = 20;
/// Inline string used for chromosome names and Ensembl-style identifiers.
pub type IdStr = SmallString<[u8; SMALLSTR_SIZE]>;
/// 1-based inclusive genomic coordinate.
pub type PosType = u32;
/// Signed distance between a location and a TSS.
pub type DistType = i64;
