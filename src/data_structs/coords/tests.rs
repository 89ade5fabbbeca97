use std::cmp::Ordering;
use std::str::FromStr;

use super::*;
use crate::data_structs::enums::Strand;
use crate::error::AnnotError;

// --- GenomicLocation Tests ---

#[test]
fn test_location_rejects_start_after_end() {
    let res = GenomicLocation::try_new("chr1", 200, 100, Strand::None);
    assert!(matches!(
        res,
        Err(AnnotError::InvalidLocation {
            start: 200,
            end: 100,
            ..
        })
    ));
}

#[test]
fn test_location_mid_floors() {
    let loc = GenomicLocation::unstranded("chr1", 100, 201).unwrap();
    assert_eq!(loc.mid(), 150);
    let point = GenomicLocation::unstranded("chr1", 950, 950).unwrap();
    assert_eq!(point.mid(), 950);
}

#[test]
fn test_location_mid_does_not_overflow() {
    let loc = GenomicLocation::unstranded("chr1", u32::MAX - 1, u32::MAX).unwrap();
    assert_eq!(loc.mid(), u32::MAX - 1);
}

#[test]
fn test_location_length_is_inclusive() {
    let loc = GenomicLocation::unstranded("chr1", 100, 100).unwrap();
    assert_eq!(loc.length(), 1);
}

#[test]
fn test_location_from_str() {
    let loc = GenomicLocation::from_str("chr3:187,721,370-187,733,550").unwrap();
    assert_eq!(loc.chr(), "chr3");
    assert_eq!(loc.start(), 187_721_370);
    assert_eq!(loc.end(), 187_733_550);
    assert_eq!(loc.strand(), Strand::None);

    let stranded = GenomicLocation::from_str("chr1:10-20:-").unwrap();
    assert_eq!(stranded.strand(), Strand::Reverse);

    let point = GenomicLocation::from_str("chrX:500").unwrap();
    assert_eq!((point.start(), point.end()), (500, 500));
}

#[test]
fn test_location_from_str_errors() {
    assert!(GenomicLocation::from_str("chr1").is_err());
    assert!(GenomicLocation::from_str(":1-2").is_err());
    assert!(GenomicLocation::from_str("chr1:a-2").is_err());
    assert!(GenomicLocation::from_str("chr1:1-2:+:x").is_err());
    let err = GenomicLocation::from_str("chr1:20-10").unwrap_err();
    assert!(err.is_client_error());
}

#[test]
fn test_location_display_round_trip() {
    let loc = GenomicLocation::unstranded("chr2", 5, 10).unwrap();
    assert_eq!(loc.to_string(), "chr2:5-10");
    assert_eq!(GenomicLocation::from_str(&loc.to_string()).unwrap(), loc);
}

#[test]
fn test_location_overlaps_inclusive() {
    let a = GenomicLocation::unstranded("chr1", 100, 200).unwrap();
    let b = GenomicLocation::unstranded("chr1", 200, 300).unwrap();
    let c = GenomicLocation::unstranded("chr1", 201, 300).unwrap();
    let d = GenomicLocation::unstranded("chr2", 100, 200).unwrap();
    assert!(a.overlaps(&b));
    assert!(!a.overlaps(&c));
    assert!(!a.overlaps(&d));
}

#[test]
fn test_location_is_in() {
    let outer = GenomicLocation::unstranded("chr1", 100, 200).unwrap();
    let inner = GenomicLocation::unstranded("chr1", 150, 200).unwrap();
    assert!(inner.is_in(&outer));
    assert!(!outer.is_in(&inner));
}

#[test]
fn test_location_deserialize_validates() {
    let ok: GenomicLocation =
        serde_json::from_str(r#"{"chr":"chr1","start":1,"end":2,"strand":"+"}"#)
            .unwrap();
    assert_eq!(ok.strand(), Strand::Forward);
    let missing_strand: GenomicLocation =
        serde_json::from_str(r#"{"chr":"chr1","start":1,"end":2}"#).unwrap();
    assert_eq!(missing_strand.strand(), Strand::None);
    let bad = serde_json::from_str::<GenomicLocation>(
        r#"{"chr":"chr1","start":5,"end":2}"#,
    );
    assert!(bad.is_err());
}

#[test]
fn test_chrom_rank_natural_order() {
    let mut chrs = vec!["chrX", "chr10", "chrM", "chr2", "chrUn_1", "chr1", "chrY"];
    chrs.sort_by(|a, b| chrom_rank(a).cmp(&chrom_rank(b)));
    assert_eq!(chrs, vec![
        "chr1", "chr2", "chr10", "chrX", "chrY", "chrM", "chrUn_1"
    ]);
}

#[test]
fn test_position_cmp() {
    let a = GenomicLocation::unstranded("chr2", 10, 20).unwrap();
    let b = GenomicLocation::unstranded("chr10", 1, 5).unwrap();
    let c = GenomicLocation::unstranded("chr2", 10, 30).unwrap();
    assert_eq!(a.position_cmp(&b), Ordering::Less);
    assert_eq!(a.position_cmp(&c), Ordering::Less);
    assert_eq!(c.position_cmp(&c), Ordering::Equal);
}

// --- ContigIntervalMap Tests ---

#[test]
fn test_interval_map_find_inclusive_bounds() {
    let map: ContigIntervalMap<usize> = vec![
        (GenomicLocation::unstranded("chr1", 100, 200).unwrap(), 0),
        (GenomicLocation::unstranded("chr1", 300, 400).unwrap(), 1),
        (GenomicLocation::unstranded("chr2", 100, 200).unwrap(), 2),
    ]
    .into_iter()
    .collect();

    assert_eq!(map.n_intervals(), 3);
    assert_eq!(map.n_chr(), 2);
    assert_eq!(map.find("chr1", 200, 200), vec![&0]);
    assert_eq!(map.find("chr1", 201, 299), Vec::<&usize>::new());
    let mut both = map.find("chr1", 150, 300);
    both.sort();
    assert_eq!(both, vec![&0, &1]);
    assert!(map.find("chr3", 1, 1000).is_empty());
}
