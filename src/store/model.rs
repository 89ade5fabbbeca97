use std::ops::Range;

use hashbrown::HashMap;
use itertools::Itertools;
use log::{
    debug,
    warn,
};

use super::{
    FeatureStore,
    OverlapQuery,
    RowIter,
    SearchQuery,
};
use crate::data_structs::coords::{
    ContigIntervalMap,
    GenomicLocation,
};
use crate::data_structs::promoter::{
    is_in_promoter_window,
    tss,
    tss_distance,
};
use crate::data_structs::typedef::{
    IdStr,
    PosType,
};
use crate::data_structs::{
    FeatureRow,
    FeatureType,
    OverlapFlags,
    PromoterWindow,
};
use crate::error::Result;

/// Gene identity shared by every record of a gene.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneInfo {
    pub id:      IdStr,
    pub symbol:  IdStr,
    pub biotype: IdStr,
}

impl GeneInfo {
    pub fn new<S: AsRef<str>>(
        id: S,
        symbol: S,
        biotype: S,
    ) -> Self {
        Self {
            id:      IdStr::from(id.as_ref()),
            symbol:  IdStr::from(symbol.as_ref()),
            biotype: IdStr::from(biotype.as_ref()),
        }
    }
}

/// Exon, CDS or UTR of a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubFeature {
    pub feature_type: FeatureType,
    pub location:     GenomicLocation,
    pub exon_id:      Option<IdStr>,
    pub exon_number:  Option<u32>,
}

impl SubFeature {
    pub fn new(
        feature_type: FeatureType,
        location: GenomicLocation,
    ) -> Self {
        Self {
            feature_type,
            location,
            exon_id: None,
            exon_number: None,
        }
    }

    pub fn with_exon(
        mut self,
        exon_id: Option<IdStr>,
        exon_number: Option<u32>,
    ) -> Self {
        self.exon_id = exon_id;
        self.exon_number = exon_number;
        self
    }
}

#[derive(Debug, Clone)]
struct GeneRecord {
    info:     GeneInfo,
    location: GenomicLocation,
}

#[derive(Debug, Clone)]
struct TranscriptRecord {
    id:           IdStr,
    gene_idx:     usize,
    location:     GenomicLocation,
    is_canonical: bool,
    is_longest:   bool,
    features:     Vec<SubFeature>,
}

#[derive(Debug, Default)]
struct PendingTranscript {
    gene_id:      IdStr,
    location:     Option<GenomicLocation>,
    is_canonical: bool,
    features:     Vec<SubFeature>,
}

struct ResolvedTranscript {
    id:           IdStr,
    gene_id:      IdStr,
    location:     GenomicLocation,
    is_canonical: bool,
    features:     Vec<SubFeature>,
}

/// Collects gene, transcript and feature records in any order and
/// assembles them into a [`GeneModelStore`].
///
/// Genes and transcripts that are only referenced by their children are
/// synthesised from the span of those children.
#[derive(Debug, Default)]
pub struct GeneModelBuilder {
    genes:       HashMap<IdStr, (GeneInfo, Option<GenomicLocation>)>,
    transcripts: HashMap<IdStr, PendingTranscript>,
}

impl GeneModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn note_gene(
        &mut self,
        info: &GeneInfo,
    ) -> &mut (GeneInfo, Option<GenomicLocation>) {
        let entry = self
            .genes
            .entry(info.id.clone())
            .or_insert_with(|| (info.clone(), None));
        if entry.0.symbol.is_empty() {
            entry.0.symbol = info.symbol.clone();
        }
        if entry.0.biotype.is_empty() {
            entry.0.biotype = info.biotype.clone();
        }
        entry
    }

    pub fn add_gene(
        &mut self,
        info: GeneInfo,
        location: GenomicLocation,
    ) -> &mut Self {
        self.note_gene(&info).1 = Some(location);
        self
    }

    pub fn add_transcript(
        &mut self,
        gene: &GeneInfo,
        transcript_id: &str,
        location: GenomicLocation,
        is_canonical: bool,
    ) -> &mut Self {
        self.note_gene(gene);
        let entry = self
            .transcripts
            .entry(IdStr::from(transcript_id))
            .or_default();
        entry.gene_id = gene.id.clone();
        entry.location = Some(location);
        entry.is_canonical |= is_canonical;
        self
    }

    pub fn add_feature(
        &mut self,
        gene: &GeneInfo,
        transcript_id: &str,
        feature: SubFeature,
    ) -> &mut Self {
        self.note_gene(gene);
        let entry = self
            .transcripts
            .entry(IdStr::from(transcript_id))
            .or_default();
        if entry.gene_id.is_empty() {
            entry.gene_id = gene.id.clone();
        }
        entry.features.push(feature);
        self
    }

    /// Flags a transcript as canonical without touching its geometry.
    pub fn mark_canonical(
        &mut self,
        transcript_id: &str,
    ) -> &mut Self {
        self.transcripts
            .entry(IdStr::from(transcript_id))
            .or_default()
            .is_canonical = true;
        self
    }

    fn span_of<'a, I>(locations: I) -> Result<Option<GenomicLocation>>
    where
        I: IntoIterator<Item = &'a GenomicLocation>, {
        let mut iter = locations.into_iter();
        let first = match iter.next() {
            Some(first) => first,
            None => return Ok(None),
        };
        let (start, end) = iter.fold((first.start(), first.end()), |(s, e), l| {
            (s.min(l.start()), e.max(l.end()))
        });
        GenomicLocation::try_new(first.chr(), start, end, first.strand()).map(Some)
    }

    pub fn build(self) -> Result<GeneModelStore> {
        let GeneModelBuilder {
            mut genes,
            transcripts,
        } = self;

        let mut resolved = Vec::with_capacity(transcripts.len());
        for (id, pending) in transcripts {
            let PendingTranscript {
                gene_id,
                location,
                is_canonical,
                features,
            } = pending;
            let location = match location {
                Some(location) => Some(location),
                None => Self::span_of(features.iter().map(|f| &f.location))?,
            };
            match location {
                Some(location) => {
                    resolved.push(ResolvedTranscript {
                        id,
                        gene_id,
                        location,
                        is_canonical,
                        features,
                    })
                },
                None => warn!("Transcript {id} has neither coordinates nor features, skipping"),
            }
        }
        resolved.sort_by(|a, b| a.gene_id.cmp(&b.gene_id).then(a.id.cmp(&b.id)));

        for (gene_id, group) in &resolved.iter().chunk_by(|r| r.gene_id.clone()) {
            let entry = genes.entry(gene_id.clone()).or_insert_with(|| {
                (GeneInfo::new(gene_id.as_str(), gene_id.as_str(), ""), None)
            });
            if entry.1.is_none() {
                entry.1 = Self::span_of(group.map(|r| &r.location))?;
            }
        }

        let mut gene_records = genes
            .into_iter()
            .filter_map(|(_, (info, location))| {
                location.map(|location| GeneRecord { info, location })
            })
            .collect_vec();
        gene_records.sort_by(|a, b| a.info.id.cmp(&b.info.id));
        let gene_idx: HashMap<IdStr, usize> = gene_records
            .iter()
            .enumerate()
            .map(|(i, g)| (g.info.id.clone(), i))
            .collect();

        let mut transcript_records = Vec::with_capacity(resolved.len());
        for transcript in resolved {
            let Some(&gene_idx) = gene_idx.get(&transcript.gene_id) else {
                continue;
            };
            let mut features = transcript.features;
            features.sort_by(|a, b| {
                a.location
                    .start()
                    .cmp(&b.location.start())
                    .then(a.location.end().cmp(&b.location.end()))
                    .then(a.feature_type.cmp(&b.feature_type))
            });
            transcript_records.push(TranscriptRecord {
                id: transcript.id,
                gene_idx,
                location: transcript.location,
                is_canonical: transcript.is_canonical,
                is_longest: false,
                features,
            });
        }

        Ok(GeneModelStore::from_records(gene_records, transcript_records))
    }
}

#[derive(Debug, Clone)]
struct RowContext {
    location: Option<GenomicLocation>,
    window:   PromoterWindow,
}

/// In-memory gene model of one assembly implementing [`FeatureStore`].
#[derive(Debug, Clone)]
pub struct GeneModelStore {
    genes:            Vec<GeneRecord>,
    /// Sorted by `(gene id, transcript id)`.
    transcripts:      Vec<TranscriptRecord>,
    gene_transcripts: Vec<Range<usize>>,
    by_transcript_id: HashMap<IdStr, usize>,
    span_index:       ContigIntervalMap<usize>,
    /// Longest transcripts per chromosome, sorted by TSS.
    tss_index:        HashMap<IdStr, Vec<(PosType, usize)>>,
}

impl GeneModelStore {
    fn from_records(
        genes: Vec<GeneRecord>,
        mut transcripts: Vec<TranscriptRecord>,
    ) -> Self {
        let mut gene_transcripts = vec![0..0; genes.len()];
        let mut start = 0;
        while start < transcripts.len() {
            let gene_idx = transcripts[start].gene_idx;
            let end = start
                + transcripts[start..]
                    .iter()
                    .take_while(|t| t.gene_idx == gene_idx)
                    .count();
            // Transcripts without features emit no rows and never represent
            // a gene while a transcript with features exists.
            let rank = |t: &TranscriptRecord| (!t.features.is_empty(), t.location.length());
            let longest = (start..end)
                .fold(start, |best, i| {
                    if rank(&transcripts[i]) > rank(&transcripts[best]) {
                        i
                    }
                    else {
                        best
                    }
                });
            transcripts[longest].is_longest = true;
            gene_transcripts[gene_idx] = start..end;
            start = end;
        }

        let by_transcript_id = transcripts
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        let span_index = transcripts
            .iter()
            .enumerate()
            .map(|(i, t)| (t.location.clone(), i))
            .collect();
        let mut tss_index: HashMap<IdStr, Vec<(PosType, usize)>> = transcripts
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_longest)
            .map(|(i, t)| (IdStr::from(t.location.chr()), (tss(&t.location), i)))
            .into_group_map()
            .into_iter()
            .collect();
        tss_index
            .values_mut()
            .for_each(|v| v.sort_unstable());

        debug!(
            "Built gene model: {} genes, {} transcripts",
            genes.len(),
            transcripts.len()
        );
        Self {
            genes,
            transcripts,
            gene_transcripts,
            by_transcript_id,
            span_index,
            tss_index,
        }
    }

    pub fn builder() -> GeneModelBuilder {
        GeneModelBuilder::new()
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn n_transcripts(&self) -> usize {
        self.transcripts.len()
    }

    pub fn n_features(&self) -> usize {
        self.transcripts
            .iter()
            .map(|t| t.features.len())
            .sum()
    }

    pub fn chr_names(&self) -> Vec<IdStr> {
        self.span_index.chr_names()
    }

    /// Identifier of the representative transcript of `gene_id`.
    pub fn longest_transcript(
        &self,
        gene_id: &str,
    ) -> Option<&str> {
        let idx = self
            .genes
            .binary_search_by(|g| g.info.id.as_str().cmp(gene_id))
            .ok()?;
        self.transcripts[self.gene_transcripts[idx].clone()]
            .iter()
            .find(|t| t.is_longest)
            .map(|t| t.id.as_str())
    }

    fn passes(
        &self,
        transcript: &TranscriptRecord,
        canonical_only: bool,
        biotype: Option<&str>,
    ) -> bool {
        if canonical_only && !transcript.is_canonical {
            return false;
        }
        match biotype {
            Some(biotype) => {
                self.genes[transcript.gene_idx]
                    .info
                    .biotype
                    .eq_ignore_ascii_case(biotype)
            },
            None => true,
        }
    }

    fn make_row(
        &self,
        transcript: &TranscriptRecord,
        feature: &SubFeature,
        ctx: &RowContext,
    ) -> FeatureRow {
        let gene = &self.genes[transcript.gene_idx];
        let (flags, tss_dist) = match &ctx.location {
            Some(location) => {
                let flags = OverlapFlags::new(
                    is_in_promoter_window(location, &transcript.location, &ctx.window),
                    feature.location.overlaps(location),
                    transcript.location.overlaps(location),
                );
                (flags, tss_distance(location, &transcript.location))
            },
            None => (OverlapFlags::default(), 0),
        };
        FeatureRow {
            chr: IdStr::from(transcript.location.chr()),
            strand: transcript.location.strand(),
            gene_id: gene.info.id.clone(),
            gene_symbol: gene.info.symbol.clone(),
            biotype: gene.info.biotype.clone(),
            gene_start: gene.location.start(),
            gene_end: gene.location.end(),
            transcript_id: transcript.id.clone(),
            transcript_start: transcript.location.start(),
            transcript_end: transcript.location.end(),
            is_canonical: transcript.is_canonical,
            is_longest: transcript.is_longest,
            feature_type: feature.feature_type,
            feature_start: feature.location.start(),
            feature_end: feature.location.end(),
            exon_id: feature.exon_id.clone(),
            exon_number: feature.exon_number,
            flags,
            tss_dist,
        }
    }

    /// Rows of the given transcripts in grouping order. With
    /// `only_overlapping`, features that miss the context location are
    /// skipped.
    fn emit(
        &self,
        mut transcript_idx: Vec<usize>,
        ctx: RowContext,
        only_overlapping: bool,
    ) -> RowIter<'_> {
        transcript_idx.sort_unstable();
        transcript_idx.dedup();
        Box::new(transcript_idx.into_iter().flat_map(move |idx| {
            let transcript = &self.transcripts[idx];
            let filter_ctx = ctx.clone();
            let row_ctx = ctx.clone();
            transcript
                .features
                .iter()
                .filter(move |f| {
                    !only_overlapping
                        || filter_ctx
                            .location
                            .as_ref()
                            .map_or(true, |l| f.location.overlaps(l))
                })
                .map(move |f| -> Result<FeatureRow> { Ok(self.make_row(transcript, f, &row_ctx)) })
        }))
    }

    fn term_matches(
        value: &str,
        term: &str,
        fuzzy: bool,
    ) -> bool {
        let value = value.to_lowercase();
        if fuzzy {
            value.contains(term)
        }
        else {
            value == term
        }
    }
}

impl FeatureStore for GeneModelStore {
    fn overlapping(
        &self,
        location: &GenomicLocation,
        query: &OverlapQuery,
    ) -> Result<RowIter<'_>> {
        let hits = self
            .span_index
            .find_location(location)
            .into_iter()
            .copied()
            .filter(|&i| {
                self.passes(
                    &self.transcripts[i],
                    query.canonical_only,
                    query.biotype.as_deref(),
                )
            })
            .collect_vec();
        let ctx = RowContext {
            location: Some(location.clone()),
            window:   query.window,
        };
        Ok(self.emit(hits, ctx, false))
    }

    fn within_promoter_window(
        &self,
        location: &GenomicLocation,
        window: &PromoterWindow,
    ) -> Result<RowIter<'_>> {
        let offset = window.max_offset();
        let hits = self
            .span_index
            .find(
                location.chr(),
                location.start().saturating_sub(offset),
                location.end().saturating_add(offset),
            )
            .into_iter()
            .copied()
            .filter(|&i| {
                let transcript = &self.transcripts[i].location;
                transcript.overlaps(location)
                    || is_in_promoter_window(location, transcript, window)
            })
            .collect_vec();
        let ctx = RowContext {
            location: Some(location.clone()),
            window:   *window,
        };
        Ok(self.emit(hits, ctx, false))
    }

    fn features_in_exon(
        &self,
        transcript_id: &str,
        location: &GenomicLocation,
    ) -> Result<RowIter<'_>> {
        let hits = self
            .by_transcript_id
            .get(transcript_id)
            .copied()
            .filter(|&i| self.transcripts[i].location.chr() == location.chr())
            .into_iter()
            .collect_vec();
        let ctx = RowContext {
            location: Some(location.clone()),
            window:   PromoterWindow::default(),
        };
        Ok(self.emit(hits, ctx, true))
    }

    fn closest(
        &self,
        location: &GenomicLocation,
        window: &PromoterWindow,
        n: usize,
    ) -> Result<RowIter<'_>> {
        let ctx = RowContext {
            location: Some(location.clone()),
            window:   *window,
        };
        let by_tss = match self.tss_index.get(location.chr()) {
            Some(by_tss) if n > 0 => by_tss,
            _ => return Ok(self.emit(Vec::new(), ctx, false)),
        };

        let mid = location.mid();
        let dist = |i: usize| by_tss[i].0.abs_diff(mid);
        let mut right = by_tss.partition_point(|(t, _)| *t < mid);
        let mut left = right;
        // (|tss distance|, transcript index); expansion continues past n
        // while distances tie so the gene id tie-break sees all of them.
        let mut picked: Vec<(PosType, usize)> = Vec::with_capacity(n);
        loop {
            let next = match (left > 0, right < by_tss.len()) {
                (true, true) if dist(left - 1) <= dist(right) => Some(left - 1),
                (true, true) => Some(right),
                (true, false) => Some(left - 1),
                (false, true) => Some(right),
                (false, false) => None,
            };
            let Some(i) = next else { break };
            let d = dist(i);
            if picked.len() >= n && picked.last().is_some_and(|(last, _)| d > *last) {
                break;
            }
            picked.push((d, by_tss[i].1));
            if i < right {
                left -= 1;
            }
            else {
                right += 1;
            }
        }

        let chosen = picked
            .into_iter()
            .sorted_by(|a, b| {
                a.0.cmp(&b.0).then_with(|| {
                    let gene_a = &self.genes[self.transcripts[a.1].gene_idx].info.id;
                    let gene_b = &self.genes[self.transcripts[b.1].gene_idx].info.id;
                    gene_a.cmp(gene_b)
                })
            })
            .take(n)
            .map(|(_, idx)| idx)
            .collect_vec();
        Ok(self.emit(chosen, ctx, false))
    }

    fn search_by_name(
        &self,
        search: &SearchQuery,
    ) -> Result<RowIter<'_>> {
        let term = search.normalized_term()?;
        let match_transcripts = search.levels.contains(FeatureType::Transcript);

        let mut matched: Vec<(usize, Vec<usize>)> = Vec::new();
        for (gene_idx, gene) in self.genes.iter().enumerate() {
            let gene_hit = Self::term_matches(&gene.info.id, &term, search.fuzzy)
                || Self::term_matches(&gene.info.symbol, &term, search.fuzzy);
            let hits = self.gene_transcripts[gene_idx]
                .clone()
                .filter(|&i| {
                    let transcript = &self.transcripts[i];
                    self.passes(transcript, search.canonical_only, search.biotype.as_deref())
                        && (gene_hit
                            || (match_transcripts
                                && Self::term_matches(&transcript.id, &term, search.fuzzy)))
                })
                .collect_vec();
            if !hits.is_empty() {
                matched.push((gene_idx, hits));
            }
        }

        matched.sort_by(|a, b| {
            self.genes[a.0]
                .location
                .position_cmp(&self.genes[b.0].location)
        });
        let hits = matched
            .into_iter()
            .take(search.limit())
            .flat_map(|(_, hits)| hits)
            .collect_vec();
        let ctx = RowContext {
            location: None,
            window:   PromoterWindow::default(),
        };
        Ok(self.emit(hits, ctx, false))
    }
}
