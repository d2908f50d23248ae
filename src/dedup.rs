//! Provides `UniqueDataset` and the `deduplicate` function that builds one.
//!
//! Two strategies, picked by element count:
//! * below `Limits::dedup_threshold`, an `IndexSet` keyed by the canonical
//!   string. Simple and fast, but a hash set costs several words per element.
//! * at or above it, a stable sort of element *indices* followed by a scan for
//!   first occurrences. The extra storage is two flat vectors, no matter how
//!   the identifiers are distributed.
//!
//! Both keep the first occurrence of each identifier, in input order.

use fxhash::FxBuildHasher;
use indexmap::IndexSet;
use log::debug;
use std::io;

use crate::config::Limits;
use crate::error::Result;
use crate::identifier::Identifier;
use crate::normalize::{normalize, Normalized, HEADER};

/// An ordered collection of identifiers with no duplicates. Built by
/// `deduplicate` (or by the generator, whose output is unique by
/// construction) and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UniqueDataset {
    ids: Vec<Identifier>,
}

/// Counts reported alongside a parsed dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    /// Records that passed validation, duplicates included
    pub valid: usize,
    /// Records rejected by validation
    pub invalid: usize,
    /// Records dropped as duplicates
    pub duplicates: usize,
}

impl UniqueDataset {
    /// Run the Normalizer and Deduplicator over `text`.
    pub fn parse(text: &[u8], limits: &Limits) -> Result<(UniqueDataset, ParseStats)> {
        let Normalized { identifiers, invalid, .. } = normalize(text, limits)?;
        let valid = identifiers.len();
        let dataset = deduplicate(identifiers, limits);
        let duplicates = valid - dataset.len();
        Ok((dataset, ParseStats { valid, invalid, duplicates }))
    }

    /// Caller guarantees `ids` holds no duplicates.
    pub(crate) fn from_unique(ids: Vec<Identifier>) -> UniqueDataset {
        UniqueDataset { ids }
    }

    /// Number of identifiers
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True if there are no identifiers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate over the identifiers in order
    pub fn iter(&self) -> std::slice::Iter<'_, Identifier> {
        self.ids.iter()
    }

    /// The identifiers as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[Identifier] {
        &self.ids
    }

    /// Write the dataset as text: an `email` header line, then one identifier
    /// per line, every line terminated by `line_terminator`.
    pub fn write_to(&self, mut out: impl io::Write, line_terminator: &[u8]) -> io::Result<()> {
        out.write_all(HEADER.as_bytes())?;
        out.write_all(line_terminator)?;
        for id in &self.ids {
            out.write_all(id.as_str().as_bytes())?;
            out.write_all(line_terminator)?;
        }
        out.flush()
    }
}

impl<'a> IntoIterator for &'a UniqueDataset {
    type Item = &'a Identifier;
    type IntoIter = std::slice::Iter<'a, Identifier>;
    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

/// Remove duplicates from `identifiers`, keeping the first occurrence of each
/// in its original position relative to the others.
#[must_use]
pub fn deduplicate(identifiers: Vec<Identifier>, limits: &Limits) -> UniqueDataset {
    let ids = if identifiers.len() < limits.dedup_threshold {
        debug!("Deduplicating {} records with a hash set", identifiers.len());
        by_membership(identifiers)
    } else {
        debug!("Deduplicating {} records by sorting", identifiers.len());
        by_sorting(identifiers)
    };
    UniqueDataset { ids }
}

type MembershipSet = IndexSet<Identifier, FxBuildHasher>;

fn by_membership(identifiers: Vec<Identifier>) -> Vec<Identifier> {
    // `IndexSet::insert` leaves an existing key where it was, so iteration
    // order is first-occurrence order.
    let set: MembershipSet = identifiers.into_iter().collect();
    set.into_iter().collect()
}

fn by_sorting(identifiers: Vec<Identifier>) -> Vec<Identifier> {
    let mut order: Vec<usize> = (0..identifiers.len()).collect();
    // Ties broken by position, so the first of each run is the first occurrence
    order.sort_unstable_by(|&i, &j| identifiers[i].cmp(&identifiers[j]).then(i.cmp(&j)));

    let mut keep = vec![false; identifiers.len()];
    let mut previous: Option<usize> = None;
    for &i in &order {
        match previous {
            Some(p) if identifiers[p] == identifiers[i] => {}
            _ => keep[i] = true,
        }
        previous = Some(i);
    }
    drop(order);

    identifiers.into_iter().zip(keep).filter_map(|(id, keep)| keep.then_some(id)).collect()
}

#[allow(clippy::pedantic)]
#[cfg(test)]
mod test {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<Identifier> {
        raw.iter().map(|s| Identifier::parse(s).unwrap()).collect()
    }

    fn strings(dataset: &UniqueDataset) -> Vec<&str> {
        dataset.iter().map(Identifier::as_str).collect()
    }

    const INPUT: &[&str] =
        &["x@a.com", "b@a.com", "X@A.com", "y@a.com", "x@a.com", "b@a.com", "z@a.com"];
    const UNIQ: &[&str] = &["x@a.com", "b@a.com", "y@a.com", "z@a.com"];

    #[test]
    fn both_strategies_keep_first_occurrences_in_order() {
        let small = Limits { dedup_threshold: usize::MAX, ..Limits::default() };
        let large = Limits { dedup_threshold: 0, ..Limits::default() };
        for limits in [small, large] {
            let dataset = deduplicate(ids(INPUT), &limits);
            assert_eq!(strings(&dataset), UNIQ, "threshold {}", limits.dedup_threshold);
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let at = Limits { dedup_threshold: INPUT.len(), ..Limits::default() };
        assert_eq!(strings(&deduplicate(ids(INPUT), &at)), UNIQ);
    }

    #[test]
    fn parse_reports_counts() {
        let text = b"email\nb@a.com\nnope\nB@A.COM\nc@a.com\n";
        let (dataset, stats) = UniqueDataset::parse(text, &Limits::default()).unwrap();
        assert_eq!(strings(&dataset), ["b@a.com", "c@a.com"]);
        assert_eq!(stats, ParseStats { valid: 3, invalid: 1, duplicates: 1 });
    }

    #[test]
    fn write_to_emits_header_and_terminators() {
        let dataset = deduplicate(ids(&["a@b.c", "d@e.f"]), &Limits::default());
        let mut out = Vec::new();
        dataset.write_to(&mut out, b"\r\n").unwrap();
        assert_eq!(out, b"email\r\na@b.c\r\nd@e.f\r\n");
    }

    #[test]
    fn written_text_parses_back_to_the_same_dataset() {
        let dataset = deduplicate(ids(INPUT), &Limits::default());
        let mut out = Vec::new();
        dataset.write_to(&mut out, b"\r\n").unwrap();
        let (again, _) = UniqueDataset::parse(&out, &Limits::default()).unwrap();
        assert_eq!(again, dataset);
    }
}
