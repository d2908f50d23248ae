//! Synthesises two `UniqueDataset`s of requested sizes that share a requested
//! fraction of their identifiers.
//!
//! Two strategies implement `GenerationStrategy`, and one is picked per call:
//! * `Sampled` draws random tokens and rejects collisions with hash sets. The
//!   identifiers look random, but every element carries set overhead.
//! * `Sequential` numbers identifiers within a per-dataset namespace, so they
//!   are unique by construction and only the output vectors are stored.
//!
//! Either way each output is shuffled, so an identifier's position says
//! nothing about whether it is shared.

use fxhash::FxBuildHasher;
use indexmap::IndexSet;
use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng, RngCore};
use serde::Serialize;

use crate::config::Limits;
use crate::dedup::UniqueDataset;
use crate::error::{Error, Result};
use crate::identifier::Identifier;

/// Domain of every generated identifier
pub const DOMAIN: &str = "example.com";

/// What to generate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationRequest {
    /// Size of the first dataset
    pub size_a: usize,
    /// Size of the second dataset
    pub size_b: usize,
    /// Share of the first dataset that should also be in the second, 0 to 100
    pub overlap_percent: f64,
}

impl GenerationRequest {
    /// Check the request against `limits`.
    pub fn validate(&self, limits: &Limits) -> Result<()> {
        if self.size_a == 0 || self.size_b == 0 {
            return Err(Error::invalid_parameters(format!(
                "sizes must be positive (got {} and {})",
                self.size_a, self.size_b
            )));
        }
        let largest = self.size_a.max(self.size_b);
        if largest > limits.max_generated {
            return Err(Error::invalid_parameters(format!(
                "maximum size per file is {}, requested {largest}",
                limits.max_generated
            )));
        }
        if !(0.0..=100.0).contains(&self.overlap_percent) {
            return Err(Error::invalid_parameters(format!(
                "intersection percent must be between 0 and 100 (got {})",
                self.overlap_percent
            )));
        }
        Ok(())
    }

    /// `floor(size_a * overlap_percent / 100)`, before clamping.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn requested_overlap(&self) -> usize {
        (self.size_a as f64 * self.overlap_percent / 100.0).floor() as usize
    }

    /// The number of shared identifiers actually generated: the requested
    /// overlap, clamped so it fits in both datasets.
    #[must_use]
    pub fn overlap_count(&self) -> usize {
        self.requested_overlap().min(self.size_a).min(self.size_b)
    }
}

/// What was generated. `actual_percent` is relative to the smaller dataset and
/// may differ from `requested_percent`; both are always reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStats {
    /// Size of the first dataset
    #[serde(rename = "file1Count")]
    pub count_a: usize,
    /// Size of the second dataset
    #[serde(rename = "file2Count")]
    pub count_b: usize,
    /// Identifiers present in both
    pub common_count: usize,
    /// The overlap percentage asked for
    #[serde(rename = "requestedIntersectionPercent")]
    pub requested_percent: f64,
    /// `common_count / min(count_a, count_b) * 100`
    #[serde(rename = "actualIntersectionPercent")]
    pub actual_percent: f64,
    /// True if the requested overlap didn't fit in the smaller dataset
    pub clamped: bool,
}

/// Two datasets plus the statistics describing them.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// The first dataset
    pub dataset_a: UniqueDataset,
    /// The second dataset
    pub dataset_b: UniqueDataset,
    /// What was achieved
    pub stats: GenerationStats,
}

/// Sizes a strategy must produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    /// Size of the first dataset
    pub size_a: usize,
    /// Size of the second dataset
    pub size_b: usize,
    /// Identifiers to put in both; no larger than either size
    pub common: usize,
}

/// A way of building two datasets to a `Plan`.
pub trait GenerationStrategy {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Returns two shuffled, duplicate-free identifier lists with exactly
    /// `plan.common` identifiers in both.
    fn generate(&self, plan: &Plan, rng: &mut dyn RngCore) -> (Vec<Identifier>, Vec<Identifier>);
}

/// Random tokens, deduplicated with hash sets.
#[derive(Debug, Clone, Copy)]
pub struct Sampled;

/// Numbered identifiers, unique by construction.
#[derive(Debug, Clone, Copy)]
pub struct Sequential;

type TokenSet = IndexSet<Identifier, FxBuildHasher>;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn random_identifier(prefix: &str, token_len: usize, rng: &mut dyn RngCore) -> Identifier {
    let token: String =
        (0..token_len).map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())])).collect();
    Identifier::from_canonical(format!("{prefix}{token}@{DOMAIN}"))
}

impl Sampled {
    // Shared tokens have no underscore, so they can't collide with either
    // dataset's own `userN_` tokens.
    const SHARED_PREFIX: &'static str = "user";
    const SHARED_TOKEN_LEN: usize = 8;
    const OWN_TOKEN_LEN: usize = 10;

    fn fill(
        shared: &TokenSet,
        target: usize,
        prefix: &str,
        rng: &mut dyn RngCore,
    ) -> Vec<Identifier> {
        let mut set = TokenSet::with_capacity_and_hasher(target, FxBuildHasher::default());
        set.extend(shared.iter().cloned());
        while set.len() < target {
            set.insert(random_identifier(prefix, Self::OWN_TOKEN_LEN, rng));
        }
        let mut ids: Vec<Identifier> = set.into_iter().collect();
        ids.shuffle(rng);
        ids
    }
}

impl GenerationStrategy for Sampled {
    fn name(&self) -> &'static str {
        "sampled"
    }

    fn generate(&self, plan: &Plan, rng: &mut dyn RngCore) -> (Vec<Identifier>, Vec<Identifier>) {
        let mut shared = TokenSet::with_capacity_and_hasher(plan.common, FxBuildHasher::default());
        while shared.len() < plan.common {
            shared.insert(random_identifier(Self::SHARED_PREFIX, Self::SHARED_TOKEN_LEN, rng));
        }
        let a = Self::fill(&shared, plan.size_a, "user1_", rng);
        let b = Self::fill(&shared, plan.size_b, "user2_", rng);
        (a, b)
    }
}

impl Sequential {
    fn numbered(prefix: &str, n: usize) -> Identifier {
        Identifier::from_canonical(format!("{prefix}{n}@{DOMAIN}"))
    }
}

impl GenerationStrategy for Sequential {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn generate(&self, plan: &Plan, rng: &mut dyn RngCore) -> (Vec<Identifier>, Vec<Identifier>) {
        let mut a = Vec::with_capacity(plan.size_a);
        let mut b = Vec::with_capacity(plan.size_b);
        for n in 0..plan.common {
            let id = Self::numbered("common", n);
            a.push(id.clone());
            b.push(id);
        }
        // Namespaces `common`, `user1_` and `user2_` are disjoint
        a.extend((plan.common..plan.size_a).map(|n| Self::numbered("user1_", n)));
        b.extend((plan.common..plan.size_b).map(|n| Self::numbered("user2_", n)));
        a.shuffle(rng);
        b.shuffle(rng);
        (a, b)
    }
}

/// The strategy used for `request`: `Sequential` once either size reaches
/// `limits.dedup_threshold`, `Sampled` below it.
#[must_use]
pub fn strategy_for(request: &GenerationRequest, limits: &Limits) -> &'static dyn GenerationStrategy {
    if request.size_a.max(request.size_b) >= limits.dedup_threshold {
        &Sequential
    } else {
        &Sampled
    }
}

/// Generate two datasets for `request`, using the thread-local RNG.
pub fn generate(request: &GenerationRequest, limits: &Limits) -> Result<GenerationResult> {
    generate_with_rng(request, limits, &mut thread_rng())
}

/// Generate two datasets for `request`, drawing randomness from `rng`.
#[allow(clippy::cast_precision_loss)]
pub fn generate_with_rng<R: RngCore>(
    request: &GenerationRequest,
    limits: &Limits,
    rng: &mut R,
) -> Result<GenerationResult> {
    request.validate(limits)?;
    let plan = Plan {
        size_a: request.size_a,
        size_b: request.size_b,
        common: request.overlap_count(),
    };
    let requested = request.requested_overlap();
    let clamped = requested > plan.common;
    if clamped {
        warn!(
            "{}% of {} is {requested} shared records, more than the smaller dataset holds; generating {}",
            request.overlap_percent, request.size_a, plan.common
        );
    }

    let strategy = strategy_for(request, limits);
    debug!("Generating {plan:?} with the {} strategy", strategy.name());
    let (a, b) = strategy.generate(&plan, rng);
    if a.len() != plan.size_a || b.len() != plan.size_b {
        return Err(Error::InternalFailure {
            reason: format!(
                "{} strategy produced {} and {} records for {plan:?}",
                strategy.name(),
                a.len(),
                b.len()
            ),
        });
    }

    let smaller = plan.size_a.min(plan.size_b);
    let stats = GenerationStats {
        count_a: a.len(),
        count_b: b.len(),
        common_count: plan.common,
        requested_percent: request.overlap_percent,
        actual_percent: plan.common as f64 / smaller as f64 * 100.0,
        clamped,
    };
    info!(
        "Generated {} and {} records with {} in common ({:.2}% of the smaller, {}% requested)",
        stats.count_a, stats.count_b, stats.common_count, stats.actual_percent, stats.requested_percent
    );
    Ok(GenerationResult {
        dataset_a: UniqueDataset::from_unique(a),
        dataset_b: UniqueDataset::from_unique(b),
        stats,
    })
}

#[allow(clippy::pedantic)]
#[cfg(test)]
mod test {
    use super::*;
    use crate::compare::{compare, Method};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn request(size_a: usize, size_b: usize, overlap_percent: f64) -> GenerationRequest {
        GenerationRequest { size_a, size_b, overlap_percent }
    }

    fn run(req: GenerationRequest, limits: &Limits) -> GenerationResult {
        generate_with_rng(&req, limits, &mut StdRng::seed_from_u64(7)).unwrap()
    }

    fn sampled() -> Limits {
        Limits::default()
    }

    fn sequential() -> Limits {
        Limits { dedup_threshold: 1, ..Limits::default() }
    }

    fn as_set(dataset: &UniqueDataset) -> HashSet<&str> {
        dataset.iter().map(Identifier::as_str).collect()
    }

    #[test]
    fn half_overlap_of_equal_sizes() {
        for limits in [sampled(), sequential()] {
            let result = run(request(100, 100, 50.0), &limits);
            let (a, b) = (as_set(&result.dataset_a), as_set(&result.dataset_b));
            assert_eq!(a.len(), 100, "duplicates in a");
            assert_eq!(b.len(), 100, "duplicates in b");
            assert_eq!(a.intersection(&b).count(), 50);
            assert_eq!(result.stats.common_count, 50);
            assert_eq!(result.stats.actual_percent, 50.0);
            assert!(!result.stats.clamped);
        }
    }

    #[test]
    fn overlap_is_clamped_to_the_smaller_dataset() {
        let req = request(10, 5, 100.0);
        assert_eq!(req.requested_overlap(), 10);
        assert_eq!(req.overlap_count(), 5);
        for limits in [sampled(), sequential()] {
            let result = run(req, &limits);
            assert_eq!(result.stats.common_count, 5);
            assert_eq!(result.stats.actual_percent, 100.0);
            assert!(result.stats.clamped);
            let (a, b) = (as_set(&result.dataset_a), as_set(&result.dataset_b));
            assert_eq!(a.intersection(&b).count(), 5);
        }
    }

    #[test]
    fn actual_percent_is_relative_to_the_smaller_dataset() {
        let result = run(request(10, 5, 40.0), &sampled());
        assert_eq!(result.stats.common_count, 4);
        assert_eq!(result.stats.actual_percent, 80.0);
        assert!(!result.stats.clamped);
    }

    #[test]
    fn overlap_rounds_down() {
        assert_eq!(request(1, 1, 50.0).overlap_count(), 0);
        assert_eq!(request(10, 10, 70.0).overlap_count(), 7);
        assert_eq!(request(3, 3, 99.9).overlap_count(), 2);
        assert_eq!(request(7, 7, 0.0).overlap_count(), 0);
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let limits = Limits { max_generated: 1000, ..Limits::default() };
        for req in [
            request(0, 5, 10.0),
            request(5, 0, 10.0),
            request(5, 5, -1.0),
            request(5, 5, 100.5),
            request(5, 5, f64::NAN),
            request(1001, 5, 10.0),
        ] {
            assert!(
                matches!(generate(&req, &limits), Err(Error::InvalidParameters { .. })),
                "for {req:?}"
            );
        }
    }

    #[test]
    fn strategy_switches_at_the_threshold() {
        let limits = Limits { dedup_threshold: 100, ..Limits::default() };
        assert_eq!(strategy_for(&request(99, 99, 0.0), &limits).name(), "sampled");
        assert_eq!(strategy_for(&request(100, 1, 0.0), &limits).name(), "sequential");
        assert_eq!(strategy_for(&request(1, 100, 0.0), &limits).name(), "sequential");
    }

    #[test]
    fn comparator_finds_the_generated_overlap() {
        for limits in [sampled(), sequential()] {
            let result = run(request(300, 200, 25.0), &limits);
            for method in [Method::Exact, Method::Hashed] {
                let counted = compare(&result.dataset_a, &result.dataset_b, method).unwrap();
                assert_eq!(counted.common_count, 75);
            }
        }
    }

    #[test]
    fn shared_identifiers_are_scattered() {
        for limits in [sampled(), sequential()] {
            let result = run(request(1000, 1000, 50.0), &limits);
            let b = as_set(&result.dataset_b);
            let leading_shared =
                result.dataset_a.iter().take(500).filter(|id| b.contains(id.as_str())).count();
            assert!(leading_shared < 500, "shared identifiers weren't shuffled");
            assert!(leading_shared > 0);
        }
    }

    #[test]
    fn same_seed_same_datasets() {
        let first = run(request(50, 40, 30.0), &sampled());
        let second = run(request(50, 40, 30.0), &sampled());
        assert_eq!(first.dataset_a, second.dataset_a);
        assert_eq!(first.dataset_b, second.dataset_b);
    }

    #[test]
    fn generated_text_round_trips_through_the_normalizer() {
        let result = run(request(64, 32, 50.0), &sampled());
        let mut text = Vec::new();
        result.dataset_a.write_to(&mut text, b"\r\n").unwrap();
        let (parsed, stats) = UniqueDataset::parse(&text, &Limits::default()).unwrap();
        assert_eq!(parsed, result.dataset_a);
        assert_eq!(stats.invalid, 0);
        assert_eq!(stats.duplicates, 0);
    }

    #[test]
    fn stats_serialise_with_published_names() {
        let result = run(request(10, 5, 100.0), &sampled());
        let json = serde_json::to_value(result.stats).unwrap();
        assert_eq!(json["file1Count"], 10);
        assert_eq!(json["file2Count"], 5);
        assert_eq!(json["commonCount"], 5);
        assert_eq!(json["actualIntersectionPercent"], 100.0);
        assert_eq!(json["requestedIntersectionPercent"], 100.0);
        assert_eq!(json["clamped"], true);
    }
}
