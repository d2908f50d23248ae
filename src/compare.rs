//! Houses the `compare` function, which counts the identifiers two
//! `UniqueDataset`s share. The shared identifiers themselves are never
//! returned.

use fxhash::FxHashSet;
use log::info;
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::config::Limits;
use crate::dedup::UniqueDataset;
use crate::digest::{digest, DigestToken};
use crate::error::{Error, Result};

/// How two identifiers are judged equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Canonical strings are equal
    Exact,
    /// SHA-256 digests of the canonical strings are equal
    Hashed,
    /// A name that is accepted but has nothing behind it
    Reserved(ReservedMethod),
}

/// Method names kept for future privacy-preserving comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedMethod {
    /// Approximate matching
    Fuzzy,
    /// A real private set intersection protocol
    Encrypted,
}

impl Method {
    /// The method's name as accepted by `from_str`
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Method::Exact => "exact",
            Method::Hashed => "hashed",
            Method::Reserved(ReservedMethod::Fuzzy) => "fuzzy",
            Method::Reserved(ReservedMethod::Encrypted) => "encrypted",
        }
    }

    /// Fails with `MethodNotImplemented` for reserved methods.
    pub fn ensure_implemented(self) -> Result<()> {
        match self {
            Method::Exact | Method::Hashed => Ok(()),
            Method::Reserved(_) => Err(self.not_implemented()),
        }
    }

    fn not_implemented(self) -> Error {
        Error::MethodNotImplemented { method: self.name().to_string() }
    }
}

impl FromStr for Method {
    type Err = Error;
    fn from_str(s: &str) -> Result<Method> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Method::Exact),
            "hashed" | "sha256" => Ok(Method::Hashed),
            "fuzzy" => Ok(Method::Reserved(ReservedMethod::Fuzzy)),
            "encrypted" => Ok(Method::Reserved(ReservedMethod::Encrypted)),
            _ => Err(Error::MethodNotImplemented { method: s.to_string() }),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// The outcome of one comparison. `common_count <= min(count_a, count_b)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// Identifiers present in both datasets
    pub common_count: usize,
    /// Size of the first dataset
    #[serde(rename = "file1Count")]
    pub count_a: usize,
    /// Size of the second dataset
    #[serde(rename = "file2Count")]
    pub count_b: usize,
    /// Wall-clock time spent
    #[serde(rename = "executionTimeMs", serialize_with = "as_millis")]
    pub elapsed: Duration,
    /// The method used
    pub method: Method,
}

fn as_millis<S: Serializer>(elapsed: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(elapsed.as_secs_f64() * 1000.0)
}

/// Count the identifiers `a` and `b` share under `method`.
///
/// * `Method::Exact` builds a membership set from the smaller dataset and
///   probes it with each element of the larger one.
/// * `Method::Hashed` first maps both datasets through `digest`, then does the
///   same over tokens, so the membership set never holds an identifier.
/// * Reserved methods fail before doing any work.
pub fn compare(a: &UniqueDataset, b: &UniqueDataset, method: Method) -> Result<ComparisonResult> {
    let start = Instant::now();
    let common_count = match method {
        Method::Exact => count_common(a.as_slice(), b.as_slice()),
        Method::Hashed => {
            let a: Vec<DigestToken> = a.iter().map(digest).collect();
            let b: Vec<DigestToken> = b.iter().map(digest).collect();
            count_common(&a, &b)
        }
        Method::Reserved(_) => return Err(method.not_implemented()),
    };
    Ok(ComparisonResult {
        common_count,
        count_a: a.len(),
        count_b: b.len(),
        elapsed: start.elapsed(),
        method,
    })
}

/// Normalise and deduplicate both texts, then `compare` them. The two texts
/// are processed concurrently, and `elapsed` covers the whole pipeline.
pub fn compare_texts(
    text_a: &[u8],
    text_b: &[u8],
    method: Method,
    limits: &Limits,
) -> Result<ComparisonResult> {
    method.ensure_implemented()?;
    let start = Instant::now();
    let (parsed_a, parsed_b) = crate::both(
        || UniqueDataset::parse(text_a, limits),
        || UniqueDataset::parse(text_b, limits),
    )?;
    let (a, stats_a) = parsed_a?;
    let (b, stats_b) = parsed_b?;
    info!(
        "Parsed {} unique records from file1 ({} duplicate, {} invalid) and {} from file2 ({} duplicate, {} invalid)",
        a.len(),
        stats_a.duplicates,
        stats_a.invalid,
        b.len(),
        stats_b.duplicates,
        stats_b.invalid
    );

    let mut result = compare(&a, &b, method)?;
    result.elapsed = start.elapsed();
    info!(
        "{method} comparison found {} common records in {:.2}ms",
        result.common_count,
        result.elapsed.as_secs_f64() * 1000.0
    );
    Ok(result)
}

fn count_common<K: Hash + Eq>(a: &[K], b: &[K]) -> usize {
    let (probe, scan) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let members: FxHashSet<&K> = probe.iter().collect();
    scan.iter().filter(|k| members.contains(k)).count()
}
