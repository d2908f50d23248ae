//! Counts the identifiers two line-oriented datasets share, and generates
//! synthetic dataset pairs with a chosen overlap.
//!
//! The pipeline for a comparison is `normalize` (one canonical `Identifier`
//! per valid line) → `dedup` (a `UniqueDataset`) → `compare`. The `generate`
//! module builds `UniqueDataset`s directly. The `args` module parses the
//! command line, `operands` hides file I/O, and `report` prints results.
//!
//! Current Limitations:
//! * Everything happens in memory: both inputs are read whole before any
//!   processing starts, and `Limits` bounds how large they may be.
//! * `Method::Hashed` hides identifiers from the membership set, but it is not
//!   private set intersection. Whoever supplies one dataset can test any
//!   identifier they like against the other.

#![cfg_attr(debug_assertions, allow(dead_code, unused_imports))]
#![deny(unused_must_use)]
#![deny(clippy::all)]
#![allow(clippy::needless_return)]
#![deny(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![warn(missing_docs)]

pub mod args;
pub mod compare;
pub mod config;
pub mod dedup;
pub mod digest;
pub mod error;
pub mod generate;
pub mod identifier;
pub mod normalize;
pub mod operands;
pub mod report;
mod styles;

pub use crate::compare::{compare, compare_texts, ComparisonResult, Method};
pub use crate::config::Limits;
pub use crate::dedup::{deduplicate, UniqueDataset};
pub use crate::error::{Error, ErrorClass};
pub use crate::generate::{generate, GenerationRequest, GenerationResult, GenerationStats};
pub use crate::identifier::Identifier;

/// Run `a` and `b` on two scoped threads and return both results. A panic in
/// either becomes `Error::InternalFailure`.
pub(crate) fn both<A, B, FA, FB>(a: FA, b: FB) -> error::Result<(A, B)>
where
    FA: FnOnce() -> A + Send,
    FB: FnOnce() -> B + Send,
    A: Send,
    B: Send,
{
    std::thread::scope(|scope| {
        let handle = scope.spawn(b);
        let first = a();
        match handle.join() {
            Ok(second) => Ok((first, second)),
            Err(_) => Err(Error::InternalFailure { reason: "worker thread panicked".into() }),
        }
    })
}
