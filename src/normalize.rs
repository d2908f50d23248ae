//! Turns raw line-oriented text into canonical `Identifier`s.
//!
//! A "line" is zero or more bytes terminated by `\n` or `\r\n` (or by the end
//! of the text). Blank lines are ignored outright; lines that aren't blank but
//! fail validation are dropped and counted.

use bstr::ByteSlice;
use log::{debug, warn};

use crate::config::Limits;
use crate::error::{Error, Result};
use crate::identifier::Identifier;

/// The literal a header line starts with, compared case-insensitively
pub const HEADER: &str = "email";

const BOM_BYTES: &[u8] = b"\xEF\xBB\xBF";

/// The Normalizer's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Valid identifiers in input order, duplicates included
    pub identifiers: Vec<Identifier>,
    /// Non-blank lines rejected by validation
    pub invalid: usize,
    /// Whether the first non-blank line was taken as a header
    pub header_skipped: bool,
}

/// Normalise `text`:
///
/// * blank lines are dropped,
/// * a first non-blank line starting with `email` is skipped as a header,
/// * every other line is trimmed, lowercased and validated.
///
/// The candidate count is checked against `limits.max_records` before any
/// per-record storage is allocated.
pub fn normalize(text: &[u8], limits: &Limits) -> Result<Normalized> {
    let text = text.strip_prefix(BOM_BYTES).unwrap_or(text);

    // Counting pass: no allocation yet
    let mut first = None;
    let mut non_blank = 0_usize;
    for line in text.lines().filter(|line| !is_blank(line)) {
        first.get_or_insert(line);
        non_blank += 1;
    }
    let Some(first) = first else { return Err(Error::InputEmpty) };
    let header_skipped = is_header(first);
    let candidates = non_blank - usize::from(header_skipped);
    if candidates == 0 {
        return Err(Error::InputEmpty);
    }
    if candidates > limits.max_records {
        return Err(Error::InputTooLarge { count: candidates, max: limits.max_records });
    }

    let mut identifiers = Vec::with_capacity(candidates);
    let mut invalid = 0_usize;
    let mut lines = text.lines().enumerate().filter(|(_, line)| !is_blank(line));
    if header_skipped {
        lines.next();
    }
    for (n, line) in lines {
        match line.to_str().ok().and_then(Identifier::parse) {
            Some(id) => identifiers.push(id),
            None => {
                debug!("Skipping invalid record on line {}: {:?}", n + 1, line.as_bstr());
                invalid += 1;
            }
        }
    }

    if identifiers.is_empty() {
        return Err(Error::NoValidRecords { invalid });
    }
    if invalid > 0 {
        warn!("Dropped {invalid} invalid record(s), kept {}", identifiers.len());
    }
    Ok(Normalized { identifiers, invalid, header_skipped })
}

fn is_blank(line: &[u8]) -> bool {
    line.trim().is_empty()
}

fn is_header(line: &[u8]) -> bool {
    let line = line.trim_start();
    line.len() >= HEADER.len() && line[..HEADER.len()].eq_ignore_ascii_case(HEADER.as_bytes())
}
