//! Prints comparison and generation results, either as an aligned,
//! optionally coloured report or as JSON.
//!
//! Styled output always carries ANSI escapes; the caller decides whether they
//! survive by wrapping its sink in an `anstream::AutoStream`.

use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use std::io::Write;
use std::path::Path;

use crate::compare::ComparisonResult;
use crate::generate::GenerationStats;
use crate::styles::{as_count, as_label, as_warning};

pub use crate::styles::ColorChoice;

/// How to print results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Aligned `label: value` lines
    Text,
    /// One JSON object
    Json,
}

const LABEL_WIDTH: usize = 20;

fn row(out: &mut dyn Write, label: &str, value: &str) -> std::io::Result<()> {
    let pad = LABEL_WIDTH.saturating_sub(as_label(label).len());
    writeln!(out, "{}{:pad$}{}", as_label(label), "", as_count(value))
}

fn json_line(out: &mut dyn Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Print the outcome of `overlap compare`.
pub fn comparison(out: &mut dyn Write, result: &ComparisonResult, format: Format) -> Result<()> {
    match format {
        Format::Json => json_line(out, result)?,
        Format::Text => {
            row(out, "Common records:", &result.common_count.to_string())?;
            row(out, "File 1 records:", &result.count_a.to_string())?;
            row(out, "File 2 records:", &result.count_b.to_string())?;
            row(out, "Method:", result.method.name())?;
            let millis = result.elapsed.as_secs_f64() * 1000.0;
            row(out, "Execution time:", &format!("{millis:.2} ms"))?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Print the outcome of `overlap generate`. A clamped overlap is always
/// called out, in both formats.
pub fn generation(
    out: &mut dyn Write,
    stats: &GenerationStats,
    files: (&Path, &Path),
    format: Format,
) -> Result<()> {
    match format {
        Format::Json => {
            let value = json!({
                "files": { "file1": files.0, "file2": files.1 },
                "stats": stats,
            });
            json_line(out, &value)?;
        }
        Format::Text => {
            row(out, "File 1:", &files.0.display().to_string())?;
            row(out, "File 2:", &files.1.display().to_string())?;
            row(out, "File 1 records:", &stats.count_a.to_string())?;
            row(out, "File 2 records:", &stats.count_b.to_string())?;
            row(out, "Common records:", &stats.common_count.to_string())?;
            row(out, "Requested overlap:", &format!("{}%", stats.requested_percent))?;
            row(out, "Actual overlap:", &format!("{:.2}%", stats.actual_percent))?;
            if stats.clamped {
                writeln!(
                    out,
                    "{} the requested overlap didn't fit in the smaller file, so it was reduced to {} records",
                    as_warning("note:"),
                    stats.common_count
                )?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Print the outcome of `overlap hash`.
pub fn hashed(out: &mut dyn Write, count: usize, path: &Path, format: Format) -> Result<()> {
    match format {
        Format::Json => json_line(out, &json!({ "hashedCount": count, "file": path }))?,
        Format::Text => {
            row(out, "Hashed records:", &count.to_string())?;
            row(out, "Written to:", &path.display().to_string())?;
        }
    }
    out.flush()?;
    Ok(())
}
