//! File I/O: reading the two input operands, and writing generated or hashed
//! datasets. Input files are read into memory in their entirety; UTF-16 files
//! are translated to UTF-8 on the way in.
use anyhow::{Context, Result};
use memchr::memchr;
use std::{
    fs,
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::dedup::UniqueDataset;
use crate::digest::digest;
use crate::generate::GenerationResult;

/// Line terminator for files we generate
pub const CRLF: &[u8] = b"\r\n";

/// Return the contents of the file at `path`, translated to UTF-8 if it
/// starts with a UTF-16 Byte Order Mark.
pub fn read_operand(path: &Path) -> Result<Vec<u8>> {
    fs::read(path)
        .with_context(|| format!("Can't read file: {}", path.display()))
        .map(decode_if_utf16)
}

/// Read both operands, concurrently.
pub fn read_both(first: &Path, second: &Path) -> Result<(Vec<u8>, Vec<u8>)> {
    let (first, second) = crate::both(|| read_operand(first), || read_operand(second))?;
    Ok((first?, second?))
}

/// Decode UTF-16 to UTF-8 if we see a UTF-16 Byte Order Mark at the beginning of `candidate`.
/// Otherwise return `candidate` unchanged
fn decode_if_utf16(candidate: Vec<u8>) -> Vec<u8> {
    // Note: `decode_without_bom_handling` will change malformed sequences to the
    // Unicode REPLACEMENT CHARACTER, which then fails identifier validation.
    //
    // "without BOM handling" means that the UTF-16 BOM is translated to a UTF-8 BOM
    //
    if let Some((enc, _)) = encoding_rs::Encoding::for_bom(&candidate) {
        if [encoding_rs::UTF_16LE, encoding_rs::UTF_16BE].contains(&enc) {
            let (translated, _had_malformed_sequences) =
                enc.decode_without_bom_handling(&candidate);
            return translated.into_owned().into_bytes();
        }
    }
    return candidate;
}

const BOM_BYTES: &[u8] = b"\xEF\xBB\xBF";

/// Returns `(bom, line_terminator)`, where `bom` is the (UTF-8) Byte Order
/// Mark, or the empty string if `text` has none, and `line_terminator` is
/// `\r\n` if the first line of `text` ends with `\r\n`, and `\n` if the first
/// line ends just with `\n` (or is the only line and has no line terminator).
#[must_use]
pub fn output_info(text: &[u8]) -> (&'static [u8], &'static [u8]) {
    let mut bom: &'static [u8] = b"";
    let mut line_terminator: &'static [u8] = b"\n";
    if text.starts_with(BOM_BYTES) {
        bom = BOM_BYTES;
    }
    if let Some(n) = memchr(b'\n', text) {
        if n > 0 && text[n - 1] == b'\r' {
            line_terminator = b"\r\n";
        }
    }
    (bom, line_terminator)
}

/// Write one lowercase hex SHA-256 digest per identifier of `dataset`.
pub fn write_digests(
    dataset: &UniqueDataset,
    mut out: impl Write,
    bom: &[u8],
    line_terminator: &[u8],
) -> io::Result<()> {
    out.write_all(bom)?;
    for id in dataset {
        out.write_all(digest(id).to_hex().as_bytes())?;
        out.write_all(line_terminator)?;
    }
    out.flush()
}

/// Where `overlap hash` writes by default: `<dir>/<stem>.hashed.csv`
#[must_use]
pub fn hashed_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().map_or_else(|| "input".into(), |s| s.to_string_lossy());
    input.with_file_name(format!("{stem}.hashed.csv"))
}

/// Write a generated pair as `<dir>/<prefix>_1.csv` and `<dir>/<prefix>_2.csv`,
/// creating `dir` if needed. Returns the two paths.
pub fn write_generated(
    result: &GenerationResult,
    dir: &Path,
    prefix: &str,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("Can't create directory: {}", dir.display()))?;
    let first = dir.join(format!("{prefix}_1.csv"));
    let second = dir.join(format!("{prefix}_2.csv"));
    write_dataset(&result.dataset_a, &first)?;
    write_dataset(&result.dataset_b, &second)?;
    Ok((first, second))
}

fn write_dataset(dataset: &UniqueDataset, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Can't create file: {}", path.display()))?;
    dataset
        .write_to(BufWriter::new(file), CRLF)
        .with_context(|| format!("Error writing file: {}", path.display()))
}

#[allow(clippy::pedantic)]
#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Limits;
    use crate::generate::{generate, GenerationRequest};
    use assert_fs::{prelude::*, TempDir};

    const UTF8_BOM: &str = "\u{FEFF}";

    fn abominate(expected: &str) -> String {
        UTF8_BOM.to_string() + expected
    }

    fn to_utf_16le(source: &str) -> Vec<u8> {
        let mut result = b"\xff\xfe".to_vec();
        for b in source.as_bytes().iter() {
            result.push(*b);
            result.push(0);
        }
        result
    }

    fn to_utf_16be(source: &str) -> Vec<u8> {
        let mut result = b"\xfe\xff".to_vec();
        for b in source.as_bytes().iter() {
            result.push(0);
            result.push(*b);
        }
        result
    }

    #[test]
    fn utf8_bom_is_correct() {
        assert_eq!(BOM_BYTES, UTF8_BOM.as_bytes());
    }

    #[test]
    fn utf_16le_is_translated_to_utf8() {
        let expected = "email\r\nann@example.com\r\n";
        assert_eq!(decode_if_utf16(to_utf_16le(expected)), abominate(expected).as_bytes());
    }

    #[test]
    fn utf_16be_is_translated_to_utf8() {
        let expected = "email\nbob@example.com\n";
        assert_eq!(decode_if_utf16(to_utf_16be(expected)), abominate(expected).as_bytes());
    }

    #[test]
    fn utf_16_operands_parse_like_utf8_ones() {
        let text = decode_if_utf16(to_utf_16le("email\r\nAnn@Example.com\r\n"));
        let (dataset, _) = UniqueDataset::parse(&text, &Limits::default()).unwrap();
        assert_eq!(dataset.as_slice()[0].as_str(), "ann@example.com");
    }

    #[test]
    fn output_info_follows_the_first_line() {
        assert_eq!(output_info(b"a\r\nb\n"), (&b""[..], &b"\r\n"[..]));
        assert_eq!(output_info(b"\xEF\xBB\xBFa\nb\r\n"), (BOM_BYTES, &b"\n"[..]));
        assert_eq!(output_info(b"only"), (&b""[..], &b"\n"[..]));
    }

    #[test]
    fn hashed_path_sits_next_to_the_input() {
        assert_eq!(hashed_path(Path::new("/tmp/list.csv")), PathBuf::from("/tmp/list.hashed.csv"));
        assert_eq!(hashed_path(Path::new("list")), PathBuf::from("list.hashed.csv"));
    }

    #[test]
    fn read_both_reports_the_missing_file() {
        let temp = TempDir::new().unwrap();
        let present = temp.child("present.csv");
        present.write_str("a@b.c\n").unwrap();
        let missing = temp.child("missing.csv");
        let error = read_both(present.path(), missing.path()).unwrap_err();
        assert!(format!("{error}").contains("missing.csv"), "{error}");
    }

    #[test]
    fn generated_files_use_crlf_and_a_header() {
        let temp = TempDir::new().unwrap();
        let result = generate(
            &GenerationRequest { size_a: 3, size_b: 2, overlap_percent: 50.0 },
            &Limits::default(),
        )
        .unwrap();
        let (first, second) = write_generated(&result, temp.path(), "pair").unwrap();
        let first = fs::read_to_string(first).unwrap();
        assert!(first.starts_with("email\r\n"));
        assert_eq!(first.matches("\r\n").count(), 4);
        let (a, b) = read_both(&temp.path().join("pair_1.csv"), &second).unwrap();
        let (a, _) = UniqueDataset::parse(&a, &Limits::default()).unwrap();
        let (b, _) = UniqueDataset::parse(&b, &Limits::default()).unwrap();
        assert_eq!(a, result.dataset_a);
        assert_eq!(b, result.dataset_b);
    }
}
