//! Binary file classification by content sampling.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Share of non-text bytes above which an undecodable sample is binary.
const NON_TEXT_RATIO: f64 = 0.3;

/// Sample the head of a file and classify it as binary.
pub fn is_binary(path: &Path, sample_bytes: usize) -> io::Result<bool> {
    let file = File::open(path)?;
    let mut sample = Vec::with_capacity(sample_bytes);
    file.take(sample_bytes as u64).read_to_end(&mut sample)?;
    Ok(looks_binary(&sample))
}

/// Classify a content sample.
///
/// Empty samples are text. A NUL byte marks binary. Valid UTF-8 (allowing a
/// character cut off at the sample boundary) is text. Otherwise the sample
/// is binary when control bytes make up more than 30% of it.
pub fn looks_binary(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }

    if sample.contains(&0) {
        return true;
    }

    match std::str::from_utf8(sample) {
        Ok(_) => return false,
        Err(e) if e.error_len().is_none() => return false,
        Err(_) => {}
    }

    let non_text = sample.iter().filter(|&&b| !is_text_byte(b)).count();
    non_text as f64 / sample.len() as f64 > NON_TEXT_RATIO
}

fn is_text_byte(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | b'\r' | 0x08 | 0x0c | 0x1b) || (0x20..0x7f).contains(&b) || b >= 0x80
}
