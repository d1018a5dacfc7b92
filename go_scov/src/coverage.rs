//! Coverage profile inspection.
//!
//! `go test -coverprofile` writes a text profile: a `mode:` header line
//! followed by one record per statement block, e.g.
//!
//! ```text
//! mode: set
//! example.com/pkg/pkg.go:3.24,5.2 1 1
//! example.com/pkg/pkg.go:7.26,9.2 1 0
//! ```
//!
//! The last field of a record is its execution count. A record whose count
//! token is exactly `0` was never executed.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{CoverageError, CoverageResult};

/// Suffix marking a record that was never executed.
const UNCOVERED_SUFFIX: &[u8] = b" 0";

/// Read the profile at `path` and return its uncovered records in file order.
///
/// The profile is scanned as bytes; records that are not valid UTF-8 are
/// returned lossily converted.
pub fn find_uncovered(path: &Path) -> CoverageResult<Vec<String>> {
    let content = fs::read(path).map_err(|err| CoverageError::io(path, err))?;

    let uncovered: Vec<String> = uncovered_records(&content)
        .into_iter()
        .map(|record| String::from_utf8_lossy(record).into_owned())
        .collect();

    debug!(
        path = %path.display(),
        uncovered = uncovered.len(),
        "Inspected coverage profile",
    );
    Ok(uncovered)
}

/// Uncovered records of an in-memory profile.
///
/// Empty lines are skipped and the first remaining line is treated as the
/// header, whatever its content.
pub fn uncovered_records(content: &[u8]) -> Vec<&[u8]> {
    content
        .split(|&byte| byte == b'\n')
        .filter(|line| !line.is_empty())
        .skip(1)
        .filter(|line| line.ends_with(UNCOVERED_SUFFIX))
        .collect()
}
