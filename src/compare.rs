//! Line-by-line comparison of simulator output against a reference.
//!
//! Lines are compared byte for byte with only the trailing `\n` removed.
//! Every differing line is counted, but only the first few are reported so a
//! badly broken run does not flood the log.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use log::warn;

use crate::error::{HarnessError, Result};

/// Number of differing line pairs printed per comparison.
pub const MISMATCH_LIMIT: usize = 5;

/// One reported difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// Both streams had line `line` (1-based) but the contents differ.
    Differ {
        line: usize,
        expected: String,
        actual: String,
    },
    /// The named stream ran out of lines before the other.
    Truncated { line: usize, stream: String },
}

impl Mismatch {
    pub fn line(&self) -> usize {
        match self {
            Mismatch::Differ { line, .. } | Mismatch::Truncated { line, .. } => *line,
        }
    }
}

/// Outcome of comparing two streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    /// Total number of mismatching lines, reported or not.
    pub mismatches: usize,
    /// The first mismatches, at most the comparator's limit plus a truncation.
    pub reported: Vec<Mismatch>,
}

impl Comparison {
    pub fn is_match(&self) -> bool {
        self.mismatches == 0
    }
}

/// A stream plus the name used for it in diagnostics.
pub struct Labeled<'a, R> {
    pub name: &'a str,
    pub reader: R,
}

impl<'a, R: BufRead> Labeled<'a, R> {
    pub fn new(name: &'a str, reader: R) -> Self {
        Self { name, reader }
    }

    /// Next line without its trailing newline, or `None` at end of stream.
    fn next_line(&mut self, buf: &mut Vec<u8>) -> io::Result<Option<()>> {
        buf.clear();
        if self.reader.read_until(b'\n', buf)? == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        Ok(Some(()))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OutputComparator {
    limit: usize,
}

impl Default for OutputComparator {
    fn default() -> Self {
        Self {
            limit: MISMATCH_LIMIT,
        }
    }
}

impl OutputComparator {
    pub fn with_limit(limit: usize) -> Self {
        Self { limit }
    }

    /// Compare `test` against `reference` until either stream ends.
    ///
    /// A stream ending early counts as one mismatch and stops the comparison.
    pub fn compare<R: BufRead, T: BufRead>(
        &self,
        mut reference: Labeled<'_, R>,
        mut test: Labeled<'_, T>,
    ) -> io::Result<Comparison> {
        let mut result = Comparison::default();
        let mut rline = Vec::new();
        let mut tline = Vec::new();
        let mut line = 0;

        loop {
            line += 1;
            let r = reference.next_line(&mut rline)?;
            let t = test.next_line(&mut tline)?;
            let short = match (r, t) {
                (None, None) => break,
                (None, Some(())) => Some(reference.name),
                (Some(()), None) => Some(test.name),
                (Some(()), Some(())) => None,
            };
            if let Some(stream) = short {
                result.mismatches += 1;
                warn!("Mismatch at line {}.  File {} ended prematurely", line, stream);
                result.reported.push(Mismatch::Truncated {
                    line,
                    stream: stream.to_string(),
                });
                break;
            }
            if rline != tline {
                result.mismatches += 1;
                if result.mismatches <= self.limit {
                    let expected = String::from_utf8_lossy(&rline).into_owned();
                    let actual = String::from_utf8_lossy(&tline).into_owned();
                    warn!(
                        "Mismatch at line {}.  File {}:'{}'.  File {}:'{}'",
                        line, reference.name, expected, test.name, actual
                    );
                    result.reported.push(Mismatch::Differ {
                        line,
                        expected,
                        actual,
                    });
                }
            }
        }

        if result.mismatches > 0 {
            warn!(
                "{} total mismatches.  Files {}, {}",
                result.mismatches, reference.name, test.name
            );
        }
        Ok(result)
    }

    /// Compare two files on disk.
    pub fn compare_files(&self, reference: &Path, test: &Path) -> Result<Comparison> {
        let rf = File::open(reference).map_err(|e| HarnessError::file(reference, e))?;
        let tf = File::open(test).map_err(|e| HarnessError::file(test, e))?;
        let rname = reference.display().to_string();
        let tname = test.display().to_string();
        let comparison = self.compare(
            Labeled::new(&rname, BufReader::new(rf)),
            Labeled::new(&tname, BufReader::new(tf)),
        )?;
        Ok(comparison)
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Differ {
                line,
                expected,
                actual,
            } => write!(f, "line {}: expected '{}', got '{}'", line, expected, actual),
            Mismatch::Truncated { line, stream } => {
                write!(f, "line {}: {} ended prematurely", line, stream)
            }
        }
    }
}
