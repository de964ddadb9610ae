//! Splitting a line on a separator pattern and picking out one field.
use anyhow::{bail, Context, Result};
use regex::bytes::Regex;
use std::fmt;
use std::str::FromStr;

/// The separator used when none is given: a run of whitespace
pub const DEFAULT_SEPARATOR: &str = r"\s+";

/// Which token of a split line is the field we want. On the command line a
/// non-negative number counts from the start (`0` is the first token), and a
/// negative number counts from the end (`-1` is the last token).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIndex {
    /// Zero-based position from the start of the line
    FromStart(usize),
    /// One-based position from the end of the line; never zero
    FromEnd(usize),
}

impl FieldIndex {
    /// The position of the field in a line of `len` tokens, if the line has
    /// that many.
    fn resolve(self, len: usize) -> Option<usize> {
        match self {
            FieldIndex::FromStart(n) => (n < len).then_some(n),
            FieldIndex::FromEnd(n) => len.checked_sub(n).filter(|_| n > 0),
        }
    }
}

impl Default for FieldIndex {
    fn default() -> Self {
        FieldIndex::FromStart(0)
    }
}

impl FromStr for FieldIndex {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        let n: i64 = s.trim().parse().with_context(|| format!("`{s}` is not a field number"))?;
        let Ok(magnitude) = usize::try_from(n.unsigned_abs()) else {
            bail!("field number {n} is out of range")
        };
        Ok(if n < 0 { FieldIndex::FromEnd(magnitude) } else { FieldIndex::FromStart(magnitude) })
    }
}

impl fmt::Display for FieldIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldIndex::FromStart(n) => write!(f, "{n}"),
            FieldIndex::FromEnd(n) => write!(f, "-{n}"),
        }
    }
}

/// The result of looking for a field in a line. A line too short to have the
/// field isn't an error, just a line that can't be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    /// The token at the requested index
    Found(&'a [u8]),
    /// The line has fewer tokens than the index requires
    Missing,
}

/// A compiled separator pattern together with the index of the field to
/// extract.
#[derive(Debug, Clone)]
pub struct FieldSplitter {
    separator: Regex,
    index: FieldIndex,
}

impl FieldSplitter {
    /// Compile `pattern` as the separator. A bad pattern is reported along
    /// with the pattern itself.
    pub fn new(pattern: &str, index: FieldIndex) -> Result<Self> {
        let separator = Regex::new(pattern)
            .with_context(|| format!("Invalid separator pattern: {pattern}"))?;
        Ok(FieldSplitter { separator, index })
    }

    /// The field index this splitter extracts
    #[must_use]
    pub fn index(&self) -> FieldIndex {
        self.index
    }

    /// Split `line` on the separator and return the token at our index.
    #[must_use]
    pub fn field<'a>(&self, line: &'a [u8]) -> Field<'a> {
        let token = match self.index {
            FieldIndex::FromStart(n) => self.separator.split(line).nth(n),
            FieldIndex::FromEnd(_) => {
                let tokens: Vec<&[u8]> = self.separator.split(line).collect();
                self.index.resolve(tokens.len()).and_then(|i| tokens.get(i).copied())
            }
        };
        token.map_or(Field::Missing, Field::Found)
    }
}
