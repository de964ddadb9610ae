//! Provides the `QuerySet` structure, the query ids loaded either from the
//! command line or from a query file.
use anyhow::Result;
use bstr::ByteSlice;
use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use std::io;
use tracing::debug;

use crate::fields::{Field, FieldSplitter};
use crate::operands::LineSource;
use crate::report::Reporter;

/// A `QuerySet` is a set of query ids, each id represented as a key of an
/// `IndexMap`.
/// * Keys are kept in the order they were first seen; a repeated id is
///   ignored.
/// * The value for each key records whether some subject line has matched
///   it. Every key starts out not found.
/// * The set is never resized once loaded, so a key's position is a stable
///   index for as long as the set lives.
#[derive(Debug, Default)]
pub struct QuerySet {
    keys: IndexMap<Vec<u8>, bool, FxBuildHasher>,
}

impl QuerySet {
    /// Each id in `ids` is used verbatim as a key, in the given order.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut set = QuerySet::default();
        for id in ids {
            set.insert(id.as_ref());
        }
        debug!(keys = set.len(), "loaded query ids from the command line");
        set
    }

    /// Read one key from each non-blank line of `source`: the line is trimmed,
    /// split with `splitter`, and the field at the splitter's index becomes the
    /// key. Lines without that field are reported to `reporter` and skipped.
    pub fn from_lines(
        source: impl LineSource,
        splitter: &FieldSplitter,
        reporter: &mut Reporter<impl io::Write>,
    ) -> Result<Self> {
        let mut set = QuerySet::default();
        source.for_byte_line(|line| {
            let line = line.trim();
            if line.is_empty() {
                return Ok(());
            }
            match splitter.field(line) {
                Field::Found(key) => set.insert(key),
                Field::Missing => reporter.unsplittable(line, splitter.index())?,
            }
            Ok(())
        })?;
        debug!(keys = set.len(), "loaded query ids from the query file");
        Ok(set)
    }

    fn insert(&mut self, key: &[u8]) {
        if !self.keys.contains_key(key) {
            self.keys.insert(key.to_vec(), false);
        }
    }

    /// The number of distinct query ids
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Are there no query ids at all?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Is `key` one of the query ids?
    #[must_use]
    pub fn contains(&self, key: &[u8]) -> bool {
        self.keys.contains_key(key)
    }

    /// Record that `key` has been found, returning its position in the set,
    /// or `None` (and record nothing) if `key` isn't a query id.
    pub(crate) fn mark_found(&mut self, key: &[u8]) -> Option<usize> {
        let (position, _, found) = self.keys.get_full_mut(key)?;
        *found = true;
        Some(position)
    }

    /// Has `key` been found? `None` if `key` isn't a query id.
    #[must_use]
    #[cfg(test)]
    pub(crate) fn is_found(&self, key: &[u8]) -> Option<bool> {
        self.keys.get(key).copied()
    }

    /// The query ids, in the order first seen
    #[cfg(test)]
    pub(crate) fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.keys.keys().map(Vec::as_slice)
    }

    /// The query ids that no subject line has matched so far, in order
    pub fn not_found(&self) -> impl Iterator<Item = &[u8]> {
        self.keys.iter().filter(|(_, found)| !**found).map(|(key, _)| key.as_slice())
    }
}

#[allow(clippy::pedantic)]
#[cfg(test)]
mod test {
    use super::*;
    use crate::fields::{FieldIndex, DEFAULT_SEPARATOR};

    fn keys(set: &QuerySet) -> Vec<&str> {
        set.keys().map(|k| std::str::from_utf8(k).unwrap()).collect()
    }

    fn load(text: &str, pattern: &str, index: FieldIndex) -> (QuerySet, String) {
        let splitter = FieldSplitter::new(pattern, index).unwrap();
        let mut reporter = Reporter::new(Vec::new(), false);
        let set = QuerySet::from_lines(text.as_bytes(), &splitter, &mut reporter).unwrap();
        (set, String::from_utf8(reporter.into_inner()).unwrap())
    }

    #[test]
    fn duplicate_ids_collapse_to_the_first_occurrence() {
        let set = QuerySet::from_ids(["B", "A", "B", "C", "A"]);
        assert_eq!(keys(&set), ["B", "A", "C"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn inline_ids_are_used_verbatim() {
        let set = QuerySet::from_ids([" A ", "a"]);
        assert_eq!(keys(&set), [" A ", "a"]);
    }

    #[test]
    fn query_lines_are_trimmed_split_and_deduplicated() {
        let text = "  A x\n\nB y\n   \nA z\r\nC\n";
        let (set, notices) = load(text, DEFAULT_SEPARATOR, FieldIndex::FromStart(0));
        assert_eq!(keys(&set), ["A", "B", "C"]);
        assert_eq!(notices, "");
    }

    #[test]
    fn lines_without_the_field_are_skipped_with_a_notice() {
        let text = "A x\nB\nC z\n";
        let (set, notices) = load(text, DEFAULT_SEPARATOR, FieldIndex::FromStart(1));
        assert_eq!(keys(&set), ["x", "z"]);
        assert_eq!(notices, "cannot split this line into field 1:\nB\n");
    }

    #[test]
    fn query_files_can_use_their_own_separator() {
        let (set, _) = load("a,b,c\nd,e,f\n", ",", FieldIndex::FromEnd(1));
        assert_eq!(keys(&set), ["c", "f"]);
    }

    #[test]
    fn found_flags_start_false_and_stick() {
        let mut set = QuerySet::from_ids(["A", "B"]);
        assert_eq!(set.is_found(b"A"), Some(false));
        assert_eq!(set.mark_found(b"B"), Some(1));
        assert_eq!(set.mark_found(b"B"), Some(1));
        assert_eq!(set.mark_found(b"Z"), None);
        assert_eq!(set.is_found(b"B"), Some(true));
        assert_eq!(set.is_found(b"Z"), None);
        assert_eq!(set.not_found().collect::<Vec<_>>(), [b"A".as_slice()]);
        assert_eq!(set.len(), 2);
    }
}
