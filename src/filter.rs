//! Houses the `filter` function
//!
use anyhow::{bail, Result};
use bstr::ByteSlice;
use std::io::{self, Write};
use tracing::debug;

use crate::fields::{Field, FieldSplitter};
use crate::operands::LineSource;
use crate::query::QuerySet;

/// Which subject lines to print, and in what order. Inverting the selection
/// and printing in query order can't be combined, so they are variants of a
/// single enum rather than two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Print lines whose field is a query id, in subject order
    Matching,
    /// Print lines whose field is not a query id, in subject order
    NonMatching,
    /// Print the last line matching each query id, in query order
    MatchingInQueryOrder,
}

impl Selection {
    /// Turn the `--invert` and `--sort-by-query-order` flags into a `Selection`
    pub fn from_flags(invert: bool, sort_by_query_order: bool) -> Result<Self> {
        Ok(match (invert, sort_by_query_order) {
            (true, true) => bail!("--invert and --sort-by-query-order are incompatible"),
            (true, false) => Selection::NonMatching,
            (false, true) => Selection::MatchingInQueryOrder,
            (false, false) => Selection::Matching,
        })
    }

    /// Does this selection print the lines that *don't* match?
    #[must_use]
    pub fn is_inverted(self) -> bool {
        self == Selection::NonMatching
    }
}

/// What `filter` did: the number of subject lines selected, and how they
/// were selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Subject lines that met the selection criterion. In query order mode a
    /// line later replaced by another match for the same id still counts.
    pub selected: usize,
    /// The selection used
    pub selection: Selection,
}

/// Reads `subject` line by line and prints the lines chosen by `selection`
/// to `out`:
///
/// * Each line is trimmed; blank lines are ignored.
/// * The line's field is found with `splitter`. A line too short to have the
///   field is ignored, whatever the selection.
/// * `Selection::Matching` prints every line whose field is in `queries`,
///   and `Selection::NonMatching` every line whose field isn't.
/// * `Selection::MatchingInQueryOrder` keeps, for each query id, the last line
///   that matched it, and prints those lines in the order of `queries` once
///   the subject has been read.
///
/// Query ids matched by some line are marked found in `queries`. Output lines
/// end with `\r\n` if the subject's first line does, and with `\n` otherwise.
pub fn filter(
    subject: impl LineSource,
    queries: &mut QuerySet,
    splitter: &FieldSplitter,
    selection: Selection,
    mut out: impl Write,
) -> Result<Summary> {
    debug!(?selection, queries = queries.len(), "filtering subject");
    let mut terminator: Option<&'static [u8]> = None;
    let mut scanned = 0_usize;
    let mut selected = 0_usize;

    // Indexed by query position, so `by_query[i]` is `Some` exactly when the
    // i-th query id has been found.
    let mut by_query: Vec<Option<Vec<u8>>> = match selection {
        Selection::MatchingInQueryOrder => vec![None; queries.len()],
        Selection::Matching | Selection::NonMatching => Vec::new(),
    };

    subject.for_byte_line(|raw| {
        let eol = *terminator.get_or_insert_with(|| line_terminator(raw));
        let line = raw.trim();
        if line.is_empty() {
            return Ok(());
        }
        scanned += 1;
        let Field::Found(key) = splitter.field(line) else { return Ok(()) };
        match selection {
            Selection::Matching => {
                if queries.mark_found(key).is_some() {
                    selected += 1;
                    write_line(&mut out, line, eol)?;
                }
            }
            Selection::NonMatching => {
                if !queries.contains(key) {
                    selected += 1;
                    write_line(&mut out, line, eol)?;
                }
            }
            Selection::MatchingInQueryOrder => {
                if let Some(position) = queries.mark_found(key) {
                    selected += 1;
                    let kept = by_query[position].get_or_insert_with(Vec::new);
                    kept.clear();
                    kept.extend_from_slice(line);
                }
            }
        }
        Ok(())
    })?;

    let eol = terminator.unwrap_or(b"\n");
    for line in by_query.iter().flatten() {
        write_line(&mut out, line, eol)?;
    }
    out.flush()?;

    debug!(scanned, selected, "subject filtered");
    Ok(Summary { selected, selection })
}

fn write_line(out: &mut impl Write, line: &[u8], eol: &[u8]) -> io::Result<()> {
    out.write_all(line)?;
    out.write_all(eol)
}

/// `\r\n` if `line` ends with `\r\n`, and `\n` otherwise (including for a
/// last line with no terminator at all).
fn line_terminator(line: &[u8]) -> &'static [u8] {
    if line.ends_with(b"\r\n") {
        b"\r\n"
    } else {
        b"\n"
    }
}
