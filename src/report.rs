//! The diagnostic stream: notices about unusable query lines, and the
//! statistics printed with `--verbose`.
use std::io::{self, Write};

use crate::fields::FieldIndex;
use crate::filter::Summary;
use crate::query::QuerySet;

/// Writes diagnostics to `sink` (standard error, for the command line tool).
/// Notices are always written; statistics only when `verbose` is set.
pub struct Reporter<W: Write> {
    sink: W,
    verbose: bool,
}

impl<W: Write> Reporter<W> {
    /// A reporter writing to `sink`
    pub fn new(sink: W, verbose: bool) -> Self {
        Reporter { sink, verbose }
    }

    /// Recover the sink
    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.sink
    }

    /// A query line had too few fields to supply a key
    pub fn unsplittable(&mut self, line: &[u8], index: FieldIndex) -> io::Result<()> {
        writeln!(self.sink, "cannot split this line into field {index}:")?;
        self.sink.write_all(line)?;
        self.sink.write_all(b"\n")
    }

    /// How many distinct query ids were loaded
    pub fn query_count(&mut self, queries: &QuerySet) -> io::Result<()> {
        if self.verbose {
            writeln!(self.sink, "there are {} query ids", queries.len())?;
        }
        Ok(())
    }

    /// How many subject lines were selected, and (unless the selection was
    /// inverted) which query ids no subject line matched.
    pub fn summary(&mut self, summary: &Summary, queries: &QuerySet) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        writeln!(self.sink, "found {} records in subject file", summary.selected)?;
        if summary.selection.is_inverted() {
            return self.sink.flush();
        }
        let not_found: Vec<&[u8]> = queries.not_found().collect();
        if !not_found.is_empty() {
            let n = not_found.len();
            writeln!(self.sink, "\nthe following {n} query ids were not found in the subject file:")?;
            for key in not_found {
                self.sink.write_all(key)?;
                self.sink.write_all(b"\n")?;
            }
        }
        self.sink.flush()
    }
}
