//! The `extract` function is the kernel of the application. The `args` module
//! parses the command line, the `operands` module hides input details, and
//! `query` and `filter` hold the two halves of the work: loading the query ids,
//! then streaming the subject past them.
//!
//! Current Limitations:
//! * In `--sort-by-query-order` mode every matched line is held in memory until
//!   the subject has been read, so memory use grows with the number of matches.
//! * A "line" is split on `\n`; a lone `\r` is not a line terminator.

#![cfg_attr(debug_assertions, allow(dead_code, unused_imports))]
#![deny(unused_must_use)]
#![deny(clippy::all)]
#![allow(clippy::needless_return)]
#![deny(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![deny(missing_docs)]

use anyhow::Result;
use std::io::Write;
use tracing::debug;

pub mod args;
pub mod fields;
pub mod filter;
pub mod operands;
pub mod query;
pub mod report;

use crate::args::{Args, QuerySource};
use crate::filter::{filter, Summary};
use crate::query::QuerySet;
use crate::report::Reporter;

/// Loads the query ids named by `args`, then prints to `out` the subject lines
/// that `args.selection` asks for. Notices about unusable query lines, and
/// with `args.verbose` the match statistics, go to `diagnostics`.
pub fn extract(args: &Args, out: impl Write, diagnostics: impl Write) -> Result<Summary> {
    let mut reporter = Reporter::new(diagnostics, args.verbose);

    let mut queries = match &args.queries {
        QuerySource::Ids(ids) => QuerySet::from_ids(ids),
        QuerySource::File(path) => {
            let source = operands::open(Some(path.as_path()), args.encoding)?;
            QuerySet::from_lines(source, &args.query_splitter, &mut reporter)?
        }
    };
    reporter.query_count(&queries)?;

    let subject = operands::open(args.subject.as_deref(), args.encoding)?;
    debug!(subject = ?args.subject, "opened subject");
    let summary = filter(subject, &mut queries, &args.subject_splitter, args.selection, out)?;

    reporter.summary(&summary, &queries)?;
    Ok(summary)
}
