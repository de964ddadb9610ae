//! Code to parse the command line using `clap`, and definitions of the parsed
//! result

use anyhow::{bail, Result};
use clap::{ArgGroup, CommandFactory, Parser};
use encoding_rs::Encoding;
use std::path::PathBuf;

use crate::fields::{FieldIndex, FieldSplitter, DEFAULT_SEPARATOR};
use crate::filter::Selection;
use crate::operands::{encoding_for, is_stdin};

/// Returns the parsed and checked command line, or `None` if there were no
/// arguments at all, in which case the usage message has been printed.
///
/// Missing or conflicting flags are reported by `clap`, which exits. The
/// remaining checks (separator patterns, standard input used twice) are
/// returned as errors. Either way nothing has been read yet.
pub fn parsed() -> Result<Option<Args>> {
    if std::env::args_os().len() <= 1 {
        CliArgs::command().print_help()?;
        return Ok(None);
    }
    Args::try_from(CliArgs::parse()).map(Some)
}

/// Where the query ids come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    /// Ids given on the command line, used verbatim
    Ids(Vec<String>),
    /// A file with one id per line; `-` is standard input
    File(PathBuf),
}

/// `Args` is the checked command line.
#[derive(Debug)]
pub struct Args {
    /// The query ids, or where to read them
    pub queries: QuerySource,
    /// Splits query file lines and picks the id field
    pub query_splitter: FieldSplitter,
    /// The file to filter; `None` is standard input
    pub subject: Option<PathBuf>,
    /// Splits subject lines and picks the field to look up
    pub subject_splitter: FieldSplitter,
    /// Where selected lines go; `None` is standard output
    pub output: Option<PathBuf>,
    /// Which lines to print, and in what order
    pub selection: Selection,
    /// Print statistics and the ids never found to standard error
    pub verbose: bool,
    /// Decode both inputs from this encoding instead of sniffing for a BOM
    pub encoding: Option<&'static Encoding>,
}

impl TryFrom<CliArgs> for Args {
    type Error = anyhow::Error;
    fn try_from(cli: CliArgs) -> Result<Self> {
        let queries = match cli.query_file {
            Some(path) => QuerySource::File(path),
            None => QuerySource::Ids(cli.query_ids),
        };
        if let QuerySource::File(path) = &queries {
            if is_stdin(Some(path)) && is_stdin(cli.subject_file.as_deref()) {
                bail!("The query file and the subject file can't both be standard input");
            }
        }
        Ok(Args {
            queries,
            query_splitter: FieldSplitter::new(&cli.query_sep, cli.query_field)?,
            subject: cli.subject_file,
            subject_splitter: FieldSplitter::new(&cli.subject_sep, cli.subject_field)?,
            output: cli.output,
            selection: Selection::from_flags(cli.invert, cli.sort_by_query_order)?,
            verbose: cli.verbose,
            encoding: cli.encoding,
        })
    }
}

#[derive(Debug, Parser)]
#[command(name = "extract-lines", version, about)]
#[command(after_help = "Lines end at \\n or \\r\\n; a lone \\r does not end a line.")]
#[command(group(ArgGroup::new("query").required(true).args(["query_ids", "query_file"])))]
/// Print the lines of a subject file whose chosen field is one of a set of
/// query ids.
struct CliArgs {
    /// Query ids, given on the command line
    #[arg(short = 'q', long, num_args = 1.., value_name = "ID")]
    query_ids: Vec<String>,

    /// Read query ids from this file, one per line (`-` for standard input)
    #[arg(short = 'f', long, value_name = "FILE")]
    query_file: Option<PathBuf>,

    /// The lines to filter [default: standard input]
    #[arg(short = 's', long, value_name = "FILE")]
    subject_file: Option<PathBuf>,

    /// Regular expression separating the fields of a query file line
    #[arg(long, value_name = "REGEX", default_value = DEFAULT_SEPARATOR)]
    query_sep: String,

    /// Regular expression separating the fields of a subject line
    #[arg(long, value_name = "REGEX", default_value = DEFAULT_SEPARATOR)]
    subject_sep: String,

    /// Field of a query file line holding the id (0 is the first, -1 the last)
    #[arg(long, value_name = "N", default_value = "0", allow_negative_numbers = true)]
    query_field: FieldIndex,

    /// Field of a subject line to look up (0 is the first, -1 the last)
    #[arg(long, value_name = "N", default_value = "0", allow_negative_numbers = true)]
    subject_field: FieldIndex,

    /// Write selected lines here [default: standard output]
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the lines whose field is *not* a query id
    #[arg(short = 'v', long, conflicts_with = "sort_by_query_order")]
    invert: bool,

    /// Print matches in query id order; the last line matching an id wins
    #[arg(long)]
    sort_by_query_order: bool,

    /// Report match counts and unmatched query ids on standard error
    #[arg(long)]
    verbose: bool,

    /// Decode both inputs from this encoding (e.g. latin1, utf-16le)
    #[arg(long, value_name = "LABEL", value_parser = encoding_for)]
    encoding: Option<&'static Encoding>,
}
