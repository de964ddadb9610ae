//! Provides the `open` function, which returns a line-by-line reader for the
//! query file or the subject file, and the `LineSource` trait that the query
//! loader and the line filter read through.
use anyhow::{bail, Context, Result};
use bstr::io::BufReadExt;
use bstr::ByteSlice;
use encoding_rs::Encoding;
use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};
use std::{
    fs::File,
    io::{self, BufReader, Read},
    ops::FnMut,
    path::Path,
};

/// The query loader and the line filter only need their input to implement
/// `for_byte_line`. The `LineSource` trait codifies that.
pub trait LineSource {
    /// The call `o.for_byte_line(|line| ...)` calls the given closure for each
    /// line in `o`, line terminator included. An error returned by the closure
    /// stops the iteration.
    fn for_byte_line(self, for_each_line: impl FnMut(&[u8]) -> io::Result<()>) -> Result<()>;
}

/// Is `path` the conventional name for standard input?
#[must_use]
pub fn is_stdin(path: Option<&Path>) -> bool {
    path.map_or(true, |p| p.as_os_str() == "-")
}

/// Look up an encoding by its WHATWG label (`utf-16le`, `latin1`, `sjis`, ...)
pub fn encoding_for(label: &str) -> Result<&'static Encoding> {
    match Encoding::for_label(label.trim().as_bytes()) {
        Some(encoding) => Ok(encoding),
        None => bail!("Unknown encoding: {label}"),
    }
}

/// Open the file at `path` for reading, or standard input if `path` is `None`
/// or `-`.
pub fn open(path: Option<&Path>, encoding: Option<&'static Encoding>) -> Result<Input> {
    match path {
        Some(path) if !is_stdin(Some(path)) => {
            let path_display = format!("{}", path.display());
            let file = File::open(path)
                .with_context(|| format!("Can't open file: {path_display}"))?;
            let source: Box<dyn Read> = Box::new(file);
            Ok(Operand::new(path_display, source, encoding))
        }
        _ => {
            let source: Box<dyn Read> = Box::new(io::stdin());
            Ok(Operand::new("standard input".to_string(), source, encoding))
        }
    }
}

/// The operand type returned by `open`
pub type Input = Operand<Box<dyn Read>>;

/// An `Operand` is a buffered reader with the ability to decode UTF-16 input,
/// along with a display name for error messages.
///
/// * `T` - The type of the data being read
pub struct Operand<T: Read> {
    path_display: String,
    reader: BufReader<DecodeReaderBytes<T, Vec<u8>>>,
}

impl<T: Read> Operand<T> {
    /// Wrap `source`. With no `encoding`, the reader looks at the Byte Order
    /// Mark to detect UTF-16 and convert it to UTF-8, and passes anything else
    /// through unchanged. With an `encoding`, input is decoded from it.
    pub fn new(path_display: String, source: T, encoding: Option<&'static Encoding>) -> Self {
        let reader = BufReader::new(
            DecodeReaderBytesBuilder::new()
                .encoding(encoding)
                .bom_sniffing(true) // Look at the BOM to detect UTF-16 files and convert to UTF-8
                .strip_bom(true) // Remove the BOM before sending data to us
                .utf8_passthru(true) // Don't enforce UTF-8 (BOM or no BOM)
                .build(source),
        );
        Operand { path_display, reader }
    }
}

impl<T: Read> LineSource for Operand<T> {
    /// A convenience wrapper around `bstr::for_byte_line_with_terminator`
    fn for_byte_line(self, mut for_each_line: impl FnMut(&[u8]) -> io::Result<()>) -> Result<()> {
        let Operand { path_display, mut reader } = self;
        reader
            .for_byte_line_with_terminator(|line| {
                for_each_line(line)?;
                Ok(true)
            })
            .with_context(|| format!("Error reading {path_display}"))?;
        Ok(())
    }
}

/// In-memory text is a `LineSource` too; each line keeps its terminator.
impl LineSource for &[u8] {
    fn for_byte_line(self, mut for_each_line: impl FnMut(&[u8]) -> io::Result<()>) -> Result<()> {
        for line in self.lines_with_terminator() {
            for_each_line(line)?;
        }
        Ok(())
    }
}

#[allow(clippy::pedantic)]
#[cfg(test)]
mod test {
    use super::*;
    use assert_fs::{prelude::*, TempDir};
    use std::path::PathBuf;

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

    fn collect(source: impl LineSource) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        source
            .for_byte_line(|line| {
                lines.push(line.to_vec());
                Ok(())
            })
            .unwrap();
        lines
    }

    fn operand<'a>(bytes: &'a [u8], encoding: Option<&'static Encoding>) -> Operand<&'a [u8]> {
        Operand::new("test".to_string(), bytes, encoding)
    }

    #[test]
    fn lines_keep_their_terminators() {
        let lines = collect(operand(b"A 1\r\nB 2\nC 3", None));
        assert_eq!(lines, vec![b"A 1\r\n".to_vec(), b"B 2\n".to_vec(), b"C 3".to_vec()]);
    }

    #[test]
    fn utf_16le_is_translated_to_utf8() {
        let expected = "The cute red crab\n jumps over the lazy blue gopher\n";
        let utf16 = to_utf_16le(expected);
        let lines = collect(operand(&utf16, None));
        assert_eq!(lines.concat(), expected.as_bytes());
    }

    #[test]
    fn utf_16be_is_translated_to_utf8() {
        let expected = "The cute red crab\n jumps over the lazy blue gopher\n";
        let utf16 = to_utf_16be(expected);
        let lines = collect(operand(&utf16, None));
        assert_eq!(lines.concat(), expected.as_bytes());
    }

    #[test]
    fn a_utf8_bom_is_stripped() {
        let lines = collect(operand(b"\xEF\xBB\xBFA 1\n", None));
        assert_eq!(lines, vec![b"A 1\n".to_vec()]);
    }

    #[test]
    fn an_explicit_encoding_is_decoded() {
        let latin1 = encoding_for("latin1").unwrap();
        let lines = collect(operand(b"caf\xE9 1\n", Some(latin1)));
        assert_eq!(lines, vec!["café 1\n".as_bytes().to_vec()]);
        assert!(encoding_for("no-such-encoding").is_err());
    }

    #[test]
    fn in_memory_text_is_a_line_source() {
        let text: &[u8] = b"x\ny\n";
        assert_eq!(collect(text), vec![b"x\n".to_vec(), b"y\n".to_vec()]);
    }

    #[test]
    fn dash_means_standard_input() {
        assert!(is_stdin(None));
        assert!(is_stdin(Some(Path::new("-"))));
        assert!(!is_stdin(Some(Path::new("subject.txt"))));
    }

    #[test]
    fn open_reads_files_and_reports_missing_ones() {
        let temp = TempDir::new().unwrap();
        let subject = temp.child("subject.txt");
        subject.write_str("A 1\nB 2\n").unwrap();
        let path = PathBuf::from(subject.path());
        assert_eq!(collect(open(Some(path.as_path()), None).unwrap()).len(), 2);

        let missing = temp.path().join("missing.txt");
        let err = open(Some(missing.as_path()), None).err().unwrap();
        assert!(err.to_string().starts_with("Can't open file:"));
    }
}
