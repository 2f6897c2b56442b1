//! Line readers for input files

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::{Result, SourceError};

/// Iterator over the lines of one opened file
///
/// Yields each line with its terminator still attached. A `Read` error is
/// the last item: the iterator ends after reporting it.
pub type Lines = Box<dyn Iterator<Item = Result<String>> + Send>;

/// Opens input files as line iterators
pub trait LineSource: Send + Sync {
    /// Open a file for reading
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Open` if the file cannot be opened.
    fn open(&self, path: &Path) -> Result<Lines>;
}

/// Reads gzip-compressed text files
///
/// Concatenated gzip members are read as one stream. Bytes that are not
/// valid UTF-8 are replaced per line instead of failing the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct GzipLineSource;

impl GzipLineSource {
    pub fn new() -> Self {
        Self
    }
}

impl LineSource for GzipLineSource {
    fn open(&self, path: &Path) -> Result<Lines> {
        let file = File::open(path).map_err(|e| SourceError::open(path, e))?;
        Ok(Box::new(GzipLines {
            path: path.to_path_buf(),
            reader: BufReader::new(MultiGzDecoder::new(file)),
            buf: Vec::with_capacity(256),
            done: false,
        }))
    }
}

struct GzipLines {
    path: PathBuf,
    reader: BufReader<MultiGzDecoder<File>>,
    buf: Vec<u8>,
    done: bool,
}

impl Iterator for GzipLines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => Some(Ok(String::from_utf8_lossy(&self.buf).into_owned())),
            Err(e) => {
                self.done = true;
                Some(Err(SourceError::read(&self.path, e)))
            }
        }
    }
}

/// Strip surrounding spaces and line terminators from a raw line
///
/// Tabs are kept on a line with content: a trailing tab delimits an empty
/// last field. A line made only of whitespace, tabs included, trims to an
/// empty string, which means it is blank and should be skipped.
#[inline]
pub fn trim_line(line: &str) -> &str {
    if line.trim().is_empty() {
        return "";
    }
    line.trim_matches(|c| c == ' ' || c == '\r' || c == '\n')
}
