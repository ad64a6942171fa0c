//! Streaming reader over a KCDC text export.
//!
//! The first line is taken as the header and kept verbatim (the field-augmentation
//! output repeats it). Every following non-blank line yields one
//! [`EventRecord`](crate::events::EventRecord). Records are produced lazily so arbitrarily
//! large exports are processed in constant memory.
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

use camino::Utf8Path;
use log::warn;

use crate::events::EventRecord;
use crate::kcdc_errors::KcdcError;

/// Iterator over the records of a KCDC export.
///
/// Each item carries the 1-based line number of the record in the source.
///
/// Lines are read as raw bytes. A line that is not valid UTF-8 is decoded lossily: in
/// lenient mode the damaged token fails its numeric parse and the usual zero-fill
/// applies; in strict mode the line is rejected with [`KcdcError::InvalidRecord`].
pub struct EventReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    header: String,
    line_number: u64,
    strict: bool,
}

impl EventReader<BufReader<File>> {
    /// Open a KCDC file and consume its header line.
    ///
    /// Errors
    /// ----------
    /// * [`KcdcError::OpenFile`] if the file cannot be opened.
    /// * [`KcdcError::MissingHeader`] if the file is empty.
    pub fn open(path: &Utf8Path, strict: bool) -> Result<Self, KcdcError> {
        let file = File::open(path).map_err(|source| KcdcError::OpenFile {
            path: path.to_string(),
            source,
        })?;
        EventReader::new(BufReader::new(file), path.as_str(), strict)
    }
}

/// Read one line into `buf` without its `\n` / `\r\n` terminator.
///
/// Return `false` at end of input.
fn read_raw_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(false);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(true)
}

impl<R: BufRead> EventReader<R> {
    /// Wrap any buffered source. `source_name` is only used in error messages.
    ///
    /// The header is kept verbatim, undecodable bytes replaced by `U+FFFD`.
    pub fn new(mut reader: R, source_name: &str, strict: bool) -> Result<Self, KcdcError> {
        let mut buf = Vec::new();
        if !read_raw_line(&mut reader, &mut buf)? {
            return Err(KcdcError::MissingHeader(source_name.to_string()));
        }
        let header = String::from_utf8_lossy(&buf).into_owned();

        Ok(EventReader {
            reader,
            buf,
            header,
            line_number: 1,
            strict,
        })
    }

    /// The header line, without its line terminator.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Number of lines consumed so far, header included.
    pub fn lines_read(&self) -> u64 {
        self.line_number
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<(u64, EventRecord), KcdcError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let more = read_raw_line(&mut self.reader, &mut self.buf);
            match more {
                Ok(false) => return None,
                Ok(true) => self.line_number += 1,
                Err(e) => {
                    self.line_number += 1;
                    return Some(Err(e.into()));
                }
            }

            let line = String::from_utf8_lossy(&self.buf);
            if line.trim().is_empty() {
                continue;
            }

            if let Cow::Owned(decoded) = &line {
                if self.strict {
                    return Some(Err(KcdcError::InvalidRecord {
                        line: self.line_number,
                        field: "line",
                        value: decoded.clone(),
                    }));
                }
                warn!("Line {}: invalid UTF-8 replaced before parsing", self.line_number);
            }

            return Some(
                EventRecord::from_line(&line, self.line_number, self.strict)
                    .map(|rec| (self.line_number, rec)),
            );
        }
    }
}
