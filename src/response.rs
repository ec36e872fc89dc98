//! The CGI response: a header section, one blank line, then the body.
//!
//! The two phases are two types. `Response` only writes header lines;
//! `start_body` consumes it, writes the separator, and hands back a
//! `BodyWriter`. There is no way to write body bytes before the separator,
//! or to write a second separator.

use std::io::{self, Write};

use crate::{Error, Result};

const SEPARATOR: &[u8] = b"\r\n";

/// Header phase of a response.
pub struct Response<W: Write> {
    sink: W,
    has_content_type: bool,
}

impl<W: Write> Response<W> {
    pub fn new(sink: W) -> Response<W> {
        Response { sink, has_content_type: false }
    }

    /// Writes one `Name: Value` header line.
    pub fn header(&mut self, name: &str, value: &str) -> Result<&mut Self> {
        if !valid_header_name(name) || value.contains(&['\r', '\n'][..]) {
            return Err(Error::InvalidHeader { name: name.to_owned() })
        }
        if name.eq_ignore_ascii_case("Content-Type") {
            self.has_content_type = true;
        }
        self.sink.write_all(name.as_bytes())?;
        self.sink.write_all(b": ")?;
        self.sink.write_all(value.as_bytes())?;
        self.sink.write_all(SEPARATOR)?;
        Ok(self)
    }

    pub fn content_type(&mut self, value: &str) -> Result<&mut Self> {
        self.header("Content-Type", value)
    }

    /// Ends the header section. If no `Content-Type` was given, declares
    /// `text/html`.
    pub fn start_body(mut self) -> Result<BodyWriter<W>> {
        if !self.has_content_type {
            self.content_type("text/html")?;
        }
        self.sink.write_all(SEPARATOR)?;
        Ok(BodyWriter { sink: self.sink, pending: Vec::new() })
    }
}

fn valid_header_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| b.is_ascii_graphic() && b != b':')
}

/// Body phase of a response.
///
/// Writes are buffered. `flush` passes the buffer on, except for the tail of
/// a UTF-8 character that hasn't been completely written yet, so that what
/// the invoker has received at any moment ends on a character boundary.
pub struct BodyWriter<W: Write> {
    sink: W,
    pending: Vec<u8>,
}

impl<W: Write> BodyWriter<W> {
    /// Writes out everything, flushes, and gives the sink back.
    pub fn finish(mut self) -> Result<W> {
        self.sink.write_all(&self.pending)?;
        self.pending.clear();
        self.sink.flush()?;
        Ok(self.sink)
    }

    pub fn get_ref(&self) -> &W { &self.sink }
}

impl<W: Write> Write for BodyWriter<W> {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(bytes);
        Ok(bytes.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        let ready = complete_prefix(&self.pending);
        self.sink.write_all(&self.pending[..ready])?;
        self.pending.drain(..ready);
        self.sink.flush()
    }
}

/// Length of the longest prefix of `bytes` that does not end partway through
/// a UTF-8 sequence. Bytes that can never be UTF-8 don't hold anything back.
fn complete_prefix(bytes: &[u8]) -> usize {
    let mut start = 0;
    loop {
        match std::str::from_utf8(&bytes[start..]) {
            Ok(_) => return bytes.len(),
            Err(e) => match e.error_len() {
                // Truncated sequence at the very end.
                None => return start + e.valid_up_to(),
                Some(n) => start += e.valid_up_to() + n,
            },
        }
    }
}
