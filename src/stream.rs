//! This module contains the buffered reader which sits between a raw
//! connection and the request scanners.  Scanners pull one byte at a time
//! from it and may push back a single byte of lookahead.

use super::error::Error;
use std::io::{
    ErrorKind,
    Read,
};

/// Buffered single-byte reader over a connection's input stream.
///
/// The fill buffer has a fixed capacity and is refilled by exactly one read
/// of the underlying stream whenever it is exhausted.  A refill yielding no
/// bytes means the peer closed the connection.
pub struct ByteStreamReader<R> {
    buffer: Vec<u8>,
    count: usize,
    inner: Option<R>,
    position: usize,
}

impl<R> ByteStreamReader<R>
where
    R: Read,
{
    #[must_use]
    pub fn new(
        inner: R,
        buffer_size: usize,
    ) -> Self {
        Self {
            buffer: vec![0; buffer_size.max(1)],
            count: 0,
            inner: Some(inner),
            position: 0,
        }
    }

    /// Release the underlying connection and the fill buffer.  Calling this
    /// more than once has no further effect; reads after closing report
    /// end-of-stream.
    pub fn close(&mut self) {
        self.inner = None;
        self.buffer = Vec::new();
        self.position = 0;
        self.count = 0;
    }

    /// Number of bytes already read from the connection but not yet
    /// consumed.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.count - self.position
    }

    fn fill(&mut self) -> Result<(), Error> {
        self.position = 0;
        self.count = 0;
        if let Some(inner) = &mut self.inner {
            loop {
                match inner.read(&mut self.buffer) {
                    Ok(count) => {
                        self.count = count;
                        break;
                    },
                    Err(error) if error.kind() == ErrorKind::Interrupted => (),
                    Err(error) => return Err(Error::Io(error)),
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get_ref(&self) -> Option<&R> {
        self.inner.as_ref()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Look at the next byte without consuming it.  Returns `None` at
    /// end-of-stream.
    pub fn peek_byte(&mut self) -> Result<Option<u8>, Error> {
        let byte = self.read_byte()?;
        if byte.is_some() {
            self.position -= 1;
        }
        Ok(byte)
    }

    /// Returns the next byte, or `None` once the peer has closed the
    /// connection.
    pub fn read_byte(&mut self) -> Result<Option<u8>, Error> {
        if self.position >= self.count {
            self.fill()?;
            if self.count == 0 {
                return Ok(None);
            }
        }
        let byte = self.buffer[self.position];
        self.position += 1;
        Ok(Some(byte))
    }

    /// Push the most recently read byte back so the next read returns it
    /// again.  There is nothing to push back after end-of-stream, which
    /// means the request was empty or aborted; that is reported as
    /// [`Error::EmptyRequest`].
    pub fn unread_byte(&mut self) -> Result<(), Error> {
        if self.position == 0 {
            return Err(Error::EmptyRequest);
        }
        self.position -= 1;
        Ok(())
    }
}

/// Reading through the `Read` trait first drains whatever is left in the
/// fill buffer, so bytes which arrived together with the request head are
/// not lost to whoever reads the body.
impl<R> Read for ByteStreamReader<R>
where
    R: Read,
{
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> std::io::Result<usize> {
        if self.position < self.count {
            let available = &self.buffer[self.position..self.count];
            let amount = available.len().min(buf.len());
            buf[..amount].copy_from_slice(&available[..amount]);
            self.position += amount;
            return Ok(amount);
        }
        match &mut self.inner {
            Some(inner) => inner.read(buf),
            None => Ok(0),
        }
    }
}
