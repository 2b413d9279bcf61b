use super::buffer::TokenBuffer;
use super::config::Config;
use super::error::Error;
use super::stream::ByteStreamReader;
use super::{
    CR,
    LF,
    NUL,
    SP,
};
use std::io::Read;

/// The three tokens of an HTTP request line, scanned straight off the wire
/// into buffers which are reused from one request to the next.
#[derive(Clone, Debug)]
pub struct RequestLine {
    pub method: TokenBuffer,
    pub uri: TokenBuffer,
    pub protocol: TokenBuffer,
}

impl RequestLine {
    /// Returns `true` if the request uses HTTP/0.9 framing, meaning the
    /// request line carried no protocol and no headers follow it.
    #[must_use]
    pub fn is_http09(&self) -> bool {
        self.protocol.is_empty() || self.protocol.as_bytes().starts_with(b"HTTP/0")
    }

    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            method: TokenBuffer::new(config.method),
            uri: TokenBuffer::new(config.uri),
            protocol: TokenBuffer::new(config.protocol),
        }
    }

    /// Scan one request line from the given reader.
    ///
    /// Blank lines ahead of the request are skipped.  If the connection
    /// closes before anything else arrives, [`Error::EmptyRequest`] is
    /// returned.  When the target is followed directly by the end of the
    /// line, the protocol is left empty (HTTP/0.9 framing).  A carriage
    /// return ending the target must be followed by a line feed.
    ///
    /// Empty method or target tokens are not rejected here; that is up to
    /// the caller.
    pub fn read_from<R>(
        &mut self,
        reader: &mut ByteStreamReader<R>,
    ) -> Result<(), Error>
    where
        R: Read,
    {
        self.recycle();
        loop {
            match reader.read_byte()? {
                Some(CR) | Some(LF) => (),
                Some(_) => break,
                None => return Err(Error::EmptyRequest),
            }
        }
        reader.unread_byte()?;
        self.read_method(reader)?;
        if self.read_uri(reader)? {
            self.read_protocol(reader)?;
        }
        Ok(())
    }

    fn read_method<R>(
        &mut self,
        reader: &mut ByteStreamReader<R>,
    ) -> Result<(), Error>
    where
        R: Read,
    {
        loop {
            match reader.read_byte()? {
                Some(SP) | Some(NUL) => return Ok(()),
                Some(CR) | Some(LF) | None => return Err(Error::MalformedRequestLine),
                Some(byte) => self.method.push(byte).map_err(|_| Error::MethodTooLong)?,
            }
        }
    }

    fn read_protocol<R>(
        &mut self,
        reader: &mut ByteStreamReader<R>,
    ) -> Result<(), Error>
    where
        R: Read,
    {
        loop {
            match reader.read_byte()? {
                Some(LF) => return Ok(()),
                Some(CR) => (),
                Some(byte) => self.protocol.push(byte).map_err(|_| Error::ProtocolTooLong)?,
                None => return Err(Error::MalformedRequestLine),
            }
        }
    }

    // Returns whether a protocol token follows the target.
    fn read_uri<R>(
        &mut self,
        reader: &mut ByteStreamReader<R>,
    ) -> Result<bool, Error>
    where
        R: Read,
    {
        loop {
            match reader.read_byte()? {
                Some(SP) => return Ok(true),
                Some(CR) => {
                    return match reader.read_byte()? {
                        Some(LF) => Ok(false),
                        _ => Err(Error::MalformedRequestLine),
                    };
                },
                Some(LF) => return Ok(false),
                Some(byte) => self.uri.push(byte).map_err(|_| Error::RequestUriTooLong)?,
                None => return Err(Error::MalformedRequestLine),
            }
        }
    }

    pub fn recycle(&mut self) {
        self.method.recycle();
        self.uri.recycle();
        self.protocol.recycle();
    }
}
