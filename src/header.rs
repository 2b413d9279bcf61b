use super::buffer::TokenBuffer;
use super::config::{
    Config,
    TokenLimits,
};
use super::error::Error;
use super::stream::ByteStreamReader;
use super::{
    COLON,
    CR,
    HT,
    LF,
    SP,
};
use std::io::Read;

/// Outcome of scanning for one header field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScanStatus {
    /// The blank line ending the header block was consumed.
    EndOfHeaders,

    /// One header field was read.
    Field,
}

/// One header field: a lowercase name and its value.
#[derive(Clone, Debug)]
pub struct HeaderField {
    pub name: TokenBuffer,
    pub value: TokenBuffer,
}

impl HeaderField {
    /// Returns `true` if this field's name matches the given name, ignoring
    /// ASCII case.
    #[must_use]
    pub fn is_named<T>(
        &self,
        name: T,
    ) -> bool
    where
        T: AsRef<[u8]>,
    {
        self.name.as_bytes().eq_ignore_ascii_case(name.as_ref())
    }

    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_limits(config.header_name, config.header_value)
    }

    /// Scan one header field from the given reader.
    ///
    /// The field name is folded to lowercase as it is read.  Whitespace
    /// between the colon and the value is skipped, as are carriage returns
    /// within the value.  A line starting with a space or tab continues the
    /// value of the field before it, joined by a single space.  A carriage
    /// return starting a line must be followed by a line feed.
    pub fn read_from<R>(
        &mut self,
        reader: &mut ByteStreamReader<R>,
    ) -> Result<ScanStatus, Error>
    where
        R: Read,
    {
        self.recycle();
        match reader.read_byte()? {
            Some(CR) => {
                return match reader.read_byte()? {
                    Some(LF) => Ok(ScanStatus::EndOfHeaders),
                    Some(_) => Err(Error::MalformedHeader),
                    None => Err(Error::HeadersIncomplete),
                };
            },
            Some(LF) => return Ok(ScanStatus::EndOfHeaders),
            Some(_) => reader.unread_byte()?,
            None => return Err(Error::HeadersIncomplete),
        }
        self.read_name(reader)?;
        loop {
            skip_whitespace(reader)?;
            self.read_value_line(reader)?;
            match reader.peek_byte()? {
                Some(SP) | Some(HT) => {
                    self.value.push(SP).map_err(|_| Error::HeaderValueTooLong)?;
                },
                _ => return Ok(ScanStatus::Field),
            }
        }
    }

    fn read_name<R>(
        &mut self,
        reader: &mut ByteStreamReader<R>,
    ) -> Result<(), Error>
    where
        R: Read,
    {
        loop {
            match reader.read_byte()? {
                Some(COLON) => return Ok(()),
                Some(CR) | Some(LF) | None => return Err(Error::HeaderLineMissingColon),
                Some(byte) => {
                    self.name
                        .push(byte.to_ascii_lowercase())
                        .map_err(|_| Error::HeaderNameTooLong)?;
                },
            }
        }
    }

    fn read_value_line<R>(
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
                Some(byte) => self.value.push(byte).map_err(|_| Error::HeaderValueTooLong)?,
                None => return Err(Error::HeadersIncomplete),
            }
        }
    }

    pub fn recycle(&mut self) {
        self.name.recycle();
        self.value.recycle();
    }

    #[must_use]
    pub fn with_limits(
        name: TokenLimits,
        value: TokenLimits,
    ) -> Self {
        Self {
            name: TokenBuffer::new(name),
            value: TokenBuffer::new(value),
        }
    }
}

fn skip_whitespace<R>(reader: &mut ByteStreamReader<R>) -> Result<(), Error>
where
    R: Read,
{
    loop {
        match reader.read_byte()? {
            Some(SP) | Some(HT) => (),
            Some(_) => return reader.unread_byte(),
            None => return Err(Error::HeadersIncomplete),
        }
    }
}
