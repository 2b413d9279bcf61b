//! This module contains the hand-off between one accepted connection and the
//! dispatch layer which produces responses.  Each connection is owned by
//! exactly one worker for its whole life.

use super::config::Config;
use super::error::Error;
use super::request::{
    RequestHead,
    RequestHeadAssembler,
};
use super::stream::ByteStreamReader;
use std::io::Read;

/// Receives each parsed request head, along with a reader positioned at the
/// first byte after the head.
pub trait Dispatch {
    fn dispatch(
        &mut self,
        head: &RequestHead,
        body: &mut dyn Read,
    ) -> std::io::Result<()>;
}

impl<F> Dispatch for F
where
    F: FnMut(&RequestHead, &mut dyn Read) -> std::io::Result<()>,
{
    fn dispatch(
        &mut self,
        head: &RequestHead,
        body: &mut dyn Read,
    ) -> std::io::Result<()> {
        self(head, body)
    }
}

/// What happened to one request on a connection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Processed {
    /// A request head was read and handed to the dispatcher.
    Dispatched,

    /// The peer closed the connection without sending a request.
    Empty,
}

/// One client connection together with the parsing buffers dedicated to it.
pub struct Connection<R> {
    assembler: RequestHeadAssembler,
    reader: ByteStreamReader<R>,
}

impl<R> Connection<R>
where
    R: Read,
{
    /// Release the underlying stream.  Safe to call more than once.
    pub fn close(&mut self) {
        self.reader.close();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.reader.is_closed()
    }

    #[must_use]
    pub fn new(
        stream: R,
        config: Config,
    ) -> Self {
        Self {
            reader: ByteStreamReader::new(stream, config.buffer_size),
            assembler: RequestHeadAssembler::new(config),
        }
    }

    /// Read one request head and pass it to the dispatcher.
    ///
    /// # Errors
    ///
    /// Any parse error is returned without calling the dispatcher.  Errors
    /// returned by the dispatcher are passed back as [`Error::Io`].
    pub fn process<D>(
        &mut self,
        dispatcher: &mut D,
    ) -> Result<Processed, Error>
    where
        D: Dispatch + ?Sized,
    {
        let head = match self.assembler.read_head(&mut self.reader)? {
            Some(head) => head,
            None => return Ok(Processed::Empty),
        };
        dispatcher.dispatch(head, &mut self.reader)?;
        Ok(Processed::Dispatched)
    }

    /// Read the next request head without dispatching it.
    pub fn read_head(&mut self) -> Result<Option<&RequestHead>, Error> {
        self.assembler.read_head(&mut self.reader)
    }

    /// Process one request and close the connection, whatever the outcome.
    /// A malformed request closes the connection without any response.
    pub fn serve<D>(
        mut self,
        dispatcher: &mut D,
    ) -> Result<Processed, Error>
    where
        D: Dispatch + ?Sized,
    {
        let result = self.process(dispatcher);
        match &result {
            Ok(Processed::Dispatched) => (),
            Ok(Processed::Empty) => {
                tracing::debug!("connection closed before any request");
            },
            Err(Error::Io(error)) => {
                tracing::warn!(error = %error, "connection failed");
            },
            Err(error) => {
                tracing::warn!(error = %error, "dropping malformed request");
            },
        }
        self.close();
        result
    }
}
