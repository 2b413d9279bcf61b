#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

//! Reads the head of HTTP/1.x requests (request line and headers) directly
//! off a blocking connection, and normalizes request paths so they can be
//! resolved safely against a document root.

mod buffer;
mod config;
mod connection;
mod cookie;
mod error;
mod header;
mod header_table;
mod normalize;
mod request;
mod request_line;
mod stream;

pub use crate::buffer::{
    Overflow,
    TokenBuffer,
};
pub use crate::config::{
    Config,
    TokenLimits,
};
pub use crate::connection::{
    Connection,
    Dispatch,
    Processed,
};
pub use crate::cookie::{
    parse_cookie_header,
    Cookie,
};
pub use crate::error::Error;
pub use crate::header::{
    HeaderField,
    ScanStatus,
};
pub use crate::header_table::{
    HeaderTable,
    Names,
    Values,
};
pub use crate::normalize::{
    normalize,
    NormalizedPath,
};
pub use crate::request::{
    RequestHead,
    RequestHeadAssembler,
    SessionIdOrigin,
    SpecialHeader,
};
pub use crate::request_line::RequestLine;
pub use crate::stream::ByteStreamReader;

// These are the bytes with special meaning in the request line and header
// block.  Lines officially end in a carriage return (CR) followed by a line
// feed (LF), but a bare LF is accepted as well.
const CR: u8 = b'\r';
const LF: u8 = b'\n';
const SP: u8 = b' ';
const HT: u8 = b'\t';
const COLON: u8 = b':';
const NUL: u8 = 0;
