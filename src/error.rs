/// This is the enumeration of all the different kinds of errors which this
/// crate generates.  Every variant except
/// [`EmptyRequest`](#variant.EmptyRequest) is fatal for the request being
/// parsed; the connection carrying it should be closed without a response.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Duplicate header fields were found where exactly one was expected.
    #[error("more than one `{0}` header present")]
    DuplicateHeader(String),

    /// The connection closed before any request bytes arrived.  This is not
    /// really a failure; the request should be silently dropped.
    #[error("empty request")]
    EmptyRequest,

    /// A header line ended before the colon separating the field name from
    /// its value.
    #[error("header line has no colon")]
    HeaderLineMissingColon,

    /// A header field name exceeded its maximum size.
    #[error("header name too long")]
    HeaderNameTooLong,

    /// The connection closed before the blank line ending the header block.
    #[error("connection closed before end of headers")]
    HeadersIncomplete,

    /// A header field value exceeded its maximum size.
    #[error("header value too long")]
    HeaderValueTooLong,

    /// The `Content-Length` header value is not valid.
    #[error("invalid Content-Length header value")]
    InvalidContentLength(#[source] std::num::ParseIntError),

    /// The attached request target could not be normalized into a path
    /// confined to the document root.
    #[error("invalid or unsafe request path `{0}`")]
    InvalidPath(String),

    /// Reading from the underlying connection failed.
    #[error("connection read failed")]
    Io(#[from] std::io::Error),

    /// A header field was malformed (for example, a value with no name, or a
    /// line starting with a carriage return not followed by a line feed).
    #[error("invalid HTTP header format")]
    MalformedHeader,

    /// The connection closed in the middle of the request line.
    #[error("malformed request line")]
    MalformedRequestLine,

    /// The method token exceeded its maximum size.
    #[error("method too long")]
    MethodTooLong,

    /// The request line had no method.
    #[error("missing HTTP request method")]
    MissingMethod,

    /// The request line had no target URI.
    #[error("missing HTTP request URI")]
    MissingRequestUri,

    /// The protocol token exceeded its maximum size.
    #[error("protocol too long")]
    ProtocolTooLong,

    /// The request target exceeded its maximum size.
    #[error("request URI too long")]
    RequestUriTooLong,

    /// Adding another header field would exceed the configured maximum
    /// number of fields, which is attached.
    #[error("more than {0} header fields")]
    TooManyHeaders(usize),
}

impl Error {
    /// Returns `true` for the null request condition, which callers should
    /// treat as a no-op rather than a failure.
    #[must_use]
    pub fn is_empty_request(&self) -> bool {
        matches!(self, Error::EmptyRequest)
    }
}
