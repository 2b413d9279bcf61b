use super::buffer::latin1;
use super::config::Config;
use super::cookie::{
    parse_cookie_header,
    Cookie,
};
use super::error::Error;
use super::header::{
    HeaderField,
    ScanStatus,
};
use super::header_table::HeaderTable;
use super::normalize::{
    normalize,
    NormalizedPath,
};
use super::request_line::RequestLine;
use super::stream::ByteStreamReader;
use std::borrow::Cow;
use std::io::Read;

// If the target is an absolute URI, drop the scheme and authority, leaving
// only the path (which may be empty).
fn strip_scheme_and_authority(uri: &str) -> &str {
    if uri.starts_with('/') {
        return uri;
    }
    match uri.find("://") {
        Some(scheme_end) => {
            let authority = &uri[scheme_end + 3..];
            match authority.find('/') {
                Some(path_start) => &authority[path_start..],
                None => "",
            }
        },
        None => uri,
    }
}

// Remove a `;<parameter>=<id>` segment from the path, returning the
// remaining path and the id.
fn split_session_id<'a>(
    uri: &'a str,
    marker: &str,
) -> (Cow<'a, str>, Option<&'a str>) {
    match uri.find(marker) {
        Some(start) => {
            let rest = &uri[start + marker.len()..];
            let (id, rest) = match rest.find(';') {
                Some(end) => (&rest[..end], &rest[end..]),
                None => (rest, ""),
            };
            (Cow::Owned(format!("{}{}", &uri[..start], rest)), Some(id))
        },
        None => (Cow::Borrowed(uri), None),
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|value| value.strip_suffix('"'))
        .unwrap_or(value)
}

/// Headers which the assembler interprets as well as stores.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpecialHeader {
    ContentLength,
    ContentType,
    Cookie,
}

impl SpecialHeader {
    /// Look up a header name, which must already be lowercase.
    #[must_use]
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"content-length" => Some(SpecialHeader::ContentLength),
            b"content-type" => Some(SpecialHeader::ContentType),
            b"cookie" => Some(SpecialHeader::Cookie),
            _ => None,
        }
    }
}

/// Where the session identifier requested by the client came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionIdOrigin {
    Cookie,
    Url,
}

/// The parsed head of one HTTP request, handed to the dispatch layer.
#[derive(Clone, Debug)]
pub struct RequestHead {
    content_length: Option<u64>,
    content_type: Option<String>,
    cookies: Vec<Cookie>,
    headers: HeaderTable,
    method: String,
    path: NormalizedPath,
    protocol: String,
    query_string: Option<String>,
    request_uri: String,
    session_id: Option<String>,
    session_id_origin: Option<SessionIdOrigin>,
}

impl RequestHead {
    /// The `charset` parameter of the `Content-Type` header, if any.
    #[must_use]
    pub fn character_encoding(&self) -> Option<&str> {
        let content_type = self.content_type.as_deref()?;
        let (_, parameters) = content_type.split_once(';')?;
        parameters
            .split(';')
            .filter_map(|parameter| parameter.split_once('='))
            .find_map(|(name, value)| {
                if name.trim().eq_ignore_ascii_case("charset") {
                    Some(unquote(value.trim()))
                } else {
                    None
                }
            })
    }

    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Every cookie from every `Cookie` header, in the order received.
    #[must_use]
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Value of the first header with the given name, decoded as ISO-8859-1.
    #[must_use]
    pub fn header_value<T>(
        &self,
        name: T,
    ) -> Option<String>
    where
        T: AsRef<[u8]>,
    {
        self.headers.get_value(name).map(latin1)
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderTable {
        &self.headers
    }

    /// Server name and port from the `Host` header.  The port is `None` if
    /// it is absent or not a valid number.
    #[must_use]
    pub fn host(&self) -> Option<(&str, Option<u16>)> {
        let host = std::str::from_utf8(self.headers.get_value("host")?).ok()?.trim();
        match host.rfind(':') {
            Some(delimiter) if !host[delimiter..].contains(']') => Some((
                host[..delimiter].trim_end(),
                host[delimiter + 1..].trim_start().parse().ok(),
            )),
            _ => Some((host, None)),
        }
    }

    /// Returns `true` for HTTP/0.9 requests, which have no protocol token
    /// and no headers.
    #[must_use]
    pub fn is_http09(&self) -> bool {
        self.protocol.is_empty() || self.protocol.starts_with("HTTP/0")
    }

    #[must_use]
    pub fn is_http11(&self) -> bool {
        self.protocol == "HTTP/1.1"
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            content_length: None,
            content_type: None,
            cookies: Vec::new(),
            headers: HeaderTable::new(config),
            method: String::new(),
            path: NormalizedPath::root(),
            protocol: String::new(),
            query_string: None,
            request_uri: String::new(),
            session_id: None,
            session_id_origin: None,
        }
    }

    /// The request path after normalization, safe to resolve against the
    /// document root.
    #[must_use]
    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Everything after the first `?` of the request target.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_deref()
    }

    pub fn recycle(&mut self) {
        self.content_length = None;
        self.content_type = None;
        self.cookies.clear();
        self.headers.recycle();
        self.method.clear();
        self.path = NormalizedPath::root();
        self.protocol.clear();
        self.query_string = None;
        self.request_uri.clear();
        self.session_id = None;
        self.session_id_origin = None;
    }

    /// The path of the request target before normalization, with any query
    /// string, scheme, authority and session id removed.
    #[must_use]
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    #[must_use]
    pub fn requested_session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    #[must_use]
    pub fn session_id_origin(&self) -> Option<SessionIdOrigin> {
        self.session_id_origin
    }

    #[must_use]
    pub fn is_requested_session_id_from_cookie(&self) -> bool {
        self.session_id_origin == Some(SessionIdOrigin::Cookie)
    }

    #[must_use]
    pub fn is_requested_session_id_from_url(&self) -> bool {
        self.session_id_origin == Some(SessionIdOrigin::Url)
    }
}

/// Reads request heads off one connection.
///
/// The assembler owns every buffer used while parsing, so one assembler
/// per connection reuses the same storage for each request it reads.  It
/// must not be shared between connections.
pub struct RequestHeadAssembler {
    config: Config,
    field: HeaderField,
    head: RequestHead,
    line: RequestLine,
    session_marker: String,
}

impl RequestHeadAssembler {
    fn apply_special_header(&mut self) -> Result<(), Error> {
        let special = match SpecialHeader::from_name(self.field.name.as_bytes()) {
            Some(special) => special,
            None => return Ok(()),
        };
        let value = self.field.value.to_latin1();
        match special {
            SpecialHeader::ContentLength => {
                // The field was already added to the table, so a second
                // one shows up here.
                self.head.headers.get_unique_value(&self.field.name)?;
                let content_length = value
                    .trim_end()
                    .parse::<u64>()
                    .map_err(Error::InvalidContentLength)?;
                self.head.content_length = Some(content_length);
            },
            SpecialHeader::ContentType => {
                if self.head.content_type.is_none() {
                    self.head.content_type = Some(value);
                }
            },
            SpecialHeader::Cookie => {
                for cookie in parse_cookie_header(&value) {
                    if self.head.session_id.is_none()
                        && cookie.name.eq_ignore_ascii_case(&self.config.session_parameter)
                    {
                        self.head.session_id = Some(cookie.value.clone());
                        self.head.session_id_origin = Some(SessionIdOrigin::Cookie);
                    }
                    self.head.cookies.push(cookie);
                }
            },
        }
        Ok(())
    }

    #[must_use]
    pub fn new(config: Config) -> Self {
        let session_marker = format!(";{}=", config.session_parameter);
        Self {
            field: HeaderField::new(&config),
            head: RequestHead::new(&config),
            line: RequestLine::new(&config),
            config,
            session_marker,
        }
    }

    fn parse_request_line(&mut self) -> Result<(), Error> {
        if self.line.method.is_empty() {
            return Err(Error::MissingMethod);
        }
        if self.line.uri.is_empty() {
            return Err(Error::MissingRequestUri);
        }
        let head = &mut self.head;
        head.method
            .extend(self.line.method.as_bytes().iter().map(|&b| char::from(b)));
        head.protocol
            .extend(self.line.protocol.as_bytes().iter().map(|&b| char::from(b)));

        let target = String::from_utf8_lossy(self.line.uri.as_bytes());
        let path = match target.find('?') {
            Some(delimiter) => {
                head.query_string = Some(target[delimiter + 1..].to_string());
                &target[..delimiter]
            },
            None => &target[..],
        };
        let path = strip_scheme_and_authority(path);
        let (path, session_id) = split_session_id(path, &self.session_marker);
        if let Some(session_id) = session_id {
            head.session_id = Some(session_id.to_string());
            head.session_id_origin = Some(SessionIdOrigin::Url);
        }
        head.path = normalize(&path)?;
        head.request_uri.push_str(&path);
        Ok(())
    }

    /// Read the next request head from the given reader.
    ///
    /// Returns `Ok(None)` if the connection closed before a request began.
    /// Any error is fatal for the request; the connection should then be
    /// closed without a response.
    pub fn read_head<R>(
        &mut self,
        reader: &mut ByteStreamReader<R>,
    ) -> Result<Option<&RequestHead>, Error>
    where
        R: Read,
    {
        self.recycle();
        match self.line.read_from(reader) {
            Err(Error::EmptyRequest) => return Ok(None),
            result => result?,
        }
        self.parse_request_line()?;
        tracing::trace!(
            method = %self.head.method,
            path = %self.head.path,
            protocol = %self.head.protocol,
            "request line"
        );
        if !self.head.is_http09() {
            self.read_headers(reader)?;
        }
        Ok(Some(&self.head))
    }

    fn read_headers<R>(
        &mut self,
        reader: &mut ByteStreamReader<R>,
    ) -> Result<(), Error>
    where
        R: Read,
    {
        while self.field.read_from(reader)? == ScanStatus::Field {
            if self.field.name.is_empty() {
                return Err(Error::MalformedHeader);
            }
            self.head
                .headers
                .add_value(self.field.name.as_bytes())?
                .extend_from_slice(self.field.value.as_bytes())
                .map_err(|_| Error::HeaderValueTooLong)?;
            self.apply_special_header()?;
        }
        tracing::debug!(count = self.head.headers.len(), "request headers");
        Ok(())
    }

    /// Reset every buffer for the next request, keeping their storage.
    pub fn recycle(&mut self) {
        self.line.recycle();
        self.field.recycle();
        self.head.recycle();
    }
}
