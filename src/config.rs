/// Initial and maximum sizes, in bytes, of one growable token buffer.
/// Buffers start at `initial` and double until they reach `max`; a token
/// longer than `max` is a fatal error for the request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct TokenLimits {
    pub initial: usize,
    pub max: usize,
}

impl TokenLimits {
    #[must_use]
    pub const fn new(initial: usize, max: usize) -> Self {
        Self {
            initial,
            max,
        }
    }
}

/// Parser policy for one connection.  All sizes are in bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Capacity of the fill buffer used to read from the connection.
    pub buffer_size: usize,

    pub method: TokenLimits,
    pub uri: TokenLimits,
    pub protocol: TokenLimits,
    pub header_name: TokenLimits,
    pub header_value: TokenLimits,

    /// Maximum number of header fields in one request, or `None` for no
    /// limit.
    pub max_header_count: Option<usize>,

    /// Name of the URL path parameter and cookie which carry a session
    /// identifier.
    pub session_parameter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            buffer_size: 2048,
            method: TokenLimits::new(8, 1024),
            uri: TokenLimits::new(64, 32768),
            protocol: TokenLimits::new(8, 1024),
            header_name: TokenLimits::new(32, 1024),
            header_value: TokenLimits::new(64, 4096),
            max_header_count: Some(100),
            session_parameter: String::from("jsessionid"),
        }
    }
}
