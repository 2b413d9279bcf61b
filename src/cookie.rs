/// One `name=value` pair sent by the client in a `Cookie` header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new<N, V>(
        name: N,
        value: V,
    ) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Split the value of a `Cookie` header into its cookies, in order.
///
/// Pairs are separated by semicolons.  Whitespace around names and values is
/// trimmed and one pair of double quotes around a value is removed.  Pairs
/// with no `=` or with an empty name are ignored.
#[must_use]
pub fn parse_cookie_header(header: &str) -> Vec<Cookie> {
    header
        .split(';')
        .filter_map(|pair| {
            let delimiter = pair.find('=')?;
            let name = pair[..delimiter].trim();
            if name.is_empty() {
                return None;
            }
            let value = unquote(pair[delimiter + 1..].trim());
            Some(Cookie::new(name, value))
        })
        .collect()
}
