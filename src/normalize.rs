//! This module contains the function which maps a raw request path onto a
//! canonical path confined to the document root.  The result is safe to
//! append to the root directory: it starts with `/`, has no empty, `.` or
//! `..` segments left in it, and never climbs above the root.

use super::error::Error;

// Percent-encoded `%`, `/`, `.` and `\`.  These can only appear as a result
// of double encoding or an attempt to smuggle separators past the segment
// resolution below.
fn contains_encoded_separator(path: &[u8]) -> bool {
    path.windows(3).any(|window| {
        window[0] == b'%'
            && matches!(
                (window[1], window[2].to_ascii_uppercase()),
                (b'2', b'5') | (b'2', b'F') | (b'2', b'E') | (b'5', b'C')
            )
    })
}

/// A request path which has been through [`normalize`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NormalizedPath(String);

impl NormalizedPath {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// The path of the document root itself.
    #[must_use]
    pub fn root() -> Self {
        Self(String::from("/"))
    }
}

impl Default for NormalizedPath {
    fn default() -> Self {
        Self::root()
    }
}

impl AsRef<str> for NormalizedPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for NormalizedPath {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for NormalizedPath {
    fn eq(
        &self,
        other: &&str,
    ) -> bool {
        self.0 == *other
    }
}

/// Normalize the path portion of a request target (the query string must
/// already have been split off).
///
/// Backslashes become slashes, runs of slashes collapse to one, and `.` and
/// `..` segments are resolved.  A leading `/%7E` is decoded to `/~`.
///
/// # Errors
///
/// [`Error::InvalidPath`] is returned if the path contains a percent-encoded
/// `%`, `/`, `.` or `\` (in either case), or if resolving `..` segments
/// would climb above the root.
pub fn normalize(uri: &str) -> Result<NormalizedPath, Error> {
    let reject = || Error::InvalidPath(uri.to_string());
    if contains_encoded_separator(uri.as_bytes()) {
        return Err(reject());
    }

    // Leading slash, backslashes and repeated slashes.
    let mut path = String::with_capacity(uri.len() + 2);
    path.push('/');
    for c in uri.chars() {
        let c = if c == '\\' { '/' } else { c };
        if c == '/' && path.ends_with('/') {
            continue;
        }
        path.push(c);
    }

    // A trailing `.` or `..` segment gets a slash so it is resolved with the
    // others.
    if path.ends_with("/.") || path.ends_with("/..") {
        path.push('/');
    }

    while let Some(index) = path.find("/./") {
        path.replace_range(index..index + 3, "/");
    }

    while let Some(index) = path.find("/../") {
        if index == 0 {
            return Err(reject());
        }
        match path[..index].rfind('/') {
            Some(start) => path.replace_range(start..index + 3, ""),
            None => return Err(reject()),
        }
    }

    if path.starts_with("/%7E") || path.starts_with("/%7e") {
        path.replace_range(1..4, "~");
    }

    if !path.starts_with('/') || path.starts_with("/..") {
        return Err(reject());
    }
    Ok(NormalizedPath(path))
}

#[cfg(test)]
mod tests {

    use super::*;
    use quickcheck::{
        Arbitrary,
        Gen,
        QuickCheck,
    };
    use rstest::rstest;

    #[rstest]
    #[case("/a/../b", "/b")]
    #[case("/a/b/../../c", "/c")]
    #[case("/%7Euser", "/~user")]
    #[case("/%7euser/public_html", "/~user/public_html")]
    #[case("", "/")]
    #[case("/", "/")]
    #[case(".", "/")]
    #[case("/.", "/")]
    #[case("index.html", "/index.html")]
    #[case("//a///b", "/a/b")]
    #[case("\\a\\b.txt", "/a/b.txt")]
    #[case("/a/./b/./c", "/a/b/c")]
    #[case("/a/././b", "/a/b")]
    #[case("/a/b/..", "/a/")]
    #[case("/a/b/.", "/a/b/")]
    #[case("/a/..", "/")]
    #[case("/a/...b/c", "/a/...b/c")]
    #[case("/a/b/../c/./d/../e", "/a/c/e")]
    #[case("/dir%20name/file", "/dir%20name/file")]
    #[case("/a/%7Euser", "/a/%7Euser")]
    #[case("/x/../%7Euser", "/~user")]
    fn normalizes(
        #[case] uri: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(expected, normalize(uri).unwrap().as_str());
    }

    #[rstest]
    #[case("/../a")]
    #[case("/..")]
    #[case("..")]
    #[case("/a/../../b")]
    #[case("/a/b/../../../c")]
    #[case("\\..\\windows")]
    #[case("/a/.\\../..")]
    #[case("/%2e%2e/etc")]
    #[case("/%2E%2E/etc")]
    #[case("/a%2fb")]
    #[case("/a%2Fb")]
    #[case("/a%5cb")]
    #[case("/%252e%252e/")]
    #[case("/..hidden")]
    fn rejects(#[case] uri: &str) {
        assert!(matches!(
            normalize(uri),
            Err(Error::InvalidPath(path)) if path == uri
        ));
    }

    #[derive(Clone, Debug)]
    struct RawPath(String);

    impl Arbitrary for RawPath {
        fn arbitrary(g: &mut Gen) -> Self {
            const PIECES: &[&str] = &[
                "/", "/", "\\", ".", "..", "a", "b", "%", "%7E", "%7e", "~", "2", "F",
            ];
            let len = usize::arbitrary(g) % 12;
            let path = (0..len)
                .filter_map(|_| g.choose(PIECES))
                .copied()
                .collect();
            Self(path)
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        #[allow(clippy::needless_pass_by_value)]
        fn prop(raw: RawPath) -> bool {
            match normalize(&raw.0) {
                Ok(once) => {
                    once.starts_with('/')
                        && !once.contains("//")
                        && !once.contains("/./")
                        && !once.contains("/../")
                        && !once.ends_with("/.")
                        && !once.ends_with("/..")
                        && normalize(&once).map_or(false, |twice| twice == once)
                },
                Err(_) => true,
            }
        }

        QuickCheck::new()
            .tests(2_000)
            .quickcheck(prop as fn(RawPath) -> bool);
    }

}
