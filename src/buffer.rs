use super::config::TokenLimits;

/// Returned by [`TokenBuffer::push`] when the buffer is already at its
/// maximum size.  Scanners translate this into the error matching the token
/// being read.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Overflow;

/// A growable byte buffer with a hard ceiling, reused across requests.
///
/// The buffer starts with a small capacity and doubles whenever it fills,
/// never exceeding the configured maximum.  Recycling it only resets its
/// length, so the storage grown for one request is kept for the next.
#[derive(Clone, Debug)]
pub struct TokenBuffer {
    bytes: Vec<u8>,
    capacity: usize,
    max: usize,
}

impl TokenBuffer {
    #[must_use]
    pub fn new(limits: TokenLimits) -> Self {
        let max = limits.max;
        let capacity = limits.initial.min(max);
        Self {
            bytes: Vec::with_capacity(capacity),
            capacity,
            max,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Current capacity, which only grows by doubling up to the maximum.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn extend_from_slice(
        &mut self,
        bytes: &[u8],
    ) -> Result<(), Overflow> {
        let needed = self.bytes.len() + bytes.len();
        if needed > self.max {
            return Err(Overflow);
        }
        while self.capacity < needed {
            self.grow();
        }
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    fn grow(&mut self) {
        let capacity = (self.capacity * 2).max(1).min(self.max);
        self.bytes.reserve_exact(capacity - self.bytes.len());
        self.capacity = capacity;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn max(&self) -> usize {
        self.max
    }

    pub fn push(
        &mut self,
        byte: u8,
    ) -> Result<(), Overflow> {
        if self.bytes.len() == self.capacity {
            if self.capacity >= self.max {
                return Err(Overflow);
            }
            self.grow();
        }
        self.bytes.push(byte);
        Ok(())
    }

    pub fn recycle(&mut self) {
        self.bytes.clear();
    }

    /// Decodes the contents as ISO-8859-1, which cannot fail since every
    /// byte maps to exactly one character.
    #[must_use]
    pub fn to_latin1(&self) -> String {
        latin1(&self.bytes)
    }
}

impl AsRef<[u8]> for TokenBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl PartialEq<[u8]> for TokenBuffer {
    fn eq(
        &self,
        other: &[u8],
    ) -> bool {
        self.bytes == other
    }
}

impl PartialEq<&str> for TokenBuffer {
    fn eq(
        &self,
        other: &&str,
    ) -> bool {
        self.bytes == other.as_bytes()
    }
}

pub(crate) fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn grows_by_doubling_up_to_max() {
        let mut buffer = TokenBuffer::new(TokenLimits::new(2, 10));
        assert_eq!(2, buffer.capacity());
        for b in b"abc" {
            assert_eq!(Ok(()), buffer.push(*b));
        }
        assert_eq!(4, buffer.capacity());
        for b in b"defgh" {
            assert_eq!(Ok(()), buffer.push(*b));
        }
        assert_eq!(8, buffer.capacity());
        assert_eq!(Ok(()), buffer.push(b'i'));
        assert_eq!(10, buffer.capacity());
        assert_eq!(Ok(()), buffer.push(b'j'));
        assert_eq!(Err(Overflow), buffer.push(b'k'));
        assert_eq!(b"abcdefghij", buffer.as_bytes());
        assert_eq!(buffer.max(), buffer.len());
        assert_eq!(buffer.max(), buffer.capacity());
    }

    #[test]
    fn overflow_does_not_truncate_contents() {
        let mut buffer = TokenBuffer::new(TokenLimits::new(4, 4));
        assert_eq!(Ok(()), buffer.extend_from_slice(b"GET"));
        assert_eq!(Err(Overflow), buffer.extend_from_slice(b"XY"));
        assert_eq!(b"GET", buffer.as_bytes());
    }

    #[test]
    fn recycle_keeps_storage() {
        let mut buffer = TokenBuffer::new(TokenLimits::new(1, 64));
        assert_eq!(Ok(()), buffer.extend_from_slice(&[b'x'; 40]));
        let capacity = buffer.capacity();
        buffer.recycle();
        assert!(buffer.is_empty());
        assert_eq!(capacity, buffer.capacity());
    }

    #[test]
    fn decodes_as_latin1() {
        let mut buffer = TokenBuffer::new(TokenLimits::new(8, 8));
        assert_eq!(Ok(()), buffer.extend_from_slice(b"caf\xe9"));
        assert_eq!("caf\u{e9}", buffer.to_latin1());
    }

}
