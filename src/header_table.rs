//! This module contains the collection of header fields belonging to one
//! request.  Field slots are pooled: recycling or removing a field parks its
//! slot past the live fields so its buffers can be refilled by a later field
//! without allocating.

use super::buffer::{
    latin1,
    TokenBuffer,
};
use super::config::{
    Config,
    TokenLimits,
};
use super::error::Error;
use super::header::HeaderField;

const INITIAL_SLOTS: usize = 8;

/// Ordered collection of header fields with case-insensitive lookup.
///
/// Duplicate names are allowed; fields keep the order in which they were
/// added, except where [`set_value`](#method.set_value) removes duplicates.
/// Names are stored folded to lowercase.
#[derive(Clone, Debug)]
pub struct HeaderTable {
    count: usize,
    fields: Vec<HeaderField>,
    limit: Option<usize>,
    name_limits: TokenLimits,
    value_limits: TokenLimits,
}

impl HeaderTable {
    /// Append a new field with the given name, even if other fields already
    /// have that name, and return its (empty) value buffer for the caller to
    /// fill.
    pub fn add_value<T>(
        &mut self,
        name: T,
    ) -> Result<&mut TokenBuffer, Error>
    where
        T: AsRef<[u8]>,
    {
        let name = name.as_ref();
        if name.len() > self.name_limits.max {
            return Err(Error::HeaderNameTooLong);
        }
        let field = self.create_field()?;
        for &byte in name {
            field
                .name
                .push(byte.to_ascii_lowercase())
                .map_err(|_| Error::HeaderNameTooLong)?;
        }
        Ok(&mut field.value)
    }

    /// Recycles every field.  Same as [`recycle`](#method.recycle).
    pub fn clear(&mut self) {
        self.recycle();
    }

    fn create_field(&mut self) -> Result<&mut HeaderField, Error> {
        if let Some(limit) = self.limit {
            if self.count >= limit {
                return Err(Error::TooManyHeaders(limit));
            }
        }
        if self.count == self.fields.len() {
            let mut slots = (self.fields.len() * 2).max(INITIAL_SLOTS);
            if let Some(limit) = self.limit {
                slots = slots.min(limit);
            }
            let (name_limits, value_limits) = (self.name_limits, self.value_limits);
            self.fields.resize_with(slots, || {
                HeaderField::with_limits(name_limits, value_limits)
            });
        }
        let index = self.count;
        self.count += 1;
        let field = &mut self.fields[index];
        field.recycle();
        Ok(field)
    }

    fn fields(&self) -> &[HeaderField] {
        &self.fields[..self.count]
    }

    /// Returns the field at the given position, if there is one.
    #[must_use]
    pub fn get(
        &self,
        index: usize,
    ) -> Option<&HeaderField> {
        self.fields().get(index)
    }

    /// Returns the value of the first field with the given name.
    #[must_use]
    pub fn get_value<T>(
        &self,
        name: T,
    ) -> Option<&[u8]>
    where
        T: AsRef<[u8]>,
    {
        self.position(name.as_ref())
            .map(|index| self.fields[index].value.as_bytes())
    }

    /// Returns the value of the only field with the given name.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateHeader`] is returned if more than one field has the
    /// name.
    pub fn get_unique_value<T>(
        &self,
        name: T,
    ) -> Result<Option<&[u8]>, Error>
    where
        T: AsRef<[u8]>,
    {
        let name = name.as_ref();
        let mut matches = self.fields().iter().filter(|field| field.is_named(name));
        match (matches.next(), matches.next()) {
            (Some(_), Some(_)) => Err(Error::DuplicateHeader(latin1(name))),
            (first, _) => Ok(first.map(|field| field.value.as_bytes())),
        }
    }

    #[must_use]
    pub fn has_header<T>(
        &self,
        name: T,
    ) -> bool
    where
        T: AsRef<[u8]>,
    {
        self.position(name.as_ref()).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HeaderField> {
        self.fields().iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Lists the distinct field names in the order each first appears.
    #[must_use]
    pub fn names(&self) -> Names<'_> {
        Names {
            fields: self.fields(),
            position: 0,
        }
    }

    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            count: 0,
            fields: Vec::new(),
            limit: config.max_header_count,
            name_limits: config.header_name,
            value_limits: config.header_value,
        }
    }

    fn position(
        &self,
        name: &[u8],
    ) -> Option<usize> {
        self.fields().iter().position(|field| field.is_named(name))
    }

    /// Recycles every field and empties the table, keeping all slots for
    /// reuse.
    pub fn recycle(&mut self) {
        for field in &mut self.fields[..self.count] {
            field.recycle();
        }
        self.count = 0;
    }

    /// Removes the field at the given position, shifting later fields down
    /// by one.  Returns `false` if there is no such field.
    pub fn remove_at(
        &mut self,
        index: usize,
    ) -> bool {
        if index >= self.count {
            return false;
        }
        self.fields[index..self.count].rotate_left(1);
        self.count -= 1;
        self.fields[self.count].recycle();
        true
    }

    /// Removes every field with the given name, returning how many were
    /// removed.
    pub fn remove_header<T>(
        &mut self,
        name: T,
    ) -> usize
    where
        T: AsRef<[u8]>,
    {
        let name = name.as_ref();
        let mut removed = 0;
        for index in (0..self.count).rev() {
            if self.fields[index].is_named(name) {
                self.remove_at(index);
                removed += 1;
            }
        }
        removed
    }

    /// Changes the maximum number of fields.  Spare slots beyond the new
    /// limit are released.  A limit below the number of fields already in
    /// the table is rejected and leaves the table unchanged.
    pub fn set_limit(
        &mut self,
        limit: Option<usize>,
    ) -> Result<(), Error> {
        if let Some(limit) = limit {
            if limit < self.count {
                return Err(Error::TooManyHeaders(limit));
            }
            self.fields.truncate(limit);
        }
        self.limit = limit;
        Ok(())
    }

    /// Make the first field with the given name the only one, and return
    /// its value buffer emptied for the caller to fill.  If there is no such
    /// field, a new one is added.
    pub fn set_value<T>(
        &mut self,
        name: T,
    ) -> Result<&mut TokenBuffer, Error>
    where
        T: AsRef<[u8]>,
    {
        let name = name.as_ref();
        match self.position(name) {
            Some(first) => {
                for index in (first + 1..self.count).rev() {
                    if self.fields[index].is_named(name) {
                        self.remove_at(index);
                    }
                }
                let value = &mut self.fields[first].value;
                value.recycle();
                Ok(value)
            },
            None => self.add_value(name),
        }
    }

    /// Lists the values of every field with the given name, in table order.
    #[must_use]
    pub fn values<'a, 'n, T>(
        &'a self,
        name: &'n T,
    ) -> Values<'a, 'n>
    where
        T: AsRef<[u8]> + ?Sized,
    {
        Values {
            fields: self.fields(),
            name: name.as_ref(),
            position: 0,
        }
    }
}

impl<'a> IntoIterator for &'a HeaderTable {
    type Item = &'a HeaderField;
    type IntoIter = std::slice::Iter<'a, HeaderField>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the distinct names in a [`HeaderTable`].
pub struct Names<'a> {
    fields: &'a [HeaderField],
    position: usize,
}

impl<'a> Iterator for Names<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let fields = self.fields;
        while self.position < fields.len() {
            let index = self.position;
            self.position += 1;
            let name = fields[index].name.as_bytes();
            if !fields[..index].iter().any(|field| field.is_named(name)) {
                return Some(name);
            }
        }
        None
    }
}

/// Iterator over the values sharing one name in a [`HeaderTable`].
pub struct Values<'a, 'n> {
    fields: &'a [HeaderField],
    name: &'n [u8],
    position: usize,
}

impl<'a> Iterator for Values<'a, '_> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let fields = self.fields;
        while self.position < fields.len() {
            let field = &fields[self.position];
            self.position += 1;
            if field.is_named(self.name) {
                return Some(field.value.as_bytes());
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn set(
        buffer: Result<&mut TokenBuffer, Error>,
        value: &str,
    ) {
        buffer.unwrap().extend_from_slice(value.as_bytes()).unwrap();
    }

    #[test]
    fn lookup_ignores_case() {
        let mut headers = HeaderTable::new(&Config::default());
        set(headers.add_value("Content-Type"), "text/html");
        assert_eq!(Some(&b"text/html"[..]), headers.get_value("content-type"));
        assert_eq!(Some(&b"text/html"[..]), headers.get_value("CONTENT-TYPE"));
        assert!(headers.has_header("Content-type"));
        assert_eq!(None, headers.get_value("content-length"));
    }

    #[test]
    fn names_stored_lowercase() {
        let mut headers = HeaderTable::new(&Config::default());
        set(headers.add_value(&b"X-Forwarded-For"[..]), "10.0.0.1");
        assert_eq!(Some(&b"x-forwarded-for"[..]), headers.get(0).map(|field| field.name.as_bytes()));
    }

    #[test]
    fn duplicates_enumerated_in_order() {
        let mut headers = HeaderTable::new(&Config::default());
        set(headers.add_value("X-A"), "one");
        set(headers.add_value("Host"), "example.com");
        set(headers.add_value("x-a"), "two");
        assert_eq!(
            vec![&b"one"[..], &b"two"[..]],
            headers.values("X-A").collect::<Vec<_>>()
        );
        assert_eq!(
            vec![&b"x-a"[..], &b"host"[..]],
            headers.names().collect::<Vec<_>>()
        );
        assert_eq!(3, headers.len());
    }

    #[test]
    fn set_value_collapses_duplicates() {
        let mut headers = HeaderTable::new(&Config::default());
        set(headers.add_value("X-A"), "one");
        set(headers.add_value("Host"), "example.com");
        set(headers.add_value("X-A"), "two");
        set(headers.add_value("X-A"), "three");
        set(headers.set_value("X-A"), "only");
        assert_eq!(2, headers.len());
        assert_eq!(vec![&b"only"[..]], headers.values("x-a").collect::<Vec<_>>());
        assert_eq!(Some(&b"x-a"[..]), headers.get(0).map(|field| field.name.as_bytes()));
        assert_eq!(Some(&b"host"[..]), headers.get(1).map(|field| field.name.as_bytes()));
    }

    #[test]
    fn set_value_adds_when_absent() {
        let mut headers = HeaderTable::new(&Config::default());
        set(headers.set_value("Connection"), "close");
        assert_eq!(Some(&b"close"[..]), headers.get_value("connection"));
        assert_eq!(1, headers.len());
    }

    #[test]
    fn unique_value_rejects_duplicates() {
        let mut headers = HeaderTable::new(&Config::default());
        set(headers.add_value("Host"), "a");
        assert!(matches!(
            headers.get_unique_value("host"),
            Ok(Some(value)) if value == b"a"
        ));
        assert!(matches!(headers.get_unique_value("accept"), Ok(None)));
        set(headers.add_value("HOST"), "b");
        assert!(matches!(
            headers.get_unique_value("Host"),
            Err(Error::DuplicateHeader(name)) if name == "Host"
        ));
    }

    #[test]
    fn remove_shifts_and_parks_slot() {
        let mut headers = HeaderTable::new(&Config::default());
        set(headers.add_value("A"), "1");
        set(headers.add_value("B"), "2");
        set(headers.add_value("C"), "3");
        assert!(headers.remove_at(0));
        assert!(!headers.remove_at(2));
        assert_eq!(
            vec![&b"b"[..], &b"c"[..]],
            headers.names().collect::<Vec<_>>()
        );
        assert_eq!(INITIAL_SLOTS, headers.fields.len());
        assert!(headers.fields[2].name.is_empty());
        set(headers.add_value("D"), "4");
        assert_eq!(Some(&b"4"[..]), headers.get_value("d"));
        assert_eq!(INITIAL_SLOTS, headers.fields.len());
    }

    #[test]
    fn remove_header_removes_every_match() {
        let mut headers = HeaderTable::new(&Config::default());
        set(headers.add_value("Cookie"), "a=1");
        set(headers.add_value("Host"), "x");
        set(headers.add_value("cookie"), "b=2");
        assert_eq!(2, headers.remove_header("COOKIE"));
        assert_eq!(0, headers.remove_header("cookie"));
        assert_eq!(1, headers.len());
        assert_eq!(Some(&b"x"[..]), headers.get_value("host"));
    }

    #[test]
    fn limit_enforced() {
        let mut config = Config::default();
        config.max_header_count = Some(2);
        let mut headers = HeaderTable::new(&config);
        set(headers.add_value("A"), "1");
        set(headers.add_value("B"), "2");
        assert!(matches!(headers.add_value("C"), Err(Error::TooManyHeaders(2))));
        assert_eq!(2, headers.fields.len());
        assert_eq!(2, headers.len());
    }

    #[test]
    fn unbounded_table_grows_by_doubling() {
        let mut config = Config::default();
        config.max_header_count = None;
        let mut headers = HeaderTable::new(&config);
        for i in 0..=INITIAL_SLOTS {
            set(headers.add_value(format!("X-{}", i)), "v");
        }
        assert_eq!(INITIAL_SLOTS * 2, headers.fields.len());
        assert_eq!(INITIAL_SLOTS + 1, headers.len());
    }

    #[test]
    fn name_longer_than_limit_rejected_without_adding() {
        let mut config = Config::default();
        config.header_name = TokenLimits::new(2, 4);
        let mut headers = HeaderTable::new(&config);
        assert!(matches!(headers.add_value("Cookie"), Err(Error::HeaderNameTooLong)));
        assert!(headers.is_empty());
    }

    #[test]
    fn recycle_keeps_slots() {
        let mut headers = HeaderTable::new(&Config::default());
        set(headers.add_value("A"), "1");
        set(headers.add_value("B"), "2");
        headers.recycle();
        assert!(headers.is_empty());
        assert_eq!(0, headers.names().count());
        assert_eq!(INITIAL_SLOTS, headers.fields.len());
        set(headers.add_value("C"), "3");
        assert_eq!(Some(&b"3"[..]), headers.get_value("c"));
        assert_eq!(None, headers.get_value("a"));
    }

    #[test]
    fn set_limit_releases_spare_slots() {
        let mut headers = HeaderTable::new(&Config::default());
        set(headers.add_value("A"), "1");
        assert!(headers.set_limit(Some(3)).is_ok());
        assert_eq!(3, headers.fields.len());
        assert_eq!(Some(3), headers.limit());
        assert!(headers.set_limit(None).is_ok());
        for name in &["B", "C", "D"] {
            set(headers.add_value(name), "x");
        }
        assert_eq!(4, headers.len());
    }

    #[test]
    fn set_limit_below_count_rejected() {
        let mut headers = HeaderTable::new(&Config::default());
        for name in &["A", "B", "C"] {
            set(headers.add_value(name), "x");
        }
        assert!(matches!(headers.set_limit(Some(1)), Err(Error::TooManyHeaders(1))));
        assert_eq!(3, headers.len());
        assert_eq!(Some(100), headers.limit());
        assert!(headers.set_limit(Some(3)).is_ok());
        assert!(matches!(headers.add_value("D"), Err(Error::TooManyHeaders(3))));
        assert_eq!(3, headers.len());
    }

    #[test]
    fn clear_empties_table() {
        let mut headers = HeaderTable::new(&Config::default());
        set(headers.add_value("Host"), "x");
        set(headers.add_value("Accept"), "*/*");
        headers.clear();
        assert!(headers.is_empty());
        assert_eq!(None, headers.get_value("host"));
        assert_eq!(0, headers.iter().count());
        set(headers.add_value("Host"), "y");
        assert_eq!(Some(&b"y"[..]), headers.get_value("host"));
    }

}
