//! Attribute storage.

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map;

/// Attributes of an element.
///
/// Keys normally borrow the source buffer, values are always owned. Each
/// key appears at most once: inserting an existing key replaces its value.
/// Iteration order is unspecified; use [`Attributes::sorted`] when a stable
/// order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes<'src> {
    map: HashMap<Cow<'src, [u8]>, Vec<u8>>,
}

impl<'src> Attributes<'src> {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an attribute, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<Cow<'src, [u8]>>,
        value: Vec<u8>,
    ) -> Option<Vec<u8>> {
        self.map.insert(key.into(), value)
    }

    /// Look up an attribute value.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.map.get(key).map(Vec::as_slice)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.map.contains_key(key)
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        self.map.remove(key)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over `(key, value)` pairs in unspecified order.
    pub fn iter(&self) -> Iter<'_, 'src> {
        Iter {
            inner: self.map.iter(),
        }
    }

    /// All pairs, sorted by key.
    pub fn sorted(&self) -> Vec<(&[u8], &[u8])> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_unstable_by_key(|(key, _)| *key);
        pairs
    }

    /// Copy the keys out of the source buffer.
    pub fn into_owned(self) -> Attributes<'static> {
        Attributes {
            map: self
                .map
                .into_iter()
                .map(|(key, value)| (Cow::Owned(key.into_owned()), value))
                .collect(),
        }
    }
}

/// Iterator over attributes, see [`Attributes::iter`].
pub struct Iter<'a, 'src> {
    inner: hash_map::Iter<'a, Cow<'src, [u8]>, Vec<u8>>,
}

impl<'a> Iterator for Iter<'a, '_> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, value)| (key.as_ref(), value.as_slice()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_, '_> {}

impl<'a, 'src> IntoIterator for &'a Attributes<'src> {
    type Item = (&'a [u8], &'a [u8]);
    type IntoIter = Iter<'a, 'src>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'src> FromIterator<(&'src [u8], Vec<u8>)> for Attributes<'src> {
    fn from_iter<I: IntoIterator<Item = (&'src [u8], Vec<u8>)>>(iter: I) -> Self {
        Self {
            map: iter
                .into_iter()
                .map(|(key, value)| (Cow::Borrowed(key), value))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_last_write_wins() {
        let mut attrs = Attributes::new();
        assert_eq!(attrs.insert(&b"x"[..], b"1".to_vec()), None);
        assert_eq!(attrs.insert(&b"x"[..], b"2".to_vec()), Some(b"1".to_vec()));
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get(b"x"), Some(&b"2"[..]));
    }

    #[test]
    fn test_remove_and_contains() {
        let mut attrs: Attributes<'_> = [(&b"a"[..], b"1".to_vec()), (&b"b"[..], b"2".to_vec())]
            .into_iter()
            .collect();
        assert!(attrs.contains_key(b"a"));
        assert_eq!(attrs.remove(b"a"), Some(b"1".to_vec()));
        assert!(!attrs.contains_key(b"a"));
        assert_eq!(attrs.remove(b"a"), None);
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_sorted_is_deterministic() {
        let attrs: Attributes<'_> = [
            (&b"zeta"[..], b"3".to_vec()),
            (&b"alpha"[..], b"1".to_vec()),
            (&b"mid"[..], b"2".to_vec()),
        ]
        .into_iter()
        .collect();
        let keys: Vec<_> = attrs.sorted().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![&b"alpha"[..], &b"mid"[..], &b"zeta"[..]]);
    }

    #[test]
    fn test_into_owned_outlives_source() {
        let owned = {
            let source = String::from("key");
            let mut attrs = Attributes::new();
            attrs.insert(source.as_bytes(), b"value".to_vec());
            attrs.into_owned()
        };
        assert_eq!(owned.get(b"key"), Some(&b"value"[..]));
    }
}
