use std::sync::Arc;

/// Ordered multimap of message headers.
///
/// A key may hold several values. Keys are compared ASCII case-insensitively,
/// while each pair keeps the key casing it was added with. Iteration follows
/// insertion order; [`Headers::set`] removes the existing values of the key
/// and appends the new pair at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(Arc<str>, Arc<str>)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value, keeping the values already stored under `key`.
    pub fn add<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<Arc<str>>,
        V: Into<Arc<str>>,
    {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Replace all values stored under `key` with `value`.
    pub fn set<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<Arc<str>>,
        V: Into<Arc<str>>,
    {
        let key = key.into();
        self.remove(&key);
        self.entries.push((key, value.into()));
        self
    }

    pub fn remove(&mut self, key: &str) -> &mut Self {
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
        self
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values(key).next()
    }

    /// All values stored under `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.values(key).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values(key).next().is_some()
    }

    /// Number of key/value pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v.as_ref()))
    }

    fn values<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_ref())
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<Arc<str>>,
    V: Into<Arc<str>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (key, value) in iter {
            headers.add(key, value);
        }
        headers
    }
}
