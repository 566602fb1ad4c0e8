//! Parsed query string with typed lookups.

/// The decoded `application/x-www-form-urlencoded` pairs of a query string
/// (or a form body), in the order they appeared.
///
/// Lookups are explicit about presence: [`get`](Query::get) returns `None`
/// when the key is absent, [`get_non_empty`](Query::get_non_empty) also
/// treats `?key=` as absent.
#[derive(Clone, Debug, Default)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    /// Parses a raw query string (without the leading `?`). `+` decodes to a
    /// space and percent-escapes are decoded; invalid UTF-8 is replaced.
    pub fn parse(raw: &str) -> Self {
        Self::from_bytes(raw.as_bytes())
    }

    /// Parses a urlencoded form body.
    pub fn from_bytes(raw: &[u8]) -> Self {
        let pairs = form_urlencoded::parse(raw).into_owned().collect();
        Self { pairs }
    }

    /// First value for `key`. Repeated keys resolve to their first occurrence.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`get`](Query::get), but an empty value counts as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Every value for `key`, in order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs.iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
