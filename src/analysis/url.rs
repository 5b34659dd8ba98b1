/// Whether the scheme takes part in the comparison key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UrlMode {
    #[default]
    ProtocolAware,
    ProtocolAgnostic,
}

impl UrlMode {
    pub fn from_agnostic_flag(agnostic: bool) -> Self {
        if agnostic {
            Self::ProtocolAgnostic
        } else {
            Self::ProtocolAware
        }
    }
}

const SCHEMES: [&str; 2] = ["https://", "http://"];

/// Syntactic URL canonicalization used for every join and exclusion check.
///
/// No percent-decoding, lowercasing or query-string handling happens here.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlNormalizer {
    mode: UrlMode,
}

impl UrlNormalizer {
    pub fn new(mode: UrlMode) -> Self {
        Self { mode }
    }

    pub fn normalize(&self, raw: &str) -> String {
        let mut key = raw;
        // Each step only shortens the slice, so this reaches a fixpoint and
        // keeps `normalize` idempotent for inputs like "a//" or "a /".
        loop {
            let next = self.step(key);
            if next.len() == key.len() {
                return next.to_string();
            }
            key = next;
        }
    }

    /// A missing cell normalizes to the empty key.
    pub fn normalize_opt(&self, raw: Option<&str>) -> String {
        raw.map(|r| self.normalize(r)).unwrap_or_default()
    }

    fn step<'a>(&self, raw: &'a str) -> &'a str {
        let mut s = raw.trim();
        if self.mode == UrlMode::ProtocolAgnostic {
            s = strip_scheme(s);
        }
        s.strip_suffix('/').unwrap_or(s)
    }
}

pub fn strip_scheme(url: &str) -> &str {
    SCHEMES
        .iter()
        .find_map(|scheme| url.strip_prefix(scheme))
        .unwrap_or(url)
}

pub fn has_scheme(url: &str) -> bool {
    SCHEMES.iter().any(|scheme| url.starts_with(scheme))
}
