use std::fmt;

/// Logical partition isolating one collection of chunks from another.
/// Created implicitly on first upsert; never destroyed by this service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Blank or missing namespaces fall back to the configured default.
    pub fn resolve(requested: Option<&str>, default: &str) -> Self {
        match requested.map(str::trim) {
            Some(ns) if !ns.is_empty() => Self(ns.to_string()),
            _ => Self(default.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
