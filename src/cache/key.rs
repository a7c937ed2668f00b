//! Cache keys for remote resources

use std::fmt;

/// Identifies one cached remote resource: a resource kind plus an identifier
///
/// The storage form is `"<kind>_<id>"`, e.g. `github_profile_octocat`. The id
/// is lowercased and anything outside `[a-z0-9_-]` becomes `_`, so the key is
/// always safe to use as a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    kind: &'static str,
    id: String,
}

impl ResourceKey {
    pub fn new(kind: &'static str, id: &str) -> Self {
        let id = id
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        Self { kind, id }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The normalized identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The storage key
    pub fn as_storage_key(&self) -> String {
        format!("{}_{}", self.kind, self.id)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind, self.id)
    }
}
