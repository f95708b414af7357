//! Resource keys - the names under which fetch lifecycles are tracked.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// The unique name identifying one trackable fetch operation and its state slot.
///
/// Keys are cheap to clone (shared string storage) and are used both to tag
/// [`FetchEvent`](crate::event::FetchEvent)s and to index the per-resource
/// state map.
///
/// # Example
///
/// ```
/// use fetchstate_core::ResourceKey;
///
/// let key = ResourceKey::from("users");
/// assert_eq!(key.as_str(), "users");
/// assert_eq!(key.to_string(), "users");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(Arc<str>);

impl ResourceKey {
    /// View the key as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceKey {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl From<String> for ResourceKey {
    fn from(name: String) -> Self {
        Self(Arc::from(name.as_str()))
    }
}

impl From<&ResourceKey> for ResourceKey {
    fn from(key: &ResourceKey) -> Self {
        key.clone()
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ResourceKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResourceKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_compare_by_name() {
        let a = ResourceKey::from("users");
        let b = ResourceKey::from("users".to_string());
        assert_eq!(a, b);
        assert_ne!(a, ResourceKey::from("posts"));
    }

    #[test]
    fn clones_share_storage() {
        let a = ResourceKey::from("users");
        let b = a.clone();
        assert_eq!(a.as_str(), b.as_str());
    }
}
