//! Record identities and cached display labels.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Last millisecond value handed out by [`RecordId::generate`].
static LAST_ISSUED: AtomicI64 = AtomicI64::new(0);

/// Unique identity of a record within its collection.
///
/// Any string read from storage is a valid identity. Identities created by
/// this crate are derived from the creation timestamp in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an existing identity string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identity from the current time.
    ///
    /// Two calls within the same millisecond still yield distinct values:
    /// the counter is bumped past the last issued timestamp.
    #[must_use]
    pub fn generate() -> Self {
        let now = Utc::now().timestamp_millis();
        let previous = LAST_ISSUED
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        Self(now.max(previous + 1).to_string())
    }

    /// Borrow the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for RecordId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RecordId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A display value copied from another record when an assignment is made.
///
/// The label is a snapshot: renaming the referenced driver or re-plating the
/// referenced vehicle does not update it. It is only refreshed the next time
/// the assignment itself is rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CachedLabel(String);

impl CachedLabel {
    /// Take a snapshot of the given display value.
    #[must_use]
    pub fn snapshot(value: &str) -> Self {
        Self(value.to_string())
    }

    /// Borrow the label text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CachedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for CachedLabel {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_is_unique() {
        let ids: HashSet<RecordId> = (0..1000).map(|_| RecordId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_generate_is_numeric_timestamp() {
        let id = RecordId::generate();
        let millis: i64 = id.as_str().parse().unwrap();
        assert!(millis >= Utc::now().timestamp_millis() - 60_000);
    }

    #[test]
    fn test_record_id_serializes_as_plain_string() {
        let id = RecordId::new("v1");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""v1""#);
        let back: RecordId = serde_json::from_str(r#""v1""#).unwrap();
        assert_eq!(back, "v1");
    }

    #[test]
    fn test_cached_label_display() {
        let label = CachedLabel::snapshot("Ana");
        assert_eq!(label.to_string(), "Ana");
        assert_eq!(label, "Ana");
    }
}
