//! Strongly-typed migration unit name.

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::path::Path;

const EMPTY_NAME: &str = "migration unit name must not be empty";

/// Name of a single migration unit.
///
/// The name is both the ledger key and the sort key: units are applied in
/// ascending byte-wise order of their names, so a numeric or timestamp
/// prefix (`001_create_products`, `20260114093000_add_gemstones`) decides
/// the application order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UnitName(String);

impl UnitName {
    /// Wrap a name known to be non-empty (literals, tests).
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "{EMPTY_NAME}");
        Self(name)
    }

    /// Wrap `name`, or `None` if it is empty.
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        (!name.is_empty()).then_some(Self(name))
    }

    /// Derive a unit name from a migration file path (its file stem).
    ///
    /// `migrations/001_create_products.sql` becomes `001_create_products`.
    /// Returns `None` for paths without a UTF-8 stem.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .and_then(|s| s.to_str())
            .and_then(Self::try_new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for UnitName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::try_new(raw).ok_or_else(|| serde::de::Error::custom(EMPTY_NAME))
    }
}

impl TryFrom<String> for UnitName {
    type Error = &'static str;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::try_new(name).ok_or(EMPTY_NAME)
    }
}

impl TryFrom<&str> for UnitName {
    type Error = &'static str;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::try_new(name).ok_or(EMPTY_NAME)
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for UnitName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UnitName {
    fn as_ref(&self) -> &str {
        self
    }
}

// Lets `HashSet<UnitName>`/`BTreeMap<UnitName, _>` be queried with `&str`.
impl Borrow<str> for UnitName {
    fn borrow(&self) -> &str {
        self
    }
}

impl PartialEq<str> for UnitName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for UnitName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for UnitName {
    fn eq(&self, other: &String) -> bool {
        &self.0 == other
    }
}

#[cfg(test)]
#[path = "unit_name_test.rs"]
mod tests;
