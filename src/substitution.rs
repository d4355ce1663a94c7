//! Symbolic substitution table.
//!
//! Generated headers often define a setting in terms of another named
//! constant (`#define IRQ_CFG IRQ_CFG_PCLK_DIV64`) while the descriptor
//! records the resolved selection (`3`). The table maps such symbolic tokens
//! to the value the descriptor is expected to hold.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::context::ServiceContext;
use crate::normalize::{normalize_cleaned, NormalizeError, NormalizedValue};
use crate::tables::{self, TableError};

/// The value a symbolic token resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionValue {
    /// Already canonical; used as-is without reparsing.
    Integer(i128),
    /// Goes through normal classification like any header token.
    Text(String),
    /// Any other scalar (boolean, float, null), compared as its written
    /// form and never as a number.
    Other(Value),
}

impl SubstitutionValue {
    /// Normalizes the substituted value.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] if a text value looks numeric but cannot be
    /// converted.
    pub fn normalize(&self) -> Result<NormalizedValue, NormalizeError> {
        match self {
            Self::Integer(value) => Ok(NormalizedValue::Integer(*value)),
            Self::Text(text) => normalize_cleaned(text),
            Self::Other(value) => Ok(NormalizedValue::Text(value.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for SubstitutionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(value), _) => Self::Integer(i128::from(value)),
                (None, Some(value)) => Self::Integer(i128::from(value)),
                (None, None) => Self::Other(Value::Number(n)),
            },
            Value::String(text) => Self::Text(text),
            Value::Array(_) | Value::Object(_) => {
                return Err(D::Error::custom("substitution value must be a scalar"));
            }
            other => Self::Other(other),
        })
    }
}

impl fmt::Display for SubstitutionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
            Self::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Accepted on-disk shapes: a plain mapping, or a list of single-entry
/// mappings as exported by the configurator scripts.
#[derive(Deserialize)]
#[serde(untagged)]
enum TableFile {
    Map(HashMap<String, SubstitutionValue>),
    List(Vec<HashMap<String, SubstitutionValue>>),
}

/// Mapping from symbolic token to canonical value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionTable {
    entries: HashMap<String, SubstitutionValue>,
}

impl SubstitutionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a table from a YAML or JSON file.
    ///
    /// In the list form, the first entry for a token wins.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the file cannot be read or parsed.
    pub fn load(ctx: &ServiceContext, path: &Path) -> Result<Self, TableError> {
        let table = match tables::load::<TableFile>(ctx, path)? {
            TableFile::Map(entries) => Self { entries },
            TableFile::List(rows) => {
                let mut table = Self::new();
                for (token, value) in rows.into_iter().flatten() {
                    table.entries.entry(token).or_insert(value);
                }
                table
            }
        };
        tracing::debug!(path = %path.display(), entries = table.len(), "loaded substitution table");
        Ok(table)
    }

    /// Adds an entry, replacing any existing one for `token`.
    pub fn insert(&mut self, token: impl Into<String>, value: SubstitutionValue) {
        self.entries.insert(token.into(), value);
    }

    /// Looks up a token. Exactly one lookup: a mapped value that is itself a
    /// symbolic name is not followed.
    #[must_use]
    pub fn lookup(&self, token: &str) -> Option<&SubstitutionValue> {
        self.entries.get(token)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, SubstitutionValue)> for SubstitutionTable {
    fn from_iter<I: IntoIterator<Item = (K, SubstitutionValue)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;

    #[test]
    fn loads_mapping_form() {
        let ctx = ServiceContext::in_memory(MemoryFileSystem::new().with_file(
            "subs.yaml",
            "IRQ_CFG_PCLK_DIV64: 3\nIRQ_CFG_PCLK_DIV1: 0\nBSP_MODE: \"ON\"\n",
        ));
        let table = SubstitutionTable::load(&ctx, Path::new("subs.yaml")).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup("IRQ_CFG_PCLK_DIV64"), Some(&SubstitutionValue::Integer(3)));
        assert_eq!(table.lookup("BSP_MODE"), Some(&SubstitutionValue::Text("ON".to_string())));
    }

    #[test]
    fn loads_list_form_with_first_entry_winning() {
        let ctx = ServiceContext::in_memory(MemoryFileSystem::new().with_file(
            "subs.json",
            r#"[{"_CMT0_CMI0": 0}, {"BSP_CFG_PARAM_CHECKING_ENABLE": 1}, {"_CMT0_CMI0": 9}]"#,
        ));
        let table = SubstitutionTable::load(&ctx, Path::new("subs.json")).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("_CMT0_CMI0"), Some(&SubstitutionValue::Integer(0)));
    }

    #[test]
    fn lookup_does_not_chain() {
        let table: SubstitutionTable = [
            ("A", SubstitutionValue::Text("B".to_string())),
            ("B", SubstitutionValue::Integer(2)),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.lookup("A"), Some(&SubstitutionValue::Text("B".to_string())));
    }

    #[test]
    fn accepts_wide_integers_and_other_scalars() {
        let ctx = ServiceContext::in_memory(MemoryFileSystem::new().with_file(
            "subs.yaml",
            "- BSP_CFG_ID_CODE_LONG: 0xFFFFFFFFFFFFFFFF\n\
             - BSP_CFG_ON: true\n\
             - BSP_CFG_RATIO: 1.5\n\
             - BSP_CFG_UNSET: null\n",
        ));
        let table = SubstitutionTable::load(&ctx, Path::new("subs.yaml")).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(
            table.lookup("BSP_CFG_ID_CODE_LONG").unwrap().normalize(),
            Ok(NormalizedValue::Integer(i128::from(u64::MAX)))
        );
        let on = table.lookup("BSP_CFG_ON").unwrap();
        assert_eq!(on.to_string(), "true");
        assert_eq!(on.normalize(), Ok(NormalizedValue::Text("true".to_string())));
        assert_eq!(
            table.lookup("BSP_CFG_UNSET").unwrap().normalize(),
            Ok(NormalizedValue::Text("null".to_string()))
        );
    }

    #[test]
    fn nested_values_are_rejected() {
        let ctx = ServiceContext::in_memory(
            MemoryFileSystem::new().with_file("subs.yaml", "BSP_CFG_LIST: [1, 2]\n"),
        );
        assert!(SubstitutionTable::load(&ctx, Path::new("subs.yaml")).is_err());
    }

    #[test]
    fn integer_values_skip_reparsing() {
        assert_eq!(SubstitutionValue::Integer(10).normalize(), Ok(NormalizedValue::Integer(10)));
        assert_eq!(
            SubstitutionValue::Text("010".to_string()).normalize(),
            Ok(NormalizedValue::Integer(8))
        );
    }
}
