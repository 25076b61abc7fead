use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::clean::normalize_name;
use crate::models::CountryRecord;

/// All country records of one pipeline run, keyed by normalized name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: BTreeMap<String, CountryRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record for `name` unless one exists. Returns false for an
    /// existing name and for a name that normalizes to the empty string.
    pub(crate) fn insert(&mut self, name: &str) -> bool {
        let name = normalize_name(name);
        if name.is_empty() || self.records.contains_key(&name) {
            return false;
        }
        self.records.insert(name.clone(), CountryRecord::new(name));
        true
    }

    /// Looks up a record; `name` is normalized first.
    pub fn get(&self, name: &str) -> Option<&CountryRecord> {
        self.records.get(&normalize_name(name))
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut CountryRecord> {
        self.records.get_mut(&normalize_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn records(&self) -> btree_map::Values<'_, String, CountryRecord> {
        self.records.values()
    }

    pub(crate) fn records_mut(&mut self) -> btree_map::ValuesMut<'_, String, CountryRecord> {
        self.records.values_mut()
    }
}

/// Country code to country name lookup built from the primary dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinKeyMap {
    code_to_name: BTreeMap<String, String>,
    name_to_code: BTreeMap<String, String>,
}

impl JoinKeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `code -> name`; later calls win for both the code and the name.
    /// Returns the name the code mapped to before, if any.
    pub(crate) fn insert(&mut self, code: &str, name: &str) -> Option<String> {
        let code = code.trim().to_string();
        let name = normalize_name(name);
        self.name_to_code.insert(name.clone(), code.clone());
        self.code_to_name.insert(code, name)
    }

    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.code_to_name.get(code.trim()).map(String::as_str)
    }

    pub fn code_of(&self, name: &str) -> Option<&str> {
        self.name_to_code
            .get(&normalize_name(name))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.code_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code_to_name.is_empty()
    }

    /// `(code, name)` pairs ordered by code.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.code_to_name
            .iter()
            .map(|(code, name)| (code.as_str(), name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_normalizes_and_rejects_duplicates() {
        let mut store = RecordStore::new();
        assert!(store.insert("CANADA"));
        assert!(!store.insert("canada"));
        assert!(!store.insert("   "));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("cAnAdA").map(|r| r.name()), Some("Canada"));
    }

    #[test]
    fn test_join_keys_last_wins() {
        let mut keys = JoinKeyMap::new();
        assert_eq!(keys.insert("CAN", "canada"), None);
        assert_eq!(keys.insert("CAN", "Mexico"), Some("Canada".to_string()));
        assert_eq!(keys.name_of("CAN"), Some("Mexico"));
        assert_eq!(keys.code_of("mexico"), Some("CAN"));
        assert_eq!(keys.name_of("XXX"), None);
    }
}
