use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde_derive::{Deserialize, Serialize};

/// A signup submission: every submitted form field, verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignupRecord {
    fields: BTreeMap<String, String>,
}

impl SignupRecord {
    /// Builds a record from form pairs. A repeated field keeps its first value.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut fields = BTreeMap::new();
        for (key, value) in pairs {
            if let Entry::Vacant(vac) = fields.entry(key) {
                vac.insert(value);
            }
        }
        SignupRecord { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn first_value_of_a_repeated_field_wins() {
        let record = SignupRecord::from_pairs([
            pair("email", "a@example.com"),
            pair("email", "b@example.com"),
            pair("name", "Alice"),
        ]);

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("email"), Some("a@example.com"));
        assert_eq!(record.get("name"), Some("Alice"));
    }

    #[test]
    fn serializes_as_flat_object() {
        let record =
            SignupRecord::from_pairs([pair("name", "Alice"), pair("email", "a@example.com")]);

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"email":"a@example.com","name":"Alice"}"#);
    }

    #[test]
    fn empty_submission_is_an_empty_record() {
        let record = SignupRecord::from_pairs(Vec::new());
        assert!(record.is_empty());
        assert_eq!(serde_json::to_string(&record).unwrap(), "{}");
    }
}
