use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// One source row keyed by header name.
///
/// Keys keep the position of their first occurrence while the value comes
/// from the last column carrying that header, so a file with two `Năm`
/// columns reads the rightmost one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Value under `key`, or `""` when the header does not exist.
    pub fn get(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// Like [`Record::get`], but tolerates the leading space the statement
    /// exports put in front of most line-item headers.
    pub fn get_trimmed(&self, key: &str) -> &str {
        if self.contains_key(key) {
            return self.get(key);
        }
        let wanted = key.trim();
        self.fields
            .iter()
            .find(|(k, _)| k.trim() == wanted)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// First non-empty value among alternative spellings of a header.
    pub fn get_any(&self, keys: &[&str]) -> &str {
        keys.iter()
            .map(|k| self.get(k))
            .find(|v| !v.is_empty())
            .unwrap_or("")
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
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

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Header slots are resolved once per table so wide exports stay linear
/// per row.
pub fn to_records(headers: &[String], rows: &[Vec<String>]) -> Vec<Record> {
    let mut keys: Vec<&str> = Vec::new();
    let mut slot_of: HashMap<&str, usize> = HashMap::new();
    let slots: Vec<usize> = headers
        .iter()
        .map(|header| {
            *slot_of.entry(header.as_str()).or_insert_with(|| {
                keys.push(header.as_str());
                keys.len() - 1
            })
        })
        .collect();

    rows.iter()
        .map(|row| {
            let mut fields: Vec<(String, String)> =
                keys.iter().map(|k| (k.to_string(), String::new())).collect();
            for (i, slot) in slots.iter().enumerate() {
                fields[*slot].1 = row.get(i).cloned().unwrap_or_default();
            }
            Record { fields }
        })
        .collect()
}
