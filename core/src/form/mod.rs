//! Typed, validated requests built from raw submitted fields.
//!
//! Nothing here touches the database: a form either validates into a
//! request the store can write as-is, or yields [`ValidationErrors`]
//! naming every rejected field.

mod record;

pub use record::{ArtistForm, ShowForm, VenueForm};

use std::collections::BTreeMap;

use crate::error::ValidationErrors;

/// Raw submitted key/value pairs. Keys may repeat (`genres`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldMap {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (k, v) in pairs {
            map.insert(k, v);
        }
        map
    }

    /// Flattens a JSON object: arrays become repeated keys, scalars their
    /// text form, nulls are skipped.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ValidationErrors> {
        use serde_json::Value;

        let Value::Object(obj) = value else {
            let mut errs = ValidationErrors::default();
            errs.push("body", "expected a JSON object");
            return Err(errs);
        };

        fn scalar(v: &Value) -> Option<String> {
            match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                Value::Bool(b) => Some(b.to_string()),
                Value::Number(n) => Some(n.to_string()),
                other => Some(other.to_string()),
            }
        }

        let mut map = Self::new();
        for (k, v) in obj {
            match v {
                Value::Array(items) => {
                    for item in items.iter().filter_map(scalar) {
                        map.insert(k.as_str(), item);
                    }
                }
                v => {
                    if let Some(s) = scalar(v) {
                        map.insert(k.as_str(), s);
                    }
                }
            }
        }
        Ok(map)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(key.into()).or_default().push(value.into());
    }

    /// First value submitted under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.fields.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Trimmed value, `None` when absent or blank.
    fn text(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|s| !s.is_empty())
    }
}

const SHORT_TEXT: usize = 120;
const LONG_TEXT: usize = 500;

fn too_long(value: &str, max: usize) -> bool {
    value.chars().count() > max
}

fn required(
    fields: &FieldMap,
    key: &'static str,
    max: Option<usize>,
    errs: &mut ValidationErrors,
) -> String {
    match fields.text(key) {
        None => {
            errs.push(key, "is required");
            String::new()
        }
        Some(v) => {
            if let Some(max) = max {
                if too_long(v, max) {
                    errs.push(key, format!("must be at most {max} characters"));
                }
            }
            v.to_string()
        }
    }
}

fn optional(
    fields: &FieldMap,
    keys: &[&'static str],
    max: usize,
    errs: &mut ValidationErrors,
) -> Option<String> {
    let (key, v) = keys
        .iter()
        .find_map(|k| fields.text(k).map(|v| (*k, v)))?;
    if too_long(v, max) {
        errs.push(key, format!("must be at most {max} characters"));
    }
    Some(v.to_string())
}

fn check_link(key: &'static str, value: &str, errs: &mut ValidationErrors) {
    match url::Url::parse(value) {
        Ok(u) if matches!(u.scheme(), "http" | "https") && u.host().is_some() => {}
        _ => errs.push(key, "must be an http(s) URL"),
    }
}

fn check_phone(key: &'static str, value: &str, errs: &mut ValidationErrors) {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '+' | '.'));
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if !allowed || digits < 7 {
        errs.push(key, "must be a phone number");
    }
}

/// Checkbox semantics: absent or blank is false.
fn flag(fields: &FieldMap, key: &'static str, errs: &mut ValidationErrors) -> bool {
    match fields.text(key).map(str::to_ascii_lowercase).as_deref() {
        None => false,
        Some("y" | "yes" | "on" | "true" | "1") => true,
        Some("n" | "no" | "off" | "false" | "0") => false,
        Some(_) => {
            errs.push(key, "must be a yes/no value");
            false
        }
    }
}

fn id(fields: &FieldMap, key: &'static str, errs: &mut ValidationErrors) -> i64 {
    match fields.text(key) {
        None => {
            errs.push(key, "is required");
            0
        }
        Some(v) => match v.parse::<i64>() {
            Ok(id) if id > 0 => id,
            _ => {
                errs.push(key, "must be a positive integer");
                0
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_repeated_keys() {
        let fields = FieldMap::from_pairs([("genres", "Jazz"), ("genres", "Swing"), ("name", "x")]);
        assert_eq!(fields.get_all("genres"), ["Jazz", "Swing"]);
        assert_eq!(fields.get("genres"), Some("Jazz"));
        assert!(fields.get_all("missing").is_empty());
    }

    #[test]
    fn test_from_json() {
        let fields = FieldMap::from_json(&json!({
            "name": "The Musical Hop",
            "genres": ["Jazz", "Folk"],
            "seeking_talent": true,
            "venue_id": 3,
            "website_link": null,
        }))
        .unwrap();
        assert_eq!(fields.get("name"), Some("The Musical Hop"));
        assert_eq!(fields.get_all("genres"), ["Jazz", "Folk"]);
        assert_eq!(fields.get("seeking_talent"), Some("true"));
        assert_eq!(fields.get("venue_id"), Some("3"));
        assert_eq!(fields.get("website_link"), None);

        let err = FieldMap::from_json(&json!(["not", "an", "object"])).unwrap_err();
        assert_eq!(err.fields(), vec!["body"]);
    }

    #[test]
    fn test_flag_values() {
        let mut errs = ValidationErrors::default();
        let fields = FieldMap::from_pairs([("a", "y"), ("b", "off"), ("c", "maybe")]);
        assert!(flag(&fields, "a", &mut errs));
        assert!(!flag(&fields, "b", &mut errs));
        assert!(!flag(&fields, "missing", &mut errs));
        assert!(errs.is_empty());
        flag(&fields, "c", &mut errs);
        assert_eq!(errs.fields(), vec!["c"]);
    }
}
