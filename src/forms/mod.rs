//! Binding and validation of urlencoded form submissions.
//!
//! A bound form keeps the raw strings it was given so that an invalid
//! submission can be rendered back to the user with its errors.
pub mod account;
pub mod product;
pub mod review;

use std::collections::BTreeMap;

pub const REQUIRED: &str = "This field is required.";

/// Key under which errors that belong to no single field are stored.
pub const NON_FIELD: &str = "__all__";

/// The submitted key/value pairs, in submission order.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First value submitted for `key`, trimmed.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
    }

    pub fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    /// Password fields are taken verbatim.
    pub fn raw(&self, key: &str) -> String {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    }

    /// Checkbox semantics: absent, empty, "false" and "0" are unchecked.
    pub fn checked(&self, key: &str) -> bool {
        match self.get(key) {
            None => false,
            Some(v) => !matches!(v.to_ascii_lowercase().as_str(), "" | "false" | "0" | "off"),
        }
    }
}

impl From<Vec<(String, String)>> for FormData {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::new(pairs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD, message);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, field: &str) -> Vec<String> {
        self.fields.get(field).cloned().unwrap_or_default()
    }

    pub fn non_field(&self) -> Vec<String> {
        self.field(NON_FIELD)
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

/// Validates a required text field with a maximum length in characters.
pub(crate) fn require_text(
    errors: &mut FormErrors,
    field: &str,
    value: &str,
    max_chars: Option<usize>,
) {
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return;
    }
    check_length(errors, field, value, max_chars);
}

pub(crate) fn check_length(
    errors: &mut FormErrors,
    field: &str,
    value: &str,
    max_chars: Option<usize>,
) {
    if let Some(max) = max_chars {
        let len = value.chars().count();
        if len > max {
            errors.add(
                field,
                format!("Ensure this value has at most {max} characters (it has {len})."),
            );
        }
    }
}

/// Parses an optional choice field where the empty string means "not given".
pub(crate) fn optional_choice<T: std::str::FromStr>(
    errors: &mut FormErrors,
    field: &str,
    value: &str,
) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(choice) => Some(choice),
        Err(e) => {
            errors.add(field, e.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> FormData {
        FormData::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn checkbox_values() {
        let form = data(&[("a", "on"), ("b", "false"), ("c", "0"), ("d", "true")]);
        assert!(form.checked("a"));
        assert!(!form.checked("b"));
        assert!(!form.checked("c"));
        assert!(form.checked("d"));
        assert!(!form.checked("missing"));
    }

    #[test]
    fn first_value_wins_and_is_trimmed() {
        let form = data(&[("title", "  Nice  "), ("title", "ignored")]);
        assert_eq!(form.get("title"), Some("Nice"));
        assert_eq!(form.raw("title"), "  Nice  ");
    }

    #[test]
    fn length_is_counted_in_characters() {
        let mut errors = FormErrors::default();
        require_text(&mut errors, "title", "ééé", Some(3));
        assert!(errors.is_empty());
        require_text(&mut errors, "title", "éééé", Some(3));
        assert_eq!(
            errors.field("title"),
            vec!["Ensure this value has at most 3 characters (it has 4).".to_string()]
        );
    }
}
