use crate::{error::Error, expression::Value, request::Headers};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex =
        Regex::new(r"\{\{\s*(?P<key>[^{}\s][^{}]*?)\s*\}\}").unwrap();
}

/// Values shared by every request of one run. Written by side effects,
/// read by placeholders, never cleared between requests.
pub type Store = HashMap<String, Value>;

/// What to do with a `{{ key }}` whose key has no stored value.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InterpolationMode {
    /// Substitute the text `undefined`.
    Lenient,
    /// Fail the request.
    Strict,
}

impl Default for InterpolationMode {
    fn default() -> Self {
        InterpolationMode::Lenient
    }
}

pub fn interpolate(text: &str, store: &Store, mode: InterpolationMode) -> Result<String, Error> {
    let mut missing = None;

    let interpolated = PLACEHOLDER_REGEX.replace_all(text, |captures: &Captures| {
        let key = &captures["key"];
        match store.get(key) {
            Some(value) => value.to_string(),
            None => {
                if missing.is_none() {
                    missing = Some(key.to_string());
                }
                Value::Undefined.to_string()
            }
        }
    });

    match missing {
        Some(key) if mode == InterpolationMode::Strict => Err(Error::UndefinedPlaceholder(key)),
        _ => Ok(interpolated.into_owned()),
    }
}

/// Identity on a missing input.
pub fn interpolate_optional(
    text: Option<&str>,
    store: &Store,
    mode: InterpolationMode,
) -> Result<Option<String>, Error> {
    text.map(|text| interpolate(text, store, mode)).transpose()
}

/// Header names and values are interpolated independently. When two names
/// resolve to the same text the later one wins.
pub fn interpolate_headers(
    headers: &Headers,
    store: &Store,
    mode: InterpolationMode,
) -> Result<Headers, Error> {
    let mut interpolated = Headers::with_capacity(headers.len());

    for (key, value) in headers {
        interpolated.insert(
            interpolate(key, store, mode)?,
            interpolate(value, store, mode)?,
        );
    }

    Ok(interpolated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        let mut store = Store::new();
        store.insert("id".into(), Value::from("7"));
        store.insert("count".into(), Value::Number(3.0));
        store
    }

    #[test]
    fn substitutes_placeholders() {
        assert_eq!(
            interpolate("http://x/{{id}}", &store(), InterpolationMode::Lenient).unwrap(),
            "http://x/7"
        );
        assert_eq!(
            interpolate("{{ id }}-{{count}}", &store(), InterpolationMode::Lenient).unwrap(),
            "7-3"
        );
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let text = "POST http://x/{id} {\"a\": {\"b\": 1}}";

        let once = interpolate(text, &store(), InterpolationMode::Lenient).unwrap();
        let twice = interpolate(&once, &store(), InterpolationMode::Lenient).unwrap();

        assert_eq!(once, text);
        assert_eq!(twice, once);
    }

    #[test]
    fn missing_key_becomes_undefined_when_lenient() {
        assert_eq!(
            interpolate("Bearer {{token}}", &store(), InterpolationMode::Lenient).unwrap(),
            "Bearer undefined"
        );
    }

    #[test]
    fn missing_key_fails_when_strict() {
        let error = interpolate("Bearer {{ token }}", &store(), InterpolationMode::Strict)
            .unwrap_err();

        assert!(matches!(error, Error::UndefinedPlaceholder(key) if key == "token"));
    }

    #[test]
    fn absent_text_stays_absent() {
        assert_eq!(
            interpolate_optional(None, &store(), InterpolationMode::Strict).unwrap(),
            None
        );
    }

    #[test]
    fn interpolates_header_names_and_values() {
        let mut headers = Headers::new();
        headers.insert("X-{{id}}".into(), "{{count}}".into());

        let headers = interpolate_headers(&headers, &store(), InterpolationMode::Lenient).unwrap();

        assert_eq!(headers["X-7"], "3");
    }

    #[test]
    fn blank_placeholder_is_left_alone() {
        let store = {
            let mut store = store();
            store.insert(" ".into(), Value::from("space"));
            store
        };

        assert_eq!(
            interpolate("a{{ }}b{{}}c", &store, InterpolationMode::Strict).unwrap(),
            "a{{ }}b{{}}c"
        );
    }
}
