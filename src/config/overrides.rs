//! Free-form per-type configuration overrides and their typed reader.
//!
//! Overrides arrive as a JSON object per sail or rope type. Each kind reads
//! the keys it accepts through an [`OverrideReader`]; a present key with a
//! value of the wrong shape is an [`InvalidOverrideValue`]. `null` counts as
//! absent so a stored override can be cleared without deleting the key.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::capacity::CANDIDATE_DIAMETERS_MM;
use crate::types::*;

pub type ConfigOverrides = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid override value for `{key}`: expected {expected}, found {found}")]
pub struct InvalidOverrideValue {
    pub key: String,
    pub expected: &'static str,
    pub found: String,
}

impl InvalidOverrideValue {
    fn new(key: &str, expected: &'static str, found: &Value) -> Self {
        Self {
            key: key.to_string(),
            expected,
            found: found.to_string(),
        }
    }
}

/// Lay `top` over `base`; keys in `top` win.
pub fn overlay(base: &ConfigOverrides, top: &ConfigOverrides) -> ConfigOverrides {
    let mut merged = base.clone();
    merged.extend(top.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Typed, validating view over one override map.
#[derive(Debug, Clone, Copy)]
pub struct OverrideReader<'a> {
    overrides: &'a ConfigOverrides,
    accepted: &'static [&'static str],
}

impl<'a> OverrideReader<'a> {
    pub fn new(overrides: &'a ConfigOverrides, accepted: &'static [&'static str]) -> Self {
        Self { overrides, accepted }
    }

    /// Keys this kind does not recognise, in key order.
    pub fn unknown_keys(&self) -> impl Iterator<Item = (&'a String, &'a Value)> + 'a {
        let accepted = self.accepted;
        self.overrides
            .iter()
            .filter(move |(key, _)| !accepted.contains(&key.as_str()))
    }

    fn value(&self, key: &str) -> Option<&'a Value> {
        self.overrides.get(key).filter(|v| !v.is_null())
    }

    pub fn string(&self, key: &str) -> Result<Option<String>, InvalidOverrideValue> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(Some(s.trim().to_string())),
            Some(other) => Err(InvalidOverrideValue::new(key, "a non-empty string", other)),
        }
    }

    pub fn positive_number(&self, key: &str) -> Result<Option<f64>, InvalidOverrideValue> {
        match self.value(key) {
            None => Ok(None),
            Some(value) => match value.as_f64() {
                Some(n) if n.is_finite() && n > 0.0 => Ok(Some(n)),
                _ => Err(InvalidOverrideValue::new(key, "a positive number", value)),
            },
        }
    }

    /// A non-negative length: a bare number in meters, or `{ "value", "unit" }`.
    pub fn length(&self, key: &str) -> Result<Option<Length>, InvalidOverrideValue> {
        const EXPECTED: &str = "a non-negative length in meters or {value, unit}";
        let Some(value) = self.value(key) else {
            return Ok(None);
        };

        let length = match value {
            Value::Number(n) => n.as_f64().map(from_coord),
            Value::Object(_) => serde_json::from_value::<LengthValue>(value.clone())
                .ok()
                .and_then(|tagged| tagged.to_length().ok()),
            _ => None,
        };

        match length {
            Some(l) if to_coord(l).is_finite() && to_coord(l) >= 0.0 => Ok(Some(l)),
            _ => Err(InvalidOverrideValue::new(key, EXPECTED, value)),
        }
    }

    /// A catalogue diameter in whole millimeters.
    pub fn diameter(&self, key: &str) -> Result<Option<DiameterMm>, InvalidOverrideValue> {
        match self.value(key) {
            None => Ok(None),
            Some(value) => match value.as_u64() {
                Some(d) if CANDIDATE_DIAMETERS_MM.iter().any(|&c| u64::from(c) == d) => {
                    Ok(Some(d as DiameterMm))
                }
                _ => Err(InvalidOverrideValue::new(
                    key,
                    "one of 6, 7, 8, 10, 12 or 14 mm",
                    value,
                )),
            },
        }
    }

    /// Parse a string value through `FromStr`.
    pub fn parsed<T: FromStr>(
        &self,
        key: &str,
        expected: &'static str,
    ) -> Result<Option<T>, InvalidOverrideValue> {
        match self.value(key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .and_then(|s| s.parse().ok())
                .map(Some)
                .ok_or_else(|| InvalidOverrideValue::new(key, expected, value)),
        }
    }

    /// Deserialize a structured value.
    pub fn structured<T: DeserializeOwned>(
        &self,
        key: &str,
        expected: &'static str,
    ) -> Result<Option<T>, InvalidOverrideValue> {
        match self.value(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|_| InvalidOverrideValue::new(key, expected, value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    const ACCEPTED: &[&str] = &["colour", "led_aft", "diameter", "overlap_percent"];

    fn overrides(value: Value) -> ConfigOverrides {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_lengths_accept_meters_and_tagged_units() {
        let map = overrides(json!({
            "led_aft": 2.5,
            "luff": {"value": 11000.0, "unit": "mm"},
        }));
        let reader = OverrideReader::new(&map, ACCEPTED);

        assert_relative_eq!(to_coord(reader.length("led_aft").unwrap().unwrap()), 2.5);
        assert_relative_eq!(to_coord(reader.length("luff").unwrap().unwrap()), 11.0);
        assert!(reader.length("missing").unwrap().is_none());
    }

    #[test]
    fn test_invalid_values_name_the_key() {
        let map = overrides(json!({
            "led_aft": "two metres",
            "diameter": 7.5,
            "overlap_percent": -10,
            "colour": "",
        }));
        let reader = OverrideReader::new(&map, ACCEPTED);

        let err = reader.length("led_aft").unwrap_err();
        assert_eq!(err.key, "led_aft");
        assert_eq!(err.found, "\"two metres\"");
        assert!(reader.diameter("diameter").is_err());
        assert!(reader.positive_number("overlap_percent").is_err());
        assert!(reader.string("colour").is_err());
    }

    #[test]
    fn test_diameter_must_be_a_catalogue_size() {
        let map = overrides(json!({"small": 6, "large": 14, "odd": 9, "huge": 9999, "zero": 0}));
        let reader = OverrideReader::new(&map, &[]);

        assert_eq!(reader.diameter("small").unwrap(), Some(6));
        assert_eq!(reader.diameter("large").unwrap(), Some(14));
        for key in ["odd", "huge", "zero"] {
            let err = reader.diameter(key).unwrap_err();
            assert_eq!(err.key, key);
            assert_eq!(err.expected, "one of 6, 7, 8, 10, 12 or 14 mm");
        }
    }

    #[test]
    fn test_null_counts_as_absent() {
        let map = overrides(json!({"colour": null}));
        let reader = OverrideReader::new(&map, ACCEPTED);
        assert_eq!(reader.string("colour").unwrap(), None);
    }

    #[test]
    fn test_unknown_keys_are_reported() {
        let map = overrides(json!({"colour": "Red", "sparkle": true, "brand": "Acme"}));
        let reader = OverrideReader::new(&map, ACCEPTED);
        let unknown: Vec<&str> = reader.unknown_keys().map(|(k, _)| k.as_str()).collect();
        assert_eq!(unknown, vec!["brand", "sparkle"]);
    }

    #[test]
    fn test_overlay_prefers_top() {
        let base = overrides(json!({"colour": "Red", "led_aft": 1.0}));
        let top = overrides(json!({"colour": "Blue"}));
        let merged = overlay(&base, &top);
        assert_eq!(merged["colour"], json!("Blue"));
        assert_eq!(merged["led_aft"], json!(1.0));
    }
}
