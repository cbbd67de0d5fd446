//! Typed, location-aware access to schema documents.
//!
//! Every accessor that narrows a value reports a [`SchemaError`] pointing at the offending
//! location, so loaders never have to build locations by hand.
use std::cell::RefCell;

use ahash::AHashSet;
use serde_json::{Map, Number, Value};

use crate::{error::SchemaError, paths::Location, types};

/// A JSON value inside a schema document together with its JSON Pointer.
#[derive(Debug, Clone)]
pub(crate) struct JsonValue<'a> {
    value: &'a Value,
    location: Location,
}

impl<'a> JsonValue<'a> {
    pub(crate) fn new(value: &'a Value, location: Location) -> JsonValue<'a> {
        JsonValue { value, location }
    }

    pub(crate) fn value(&self) -> &'a Value {
        self.value
    }

    pub(crate) fn location(&self) -> &Location {
        &self.location
    }

    fn mismatch(&self, expected: &'static str) -> SchemaError {
        SchemaError::type_mismatch(self.location.clone(), expected, self.value)
    }

    pub(crate) fn require_string(&self) -> Result<&'a str, SchemaError> {
        self.value.as_str().ok_or_else(|| self.mismatch("string"))
    }

    pub(crate) fn require_bool(&self) -> Result<bool, SchemaError> {
        self.value.as_bool().ok_or_else(|| self.mismatch("boolean"))
    }

    pub(crate) fn require_number(&self) -> Result<&'a Number, SchemaError> {
        match self.value {
            Value::Number(number) => Ok(number),
            _ => Err(self.mismatch("number")),
        }
    }

    /// An integer, `2.0` included.
    pub(crate) fn require_integer(&self) -> Result<i64, SchemaError> {
        let number = self.require_number().map_err(|_| self.mismatch("integer"))?;
        if let Some(value) = number.as_i64() {
            return Ok(value);
        }
        if types::is_integer(number) {
            if let Some(value) = number.as_f64() {
                #[allow(clippy::cast_possible_truncation)]
                return Ok(value as i64);
            }
        }
        Err(self.mismatch("integer"))
    }

    /// A non-negative integer, as used by length and count keywords.
    pub(crate) fn require_non_negative(&self, keyword: &'static str) -> Result<u64, SchemaError> {
        if let Some(value) = self.value.as_u64() {
            return Ok(value);
        }
        let value = self.require_integer()?;
        u64::try_from(value).map_err(|_| {
            SchemaError::invalid_value(
                self.location.clone(),
                keyword,
                format!("{value} is negative"),
            )
        })
    }

    pub(crate) fn require_object(&self) -> Result<JsonObject<'a>, SchemaError> {
        match self.value {
            Value::Object(map) => Ok(JsonObject::new(map, self.location.clone())),
            _ => Err(self.mismatch("object")),
        }
    }

    pub(crate) fn require_array(&self) -> Result<&'a [Value], SchemaError> {
        match self.value {
            Value::Array(items) => Ok(items),
            _ => Err(self.mismatch("array")),
        }
    }

    /// Array items with their locations, in source order.
    pub(crate) fn items(&self) -> Result<impl Iterator<Item = JsonValue<'a>> + '_, SchemaError> {
        let items = self.require_array()?;
        Ok(items
            .iter()
            .enumerate()
            .map(|(idx, item)| JsonValue::new(item, self.location.join(idx))))
    }

    /// Array of strings, e.g. `required`.
    pub(crate) fn require_string_array(&self) -> Result<Vec<String>, SchemaError> {
        self.items()?
            .map(|item| item.require_string().map(str::to_string))
            .collect()
    }
}

/// A JSON object inside a schema document.
///
/// Tracks which keys were read, so the keys nobody recognized can be reported afterwards.
/// A projection hides some keys from an otherwise shared object.
#[derive(Debug)]
pub(crate) struct JsonObject<'a> {
    map: &'a Map<String, Value>,
    location: Location,
    hidden: Vec<&'static str>,
    consumed: RefCell<AHashSet<&'a str>>,
}

impl<'a> JsonObject<'a> {
    pub(crate) fn new(map: &'a Map<String, Value>, location: Location) -> JsonObject<'a> {
        JsonObject {
            map,
            location,
            hidden: Vec::new(),
            consumed: RefCell::new(AHashSet::new()),
        }
    }

    fn is_visible(&self, key: &str) -> bool {
        !self.hidden.iter().any(|hidden| *hidden == key)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.is_visible(key) && self.map.contains_key(key)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.map.keys().all(|key| !self.is_visible(key))
    }

    /// The member under `key`, marking it as consumed.
    pub(crate) fn maybe(&self, key: &str) -> Option<JsonValue<'a>> {
        if !self.is_visible(key) {
            return None;
        }
        let (key, value) = self.map.get_key_value(key)?;
        self.consumed.borrow_mut().insert(key.as_str());
        Some(JsonValue::new(value, self.location.join(key)))
    }

    pub(crate) fn require(&self, key: &str) -> Result<JsonValue<'a>, SchemaError> {
        self.maybe(key)
            .ok_or_else(|| SchemaError::missing_keyword(self.location.clone(), key))
    }

    /// Visible members in source order. Iteration does not consume them.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&'a str, JsonValue<'a>)> + '_ {
        self.map
            .iter()
            .filter(|(key, _)| self.is_visible(key))
            .map(|(key, value)| (key.as_str(), JsonValue::new(value, self.location.join(key))))
    }

    /// A fresh view of the same object with `keys` hidden as well.
    pub(crate) fn project(&self, keys: &[&'static str]) -> JsonObject<'a> {
        let mut hidden = self.hidden.clone();
        hidden.extend_from_slice(keys);
        JsonObject {
            map: self.map,
            location: self.location.clone(),
            hidden,
            consumed: RefCell::new(AHashSet::new()),
        }
    }

    /// Visible members that were never read through [`JsonObject::maybe`].
    pub(crate) fn remaining(&self) -> Map<String, Value> {
        let consumed = self.consumed.borrow();
        self.map
            .iter()
            .filter(|(key, _)| self.is_visible(key) && !consumed.contains(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
