//! # Form Schema
//!
//! `FormSchema` is the top-level aggregate: optional title and description,
//! the ordered field list, and styling hooks. Fields keep insertion order,
//! which is the order they are displayed in. Names are unique.
//!
//! Parsing goes field by field so that a bad definition is reported with
//! the name of the field that carries it.

use serde::de::Error as _;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::SchemaError;
use crate::field::Field;

/// Class-name hooks passed through unmodified to the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Styling {
    /// Applied to the form element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_class_name: Option<String>,
}

/// Declarative description of a form.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    pub title: Option<String>,
    /// Shown under the title.
    pub description: Option<String>,
    pub styling: Option<Styling>,
    fields: Vec<(String, Field)>,
}

/// Wire shape before per-field parsing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchema {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    fields: serde_json::Map<String, Value>,
    #[serde(default)]
    styling: Option<Styling>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_styling(mut self, styling: Styling) -> Self {
        self.styling = Some(styling);
        self
    }

    /// Builder form of [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// Same as `insert`.
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        field: impl Into<Field>,
    ) -> Result<Self, SchemaError> {
        self.insert(name, field)?;
        Ok(self)
    }

    /// Append a field at the end of the display order.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Malformed` if the name is empty or already used.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        field: impl Into<Field>,
    ) -> Result<(), SchemaError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SchemaError::malformed(name, "field name must not be empty"));
        }
        if self.get(&name).is_some() {
            return Err(SchemaError::malformed(name, "duplicate field name"));
        }
        self.fields.push((name, field.into()));
        Ok(())
    }

    /// Parse a schema from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidStructure` if the document is not an
    /// object with a `fields` map, and `SchemaError::Malformed` naming the
    /// first field whose definition does not parse (unknown `type`, missing
    /// `label`, array without `itemsType`, ...).
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        let raw: RawSchema = serde_json::from_value(value)
            .map_err(|e| SchemaError::InvalidStructure(e.to_string()))?;

        let mut schema = FormSchema {
            title: raw.title,
            description: raw.description,
            styling: raw.styling,
            fields: Vec::with_capacity(raw.fields.len()),
        };

        for (name, definition) in raw.fields {
            if !definition.is_object() {
                return Err(SchemaError::malformed(
                    name,
                    "field definition must be an object",
                ));
            }
            let field: Field = serde_json::from_value(definition)
                .map_err(|e| SchemaError::malformed(name.clone(), e.to_string()))?;
            schema.insert(name, field)?;
        }

        Ok(schema)
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    /// Fields in display order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

struct FieldMap<'a>(&'a [(String, Field)]);

impl Serialize for FieldMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, field) in self.0 {
            map.serialize_entry(name, field)?;
        }
        map.end()
    }
}

impl Serialize for FormSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("FormSchema", 4)?;
        if let Some(title) = &self.title {
            s.serialize_field("title", title)?;
        }
        if let Some(description) = &self.description {
            s.serialize_field("description", description)?;
        }
        s.serialize_field("fields", &FieldMap(&self.fields))?;
        if let Some(styling) = &self.styling {
            s.serialize_field("styling", styling)?;
        }
        s.end()
    }
}

impl<'de> Deserialize<'de> for FormSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FormSchema::from_value(value).map_err(D::Error::custom)
    }
}
