//! JSON column types.
//!
//! SQLite stores JSON as `TEXT`; these wrappers serialize on write and parse
//! on read so the schema never constrains the shape of the payload.

use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open-ended object column (`meta`, `extra`, `metadata`, `payload`, ...).
///
/// Keys are whatever the application layer chose to write; unknown fields are
/// preserved verbatim across a read/write cycle. A stored value that is not an
/// object (imported rows may hold arrays or scalars) reads back as a document
/// with the single key [`Document::SCALAR_KEY`] and is written back unwrapped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(transparent)]
pub struct Document(pub Map<String, Value>);

impl Document {
    pub const SCALAR_KEY: &'static str = "$value";

    pub fn new() -> Self {
        Self::default()
    }

    /// Objects are kept as they are; any other value is held under
    /// [`Document::SCALAR_KEY`].
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Document(map),
            other => {
                let mut map = Map::new();
                map.insert(Self::SCALAR_KEY.to_string(), other);
                Document(map)
            }
        }
    }

    /// Inverse of [`Document::from_value`].
    pub fn to_value(&self) -> Value {
        match self.0.get(Self::SCALAR_KEY) {
            Some(inner) if self.0.len() == 1 => inner.clone(),
            _ => Value::Object(self.0.clone()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style variant of [`Document::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Document {
    fn from(value: Map<String, Value>) -> Self {
        Document(value)
    }
}

impl TryFrom<Value> for Document {
    type Error = Value;

    /// Only JSON objects convert; anything else is handed back unchanged.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Document(map)),
            other => Err(other),
        }
    }
}

impl ToSql<Text, Sqlite> for Document {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(serde_json::to_string(&self.to_value())?);
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for Document {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        Ok(Document::from_value(serde_json::from_str(&text)?))
    }
}

/// Any JSON value: lists of days/times, permission sets, attachments, setting values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(transparent)]
pub struct Json(pub Value);

impl From<Value> for Json {
    fn from(value: Value) -> Self {
        Json(value)
    }
}

impl ToSql<Text, Sqlite> for Json {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(serde_json::to_string(&self.0)?);
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for Json {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        Ok(Json(serde_json::from_str(&text)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_accepts_only_objects() {
        let doc = Document::try_from(json!({"kamar": "A1", "tags": [1, 2]})).unwrap();
        assert_eq!(doc.get("kamar"), Some(&json!("A1")));
        assert!(Document::try_from(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn non_object_values_are_wrapped_and_unwrapped() {
        let doc = Document::from_value(json!([1, 2]));
        assert_eq!(doc.get(Document::SCALAR_KEY), Some(&json!([1, 2])));
        assert_eq!(doc.to_value(), json!([1, 2]));

        let scalar = Document::from_value(json!("catatan lama"));
        assert_eq!(scalar.to_value(), json!("catatan lama"));

        let object = Document::new().with(Document::SCALAR_KEY, 1).with("kamar", "B2");
        assert_eq!(object.to_value(), json!({"$value": 1, "kamar": "B2"}));
    }

    #[test]
    fn document_serializes_transparently() {
        let doc = Document::new().with("source", "firebase").with("legacy", true);
        let text = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&text).unwrap();
        assert_eq!(back, doc);
        assert!(text.starts_with('{'));
    }
}
