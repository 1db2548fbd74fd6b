//! Store item codec.
//!
//! The partitioned store holds items as maps of attribute name to
//! [`AttributeValue`]. Numbers are held as decimal strings, never as binary
//! floating point, so every write converts JSON numbers into the decimal form
//! and every read converts them back into ordinary floating point.
//!
//! # Key attributes
//!
//! | Attribute | Value |
//! |-----------|-------|
//! | `PK` / `SK` | `<KIND>#<id>` |
//! | `GSI1PK` | kind name, or `EVENT#<YYYY-MM-DD>` for events |
//! | `GSI1SK` | record name, or `start_time` for events |
//! | `EntityType` | `venue`, `company`, `meetup`, `event` |

use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

pub const PK: &str = "PK";
pub const SK: &str = "SK";
pub const GSI1PK: &str = "GSI1PK";
pub const GSI1SK: &str = "GSI1SK";
pub const ENTITY_TYPE: &str = "EntityType";
pub const CREATED_AT: &str = "CreatedAt";
pub const UPDATED_AT: &str = "UpdatedAt";

/// Largest integer an `f64` represents exactly (2^53).
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// A single attribute value in the store's native representation.
///
/// Serializes in the externally tagged form used on the wire and in the
/// SQLite `item_json` column, e.g. `{"N": "3.14"}` or `{"L": [{"S": "aws"}]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    /// Decimal number held as its string form.
    N(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    L(Vec<AttributeValue>),
    M(BTreeMap<String, AttributeValue>),
    SS(Vec<String>),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }
}

/// A stored item: attribute name to value.
pub type Item = BTreeMap<String, AttributeValue>;

/// Composite primary key of an item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub pk: String,
    pub sk: String,
}

impl PrimaryKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }

    /// Key whose partition and sort parts are identical, as every record
    /// kind in this table uses.
    pub fn single(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            pk: key.clone(),
            sk: key,
        }
    }

    /// Extract the primary key from an item's `PK`/`SK` attributes.
    pub fn of_item(item: &Item) -> Option<Self> {
        let pk = item.get(PK)?.as_str()?;
        let sk = item.get(SK)?.as_str()?;
        Some(Self::new(pk, sk))
    }
}

/// Read a string attribute from an item.
pub fn string_attr<'a>(item: &'a Item, name: &str) -> Option<&'a str> {
    item.get(name).and_then(AttributeValue::as_str)
}

/// Convert a JSON number into the store's decimal string form.
///
/// Floats use the shortest representation that round-trips, so `3.14`
/// becomes `"3.14"` rather than a long binary expansion.
pub fn number_to_decimal(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| "0".to_string())
    }
}

/// Convert a stored decimal string back into a JSON number.
///
/// Values with no fractional part surface as JSON integers so integer record
/// fields (capacity, member counts) decode; everything else is an `f64`.
pub fn decimal_to_number(decimal: &str) -> Result<Value> {
    let f: f64 = decimal
        .trim()
        .parse()
        .with_context(|| format!("invalid decimal attribute: {:?}", decimal))?;
    if !f.is_finite() {
        bail!("non-finite decimal attribute: {:?}", decimal);
    }
    if f.fract() == 0.0 && f.abs() <= MAX_EXACT_INT {
        return Ok(Value::from(f as i64));
    }
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| anyhow!("unrepresentable decimal attribute: {:?}", decimal))
}

/// Convert a JSON value into an attribute value (write path).
pub fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(number_to_decimal(n)),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), to_attribute(v)))
                .collect(),
        ),
    }
}

/// Convert an attribute value into JSON (read path).
pub fn from_attribute(value: &AttributeValue) -> Result<Value> {
    Ok(match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => decimal_to_number(n)?,
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(items) => Value::Array(
            items
                .iter()
                .map(from_attribute)
                .collect::<Result<Vec<_>>>()?,
        ),
        AttributeValue::M(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                out.insert(k.clone(), from_attribute(v)?);
            }
            Value::Object(out)
        }
        AttributeValue::SS(items) => {
            Value::Array(items.iter().cloned().map(Value::String).collect())
        }
    })
}

/// Convert a JSON object into an item.
pub fn to_item(value: &Value) -> Result<Item> {
    match to_attribute(value) {
        AttributeValue::M(map) => Ok(map),
        _ => bail!("item must be a JSON object"),
    }
}

/// Convert an item into a JSON object.
pub fn from_item(item: &Item) -> Result<Value> {
    let mut out = Map::new();
    for (k, v) in item {
        out.insert(k.clone(), from_attribute(v)?);
    }
    Ok(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_float_written_as_decimal_string() {
        assert_eq!(to_attribute(&json!(3.14)), AttributeValue::N("3.14".into()));
        assert_eq!(to_attribute(&json!(99.99)), AttributeValue::N("99.99".into()));
    }

    #[test]
    fn test_nested_floats_converted_ints_unchanged() {
        let item = to_item(&json!({
            "price": 99.99,
            "details": { "rating": 4.5, "count": 100 },
            "tags": ["python", "aws"]
        }))
        .unwrap();

        assert_eq!(item["price"], AttributeValue::N("99.99".into()));
        match &item["details"] {
            AttributeValue::M(m) => {
                assert_eq!(m["rating"], AttributeValue::N("4.5".into()));
                assert_eq!(m["count"], AttributeValue::N("100".into()));
            }
            other => panic!("expected map, got {:?}", other),
        }
        assert_eq!(
            item["tags"],
            AttributeValue::L(vec![
                AttributeValue::S("python".into()),
                AttributeValue::S("aws".into())
            ])
        );
    }

    #[test]
    fn test_decimal_read_back_as_float() {
        let v = from_attribute(&AttributeValue::N("2.5".into())).unwrap();
        assert!(v.is_f64());
        assert!((v.as_f64().unwrap() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_integral_decimal_decodes_into_integer_field() {
        let v = from_attribute(&AttributeValue::N("150.0".into())).unwrap();
        assert_eq!(v, json!(150));
        let capacity: u32 = serde_json::from_value(v).unwrap();
        assert_eq!(capacity, 150);
    }

    #[test]
    fn test_invalid_decimal_rejected() {
        assert!(decimal_to_number("twelve").is_err());
        assert!(decimal_to_number("inf").is_err());
    }

    #[test]
    fn test_wire_shape() {
        let s = serde_json::to_string(&AttributeValue::N("1".into())).unwrap();
        assert_eq!(s, r#"{"N":"1"}"#);
        let s = serde_json::to_string(&AttributeValue::Null(true)).unwrap();
        assert_eq!(s, r#"{"NULL":true}"#);
        let back: AttributeValue = serde_json::from_str(r#"{"BOOL":false}"#).unwrap();
        assert_eq!(back, AttributeValue::Bool(false));
    }

    #[test]
    fn test_string_set_reads_as_array() {
        let v = from_attribute(&AttributeValue::SS(vec!["wifi".into(), "parking".into()]))
            .unwrap();
        assert_eq!(v, json!(["wifi", "parking"]));
    }

    #[test]
    fn test_primary_key_of_item() {
        let mut item = Item::new();
        item.insert(PK.into(), AttributeValue::S("VENUE#v1".into()));
        item.insert(SK.into(), AttributeValue::S("VENUE#v1".into()));
        assert_eq!(PrimaryKey::of_item(&item), Some(PrimaryKey::single("VENUE#v1")));
        item.remove(SK);
        assert_eq!(PrimaryKey::of_item(&item), None);
    }
}
