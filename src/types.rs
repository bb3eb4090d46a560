use std::fmt;

use crate::conversions::field_type_to_str;
use crate::error::{Result, VctError};

/// Semantic type of an attribute field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldType {
    Char,
    Varchar,
    Int,
    Float,
    Double,
    Date,
    Time,
    Datetime,
    Varbin,
    /// A type token this crate does not know, kept verbatim.
    Other(String),
}

impl FieldType {
    /// Whether a field of this type may be added to a table structure.
    pub fn is_supported(&self) -> bool {
        !matches!(self, FieldType::Other(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(field_type_to_str(self))
    }
}

/// One entry of the field catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    /// `-1` means unbounded.
    pub length: i32,
    /// `-1` means not applicable.
    pub precision: i32,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            length: -1,
            precision: -1,
        }
    }

    pub fn with_length(mut self, length: i32, precision: i32) -> Self {
        self.length = length;
        self.precision = precision;
        self
    }

    /// Interpret a stored value according to the declared field type.
    ///
    /// Attribute values are kept in their textual form after decoding; this
    /// turns `Int` text into `Value::Integer` and `Float`/`Double` text into
    /// `Value::Real`. Other types are returned unchanged.
    pub fn interpret(&self, value: &Value) -> Result<Value> {
        let text = match value {
            Value::Text(text) => text.trim(),
            other => return Ok(other.clone()),
        };
        let invalid = || VctError::InvalidFieldValue {
            field: self.name.clone(),
            value: text.to_string(),
        };
        match self.field_type {
            FieldType::Int => text.parse::<i64>().map(Value::Integer).map_err(|_| invalid()),
            FieldType::Float | FieldType::Double => {
                text.parse::<f64>().map(Value::Real).map_err(|_| invalid())
            }
            _ => Ok(value.clone()),
        }
    }
}

/// Document-level geometry kind, decided by the feature-code section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
    Unknown,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryKind::Point => "Point",
            GeometryKind::Line => "Line",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Axis-aligned bounding rectangle. An extent whose maximum lies below its
/// minimum on either axis is empty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub const EMPTY: Extent = Extent {
        min_x: f64::MAX,
        min_y: f64::MAX,
        max_x: f64::MIN,
        max_y: f64::MIN,
    };

    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    /// Grow this extent to cover `other`.
    pub fn combine(&mut self, other: &Extent) {
        if other.is_empty() {
            return;
        }
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }
}

impl Default for Extent {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Coordinate reference system identifier, treated as opaque.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Crs {
    pub authority: &'static str,
    pub code: u32,
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.authority, self.code)
    }
}

/// Feature-code metadata: what kind of features the document holds.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureClass {
    pub type_code: String,
    pub type_name: String,
    pub geometry_kind: GeometryKind,
    /// The geometry token as read from the file, used when the kind is unknown.
    pub geometry_token: String,
    pub attribute_table_name: String,
}

impl FeatureClass {
    pub fn new(
        type_code: impl Into<String>,
        type_name: impl Into<String>,
        geometry_kind: GeometryKind,
        attribute_table_name: impl Into<String>,
    ) -> Self {
        Self {
            type_code: type_code.into(),
            type_name: type_name.into(),
            geometry_kind,
            geometry_token: geometry_kind.to_string(),
            attribute_table_name: attribute_table_name.into(),
        }
    }
}

impl Default for FeatureClass {
    fn default() -> Self {
        Self::new("", "", GeometryKind::Unknown, "")
    }
}

/// Owned dynamic attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Boolean(bool),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Textual form written to the attribute section. `Null` is the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(value) => write!(f, "{value}"),
            Value::Real(value) => write!(f, "{value}"),
            Value::Text(value) => f.write_str(value),
            Value::Boolean(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = VctError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Integer(value) => Ok(value),
            Value::Real(value) if value.fract() == 0.0 => {
                if value < i64::MIN as f64 || value > i64::MAX as f64 {
                    Err(VctError::ValueOutOfRange { target: "i64" })
                } else {
                    Ok(value as i64)
                }
            }
            Value::Text(text) => text.trim().parse().map_err(|_| VctError::ValueTypeMismatch {
                expected: "integer",
                actual: "text",
            }),
            other => Err(VctError::ValueTypeMismatch {
                expected: "integer",
                actual: other.type_name(),
            }),
        }
    }
}

impl TryFrom<Value> for i32 {
    type Error = VctError;

    fn try_from(value: Value) -> Result<Self> {
        let value: i64 = value.try_into()?;
        i32::try_from(value).map_err(|_| VctError::ValueOutOfRange { target: "i32" })
    }
}

impl TryFrom<Value> for f64 {
    type Error = VctError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Real(value) => Ok(value),
            Value::Integer(value) => Ok(value as f64),
            Value::Text(text) => text.trim().parse().map_err(|_| VctError::ValueTypeMismatch {
                expected: "real",
                actual: "text",
            }),
            other => Err(VctError::ValueTypeMismatch {
                expected: "real",
                actual: other.type_name(),
            }),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = VctError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(value) => Ok(value),
            Value::Integer(value) => Ok(value != 0),
            Value::Text(text) if text.eq_ignore_ascii_case("true") => Ok(true),
            Value::Text(text) if text.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(VctError::ValueTypeMismatch {
                expected: "boolean",
                actual: other.type_name(),
            }),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = VctError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Null => Err(VctError::ValueTypeMismatch {
                expected: "text",
                actual: "null",
            }),
            other => Ok(other.to_string()),
        }
    }
}

macro_rules! impl_try_from_value_for_option {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<Value> for Option<$ty> {
                type Error = VctError;

                fn try_from(value: Value) -> Result<Self> {
                    match value {
                        Value::Null => Ok(None),
                        other => <$ty>::try_from(other).map(Some),
                    }
                }
            }
        )*
    };
}

impl_try_from_value_for_option!(i64, i32, f64, bool, String);

#[cfg(test)]
mod tests {
    use super::{Extent, FieldSpec, FieldType, Value};
    use crate::Result;
    use crate::error::VctError;

    #[test]
    fn interpret_follows_declared_type() -> Result<()> {
        let count = FieldSpec::new("count", FieldType::Int);
        assert_eq!(count.interpret(&Value::from("12"))?, Value::Integer(12));

        let area = FieldSpec::new("area", FieldType::Double).with_length(10, 2);
        assert_eq!(area.interpret(&Value::from(" 3.5"))?, Value::Real(3.5));

        let name = FieldSpec::new("name", FieldType::Varchar);
        assert_eq!(name.interpret(&Value::from("12"))?, Value::from("12"));
        assert_eq!(count.interpret(&Value::Null)?, Value::Null);
        Ok(())
    }

    #[test]
    fn interpret_rejects_non_numeric_text() {
        let count = FieldSpec::new("count", FieldType::Int);
        let err = count
            .interpret(&Value::from("twelve"))
            .expect_err("text is not an integer");
        assert!(matches!(err, VctError::InvalidFieldValue { .. }));
    }

    #[test]
    fn null_converts_to_none() -> Result<()> {
        let maybe: Option<i64> = Value::Null.try_into()?;
        assert_eq!(maybe, None);
        let some: Option<i64> = Value::from("7").try_into()?;
        assert_eq!(some, Some(7));

        let err = String::try_from(Value::Null).expect_err("null is not text");
        assert!(matches!(err, VctError::ValueTypeMismatch { .. }));
        Ok(())
    }

    #[test]
    fn null_displays_as_empty_text() {
        assert!(Value::Null.is_null());
        assert!(!Value::from("").is_null());
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Real(2.5).to_string(), "2.5");
        assert_eq!(Value::Boolean(true).to_string(), "true");
    }

    #[test]
    fn extent_combine_ignores_empty() {
        let mut extent = Extent::EMPTY;
        assert!(extent.is_empty());
        extent.combine(&Extent::new(0.0, 0.0, 1.0, 1.0));
        extent.combine(&Extent::EMPTY);
        extent.combine(&Extent::new(-1.0, 0.5, 0.5, 3.0));
        assert_eq!(extent, Extent::new(-1.0, 0.0, 1.0, 3.0));
    }
}
