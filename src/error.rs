use std::error::Error;
use std::fmt;

use crate::types::GeometryKind;

/// Crate error type for VCT operations.
#[derive(Debug)]
pub enum VctError {
    /// Wraps errors returned while reading or writing the backing file.
    Io(std::io::Error),
    /// Wraps errors returned by the `wkb` crate.
    Wkb(wkb::error::WkbError),
    /// A `<Kind>Begin` marker had no matching `<Kind>End` line.
    UnterminatedSection {
        section: &'static str,
        line: usize,
    },
    /// A multi-line record ran past the end of its section.
    UnexpectedEndOfSection {
        section: &'static str,
    },
    /// A line that must hold an integer did not parse.
    InvalidNumber {
        line: usize,
        value: String,
    },
    /// A line that must hold an `x,y` pair did not parse.
    InvalidCoordinate {
        line: usize,
        value: String,
    },
    /// A line did not have the shape its section requires.
    MalformedLine {
        line: usize,
        message: String,
    },
    /// A record held a token the decoder does not accept at that position.
    UnexpectedToken {
        line: usize,
        expected: &'static str,
        value: String,
    },
    /// A polygon record exhausted its border count without the `0` terminator.
    UnterminatedRecord {
        section: &'static str,
        id: i64,
    },
    /// An attribute row referenced a feature that no geometry section declared.
    UnknownFeatureId {
        id: i64,
        line: usize,
    },
    /// A geometry could not be mapped to one of the VCT geometry kinds.
    UnsupportedGeometryType(String),
    /// A geometry kind did not match the document's geometry kind.
    GeometryKindMismatch {
        expected: GeometryKind,
        actual: GeometryKind,
    },
    /// A new feature carried more attribute values than the field catalog.
    TooManyAttributes {
        expected: usize,
        got: usize,
    },
    /// A field index was outside the field catalog.
    InvalidFieldIndex {
        index: usize,
        field_count: usize,
    },
    /// A field with the same name already exists.
    FieldAlreadyExists {
        name: String,
    },
    /// A field type cannot be added to a VCT table structure.
    UnsupportedFieldType {
        field: String,
        field_type: String,
    },
    /// Dynamic `Value` type did not match the expected conversion target.
    ValueTypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    /// Numeric conversion failed because the value is out of range.
    ValueOutOfRange {
        target: &'static str,
    },
    /// A textual value could not be interpreted as the field's declared type.
    InvalidFieldValue {
        field: String,
        value: String,
    },
    /// A text value holds a comma or line break, which would split its
    /// attribute row.
    UnwritableValue {
        value: String,
    },
    /// Requested feature does not exist.
    MissingFeature {
        id: i64,
    },
    /// Mutation attempted on a document opened read-only.
    ReadOnly,
    /// Mutation attempted on a document whose feature code names no supported
    /// geometry kind.
    InvalidDocument {
        geometry_token: String,
    },
    /// Anything else, carried as a human-readable message.
    Message(String),
}

impl fmt::Display for VctError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Wkb(err) => write!(f, "{err}"),
            Self::UnterminatedSection { section, line } => {
                write!(f, "section {section} opened at line {line} has no {section}End")
            }
            Self::UnexpectedEndOfSection { section } => {
                write!(f, "unexpected end of {section} section inside a record")
            }
            Self::InvalidNumber { line, value } => {
                write!(f, "line {line}: expected an integer, got '{value}'")
            }
            Self::InvalidCoordinate { line, value } => {
                write!(f, "line {line}: expected an x,y coordinate, got '{value}'")
            }
            Self::MalformedLine { line, message } => write!(f, "line {line}: {message}"),
            Self::UnexpectedToken {
                line,
                expected,
                value,
            } => write!(f, "line {line}: expected {expected}, got '{value}'"),
            Self::UnterminatedRecord { section, id } => {
                write!(f, "{section} record {id} has no terminating 0 line")
            }
            Self::UnknownFeatureId { id, line } => {
                write!(f, "line {line}: attribute row references unknown feature {id}")
            }
            Self::UnsupportedGeometryType(ty) => write!(f, "unsupported geometry type: {ty}"),
            Self::GeometryKindMismatch { expected, actual } => write!(
                f,
                "Could not add feature with geometry type {actual} to layer of type {expected}"
            ),
            Self::TooManyAttributes { expected, got } => write!(
                f,
                "Feature has too many attributes (expecting {expected}, received {got})"
            ),
            Self::InvalidFieldIndex { index, field_count } => {
                write!(f, "invalid field index {index} (field count is {field_count})")
            }
            Self::FieldAlreadyExists { name } => write!(f, "field name already in use: {name}"),
            Self::UnsupportedFieldType { field, field_type } => {
                write!(f, "field type not supported for field '{field}': {field_type}")
            }
            Self::ValueTypeMismatch { expected, actual } => {
                write!(f, "expected {expected}, got {actual}")
            }
            Self::ValueOutOfRange { target } => write!(f, "value out of range for {target}"),
            Self::InvalidFieldValue { field, value } => {
                write!(f, "value '{value}' does not match the type of field '{field}'")
            }
            Self::UnwritableValue { value } => {
                write!(f, "attribute value {value:?} contains a comma or line break")
            }
            Self::MissingFeature { id } => write!(f, "no feature with id {id}"),
            Self::ReadOnly => write!(f, "operation not allowed on read-only document"),
            Self::InvalidDocument { geometry_token } => write!(
                f,
                "operation not allowed on document with geometry type '{geometry_token}'"
            ),
            Self::Message(message) => write!(f, "{message}"),
        }
    }
}

impl Error for VctError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Wkb(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for VctError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<wkb::error::WkbError> for VctError {
    fn from(err: wkb::error::WkbError) -> Self {
        Self::Wkb(err)
    }
}

pub type Result<T> = std::result::Result<T, VctError>;
