//! Conversion errors.

use thiserror::Error;
use typebridge_types::{ConversionError, FieldTypeError};

/// Direction of a conversion across the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Domain value into the runtime.
    Push,
    /// Runtime value into the domain.
    Pull,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Push => write!(f, "push"),
            Direction::Pull => write!(f, "pull"),
        }
    }
}

/// Error raised by any conversion, member call or selector resolution.
///
/// Composite converters wrap the error of a failing element with
/// [`ReflectError::Field`], [`ReflectError::Index`] or [`ReflectError::Key`],
/// so the rendered message reads as a path from the outermost value inward.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReflectError {
    #[error("unknown type {0:?}")]
    UnknownType(String),

    #[error("cannot convert {0}")]
    CannotConvert(String),

    #[error("expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("type {type_name} does not support {direction}")]
    UnsupportedDirection {
        type_name: String,
        direction: Direction,
    },

    #[error("{0} is cyclic")]
    CyclicStructure(String),

    #[error("field {field} for {owner}: {source}")]
    Field {
        field: String,
        owner: String,
        #[source]
        source: Box<ReflectError>,
    },

    #[error("index {index}: {source}")]
    Index {
        index: usize,
        #[source]
        source: Box<ReflectError>,
    },

    #[error("key {key}: {source}")]
    Key {
        key: String,
        #[source]
        source: Box<ReflectError>,
    },

    #[error("bad argument #{position} to {function}: {reason}")]
    Argument {
        position: usize,
        function: String,
        reason: String,
    },

    #[error("wrong number of arguments to {function}: expected {expected}, got {got}")]
    ArgumentCount {
        function: String,
        expected: String,
        got: usize,
    },

    #[error("{member} is not a valid member of {type_name}")]
    UnknownMember { type_name: String, member: String },

    #[error("{member} of {type_name} cannot be assigned to")]
    ReadOnly { type_name: String, member: String },

    #[error("attempt to perform {op} on {type_name}")]
    UnsupportedOperator { op: String, type_name: String },

    #[error("unknown format {0:?}")]
    UnknownFormat(String),

    #[error("unknown option {option} for format {format}")]
    UnknownOption { option: String, format: String },

    #[error("nesting exceeds depth limit of {0}")]
    DepthExceeded(usize),

    #[error("type {0:?} registered more than once")]
    DuplicateType(String),

    #[error("invalid {type_name}: {reason}")]
    InvalidValue { type_name: String, reason: String },
}

impl ReflectError {
    pub fn mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        ReflectError::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Wrap with a record field or format option name.
    pub fn in_field(self, field: impl Into<String>, owner: impl Into<String>) -> Self {
        ReflectError::Field {
            field: field.into(),
            owner: owner.into(),
            source: Box::new(self),
        }
    }

    /// Wrap with a sequence position, counted from 1.
    pub fn at_index(self, index: usize) -> Self {
        ReflectError::Index {
            index,
            source: Box::new(self),
        }
    }

    pub fn at_key(self, key: impl Into<String>) -> Self {
        ReflectError::Key {
            key: key.into(),
            source: Box::new(self),
        }
    }

    pub fn argument(position: usize, function: impl Into<String>, reason: impl ToString) -> Self {
        ReflectError::Argument {
            position,
            function: function.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        ReflectError::InvalidValue {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// The innermost error, with all breadcrumb wrappers removed.
    pub fn root_cause(&self) -> &ReflectError {
        match self {
            ReflectError::Field { source, .. }
            | ReflectError::Index { source, .. }
            | ReflectError::Key { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<ConversionError> for ReflectError {
    fn from(e: ConversionError) -> Self {
        ReflectError::mismatch(e.expected, e.got)
    }
}

impl From<FieldTypeError> for ReflectError {
    fn from(e: FieldTypeError) -> Self {
        ReflectError::mismatch(e.expected, e.got).in_field(e.field, "DescFields")
    }
}

pub type Result<T, E = ReflectError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breadcrumb_rendering() {
        let err = ReflectError::mismatch("string", "number")
            .at_index(2)
            .in_field("Headers", "format json");
        assert_eq!(
            err.to_string(),
            "field Headers for format json: index 2: expected string, got number"
        );
        assert!(matches!(err.root_cause(), ReflectError::TypeMismatch { .. }));
    }

    #[test]
    fn test_member_errors() {
        let err = ReflectError::UnknownMember {
            type_name: "Vector3".into(),
            member: "W".into(),
        };
        assert_eq!(err.to_string(), "W is not a valid member of Vector3");

        let err = ReflectError::argument(2, "Vector3.new", "expected number, got string");
        assert_eq!(
            err.to_string(),
            "bad argument #2 to Vector3.new: expected number, got string"
        );
    }
}
