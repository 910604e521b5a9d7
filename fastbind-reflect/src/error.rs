use alloc::string::String;

use fastbind_core::{FieldDescriptor, LayoutError, ParseError};
use owo_colors::OwoColorize;

/// Errors that can occur when reflecting on host values or building paths.
#[derive(Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum ReflectError {
    /// A member name does not exist on the owning type (it may have been renamed or removed)
    NoSuchMember {
        /// The type that was searched
        owner: &'static FieldDescriptor,
        /// The name that was looked up
        name: String,
    },

    /// Attempted to perform an operation that expected a struct or something
    WasNotA {
        /// The name of the expected kind.
        expected: &'static str,

        /// The type we got instead
        actual: &'static FieldDescriptor,
    },

    /// Tried to use a value of one type where another was expected
    WrongDescriptor {
        /// The expected type
        expected: &'static FieldDescriptor,
        /// The actual type
        actual: &'static FieldDescriptor,
    },

    /// The type does not support an operation that was needed
    MissingOperation {
        /// The type missing the operation
        descriptor: &'static FieldDescriptor,
        /// The name of the operation, e.g. `default_in_place`
        operation: &'static str,
    },

    /// A member exists but the path's filters exclude it
    Filtered {
        /// The member that was rejected
        name: String,
        /// Which filter rejected it
        reason: &'static str,
    },

    /// A path with no members
    EmptyPath,

    /// A dotted path segment that is not a member name
    InvalidSegment(String),

    /// Text could not be imported into a value
    Parse {
        /// The type being imported
        descriptor: &'static FieldDescriptor,
        /// The codec's error
        error: ParseError,
    },

    /// A call frame's layout could not be computed
    Layout(LayoutError),
}

impl core::fmt::Display for ReflectError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReflectError::NoSuchMember { owner, name } => {
                write!(f, "No member '{}' on {}", name.yellow(), owner.blue())
            }
            ReflectError::WasNotA { expected, actual } => {
                write!(
                    f,
                    "Wrong kind: expected {}, but got {}",
                    expected.green(),
                    actual.red()
                )
            }
            ReflectError::WrongDescriptor { expected, actual } => {
                write!(
                    f,
                    "Wrong type: expected {}, but got {}",
                    expected.green(),
                    actual.red()
                )
            }
            ReflectError::MissingOperation {
                descriptor,
                operation,
            } => write!(
                f,
                "{} does not support operation {}",
                descriptor.blue(),
                operation.red()
            ),
            ReflectError::Filtered { name, reason } => {
                write!(f, "Member '{}' is not allowed here: {}", name.yellow(), reason)
            }
            ReflectError::EmptyPath => write!(f, "Field path has no members"),
            ReflectError::InvalidSegment(segment) => {
                write!(f, "'{}' is not a member name", segment.red())
            }
            ReflectError::Parse { descriptor, error } => {
                write!(f, "Could not import {}: {}", descriptor.blue(), error.red())
            }
            ReflectError::Layout(error) => write!(f, "{}", error.red()),
        }
    }
}

impl core::error::Error for ReflectError {}

impl From<LayoutError> for ReflectError {
    fn from(error: LayoutError) -> Self {
        ReflectError::Layout(error)
    }
}
