use alloc::{string::String, vec::Vec};

use fastbind_core::FieldDescriptor;
use fastbind_reflect::ReflectError;
use owo_colors::OwoColorize;

use crate::{Expect, NodeId, NodeRole};

/// Errors raised while building or rewiring a binding graph.
///
/// Evaluation itself never fails with an error: a value that cannot be
/// produced this tick is `None`.
#[derive(Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum BindingError {
    /// The id does not name a node of the graph (it may have been removed)
    UnknownNode(NodeId),

    /// The node has no item with that name
    NoSuchItem {
        /// The node that was searched
        node: NodeId,
        /// The item name
        item: String,
    },

    /// A value node can feed a single item
    AlreadyWired {
        /// The value node
        node: NodeId,
        /// The node it already feeds
        into: NodeId,
    },

    /// The node plays the other role
    WrongRole {
        /// The node
        node: NodeId,
        /// The role the operation needed
        expected: NodeRole,
    },

    /// A wired node or a default does not produce what the item takes
    WrongInput {
        /// The item
        item: String,
        /// What the item takes
        expected: Expect,
        /// What was offered
        actual: &'static FieldDescriptor,
    },

    /// No setter assigns values of `source` to `target`
    NotAssignable {
        /// The type being written
        target: &'static FieldDescriptor,
        /// The type of the value
        source: &'static FieldDescriptor,
    },

    /// A function value must return something
    UnitReturn {
        /// The function
        function: &'static str,
    },

    /// A node kind id was registered twice
    DuplicateKind(&'static str),

    /// The wiring loops back on itself
    Cycle(Vec<NodeId>),

    /// Reflection failed while resolving members or decoding a default
    Reflect(ReflectError),
}

impl core::fmt::Display for BindingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BindingError::UnknownNode(node) => write!(f, "Unknown node {}", node.red()),
            BindingError::NoSuchItem { node, item } => {
                write!(f, "Node {} has no item '{}'", node.blue(), item.yellow())
            }
            BindingError::AlreadyWired { node, into } => write!(
                f,
                "Node {} already feeds node {}",
                node.blue(),
                into.yellow()
            ),
            BindingError::WrongRole { node, expected } => {
                write!(f, "Node {} is not a {} node", node.blue(), expected.red())
            }
            BindingError::WrongInput {
                item,
                expected,
                actual,
            } => write!(
                f,
                "Item '{}' takes {}, but got {}",
                item.yellow(),
                expected.green(),
                actual.red()
            ),
            BindingError::NotAssignable { target, source } => {
                write!(f, "Cannot assign {} to {}", source.red(), target.green())
            }
            BindingError::UnitReturn { function } => {
                write!(f, "{}() returns nothing", function.red())
            }
            BindingError::DuplicateKind(id) => {
                write!(f, "Node kind {} is already registered", id.red())
            }
            BindingError::Cycle(nodes) => {
                write!(f, "Wiring cycle through")?;
                for node in nodes {
                    write!(f, " {}", node.red())?;
                }
                Ok(())
            }
            BindingError::Reflect(error) => write!(f, "{}", error),
        }
    }
}

impl core::error::Error for BindingError {}

impl From<ReflectError> for BindingError {
    fn from(error: ReflectError) -> Self {
        BindingError::Reflect(error)
    }
}
