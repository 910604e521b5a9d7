use alloc::vec::Vec;

use fastbind_reflect::FieldPath;

use crate::{
    BindingError, DestinationKind, NodeRole, ValueKind,
    destination::{FunctionDestination, PropertyDestination},
    value::{FormatTextValue, FunctionValue, PropertyValue, SelectValue},
};

/// An unconfigured node of either role, ready for [`BindingGraph::add`](crate::BindingGraph::add)
#[derive(Debug)]
pub enum NodeKind {
    /// A value node
    Value(ValueKind),
    /// A destination node
    Destination(DestinationKind),
}

impl NodeKind {
    /// The role nodes of this kind play
    pub fn role(&self) -> NodeRole {
        match self {
            NodeKind::Value(_) => NodeRole::Value,
            NodeKind::Destination(_) => NodeRole::Destination,
        }
    }
}

/// What an editor needs to list and create a node kind
#[derive(Clone, Copy, Debug)]
pub struct NodeKindInfo {
    /// Stable identifier
    pub id: &'static str,
    /// Name shown to people
    pub display_name: &'static str,
    /// Value or destination
    pub role: NodeRole,
    /// Creates an unconfigured node of this kind
    pub construct: fn() -> NodeKind,
}

/// The node kinds available to bindings, looked up by id
#[derive(Clone, Debug, Default)]
pub struct NodeKindRegistry {
    kinds: Vec<NodeKindInfo>,
}

impl NodeKindRegistry {
    /// A registry without any kind
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry listing every kind this crate provides
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for info in BUILTIN {
            registry.kinds.push(*info);
        }
        registry
    }

    /// Adds a kind, failing if its id is taken
    pub fn register(&mut self, info: NodeKindInfo) -> Result<(), BindingError> {
        if self.get(info.id).is_some() {
            return Err(BindingError::DuplicateKind(info.id));
        }
        self.kinds.push(info);
        Ok(())
    }

    /// The kind with id `id`
    pub fn get(&self, id: &str) -> Option<&NodeKindInfo> {
        self.kinds.iter().find(|info| info.id == id)
    }

    /// Creates an unconfigured node of kind `id`
    pub fn construct(&self, id: &str) -> Option<NodeKind> {
        self.get(id).map(|info| (info.construct)())
    }

    /// Every kind, in registration order
    pub fn iter(&self) -> impl Iterator<Item = &NodeKindInfo> + '_ {
        self.kinds.iter()
    }

    /// Kinds playing `role`
    pub fn with_role(&self, role: NodeRole) -> impl Iterator<Item = &NodeKindInfo> + '_ {
        self.kinds.iter().filter(move |info| info.role == role)
    }
}

const BUILTIN: &[NodeKindInfo] = &[
    NodeKindInfo {
        id: "property_value",
        display_name: "Property",
        role: NodeRole::Value,
        construct: || NodeKind::Value(PropertyValue::new(FieldPath::new(Vec::new())).into()),
    },
    NodeKindInfo {
        id: "function_value",
        display_name: "Function",
        role: NodeRole::Value,
        construct: || NodeKind::Value(FunctionValue::new("").into()),
    },
    NodeKindInfo {
        id: "format_text",
        display_name: "Format Text",
        role: NodeRole::Value,
        construct: || NodeKind::Value(FormatTextValue::default().into()),
    },
    NodeKindInfo {
        id: "select",
        display_name: "Select",
        role: NodeRole::Value,
        construct: || NodeKind::Value(SelectValue::new().into()),
    },
    NodeKindInfo {
        id: "property_destination",
        display_name: "Set Property",
        role: NodeRole::Destination,
        construct: || {
            NodeKind::Destination(PropertyDestination::new(FieldPath::new(Vec::new())).into())
        },
    },
    NodeKindInfo {
        id: "function_destination",
        display_name: "Call Function",
        role: NodeRole::Destination,
        construct: || NodeKind::Destination(FunctionDestination::new("").into()),
    },
];
