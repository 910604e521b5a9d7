use alloc::{boxed::Box, string::String, vec::Vec};

use fastbind_core::FieldDescriptor;
use fastbind_reflect::ReflectedMut;

use crate::{BindingError, BindingGraph, FieldNotify, NodeId, NodeRole};

/// A named binding: one active destination, plus value nodes and
/// destinations kept around while they are being authored.
///
/// Only the active destination runs. Inactive nodes are never evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    name: String,
    destination: Option<NodeId>,
    inactive: Vec<NodeId>,
}

impl Binding {
    /// A binding without a destination
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            destination: None,
            inactive: Vec::new(),
        }
    }

    /// Name of the binding
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The destination that runs on update
    pub fn destination(&self) -> Option<NodeId> {
        self.destination
    }

    /// Nodes kept by the binding that never run
    pub fn inactive(&self) -> &[NodeId] {
        &self.inactive
    }

    /// Makes `destination` the active one. The previous destination, if
    /// any, is kept as inactive.
    pub fn set_destination(
        &mut self,
        graph: &BindingGraph,
        destination: NodeId,
    ) -> Result<(), BindingError> {
        let node = graph
            .node(destination)
            .ok_or(BindingError::UnknownNode(destination))?;
        if node.role() != NodeRole::Destination {
            return Err(BindingError::WrongRole {
                node: destination,
                expected: NodeRole::Destination,
            });
        }
        self.inactive.retain(|&id| id != destination);
        if let Some(previous) = self.destination.replace(destination) {
            if previous != destination {
                self.inactive.push(previous);
            }
        }
        Ok(())
    }

    /// Keeps a node with the binding without running it
    pub fn add_inactive(&mut self, node: NodeId) {
        if Some(node) != self.destination && !self.inactive.contains(&node) {
            self.inactive.push(node);
        }
    }

    /// Whether the binding has a destination to run
    pub fn is_active(&self) -> bool {
        self.destination.is_some()
    }

    /// Sets up the destination subtree and readies it for its first tick
    pub fn initialize(&self, graph: &mut BindingGraph) {
        if let Some(destination) = self.destination {
            graph.initialize(destination);
        }
    }

    /// Runs the destination for the graph's current tick. Returns whether
    /// it applied a value.
    pub fn update<'r>(
        &self,
        graph: &mut BindingGraph,
        root: ReflectedMut<'r>,
        notify: Option<&'r mut dyn FieldNotify>,
    ) -> bool {
        match self.destination {
            Some(destination) => graph.update(destination, root, notify),
            None => false,
        }
    }

    /// Tears down the destination subtree
    pub fn terminate(&self, graph: &mut BindingGraph) {
        if let Some(destination) = self.destination {
            graph.terminate(destination);
        }
    }

    /// Makes an event-based destination run on its next update
    pub fn mark_dirty(&self, graph: &mut BindingGraph) -> Result<(), BindingError> {
        match self.destination {
            Some(destination) => graph.mark_dirty(destination),
            None => Ok(()),
        }
    }

    /// Whether nothing the binding runs is set to run every tick
    pub fn is_performant(&self, graph: &BindingGraph) -> bool {
        self.destination
            .is_none_or(|destination| graph.is_performant(destination))
    }
}

/// Drives every binding of a host type over one graph.
///
/// Each call to [`BindingContainer::update_bindings`] is one tick: value
/// nodes compute at most once in it, however many destinations read them.
pub struct BindingContainer {
    graph: BindingGraph,
    bindings: Vec<Binding>,
    notify: Option<Box<dyn FieldNotify>>,
}

impl BindingContainer {
    /// An empty container for host objects of type `host`
    pub fn new(host: &'static FieldDescriptor) -> Self {
        Self {
            graph: BindingGraph::new(host),
            bindings: Vec::new(),
            notify: None,
        }
    }

    /// The graph holding every node
    pub fn graph(&self) -> &BindingGraph {
        &self.graph
    }

    /// The graph, for authoring
    pub fn graph_mut(&mut self) -> &mut BindingGraph {
        &mut self.graph
    }

    /// Adds a binding; bindings update in the order they were added
    pub fn add_binding(&mut self, binding: Binding) -> usize {
        self.bindings.push(binding);
        self.bindings.len() - 1
    }

    /// Every binding
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// The binding at `index`, for authoring
    pub fn binding_mut(&mut self, index: usize) -> Option<&mut Binding> {
        self.bindings.get_mut(index)
    }

    /// The graph and a binding together, to change the binding's destination
    pub fn split_mut(&mut self, index: usize) -> Option<(&mut BindingGraph, &mut Binding)> {
        let binding = self.bindings.get_mut(index)?;
        Some((&mut self.graph, binding))
    }

    /// Installs the sink told about fields that property destinations change
    pub fn set_notify(&mut self, notify: impl FieldNotify + 'static) {
        self.notify = Some(Box::new(notify));
    }

    /// Removes the change sink
    pub fn clear_notify(&mut self) {
        self.notify = None;
    }

    /// Sets up and initializes every binding
    pub fn initialize_bindings(&mut self) {
        for binding in &self.bindings {
            binding.initialize(&mut self.graph);
        }
    }

    /// Runs one tick over `root`. Returns whether any destination applied a value.
    ///
    /// Nothing runs when `root` is not of the host type.
    pub fn update_bindings(&mut self, mut root: ReflectedMut<'_>) -> bool {
        if !root.descriptor().is_same(self.graph.host()) {
            log::warn!(
                "bindings for {} cannot update a {}",
                self.graph.host(),
                root.descriptor()
            );
            return false;
        }
        let tick = self.graph.advance_tick();
        let mut applied = 0;
        for binding in &self.bindings {
            let notify: Option<&mut dyn FieldNotify> = match &mut self.notify {
                Some(notify) => Some(notify.as_mut()),
                None => None,
            };
            if binding.update(&mut self.graph, root.reborrow(), notify) {
                applied += 1;
            }
        }
        log::trace!("tick {}: {} of {} bindings applied", tick, applied, self.bindings.len());
        applied > 0
    }

    /// Tears down every binding
    pub fn terminate_bindings(&mut self) {
        for binding in &self.bindings {
            binding.terminate(&mut self.graph);
        }
    }
}

impl core::fmt::Debug for BindingContainer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BindingContainer")
            .field("graph", &self.graph)
            .field("bindings", &self.bindings)
            .field("notify", &self.notify.is_some())
            .finish()
    }
}
