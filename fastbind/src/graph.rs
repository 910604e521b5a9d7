use alloc::{borrow::ToOwned, string::String, vec, vec::Vec};
use core::fmt;

use fastbind_core::FieldDescriptor;
use fastbind_reflect::{ReflectedMut, ReflectedValue};

use crate::{
    BindingError, BindingItem, DestinationKind, DestinationNode, FieldNotify, LiteralDefault,
    NodeKind, SetterRegistry, UpdatePolicy, ValueKind, ValueNode,
    eval::{Pass, Pull, Pulled, Setup},
    item::reconcile,
};

/// Address of a node in a [`BindingGraph`].
///
/// Ids are never reused: once a node is removed, its id stays unknown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of the node in its graph
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a node computes values or applies them
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// Computes a cached value that can be wired into items
    Value,
    /// Applies its inputs to the host
    Destination,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Value => f.write_str("value"),
            NodeRole::Destination => f.write_str("destination"),
        }
    }
}

#[derive(Debug)]
enum NodeBody {
    Value(ValueNode),
    Destination(DestinationNode),
}

/// A node of a [`BindingGraph`]: its name, items, policy and role
#[derive(Debug)]
pub struct Node {
    name: String,
    items: Vec<BindingItem>,
    policy: UpdatePolicy,
    wired_into: Option<NodeId>,
    body: NodeBody,
}

impl Node {
    /// Name given when the node was added
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Items, in the order the node laid them out
    pub fn items(&self) -> &[BindingItem] {
        &self.items
    }

    /// The item called `name`
    pub fn item(&self, name: &str) -> Option<&BindingItem> {
        self.items.iter().find(|item| item.name() == name)
    }

    /// Nodes wired into the items
    pub fn inputs(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.items.iter().filter_map(BindingItem::input)
    }

    /// The update policy
    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    /// The node this one is wired into, if any
    pub fn wired_into(&self) -> Option<NodeId> {
        self.wired_into
    }

    /// Whether the node computes or applies values
    pub fn role(&self) -> NodeRole {
        match self.body {
            NodeBody::Value(_) => NodeRole::Value,
            NodeBody::Destination(_) => NodeRole::Destination,
        }
    }

    /// The value node, if this is one
    pub fn value(&self) -> Option<&ValueNode> {
        match &self.body {
            NodeBody::Value(value) => Some(value),
            NodeBody::Destination(_) => None,
        }
    }

    /// The value node, mutably, if this is one
    pub fn value_mut(&mut self) -> Option<&mut ValueNode> {
        match &mut self.body {
            NodeBody::Value(value) => Some(value),
            NodeBody::Destination(_) => None,
        }
    }

    /// The destination, if this is one
    pub fn destination(&self) -> Option<&DestinationNode> {
        match &self.body {
            NodeBody::Destination(destination) => Some(destination),
            NodeBody::Value(_) => None,
        }
    }

    /// The destination, mutably, if this is one
    pub fn destination_mut(&mut self) -> Option<&mut DestinationNode> {
        match &mut self.body {
            NodeBody::Destination(destination) => Some(destination),
            NodeBody::Value(_) => None,
        }
    }

    fn item_mut(&mut self, id: NodeId, name: &str) -> Result<&mut BindingItem, BindingError> {
        self.items
            .iter_mut()
            .find(|item| item.name() == name)
            .ok_or_else(|| BindingError::NoSuchItem {
                node: id,
                item: name.to_owned(),
            })
    }

    fn mark_dirty(&mut self) {
        match &mut self.body {
            NodeBody::Value(value) => value.mark_dirty(),
            NodeBody::Destination(destination) => destination.mark_dirty(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    New,
    Open,
    Done,
}

/// Every node of a set of bindings, addressed by [`NodeId`].
///
/// The graph owns its nodes. Items refer to the value nodes wired into them
/// by id, and each value node feeds at most one item. Value nodes that feed
/// nothing are orphans: they stay in the graph until removed.
///
/// A node being computed is checked out of the graph. Querying it again
/// before it is done, which only a wiring cycle can cause, yields nothing
/// and logs an error.
pub struct BindingGraph {
    host: &'static FieldDescriptor,
    slots: Vec<Option<Node>>,
    busy: Vec<NodeId>,
    tick: u64,
    setters: SetterRegistry,
}

impl BindingGraph {
    /// An empty graph for host objects of type `host`, converting with
    /// the [builtin](SetterRegistry::builtin) setters
    pub fn new(host: &'static FieldDescriptor) -> Self {
        Self::with_setters(host, SetterRegistry::builtin())
    }

    /// An empty graph converting values with `setters`
    pub fn with_setters(host: &'static FieldDescriptor, setters: SetterRegistry) -> Self {
        Self {
            host,
            slots: Vec::new(),
            busy: Vec::new(),
            tick: 0,
            setters,
        }
    }

    /// The setters that convert values written to destinations and parameters
    pub fn setters(&self) -> &SetterRegistry {
        &self.setters
    }

    /// The setters, to register more. Wiring already checked stays as is.
    pub fn setters_mut(&mut self) -> &mut SetterRegistry {
        &mut self.setters
    }

    /// Type of the host objects
    pub fn host(&self) -> &'static FieldDescriptor {
        self.host
    }

    /// The current tick
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Starts a new tick: value nodes recompute at most once per tick
    pub fn advance_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Adds a value node, laid out for its current configuration
    pub fn add_value(&mut self, name: impl Into<String>, kind: impl Into<ValueKind>) -> NodeId {
        self.insert(name.into(), NodeBody::Value(ValueNode::new(kind.into())))
    }

    /// Adds a destination node, laid out for its current configuration
    pub fn add_destination(
        &mut self,
        name: impl Into<String>,
        kind: impl Into<DestinationKind>,
    ) -> NodeId {
        self.insert(
            name.into(),
            NodeBody::Destination(DestinationNode::new(kind.into())),
        )
    }

    /// Adds a node of either role
    pub fn add(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        match kind {
            NodeKind::Value(kind) => self.add_value(name, kind),
            NodeKind::Destination(kind) => self.add_destination(name, kind),
        }
    }

    fn insert(&mut self, name: String, body: NodeBody) -> NodeId {
        let id = NodeId::from_index(self.slots.len());
        self.slots.push(Some(Node {
            name,
            items: Vec::new(),
            policy: UpdatePolicy::default(),
            wired_into: None,
            body,
        }));
        if let Err(error) = self.setup_node(id) {
            log::debug!("{} is not fully configured yet: {}", id, error);
        }
        id
    }

    /// The node at `id`
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index())?.as_ref()
    }

    /// The node at `id`, mutably. Set it up again after reconfiguring it.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    fn expect_node(&mut self, id: NodeId) -> Result<&mut Node, BindingError> {
        self.node_mut(id).ok_or(BindingError::UnknownNode(id))
    }

    /// Ids of every node in the graph
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| NodeId::from_index(index))
    }

    /// Number of nodes in the graph
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value nodes that feed no item
    pub fn orphans(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids().filter(|&id| {
            self.node(id)
                .is_some_and(|node| node.role() == NodeRole::Value && node.wired_into.is_none())
        })
    }

    /// Changes the policy of a node
    pub fn set_policy(&mut self, id: NodeId, policy: UpdatePolicy) -> Result<(), BindingError> {
        let node = self.expect_node(id)?;
        node.policy = policy;
        node.mark_dirty();
        Ok(())
    }

    /// Wires the value node `source` into the item `item` of `target`.
    ///
    /// Returns the node previously wired into that item, which is now an orphan.
    pub fn wire(
        &mut self,
        source: NodeId,
        target: NodeId,
        item: &str,
    ) -> Result<Option<NodeId>, BindingError> {
        let node = self.node(source).ok_or(BindingError::UnknownNode(source))?;
        let Some(value) = node.value() else {
            return Err(BindingError::WrongRole {
                node: source,
                expected: NodeRole::Value,
            });
        };
        if let Some(into) = node.wired_into {
            return Err(BindingError::AlreadyWired { node: source, into });
        }
        let output = value.output_descriptor();

        let slot = self.slots.get_mut(target.index()).and_then(Option::as_mut);
        let slot = slot.ok_or(BindingError::UnknownNode(target))?.item_mut(target, item)?;
        if let Some(output) = output {
            if !slot.expect().accepts_with(&self.setters, output) {
                return Err(BindingError::WrongInput {
                    item: item.to_owned(),
                    expected: slot.expect(),
                    actual: output,
                });
            }
        }
        let previous = slot.set_input(Some(source));

        if let Some(previous) = previous {
            self.orphan(previous);
        }
        self.expect_node(source)?.wired_into = Some(target);
        log::trace!("wired {} into {}.{}", source, target, item);
        self.setup_logged(target);
        Ok(previous)
    }

    /// Disconnects whatever feeds the item `item` of `target`, returning the new orphan
    pub fn unwire(&mut self, target: NodeId, item: &str) -> Result<Option<NodeId>, BindingError> {
        let previous = self.expect_node(target)?.item_mut(target, item)?.set_input(None);
        if let Some(previous) = previous {
            self.orphan(previous);
        }
        self.setup_logged(target);
        Ok(previous)
    }

    fn orphan(&mut self, id: NodeId) {
        if let Some(node) = self.node_mut(id) {
            node.wired_into = None;
            log::debug!("{} ({}) is now an orphan", id, node.name);
        }
    }

    /// Stores a literal default on an item, or clears it with `None`.
    ///
    /// The default is decoded on the next resolution. Text that does not
    /// decode is only reported then.
    pub fn set_default(
        &mut self,
        target: NodeId,
        item: &str,
        default: Option<LiteralDefault>,
    ) -> Result<(), BindingError> {
        let node = self.slots.get_mut(target.index()).and_then(Option::as_mut);
        let node = node.ok_or(BindingError::UnknownNode(target))?;
        let slot = node.item_mut(target, item)?;
        if let Some(descriptor) = default.as_ref().and_then(LiteralDefault::descriptor) {
            if !slot.expect().accepts_with(&self.setters, descriptor) {
                return Err(BindingError::WrongInput {
                    item: item.to_owned(),
                    expected: slot.expect(),
                    actual: descriptor,
                });
            }
        }
        slot.set_default(default);
        node.mark_dirty();
        self.setup_logged(target);
        Ok(())
    }

    /// Removes a node along with every node wired into it, directly or not
    pub fn remove(&mut self, id: NodeId) -> Result<(), BindingError> {
        let node = self.node(id).ok_or(BindingError::UnknownNode(id))?;
        if let Some(parent) = node.wired_into {
            if let Some(parent) = self.node_mut(parent) {
                for item in parent.items.iter_mut() {
                    if item.input() == Some(id) {
                        item.set_input(None);
                    }
                }
            }
        }
        for removed in self.subtree(id) {
            if let Some(slot) = self.slots.get_mut(removed.index()) {
                *slot = None;
            }
        }
        Ok(())
    }

    /// `id` and every node wired into it, directly or not, inputs before
    /// the nodes they feed. Each node appears once, even with a cycle.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut visited = vec![false; self.slots.len()];
        let mut order = Vec::new();
        self.visit(id, &mut visited, &mut order);
        order
    }

    fn visit(&self, id: NodeId, visited: &mut [bool], order: &mut Vec<NodeId>) {
        let Some(node) = self.node(id) else {
            return;
        };
        if core::mem::replace(&mut visited[id.index()], true) {
            return;
        }
        for input in node.inputs() {
            self.visit(input, visited, order);
        }
        order.push(id);
    }

    /// A cycle in the wiring, as the nodes along it, if there is one
    pub fn find_cycle(&self) -> Option<Vec<NodeId>> {
        let mut marks = vec![Mark::New; self.slots.len()];
        let mut path = Vec::new();
        self.ids()
            .find_map(|id| self.cycle_from(id, &mut marks, &mut path))
    }

    fn cycle_from(
        &self,
        id: NodeId,
        marks: &mut [Mark],
        path: &mut Vec<NodeId>,
    ) -> Option<Vec<NodeId>> {
        let node = self.node(id)?;
        match marks[id.index()] {
            Mark::Done => return None,
            Mark::Open => {
                let start = path.iter().position(|&open| open == id)?;
                return Some(path[start..].to_vec());
            }
            Mark::New => {}
        }
        marks[id.index()] = Mark::Open;
        path.push(id);
        for input in node.inputs() {
            if let Some(cycle) = self.cycle_from(input, marks, path) {
                return Some(cycle);
            }
        }
        path.pop();
        marks[id.index()] = Mark::Done;
        None
    }

    /// Fails with the first cycle in the wiring
    pub fn validate(&self) -> Result<(), BindingError> {
        match self.find_cycle() {
            Some(cycle) => Err(BindingError::Cycle(cycle)),
            None => Ok(()),
        }
    }

    /// Lays out the items of `id` and of every node wired into it, inputs
    /// first, for their current configuration and wiring.
    ///
    /// Items no longer required are removed, and what was wired into them
    /// becomes an orphan. Returns the first error met; every node is set up
    /// regardless.
    pub fn setup(&mut self, id: NodeId) -> Result<(), BindingError> {
        if self.node(id).is_none() {
            return Err(BindingError::UnknownNode(id));
        }
        let mut first_error = None;
        for node in self.subtree(id) {
            if let Err(error) = self.setup_node(node) {
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn setup_logged(&mut self, id: NodeId) {
        if let Err(error) = self.setup(id) {
            log::warn!("{} cannot be set up: {}", id, error);
        }
    }

    fn setup_node(&mut self, id: NodeId) -> Result<(), BindingError> {
        let node = self.node(id).ok_or(BindingError::UnknownNode(id))?;
        let consumer = node.wired_into.and_then(|parent| {
            self.node(parent)?
                .items
                .iter()
                .find(|item| item.input() == Some(id))?
                .expect()
                .descriptor()
        });
        let inputs = node
            .items
            .iter()
            .map(|item| {
                let produced = match item.input() {
                    Some(input) => self
                        .node(input)
                        .and_then(Node::value)
                        .and_then(ValueNode::output_descriptor),
                    None => item.default_descriptor(),
                };
                (item.name().to_owned(), produced)
            })
            .collect();
        let setup = Setup {
            host: self.host,
            inputs,
            consumer,
        };

        let node = self.expect_node(id)?;
        let outcome = match &mut node.body {
            NodeBody::Value(value) => value.setup(&setup),
            NodeBody::Destination(destination) => destination.setup(&setup),
        };
        let orphans = reconcile(&mut node.items, outcome.items);
        for orphan in orphans {
            self.orphan(orphan);
        }
        outcome.error.map_or(Ok(()), Err)
    }

    /// Sets up `id` and everything wired into it, decodes their defaults
    /// and readies them for their first tick. Inputs go first.
    pub fn initialize(&mut self, id: NodeId) {
        let order = self.subtree(id);
        for &node in &order {
            if let Err(error) = self.setup_node(node) {
                log::warn!("{} cannot be set up: {}", node, error);
            }
        }
        for &node in &order {
            let Some(node) = self.node_mut(node) else {
                continue;
            };
            for item in node.items.iter_mut().filter(|item| item.input().is_none()) {
                item.resolve_default();
            }
            match &mut node.body {
                NodeBody::Value(value) => value.initialize(),
                NodeBody::Destination(destination) => destination.initialize(),
            }
        }
    }

    /// Tears down `id` and then everything wired into it, dropping cached
    /// values and scratch frames. Terminating twice does nothing more.
    pub fn terminate(&mut self, id: NodeId) {
        for node in self.subtree(id).into_iter().rev() {
            let Some(node) = self.node_mut(node) else {
                continue;
            };
            match &mut node.body {
                NodeBody::Value(value) => value.terminate(),
                NodeBody::Destination(destination) => destination.terminate(),
            }
        }
    }

    /// Marks a node for recomputation: an event-based destination runs on
    /// its next update, a value node computes on its next query
    pub fn mark_dirty(&mut self, id: NodeId) -> Result<(), BindingError> {
        self.expect_node(id)?.mark_dirty();
        Ok(())
    }

    /// Whether nothing in the subtree of `id` runs every tick
    pub fn is_performant(&self, id: NodeId) -> bool {
        self.subtree(id).into_iter().all(|node| {
            self.node(node)
                .is_some_and(|node| node.policy != UpdatePolicy::Always)
        })
    }

    /// The value of a value node during the current tick, and whether it
    /// changed since the node last produced one
    pub fn get_value(
        &mut self,
        id: NodeId,
        root: ReflectedMut<'_>,
    ) -> Option<(ReflectedValue<'_>, bool)> {
        let mut pass = Pass::new(root, self.tick, None);
        let pulled = self.query(id, &mut pass)?;
        Some((pulled.value, pulled.changed))
    }

    /// Runs a destination for the current tick, if its policy says so.
    /// Returns whether it applied a value.
    pub fn update<'r>(
        &mut self,
        id: NodeId,
        root: ReflectedMut<'r>,
        notify: Option<&'r mut dyn FieldNotify>,
    ) -> bool {
        let mut pass = Pass::new(root, self.tick, notify);
        let Some(mut node) = self.check_out(id) else {
            return false;
        };
        let Node {
            name,
            items,
            policy,
            body,
            ..
        } = &mut node;
        let ran = match body {
            NodeBody::Destination(destination) => {
                let mut pull = Pull::new(items, self, &mut pass);
                destination.update(&mut pull, *policy, name)
            }
            NodeBody::Value(_) => {
                log::debug!("{} is a value node and cannot be updated", name);
                false
            }
        };
        self.check_in(id, node);
        ran
    }

    pub(crate) fn query(&mut self, id: NodeId, pass: &mut Pass<'_>) -> Option<Pulled> {
        let mut node = self.check_out(id)?;
        let Node {
            name,
            items,
            policy,
            body,
            ..
        } = &mut node;
        let pulled = match body {
            NodeBody::Value(value) => {
                let mut pull = Pull::new(items, self, pass);
                value.get_value(&mut pull, *policy, name)
            }
            NodeBody::Destination(_) => {
                log::debug!("{} is a destination and has no value", name);
                None
            }
        };
        self.check_in(id, node);
        pulled
    }

    fn check_out(&mut self, id: NodeId) -> Option<Node> {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            log::debug!("{} is not in the graph", id);
            return None;
        };
        match slot.take() {
            Some(node) => {
                self.busy.push(id);
                Some(node)
            }
            None if self.busy.contains(&id) => {
                log::error!("{} was queried while computing itself: the wiring has a cycle", id);
                None
            }
            None => {
                log::debug!("{} is not in the graph", id);
                None
            }
        }
    }

    fn check_in(&mut self, id: NodeId, node: Node) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            *slot = Some(node);
        }
        self.busy.pop();
    }
}

impl fmt::Debug for BindingGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingGraph")
            .field("host", &format_args!("{}", self.host))
            .field("nodes", &self.len())
            .field("tick", &self.tick)
            .field("setters", &self.setters)
            .finish()
    }
}
