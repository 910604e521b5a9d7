use alloc::{string::String, vec::Vec};

use fastbind_core::{FieldDescriptor, PtrMut};
use fastbind_reflect::{ReflectedMut, ReflectedValue};

use crate::{BindingError, BindingGraph, BindingItem, FieldNotify, ItemSpec, SetterRegistry};

/// One evaluation: the host root and the tick it runs in
pub(crate) struct Pass<'r> {
    root_descriptor: &'static FieldDescriptor,
    root: PtrMut<'r>,
    pub tick: u64,
    notify: Option<&'r mut dyn FieldNotify>,
}

impl<'r> Pass<'r> {
    pub fn new(
        root: ReflectedMut<'r>,
        tick: u64,
        notify: Option<&'r mut dyn FieldNotify>,
    ) -> Self {
        Self {
            root_descriptor: root.descriptor(),
            root: root.data(),
            tick,
            notify,
        }
    }
}

/// A value pulled through an item this tick.
///
/// The value lives in a node cache or a decoded default. Those buffers stay
/// put until the graph is changed structurally, which cannot happen during
/// an evaluation.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Pulled {
    pub value: ReflectedValue<'static>,
    pub changed: bool,
}

/// The items of the node being evaluated, with everything needed to resolve them
pub(crate) struct Pull<'a, 'r> {
    items: &'a mut [BindingItem],
    graph: &'a mut BindingGraph,
    pass: &'a mut Pass<'r>,
    values: Vec<Option<ReflectedValue<'static>>>,
    changed: bool,
}

impl<'a, 'r> Pull<'a, 'r> {
    pub fn new(
        items: &'a mut [BindingItem],
        graph: &'a mut BindingGraph,
        pass: &'a mut Pass<'r>,
    ) -> Self {
        Self {
            items,
            graph,
            pass,
            values: Vec::new(),
            changed: false,
        }
    }

    pub fn tick(&self) -> u64 {
        self.pass.tick
    }

    /// Whether anything pulled so far changed
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Resolves every item, in order
    pub fn pull_all(&mut self) {
        self.values.clear();
        for item in self.items.iter_mut() {
            let pulled = item.resolve(self.graph, self.pass);
            self.changed |= pulled.is_some_and(|pulled| pulled.changed);
            self.values.push(pulled.map(|pulled| pulled.value));
        }
    }

    /// What an item resolved to during [`Pull::pull_all`]
    pub fn value(&self, name: &str) -> Option<ReflectedValue<'static>> {
        let index = self.items.iter().position(|item| item.name() == name)?;
        self.values.get(index).copied().flatten()
    }

    /// Writes what an item resolved to into `target`, converting it through
    /// the graph's setters. False when the item is empty or does not convert.
    pub fn assign(&self, name: &str, target: ReflectedMut<'_>) -> bool {
        let Some(value) = self.value(name) else {
            return false;
        };
        match self.graph.setters().assign(target, value) {
            Ok(()) => true,
            Err(error) => {
                log::debug!("item '{}' not assigned: {}", name, error);
                false
            }
        }
    }

    pub fn setters(&self) -> &SetterRegistry {
        self.graph.setters()
    }

    /// Resolves a single item
    pub fn item(&mut self, name: &str) -> Option<ReflectedValue<'static>> {
        let item = self.items.iter_mut().find(|item| item.name() == name)?;
        let pulled = item.resolve(self.graph, self.pass)?;
        self.changed |= pulled.changed;
        Some(pulled.value)
    }

    /// The host root
    pub fn root(&self) -> ReflectedMut<'_> {
        unsafe { ReflectedMut::new(self.pass.root_descriptor, self.pass.root) }
    }

    /// The object an owner item points at, after [`Pull::pull_all`].
    ///
    /// An empty or missing item stands for the host root. An item that is
    /// set but resolved to nothing, or to a null reference, yields `None`.
    pub fn owner(&self, name: &str) -> Option<ReflectedMut<'_>> {
        let Some(index) = self.items.iter().position(|item| item.name() == name) else {
            return Some(self.root());
        };
        if self.items[index].is_empty() {
            return Some(self.root());
        }
        let value = self.values.get(index).copied().flatten()?;
        let object = value.descriptor().as_object()?;
        let data = unsafe { object.follow(value.data()) }?;
        Some(unsafe { ReflectedMut::new(object.target(), data) })
    }

    /// Tells the change sink, if there is one, that `field_id` changed on `root`
    pub fn notify(&mut self, root: ReflectedValue<'_>, field_id: &str) {
        if let Some(notify) = self.pass.notify.as_deref_mut() {
            notify.field_changed(root, field_id);
        }
    }
}

/// What a node can know about its surroundings when it lays out its items
pub(crate) struct Setup {
    pub host: &'static FieldDescriptor,
    pub inputs: Vec<(String, Option<&'static FieldDescriptor>)>,
    /// What the item this node is wired into takes
    pub consumer: Option<&'static FieldDescriptor>,
}

impl Setup {
    /// Type of the value an existing item will produce, if known
    pub fn input(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.inputs
            .iter()
            .find(|(input, _)| input == name)
            .and_then(|(_, descriptor)| *descriptor)
    }

    /// Type of the object an owner item stands for
    pub fn owner(&self, name: &str) -> &'static FieldDescriptor {
        self.input(name).unwrap_or(self.host)
    }
}

/// Items a node requires, its output type, and what went wrong working them out
pub(crate) struct SetupOutcome {
    pub items: Vec<ItemSpec>,
    pub output: Option<&'static FieldDescriptor>,
    pub error: Option<BindingError>,
}

impl SetupOutcome {
    pub fn new(items: Vec<ItemSpec>, output: Option<&'static FieldDescriptor>) -> Self {
        Self {
            items,
            output,
            error: None,
        }
    }

    pub fn failed(items: Vec<ItemSpec>, error: impl Into<BindingError>) -> Self {
        Self {
            items,
            output: None,
            error: Some(error.into()),
        }
    }
}
