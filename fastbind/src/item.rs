use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use core::{fmt, ptr::NonNull};

use fastbind_core::{FieldDescriptor, ObjectRef, Reflect};
use fastbind_reflect::{OwnedValue, ReflectError, ReflectedValue};

use crate::{BindingError, BindingGraph, NodeId, SetterRegistry, eval::Pass, eval::Pulled};

/// What an item accepts, from a wired node or as a default
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expect {
    /// Anything. Literal text defaults are read as a `String`.
    Any,

    /// Any object reference
    Object,

    /// Values of exactly this type
    Exactly(&'static FieldDescriptor),

    /// Values of this type, or of any type the graph's
    /// [`SetterRegistry`](crate::SetterRegistry) converts to it
    Assignable(&'static FieldDescriptor),
}

impl Expect {
    /// Whether a value of `descriptor` fits without conversion
    pub fn accepts(self, descriptor: &'static FieldDescriptor) -> bool {
        match self {
            Expect::Any => true,
            Expect::Object => descriptor.as_object().is_some(),
            Expect::Exactly(expected) | Expect::Assignable(expected) => {
                expected.is_same(descriptor)
            }
        }
    }

    /// Whether a value of `descriptor` fits, converted through `setters` if needed
    pub fn accepts_with(
        self,
        setters: &SetterRegistry,
        descriptor: &'static FieldDescriptor,
    ) -> bool {
        match self {
            Expect::Assignable(expected) => setters.can_assign(expected, descriptor),
            _ => self.accepts(descriptor),
        }
    }

    /// The type values end up as, if there is one
    pub fn descriptor(self) -> Option<&'static FieldDescriptor> {
        match self {
            Expect::Exactly(descriptor) | Expect::Assignable(descriptor) => Some(descriptor),
            Expect::Any | Expect::Object => None,
        }
    }
}

impl fmt::Display for Expect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expect::Any => f.write_str("anything"),
            Expect::Object => f.write_str("an object reference"),
            Expect::Exactly(descriptor) => write!(f, "{}", descriptor),
            Expect::Assignable(descriptor) => write!(f, "{}", descriptor),
        }
    }
}

/// A value stored on an unwired item, in portable form
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiteralDefault {
    /// Text imported through the item type's codec
    Text(String),

    /// A reference to a host object, made with [`LiteralDefault::object`]
    Object(ObjectDefault),
}

/// An object reference kept as a default.
///
/// It can only be made from an [`ObjectRef`], so whatever it points at is
/// covered by the contract of [`ObjectRef::to`]:
///
/// ```compile_fail,E0451
/// # use fastbind::{LiteralDefault, ObjectDefault};
/// # use fastbind_core::Reflect;
/// let forged = LiteralDefault::Object(ObjectDefault {
///     descriptor: u8::DESCRIPTOR,
///     target: None,
/// });
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectDefault {
    descriptor: &'static FieldDescriptor,
    target: Option<NonNull<u8>>,
}

impl ObjectDefault {
    /// Descriptor of the reference type, an `ObjectRef<T>`
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.descriptor
    }

    /// Whether this is the null reference
    pub fn is_null(&self) -> bool {
        self.target.is_none()
    }
}

impl LiteralDefault {
    /// A text default
    pub fn text(text: impl Into<String>) -> Self {
        LiteralDefault::Text(text.into())
    }

    /// An object reference default
    pub fn object<T: Reflect>(reference: ObjectRef<T>) -> Self {
        LiteralDefault::Object(ObjectDefault {
            descriptor: ObjectRef::<T>::DESCRIPTOR,
            target: reference.as_raw(),
        })
    }

    /// Exports `value` to the form it would be stored in
    pub fn from_value(value: ReflectedValue<'_>) -> Option<Self> {
        let descriptor = value.descriptor();
        if let Some(object) = descriptor.as_object() {
            let target = unsafe { object.follow(value.data()) }
                .and_then(|target| NonNull::new(target.as_mut_byte_ptr()));
            return Some(LiteralDefault::Object(ObjectDefault { descriptor, target }));
        }
        value.to_text().map(LiteralDefault::Text)
    }

    /// The type this default decodes to, when it says so itself
    pub fn descriptor(&self) -> Option<&'static FieldDescriptor> {
        match self {
            LiteralDefault::Text(_) => None,
            LiteralDefault::Object(object) => Some(object.descriptor),
        }
    }

    /// Allocates a value of the type `expect` allows and decodes into it
    pub fn decode(&self, expect: Expect) -> Result<OwnedValue, BindingError> {
        match self {
            LiteralDefault::Text(text) => {
                let descriptor = match expect {
                    Expect::Exactly(descriptor) | Expect::Assignable(descriptor) => descriptor,
                    Expect::Any => String::DESCRIPTOR,
                    Expect::Object => {
                        return Err(BindingError::WrongInput {
                            item: String::new(),
                            expected: expect,
                            actual: String::DESCRIPTOR,
                        });
                    }
                };
                Ok(OwnedValue::from_text(descriptor, text)?)
            }
            LiteralDefault::Object(object) => {
                let ObjectDefault { descriptor, target } = *object;
                if !expect.accepts(descriptor) {
                    return Err(BindingError::WrongInput {
                        item: String::new(),
                        expected: expect,
                        actual: descriptor,
                    });
                }
                let reference = descriptor.as_object().ok_or(ReflectError::WasNotA {
                    expected: "object reference",
                    actual: descriptor,
                })?;
                let mut value = OwnedValue::new_default(descriptor)?;
                unsafe { reference.store(value.as_mut().data(), target) };
                Ok(value)
            }
        }
    }
}

/// Membership of an item in a list the node can grow, such as the
/// mappings of a select node
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListEntry {
    /// Name shared by every item of the list
    pub base: &'static str,
    /// Position in the list
    pub index: usize,
}

enum Decoded {
    Pending,
    Ready(OwnedValue),
    Failed,
}

/// A named input slot on a node.
///
/// An item resolves through the value node wired into it, or else through
/// its literal default, decoded once into storage the item owns.
pub struct BindingItem {
    name: String,
    expect: Expect,
    input: Option<NodeId>,
    default: Option<LiteralDefault>,
    decoded: Decoded,
    list: Option<ListEntry>,
    allow_null: bool,
}

impl BindingItem {
    pub(crate) fn from_spec(spec: ItemSpec) -> Self {
        Self {
            name: spec.name,
            expect: spec.expect,
            input: None,
            default: None,
            decoded: Decoded::Pending,
            list: spec.list,
            allow_null: spec.allow_null,
        }
    }

    /// Name of the item, unique on its node
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the item accepts
    pub fn expect(&self) -> Expect {
        self.expect
    }

    /// The value node wired into this item
    pub fn input(&self) -> Option<NodeId> {
        self.input
    }

    /// The literal default
    pub fn default(&self) -> Option<&LiteralDefault> {
        self.default.as_ref()
    }

    /// Whether the item may be left empty, standing for the host root
    pub fn allows_null(&self) -> bool {
        self.allow_null
    }

    /// List membership, for items of a growable list
    pub fn list_entry(&self) -> Option<&ListEntry> {
        self.list.as_ref()
    }

    /// Whether the item has neither a wired node nor a default
    pub fn is_empty(&self) -> bool {
        self.input.is_none() && self.default.is_none()
    }

    /// Whether the default has been decoded
    pub fn has_decoded_default(&self) -> bool {
        matches!(self.decoded, Decoded::Ready(_))
    }

    pub(crate) fn set_input(&mut self, input: Option<NodeId>) -> Option<NodeId> {
        core::mem::replace(&mut self.input, input)
    }

    pub(crate) fn set_default(&mut self, default: Option<LiteralDefault>) {
        self.default = default;
        self.decoded = Decoded::Pending;
    }

    /// Type of the value this item will produce, as far as it is known
    /// without evaluating anything
    pub(crate) fn default_descriptor(&self) -> Option<&'static FieldDescriptor> {
        match &self.decoded {
            Decoded::Ready(value) => Some(value.descriptor()),
            Decoded::Pending | Decoded::Failed => self
                .default
                .as_ref()
                .and_then(LiteralDefault::descriptor)
                .or_else(|| self.default.as_ref().and(self.expect.descriptor())),
        }
    }

    pub(crate) fn resolve(
        &mut self,
        graph: &mut BindingGraph,
        pass: &mut Pass<'_>,
    ) -> Option<Pulled> {
        match self.input {
            Some(input) => graph.query(input, pass),
            None => self.resolve_default(),
        }
    }

    /// Decodes the default on first use. Only that first resolution counts as a change.
    pub(crate) fn resolve_default(&mut self) -> Option<Pulled> {
        let default = self.default.as_ref()?;
        let changed = match &self.decoded {
            Decoded::Ready(_) => false,
            Decoded::Failed => return None,
            Decoded::Pending => match default.decode(self.expect) {
                Ok(value) => {
                    self.decoded = Decoded::Ready(value);
                    true
                }
                Err(error) => {
                    log::warn!("default of item '{}' does not decode: {}", self.name, error);
                    self.decoded = Decoded::Failed;
                    return None;
                }
            },
        };
        let Decoded::Ready(value) = &self.decoded else {
            return None;
        };
        // SAFETY: the buffer is only freed when the default is replaced or the item dropped
        let value = unsafe { value.as_value().detach() };
        Some(Pulled { value, changed })
    }
}

impl fmt::Debug for BindingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingItem")
            .field("name", &self.name)
            .field("expect", &self.expect)
            .field("input", &self.input)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// An item a node requires in its current configuration
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ItemSpec {
    pub name: String,
    pub expect: Expect,
    pub allow_null: bool,
    pub list: Option<ListEntry>,
}

impl ItemSpec {
    pub fn new(name: impl Into<String>, expect: Expect) -> Self {
        Self {
            name: name.into(),
            expect,
            allow_null: false,
            list: None,
        }
    }

    /// An item left empty to stand for the host root
    pub fn owner(name: &str) -> Self {
        Self {
            allow_null: true,
            ..Self::new(name, Expect::Object)
        }
    }

    pub fn nullable(mut self) -> Self {
        self.allow_null = true;
        self
    }

    pub fn listed(base: &'static str, index: usize, expect: Expect) -> Self {
        Self {
            list: Some(ListEntry { base, index }),
            ..Self::new(list_item_name(base, index), expect)
        }
    }
}

/// Name of the `index`th item of a growable list
pub fn list_item_name(base: &str, index: usize) -> String {
    let mut name = base.to_string();
    name.push(' ');
    name.push_str(&index.to_string());
    name
}

/// Brings `items` in line with `specs`: items keep their wiring and
/// default when their name is still required, missing items are added and
/// the rest removed.
///
/// Returns the nodes that were wired into removed items.
pub(crate) fn reconcile(items: &mut Vec<BindingItem>, specs: Vec<ItemSpec>) -> Vec<NodeId> {
    let mut previous = core::mem::take(items);
    for spec in specs {
        if items.iter().any(|item| item.name == spec.name) {
            continue;
        }
        match previous.iter().position(|item| item.name == spec.name) {
            Some(index) => {
                let mut item = previous.swap_remove(index);
                if item.expect != spec.expect {
                    item.expect = spec.expect;
                    item.decoded = Decoded::Pending;
                }
                item.allow_null = spec.allow_null;
                item.list = spec.list;
                items.push(item);
            }
            None => items.push(BindingItem::from_spec(spec)),
        }
    }
    previous.iter().filter_map(|item| item.input).collect()
}
