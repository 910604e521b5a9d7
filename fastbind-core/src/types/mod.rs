//! Field descriptors and the tables hanging off them

use core::alloc::Layout;

mod value;
pub use value::*;

mod member;
pub use member::*;

mod enum_;
pub use enum_::*;

mod object;
pub use object::*;

mod number;
pub use number::*;

mod list;
pub use list::*;

use crate::{ConstTypeId, PtrConst, PtrMut, PtrUninit, Reflect};

/// Reflection handle for a type: identity, layout, value operations and the
/// member table if there is one.
///
/// Two descriptors are equal iff they describe the same Rust type.
#[derive(Clone, Copy)]
#[non_exhaustive]
pub struct FieldDescriptor {
    /// Unique type identifier, provided by the compiler.
    pub id: ConstTypeId,

    /// Size and alignment, enough to allocate a value of this type
    pub layout: Layout,

    /// Operations on values of this type
    pub vtable: &'static ValueVTable,

    /// What sort of value this is
    pub kind: Kind,

    /// The type's name without generic parameters
    pub type_identifier: &'static str,
}

/// What sort of value a [`FieldDescriptor`] describes.
///
/// Node logic is written against the vtable; only a couple of nodes branch on this.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub enum Kind {
    /// `()`
    Unit,
    /// `bool`
    Bool,
    /// Any integer or float
    Number(&'static NumberDef),
    /// `char`
    Char,
    /// `String`
    Text,
    /// A fieldless enum with a variant table
    Enum(&'static EnumDef),
    /// A struct with a member table
    Struct(&'static StructDef),
    /// A nullable, non-owning reference to another reflected value
    Object(&'static ObjectDef),
    /// A growable list, like `Vec<T>`
    List(&'static ListDef),
}

impl FieldDescriptor {
    /// Returns a builder for the descriptor of `T`, with id and layout filled in
    pub const fn builder_for<T: 'static>() -> FieldDescriptorBuilder {
        FieldDescriptorBuilder::new(ConstTypeId::of::<T>(), Layout::new::<T>())
    }

    /// Whether `self` and `other` describe the same type
    #[inline]
    pub fn is_same(&self, other: &FieldDescriptor) -> bool {
        self.id == other.id
    }

    /// Whether this describes `T`
    #[inline]
    pub fn is_type<T: Reflect>(&self) -> bool {
        self.is_same(T::DESCRIPTOR)
    }

    /// Size in bytes of a value of this type
    #[inline]
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    /// Alignment of a value of this type
    #[inline]
    pub fn align(&self) -> usize {
        self.layout.align()
    }

    /// The member table, if this is a struct
    pub fn as_struct(&self) -> Option<&'static StructDef> {
        match self.kind {
            Kind::Struct(def) => Some(def),
            _ => None,
        }
    }

    /// The variant table, if this is an enum
    pub fn as_enum(&self) -> Option<&'static EnumDef> {
        match self.kind {
            Kind::Enum(def) => Some(def),
            _ => None,
        }
    }

    /// The number definition, if this is a primitive number
    pub fn as_number(&self) -> Option<&'static NumberDef> {
        match self.kind {
            Kind::Number(def) => Some(def),
            _ => None,
        }
    }

    /// The list definition, if this is a list
    pub fn as_list(&self) -> Option<&'static ListDef> {
        match self.kind {
            Kind::List(def) => Some(def),
            _ => None,
        }
    }

    /// The reference definition, if this is an object reference
    pub fn as_object(&self) -> Option<&'static ObjectDef> {
        match self.kind {
            Kind::Object(def) => Some(def),
            _ => None,
        }
    }

    /// Compares two values of this type.
    ///
    /// Returns false if the type has no equality.
    ///
    /// # Safety
    ///
    /// Both pointers must point to initialized values of this type.
    #[inline]
    pub unsafe fn identical(&self, left: PtrConst<'_>, right: PtrConst<'_>) -> bool {
        match self.vtable.eq {
            Some(eq) => unsafe { eq(left, right) },
            None => false,
        }
    }

    /// Replaces the value at `target` with a copy of the value at `source`.
    ///
    /// Returns false, leaving `target` untouched, if the type cannot be cloned.
    ///
    /// # Safety
    ///
    /// Both pointers must point to initialized values of this type, and they
    /// must not overlap.
    pub unsafe fn copy_assign(&self, target: PtrMut<'_>, source: PtrConst<'_>) -> bool {
        let Some(clone_into) = self.vtable.clone_into else {
            return false;
        };
        unsafe {
            let uninit = (self.vtable.drop_in_place)(target);
            clone_into(source, uninit);
        }
        true
    }

    /// Heap-allocate room for a value of this type
    #[cfg(feature = "alloc")]
    pub fn allocate(&self) -> PtrUninit<'static> {
        let layout = self.layout;
        PtrUninit::new(if layout.size() == 0 {
            core::ptr::without_provenance_mut::<u8>(layout.align())
        } else {
            // SAFETY: layout's size is non-zero
            let ptr = unsafe { alloc::alloc::alloc(layout) };
            if ptr.is_null() {
                alloc::alloc::handle_alloc_error(layout);
            }
            ptr
        })
    }

    /// Release memory obtained from [`Self::allocate`]
    ///
    /// # Safety
    ///
    /// `ptr` must come from [`Self::allocate`] on this descriptor, must not
    /// have been deallocated already, and must not hold a live value.
    #[cfg(feature = "alloc")]
    pub unsafe fn deallocate(&self, ptr: PtrUninit<'static>) {
        if self.layout.size() == 0 {
            return;
        }
        unsafe { alloc::alloc::dealloc(ptr.as_mut_byte_ptr(), self.layout) }
    }
}

impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl Eq for FieldDescriptor {}

impl core::hash::Hash for FieldDescriptor {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl core::fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.type_identifier)
    }
}

impl core::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("type", &format_args!("{}", self))
            .field("size", &self.size())
            .field("align", &self.align())
            .finish_non_exhaustive()
    }
}

/// Builder for [`FieldDescriptor`]
pub struct FieldDescriptorBuilder {
    id: ConstTypeId,
    layout: Layout,
    vtable: Option<&'static ValueVTable>,
    kind: Option<Kind>,
    type_identifier: Option<&'static str>,
}

impl FieldDescriptorBuilder {
    /// Creates a builder with identity and layout set
    pub const fn new(id: ConstTypeId, layout: Layout) -> Self {
        Self {
            id,
            layout,
            vtable: None,
            kind: None,
            type_identifier: None,
        }
    }

    /// Sets the `vtable` field
    #[inline]
    pub const fn vtable(mut self, vtable: &'static ValueVTable) -> Self {
        self.vtable = Some(vtable);
        self
    }

    /// Sets the `kind` field
    #[inline]
    pub const fn kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the `type_identifier` field
    #[inline]
    pub const fn type_identifier(mut self, type_identifier: &'static str) -> Self {
        self.type_identifier = Some(type_identifier);
        self
    }

    /// Builds the descriptor.
    ///
    /// # Panics
    ///
    /// Panics if `vtable`, `kind` or `type_identifier` is missing. In const
    /// context this is a compile error.
    #[inline]
    pub const fn build(self) -> FieldDescriptor {
        let (Some(vtable), Some(kind), Some(type_identifier)) =
            (self.vtable, self.kind, self.type_identifier)
        else {
            panic!("FieldDescriptor needs a vtable, a kind and a type identifier");
        };
        FieldDescriptor {
            id: self.id,
            layout: self.layout,
            vtable,
            kind,
            type_identifier,
        }
    }
}

/// Computing a combined layout overflowed `isize`
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct LayoutError;

impl core::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Layout computation overflowed")
    }
}

impl core::error::Error for LayoutError {}
