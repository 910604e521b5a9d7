#[cfg(feature = "alloc")]
use core::alloc::Layout;

use bitflags::bitflags;

#[cfg(feature = "alloc")]
use super::LayoutError;
use super::FieldDescriptor;
use crate::{PtrConst, PtrMut};

/// The member table of a struct: everything a field path can step through
#[derive(Clone, Copy, Debug)]
pub struct StructDef {
    /// Stored properties, in declaration order
    pub properties: &'static [Property],

    /// Callable functions, in declaration order
    pub functions: &'static [FunctionDef],
}

impl StructDef {
    /// Looks up a property by name
    pub fn property(&self, name: &str) -> Option<&'static Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Looks up a function by name
    pub fn function(&self, name: &str) -> Option<&'static FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// A stored property of a struct
#[derive(Clone, Copy, Debug)]
pub struct Property {
    /// Name of the property
    pub name: &'static str,

    /// Descriptor of the property's type
    pub descriptor: fn() -> &'static FieldDescriptor,

    /// Offset of the property in the struct (obtained through `core::mem::offset_of`)
    pub offset: usize,

    /// Access flags
    pub flags: PropertyFlags,
}

impl Property {
    /// Returns the descriptor of the property's type
    #[inline]
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        (self.descriptor)()
    }

    /// Whether bindings may write to this property
    #[inline]
    pub fn is_writable(&self) -> bool {
        !self.flags.contains(PropertyFlags::READ_ONLY)
    }
}

bitflags! {
    /// Flags that can be applied to properties
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PropertyFlags: u8 {
        /// Bindings may read the property but never write it
        const READ_ONLY = 1 << 0;
    }
}

/// Invokes a host function.
///
/// Returns false if the arguments don't match the parameter list.
///
/// # Safety
///
/// `receiver` must point to an initialized value of the owning type; it is
/// only written through if the function's [`Receiver`] is `Exclusive`. Each
/// argument must point to an initialized value of its parameter's type, and
/// `ret` to an initialized value of the return type, which gets overwritten.
pub type InvokeFn = for<'recv, 'args, 'ret> unsafe fn(
    receiver: PtrMut<'recv>,
    args: &[PtrConst<'args>],
    ret: PtrMut<'ret>,
) -> bool;

/// How a function borrows its receiver
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Receiver {
    /// `&self`
    Shared,
    /// `&mut self`
    Exclusive,
}

/// A callable function on a struct
#[derive(Clone, Copy)]
pub struct FunctionDef {
    /// Name of the function
    pub name: &'static str,

    /// Parameters, in call order
    pub params: &'static [Param],

    /// Descriptor of the return type (`()` for functions returning nothing)
    pub returns: fn() -> &'static FieldDescriptor,

    /// How the receiver is borrowed
    pub receiver: Receiver,

    /// Calls the function
    pub invoke: InvokeFn,
}

impl core::fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", self.returns())
            .field("receiver", &self.receiver)
            .finish_non_exhaustive()
    }
}

impl FunctionDef {
    /// Returns the descriptor of the return type
    #[inline]
    pub fn returns(&self) -> &'static FieldDescriptor {
        (self.returns)()
    }

    /// Looks up a parameter by name
    pub fn param(&self, name: &str) -> Option<&'static Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Whether the function only reads its receiver
    #[inline]
    pub fn is_pure(&self) -> bool {
        self.receiver == Receiver::Shared
    }

    /// A getter takes no parameters and only reads its receiver
    #[inline]
    pub fn is_getter(&self) -> bool {
        self.params.is_empty() && self.is_pure()
    }

    /// Computes the layout of a call frame: every parameter, then the return slot.
    #[cfg(feature = "alloc")]
    pub fn frame_layout(&self) -> Result<FrameLayout, LayoutError> {
        let mut layout = Layout::from_size_align(0, 1).map_err(|_| LayoutError)?;
        let mut param_offsets = alloc::vec::Vec::with_capacity(self.params.len());
        for param in self.params {
            let (next, offset) = layout
                .extend(param.descriptor().layout)
                .map_err(|_| LayoutError)?;
            param_offsets.push(offset);
            layout = next;
        }
        let (layout, return_offset) = layout
            .extend(self.returns().layout)
            .map_err(|_| LayoutError)?;
        Ok(FrameLayout {
            layout: layout.pad_to_align(),
            param_offsets,
            return_offset,
        })
    }
}

/// Where parameters and the return value live inside a call frame
#[cfg(feature = "alloc")]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameLayout {
    /// Layout of the whole frame
    pub layout: Layout,

    /// Offset of each parameter, in call order
    pub param_offsets: alloc::vec::Vec<usize>,

    /// Offset of the return slot
    pub return_offset: usize,
}

/// A function parameter
#[derive(Clone, Copy, Debug)]
pub struct Param {
    /// Name of the parameter
    pub name: &'static str,

    /// Descriptor of the parameter's type
    pub descriptor: fn() -> &'static FieldDescriptor,
}

impl Param {
    /// Returns the descriptor of the parameter's type
    #[inline]
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        (self.descriptor)()
    }
}
