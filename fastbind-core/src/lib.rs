#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

#[cfg(feature = "alloc")]
extern crate alloc;

mod macros;

// Opaque pointer utilities
mod ptr;
pub use ptr::*;

// Definition for `core::` types
mod impls_core;

// Definition for `alloc::` types
#[cfg(feature = "alloc")]
mod impls_alloc;

// Const type Id
mod typeid;
pub use typeid::*;

// Type definitions
mod types;
pub use types::*;

/// Allows querying the [`FieldDescriptor`] of a type, which in turn lets
/// bindings read, write, copy and compare values of it without knowing it.
///
/// # Safety
///
/// The descriptor must describe `Self` exactly: layout, offsets of every
/// property, and vtable entries that really operate on `Self`. Everything
/// downstream trusts it.
pub unsafe trait Reflect: 'static {
    /// The descriptor of this type
    const DESCRIPTOR: &'static FieldDescriptor;
}

/// Returns the descriptor of `T`, in a form that can be stored as a `fn` pointer
#[inline]
pub const fn descriptor_of<T: Reflect>() -> &'static FieldDescriptor {
    T::DESCRIPTOR
}
