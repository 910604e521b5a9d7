//! Opaque pointers
//!
//! Type-erased pointer helpers. Every value flowing through a binding graph is
//! addressed through one of these, paired with the [`FieldDescriptor`] that
//! describes its layout.
//!
//! [`FieldDescriptor`]: crate::FieldDescriptor

use core::{marker::PhantomData, ptr::NonNull};

/// A type-erased pointer to uninitialized memory
#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct PtrUninit<'mem>(*mut u8, PhantomData<&'mem mut ()>);

impl<'mem> PtrUninit<'mem> {
    /// Create a new opaque pointer from a mutable pointer
    #[inline]
    pub fn new<T>(ptr: *mut T) -> Self {
        Self(ptr as *mut u8, PhantomData)
    }

    /// Assumes the pointer is initialized and returns a [`PtrMut`]
    ///
    /// # Safety
    ///
    /// The memory must hold an initialized value of the type the caller
    /// will later treat it as.
    #[inline]
    pub unsafe fn assume_init(self) -> PtrMut<'mem> {
        PtrMut(unsafe { NonNull::new_unchecked(self.0) }, PhantomData)
    }

    /// Moves `value` into this location and returns the initialized pointer
    ///
    /// # Safety
    ///
    /// The pointer must be aligned for `T` and valid for writes of
    /// `size_of::<T>()` bytes.
    #[inline]
    pub unsafe fn put<T>(self, value: T) -> PtrMut<'mem> {
        unsafe {
            core::ptr::write(self.0 as *mut T, value);
            self.assume_init()
        }
    }

    /// Returns the underlying raw pointer
    #[inline]
    pub fn as_mut_byte_ptr(self) -> *mut u8 {
        self.0
    }

    /// Returns a pointer `offset` bytes further into the same allocation
    ///
    /// # Safety
    ///
    /// `offset` must stay within the bounds of the allocation.
    #[inline]
    pub unsafe fn field_uninit_at(self, offset: usize) -> PtrUninit<'mem> {
        PtrUninit(unsafe { self.0.byte_add(offset) }, PhantomData)
    }
}

/// A type-erased read-only pointer to an initialized value.
///
/// Cannot be null. May be dangling for zero-sized types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PtrConst<'mem>(NonNull<u8>, PhantomData<&'mem ()>);

impl<'mem> PtrConst<'mem> {
    /// Create a new opaque const pointer from a raw pointer
    ///
    /// The pointer must be non-null; use `&raw const x` to take it.
    #[inline]
    pub const fn new<T>(ptr: *const T) -> Self {
        unsafe { Self(NonNull::new_unchecked(ptr as *mut u8), PhantomData) }
    }

    /// Gets the underlying raw pointer as a byte pointer
    #[inline]
    pub const fn as_byte_ptr(self) -> *const u8 {
        self.0.as_ptr()
    }

    /// Borrows the pointee as a `T`
    ///
    /// # Safety
    ///
    /// `T` must be the actual type of the pointed-to value. There are no
    /// guardrails here.
    #[inline]
    pub unsafe fn get<T>(self) -> &'mem T {
        unsafe { &*(self.0.as_ptr() as *const T) }
    }

    /// Returns a pointer `offset` bytes further into the same value
    ///
    /// # Safety
    ///
    /// `offset` must address a field inside the pointed-to value.
    #[inline]
    pub unsafe fn field(self, offset: usize) -> PtrConst<'mem> {
        PtrConst(
            unsafe { NonNull::new_unchecked(self.0.as_ptr().byte_add(offset)) },
            PhantomData,
        )
    }

    /// Re-borrows this pointer for a caller-chosen lifetime
    ///
    /// # Safety
    ///
    /// The pointee must stay alive and unmoved for `'any`.
    #[inline]
    pub unsafe fn detach<'any>(self) -> PtrConst<'any> {
        PtrConst(self.0, PhantomData)
    }
}

/// A type-erased pointer to an initialized, mutable value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PtrMut<'mem>(NonNull<u8>, PhantomData<&'mem mut ()>);

impl<'mem> PtrMut<'mem> {
    /// Create a new opaque pointer from a raw pointer
    ///
    /// The pointer must be non-null; use `&raw mut x` to take it.
    #[inline]
    pub const fn new<T>(ptr: *mut T) -> Self {
        Self(
            unsafe { NonNull::new_unchecked(ptr as *mut u8) },
            PhantomData,
        )
    }

    /// Gets the underlying raw pointer
    #[inline]
    pub const fn as_byte_ptr(self) -> *const u8 {
        self.0.as_ptr()
    }

    /// Gets the underlying raw pointer as mutable
    #[inline]
    pub const fn as_mut_byte_ptr(self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// Borrows the pointee as a `&T`
    ///
    /// # Safety
    ///
    /// `T` must be the actual type of the pointed-to value.
    #[inline]
    pub unsafe fn get<T>(self) -> &'mem T {
        unsafe { &*(self.0.as_ptr() as *const T) }
    }

    /// Borrows the pointee as a `&mut T`
    ///
    /// # Safety
    ///
    /// `T` must be the actual type of the pointed-to value, and no other
    /// borrow of it may be live.
    #[inline]
    pub unsafe fn as_mut<T>(self) -> &'mem mut T {
        unsafe { &mut *(self.0.as_ptr() as *mut T) }
    }

    /// Make a const pointer out of this mutable one
    #[inline]
    pub const fn as_const(self) -> PtrConst<'mem> {
        PtrConst(self.0, PhantomData)
    }

    /// Forget that this memory is initialized
    #[inline]
    pub fn as_uninit(self) -> PtrUninit<'mem> {
        PtrUninit(self.0.as_ptr(), PhantomData)
    }

    /// Returns a pointer `offset` bytes further into the same value
    ///
    /// # Safety
    ///
    /// `offset` must address a field inside the pointed-to value.
    #[inline]
    pub unsafe fn field(self, offset: usize) -> PtrMut<'mem> {
        PtrMut(
            unsafe { NonNull::new_unchecked(self.0.as_ptr().byte_add(offset)) },
            PhantomData,
        )
    }

    /// Drops the pointee in place, leaving the memory uninitialized
    ///
    /// # Safety
    ///
    /// `T` must be the actual type of the pointed-to value. The memory must
    /// not be read again until it is reinitialized.
    #[inline]
    pub unsafe fn drop_in_place<T>(self) -> PtrUninit<'mem> {
        unsafe { core::ptr::drop_in_place(self.0.as_ptr() as *mut T) }
        self.as_uninit()
    }

    /// Re-borrows this pointer for a caller-chosen lifetime
    ///
    /// # Safety
    ///
    /// The pointee must stay alive, unmoved and otherwise unaliased for `'any`.
    #[inline]
    pub unsafe fn detach<'any>(self) -> PtrMut<'any> {
        PtrMut(self.0, PhantomData)
    }
}
