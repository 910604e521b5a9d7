use core::fmt;

use fastbind_core::{FieldDescriptor, PtrMut, Reflect};

use crate::{ReflectError, ReflectedMut, ReflectedValue};

/// An exclusively owned, heap-allocated value of a type only known through
/// its descriptor.
///
/// Dropping it runs the descriptor's `drop_in_place` before the memory is
/// released.
pub struct OwnedValue {
    descriptor: &'static FieldDescriptor,
    data: PtrMut<'static>,
}

impl OwnedValue {
    /// Allocates and default-constructs a value
    pub fn new_default(descriptor: &'static FieldDescriptor) -> Result<Self, ReflectError> {
        let Some(default_in_place) = descriptor.vtable.default_in_place else {
            return Err(ReflectError::MissingOperation {
                descriptor,
                operation: "default_in_place",
            });
        };
        let uninit = descriptor.allocate();
        let data = unsafe { default_in_place(uninit) };
        trace!("allocated default {}", descriptor);
        Ok(Self { descriptor, data })
    }

    /// Allocates a copy of `value`
    pub fn from_clone(value: ReflectedValue<'_>) -> Result<Self, ReflectError> {
        let descriptor = value.descriptor();
        let Some(clone_into) = descriptor.vtable.clone_into else {
            return Err(ReflectError::MissingOperation {
                descriptor,
                operation: "clone_into",
            });
        };
        let uninit = descriptor.allocate();
        let data = unsafe { clone_into(value.data(), uninit) };
        trace!("allocated copy of {}", descriptor);
        Ok(Self { descriptor, data })
    }

    /// Allocates a value and imports `text` into it
    pub fn from_text(
        descriptor: &'static FieldDescriptor,
        text: &str,
    ) -> Result<Self, ReflectError> {
        let mut value = Self::new_default(descriptor)?;
        value.as_mut().parse(text)?;
        Ok(value)
    }

    /// Moves a typed value onto the heap
    pub fn from_typed<T: Reflect>(value: T) -> Self {
        let descriptor = T::DESCRIPTOR;
        let uninit = descriptor.allocate();
        let data = unsafe { uninit.put(value) };
        Self { descriptor, data }
    }

    /// The descriptor of the value
    #[inline]
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.descriptor
    }

    /// A read-only view of the value
    #[inline]
    pub fn as_value(&self) -> ReflectedValue<'_> {
        unsafe { ReflectedValue::new(self.descriptor, self.data.as_const()) }
    }

    /// A mutable view of the value
    #[inline]
    pub fn as_mut(&mut self) -> ReflectedMut<'_> {
        unsafe { ReflectedMut::new(self.descriptor, self.data) }
    }

    /// Borrows the value as a `T`, if it is one
    pub fn get<T: Reflect>(&self) -> Result<&T, ReflectError> {
        self.as_value().get::<T>()
    }

    /// Overwrites the value with a copy of `source`
    pub fn assign_from(&mut self, source: ReflectedValue<'_>) -> Result<(), ReflectError> {
        self.as_mut().assign_from(source)
    }

    /// Whether `other` is identical to the stored value
    pub fn identical(&self, other: &ReflectedValue<'_>) -> bool {
        self.as_value().identical(other)
    }
}

impl Drop for OwnedValue {
    fn drop(&mut self) {
        unsafe {
            let uninit = (self.descriptor.vtable.drop_in_place)(self.data);
            self.descriptor.deallocate(uninit);
        }
    }
}

impl fmt::Debug for OwnedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedValue").field(&self.as_value()).finish()
    }
}
