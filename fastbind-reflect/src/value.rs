use core::fmt;

use alloc::string::{String, ToString};
use fastbind_core::{FieldDescriptor, Kind, PtrConst, PtrMut, Reflect};

use crate::ReflectError;

/// A type-erased, read-only view of a value: a descriptor plus the location
/// of a value it describes.
///
/// Holding one never implies owning the value. Absence of a value is spelled
/// `Option::<ReflectedValue>::None`.
#[derive(Clone, Copy)]
pub struct ReflectedValue<'mem> {
    descriptor: &'static FieldDescriptor,
    data: PtrConst<'mem>,
}

impl<'mem> ReflectedValue<'mem> {
    /// Views a typed reference
    pub fn of<T: Reflect>(value: &'mem T) -> Self {
        Self {
            descriptor: T::DESCRIPTOR,
            data: PtrConst::new(value as *const T),
        }
    }

    /// Pairs a descriptor with a location
    ///
    /// # Safety
    ///
    /// `data` must point to an initialized value described by `descriptor`,
    /// alive and not mutated for `'mem`.
    #[inline]
    pub unsafe fn new(descriptor: &'static FieldDescriptor, data: PtrConst<'mem>) -> Self {
        Self { descriptor, data }
    }

    /// The descriptor of the value
    #[inline]
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.descriptor
    }

    /// The location of the value
    #[inline]
    pub fn data(&self) -> PtrConst<'mem> {
        self.data
    }

    /// Whether both values have the same type and compare equal.
    ///
    /// Types without equality are never identical, not even to themselves.
    pub fn identical(&self, other: &ReflectedValue<'_>) -> bool {
        if !self.descriptor.is_same(other.descriptor) {
            return false;
        }
        unsafe { self.descriptor.identical(self.data, other.data) }
    }

    /// Borrows the value as a `T`, if it is one
    pub fn get<T: Reflect>(&self) -> Result<&'mem T, ReflectError> {
        if !self.descriptor.is_type::<T>() {
            return Err(ReflectError::WrongDescriptor {
                expected: T::DESCRIPTOR,
                actual: self.descriptor,
            });
        }
        Ok(unsafe { self.data.get::<T>() })
    }

    /// The value, if it is a `bool`
    pub fn as_bool(&self) -> Option<bool> {
        match self.descriptor.kind {
            Kind::Bool => Some(*unsafe { self.data.get::<bool>() }),
            _ => None,
        }
    }

    /// The integer value of the variant, if this is an enum
    pub fn enum_value(&self) -> Option<i64> {
        let def = self.descriptor.as_enum()?;
        Some(unsafe { def.read(self.data) })
    }

    /// Exports the value through its text codec, if it has one
    pub fn to_text(&self) -> Option<String> {
        self.descriptor.vtable.display?;
        Some(self.to_string())
    }

    /// Reads a named property of a struct value
    pub fn property(&self, name: &str) -> Option<ReflectedValue<'mem>> {
        let property = self.descriptor.as_struct()?.property(name)?;
        Some(ReflectedValue {
            descriptor: property.descriptor(),
            data: unsafe { self.data.field(property.offset) },
        })
    }

    /// Re-borrows this value for a caller-chosen lifetime
    ///
    /// # Safety
    ///
    /// The value must stay alive, unmoved and unmutated for `'any`.
    #[inline]
    pub unsafe fn detach<'any>(self) -> ReflectedValue<'any> {
        ReflectedValue {
            descriptor: self.descriptor,
            data: unsafe { self.data.detach() },
        }
    }
}

impl fmt::Display for ReflectedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.descriptor.vtable.display {
            Some(display) => unsafe { display(self.data, f) },
            None => write!(f, "⟨{}⟩", self.descriptor),
        }
    }
}

impl fmt::Debug for ReflectedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.descriptor.vtable.debug {
            Some(debug) => unsafe { debug(self.data, f) },
            None => write!(f, "⟨{}⟩", self.descriptor),
        }
    }
}

/// A type-erased, mutable view of a value
pub struct ReflectedMut<'mem> {
    descriptor: &'static FieldDescriptor,
    data: PtrMut<'mem>,
}

impl<'mem> ReflectedMut<'mem> {
    /// Views a typed mutable reference
    pub fn of<T: Reflect>(value: &'mem mut T) -> Self {
        Self {
            descriptor: T::DESCRIPTOR,
            data: PtrMut::new(value as *mut T),
        }
    }

    /// Pairs a descriptor with a mutable location
    ///
    /// # Safety
    ///
    /// `data` must point to an initialized value described by `descriptor`,
    /// alive and exclusively borrowed for `'mem`.
    #[inline]
    pub unsafe fn new(descriptor: &'static FieldDescriptor, data: PtrMut<'mem>) -> Self {
        Self { descriptor, data }
    }

    /// The descriptor of the value
    #[inline]
    pub fn descriptor(&self) -> &'static FieldDescriptor {
        self.descriptor
    }

    /// The location of the value
    #[inline]
    pub fn data(&self) -> PtrMut<'mem> {
        self.data
    }

    /// A read-only view of the same value
    pub fn as_value(&self) -> ReflectedValue<'_> {
        ReflectedValue {
            descriptor: self.descriptor,
            data: self.data.as_const(),
        }
    }

    /// Shortens the borrow, so the view can be handed out without being consumed
    pub fn reborrow(&mut self) -> ReflectedMut<'_> {
        ReflectedMut {
            descriptor: self.descriptor,
            data: self.data,
        }
    }

    /// Overwrites this value with a copy of `source`.
    ///
    /// Fails, leaving the value untouched, if the types differ or cannot be copied.
    pub fn assign_from(&mut self, source: ReflectedValue<'_>) -> Result<(), ReflectError> {
        if !self.descriptor.is_same(source.descriptor()) {
            return Err(ReflectError::WrongDescriptor {
                expected: self.descriptor,
                actual: source.descriptor(),
            });
        }
        if core::ptr::eq(self.data.as_byte_ptr(), source.data().as_byte_ptr()) {
            return Ok(());
        }
        if unsafe { self.descriptor.copy_assign(self.data, source.data()) } {
            Ok(())
        } else {
            Err(ReflectError::MissingOperation {
                descriptor: self.descriptor,
                operation: "clone_into",
            })
        }
    }

    /// Imports text into this value through its text codec
    pub fn parse(&mut self, text: &str) -> Result<(), ReflectError> {
        let Some(parse) = self.descriptor.vtable.parse else {
            return Err(ReflectError::MissingOperation {
                descriptor: self.descriptor,
                operation: "parse",
            });
        };
        unsafe { parse(text, self.data) }.map_err(|error| ReflectError::Parse {
            descriptor: self.descriptor,
            error,
        })
    }

    /// Follows an object reference, if this is a non-null one
    ///
    /// # Safety
    ///
    /// The referenced object must be alive and not otherwise borrowed for `'mem`.
    pub unsafe fn follow(&self) -> Option<ReflectedMut<'mem>> {
        let object = self.descriptor.as_object()?;
        let data = unsafe { object.follow(self.data.as_const())? };
        Some(ReflectedMut {
            descriptor: object.target(),
            data,
        })
    }
}

impl fmt::Debug for ReflectedMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.as_value(), f)
    }
}
