use core::{fmt, marker::PhantomData, ptr::NonNull};

use super::{FieldDescriptor, Kind, ValueVTable};
use crate::{PtrConst, PtrMut, Reflect};

/// Describes [`ObjectRef`] values: what they point at, and how to follow them
#[derive(Clone, Copy)]
pub struct ObjectDef {
    /// Descriptor of the referenced type
    pub target: fn() -> &'static FieldDescriptor,
}

impl ObjectDef {
    /// Returns the descriptor of the referenced type
    #[inline]
    pub fn target(&self) -> &'static FieldDescriptor {
        (self.target)()
    }

    /// Follows the reference stored at `value`. Returns `None` for null references.
    ///
    /// # Safety
    ///
    /// `value` must point to an initialized [`ObjectRef`]. If the reference is
    /// not null, its target must be alive and unaliased for `'a`.
    #[inline]
    pub unsafe fn follow<'a>(&self, value: PtrConst<'_>) -> Option<PtrMut<'a>> {
        let raw = unsafe { *value.get::<Option<NonNull<u8>>>() };
        raw.map(|ptr| PtrMut::new(ptr.as_ptr()))
    }

    /// Overwrites the reference stored at `target`
    ///
    /// # Safety
    ///
    /// `target` must point to an initialized [`ObjectRef`] whose referenced
    /// type is [`Self::target`], and `raw` must point to a value of that type.
    #[inline]
    pub unsafe fn store(&self, target: PtrMut<'_>, raw: Option<NonNull<u8>>) {
        unsafe { *target.as_mut::<Option<NonNull<u8>>>() = raw };
    }
}

impl fmt::Debug for ObjectDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDef")
            .field("target", &format_args!("{}", self.target()))
            .finish()
    }
}

/// A nullable, non-owning reference to a host object.
///
/// This is a raw pointer with a type attached: holding one does not keep the
/// target alive. Only the null reference can be made safely; pointing one at
/// an object goes through the `unsafe` [`ObjectRef::to`].
#[repr(transparent)]
pub struct ObjectRef<T>(Option<NonNull<T>>, PhantomData<*mut T>);

impl<T> ObjectRef<T> {
    /// The null reference
    pub const fn null() -> Self {
        Self(None, PhantomData)
    }

    /// A reference to `target`.
    ///
    /// ```
    /// # use fastbind_core::ObjectRef;
    /// let mut level = 3_i32;
    /// let reference = unsafe { ObjectRef::to(&mut level) };
    /// assert!(!reference.is_null());
    /// ```
    ///
    /// The borrow ends when this returns, so making one is `unsafe`:
    ///
    /// ```compile_fail,E0133
    /// # use fastbind_core::ObjectRef;
    /// let mut level = 3_i32;
    /// let reference = ObjectRef::to(&mut level);
    /// ```
    ///
    /// # Safety
    ///
    /// `target` must stay alive, and must not be moved or borrowed elsewhere,
    /// for as long as this reference or any copy of it can be followed. That
    /// includes copies stored in host objects and in binding defaults: every
    /// update of a binding that reaches one follows it.
    pub unsafe fn to(target: &mut T) -> Self {
        Self(Some(NonNull::from(target)), PhantomData)
    }

    /// Whether the reference is null
    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// The underlying pointer, type-erased
    pub fn as_raw(&self) -> Option<NonNull<u8>> {
        self.0.map(NonNull::cast)
    }

    /// Borrows the target
    ///
    /// # Safety
    ///
    /// The target must be alive and not mutably borrowed for `'a`.
    pub unsafe fn get<'a>(&self) -> Option<&'a T> {
        self.0.map(|ptr| unsafe { ptr.as_ref() })
    }
}

impl<T> Clone for ObjectRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ObjectRef<T> {}

impl<T> Default for ObjectRef<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> PartialEq for ObjectRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for ObjectRef<T> {}

impl<T> fmt::Debug for ObjectRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ptr) => write!(f, "ObjectRef({:p})", ptr),
            None => write!(f, "ObjectRef(null)"),
        }
    }
}

unsafe impl<T: Reflect> Reflect for ObjectRef<T> {
    const DESCRIPTOR: &'static FieldDescriptor = &const {
        FieldDescriptor::builder_for::<Self>()
            .type_identifier("ObjectRef")
            .vtable(
                &const {
                    ValueVTable::builder::<Self>()
                        .with_default::<Self>()
                        .with_clone::<Self>()
                        .with_eq::<Self>()
                        .with_debug::<Self>()
                        .build()
                },
            )
            .kind(Kind::Object(
                &const {
                    ObjectDef {
                        target: crate::descriptor_of::<T>,
                    }
                },
            ))
            .build()
    };
}
