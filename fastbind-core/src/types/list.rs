use super::FieldDescriptor;
use crate::{PtrConst, PtrMut};

/// Get the number of items in the list
///
/// # Safety
///
/// The `list` parameter must point to aligned, initialized memory of the correct type.
pub type ListLenFn = for<'mem> unsafe fn(list: PtrConst<'mem>) -> usize;

/// Get pointer to the element at `index` in the list, or `None` if the
/// index is out of bounds.
///
/// # Safety
///
/// The `list` parameter must point to aligned, initialized memory of the correct type.
pub type ListGetFn =
    for<'mem> unsafe fn(list: PtrConst<'mem>, index: usize) -> Option<PtrConst<'mem>>;

/// Push a copy of `item` at the end of the list
///
/// # Safety
///
/// `list` must point to an initialized list of the correct type, and `item`
/// to an initialized value of its item type, outside the list.
pub type ListPushCloneFn = for<'l, 'i> unsafe fn(list: PtrMut<'l>, item: PtrConst<'i>);

/// A growable list of reflected items, like `Vec<T>`
#[derive(Clone, Copy)]
pub struct ListDef {
    /// Descriptor of the items
    pub item: fn() -> &'static FieldDescriptor,

    /// cf. [`ListLenFn`]
    pub len: ListLenFn,

    /// cf. [`ListGetFn`]
    pub get: ListGetFn,

    /// cf. [`ListPushCloneFn`]
    pub push_clone: ListPushCloneFn,
}

impl ListDef {
    /// Returns the descriptor of the items
    #[inline]
    pub fn item(&self) -> &'static FieldDescriptor {
        (self.item)()
    }
}

impl core::fmt::Debug for ListDef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListDef")
            .field("item", &format_args!("{}", self.item()))
            .finish_non_exhaustive()
    }
}
