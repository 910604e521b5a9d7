use alloc::vec::Vec;

use fastbind_core::{FrameLayout, FunctionDef, Param, PtrConst, PtrMut, PtrUninit};

use crate::{ReflectError, ReflectedMut, ReflectedValue};

/// Heap storage for one call of a host function: every parameter followed
/// by the return slot, all kept initialized between calls.
///
/// Calling the same function again overwrites the frame in place.
pub struct ScratchFrame {
    function: &'static FunctionDef,
    layout: FrameLayout,
    base: PtrUninit<'static>,
}

impl ScratchFrame {
    /// Allocates a frame for `function` and default-constructs every slot.
    ///
    /// Fails if a parameter or the return type cannot be default-constructed.
    pub fn new(function: &'static FunctionDef) -> Result<Self, ReflectError> {
        let layout = function.frame_layout()?;

        let slots = function
            .params
            .iter()
            .map(Param::descriptor)
            .chain(core::iter::once(function.returns()));
        for descriptor in slots.clone() {
            if descriptor.vtable.default_in_place.is_none() {
                return Err(ReflectError::MissingOperation {
                    descriptor,
                    operation: "default_in_place",
                });
            }
        }

        let base = PtrUninit::new(if layout.layout.size() == 0 {
            core::ptr::without_provenance_mut::<u8>(layout.layout.align())
        } else {
            // SAFETY: the frame's size is non-zero
            let ptr = unsafe { alloc::alloc::alloc(layout.layout) };
            if ptr.is_null() {
                alloc::alloc::handle_alloc_error(layout.layout);
            }
            ptr
        });

        let offsets = layout
            .param_offsets
            .iter()
            .copied()
            .chain(core::iter::once(layout.return_offset));
        for (descriptor, offset) in slots.zip(offsets) {
            if let Some(default_in_place) = descriptor.vtable.default_in_place {
                unsafe { default_in_place(base.field_uninit_at(offset)) };
            }
        }

        trace!(
            "allocated {} byte frame for {}()",
            layout.layout.size(),
            function.name
        );
        Ok(Self {
            function,
            layout,
            base,
        })
    }

    /// The function this frame is for
    #[inline]
    pub fn function(&self) -> &'static FunctionDef {
        self.function
    }

    /// Start of the frame
    #[inline]
    pub fn base(&self) -> PtrConst<'_> {
        unsafe { self.base.assume_init().as_const() }
    }

    /// The slot of the `index`th parameter
    pub fn param_mut(&mut self, index: usize) -> Option<ReflectedMut<'_>> {
        let param = self.function.params.get(index)?;
        let offset = *self.layout.param_offsets.get(index)?;
        let data = unsafe { self.base.field_uninit_at(offset).assume_init() };
        Some(unsafe { ReflectedMut::new(param.descriptor(), data) })
    }

    /// The return slot
    pub fn return_value(&self) -> ReflectedValue<'_> {
        unsafe {
            let data = self
                .base
                .field_uninit_at(self.layout.return_offset)
                .assume_init();
            ReflectedValue::new(self.function.returns(), data.as_const())
        }
    }

    /// The return slot, writable
    pub fn return_mut(&mut self) -> ReflectedMut<'_> {
        unsafe {
            let data = self
                .base
                .field_uninit_at(self.layout.return_offset)
                .assume_init();
            ReflectedMut::new(self.function.returns(), data)
        }
    }

    /// Fills every parameter through `populate`, in order.
    ///
    /// Stops at the first parameter `populate` cannot fill and returns false.
    pub fn populate<F>(&mut self, mut populate: F) -> bool
    where
        F: FnMut(&'static Param, ReflectedMut<'_>) -> bool,
    {
        let function = self.function;
        for (index, param) in function.params.iter().enumerate() {
            let Some(slot) = self.param_mut(index) else {
                return false;
            };
            if !populate(param, slot) {
                trace!("could not populate {}({})", function.name, param.name);
                return false;
            }
        }
        true
    }

    /// Calls the function on `receiver` with the current parameters, writing
    /// the return slot.
    ///
    /// # Safety
    ///
    /// `receiver` must point to an initialized value of the function's owner
    /// type, exclusively borrowed for the duration of the call.
    pub unsafe fn invoke(&mut self, receiver: PtrMut<'_>) -> bool {
        let args: Vec<PtrConst<'_>> = self
            .layout
            .param_offsets
            .iter()
            .map(|&offset| unsafe { self.base.field_uninit_at(offset).assume_init().as_const() })
            .collect();
        let ret = unsafe {
            self.base
                .field_uninit_at(self.layout.return_offset)
                .assume_init()
        };
        unsafe { (self.function.invoke)(receiver, &args, ret) }
    }
}

impl Drop for ScratchFrame {
    fn drop(&mut self) {
        let slots = self
            .function
            .params
            .iter()
            .map(Param::descriptor)
            .chain(core::iter::once(self.function.returns()));
        let offsets = self
            .layout
            .param_offsets
            .iter()
            .copied()
            .chain(core::iter::once(self.layout.return_offset));
        for (descriptor, offset) in slots.zip(offsets) {
            let slot = unsafe { self.base.field_uninit_at(offset).assume_init() };
            unsafe { (descriptor.vtable.drop_in_place)(slot) };
        }
        if self.layout.layout.size() != 0 {
            unsafe { alloc::alloc::dealloc(self.base.as_mut_byte_ptr(), self.layout.layout) };
        }
    }
}

impl core::fmt::Debug for ScratchFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScratchFrame")
            .field("function", &self.function.name)
            .field("size", &self.layout.layout.size())
            .finish()
    }
}
