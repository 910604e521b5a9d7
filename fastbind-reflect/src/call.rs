use fastbind_core::{FieldDescriptor, FunctionDef, Param};

use crate::{ReflectError, ReflectedMut, ReflectedValue, ScratchFrame};

/// A host function bound by name to its owner type, with the scratch frame
/// its calls run in.
///
/// Populating the parameters and invoking are separate steps, so callers can
/// pull every input and still decide not to call.
pub struct FunctionCall {
    owner: &'static FieldDescriptor,
    function: &'static FunctionDef,
    frame: Option<ScratchFrame>,
}

impl FunctionCall {
    /// Looks up `name` on `owner`. An object reference type stands for the
    /// type it references.
    pub fn new(owner: &'static FieldDescriptor, name: &str) -> Result<Self, ReflectError> {
        let owner = owner.as_object().map_or(owner, |object| object.target());
        let def = owner.as_struct().ok_or(ReflectError::WasNotA {
            expected: "struct",
            actual: owner,
        })?;
        let function = def.function(name).ok_or_else(|| ReflectError::NoSuchMember {
            owner,
            name: name.into(),
        })?;
        Ok(Self {
            owner,
            function,
            frame: None,
        })
    }

    /// The type the function is called on
    pub fn owner(&self) -> &'static FieldDescriptor {
        self.owner
    }

    /// The function being called
    pub fn function(&self) -> &'static FunctionDef {
        self.function
    }

    /// Fills the parameters through `populate`, allocating the frame on first use
    pub fn populate<F>(&mut self, populate: F) -> bool
    where
        F: FnMut(&'static Param, ReflectedMut<'_>) -> bool,
    {
        let frame = match &mut self.frame {
            Some(frame) => frame,
            slot @ None => match ScratchFrame::new(self.function) {
                Ok(frame) => slot.insert(frame),
                Err(error) => {
                    trace!("cannot call {}(): {}", self.function.name, error);
                    return false;
                }
            },
        };
        frame.populate(populate)
    }

    /// Calls the function on `receiver` with the parameters last populated.
    ///
    /// `receiver` may be the owner itself or a reference to one; a null
    /// reference, a receiver of another type, or a frame that was never
    /// populated yields `None`.
    pub fn invoke(&mut self, receiver: ReflectedMut<'_>) -> Option<ReflectedValue<'_>> {
        let receiver = if receiver.descriptor().as_object().is_some() {
            unsafe { receiver.follow() }?
        } else {
            receiver
        };
        if !receiver.descriptor().is_same(self.owner) {
            trace!(
                "{}() called on {} instead of {}",
                self.function.name,
                receiver.descriptor(),
                self.owner
            );
            return None;
        }
        let frame = self.frame.as_mut()?;
        if !unsafe { frame.invoke(receiver.data()) } {
            return None;
        }
        Some(frame.return_value())
    }

    /// Populates, then invokes
    pub fn call<F>(&mut self, receiver: ReflectedMut<'_>, populate: F) -> Option<ReflectedValue<'_>>
    where
        F: FnMut(&'static Param, ReflectedMut<'_>) -> bool,
    {
        if !self.populate(populate) {
            return None;
        }
        self.invoke(receiver)
    }

    /// The result of the last successful call, if any
    pub fn last_result(&self) -> Option<ReflectedValue<'_>> {
        self.frame.as_ref().map(ScratchFrame::return_value)
    }

    /// Frees the scratch frame
    pub fn release(&mut self) {
        self.frame = None;
    }
}

impl core::fmt::Debug for FunctionCall {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "FunctionCall({}::{}())", self.owner, self.function.name)
    }
}
