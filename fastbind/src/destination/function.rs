use alloc::string::String;

use fastbind_core::FunctionDef;
use fastbind_reflect::FunctionCall;

use crate::{
    eval::{Pull, Setup, SetupOutcome},
    item::ItemSpec,
    value::{FUNCTION_OWNER, param_items},
};

/// Calls a host function with its items as parameters.
///
/// The receiver is the object referenced by `Function Owner`, or the host
/// root when that item is empty. Whatever the function returns is dropped.
#[derive(Debug)]
pub struct FunctionDestination {
    name: String,
    call: Option<FunctionCall>,
}

impl FunctionDestination {
    /// Calls the function `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            call: None,
        }
    }

    /// Name of the function
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The function, once set up
    pub fn function(&self) -> Option<&'static FunctionDef> {
        self.call.as_ref().map(FunctionCall::function)
    }

    pub(crate) fn setup(&mut self, setup: &Setup) -> SetupOutcome {
        let items = alloc::vec![ItemSpec::owner(FUNCTION_OWNER)];
        match FunctionCall::new(setup.owner(FUNCTION_OWNER), &self.name) {
            Ok(call) => {
                let function = call.function();
                self.call = Some(call);
                SetupOutcome::new(param_items(function, items), None)
            }
            Err(error) => {
                self.call = None;
                SetupOutcome::failed(items, error)
            }
        }
    }

    pub(crate) fn apply(&mut self, pull: &mut Pull<'_, '_>) -> bool {
        let Some(call) = &mut self.call else {
            return false;
        };
        let populated = call.populate(|param, slot| pull.assign(param.name, slot));
        if !populated {
            return false;
        }
        let Some(receiver) = pull.owner(FUNCTION_OWNER) else {
            return false;
        };
        call.invoke(receiver).is_some()
    }

    pub(crate) fn terminate(&mut self) {
        if let Some(call) = &mut self.call {
            call.release();
        }
    }
}
