use alloc::{string::String, vec::Vec};

use fastbind_core::{FunctionDef, Kind};
use fastbind_reflect::{FunctionCall, ReflectedValue};

use crate::{
    BindingError, Expect, UpdatePolicy,
    eval::{Pull, Setup, SetupOutcome},
    item::ItemSpec,
};

/// Name of the item holding the object a function is called on
pub const FUNCTION_OWNER: &str = "Function Owner";

/// Calls a host function and outputs what it returns.
///
/// The receiver is the object referenced by the `Function Owner` item, or
/// the host root when that item is empty. Each parameter comes from the
/// item of the same name.
#[derive(Debug)]
pub struct FunctionValue {
    name: String,
    call: Option<FunctionCall>,
}

impl FunctionValue {
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

    /// Calls another function. Set the node up again afterwards.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.call = None;
    }

    pub(crate) fn setup(&mut self, setup: &Setup) -> SetupOutcome {
        let items = alloc::vec![ItemSpec::owner(FUNCTION_OWNER)];
        let owner = setup.owner(FUNCTION_OWNER);
        let target = owner.as_object().map_or(owner, |object| object.target());
        let function = match &self.call {
            Some(call) if call.owner().is_same(target) => call.function(),
            _ => match FunctionCall::new(owner, &self.name) {
                Ok(call) => self.call.insert(call).function(),
                Err(error) => {
                    self.call = None;
                    return SetupOutcome::failed(items, error);
                }
            },
        };
        if matches!(function.returns().kind, Kind::Unit) {
            return SetupOutcome::failed(
                items,
                BindingError::UnitReturn {
                    function: function.name,
                },
            );
        }
        SetupOutcome::new(param_items(function, items), Some(function.returns()))
    }

    pub(crate) fn compute(
        &mut self,
        pull: &mut Pull<'_, '_>,
        policy: UpdatePolicy,
        has_value: bool,
    ) -> Option<ReflectedValue<'_>> {
        let call = self.call.as_mut()?;
        pull.pull_all();
        if policy == UpdatePolicy::IfUpdatesNeeded && has_value && !pull.changed() {
            log::trace!("{}() inputs unchanged, keeping its last result", self.name);
            return call.last_result();
        }

        let populated = call.populate(|param, slot| pull.assign(param.name, slot));
        if !populated {
            return None;
        }
        let receiver = pull.owner(FUNCTION_OWNER)?;
        call.invoke(receiver)
    }

    pub(crate) fn terminate(&mut self) {
        if let Some(call) = &mut self.call {
            call.release();
        }
    }
}

/// `items` followed by one item per parameter of `function`
pub(crate) fn param_items(
    function: &'static FunctionDef,
    mut items: Vec<ItemSpec>,
) -> Vec<ItemSpec> {
    for param in function.params {
        items.push(ItemSpec::new(param.name, Expect::Assignable(param.descriptor())));
    }
    items
}
