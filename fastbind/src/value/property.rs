use alloc::vec::Vec;

use fastbind_reflect::{FieldPath, ReflectedValue};

use crate::{
    Expect,
    eval::{Pull, Setup, SetupOutcome},
    item::ItemSpec,
};

/// Name of the item holding the object a path starts from
pub const PATH_ROOT: &str = "Path Root";

/// Reads a field path.
///
/// The path starts from the object referenced by the `Path Root` item, or
/// from the host root when that item is empty. Functions along the path
/// take their parameters from items named after them.
#[derive(Debug)]
pub struct PropertyValue {
    path: FieldPath,
}

impl PropertyValue {
    /// Reads `path`
    pub fn new(path: FieldPath) -> Self {
        Self { path }
    }

    /// The path being read
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// The path, for reconfiguring
    pub fn path_mut(&mut self) -> &mut FieldPath {
        &mut self.path
    }

    pub(crate) fn setup(&mut self, setup: &Setup) -> SetupOutcome {
        let mut items = alloc::vec![ItemSpec::owner(PATH_ROOT)];
        if let Err(error) = self.path.build_path(setup.owner(PATH_ROOT)) {
            return SetupOutcome::failed(items, error);
        }
        push_param_items(&self.path, &mut items);
        SetupOutcome::new(items, self.path.leaf_descriptor())
    }

    pub(crate) fn compute(&mut self, pull: &mut Pull<'_, '_>) -> Option<ReflectedValue<'_>> {
        pull.pull_all();
        let owner = pull.owner(PATH_ROOT)?;
        let resolved = self.path.resolve(owner, |param, slot| pull.assign(param.name, slot))?;
        // SAFETY: the caller copies this into the node cache before the next resolve
        Some(unsafe { resolved.value.as_value().detach() })
    }

    pub(crate) fn terminate(&mut self) {
        self.path.release_frames();
    }
}

/// One item per parameter of the functions called along `path`, first name wins
pub(crate) fn push_param_items(path: &FieldPath, items: &mut Vec<ItemSpec>) {
    for function in path.functions() {
        for param in function.params {
            if items.iter().all(|item| item.name != param.name) {
                items.push(ItemSpec::new(param.name, Expect::Assignable(param.descriptor())));
            }
        }
    }
}
