use fastbind_reflect::{FieldPath, PathFilters, ReflectedValue};

use crate::{
    Expect,
    eval::{Pull, Setup, SetupOutcome},
    item::ItemSpec,
    value::{PATH_ROOT, push_param_items},
};

/// Name of the item holding the value to write
pub const VALUE_SOURCE: &str = "Value Source";

/// Writes the `Value Source` item through a field path.
///
/// The path starts from the object referenced by `Path Root`, or from the
/// host root when that item is empty. It must end in a writable property.
/// The change sink hears about a write only when the written value differs
/// from what was there, or on the first write.
#[derive(Debug)]
pub struct PropertyDestination {
    path: FieldPath,
}

impl PropertyDestination {
    /// Writes through `path`
    pub fn new(path: FieldPath) -> Self {
        Self {
            path: path.with_filters(PathFilters::writable()),
        }
    }

    /// The path being written
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub(crate) fn setup(&mut self, setup: &Setup) -> SetupOutcome {
        let mut items = alloc::vec![ItemSpec::owner(PATH_ROOT)];
        if let Err(error) = self.path.build_path(setup.owner(PATH_ROOT)) {
            items.push(ItemSpec::new(VALUE_SOURCE, Expect::Any));
            return SetupOutcome::failed(items, error);
        }
        let leaf = self.path.leaf_descriptor();
        items.push(ItemSpec::new(
            VALUE_SOURCE,
            leaf.map_or(Expect::Any, Expect::Assignable),
        ));
        push_param_items(&self.path, &mut items);
        SetupOutcome::new(items, None)
    }

    pub(crate) fn apply(&mut self, pull: &mut Pull<'_, '_>, has_ever_run: bool) -> bool {
        let Some(source) = pull.value(VALUE_SOURCE) else {
            return false;
        };
        let Some(owner) = pull.owner(PATH_ROOT) else {
            return false;
        };
        let root_descriptor = owner.descriptor();
        // SAFETY: the root stays borrowed for the whole update
        let root = unsafe { owner.data().detach() };

        let resolved = self.path.resolve(owner, |param, slot| pull.assign(param.name, slot));
        let Some(mut resolved) = resolved else {
            return false;
        };
        let converted;
        let source = if resolved.value.descriptor().is_same(source.descriptor()) {
            source
        } else {
            match pull.setters().convert(resolved.value.descriptor(), source) {
                Ok(value) => {
                    converted = value;
                    converted.as_value()
                }
                Err(error) => {
                    log::debug!("cannot write {}: {}", self.path, error);
                    return false;
                }
            }
        };
        // compared before the write
        let differs = !has_ever_run || !resolved.value.as_value().identical(&source);
        if let Err(error) = resolved.value.assign_from(source) {
            log::debug!("cannot write {}: {}", self.path, error);
            return false;
        }

        if differs {
            if let Some(field_id) = self.path.leaf_field_id() {
                let root: ReflectedValue<'_> =
                    unsafe { ReflectedValue::new(root_descriptor, root.as_const()) };
                pull.notify(root, field_id);
            }
        }
        true
    }

    pub(crate) fn terminate(&mut self) {
        self.path.release_frames();
    }
}
