use alloc::{boxed::Box, vec::Vec};
use core::fmt;

use fastbind_core::FieldDescriptor;
use fastbind_reflect::{OwnedValue, ReflectedMut, ReflectedValue};

use crate::BindingError;

/// Assigns values of one type to targets of another.
///
/// Items that feed a destination write or a call parameter accept any
/// type a registered setter can assign from. Values of the exact target
/// type never reach a setter.
pub trait ValueSetter {
    /// Short name, for logs
    fn name(&self) -> &'static str;

    /// Whether values of `source` can be assigned to a `target`
    fn can_set(
        &self,
        setters: &SetterRegistry,
        target: &'static FieldDescriptor,
        source: &'static FieldDescriptor,
    ) -> bool;

    /// Assigns `source` to `target`. Only called after `can_set` said yes.
    fn set(
        &self,
        setters: &SetterRegistry,
        target: ReflectedMut<'_>,
        source: ReflectedValue<'_>,
    ) -> Result<(), BindingError>;
}

/// The setters a graph converts with. Later registrations are tried first.
pub struct SetterRegistry {
    setters: Vec<Box<dyn ValueSetter>>,
}

impl SetterRegistry {
    /// A registry that only assigns between identical types
    pub fn new() -> Self {
        Self {
            setters: Vec::new(),
        }
    }

    /// [`NumberSetter`] and [`ListSetter`]
    pub fn builtin() -> Self {
        let mut setters = Self::new();
        setters.register(NumberSetter);
        setters.register(ListSetter);
        setters
    }

    /// Adds a setter, tried before every earlier one
    pub fn register(&mut self, setter: impl ValueSetter + 'static) {
        log::trace!("registered setter {}", setter.name());
        self.setters.push(Box::new(setter));
    }

    /// Names of the registered setters, in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.setters.iter().map(|setter| setter.name())
    }

    fn find(
        &self,
        target: &'static FieldDescriptor,
        source: &'static FieldDescriptor,
    ) -> Option<&dyn ValueSetter> {
        self.setters
            .iter()
            .rev()
            .map(|setter| &**setter)
            .find(|setter| setter.can_set(self, target, source))
    }

    /// Whether values of `source` can be assigned to a `target`
    pub fn can_assign(
        &self,
        target: &'static FieldDescriptor,
        source: &'static FieldDescriptor,
    ) -> bool {
        target.is_same(source) || self.find(target, source).is_some()
    }

    /// Assigns `source` to `target`, converting it when the types differ
    pub fn assign(
        &self,
        mut target: ReflectedMut<'_>,
        source: ReflectedValue<'_>,
    ) -> Result<(), BindingError> {
        let (expected, actual) = (target.descriptor(), source.descriptor());
        if expected.is_same(actual) {
            return Ok(target.assign_from(source)?);
        }
        let setter = self.find(expected, actual).ok_or(BindingError::NotAssignable {
            target: expected,
            source: actual,
        })?;
        log::trace!("{} converts {} to {}", setter.name(), actual, expected);
        setter.set(self, target, source)
    }

    /// A fresh value of `target` holding `source`
    pub fn convert(
        &self,
        target: &'static FieldDescriptor,
        source: ReflectedValue<'_>,
    ) -> Result<OwnedValue, BindingError> {
        let mut value = OwnedValue::new_default(target)?;
        self.assign(value.as_mut(), source)?;
        Ok(value)
    }
}

impl Default for SetterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for SetterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Widens numbers, when every value of the source fits the target exactly:
/// `u8` into `i16`, `i32` into `i64` or `f64`, `f32` into `f64`
#[derive(Clone, Copy, Debug, Default)]
pub struct NumberSetter;

impl ValueSetter for NumberSetter {
    fn name(&self) -> &'static str {
        "numbers"
    }

    fn can_set(
        &self,
        _setters: &SetterRegistry,
        target: &'static FieldDescriptor,
        source: &'static FieldDescriptor,
    ) -> bool {
        match (target.as_number(), source.as_number()) {
            (Some(target), Some(source)) => target.widens_from(source),
            _ => false,
        }
    }

    fn set(
        &self,
        _setters: &SetterRegistry,
        target: ReflectedMut<'_>,
        source: ReflectedValue<'_>,
    ) -> Result<(), BindingError> {
        let (Some(into), Some(from)) = (
            target.descriptor().as_number(),
            source.descriptor().as_number(),
        ) else {
            return Err(BindingError::NotAssignable {
                target: target.descriptor(),
                source: source.descriptor(),
            });
        };
        unsafe {
            let number = (from.read)(source.data());
            (into.write)(target.data(), number);
        }
        Ok(())
    }
}

/// Copies lists item by item, converting the items through the registry
#[derive(Clone, Copy, Debug, Default)]
pub struct ListSetter;

impl ValueSetter for ListSetter {
    fn name(&self) -> &'static str {
        "lists"
    }

    fn can_set(
        &self,
        setters: &SetterRegistry,
        target: &'static FieldDescriptor,
        source: &'static FieldDescriptor,
    ) -> bool {
        match (target.as_list(), source.as_list()) {
            (Some(target), Some(source)) => setters.can_assign(target.item(), source.item()),
            _ => false,
        }
    }

    fn set(
        &self,
        setters: &SetterRegistry,
        mut target: ReflectedMut<'_>,
        source: ReflectedValue<'_>,
    ) -> Result<(), BindingError> {
        let (Some(into), Some(from)) = (
            target.descriptor().as_list(),
            source.descriptor().as_list(),
        ) else {
            return Err(BindingError::NotAssignable {
                target: target.descriptor(),
                source: source.descriptor(),
            });
        };
        // filled aside so a failed item leaves the target untouched
        let mut staged = OwnedValue::new_default(target.descriptor())?;
        let mut item = OwnedValue::new_default(into.item())?;
        let len = unsafe { (from.len)(source.data()) };
        for index in 0..len {
            let Some(element) = (unsafe { (from.get)(source.data(), index) }) else {
                break;
            };
            let element = unsafe { ReflectedValue::new(from.item(), element) };
            setters.assign(item.as_mut(), element)?;
            unsafe { (into.push_clone)(staged.as_mut().data(), item.as_value().data()) };
        }
        target.assign_from(staged.as_value())?;
        Ok(())
    }
}
