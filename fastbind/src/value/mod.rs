//! Value nodes: pure computations with a cached output

use fastbind_core::FieldDescriptor;
use fastbind_reflect::{OwnedValue, ReflectedValue};

use crate::{
    CacheState, RunDiagnostics, UpdatePolicy,
    eval::{Pull, Pulled, Setup, SetupOutcome},
};

mod property;
pub use property::*;

mod function;
pub use function::*;

mod format_text;
pub use format_text::*;

mod select;
pub use select::*;

/// The computation a value node performs
#[derive(Debug)]
pub enum ValueKind {
    /// Reads a field path from the host or from an object reference
    Property(PropertyValue),
    /// Calls a host function
    Function(FunctionValue),
    /// Formats text from named arguments
    FormatText(FormatTextValue),
    /// Picks one of several inputs according to a selector
    Select(SelectValue),
}

impl ValueKind {
    pub(crate) fn setup(&mut self, setup: &Setup) -> SetupOutcome {
        match self {
            ValueKind::Property(value) => value.setup(setup),
            ValueKind::Function(value) => value.setup(setup),
            ValueKind::FormatText(value) => value.setup(),
            ValueKind::Select(value) => value.setup(setup),
        }
    }

    fn compute(
        &mut self,
        pull: &mut Pull<'_, '_>,
        policy: UpdatePolicy,
        has_value: bool,
    ) -> Option<ReflectedValue<'_>> {
        match self {
            ValueKind::Property(value) => value.compute(pull),
            ValueKind::Function(value) => value.compute(pull, policy, has_value),
            ValueKind::FormatText(value) => value.compute(pull),
            ValueKind::Select(value) => value.compute(pull),
        }
    }

    fn terminate(&mut self) {
        match self {
            ValueKind::Property(value) => value.terminate(),
            ValueKind::Function(value) => value.terminate(),
            ValueKind::FormatText(_) | ValueKind::Select(_) => {}
        }
    }
}

impl From<PropertyValue> for ValueKind {
    fn from(value: PropertyValue) -> Self {
        ValueKind::Property(value)
    }
}

impl From<FunctionValue> for ValueKind {
    fn from(value: FunctionValue) -> Self {
        ValueKind::Function(value)
    }
}

impl From<FormatTextValue> for ValueKind {
    fn from(value: FormatTextValue) -> Self {
        ValueKind::FormatText(value)
    }
}

impl From<SelectValue> for ValueKind {
    fn from(value: SelectValue) -> Self {
        ValueKind::Select(value)
    }
}

/// A value node: its computation, its cached output and run counters.
///
/// The cache is allocated on the first successful compute and holds the
/// last value produced from then on. A compute that produces nothing
/// leaves the cache alone.
#[derive(Debug)]
pub struct ValueNode {
    kind: ValueKind,
    state: CacheState,
    cache: Option<OwnedValue>,
    output: Option<&'static FieldDescriptor>,
    diagnostics: RunDiagnostics,
}

impl ValueNode {
    pub(crate) fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            state: CacheState::Uninitialized,
            cache: None,
            output: None,
            diagnostics: RunDiagnostics::default(),
        }
    }

    /// The computation
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// The computation, for reconfiguring. Set the node up again afterwards.
    pub fn kind_mut(&mut self) -> &mut ValueKind {
        &mut self.kind
    }

    /// Validity of the cache
    pub fn state(&self) -> CacheState {
        self.state
    }

    /// The last value produced
    pub fn cached(&self) -> Option<ReflectedValue<'_>> {
        self.cache.as_ref().map(OwnedValue::as_value)
    }

    /// Type of the output, as worked out on setup
    pub fn output_descriptor(&self) -> Option<&'static FieldDescriptor> {
        self.output
    }

    /// Run counters
    pub fn diagnostics(&self) -> RunDiagnostics {
        self.diagnostics
    }

    pub(crate) fn setup(&mut self, setup: &Setup) -> SetupOutcome {
        let outcome = self.kind.setup(setup);
        self.output = outcome.output;
        outcome
    }

    pub(crate) fn initialize(&mut self) {
        if self.state == CacheState::Uninitialized {
            self.state = CacheState::Dirty;
        }
    }

    pub(crate) fn terminate(&mut self) {
        self.kind.terminate();
        self.cache = None;
        self.state = CacheState::Uninitialized;
    }

    pub(crate) fn mark_dirty(&mut self) {
        if self.state != CacheState::Uninitialized {
            self.state = CacheState::Dirty;
        }
    }

    /// Returns the cache while it is clean, otherwise computes.
    ///
    /// `changed` is set only when the computed value is not identical to
    /// the cached one.
    pub(crate) fn get_value(
        &mut self,
        pull: &mut Pull<'_, '_>,
        policy: UpdatePolicy,
        name: &str,
    ) -> Option<Pulled> {
        let tick = pull.tick();
        if self.state.is_clean(policy, tick) {
            if let Some(cache) = &self.cache {
                return Some(Pulled {
                    value: unsafe { cache.as_value().detach() },
                    changed: false,
                });
            }
        }

        self.diagnostics.record(tick);
        log::trace!("computing {} at tick {}", name, tick);

        let ValueNode {
            kind, state, cache, ..
        } = self;
        let Some(computed) = kind.compute(pull, policy, cache.is_some()) else {
            log::debug!("{} produced nothing at tick {}", name, tick);
            if *state != CacheState::Uninitialized {
                *state = CacheState::Dirty;
            }
            return None;
        };

        let changed = match cache {
            Some(cached) if cached.descriptor().is_same(computed.descriptor()) => {
                if cached.identical(&computed) {
                    false
                } else if let Err(error) = cached.assign_from(computed) {
                    log::debug!("{} cannot store its value: {}", name, error);
                    return None;
                } else {
                    true
                }
            }
            _ => match OwnedValue::from_clone(computed) {
                Ok(value) => {
                    *cache = Some(value);
                    true
                }
                Err(error) => {
                    log::debug!("{} cannot store its value: {}", name, error);
                    return None;
                }
            },
        };
        *state = CacheState::Clean { tick };

        let cached = cache.as_ref()?;
        // SAFETY: the cache is only freed by terminate or by dropping the node
        let value = unsafe { cached.as_value().detach() };
        Some(Pulled { value, changed })
    }
}
