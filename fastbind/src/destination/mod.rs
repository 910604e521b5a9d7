//! Destination nodes: sinks that apply values to the host

use crate::{
    UpdatePolicy,
    eval::{Pull, Setup, SetupOutcome},
};

mod property;
pub use property::*;

mod function;
pub use function::*;

/// What a destination does with its inputs
#[derive(Debug)]
pub enum DestinationKind {
    /// Writes a value through a field path
    Property(PropertyDestination),
    /// Calls a host function
    Function(FunctionDestination),
}

impl DestinationKind {
    pub(crate) fn setup(&mut self, setup: &Setup) -> SetupOutcome {
        match self {
            DestinationKind::Property(destination) => destination.setup(setup),
            DestinationKind::Function(destination) => destination.setup(setup),
        }
    }

    fn apply(&mut self, pull: &mut Pull<'_, '_>, has_ever_run: bool) -> bool {
        match self {
            DestinationKind::Property(destination) => destination.apply(pull, has_ever_run),
            DestinationKind::Function(destination) => destination.apply(pull),
        }
    }

    fn terminate(&mut self) {
        match self {
            DestinationKind::Property(destination) => destination.terminate(),
            DestinationKind::Function(destination) => destination.terminate(),
        }
    }
}

impl From<PropertyDestination> for DestinationKind {
    fn from(destination: PropertyDestination) -> Self {
        DestinationKind::Property(destination)
    }
}

impl From<FunctionDestination> for DestinationKind {
    fn from(destination: FunctionDestination) -> Self {
        DestinationKind::Function(destination)
    }
}

/// A destination node and its run state
#[derive(Debug)]
pub struct DestinationNode {
    kind: DestinationKind,
    has_ever_run: bool,
    pending_event: bool,
    retry: bool,
}

impl DestinationNode {
    pub(crate) fn new(kind: DestinationKind) -> Self {
        Self {
            kind,
            has_ever_run: false,
            pending_event: true,
            retry: false,
        }
    }

    /// What the destination does
    pub fn kind(&self) -> &DestinationKind {
        &self.kind
    }

    /// What the destination does, for reconfiguring. Set the node up again afterwards.
    pub fn kind_mut(&mut self) -> &mut DestinationKind {
        &mut self.kind
    }

    /// Whether the destination has applied a value since it was initialized
    pub fn has_ever_run(&self) -> bool {
        self.has_ever_run
    }

    /// Whether an event-based destination will run on its next update
    pub fn is_event_pending(&self) -> bool {
        self.pending_event
    }

    pub(crate) fn setup(&mut self, setup: &Setup) -> SetupOutcome {
        self.kind.setup(setup)
    }

    pub(crate) fn initialize(&mut self) {
        self.pending_event = true;
    }

    pub(crate) fn terminate(&mut self) {
        self.kind.terminate();
        self.has_ever_run = false;
        self.retry = false;
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.pending_event = true;
    }

    /// Pulls every input, then applies them if `policy` says so.
    ///
    /// A run that was due but could not apply (an input produced nothing)
    /// stays due until it succeeds.
    pub(crate) fn update(
        &mut self,
        pull: &mut Pull<'_, '_>,
        policy: UpdatePolicy,
        name: &str,
    ) -> bool {
        pull.pull_all();
        let due = match policy {
            UpdatePolicy::Once => !self.has_ever_run,
            UpdatePolicy::EventBased => self.pending_event,
            UpdatePolicy::IfUpdatesNeeded => pull.changed() || !self.has_ever_run,
            UpdatePolicy::Always => true,
        };
        if !(due || self.retry) {
            return false;
        }

        if self.kind.apply(pull, self.has_ever_run) {
            log::trace!("{} ran at tick {}", name, pull.tick());
            self.has_ever_run = true;
            self.pending_event = false;
            self.retry = false;
            true
        } else {
            log::debug!("{} could not run at tick {}", name, pull.tick());
            self.retry = policy != UpdatePolicy::Always;
            false
        }
    }
}
