use core::fmt;

/// When a node recomputes (value nodes) or runs (destinations)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdatePolicy {
    /// Run until the first success, then never again
    Once,

    /// Run only after being marked dirty, for instance when the host
    /// reports that an input changed. Starts out marked.
    EventBased,

    /// Destinations run when an input changed or they never ran.
    /// Value nodes recompute once per tick; a function value only calls its
    /// function again when one of its inputs changed.
    #[default]
    IfUpdatesNeeded,

    /// Run every tick
    Always,
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpdatePolicy::Once => "Once",
            UpdatePolicy::EventBased => "Event based",
            UpdatePolicy::IfUpdatesNeeded => "If updates needed",
            UpdatePolicy::Always => "Always",
        };
        f.write_str(name)
    }
}

/// Validity of a value node's cached output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheState {
    /// Never computed since the last initialization
    #[default]
    Uninitialized,

    /// Must be computed on the next query
    Dirty,

    /// Computed during `tick`
    Clean {
        /// The tick of the last successful compute
        tick: u64,
    },
}

impl CacheState {
    /// Whether the cache can be returned as-is during `tick` under `policy`
    pub fn is_clean(self, policy: UpdatePolicy, tick: u64) -> bool {
        match (self, policy) {
            (
                CacheState::Clean { tick: at },
                UpdatePolicy::Always | UpdatePolicy::IfUpdatesNeeded,
            ) => {
                at == tick
            }
            (CacheState::Clean { .. }, UpdatePolicy::Once | UpdatePolicy::EventBased) => true,
            (CacheState::Uninitialized | CacheState::Dirty, _) => false,
        }
    }
}

/// Counters kept by every value node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunDiagnostics {
    /// Tick of the last compute, successful or not
    pub last_run_tick: Option<u64>,

    /// Number of computes since the node was created
    pub run_count: u64,
}

impl RunDiagnostics {
    pub(crate) fn record(&mut self, tick: u64) {
        self.last_run_tick = Some(tick);
        self.run_count += 1;
    }
}
