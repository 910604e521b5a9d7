use alloc::string::String;
use core::fmt;

/// Whether a path step reads a property or calls a function
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Read a stored property
    Property,
    /// Call a function and continue from its return value
    Function,
}

/// One step of a [`FieldPath`](crate::FieldPath), by name.
///
/// Names are resolved against the owner's member table when the path is
/// built, so a reference can outlive the member it names (it then simply
/// stops resolving).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberReference {
    /// Name of the member
    pub name: String,
    /// What sort of member it is
    pub kind: MemberKind,
}

impl MemberReference {
    /// A property read
    pub fn property(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Property,
        }
    }

    /// A function call
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Function,
        }
    }

    /// Parses one dotted-path segment: `name` or `name()`
    pub fn parse(segment: &str) -> Option<Self> {
        let (name, kind) = match segment.strip_suffix("()") {
            Some(name) => (name, MemberKind::Function),
            None => (segment, MemberKind::Property),
        };
        let valid = !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_');
        valid.then(|| Self {
            name: name.into(),
            kind,
        })
    }
}

impl fmt::Display for MemberReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MemberKind::Property => write!(f, "{}", self.name),
            MemberKind::Function => write!(f, "{}()", self.name),
        }
    }
}
