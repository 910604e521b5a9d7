use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;

use fastbind_core::{FieldDescriptor, FunctionDef, Kind, Param, Property, PtrConst, PtrMut};

use crate::{MemberKind, MemberReference, ReflectError, ReflectedMut, ScratchFrame};

/// Which members a [`FieldPath`] accepts when it is built
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathFilters {
    /// The path must be writable: read-only properties are rejected, and a
    /// function may only appear to reach another object through a reference
    pub only_writable: bool,

    /// More than one member is allowed
    pub allow_sub_properties: bool,

    /// Function members are allowed
    pub allow_functions: bool,
}

impl PathFilters {
    /// Filters for paths that destinations write through
    pub const fn writable() -> Self {
        Self {
            only_writable: true,
            allow_sub_properties: true,
            allow_functions: true,
        }
    }
}

impl Default for PathFilters {
    fn default() -> Self {
        Self {
            only_writable: false,
            allow_sub_properties: true,
            allow_functions: true,
        }
    }
}

#[derive(Clone, Copy)]
enum Step {
    Property(&'static Property),
    Function(&'static FunctionDef),
}

/// Member names resolved against one owner type
struct ResolvedMembers {
    owner: &'static FieldDescriptor,
    steps: Vec<Step>,
    leaf: &'static FieldDescriptor,
    field_id: String,
}

/// Where a path ended up
#[derive(Debug)]
pub struct ResolvedPath<'a> {
    /// The leaf value
    pub value: ReflectedMut<'a>,

    /// What immediately holds the leaf: the struct the last property was read
    /// from, or the scratch frame of the last function called
    pub container: PtrConst<'a>,
}

/// An ordered chain of property reads and function calls, resolved from a
/// root value to a leaf value.
///
/// Member names are looked up once per owner type and cached. Function
/// calls along the way run in scratch frames owned by the path, one per
/// distinct function, reused on every resolution.
pub struct FieldPath {
    members: Vec<MemberReference>,
    filters: PathFilters,
    resolved: Option<ResolvedMembers>,
    frames: Vec<ScratchFrame>,
}

impl FieldPath {
    /// Creates a path from its members
    pub fn new(members: Vec<MemberReference>) -> Self {
        Self {
            members,
            filters: PathFilters::default(),
            resolved: None,
            frames: Vec::new(),
        }
    }

    /// Parses a dotted path such as `vitals.scaled().max`
    pub fn parse(dotted: &str) -> Result<Self, ReflectError> {
        if dotted.is_empty() {
            return Err(ReflectError::EmptyPath);
        }
        let members = dotted
            .split('.')
            .map(|segment| {
                MemberReference::parse(segment)
                    .ok_or_else(|| ReflectError::InvalidSegment(segment.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(members))
    }

    /// Replaces the filters, dropping any cached resolution
    pub fn with_filters(mut self, filters: PathFilters) -> Self {
        self.filters = filters;
        self.invalidate();
        self
    }

    /// The members of the path
    pub fn members(&self) -> &[MemberReference] {
        &self.members
    }

    /// The filters of the path
    pub fn filters(&self) -> PathFilters {
        self.filters
    }

    /// Replaces the members, dropping any cached resolution
    pub fn set_members(&mut self, members: Vec<MemberReference>) {
        self.members = members;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.resolved = None;
        self.frames.clear();
    }

    /// Whether the path has been built for `owner`
    pub fn is_built_for(&self, owner: &'static FieldDescriptor) -> bool {
        self.resolved
            .as_ref()
            .is_some_and(|resolved| resolved.owner.is_same(owner))
    }

    /// Resolves member names against `owner` and caches the result.
    ///
    /// On error, the previous resolution is gone too.
    pub fn build_path(&mut self, owner: &'static FieldDescriptor) -> Result<(), ReflectError> {
        self.invalidate();

        let Some(last) = self.members.len().checked_sub(1) else {
            return Err(ReflectError::EmptyPath);
        };
        if !self.filters.allow_sub_properties && last > 0 {
            return Err(ReflectError::Filtered {
                name: self.members[1].name.clone(),
                reason: "sub-properties are not allowed",
            });
        }

        let mut steps = Vec::with_capacity(self.members.len());
        let mut current = owner;
        for (index, member) in self.members.iter().enumerate() {
            if let Some(object) = current.as_object() {
                current = object.target();
            }
            let def = current.as_struct().ok_or(ReflectError::WasNotA {
                expected: "struct",
                actual: current,
            })?;
            let no_such_member = move || ReflectError::NoSuchMember {
                owner: current,
                name: member.name.clone(),
            };

            match member.kind {
                MemberKind::Property => {
                    let property = def.property(&member.name).ok_or_else(no_such_member)?;
                    if self.filters.only_writable && index == last && !property.is_writable() {
                        return Err(ReflectError::Filtered {
                            name: member.name.clone(),
                            reason: "property is read-only",
                        });
                    }
                    steps.push(Step::Property(property));
                    current = property.descriptor();
                }
                MemberKind::Function => {
                    if !self.filters.allow_functions {
                        return Err(ReflectError::Filtered {
                            name: member.name.clone(),
                            reason: "functions are not allowed",
                        });
                    }
                    let function = def.function(&member.name).ok_or_else(no_such_member)?;
                    let returns_object = matches!(function.returns().kind, Kind::Object(_));
                    if self.filters.only_writable && (index == last || !returns_object) {
                        return Err(ReflectError::Filtered {
                            name: member.name.clone(),
                            reason: "writes through a function result never reach the host",
                        });
                    }
                    steps.push(Step::Function(function));
                    current = function.returns();
                }
            }
        }

        let field_id = self.to_string();
        trace!("built path {} on {} -> {}", field_id, owner, current);
        self.resolved = Some(ResolvedMembers {
            owner,
            steps,
            leaf: current,
            field_id,
        });
        Ok(())
    }

    /// Descriptor of the leaf value, once built
    pub fn leaf_descriptor(&self) -> Option<&'static FieldDescriptor> {
        self.resolved.as_ref().map(|resolved| resolved.leaf)
    }

    /// Whether the last member is a function call
    pub fn is_leaf_function(&self) -> bool {
        self.members
            .last()
            .is_some_and(|member| member.kind == MemberKind::Function)
    }

    /// A stable identifier of the leaf, for change notifications.
    ///
    /// Computed once per build, from the path itself.
    pub fn leaf_field_id(&self) -> Option<&str> {
        self.resolved
            .as_ref()
            .map(|resolved| resolved.field_id.as_str())
    }

    /// Functions called along the path, in order, once built
    pub fn functions(&self) -> impl Iterator<Item = &'static FunctionDef> + '_ {
        self.resolved
            .iter()
            .flat_map(|resolved| resolved.steps.iter())
            .filter_map(|step| match step {
                Step::Function(function) => Some(*function),
                Step::Property(_) => None,
            })
    }

    /// Number of scratch frames currently allocated
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frees every scratch frame. They are allocated again on the next resolution.
    pub fn release_frames(&mut self) {
        self.frames.clear();
    }

    fn frame_index(&mut self, function: &'static FunctionDef) -> Option<usize> {
        if let Some(index) = self
            .frames
            .iter()
            .position(|frame| core::ptr::eq(frame.function(), function))
        {
            return Some(index);
        }
        match ScratchFrame::new(function) {
            Ok(frame) => {
                self.frames.push(frame);
                Some(self.frames.len() - 1)
            }
            Err(error) => {
                trace!("no frame for {}(): {}", function.name, error);
                None
            }
        }
    }

    /// Walks the path from `root`.
    ///
    /// Function parameters are filled through `populate`. Returns `None`,
    /// having written nothing through the path, if any step fails: an unknown
    /// member, a null reference, a parameter that could not be populated or a
    /// call that refused its arguments.
    pub fn resolve<'a, F>(
        &'a mut self,
        root: ReflectedMut<'a>,
        mut populate: F,
    ) -> Option<ResolvedPath<'a>>
    where
        F: FnMut(&'static Param, ReflectedMut<'_>) -> bool,
    {
        if !self.is_built_for(root.descriptor()) {
            if let Err(error) = self.build_path(root.descriptor()) {
                trace!("path {} does not resolve on {}: {}", self, root.descriptor(), error);
                return None;
            }
        }

        let step_count = self.resolved.as_ref()?.steps.len();
        let mut descriptor = root.descriptor();
        let mut current: PtrMut<'a> = root.data();
        let mut container: PtrConst<'a> = current.as_const();

        for index in 0..step_count {
            let step = self.resolved.as_ref()?.steps[index];
            if let Some(object) = descriptor.as_object() {
                current = unsafe { object.follow(current.as_const()) }?;
                descriptor = object.target();
            }

            match step {
                Step::Property(property) => {
                    container = current.as_const();
                    current = unsafe { current.field(property.offset) };
                    descriptor = property.descriptor();
                }
                Step::Function(function) => {
                    let frame_index = self.frame_index(function)?;
                    let frame = &mut self.frames[frame_index];
                    if !frame.populate(&mut populate) {
                        return None;
                    }
                    if !unsafe { frame.invoke(current) } {
                        trace!("{}() refused its arguments", function.name);
                        return None;
                    }
                    // frames live on the heap and are only freed through
                    // `&mut self`, which the result borrows
                    container = unsafe { frame.base().detach() };
                    current = unsafe { frame.return_mut().data().detach() };
                    descriptor = function.returns();
                }
            }
        }

        Some(ResolvedPath {
            value: unsafe { ReflectedMut::new(descriptor, current) },
            container,
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, member) in self.members.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", member)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldPath")
            .field("path", &format_args!("{}", self))
            .field("filters", &self.filters)
            .field("frames", &self.frames.len())
            .finish()
    }
}
