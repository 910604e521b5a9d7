use core::{fmt, str::FromStr};

use crate::ptr::{PtrConst, PtrMut, PtrUninit};

//======== Memory Management ========

/// Function to drop a value in place
///
/// # Safety
///
/// The `value` parameter must point to aligned, initialized memory of the correct type.
/// After calling this function, the memory pointed to by `value` must not be read
/// until it is reinitialized.
pub type DropInPlaceFn = for<'mem> unsafe fn(value: PtrMut<'mem>) -> PtrUninit<'mem>;

/// Function to default-construct a value in place
///
/// # Safety
///
/// The `target` parameter has the correct layout and alignment, but points to
/// uninitialized memory.
pub type DefaultInPlaceFn = for<'mem> unsafe fn(target: PtrUninit<'mem>) -> PtrMut<'mem>;

/// Function to copy-construct a value into uninitialized memory
///
/// # Safety
///
/// `source` must point to an initialized value of the correct type, and `target`
/// to uninitialized memory with the correct layout.
pub type CloneIntoFn =
    for<'src, 'dst> unsafe fn(source: PtrConst<'src>, target: PtrUninit<'dst>) -> PtrMut<'dst>;

//======== Comparison ========

/// Function to check whether two values are identical
///
/// # Safety
///
/// Both pointers must point to initialized values of the correct type.
pub type PartialEqFn = for<'l, 'r> unsafe fn(left: PtrConst<'l>, right: PtrConst<'r>) -> bool;

//======== Text codec ========

/// Function to import a value from text, assigning over an already-initialized value.
///
/// If both [`DisplayFn`] and [`ParseFn`] are set, the value must round-trip.
///
/// # Safety
///
/// `target` must point to an initialized value of the correct type. On error the
/// target is left untouched.
pub type ParseFn = for<'mem> unsafe fn(s: &str, target: PtrMut<'mem>) -> Result<(), ParseError>;

/// Function to export a value to text
///
/// # Safety
///
/// `value` must point to an initialized value of the correct type.
pub type DisplayFn =
    for<'mem> unsafe fn(value: PtrConst<'mem>, f: &mut fmt::Formatter) -> fmt::Result;

/// Function to format a value for debugging
///
/// # Safety
///
/// `value` must point to an initialized value of the correct type.
pub type DebugFn =
    for<'mem> unsafe fn(value: PtrConst<'mem>, f: &mut fmt::Formatter) -> fmt::Result;

/// Error returned by [`ParseFn`]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Generic error message
    Generic(&'static str),

    /// The text did not name any variant of the enumeration
    UnknownVariant,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Generic(msg) => write!(f, "Parse failed: {}", msg),
            ParseError::UnknownVariant => write!(f, "Parse failed: unknown variant"),
        }
    }
}

impl core::error::Error for ParseError {}

/// VTable for the operations every reflected value may support.
///
/// `drop_in_place` is always present (it is a no-op for types without drop
/// glue). The rest are optional: a node that needs a missing operation
/// resolves to no value instead of failing.
#[derive(Clone, Copy)]
#[non_exhaustive]
pub struct ValueVTable {
    /// cf. [`DropInPlaceFn`]
    pub drop_in_place: DropInPlaceFn,

    /// cf. [`DefaultInPlaceFn`]
    pub default_in_place: Option<DefaultInPlaceFn>,

    /// cf. [`CloneIntoFn`]
    pub clone_into: Option<CloneIntoFn>,

    /// cf. [`PartialEqFn`]
    pub eq: Option<PartialEqFn>,

    /// cf. [`ParseFn`]
    pub parse: Option<ParseFn>,

    /// cf. [`DisplayFn`]
    pub display: Option<DisplayFn>,

    /// cf. [`DebugFn`]
    pub debug: Option<DebugFn>,
}

impl ValueVTable {
    /// Creates a new [`ValueVTableBuilder`] for `T`, with only `drop_in_place` filled in
    pub const fn builder<T>() -> ValueVTableBuilder {
        ValueVTableBuilder::new::<T>()
    }
}

impl fmt::Debug for ValueVTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueVTable")
            .field("default_in_place", &self.default_in_place.is_some())
            .field("clone_into", &self.clone_into.is_some())
            .field("eq", &self.eq.is_some())
            .field("parse", &self.parse.is_some())
            .field("display", &self.display.is_some())
            .finish_non_exhaustive()
    }
}

/// Builds a [`ValueVTable`] in const context
pub struct ValueVTableBuilder {
    drop_in_place: DropInPlaceFn,
    default_in_place: Option<DefaultInPlaceFn>,
    clone_into: Option<CloneIntoFn>,
    eq: Option<PartialEqFn>,
    parse: Option<ParseFn>,
    display: Option<DisplayFn>,
    debug: Option<DebugFn>,
}

impl ValueVTableBuilder {
    /// Creates a builder whose `drop_in_place` drops a `T`
    pub const fn new<T>() -> Self {
        Self {
            drop_in_place: drop_in_place_of::<T>,
            default_in_place: None,
            clone_into: None,
            eq: None,
            parse: None,
            display: None,
            debug: None,
        }
    }

    /// Fills in `default_in_place` from `T: Default`
    pub const fn with_default<T: Default>(mut self) -> Self {
        self.default_in_place = Some(default_in_place_of::<T>);
        self
    }

    /// Fills in `clone_into` from `T: Clone`
    pub const fn with_clone<T: Clone>(mut self) -> Self {
        self.clone_into = Some(clone_into_of::<T>);
        self
    }

    /// Fills in `eq` from `T: PartialEq`
    pub const fn with_eq<T: PartialEq>(mut self) -> Self {
        self.eq = Some(eq_of::<T>);
        self
    }

    /// Fills in `parse` and `display` from `T: FromStr + Display`
    pub const fn with_text<T: FromStr + fmt::Display>(mut self) -> Self {
        self.parse = Some(parse_of::<T>);
        self.display = Some(display_of::<T>);
        self
    }

    /// Fills in `debug` from `T: Debug`
    pub const fn with_debug<T: fmt::Debug>(mut self) -> Self {
        self.debug = Some(debug_of::<T>);
        self
    }

    /// Fills in everything a plain value type needs
    pub const fn with_value<T>(self) -> Self
    where
        T: Default + Clone + PartialEq + FromStr + fmt::Display + fmt::Debug,
    {
        self.with_default::<T>()
            .with_clone::<T>()
            .with_eq::<T>()
            .with_text::<T>()
            .with_debug::<T>()
    }

    /// Sets a hand-written `debug`
    pub const fn debug(mut self, debug: DebugFn) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Sets a hand-written `parse`
    pub const fn parse(mut self, parse: ParseFn) -> Self {
        self.parse = Some(parse);
        self
    }

    /// Sets a hand-written `display`
    pub const fn display(mut self, display: DisplayFn) -> Self {
        self.display = Some(display);
        self
    }

    /// Builds the vtable
    pub const fn build(self) -> ValueVTable {
        ValueVTable {
            drop_in_place: self.drop_in_place,
            default_in_place: self.default_in_place,
            clone_into: self.clone_into,
            eq: self.eq,
            parse: self.parse,
            display: self.display,
            debug: self.debug,
        }
    }
}

unsafe fn drop_in_place_of<T>(value: PtrMut<'_>) -> PtrUninit<'_> {
    unsafe { value.drop_in_place::<T>() }
}

unsafe fn default_in_place_of<T: Default>(target: PtrUninit<'_>) -> PtrMut<'_> {
    unsafe { target.put(T::default()) }
}

unsafe fn clone_into_of<'dst, T: Clone>(
    source: PtrConst<'_>,
    target: PtrUninit<'dst>,
) -> PtrMut<'dst> {
    let value = unsafe { source.get::<T>() }.clone();
    unsafe { target.put(value) }
}

unsafe fn eq_of<T: PartialEq>(left: PtrConst<'_>, right: PtrConst<'_>) -> bool {
    unsafe { left.get::<T>() == right.get::<T>() }
}

unsafe fn parse_of<T: FromStr>(s: &str, target: PtrMut<'_>) -> Result<(), ParseError> {
    let value = s
        .parse::<T>()
        .map_err(|_| ParseError::Generic("value does not parse as this type"))?;
    unsafe { *target.as_mut::<T>() = value };
    Ok(())
}

unsafe fn display_of<T: fmt::Display>(value: PtrConst<'_>, f: &mut fmt::Formatter) -> fmt::Result {
    fmt::Display::fmt(unsafe { value.get::<T>() }, f)
}

unsafe fn debug_of<T: fmt::Debug>(value: PtrConst<'_>, f: &mut fmt::Formatter) -> fmt::Result {
    fmt::Debug::fmt(unsafe { value.get::<T>() }, f)
}
