/// Implements [`Reflect`](crate::Reflect) for a struct, exposing the listed
/// properties and functions to bindings.
///
/// The bracketed list names the std traits the struct implements and that
/// the vtable should use: any of `Default`, `Clone`, `PartialEq`, `Debug`,
/// `Text` (`FromStr + Display`). Property and parameter types must
/// implement `Reflect` themselves; parameters must also be `Clone`.
///
/// # Example
///
/// ```
/// use fastbind_core::{reflect_struct, Reflect};
///
/// #[derive(Default, Clone, PartialEq, Debug)]
/// struct Gauge {
///     value: f32,
///     max: f32,
/// }
///
/// impl Gauge {
///     fn ratio(&self) -> f32 {
///         self.value / self.max
///     }
///
///     fn fill(&mut self, amount: f32) {
///         self.value = (self.value + amount).min(self.max);
///     }
/// }
///
/// reflect_struct! {
///     Gauge: [Default, Clone, PartialEq, Debug] {
///         properties {
///             value: f32,
///             #[read_only] max: f32,
///         }
///         functions {
///             fn ratio(&self) -> f32;
///         }
///         mutators {
///             fn fill(&mut self, amount: f32);
///         }
///     }
/// }
///
/// let def = Gauge::DESCRIPTOR.as_struct().unwrap();
/// assert_eq!(def.properties.len(), 2);
/// assert!(!def.property("max").unwrap().is_writable());
/// assert!(def.function("ratio").unwrap().is_getter());
/// ```
#[macro_export]
macro_rules! reflect_struct {
    (
        $t:ident : [$($cap:ident),* $(,)?] {
            $(properties {
                $($(#[$pflag:ident])* $pname:ident : $pty:ty),* $(,)?
            })?
            $(functions {
                $(fn $fname:ident (&self $(, $fp:ident : $fpty:ty)*) $(-> $fret:ty)? ;)*
            })?
            $(mutators {
                $(fn $mname:ident (&mut self $(, $mp:ident : $mpty:ty)*) $(-> $mret:ty)? ;)*
            })?
        }
    ) => {
        unsafe impl $crate::Reflect for $t {
            const DESCRIPTOR: &'static $crate::FieldDescriptor = &const {
                $crate::FieldDescriptor::builder_for::<$t>()
                    .type_identifier(stringify!($t))
                    .vtable(&const {
                        $crate::__reflect_vtable!(
                            @acc $crate::ValueVTable::builder::<$t>(); $t; $($cap),*
                        )
                    })
                    .kind($crate::Kind::Struct(&const {
                        $crate::StructDef {
                            properties: {
                                const PROPERTIES: &[$crate::Property] = &[$($(
                                    $crate::Property {
                                        name: stringify!($pname),
                                        descriptor: $crate::descriptor_of::<$pty>,
                                        offset: ::core::mem::offset_of!($t, $pname),
                                        flags: $crate::PropertyFlags::empty()
                                            $(.union($crate::__reflect_property_flag!($pflag)))*,
                                    },
                                )*)?];
                                PROPERTIES
                            },
                            functions: {
                                const FUNCTIONS: &[$crate::FunctionDef] = &[
                                    $($(
                                        $crate::__reflect_function!(
                                            $t, get, Shared,
                                            $fname ($($fp : $fpty),*) -> ($($fret)?)
                                        ),
                                    )*)?
                                    $($(
                                        $crate::__reflect_function!(
                                            $t, as_mut, Exclusive,
                                            $mname ($($mp : $mpty),*) -> ($($mret)?)
                                        ),
                                    )*)?
                                ];
                                FUNCTIONS
                            },
                        }
                    }))
                    .build()
            };
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_function {
    (
        $t:ident, $borrow:ident, $receiver:ident,
        $name:ident ($($p:ident : $pty:ty),*) -> ($($ret:ty)?)
    ) => {
        $crate::FunctionDef {
            name: stringify!($name),
            params: {
                const PARAMS: &[$crate::Param] = &[$(
                    $crate::Param {
                        name: stringify!($p),
                        descriptor: $crate::descriptor_of::<$pty>,
                    },
                )*];
                PARAMS
            },
            returns: $crate::descriptor_of::<$crate::__reflect_ret!($($ret)?)>,
            receiver: $crate::Receiver::$receiver,
            invoke: {
                unsafe fn invoke(
                    receiver: $crate::PtrMut<'_>,
                    args: &[$crate::PtrConst<'_>],
                    ret: $crate::PtrMut<'_>,
                ) -> bool {
                    let [$($p),*] = args else {
                        return false;
                    };
                    let this = unsafe { receiver.$borrow::<$t>() };
                    let value: $crate::__reflect_ret!($($ret)?) =
                        this.$name($(::core::clone::Clone::clone(unsafe { $p.get::<$pty>() })),*);
                    unsafe { *ret.as_mut::<$crate::__reflect_ret!($($ret)?)>() = value };
                    true
                }
                invoke
            },
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_ret {
    () => { () };
    ($ret:ty) => { $ret };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_property_flag {
    (read_only) => {
        $crate::PropertyFlags::READ_ONLY
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_variant_flag {
    (hidden) => {
        $crate::VariantFlags::HIDDEN
    };
    (spacer) => {
        $crate::VariantFlags::SPACER
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_vtable {
    (@acc $b:expr; $t:ty;) => {
        $b.build()
    };
    (@acc $b:expr; $t:ty; Default $(, $rest:ident)*) => {
        $crate::__reflect_vtable!(@acc $b.with_default::<$t>(); $t; $($rest),*)
    };
    (@acc $b:expr; $t:ty; Clone $(, $rest:ident)*) => {
        $crate::__reflect_vtable!(@acc $b.with_clone::<$t>(); $t; $($rest),*)
    };
    (@acc $b:expr; $t:ty; PartialEq $(, $rest:ident)*) => {
        $crate::__reflect_vtable!(@acc $b.with_eq::<$t>(); $t; $($rest),*)
    };
    (@acc $b:expr; $t:ty; Debug $(, $rest:ident)*) => {
        $crate::__reflect_vtable!(@acc $b.with_debug::<$t>(); $t; $($rest),*)
    };
    (@acc $b:expr; $t:ty; Text $(, $rest:ident)*) => {
        $crate::__reflect_vtable!(@acc $b.with_text::<$t>(); $t; $($rest),*)
    };
}

/// Implements [`Reflect`](crate::Reflect) for a fieldless enum.
///
/// The enum must be `Copy + Default + PartialEq + Debug`. Text import and
/// export go by variant name. Variants marked `#[hidden]` or `#[spacer]`
/// are kept in the table but skipped by select mappings.
///
/// ```
/// use fastbind_core::{reflect_enum, Reflect};
///
/// #[derive(Clone, Copy, Default, PartialEq, Debug)]
/// enum Stance {
///     #[default]
///     Idle,
///     Crouch = 4,
///     Max,
/// }
///
/// reflect_enum! {
///     Stance { Idle, Crouch, #[hidden] Max }
/// }
///
/// let def = Stance::DESCRIPTOR.as_enum().unwrap();
/// assert_eq!(def.visible_variants().count(), 2);
/// assert_eq!(def.variant_by_value(4).unwrap().name, "Crouch");
/// ```
#[macro_export]
macro_rules! reflect_enum {
    ($t:ident { $($(#[$vflag:ident])* $v:ident),* $(,)? }) => {
        unsafe impl $crate::Reflect for $t {
            const DESCRIPTOR: &'static $crate::FieldDescriptor = &const {
                $crate::FieldDescriptor::builder_for::<$t>()
                    .type_identifier(stringify!($t))
                    .vtable(&const {
                        $crate::ValueVTable::builder::<$t>()
                            .with_default::<$t>()
                            .with_clone::<$t>()
                            .with_eq::<$t>()
                            .with_debug::<$t>()
                            .parse({
                                unsafe fn parse(
                                    s: &str,
                                    target: $crate::PtrMut<'_>,
                                ) -> Result<(), $crate::ParseError> {
                                    $(
                                        if s == stringify!($v) {
                                            unsafe { *target.as_mut::<$t>() = $t::$v };
                                            return Ok(());
                                        }
                                    )*
                                    Err($crate::ParseError::UnknownVariant)
                                }
                                parse
                            })
                            .display({
                                unsafe fn display(
                                    value: $crate::PtrConst<'_>,
                                    f: &mut ::core::fmt::Formatter,
                                ) -> ::core::fmt::Result {
                                    let name = match unsafe { *value.get::<$t>() } {
                                        $($t::$v => stringify!($v),)*
                                        #[allow(unreachable_patterns)]
                                        _ => return Err(::core::fmt::Error),
                                    };
                                    f.write_str(name)
                                }
                                display
                            })
                            .build()
                    })
                    .kind($crate::Kind::Enum(&const {
                        $crate::EnumDef {
                            variants: {
                                const VARIANTS: &[$crate::EnumVariant] = &[$(
                                    $crate::EnumVariant {
                                        name: stringify!($v),
                                        value: $t::$v as i64,
                                        flags: $crate::VariantFlags::empty()
                                            $(.union($crate::__reflect_variant_flag!($vflag)))*,
                                    },
                                )*];
                                VARIANTS
                            },
                            discriminant: {
                                unsafe fn discriminant(value: $crate::PtrConst<'_>) -> i64 {
                                    (unsafe { *value.get::<$t>() }) as i64
                                }
                                discriminant
                            },
                        }
                    }))
                    .build()
            };
        }
    };
}
