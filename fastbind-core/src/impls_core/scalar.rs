use crate::*;

unsafe impl Reflect for () {
    const DESCRIPTOR: &'static FieldDescriptor = &const {
        FieldDescriptor::builder_for::<Self>()
            .type_identifier("()")
            .vtable(
                &const {
                    ValueVTable::builder::<Self>()
                        .with_default::<Self>()
                        .with_clone::<Self>()
                        .with_eq::<Self>()
                        .with_debug::<Self>()
                        .build()
                },
            )
            .kind(Kind::Unit)
            .build()
    };
}

unsafe impl Reflect for bool {
    const DESCRIPTOR: &'static FieldDescriptor = &const {
        FieldDescriptor::builder_for::<Self>()
            .type_identifier("bool")
            .vtable(&const { ValueVTable::builder::<Self>().with_value::<Self>().build() })
            .kind(Kind::Bool)
            .build()
    };
}

unsafe impl Reflect for char {
    const DESCRIPTOR: &'static FieldDescriptor = &const {
        FieldDescriptor::builder_for::<Self>()
            .type_identifier("char")
            .vtable(&const { ValueVTable::builder::<Self>().with_value::<Self>().build() })
            .kind(Kind::Char)
            .build()
    };
}

macro_rules! impl_reflect_for_number {
    ($class:ident: $($type:ty),* $(,)?) => {
        $(
            unsafe impl Reflect for $type {
                const DESCRIPTOR: &'static FieldDescriptor = &const {
                    FieldDescriptor::builder_for::<Self>()
                        .type_identifier(stringify!($type))
                        .vtable(&const {
                            ValueVTable::builder::<Self>().with_value::<Self>().build()
                        })
                        .kind(Kind::Number(
                            &const {
                                NumberDef {
                                    class: NumberClass::$class,
                                    bits: <$type>::BITS_OF,
                                    read: |value| {
                                        Number::$class(unsafe { *value.get::<$type>() } as _)
                                    },
                                    write: |target, number| {
                                        let value = match number {
                                            Number::Signed(n) => n as $type,
                                            Number::Unsigned(n) => n as $type,
                                            Number::Float(n) => n as $type,
                                        };
                                        unsafe { *target.as_mut::<$type>() = value };
                                    },
                                }
                            },
                        ))
                        .build()
                };
            }
        )*
    };
}

/// Width in bits, including for floats
trait BitsOf {
    const BITS_OF: u32;
}

macro_rules! impl_bits_of {
    ($($type:ty),* $(,)?) => {
        $(
            impl BitsOf for $type {
                const BITS_OF: u32 = (core::mem::size_of::<$type>() * 8) as u32;
            }
        )*
    };
}

impl_bits_of!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, f32, f64);

impl_reflect_for_number!(Unsigned: u8, u16, u32, u64, usize);
impl_reflect_for_number!(Signed: i8, i16, i32, i64, isize);
impl_reflect_for_number!(Float: f32, f64);
