use crate::{PtrConst, PtrMut};

/// Whether a number is a signed integer, an unsigned integer or a float
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumberClass {
    /// `i8` through `isize`
    Signed,
    /// `u8` through `usize`
    Unsigned,
    /// `f32` and `f64`
    Float,
}

/// A number read out of a reflected value, at full width
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    /// A signed integer
    Signed(i128),
    /// An unsigned integer
    Unsigned(u128),
    /// A float
    Float(f64),
}

/// Reads the number stored at a location
///
/// # Safety
///
/// `value` must point to an initialized value of the number type.
pub type ReadNumberFn = for<'mem> unsafe fn(value: PtrConst<'mem>) -> Number;

/// Stores a number at a location, converting it with `as`
///
/// # Safety
///
/// `target` must point to an initialized value of the number type.
pub type WriteNumberFn = for<'mem> unsafe fn(target: PtrMut<'mem>, number: Number);

/// How a primitive number is laid out, and how to get it in and out
#[derive(Clone, Copy)]
pub struct NumberDef {
    /// Signed, unsigned or float
    pub class: NumberClass,

    /// Width in bits
    pub bits: u32,

    /// cf. [`ReadNumberFn`]
    pub read: ReadNumberFn,

    /// cf. [`WriteNumberFn`]
    pub write: WriteNumberFn,
}

impl NumberDef {
    /// Bits of integer precision a float of this width holds exactly
    fn mantissa_bits(&self) -> u32 {
        if self.bits <= 32 { 24 } else { 53 }
    }

    /// Whether every value of `source` is exactly representable here
    pub fn widens_from(&self, source: &NumberDef) -> bool {
        use NumberClass::*;
        match (source.class, self.class) {
            (Signed, Signed) | (Unsigned, Unsigned) | (Float, Float) => self.bits >= source.bits,
            (Unsigned, Signed) => self.bits > source.bits,
            (Signed | Unsigned, Float) => source.bits <= self.mantissa_bits(),
            (Signed | Float, Unsigned) | (Float, Signed) => false,
        }
    }
}

impl core::fmt::Debug for NumberDef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NumberDef")
            .field("class", &self.class)
            .field("bits", &self.bits)
            .finish_non_exhaustive()
    }
}
