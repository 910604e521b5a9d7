use bitflags::bitflags;

use crate::PtrConst;

/// The variant table of a fieldless enum
#[derive(Clone, Copy)]
pub struct EnumDef {
    /// All variants, in declaration order
    pub variants: &'static [EnumVariant],

    /// Reads the integer value of the variant stored at a location
    pub discriminant: DiscriminantFn,
}

/// Reads an enum's integer value
///
/// # Safety
///
/// `value` must point to an initialized value of the enum type.
pub type DiscriminantFn = for<'mem> unsafe fn(value: PtrConst<'mem>) -> i64;

impl EnumDef {
    /// Variants that get an entry in authoring lists and select mappings
    pub fn visible_variants(&self) -> impl Iterator<Item = &'static EnumVariant> + use<> {
        self.variants.iter().filter(|v| v.is_visible())
    }

    /// Looks up a variant by its integer value
    pub fn variant_by_value(&self, value: i64) -> Option<&'static EnumVariant> {
        self.variants.iter().find(|v| v.value == value)
    }

    /// Reads the integer value at `value`
    ///
    /// # Safety
    ///
    /// `value` must point to an initialized value of the enum type.
    #[inline]
    pub unsafe fn read(&self, value: PtrConst<'_>) -> i64 {
        unsafe { (self.discriminant)(value) }
    }
}

impl core::fmt::Debug for EnumDef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EnumDef")
            .field("variants", &self.variants)
            .finish_non_exhaustive()
    }
}

/// A variant of a fieldless enum
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnumVariant {
    /// Name of the variant
    pub name: &'static str,

    /// Integer value of the variant
    pub value: i64,

    /// Presentation flags
    pub flags: VariantFlags,
}

impl EnumVariant {
    /// Whether the variant is neither hidden nor a spacer
    #[inline]
    pub fn is_visible(&self) -> bool {
        !self
            .flags
            .intersects(VariantFlags::HIDDEN.union(VariantFlags::SPACER))
    }
}

bitflags! {
    /// Flags that can be applied to enum variants
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct VariantFlags: u8 {
        /// Not meant to be picked, e.g. a trailing `Max` marker
        const HIDDEN = 1 << 0;
        /// Only separates groups of variants
        const SPACER = 1 << 1;
    }
}
