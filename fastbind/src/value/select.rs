use alloc::vec::Vec;

use fastbind_core::{FieldDescriptor, Kind};
use fastbind_reflect::ReflectedValue;

use crate::{
    Expect,
    eval::{Pull, Setup, SetupOutcome},
    item::{ItemSpec, list_item_name},
};

/// Name of the selector item
pub const SELECTOR: &str = "Value";
/// Name of the item chosen when a `bool` selector is true
pub const TRUE: &str = "True";
/// Name of the item chosen when a `bool` selector is false
pub const FALSE: &str = "False";
/// Name of the item chosen when no mapping matches
pub const FALLBACK: &str = "Default";
/// Base name of the items compared against the selector
pub const SELECT_VALUE: &str = "Select Value";
/// Base name of the items chosen by a matching mapping
pub const RESULT_VALUE: &str = "Result Value";

/// Outputs one of its inputs, picked by the value of the `Value` item.
///
/// A `bool` selector picks `True` or `False`. An enum selector picks the
/// item named after the variant; hidden and spacer variants have none.
/// Any other selector is compared with each `Select Value N` in turn and
/// picks the matching `Result Value N`, or `Default` if none matches.
#[derive(Debug, Default)]
pub struct SelectValue {
    selector: Option<&'static FieldDescriptor>,
    output: Option<&'static FieldDescriptor>,
    mappings: usize,
    variant_items: Vec<(i64, &'static str)>,
}

impl SelectValue {
    /// A select node that works out its types from its wiring
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixes the selector type instead of taking it from what feeds `Value`
    pub fn with_selector(mut self, selector: &'static FieldDescriptor) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Fixes the output type instead of taking it from the consumer
    pub fn with_output(mut self, output: &'static FieldDescriptor) -> Self {
        self.output = Some(output);
        self
    }

    /// Starts with `count` mappings, for selectors that are neither `bool` nor enums
    pub fn with_mappings(mut self, count: usize) -> Self {
        self.mappings = count;
        self
    }

    /// Adds a mapping and returns its index. Set the node up again afterwards.
    pub fn add_mapping(&mut self) -> usize {
        self.mappings = self.mappings.max(1) + 1;
        self.mappings - 1
    }

    /// Number of mappings
    pub fn mappings(&self) -> usize {
        self.mappings
    }

    pub(crate) fn setup(&mut self, setup: &Setup) -> SetupOutcome {
        let selector = self.selector.or_else(|| setup.input(SELECTOR));
        let output = self
            .output
            .or(setup.consumer)
            .or_else(|| setup.input(FALLBACK))
            .or_else(|| setup.input(&list_item_name(RESULT_VALUE, 0)));
        let result = output.map_or(Expect::Any, Expect::Exactly);

        let mut items = alloc::vec![ItemSpec::new(
            SELECTOR,
            selector.map_or(Expect::Any, Expect::Exactly)
        )];
        self.variant_items.clear();
        match selector.map(|selector| selector.kind) {
            Some(Kind::Bool) => {
                items.push(ItemSpec::new(TRUE, result).nullable());
                items.push(ItemSpec::new(FALSE, result).nullable());
            }
            Some(Kind::Enum(def)) => {
                for variant in def.visible_variants() {
                    self.variant_items.push((variant.value, variant.name));
                    items.push(ItemSpec::new(variant.name, result).nullable());
                }
            }
            _ => {
                self.mappings = self.mappings.max(1);
                items.push(ItemSpec::new(FALLBACK, result).nullable());
                let compared = selector.map_or(Expect::Any, Expect::Exactly);
                for index in 0..self.mappings {
                    items.push(ItemSpec::listed(SELECT_VALUE, index, compared));
                    items.push(ItemSpec::listed(RESULT_VALUE, index, result));
                }
            }
        }
        SetupOutcome::new(items, output)
    }

    pub(crate) fn compute(&mut self, pull: &mut Pull<'_, '_>) -> Option<ReflectedValue<'_>> {
        let selector = pull.item(SELECTOR)?;
        match selector.descriptor().kind {
            Kind::Bool => {
                let chosen = if selector.as_bool()? { TRUE } else { FALSE };
                pull.item(chosen)
            }
            Kind::Enum(_) => {
                let value = selector.enum_value()?;
                let (_, name) = self
                    .variant_items
                    .iter()
                    .find(|(variant, _)| *variant == value)?;
                pull.item(name)
            }
            _ => {
                for index in 0..self.mappings {
                    let compared = pull.item(&list_item_name(SELECT_VALUE, index));
                    if compared.is_some_and(|compared| compared.identical(&selector)) {
                        return pull.item(&list_item_name(RESULT_VALUE, index));
                    }
                }
                pull.item(FALLBACK)
            }
        }
    }
}
