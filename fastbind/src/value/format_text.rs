use alloc::{string::String, vec::Vec};
use core::fmt::Write;

use fastbind_core::Reflect;
use fastbind_reflect::ReflectedValue;

use crate::{
    Expect,
    eval::{Pull, SetupOutcome},
    item::ItemSpec,
};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Argument(usize),
}

/// Formats text, replacing each `{Name}` with the text of the item `Name`.
///
/// `{{` and `}}` stand for literal braces. A brace that opens no argument
/// is kept as-is. If any argument resolves to nothing, or to a type with
/// no text form, so does the node.
#[derive(Debug)]
pub struct FormatTextValue {
    format: String,
    segments: Vec<Segment>,
    arguments: Vec<String>,
    output: String,
}

impl Default for FormatTextValue {
    fn default() -> Self {
        Self::new("{InputString}")
    }
}

impl FormatTextValue {
    /// Formats with `format`
    pub fn new(format: impl Into<String>) -> Self {
        let format = format.into();
        let (segments, arguments) = parse_format(&format);
        Self {
            format,
            segments,
            arguments,
            output: String::new(),
        }
    }

    /// The format string
    pub fn format(&self) -> &str {
        &self.format
    }

    /// Argument names, in order of first appearance
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub(crate) fn setup(&mut self) -> SetupOutcome {
        let items = self
            .arguments
            .iter()
            .map(|argument| ItemSpec::new(argument.as_str(), Expect::Any))
            .collect();
        SetupOutcome::new(items, Some(String::DESCRIPTOR))
    }

    pub(crate) fn compute(&mut self, pull: &mut Pull<'_, '_>) -> Option<ReflectedValue<'_>> {
        pull.pull_all();
        self.output.clear();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => self.output.push_str(text),
                Segment::Argument(index) => {
                    let name = self.arguments.get(*index)?;
                    let value = pull.value(name)?;
                    value.descriptor().vtable.display?;
                    write!(self.output, "{}", value).ok()?;
                }
            }
        }
        Some(ReflectedValue::of(&self.output))
    }
}

fn parse_format(format: &str) -> (Vec<Segment>, Vec<String>) {
    let mut segments = Vec::new();
    let mut arguments: Vec<String> = Vec::new();
    let mut literal = String::new();
    let mut rest = format;

    while let Some(c) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix("{{") {
            literal.push('{');
            rest = after;
        } else if let Some(after) = rest.strip_prefix("}}") {
            literal.push('}');
            rest = after;
        } else if let Some((name, after)) = rest
            .strip_prefix('{')
            .and_then(|inner| inner.split_once('}'))
            .filter(|(name, _)| is_argument_name(name))
        {
            if !literal.is_empty() {
                segments.push(Segment::Literal(core::mem::take(&mut literal)));
            }
            let index = match arguments.iter().position(|argument| argument == name) {
                Some(index) => index,
                None => {
                    arguments.push(name.into());
                    arguments.len() - 1
                }
            };
            segments.push(Segment::Argument(index));
            rest = after;
        } else {
            literal.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    (segments, arguments)
}

fn is_argument_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == ' ')
}
