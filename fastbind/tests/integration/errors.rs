use fastbind::{BindingError, BindingGraph, NodeKindRegistry, destination::VALUE_SOURCE};
use fastbind_core::Reflect;
use fastbind_testhelpers::test;

use crate::host::{Player, read, write};

fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn message(error: BindingError) -> String {
    strip_ansi(&error.to_string())
}

#[test]
fn wiring_errors_read_well() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let level = graph.add_value("level", read("level"));
    let name = graph.add_value("name", read("name"));
    let shown = graph.add_destination("shown", write("shown_level"));

    insta::assert_snapshot!(
        message(graph.wire(level, shown, "Nope").unwrap_err()),
        @"Node #2 has no item 'Nope'"
    );
    insta::assert_snapshot!(
        message(graph.wire(shown, level, "Path Root").unwrap_err()),
        @"Node #2 is not a value node"
    );
    insta::assert_snapshot!(
        message(graph.wire(name, shown, VALUE_SOURCE).unwrap_err()),
        @"Item 'Value Source' takes i32, but got String"
    );

    graph.wire(level, shown, VALUE_SOURCE)?;
    insta::assert_snapshot!(
        message(graph.wire(level, shown, VALUE_SOURCE).unwrap_err()),
        @"Node #0 already feeds node #2"
    );

    graph.remove(shown)?;
    insta::assert_snapshot!(
        message(graph.mark_dirty(shown).unwrap_err()),
        @"Unknown node #2"
    );
}

#[test]
fn setup_errors_carry_the_reflection_error() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let heals = graph.add_destination("heals", write("heals"));
    insta::assert_snapshot!(
        message(graph.setup(heals).unwrap_err()),
        @"Member 'heals' is not allowed here: property is read-only"
    );

    let luck = graph.add_value("luck", read("luck"));
    insta::assert_snapshot!(
        message(graph.setup(luck).unwrap_err()),
        @"No member 'luck' on Player"
    );

    let heal = graph.add_value("heal", fastbind::value::FunctionValue::new("heal"));
    insta::assert_snapshot!(
        message(graph.setup(heal).unwrap_err()),
        @"heal() returns nothing"
    );
}

#[test]
fn cycles_and_registry_errors_read_well() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let first = graph.add_value("first", fastbind::value::FormatTextValue::new("{Inner}"));
    let second = graph.add_value("second", fastbind::value::FormatTextValue::new("{Inner}"));
    graph.wire(second, first, "Inner")?;
    graph.wire(first, second, "Inner")?;
    insta::assert_snapshot!(message(graph.validate().unwrap_err()), @"Wiring cycle through #0 #1");

    let mut registry = NodeKindRegistry::builtin();
    let select = *registry.get("select").expect("builtin");
    insta::assert_snapshot!(
        message(registry.register(select).unwrap_err()),
        @"Node kind select is already registered"
    );
}
