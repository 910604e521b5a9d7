use fastbind::{
    BindingError, BindingGraph, Expect, LiteralDefault, SetterRegistry, ValueSetter,
    destination::VALUE_SOURCE,
    value::FunctionValue,
};
use fastbind_core::{FieldDescriptor, Reflect};
use fastbind_reflect::{ReflectedMut, ReflectedValue};
use fastbind_testhelpers::test;

use crate::host::{Player, copy, player, read, write};

#[test]
fn small_numbers_widen_into_destinations() {
    let (mut graph, _, experience) = copy("rank", "experience");
    let mut hero = player("Ayla", 3);
    hero.rank = 7;

    graph.advance_tick();
    assert!(graph.update(experience, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.experience, 7);

    graph.advance_tick();
    assert!(!graph.update(experience, ReflectedMut::of(&mut hero), None));

    hero.rank = 200;
    graph.advance_tick();
    assert!(graph.update(experience, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.experience, 200);
}

#[test]
fn narrowing_is_refused_when_wiring() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let experience = graph.add_value("experience", read("experience"));
    let shown = graph.add_destination("shown", write("shown_level"));
    assert_eq!(
        graph.wire(experience, shown, VALUE_SOURCE),
        Err(BindingError::WrongInput {
            item: VALUE_SOURCE.to_owned(),
            expected: Expect::Assignable(i32::DESCRIPTOR),
            actual: i64::DESCRIPTOR,
        })
    );

    let level = graph.add_value("level", read("level"));
    let rank = graph.add_destination("rank", write("rank"));
    assert!(graph.wire(level, rank, VALUE_SOURCE).is_err());
    assert!(graph.wire(level, shown, VALUE_SOURCE).is_ok());
}

#[test]
fn lists_are_copied_with_their_items_widened() {
    let (mut graph, _, history) = copy("levels", "history");
    let mut hero = player("Ayla", 3);
    hero.levels = vec![1, 2, 3];

    graph.advance_tick();
    assert!(graph.update(history, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.history, [1, 2, 3]);

    hero.levels.push(-4);
    graph.advance_tick();
    assert!(graph.update(history, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.history, [1, 2, 3, -4]);
    assert_eq!(hero.levels, [1, 2, 3, -4]);
}

#[test]
fn parameters_widen_into_calls() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let boosted = graph.add_value("boosted", FunctionValue::new("boosted"));
    let level = graph.add_value("level", read("level"));
    graph.wire(level, boosted, "amount")?;
    graph.initialize(boosted);

    let amount = graph
        .node(boosted)
        .and_then(|node| node.item("amount"))
        .map(|item| item.expect());
    assert_eq!(amount, Some(Expect::Assignable(i64::DESCRIPTOR)));

    let mut hero = player("Ayla", 3);
    hero.experience = 100;
    graph.advance_tick();
    let (value, _) = graph
        .get_value(boosted, ReflectedMut::of(&mut hero))
        .expect("calls");
    assert_eq!(value.get::<i64>()?, &103);
}

#[test]
fn text_defaults_decode_as_the_written_type() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let experience = graph.add_destination("experience", write("experience"));
    graph.set_default(experience, VALUE_SOURCE, Some(LiteralDefault::text("9000000000")))?;
    graph.initialize(experience);

    let mut hero = player("Ayla", 3);
    graph.advance_tick();
    assert!(graph.update(experience, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.experience, 9_000_000_000);
}

/// Writes `true` as 1 and `false` as 0
struct Flags;

impl ValueSetter for Flags {
    fn name(&self) -> &'static str {
        "flags"
    }

    fn can_set(
        &self,
        _setters: &SetterRegistry,
        target: &'static FieldDescriptor,
        source: &'static FieldDescriptor,
    ) -> bool {
        target.is_same(i32::DESCRIPTOR) && source.is_same(bool::DESCRIPTOR)
    }

    fn set(
        &self,
        _setters: &SetterRegistry,
        mut target: ReflectedMut<'_>,
        source: ReflectedValue<'_>,
    ) -> Result<(), BindingError> {
        let flag = i32::from(source.as_bool().unwrap_or_default());
        Ok(target.assign_from(ReflectedValue::of(&flag))?)
    }
}

#[test]
fn registered_setters_extend_what_wires() {
    let mut graph = BindingGraph::with_setters(Player::DESCRIPTOR, SetterRegistry::new());
    let alive = graph.add_value("alive", read("alive"));
    let shown = graph.add_destination("shown", write("shown_level"));
    assert!(graph.wire(alive, shown, VALUE_SOURCE).is_err());

    graph.setters_mut().register(Flags);
    assert_eq!(graph.setters().names().collect::<Vec<_>>(), ["flags"]);
    graph.wire(alive, shown, VALUE_SOURCE)?;
    graph.initialize(shown);

    let mut hero = player("Ayla", 3);
    graph.advance_tick();
    assert!(graph.update(shown, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.shown_level, 1);

    hero.alive = false;
    graph.advance_tick();
    assert!(graph.update(shown, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.shown_level, 0);
}

#[test]
fn graphs_without_setters_only_copy() {
    let mut graph = BindingGraph::with_setters(Player::DESCRIPTOR, SetterRegistry::new());
    let rank = graph.add_value("rank", read("rank"));
    let experience = graph.add_destination("experience", write("experience"));
    assert!(graph.wire(rank, experience, VALUE_SOURCE).is_err());
}
