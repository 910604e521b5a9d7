use fastbind::{
    BindingError, BindingGraph, Expect, LiteralDefault, destination::VALUE_SOURCE,
    value::PATH_ROOT,
};
use fastbind_core::{ObjectRef, Reflect};
use fastbind_reflect::{ReflectedMut, ReflectedValue};
use fastbind_testhelpers::{Level, take_logs, take_logs_at, test};

use crate::host::{Mood, Pet, Player, player, read, write};

#[test]
fn literals_round_trip_through_text() {
    let mut rex = Pet::default();
    let hero = Player {
        mood: Mood::Sleepy,
        pet: unsafe { ObjectRef::to(&mut rex) },
        ..player("Ayla \"the bold\"", -42)
    };
    let values = [
        ReflectedValue::of(&hero.level),
        ReflectedValue::of(&hero.name),
        ReflectedValue::of(&hero.mood),
        ReflectedValue::of(&hero.alive),
        ReflectedValue::of(&hero.pet),
    ];
    for value in values {
        let literal = LiteralDefault::from_value(value).expect("exports");
        let decoded = literal.decode(Expect::Exactly(value.descriptor()))?;
        assert!(decoded.identical(&value), "{}", value.descriptor());
    }

    let literal = LiteralDefault::from_value(ReflectedValue::of(&hero.pet)).expect("exports");
    assert_eq!(literal, LiteralDefault::object(unsafe { ObjectRef::to(&mut rex) }));
}

#[test]
fn object_defaults_only_come_from_object_refs() {
    let null = LiteralDefault::from_value(ReflectedValue::of(&ObjectRef::<Pet>::null()))
        .expect("exports");
    let LiteralDefault::Object(object) = &null else {
        panic!("an object reference exports as an object default");
    };
    assert!(object.is_null());
    assert_eq!(object.descriptor(), ObjectRef::<Pet>::DESCRIPTOR);
    assert_eq!(null, LiteralDefault::object(ObjectRef::<Pet>::null()));

    let decoded = null.decode(Expect::Object)?;
    assert!(decoded.get::<ObjectRef<Pet>>()?.is_null());
}

#[test]
fn text_on_an_open_item_reads_as_a_string() {
    let decoded = LiteralDefault::text("12").decode(Expect::Any)?;
    assert_eq!(decoded.get::<String>()?, "12");
    assert!(LiteralDefault::text("12").decode(Expect::Object).is_err());
}

#[test]
fn a_default_that_does_not_decode_warns_once() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let shown = graph.add_destination("shown", write("shown_level"));
    graph.set_default(shown, VALUE_SOURCE, Some(LiteralDefault::text("lots")))?;
    take_logs();
    graph.initialize(shown);

    let mut hero = player("Ayla", 3);
    for _ in 0..3 {
        graph.advance_tick();
        assert!(!graph.update(shown, ReflectedMut::of(&mut hero), None));
    }
    let warnings = take_logs_at(Level::Warn);
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    assert!(warnings[0].message.contains(VALUE_SOURCE));
    let item = graph.node(shown).and_then(|node| node.item(VALUE_SOURCE));
    assert!(item.is_some_and(|item| !item.has_decoded_default()));

    graph.set_default(shown, VALUE_SOURCE, Some(LiteralDefault::text("12")))?;
    graph.advance_tick();
    assert!(graph.update(shown, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.shown_level, 12);
}

#[test]
fn object_defaults_must_fit_their_item() {
    let mut rex = Pet::default();
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let shown = graph.add_destination("shown", write("shown_level"));

    let err = graph
        .set_default(
            shown,
            VALUE_SOURCE,
            Some(LiteralDefault::object(unsafe { ObjectRef::to(&mut rex) })),
        )
        .unwrap_err();
    assert_eq!(
        err,
        BindingError::WrongInput {
            item: VALUE_SOURCE.to_owned(),
            expected: Expect::Assignable(i32::DESCRIPTOR),
            actual: ObjectRef::<Pet>::DESCRIPTOR,
        }
    );
    let item = graph.node(shown).and_then(|node| node.item(VALUE_SOURCE));
    assert!(item.is_some_and(|item| item.is_empty()));
}

#[test]
fn object_defaults_root_a_path() {
    let mut rex = Pet {
        name: "Rex".into(),
        hunger: 7,
    };
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let hunger = graph.add_value("hunger", read("hunger"));
    graph.set_default(
        hunger,
        PATH_ROOT,
        Some(LiteralDefault::object(unsafe { ObjectRef::to(&mut rex) })),
    )?;
    assert_eq!(
        graph
            .node(hunger)
            .and_then(|node| node.value())
            .and_then(|value| value.output_descriptor()),
        Some(i32::DESCRIPTOR)
    );
    graph.initialize(hunger);

    let mut hero = player("Ayla", 3);
    graph.advance_tick();
    let (value, changed) = graph
        .get_value(hunger, ReflectedMut::of(&mut hero))
        .expect("reads the pet");
    assert_eq!(value.get::<i32>()?, &7);
    assert!(changed);

    graph.set_default(hunger, PATH_ROOT, Some(LiteralDefault::object(ObjectRef::<Pet>::null())))?;
    graph.advance_tick();
    assert!(graph.get_value(hunger, ReflectedMut::of(&mut hero)).is_none());

    graph.set_default(hunger, PATH_ROOT, None)?;
    assert!(
        graph
            .node(hunger)
            .and_then(|node| node.value())
            .and_then(|value| value.output_descriptor())
            .is_none()
    );
}
