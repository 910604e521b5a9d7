use std::{cell::RefCell, rc::Rc};

use fastbind::{
    Binding, BindingContainer, BindingGraph, DestinationNode, LiteralDefault, Node, NodeId,
    UpdatePolicy,
    destination::{FunctionDestination, VALUE_SOURCE},
    value::{FUNCTION_OWNER, PATH_ROOT},
};
use fastbind_core::{ObjectRef, Reflect};
use fastbind_reflect::{ReflectedMut, ReflectedValue};
use fastbind_testhelpers::test;

use crate::host::{Pet, Player, copy, player, read, write};

fn destination(graph: &BindingGraph, id: NodeId) -> &DestinationNode {
    graph
        .node(id)
        .and_then(Node::destination)
        .expect("a destination")
}

#[test]
fn if_updates_needed_writes_on_change() {
    let (mut graph, _, shown) = copy("level", "shown_level");
    let mut hero = player("Ayla", 3);

    graph.advance_tick();
    assert!(graph.update(shown, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.shown_level, 3);
    assert!(destination(&graph, shown).has_ever_run());

    hero.shown_level = 0;
    graph.advance_tick();
    assert!(!graph.update(shown, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.shown_level, 0);

    hero.level = 5;
    graph.advance_tick();
    assert!(graph.update(shown, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.shown_level, 5);
}

#[test]
fn always_writes_every_tick() {
    let (mut graph, _, shown) = copy("level", "shown_level");
    graph.set_policy(shown, UpdatePolicy::Always)?;
    let mut hero = player("Ayla", 3);

    for _ in 0..3 {
        hero.shown_level = -1;
        graph.advance_tick();
        assert!(graph.update(shown, ReflectedMut::of(&mut hero), None));
        assert_eq!(hero.shown_level, 3);
    }
    assert!(!graph.is_performant(shown));
}

#[test]
fn once_writes_a_single_time_per_initialization() {
    let (mut graph, _, shown) = copy("level", "shown_level");
    graph.set_policy(shown, UpdatePolicy::Once)?;
    assert!(graph.is_performant(shown));
    let mut hero = player("Ayla", 3);

    graph.advance_tick();
    assert!(graph.update(shown, ReflectedMut::of(&mut hero), None));
    hero.level = 8;
    graph.advance_tick();
    assert!(!graph.update(shown, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.shown_level, 3);

    graph.terminate(shown);
    graph.initialize(shown);
    graph.advance_tick();
    assert!(graph.update(shown, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.shown_level, 8);
}

#[test]
fn event_based_writes_when_marked() {
    let (mut graph, _, shown) = copy("level", "shown_level");
    graph.set_policy(shown, UpdatePolicy::EventBased)?;
    let mut hero = player("Ayla", 3);
    assert!(destination(&graph, shown).is_event_pending());

    graph.advance_tick();
    assert!(graph.update(shown, ReflectedMut::of(&mut hero), None));
    assert!(!destination(&graph, shown).is_event_pending());

    hero.level = 4;
    graph.advance_tick();
    assert!(!graph.update(shown, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.shown_level, 3);

    graph.mark_dirty(shown)?;
    graph.advance_tick();
    assert!(graph.update(shown, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.shown_level, 4);
}

#[test]
fn a_due_write_that_failed_is_retried() {
    let (mut graph, _, hunger) = copy("level", "pet.hunger");
    let mut rex = Pet {
        name: "Rex".into(),
        hunger: 0,
    };
    let mut hero = player("Ayla", 3);
    hero.pet = unsafe { ObjectRef::to(&mut rex) };

    graph.advance_tick();
    assert!(graph.update(hunger, ReflectedMut::of(&mut hero), None));
    assert_eq!(rex.hunger, 3);

    hero.pet = ObjectRef::null();
    hero.level = 6;
    graph.advance_tick();
    assert!(!graph.update(hunger, ReflectedMut::of(&mut hero), None));

    // the level holds still now, but the write is still owed
    hero.pet = unsafe { ObjectRef::to(&mut rex) };
    graph.advance_tick();
    assert!(graph.update(hunger, ReflectedMut::of(&mut hero), None));
    assert_eq!(rex.hunger, 6);

    graph.advance_tick();
    assert!(!graph.update(hunger, ReflectedMut::of(&mut hero), None));
}

#[test]
fn writes_through_a_wired_object() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let pet_ref = graph.add_value("pet", read("pet"));
    let name = graph.add_value("name", read("name"));
    let pet_name = graph.add_destination("pet name", write("name"));
    graph.wire(pet_ref, pet_name, PATH_ROOT)?;
    graph.wire(name, pet_name, VALUE_SOURCE)?;
    graph.initialize(pet_name);

    let mut rex = Pet::default();
    let mut hero = player("Ayla", 3);
    hero.pet = unsafe { ObjectRef::to(&mut rex) };
    graph.advance_tick();
    assert!(graph.update(pet_name, ReflectedMut::of(&mut hero), None));
    assert_eq!(rex.name, "Ayla");
    assert_eq!(hero.name, "Ayla");
}

#[test]
fn writes_that_change_something_are_notified() {
    let (mut graph, _, shown) = copy("level", "shown_level");
    graph.set_policy(shown, UpdatePolicy::Always)?;
    let mut hero = player("Ayla", 3);

    let mut seen = Vec::new();
    for level in [3, 3, 4] {
        hero.level = level;
        graph.advance_tick();
        let mut sink = |root: ReflectedValue<'_>, field: &str| {
            let written = root.get::<Player>().map(|player| player.shown_level);
            seen.push((field.to_owned(), written));
        };
        assert!(graph.update(shown, ReflectedMut::of(&mut hero), Some(&mut sink)));
    }
    assert_eq!(
        seen,
        [
            ("shown_level".to_owned(), Ok(3)),
            ("shown_level".to_owned(), Ok(4)),
        ]
    );
}

#[test]
fn function_destinations_call_with_their_items() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let heal = graph.add_destination("heal", FunctionDestination::new("heal"));
    let names: Vec<_> = graph
        .node(heal)
        .expect("heal")
        .items()
        .iter()
        .map(|item| item.name().to_owned())
        .collect();
    assert_eq!(names, [FUNCTION_OWNER, "amount"]);

    graph.set_default(heal, "amount", Some(LiteralDefault::text("5")))?;
    graph.initialize(heal);
    let mut hero = player("Ayla", 3);

    graph.advance_tick();
    assert!(graph.update(heal, ReflectedMut::of(&mut hero), None));
    assert_eq!((hero.health, hero.heals), (105, 1));

    graph.advance_tick();
    assert!(!graph.update(heal, ReflectedMut::of(&mut hero), None));

    graph.set_default(heal, "amount", Some(LiteralDefault::text("7")))?;
    graph.advance_tick();
    assert!(graph.update(heal, ReflectedMut::of(&mut hero), None));
    assert_eq!((hero.health, hero.heals), (112, 2));
}

#[test]
fn containers_drive_every_binding() {
    let mut container = BindingContainer::new(Player::DESCRIPTOR);
    let graph = container.graph_mut();
    let level = graph.add_value("level", read("level"));
    let shown = graph.add_destination("shown", write("shown_level"));
    graph.wire(level, shown, VALUE_SOURCE)?;
    let name = graph.add_value("name", read("name"));
    let title = graph.add_destination("title", write("title"));
    graph.wire(name, title, VALUE_SOURCE)?;
    let spare = graph.add_destination("spare", write("health"));

    let mut levels = Binding::new("levels");
    levels.set_destination(container.graph(), shown)?;
    let mut titles = Binding::new("titles");
    titles.set_destination(container.graph(), spare)?;
    titles.set_destination(container.graph(), title)?;
    assert_eq!(titles.inactive(), [spare]);
    container.add_binding(levels);
    container.add_binding(titles);

    let fields = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&fields);
    container.set_notify(move |_: ReflectedValue<'_>, field: &str| {
        sink.borrow_mut().push(field.to_owned())
    });
    container.initialize_bindings();

    let mut hero = player("Ayla", 3);
    assert!(container.update_bindings(ReflectedMut::of(&mut hero)));
    assert_eq!((hero.shown_level, hero.title.as_str()), (3, "Ayla"));
    assert_eq!(*fields.borrow(), ["shown_level", "title"]);

    assert!(!container.update_bindings(ReflectedMut::of(&mut hero)));
    assert_eq!(container.graph().tick(), 2);

    let mut stranger = Pet::default();
    assert!(!container.update_bindings(ReflectedMut::of(&mut stranger)));
    assert_eq!(container.graph().tick(), 2);

    container.terminate_bindings();
    assert!(!destination(container.graph(), shown).has_ever_run());
}

#[test]
fn only_destinations_can_be_set_on_a_binding() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let level = graph.add_value("level", read("level"));
    let mut binding = Binding::new("broken");
    assert!(binding.set_destination(&graph, level).is_err());
    assert!(!binding.is_active());

    let mut hero = player("Ayla", 1);
    assert!(!binding.update(&mut graph, ReflectedMut::of(&mut hero), None));
    assert!(binding.is_performant(&graph));
}
