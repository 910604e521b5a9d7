use fastbind::{
    BindingGraph, CacheState, LiteralDefault, Node, NodeId, RunDiagnostics, UpdatePolicy,
    ValueNode,
    destination::VALUE_SOURCE,
    value::{FUNCTION_OWNER, FormatTextValue, FunctionValue, PATH_ROOT},
};
use fastbind_core::{ObjectRef, Reflect};
use fastbind_reflect::ReflectedMut;
use fastbind_testhelpers::test;

use crate::host::{Pet, Player, player, read, write};

fn value_node(graph: &BindingGraph, id: NodeId) -> &ValueNode {
    graph
        .node(id)
        .and_then(Node::value)
        .expect("a value node")
}

fn diagnostics(graph: &BindingGraph, id: NodeId) -> RunDiagnostics {
    value_node(graph, id).diagnostics()
}

#[test]
fn value_nodes_compute_once_per_tick() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let level = graph.add_value("level", read("level"));
    graph.initialize(level);
    let mut hero = player("Ayla", 3);

    graph.advance_tick();
    let (value, changed) = graph
        .get_value(level, ReflectedMut::of(&mut hero))
        .expect("resolves");
    assert_eq!(value.get::<i32>()?, &3);
    assert!(changed);

    let (value, changed) = graph
        .get_value(level, ReflectedMut::of(&mut hero))
        .expect("cached");
    assert_eq!(value.get::<i32>()?, &3);
    assert!(!changed);
    assert_eq!(diagnostics(&graph, level).run_count, 1);
    assert_eq!(diagnostics(&graph, level).last_run_tick, Some(1));
    assert_eq!(value_node(&graph, level).state(), CacheState::Clean { tick: 1 });
}

#[test]
fn changes_are_reported_only_when_values_differ() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let level = graph.add_value("level", read("level"));
    graph.initialize(level);
    let mut hero = player("Ayla", 3);

    graph.advance_tick();
    assert!(graph.get_value(level, ReflectedMut::of(&mut hero)).expect("resolves").1);

    graph.advance_tick();
    let (value, changed) = graph
        .get_value(level, ReflectedMut::of(&mut hero))
        .expect("resolves");
    assert_eq!(value.get::<i32>()?, &3);
    assert!(!changed);

    hero.level = 4;
    graph.advance_tick();
    let (value, changed) = graph
        .get_value(level, ReflectedMut::of(&mut hero))
        .expect("resolves");
    assert_eq!(value.get::<i32>()?, &4);
    assert!(changed);
    assert_eq!(diagnostics(&graph, level).run_count, 3);
}

#[test]
fn once_values_compute_until_marked_dirty() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let level = graph.add_value("level", read("level"));
    graph.set_policy(level, UpdatePolicy::Once)?;
    graph.initialize(level);
    let mut hero = player("Ayla", 3);

    graph.advance_tick();
    graph.get_value(level, ReflectedMut::of(&mut hero));
    hero.level = 9;
    graph.advance_tick();
    let (value, changed) = graph
        .get_value(level, ReflectedMut::of(&mut hero))
        .expect("cached");
    assert_eq!(value.get::<i32>()?, &3);
    assert!(!changed);
    assert_eq!(diagnostics(&graph, level).run_count, 1);

    graph.mark_dirty(level)?;
    let (value, changed) = graph
        .get_value(level, ReflectedMut::of(&mut hero))
        .expect("recomputed");
    assert_eq!(value.get::<i32>()?, &9);
    assert!(changed);
}

#[test]
fn nothing_flows_through_a_null_object_but_the_cache_is_kept() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let pet_ref = graph.add_value("pet", read("pet"));
    let pet_name = graph.add_value("pet name", read("name"));
    graph.wire(pet_ref, pet_name, PATH_ROOT)?;
    let label = graph.add_value("label", FormatTextValue::new("{Owner} walks {Pet}"));
    graph.wire(pet_name, label, "Pet")?;
    graph.set_default(label, "Owner", Some(LiteralDefault::text("Ayla")))?;
    let title = graph.add_destination("title", write("title"));
    graph.wire(label, title, VALUE_SOURCE)?;
    graph.initialize(title);

    let mut rex = Pet {
        name: "Rex".into(),
        hunger: 2,
    };
    let mut hero = player("Ayla", 3);

    graph.advance_tick();
    assert!(!graph.update(title, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.title, "");
    assert!(value_node(&graph, label).cached().is_none());

    hero.pet = unsafe { ObjectRef::to(&mut rex) };
    graph.advance_tick();
    assert!(graph.update(title, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.title, "Ayla walks Rex");

    hero.pet = ObjectRef::null();
    graph.advance_tick();
    assert!(!graph.update(title, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.title, "Ayla walks Rex");
    let held = value_node(&graph, label).cached().expect("held");
    assert_eq!(held.get::<String>()?, "Ayla walks Rex");
    assert_eq!(value_node(&graph, label).state(), CacheState::Dirty);
    // only the cache keeps it: readers get nothing this tick
    assert!(graph.get_value(label, ReflectedMut::of(&mut hero)).is_none());

    // the same text again is no change, so nothing is written
    hero.pet = unsafe { ObjectRef::to(&mut rex) };
    hero.title.clear();
    graph.advance_tick();
    assert!(!graph.update(title, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.title, "");
    assert_eq!(
        value_node(&graph, label).state(),
        CacheState::Clean { tick: 4 }
    );
}

#[test]
fn format_text_fills_every_argument() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let banner = graph.add_value(
        "banner",
        FormatTextValue::new("{Name} ({Level}) {{lv}} {Name}"),
    );
    let name = graph.add_value("name", read("name"));
    let level = graph.add_value("level", read("level"));
    graph.wire(name, banner, "Name")?;
    graph.wire(level, banner, "Level")?;
    graph.initialize(banner);

    let items: Vec<_> = graph
        .node(banner)
        .expect("banner")
        .items()
        .iter()
        .map(|item| item.name().to_owned())
        .collect();
    assert_eq!(items, ["Name", "Level"]);

    let mut hero = player("Ayla", 12);
    graph.advance_tick();
    let (value, _) = graph
        .get_value(banner, ReflectedMut::of(&mut hero))
        .expect("formats");
    assert_eq!(value.get::<String>()?, "Ayla (12) {lv} Ayla");
}

#[test]
fn format_text_without_an_argument_produces_nothing() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let banner = graph.add_value("banner", FormatTextValue::new("{Name}!"));
    graph.initialize(banner);

    let mut hero = player("Ayla", 12);
    graph.advance_tick();
    assert!(graph.get_value(banner, ReflectedMut::of(&mut hero)).is_none());

    graph.set_default(banner, "Name", Some(LiteralDefault::text("Bram")))?;
    let (value, changed) = graph
        .get_value(banner, ReflectedMut::of(&mut hero))
        .expect("formats");
    assert_eq!(value.get::<String>()?, "Bram!");
    assert!(changed);
}

#[test]
fn function_values_skip_calls_while_inputs_hold() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let bonus = graph.add_value("bonus", FunctionValue::new("bonus"));
    graph.initialize(bonus);
    let mut hero = player("Ayla", 3);

    for _ in 0..3 {
        graph.advance_tick();
        let (value, _) = graph
            .get_value(bonus, ReflectedMut::of(&mut hero))
            .expect("calls");
        assert_eq!(value.get::<i32>()?, &30);
    }
    assert_eq!(hero.bonus_calls.get(), 1);
    assert_eq!(diagnostics(&graph, bonus).run_count, 3);

    graph.set_policy(bonus, UpdatePolicy::Always)?;
    hero.level = 4;
    graph.advance_tick();
    let (value, changed) = graph
        .get_value(bonus, ReflectedMut::of(&mut hero))
        .expect("calls");
    assert_eq!(value.get::<i32>()?, &40);
    assert!(changed);
    assert_eq!(hero.bonus_calls.get(), 2);
}

#[test]
fn function_values_call_again_when_a_parameter_changes() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let scaled = graph.add_value("scaled", FunctionValue::new("scaled"));
    let health = graph.add_value("health", read("health"));
    graph.wire(health, scaled, "factor")?;
    graph.initialize(scaled);

    let node = graph.node(scaled).expect("scaled");
    let names: Vec<_> = node.items().iter().map(|item| item.name()).collect();
    assert_eq!(names, [FUNCTION_OWNER, "factor"]);
    assert_eq!(value_node(&graph, scaled).output_descriptor(), Some(i32::DESCRIPTOR));

    let mut hero = player("Ayla", 3);
    hero.health = 2;
    graph.advance_tick();
    let (value, _) = graph
        .get_value(scaled, ReflectedMut::of(&mut hero))
        .expect("calls");
    assert_eq!(value.get::<i32>()?, &6);

    hero.health = 5;
    graph.advance_tick();
    let (value, changed) = graph
        .get_value(scaled, ReflectedMut::of(&mut hero))
        .expect("calls");
    assert_eq!(value.get::<i32>()?, &15);
    assert!(changed);
}

#[test]
fn paths_start_from_a_wired_object() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let pet_ref = graph.add_value("pet", read("pet"));
    let hunger = graph.add_value("pet hunger", read("hunger"));
    assert!(value_node(&graph, hunger).output_descriptor().is_none());

    graph.wire(pet_ref, hunger, PATH_ROOT)?;
    assert_eq!(value_node(&graph, hunger).output_descriptor(), Some(i32::DESCRIPTOR));
    graph.initialize(hunger);

    let mut rex = Pet {
        name: "Rex".into(),
        hunger: 7,
    };
    let mut hero = player("Ayla", 3);
    hero.pet = unsafe { ObjectRef::to(&mut rex) };
    graph.advance_tick();
    let (value, _) = graph
        .get_value(hunger, ReflectedMut::of(&mut hero))
        .expect("follows the pet");
    assert_eq!(value.get::<i32>()?, &7);
}

#[test]
fn terminate_drops_caches() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let level = graph.add_value("level", read("level"));
    graph.initialize(level);
    let mut hero = player("Ayla", 3);
    graph.advance_tick();
    graph.get_value(level, ReflectedMut::of(&mut hero));
    assert!(value_node(&graph, level).cached().is_some());

    graph.terminate(level);
    graph.terminate(level);
    assert!(value_node(&graph, level).cached().is_none());
    assert_eq!(value_node(&graph, level).state(), CacheState::Uninitialized);
}
