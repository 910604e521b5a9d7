use fastbind::{
    BindingGraph, Expect, LiteralDefault, Node, NodeId,
    destination::VALUE_SOURCE,
    list_item_name,
    value::{FALLBACK, FALSE, RESULT_VALUE, SELECT_VALUE, SELECTOR, SelectValue, TRUE},
};
use fastbind_core::{Reflect, reflect_enum, reflect_struct};
use fastbind_reflect::ReflectedMut;
use fastbind_testhelpers::test;

use crate::host::{Mood, Player, player, read, write};

fn item_names(graph: &BindingGraph, id: NodeId) -> Vec<String> {
    graph
        .node(id)
        .expect("node")
        .items()
        .iter()
        .map(|item| item.name().to_owned())
        .collect()
}

fn text(graph: &mut BindingGraph, id: NodeId, hero: &mut Player) -> Option<String> {
    let (value, _) = graph.get_value(id, ReflectedMut::of(hero))?;
    value.get::<String>().ok().cloned()
}

fn set(graph: &mut BindingGraph, id: NodeId, item: &str, text: &str) {
    graph
        .set_default(id, item, Some(LiteralDefault::text(text)))
        .expect("item exists");
}

#[test]
fn unconfigured_select_has_one_mapping() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let select = graph.add_value("select", SelectValue::new());
    assert_eq!(
        item_names(&graph, select),
        [
            SELECTOR.to_owned(),
            FALLBACK.to_owned(),
            list_item_name(SELECT_VALUE, 0),
            list_item_name(RESULT_VALUE, 0),
        ]
    );
}

#[test]
fn bool_selectors_pick_true_or_false() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let select = graph.add_value("select", SelectValue::new());
    let alive = graph.add_value("alive", read("alive"));
    graph.wire(alive, select, SELECTOR)?;
    assert_eq!(item_names(&graph, select), [SELECTOR, TRUE, FALSE]);

    set(&mut graph, select, TRUE, "Alive");
    set(&mut graph, select, FALSE, "Fallen");
    graph.initialize(select);

    let mut hero = player("Ayla", 3);
    graph.advance_tick();
    assert_eq!(text(&mut graph, select, &mut hero).as_deref(), Some("Alive"));

    hero.alive = false;
    graph.advance_tick();
    let (value, changed) = graph
        .get_value(select, ReflectedMut::of(&mut hero))
        .expect("selects");
    assert_eq!(value.get::<String>()?, "Fallen");
    assert!(changed);
}

#[test]
fn enum_selectors_pick_the_item_named_after_the_variant() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let select = graph.add_value("select", SelectValue::new());
    let mood = graph.add_value("mood", read("mood"));
    graph.wire(mood, select, SELECTOR)?;
    assert_eq!(
        item_names(&graph, select),
        [SELECTOR, "Calm", "Angry", "Sleepy"]
    );

    set(&mut graph, select, "Calm", "calm");
    set(&mut graph, select, "Angry", "grr");
    set(&mut graph, select, "Sleepy", "zzz");
    graph.initialize(select);

    let mut hero = player("Ayla", 3);
    hero.mood = Mood::Sleepy;
    graph.advance_tick();
    assert_eq!(text(&mut graph, select, &mut hero).as_deref(), Some("zzz"));

    hero.mood = Mood::Angry;
    graph.advance_tick();
    assert_eq!(text(&mut graph, select, &mut hero).as_deref(), Some("grr"));

    hero.mood = Mood::Unused;
    graph.advance_tick();
    assert_eq!(text(&mut graph, select, &mut hero), None);
}

#[derive(Clone, Copy, Default, PartialEq, Debug)]
enum Pick {
    #[default]
    Bar,
    Baz,
    Foo,
}

reflect_enum! {
    Pick { Bar, Baz, Foo }
}

#[derive(Default)]
struct Sign {
    pick: Pick,
}

reflect_struct! {
    Sign: [Default] {
        properties {
            pick: Pick,
        }
    }
}

#[test]
fn enum_selectors_go_by_the_enumerator_value() {
    let mut graph = BindingGraph::new(Sign::DESCRIPTOR);
    let select = graph.add_value("select", SelectValue::new());
    let pick = graph.add_value("pick", read("pick"));
    graph.wire(pick, select, SELECTOR)?;
    set(&mut graph, select, "Bar", "bar");
    set(&mut graph, select, "Baz", "baz");
    set(&mut graph, select, "Foo", "foo");
    graph.initialize(select);

    let mut sign = Sign { pick: Pick::Foo };
    assert_eq!(Pick::Foo as i64, 2);
    graph.advance_tick();
    let (value, _) = graph
        .get_value(select, ReflectedMut::of(&mut sign))
        .expect("selects");
    assert_eq!(value.get::<String>()?, "foo");
}

#[test]
fn other_selectors_compare_against_each_mapping() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let select = graph.add_value("select", SelectValue::new().with_mappings(2));
    let level = graph.add_value("level", read("level"));
    graph.wire(level, select, SELECTOR)?;
    let compared = graph
        .node(select)
        .and_then(|node: &Node| node.item(&list_item_name(SELECT_VALUE, 1)))
        .map(|item| item.expect());
    assert_eq!(compared, Some(Expect::Exactly(i32::DESCRIPTOR)));

    set(&mut graph, select, &list_item_name(SELECT_VALUE, 0), "1");
    set(&mut graph, select, &list_item_name(RESULT_VALUE, 0), "novice");
    set(&mut graph, select, &list_item_name(SELECT_VALUE, 1), "10");
    set(&mut graph, select, &list_item_name(RESULT_VALUE, 1), "veteran");
    graph.initialize(select);

    let mut hero = player("Ayla", 10);
    graph.advance_tick();
    assert_eq!(text(&mut graph, select, &mut hero).as_deref(), Some("veteran"));

    hero.level = 1;
    graph.advance_tick();
    assert_eq!(text(&mut graph, select, &mut hero).as_deref(), Some("novice"));

    // no mapping and no fallback
    hero.level = 5;
    graph.advance_tick();
    assert_eq!(text(&mut graph, select, &mut hero), None);

    set(&mut graph, select, FALLBACK, "unknown");
    assert_eq!(text(&mut graph, select, &mut hero).as_deref(), Some("unknown"));
}

#[test]
fn select_takes_the_type_its_consumer_expects() {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let select = graph.add_value("select", SelectValue::new());
    let alive = graph.add_value("alive", read("alive"));
    graph.wire(alive, select, SELECTOR)?;
    let shown = graph.add_destination("shown", write("shown_level"));
    graph.wire(select, shown, VALUE_SOURCE)?;

    let node = graph.node(select).expect("select");
    assert_eq!(
        node.value().and_then(|value| value.output_descriptor()),
        Some(i32::DESCRIPTOR)
    );
    assert_eq!(
        node.item(TRUE).map(|item| item.expect()),
        Some(Expect::Exactly(i32::DESCRIPTOR))
    );

    set(&mut graph, select, TRUE, "99");
    set(&mut graph, select, FALSE, "0");
    graph.initialize(shown);

    let mut hero = player("Ayla", 3);
    graph.advance_tick();
    assert!(graph.update(shown, ReflectedMut::of(&mut hero), None));
    assert_eq!(hero.shown_level, 99);
}
