use std::cell::Cell;

use fastbind::{
    BindingGraph, NodeId,
    destination::{PropertyDestination, VALUE_SOURCE},
    value::PropertyValue,
};
use fastbind_core::{ObjectRef, Reflect, reflect_enum, reflect_struct};
use fastbind_reflect::FieldPath;

#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub enum Mood {
    #[default]
    Calm,
    Angry,
    Sleepy = 5,
    Unused,
}

reflect_enum! {
    Mood { Calm, Angry, Sleepy, #[hidden] Unused }
}

#[derive(Default)]
pub struct Pet {
    pub name: String,
    pub hunger: i32,
}

reflect_struct! {
    Pet: [Default] {
        properties {
            name: String,
            hunger: i32,
        }
    }
}

#[derive(Default)]
pub struct Player {
    pub name: String,
    pub level: i32,
    pub health: i32,
    pub alive: bool,
    pub mood: Mood,
    pub title: String,
    pub shown_level: i32,
    pub pet: ObjectRef<Pet>,
    pub heals: i32,
    pub bonus_calls: Cell<u32>,
    pub rank: u8,
    pub experience: i64,
    pub levels: Vec<i32>,
    pub history: Vec<i64>,
}

impl Player {
    fn bonus(&self) -> i32 {
        self.bonus_calls.set(self.bonus_calls.get() + 1);
        self.level * 10
    }

    fn scaled(&self, factor: i32) -> i32 {
        self.level * factor
    }

    fn boosted(&self, amount: i64) -> i64 {
        self.experience + amount
    }

    fn heal(&mut self, amount: i32) {
        self.health += amount;
        self.heals += 1;
    }
}

reflect_struct! {
    Player: [Default] {
        properties {
            name: String,
            level: i32,
            health: i32,
            alive: bool,
            mood: Mood,
            title: String,
            shown_level: i32,
            pet: ObjectRef<Pet>,
            #[read_only] heals: i32,
            rank: u8,
            experience: i64,
            levels: Vec<i32>,
            history: Vec<i64>,
        }
        functions {
            fn bonus(&self) -> i32;
            fn scaled(&self, factor: i32) -> i32;
            fn boosted(&self, amount: i64) -> i64;
        }
        mutators {
            fn heal(&mut self, amount: i32);
        }
    }
}

pub fn player(name: &str, level: i32) -> Player {
    Player {
        name: name.into(),
        level,
        health: 100,
        alive: true,
        ..Player::default()
    }
}

pub fn path(dotted: &str) -> FieldPath {
    FieldPath::parse(dotted).expect("valid path")
}

pub fn read(dotted: &str) -> PropertyValue {
    PropertyValue::new(path(dotted))
}

pub fn write(dotted: &str) -> PropertyDestination {
    PropertyDestination::new(path(dotted))
}

/// A graph copying `from` into `to` on the player: returns the graph,
/// the reading node and the destination
pub fn copy(from: &str, to: &str) -> (BindingGraph, NodeId, NodeId) {
    let mut graph = BindingGraph::new(Player::DESCRIPTOR);
    let source = graph.add_value(from, read(from));
    let destination = graph.add_destination(to, write(to));
    graph
        .wire(source, destination, VALUE_SOURCE)
        .expect("types line up");
    graph.initialize(destination);
    (graph, source, destination)
}
