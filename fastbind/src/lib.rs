#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod error;
pub use error::*;

mod eval;

mod policy;
pub use policy::*;

mod item;
pub use item::*;

mod setter;
pub use setter::*;

mod graph;
pub use graph::*;

pub mod value;
pub use value::{ValueKind, ValueNode};

pub mod destination;
pub use destination::{DestinationKind, DestinationNode};

mod notify;
pub use notify::*;

mod binding;
pub use binding::*;

mod registry;
pub use registry::*;
