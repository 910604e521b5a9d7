#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![doc = include_str!("../README.md")]

extern crate alloc;

#[cfg(feature = "log")]
macro_rules! trace {
    ($($tt:tt)*) => {
        log::trace!($($tt)*)
    };
}

#[cfg(not(feature = "log"))]
macro_rules! trace {
    ($($tt:tt)*) => {
        if false {
            let _ = ::core::format_args!($($tt)*);
        }
    };
}

mod error;
pub use error::*;

mod value;
pub use value::*;

mod owned;
pub use owned::*;

mod scratch;
pub use scratch::*;

mod member;
pub use member::*;

mod path;
pub use path::*;

mod call;
pub use call::*;
