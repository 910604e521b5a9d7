mod host;

mod defaults;
mod destinations;
mod errors;
mod select;
mod setters;
mod values;
