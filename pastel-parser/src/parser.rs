mod atoms;
mod common;
mod errors;
mod formula;
mod operators;

pub use errors::ParseError;
pub use formula::parse_formula;
