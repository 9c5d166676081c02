//! Finite-domain sets for data-parameterized monitoring.
//!
//! Data monitors evaluate formulas whose atoms bind event fields to logical variables, for
//! example `exists[file].{action: access, user: alice, name: *file}`. The value of such a
//! formula is the set of variable bindings that satisfy it. This crate represents those sets
//! symbolically with reduced ordered binary decision diagrams.
//!
//! The [`Bdd`] manager owns every diagram node and provides the boolean algebra along with
//! existential and universal abstraction. The [`BindingManager`] sits on top of it and maps
//! named logical variables and their observed values onto blocks of boolean variables.

pub mod bdd;
pub mod bindings;

#[doc(inline)]
pub use crate::bdd::{Bdd, Ref};

#[doc(inline)]
pub use crate::bindings::{BindingManager, DomainExhausted, DEFAULT_BITS};
