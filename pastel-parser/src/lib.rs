//! Parse past-time temporal logic formulas from strings into [`Formula`] values.
//!
//! The syntax, from the loosest to the tightest binding operator:
//!
//! | operator     | syntax                                       |
//! | ------------ | -------------------------------------------- |
//! | quantifiers  | `exists[x, y]. φ`, `E[x]. φ`, `forall[x]. φ`, `A[x]. φ` |
//! | implication  | `φ -> ψ`, `φ implies ψ` (right associative)  |
//! | disjunction  | `φ \|\| ψ`, `φ or ψ`                          |
//! | conjunction  | `φ && ψ`, `φ and ψ`                          |
//! | since        | `φ S ψ`, `φ since[a:b] ψ`                    |
//! | unary        | `!φ`, `not φ`, `Y φ`, `pre φ`, `P[a:b] φ`, `once φ`, `H φ`, `historically[a:] φ` |
//!
//! Atoms are either records of field tests, `{door, speed > 3, user: alice, file: *f}`, or
//! positional listings, `[access, "alice", *file]`. Time bounds are written `[a:b]`, `[a:]`,
//! `[a:inf]` or `[:b]`.
//!
//! ```rust
//! use pastel_core::formula::{Comparison, Formula, TimeBound};
//! use pastel_parser::parse_formula;
//!
//! let phi = parse_formula("once[12:24] {x > 0}").unwrap();
//! let expected = Formula::compare("x", Comparison::Gt, 0.0).once_within(TimeBound::new(12.0, 24.0));
//!
//! assert_eq!(phi, expected);
//! ```

mod parser;

pub use pastel_core::formula::Formula;

pub use parser::{parse_formula, ParseError};
