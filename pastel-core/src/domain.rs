//! Value domains of the evaluation networks.
//!
//! A [`Domain`] supplies the lattice used to evaluate every operator of a formula: a join for
//! disjunction and existential temporal operators, a meet for conjunction and universal temporal
//! operators, a negation, and the interpretation of atoms against the fields of an event. Three
//! domains are provided:
//!
//!   - [`Boolean`], the classical two-valued semantics,
//!   - [`Robustness`], the quantitative semantics over the extended reals,
//!   - [`BindingManager`], sets of variable bindings encoded as decision diagrams.
//!
//! The data domain needs mutable access to its decision diagram for every operation, which is
//! why every lattice operation receives `&mut self`.

use std::convert::Infallible;
use std::fmt::Debug;

use pastel_bdd::{BindingManager, Ref};

use crate::error::{EvaluationError, FormulaError};
use crate::formula::{Comparison, FieldTest};
use crate::metrics::{Bottom, Join, Meet, Top};
use crate::options::Options;
use crate::record::Datum;

/// Set of variable bindings produced by the data domain.
pub type Set = Ref;

/// Kind of a quantifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Exists,
    Forall,
}

/// Lattice of values computed by a network.
pub trait Domain {
    type Value: Clone + PartialEq + Debug;

    /// Prepared form of a quantifier, produced once at construction.
    type Projection: Debug;

    /// Name of the domain, used in diagnostics.
    const NAME: &'static str;

    /// Create the domain used by a network configured with `options`.
    fn from_options(options: &Options) -> Self
    where
        Self: Sized;

    fn top(&self) -> Self::Value;

    fn bottom(&self) -> Self::Value;

    fn join(&mut self, left: &Self::Value, right: &Self::Value) -> Self::Value;

    fn meet(&mut self, left: &Self::Value, right: &Self::Value) -> Self::Value;

    fn negate(&mut self, value: &Self::Value) -> Self::Value;

    fn implies(&mut self, left: &Self::Value, right: &Self::Value) -> Self::Value {
        let negated = self.negate(left);
        self.join(&negated, right)
    }

    /// Check at construction time that the domain can evaluate `test`.
    fn accepts(&self, test: &FieldTest) -> Result<(), FormulaError>;

    /// Evaluate `test` against the value of the field `name`.
    ///
    /// `None` is returned when the previous value of the test should be kept, which is how
    /// missing fields are handled by domains that tolerate them.
    fn test(
        &mut self,
        test: &FieldTest,
        name: &str,
        datum: Option<Datum<'_>>,
    ) -> Result<Option<Self::Value>, EvaluationError>;

    fn projection(&mut self, quantifier: Quantifier, variables: &[String]) -> Result<Self::Projection, FormulaError>;

    fn project(&mut self, projection: &Self::Projection, value: &Self::Value) -> Self::Value;
}

/// Whether a present field passes a non-binding test.
///
/// Bindings are resolved by the data domain, elsewhere they only require the field to exist.
fn satisfies(test: &FieldTest, name: &str, datum: Datum<'_>) -> Result<bool, EvaluationError> {
    match test {
        FieldTest::Truthy => datum
            .as_bool()
            .ok_or_else(|| EvaluationError::mismatch(name, "bool", datum.kind())),
        FieldTest::Bool(expected) => datum
            .as_bool()
            .map(|value| value == *expected)
            .ok_or_else(|| EvaluationError::mismatch(name, "bool", datum.kind())),
        FieldTest::String(expected) => datum
            .to_key()
            .map(|value| value == *expected)
            .ok_or_else(|| EvaluationError::mismatch(name, "string", datum.kind())),
        FieldTest::Compare(comparison, constant) => datum
            .as_float()
            .map(|value| comparison.holds(value, *constant))
            .ok_or_else(|| EvaluationError::mismatch(name, "number", datum.kind())),
        FieldTest::Any | FieldTest::Bind(_) => Ok(true),
    }
}

/// Two-valued semantics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Boolean;

impl Domain for Boolean {
    type Value = bool;
    type Projection = Infallible;

    const NAME: &'static str = "boolean";

    fn from_options(_: &Options) -> Self {
        Self
    }

    fn top(&self) -> bool {
        bool::top()
    }

    fn bottom(&self) -> bool {
        bool::bottom()
    }

    fn join(&mut self, left: &bool, right: &bool) -> bool {
        Join::max(left, right)
    }

    fn meet(&mut self, left: &bool, right: &bool) -> bool {
        Meet::min(left, right)
    }

    fn negate(&mut self, value: &bool) -> bool {
        !value
    }

    fn accepts(&self, test: &FieldTest) -> Result<(), FormulaError> {
        match test {
            FieldTest::Bind(name) => Err(FormulaError::unsupported(format!(
                "variable *{} requires the data setting",
                name
            ))),
            _ => Ok(()),
        }
    }

    fn test(&mut self, test: &FieldTest, name: &str, datum: Option<Datum<'_>>) -> Result<Option<bool>, EvaluationError> {
        match (test, datum) {
            (FieldTest::Any, datum) => Ok(Some(datum.is_some())),
            (_, None) => Ok(None),
            (test, Some(datum)) => satisfies(test, name, datum).map(Some),
        }
    }

    fn projection(&mut self, _: Quantifier, variables: &[String]) -> Result<Infallible, FormulaError> {
        Err(FormulaError::unsupported(format!(
            "quantifier over [{}] requires the data setting",
            variables.join(", ")
        )))
    }

    fn project(&mut self, projection: &Infallible, _: &bool) -> bool {
        match *projection {}
    }
}

/// Quantitative semantics over the extended reals.
///
/// Positive values mean the formula is satisfied, negative values that it is violated, and the
/// magnitude measures the distance to the opposite verdict. Tests without a numeric reading
/// evaluate to `±∞`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Robustness;

fn verdict(holds: bool) -> f64 {
    if holds {
        f64::top()
    } else {
        f64::bottom()
    }
}

impl Domain for Robustness {
    type Value = f64;
    type Projection = Infallible;

    const NAME: &'static str = "robustness";

    fn from_options(_: &Options) -> Self {
        Self
    }

    fn top(&self) -> f64 {
        f64::top()
    }

    fn bottom(&self) -> f64 {
        f64::bottom()
    }

    fn join(&mut self, left: &f64, right: &f64) -> f64 {
        Join::max(left, right)
    }

    fn meet(&mut self, left: &f64, right: &f64) -> f64 {
        Meet::min(left, right)
    }

    fn negate(&mut self, value: &f64) -> f64 {
        -value
    }

    fn accepts(&self, test: &FieldTest) -> Result<(), FormulaError> {
        match test {
            FieldTest::Bind(name) => Err(FormulaError::unsupported(format!(
                "variable *{} cannot be evaluated with robustness semantics",
                name
            ))),
            FieldTest::Compare(comparison @ (Comparison::Eq | Comparison::Ne), _) => Err(FormulaError::unsupported(
                format!("comparison {} has no robustness semantics", comparison.symbol()),
            )),
            _ => Ok(()),
        }
    }

    fn test(&mut self, test: &FieldTest, name: &str, datum: Option<Datum<'_>>) -> Result<Option<f64>, EvaluationError> {
        let Some(datum) = datum else {
            return match test {
                FieldTest::Any => Ok(Some(f64::bottom())),
                _ => Err(EvaluationError::missing(name)),
            };
        };

        let number = || {
            datum
                .as_float()
                .ok_or_else(|| EvaluationError::mismatch(name, "number", datum.kind()))
        };

        let value = match test {
            FieldTest::Truthy => match datum {
                Datum::Bool(value) => verdict(value),
                _ => number()?,
            },
            FieldTest::Compare(Comparison::Gt | Comparison::Ge, constant) => number()? - constant,
            FieldTest::Compare(Comparison::Lt | Comparison::Le, constant) => constant - number()?,
            test => verdict(satisfies(test, name, datum)?),
        };

        Ok(Some(value))
    }

    fn projection(&mut self, _: Quantifier, variables: &[String]) -> Result<Infallible, FormulaError> {
        Err(FormulaError::unsupported(format!(
            "quantifier over [{}] cannot be evaluated with robustness semantics",
            variables.join(", ")
        )))
    }

    fn project(&mut self, projection: &Infallible, _: &f64) -> f64 {
        match *projection {}
    }
}

/// Quantifier prepared against a [`BindingManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    quantifier: Quantifier,
    cube: Ref,
}

impl Domain for BindingManager {
    type Value = Set;
    type Projection = Projection;

    const NAME: &'static str = "data";

    fn from_options(options: &Options) -> Self {
        BindingManager::new(options.bits())
    }

    fn top(&self) -> Set {
        self.one()
    }

    fn bottom(&self) -> Set {
        self.zero()
    }

    fn join(&mut self, left: &Set, right: &Set) -> Set {
        self.or(*left, *right)
    }

    fn meet(&mut self, left: &Set, right: &Set) -> Set {
        self.and(*left, *right)
    }

    fn negate(&mut self, value: &Set) -> Set {
        self.not(*value)
    }

    fn implies(&mut self, left: &Set, right: &Set) -> Set {
        BindingManager::implies(self, *left, *right)
    }

    fn accepts(&self, _: &FieldTest) -> Result<(), FormulaError> {
        Ok(())
    }

    fn test(&mut self, test: &FieldTest, name: &str, datum: Option<Datum<'_>>) -> Result<Option<Set>, EvaluationError> {
        let verdict = |holds: bool| if holds { Ref::ONE } else { Ref::ZERO };

        match (test, datum) {
            (FieldTest::Any, datum) => Ok(Some(verdict(datum.is_some()))),
            (_, None) => Ok(None),
            (FieldTest::Bind(variable), Some(datum)) => {
                let value = datum
                    .to_key()
                    .ok_or_else(|| EvaluationError::mismatch(name, "scalar", datum.kind()))?;

                Ok(Some(self.assign(variable, &value)?))
            }
            (test, Some(datum)) => satisfies(test, name, datum).map(|holds| Some(verdict(holds))),
        }
    }

    fn projection(&mut self, quantifier: Quantifier, variables: &[String]) -> Result<Projection, FormulaError> {
        if variables.is_empty() {
            return Err(FormulaError::malformed("quantifier without variables"));
        }

        Ok(Projection {
            quantifier,
            cube: self.cube(variables),
        })
    }

    fn project(&mut self, projection: &Projection, value: &Set) -> Set {
        match projection.quantifier {
            Quantifier::Exists => self.exists(*value, projection.cube),
            Quantifier::Forall => self.forall(*value, projection.cube),
        }
    }
}
