//! Abstract syntax of past-time temporal formulas.
//!
//! A [`Formula`] is a tree of operators over atoms. Atoms test the fields of the current event:
//! a record atom `{speed > 10, gear: 3}` tests named fields, a listing atom
//! `[access, alice, *file]` tests positional fields. Temporal operators look into the past,
//! optionally restricted to a [`TimeBound`] window.
//!
//! Formulas are usually produced by a parser, but they can also be built programmatically:
//!
//! ```rust
//! use pastel_core::formula::{Comparison, Formula, TimeBound};
//!
//! // once[12:24] {x > 0}
//! let phi = Formula::compare("x", Comparison::Gt, 0.0).once_within(TimeBound::new(12.0, 24.0));
//!
//! assert_eq!(phi.to_string(), "once[12:24]({x > 0})");
//! ```

use std::fmt::{Display, Formatter};

/// Comparison operator of a threshold test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Comparison {
    pub fn holds(&self, value: f64, constant: f64) -> bool {
        match self {
            Self::Lt => value < constant,
            Self::Le => value <= constant,
            Self::Gt => value > constant,
            Self::Ge => value >= constant,
            Self::Eq => value == constant,
            Self::Ne => value != constant,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

/// Test applied to a single field of an event.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldTest {
    /// The field is truthy, `{door}`.
    Truthy,

    /// The field equals a boolean literal, `{door: true}`.
    Bool(bool),

    /// The field equals a string literal, `{user: alice}`.
    String(String),

    /// The field compares against a numeric constant, `{speed > 3}` or `{gear: 3}`.
    Compare(Comparison, f64),

    /// The field is present, `{user: *}`.
    Any,

    /// The field value is bound to a data variable, `{user: *u}`.
    Bind(String),
}

/// Dotted path to a possibly nested field, `car.speed`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::new(path.split('.'))
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self::from(path.as_str())
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Conjunction of tests over the fields of the current event.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    /// Tests on named fields.
    Record(Vec<(FieldPath, FieldTest)>),

    /// Tests on positional fields. An event with a different number of positional fields does
    /// not satisfy the atom.
    Listing(Vec<FieldTest>),
}

/// Window `[lower, upper]` of past time relative to the present. A missing upper bound means
/// the window extends to the beginning of time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBound {
    pub lower: f64,
    pub upper: Option<f64>,
}

impl TimeBound {
    /// The window `[lower, upper]`.
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper: Some(upper),
        }
    }

    /// The window `[lower, ∞)`.
    pub fn at_least(lower: f64) -> Self {
        Self { lower, upper: None }
    }

    /// The window `[0, upper]`.
    pub fn at_most(upper: f64) -> Self {
        Self::new(0.0, upper)
    }
}

impl Display for TimeBound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.upper {
            Some(upper) => write!(f, "[{}:{}]", self.lower, upper),
            None => write!(f, "[{}:]", self.lower),
        }
    }
}

/// Past-time temporal formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    Atom(Atom),
    Not(Box<Formula>),
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
    Implies(Box<Formula>, Box<Formula>),

    /// Value of the subformula at the previous step.
    Previous(Box<Formula>),

    /// The subformula held at some point of the window.
    Once(Option<TimeBound>, Box<Formula>),

    /// The subformula held at every point of the window.
    Historically(Option<TimeBound>, Box<Formula>),

    /// `left` has held ever since `right` held at some point of the window.
    Since(Option<TimeBound>, Box<Formula>, Box<Formula>),

    Exists(Vec<String>, Box<Formula>),
    Forall(Vec<String>, Box<Formula>),
}

impl Formula {
    /// Record atom testing the truthiness of a single field.
    pub fn prop(name: &str) -> Self {
        Self::field(name, FieldTest::Truthy)
    }

    /// Record atom comparing a single field against a constant.
    pub fn compare(name: &str, comparison: Comparison, constant: f64) -> Self {
        Self::field(name, FieldTest::Compare(comparison, constant))
    }

    /// Record atom with a single field test.
    pub fn field(name: &str, test: FieldTest) -> Self {
        Self::record([(name, test)])
    }

    pub fn record<I, P>(fields: I) -> Self
    where
        I: IntoIterator<Item = (P, FieldTest)>,
        P: Into<FieldPath>,
    {
        Self::Atom(Atom::Record(
            fields.into_iter().map(|(path, test)| (path.into(), test)).collect(),
        ))
    }

    pub fn listing<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = FieldTest>,
    {
        Self::Atom(Atom::Listing(fields.into_iter().collect()))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    pub fn implies(self, other: Self) -> Self {
        Self::Implies(Box::new(self), Box::new(other))
    }

    pub fn previous(self) -> Self {
        Self::Previous(Box::new(self))
    }

    pub fn once(self) -> Self {
        Self::Once(None, Box::new(self))
    }

    pub fn once_within(self, bound: TimeBound) -> Self {
        Self::Once(Some(bound), Box::new(self))
    }

    pub fn historically(self) -> Self {
        Self::Historically(None, Box::new(self))
    }

    pub fn historically_within(self, bound: TimeBound) -> Self {
        Self::Historically(Some(bound), Box::new(self))
    }

    /// `self` since `other`.
    pub fn since(self, other: Self) -> Self {
        Self::Since(None, Box::new(self), Box::new(other))
    }

    pub fn since_within(self, bound: TimeBound, other: Self) -> Self {
        Self::Since(Some(bound), Box::new(self), Box::new(other))
    }

    pub fn exists<I, S>(variables: I, body: Self) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Exists(variables.into_iter().map(Into::into).collect(), Box::new(body))
    }

    pub fn forall<I, S>(variables: I, body: Self) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Forall(variables.into_iter().map(Into::into).collect(), Box::new(body))
    }

    /// Immediate subformulas, left to right.
    pub fn children(&self) -> Vec<&Formula> {
        match self {
            Self::Atom(_) => Vec::new(),
            Self::Not(arg)
            | Self::Previous(arg)
            | Self::Once(_, arg)
            | Self::Historically(_, arg)
            | Self::Exists(_, arg)
            | Self::Forall(_, arg) => vec![arg],
            Self::And(left, right)
            | Self::Or(left, right)
            | Self::Implies(left, right)
            | Self::Since(_, left, right) => vec![left, right],
        }
    }

    /// Name of the top-level operator.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Atom(Atom::Record(_)) => "record",
            Self::Atom(Atom::Listing(_)) => "listing",
            Self::Not(_) => "negation",
            Self::And(..) => "conjunction",
            Self::Or(..) => "disjunction",
            Self::Implies(..) => "implication",
            Self::Previous(_) => "previous",
            Self::Once(None, _) => "past_sometime",
            Self::Once(Some(_), _) => "past_sometime_bounded",
            Self::Historically(None, _) => "past_always",
            Self::Historically(Some(_), _) => "past_always_bounded",
            Self::Since(None, ..) => "since",
            Self::Since(Some(_), ..) => "since_bounded",
            Self::Exists(..) => "exists",
            Self::Forall(..) => "forall",
        }
    }

    /// Whether any atom of the formula binds a data variable.
    pub fn has_bindings(&self) -> bool {
        let binds = |test: &FieldTest| matches!(test, FieldTest::Bind(_));

        match self {
            Self::Atom(Atom::Record(fields)) => fields.iter().any(|(_, test)| binds(test)),
            Self::Atom(Atom::Listing(fields)) => fields.iter().any(binds),
            Self::Exists(..) | Self::Forall(..) => true,
            other => other.children().into_iter().any(Formula::has_bindings),
        }
    }
}

impl Display for FieldTest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truthy => Ok(()),
            Self::Bool(value) => write!(f, ": {}", value),
            Self::String(value) => write!(f, ": {:?}", value),
            Self::Compare(Comparison::Eq, value) => write!(f, ": {}", value),
            Self::Compare(comparison, value) => write!(f, " {} {}", comparison.symbol(), value),
            Self::Any => write!(f, ": *"),
            Self::Bind(name) => write!(f, ": *{}", name),
        }
    }
}

fn listing_item(test: &FieldTest) -> String {
    match test {
        FieldTest::Truthy => "true".to_string(),
        FieldTest::Bool(value) => value.to_string(),
        FieldTest::String(value) => format!("{:?}", value),
        FieldTest::Compare(Comparison::Eq, value) => value.to_string(),
        FieldTest::Compare(comparison, value) => format!("{} {}", comparison.symbol(), value),
        FieldTest::Any => "*".to_string(),
        FieldTest::Bind(name) => format!("*{}", name),
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Record(fields) => {
                let fields = fields
                    .iter()
                    .map(|(path, test)| format!("{}{}", path, test))
                    .collect::<Vec<_>>();

                write!(f, "{{{}}}", fields.join(", "))
            }
            Self::Listing(fields) => {
                let fields = fields.iter().map(listing_item).collect::<Vec<_>>();
                write!(f, "[{}]", fields.join(", "))
            }
        }
    }
}

fn bound(bound: &Option<TimeBound>) -> String {
    bound.map(|b| b.to_string()).unwrap_or_default()
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Atom(atom) => write!(f, "{}", atom),
            Self::Not(arg) => write!(f, "!({})", arg),
            Self::And(left, right) => write!(f, "({}) && ({})", left, right),
            Self::Or(left, right) => write!(f, "({}) || ({})", left, right),
            Self::Implies(left, right) => write!(f, "({}) -> ({})", left, right),
            Self::Previous(arg) => write!(f, "pre({})", arg),
            Self::Once(b, arg) => write!(f, "once{}({})", bound(b), arg),
            Self::Historically(b, arg) => write!(f, "historically{}({})", bound(b), arg),
            Self::Since(b, left, right) => write!(f, "({}) since{} ({})", left, bound(b), right),
            Self::Exists(vars, arg) => write!(f, "exists[{}]. {}", vars.join(", "), arg),
            Self::Forall(vars, arg) => write!(f, "forall[{}]. {}", vars.join(", "), arg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round() {
        let phi = Formula::prop("p").since(Formula::compare("x", Comparison::Le, 2.5));
        assert_eq!(phi.to_string(), "({p}) since ({x <= 2.5})");

        let psi = Formula::exists(
            ["file"],
            Formula::listing([
                FieldTest::String("access".into()),
                FieldTest::Any,
                FieldTest::Bind("file".into()),
            ]),
        );
        assert_eq!(psi.to_string(), "exists[file]. [\"access\", *, *file]");
    }

    #[test]
    fn dotted_paths() {
        let path = FieldPath::from("car.speed");
        assert_eq!(path.names(), &["car".to_string(), "speed".to_string()]);
        assert_eq!(path.to_string(), "car.speed");
    }

    #[test]
    fn bindings() {
        assert!(!Formula::prop("p").once().has_bindings());
        assert!(Formula::field("user", FieldTest::Bind("u".into())).not().has_bindings());
        assert!(Formula::exists(["u"], Formula::prop("p")).has_bindings());
    }

    #[test]
    fn bounds() {
        assert_eq!(TimeBound::at_most(3.0), TimeBound::new(0.0, 3.0));
        assert_eq!(TimeBound::at_least(2.0).to_string(), "[2:]");
    }
}
