//! Observations consumed by monitors.
//!
//! Every event handed to a network is a [`Record`]: a set of named fields, a row of positional
//! fields, or both. Field values are exposed as borrowed [`Datum`] views so that monitors never
//! need to copy an event.
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use pastel_core::record::{Datum, Record};
//!
//! let event = HashMap::from([("time", 1.0), ("speed", 12.5)]);
//!
//! assert_eq!(event.field("speed").and_then(|d| d.as_float()), Some(12.5));
//! assert!(event.field("altitude").is_none());
//!
//! let row = vec!["access", "alice", "wonderland"];
//!
//! assert_eq!(row.width(), 3);
//! assert_eq!(row.position(1).and_then(|d| d.as_str()), Some("alice"));
//! ```

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Debug, Display, Formatter};
use std::hash::{BuildHasher, Hash};

/// Strings that read as `false` when a string field is used as a proposition.
const FALSITY: [&str; 3] = ["0", "false", "False"];

/// Borrowed view of a field value.
#[derive(Clone, Copy)]
pub enum Datum<'a> {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'a str),
    Record(&'a dyn Record),
}

impl<'a> Datum<'a> {
    /// Truthiness of the value. Numbers are true when non-zero, strings unless they spell
    /// a false value.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(value) => Some(value),
            Self::Int(value) => Some(value != 0),
            Self::Float(value) => Some(value != 0.0),
            Self::Str(value) => Some(!FALSITY.contains(&value)),
            Self::Record(_) => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Self::Bool(value) => Some(if value { 1.0 } else { 0.0 }),
            Self::Int(value) => Some(value as f64),
            Self::Float(value) => Some(value),
            Self::Str(value) => value.trim().parse().ok(),
            Self::Record(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&'a dyn Record> {
        match *self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Textual form of a scalar value, used when comparing against string constants and when
    /// binding values to variables.
    pub fn to_key(&self) -> Option<String> {
        match *self {
            Self::Bool(value) => Some(value.to_string()),
            Self::Int(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::Str(value) => Some(value.to_string()),
            Self::Record(_) => None,
        }
    }

    /// Name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Record(_) => "record",
        }
    }
}

impl<'a> Debug for Datum<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "Bool({})", value),
            Self::Int(value) => write!(f, "Int({})", value),
            Self::Float(value) => write!(f, "Float({})", value),
            Self::Str(value) => write!(f, "Str({:?})", value),
            Self::Record(_) => write!(f, "Record(..)"),
        }
    }
}

/// Conversion of a stored value into a [`Datum`] view.
pub trait AsDatum {
    fn as_datum(&self) -> Datum<'_>;
}

impl AsDatum for bool {
    fn as_datum(&self) -> Datum<'_> {
        Datum::Bool(*self)
    }
}

impl AsDatum for i64 {
    fn as_datum(&self) -> Datum<'_> {
        Datum::Int(*self)
    }
}

impl AsDatum for i32 {
    fn as_datum(&self) -> Datum<'_> {
        Datum::Int(i64::from(*self))
    }
}

impl AsDatum for f64 {
    fn as_datum(&self) -> Datum<'_> {
        Datum::Float(*self)
    }
}

impl AsDatum for str {
    fn as_datum(&self) -> Datum<'_> {
        Datum::Str(self)
    }
}

impl AsDatum for &str {
    fn as_datum(&self) -> Datum<'_> {
        Datum::Str(self)
    }
}

impl AsDatum for String {
    fn as_datum(&self) -> Datum<'_> {
        Datum::Str(self.as_str())
    }
}

/// Owned field value, convenient for building heterogeneous events.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Record(BTreeMap<String, Value>),
}

impl AsDatum for Value {
    fn as_datum(&self) -> Datum<'_> {
        match self {
            Self::Bool(value) => Datum::Bool(*value),
            Self::Int(value) => Datum::Int(*value),
            Self::Float(value) => Datum::Float(*value),
            Self::Str(value) => Datum::Str(value.as_str()),
            Self::Record(fields) => Datum::Record(fields),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{}", value),
            Self::Int(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::Str(value) => write!(f, "{:?}", value),
            Self::Record(fields) => {
                write!(f, "{{")?;

                for (index, (name, value)) in fields.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }

                    write!(f, "{}: {}", name, value)?;
                }

                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Trait representing a single observation.
///
/// Named fields are looked up with [`Record::field`], positional fields with
/// [`Record::position`]. A record only needs to implement the access pattern it supports, the
/// other defaults to reporting every field as missing.
pub trait Record {
    /// Return the value of a named field if it exists.
    fn field(&self, name: &str) -> Option<Datum<'_>>;

    /// Return the value of a positional field if it exists.
    fn position(&self, _index: usize) -> Option<Datum<'_>> {
        None
    }

    /// Number of positional fields.
    fn width(&self) -> usize {
        0
    }

    /// Follow a sequence of field names through nested records.
    fn path(&self, path: &[String]) -> Option<Datum<'_>> {
        let (first, rest) = path.split_first()?;
        let mut datum = self.field(first)?;

        for name in rest {
            datum = datum.as_record()?.field(name)?;
        }

        Some(datum)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<Datum<'_>> {
        (**self).field(name)
    }

    fn position(&self, index: usize) -> Option<Datum<'_>> {
        (**self).position(index)
    }

    fn width(&self) -> usize {
        (**self).width()
    }

    fn path(&self, path: &[String]) -> Option<Datum<'_>> {
        (**self).path(path)
    }
}

impl<K, V, S> Record for HashMap<K, V, S>
where
    K: Borrow<str> + Eq + Hash,
    V: AsDatum,
    S: BuildHasher,
{
    fn field(&self, name: &str) -> Option<Datum<'_>> {
        self.get(name).map(AsDatum::as_datum)
    }
}

impl<K, V> Record for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: AsDatum,
{
    fn field(&self, name: &str) -> Option<Datum<'_>> {
        self.get(name).map(AsDatum::as_datum)
    }
}

impl<V: AsDatum> Record for [V] {
    fn field(&self, _name: &str) -> Option<Datum<'_>> {
        None
    }

    fn position(&self, index: usize) -> Option<Datum<'_>> {
        self.get(index).map(AsDatum::as_datum)
    }

    fn width(&self) -> usize {
        self.len()
    }
}

impl<V: AsDatum> Record for Vec<V> {
    fn field(&self, _name: &str) -> Option<Datum<'_>> {
        None
    }

    fn position(&self, index: usize) -> Option<Datum<'_>> {
        self.as_slice().position(index)
    }

    fn width(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_truthiness() {
        assert_eq!(Datum::Str("false").as_bool(), Some(false));
        assert_eq!(Datum::Str("0").as_bool(), Some(false));
        assert_eq!(Datum::Str("yes").as_bool(), Some(true));
        assert_eq!(Datum::Float(0.0).as_bool(), Some(false));
    }

    #[test]
    fn numeric_strings() {
        assert_eq!(Datum::Str(" 2.5").as_float(), Some(2.5));
        assert_eq!(Datum::Str("alice").as_float(), None);
        assert_eq!(Datum::Int(3).to_key().as_deref(), Some("3"));
    }

    #[test]
    fn nested_path() {
        let inner = BTreeMap::from([("speed".to_string(), Value::Float(3.0))]);
        let event = BTreeMap::from([("car".to_string(), Value::Record(inner))]);
        let path = vec!["car".to_string(), "speed".to_string()];

        assert_eq!(event.path(&path).and_then(|d| d.as_float()), Some(3.0));
        assert!(event.path(&["car".to_string(), "gear".to_string()]).is_none());
    }

    #[test]
    fn positional() {
        let row = vec![Value::from("access"), Value::from(3i64)];

        assert_eq!(row.width(), 2);
        assert_eq!(row.position(1).and_then(|d| d.as_float()), Some(3.0));
        assert!(row.position(2).is_none());
        assert!(row.field("access").is_none());
    }

    /// Record resolving dotted names itself instead of through nested records.
    struct Flat(BTreeMap<String, f64>);

    impl Record for Flat {
        fn field(&self, name: &str) -> Option<Datum<'_>> {
            self.0.get(name).copied().map(Datum::Float)
        }

        fn path(&self, path: &[String]) -> Option<Datum<'_>> {
            self.field(&path.join("."))
        }
    }

    #[test]
    fn references_keep_custom_paths() {
        let event = Flat(BTreeMap::from([("car.speed".to_string(), 3.0)]));
        let path = vec!["car".to_string(), "speed".to_string()];

        fn lookup<R: Record>(record: R, path: &[String]) -> Option<f64> {
            record.path(path).and_then(|d| d.as_float())
        }

        assert_eq!(event.path(&path).and_then(|d| d.as_float()), Some(3.0));
        assert_eq!(lookup(&event, &path), Some(3.0));
        assert_eq!(lookup(&&event, &path), Some(3.0));
    }
}
