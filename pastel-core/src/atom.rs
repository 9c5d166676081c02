//! Evaluation of atoms against events.

use crate::domain::Domain;
use crate::error::{EvaluationError, FormulaError};
use crate::formula::{Atom, FieldPath, FieldTest};
use crate::record::{Datum, Record};

#[derive(Debug, Clone)]
enum Access {
    Path(FieldPath),
    Position(usize),
}

/// A single field test together with the last value it produced.
#[derive(Debug, Clone)]
pub(crate) struct Field<V> {
    access: Access,
    name: String,
    pub(crate) test: FieldTest,
    held: V,
}

impl<V> Field<V> {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Value of the test at the last event in which its field was present.
    pub(crate) fn held(&self) -> &V {
        &self.held
    }

    pub(crate) fn lookup<'a, R: Record + ?Sized>(&self, record: &'a R) -> Option<Datum<'a>> {
        match &self.access {
            Access::Path(path) => record.path(path.names()),
            Access::Position(index) => record.position(*index),
        }
    }
}

/// Conjunction of field tests holding the last known value of each test.
///
/// A test whose field is missing keeps the value it had at the previous event. Before any
/// value is known a test evaluates to the bottom of the domain.
#[derive(Debug, Clone)]
pub(crate) struct Tests<V> {
    fields: Vec<Field<V>>,
    width: Option<usize>,
}

impl<V: Clone> Tests<V> {
    pub(crate) fn new<D>(domain: &D, atom: &Atom) -> Result<Self, FormulaError>
    where
        D: Domain<Value = V>,
    {
        let (fields, width) = match atom {
            Atom::Record(fields) => {
                let fields = fields
                    .iter()
                    .map(|(path, test)| (Access::Path(path.clone()), path.to_string(), test.clone()))
                    .collect::<Vec<_>>();

                (fields, None)
            }
            Atom::Listing(tests) => {
                let fields = tests
                    .iter()
                    .enumerate()
                    .map(|(index, test)| (Access::Position(index), format!("[{}]", index), test.clone()))
                    .collect::<Vec<_>>();

                (fields, Some(tests.len()))
            }
        };

        if width.is_none() && fields.is_empty() {
            return Err(FormulaError::malformed("record atom without fields"));
        }

        let fields = fields
            .into_iter()
            .map(|(access, name, test)| {
                domain.accepts(&test)?;

                Ok(Field {
                    access,
                    name,
                    test,
                    held: domain.bottom(),
                })
            })
            .collect::<Result<Vec<_>, FormulaError>>()?;

        Ok(Self { fields, width })
    }

    pub(crate) fn fields(&self) -> &[Field<V>] {
        &self.fields
    }

    /// Whether the event has the shape required by the atom.
    pub(crate) fn matches_shape<R: Record + ?Sized>(&self, record: &R) -> bool {
        self.width.map_or(true, |width| record.width() == width)
    }

    /// Refresh the held value of every field from `record`.
    pub(crate) fn refresh<D, R>(&mut self, domain: &mut D, record: &R) -> Result<(), EvaluationError>
    where
        D: Domain<Value = V>,
        R: Record + ?Sized,
    {
        for field in &mut self.fields {
            let datum = field.lookup(record);

            if let Some(value) = domain.test(&field.test, &field.name, datum)? {
                field.held = value;
            }
        }

        Ok(())
    }

    /// Meet of the held values, or the bottom of the domain if `shape` is false.
    pub(crate) fn value<D>(&self, domain: &mut D, shape: bool) -> V
    where
        D: Domain<Value = V>,
    {
        if !shape {
            return domain.bottom();
        }

        self.fields
            .iter()
            .fold(domain.top(), |acc, field| domain.meet(&acc, &field.held))
    }

    /// Refresh from `record` and return the value of the atom for it.
    pub(crate) fn evaluate<D, R>(&mut self, domain: &mut D, record: &R) -> Result<V, EvaluationError>
    where
        D: Domain<Value = V>,
        R: Record + ?Sized,
    {
        let shape = self.matches_shape(record);

        if shape {
            self.refresh(domain, record)?;
        }

        Ok(self.value(domain, shape))
    }
}
