//! Operator networks built from formulas.
//!
//! Every subformula of a monitored formula becomes one entry of an [`Arena`]. Entries are either
//! stateless nodes, whose value is a pure function of the values of their children, or states,
//! which carry history and must be updated exactly once per event. Entries refer to their
//! children by [`NodeId`], so the whole network is owned by the arena.
//!
//! Construction walks the formula bottom-up and returns, along with the identifier of the built
//! entry, the list of states of the subformula in update order. A state is appended only after
//! the states of all its descendants, so updating the list front to back always sees fresh
//! child values.

use std::fmt::{Display, Formatter};

use log::debug;

use crate::domain::{Domain, Quantifier};
use crate::error::FormulaError;
use crate::formula::{Formula, TimeBound};

/// Identifier of an entry in a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stateless operator shared by every setting.
#[derive(Debug, Clone)]
pub(crate) enum Connective<P> {
    Not,
    And,
    Or,
    Implies,
    Project(P),
}

impl<P> Connective<P> {
    /// Apply the connective to the values of its children, in order.
    pub(crate) fn apply<D>(&self, domain: &mut D, args: &[D::Value]) -> D::Value
    where
        D: Domain<Projection = P>,
    {
        match self {
            Self::Not => domain.negate(&args[0]),
            Self::And => domain.meet(&args[0], &args[1]),
            Self::Or => domain.join(&args[0], &args[1]),
            Self::Implies => domain.implies(&args[0], &args[1]),
            Self::Project(projection) => domain.project(projection, &args[0]),
        }
    }
}

/// Content of an arena entry.
#[derive(Debug, Clone)]
pub(crate) enum Slot<N, S> {
    Node(N),
    State(S),
}

#[derive(Debug, Clone)]
pub(crate) struct Entry<N, S> {
    pub(crate) slot: Slot<N, S>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: &'static str,
}

/// Owner of every node and state of a network.
#[derive(Debug, Clone)]
pub(crate) struct Arena<N, S> {
    entries: Vec<Entry<N, S>>,
}

impl<N, S> Arena<N, S> {
    pub(crate) fn new() -> Self {
        Self { entries: Vec::new() }
    }

    fn push(&mut self, entry: Entry<N, S>) -> NodeId {
        self.entries.push(entry);
        NodeId(self.entries.len() - 1)
    }

    pub(crate) fn entry(&self, id: NodeId) -> &Entry<N, S> {
        &self.entries[id.0]
    }

    pub(crate) fn state_mut(&mut self, id: NodeId) -> Option<&mut S> {
        match &mut self.entries[id.0].slot {
            Slot::State(state) => Some(state),
            Slot::Node(_) => None,
        }
    }

    pub(crate) fn kind(&self, id: NodeId) -> Option<&'static str> {
        self.entries.get(id.0).map(|entry| entry.kind)
    }

    /// Whether every state of `states` appears after all states below it.
    pub(crate) fn is_dependency_ordered(&self, states: &[NodeId]) -> bool {
        let mut position = vec![None; self.entries.len()];

        for (index, id) in states.iter().enumerate() {
            position[id.0] = Some(index);
        }

        states.iter().enumerate().all(|(index, &id)| {
            let mut pending = self.entry(id).children.clone();

            while let Some(child) = pending.pop() {
                if let Slot::State(_) = self.entry(child).slot {
                    match position[child.0] {
                        Some(p) if p < index => (),
                        _ => return false,
                    }
                }

                pending.extend(self.entry(child).children.iter().copied());
            }

            true
        })
    }
}

/// Evaluation setting, responsible for instantiating the operator of a single subformula.
pub(crate) trait Setting {
    type Node;
    type State;

    /// Build the entry for `formula`, whose children have already been built as `children`.
    fn build(&mut self, formula: &Formula, children: &[NodeId]) -> Result<Slot<Self::Node, Self::State>, FormulaError>;
}

/// Build `formula` into `arena`, returning its identifier and its states in update order.
pub(crate) fn construct<S: Setting>(
    setting: &mut S,
    arena: &mut Arena<S::Node, S::State>,
    formula: &Formula,
) -> Result<(NodeId, Vec<NodeId>), FormulaError> {
    let mut children = Vec::new();
    let mut states = Vec::new();

    for child in formula.children() {
        let (id, child_states) = construct(setting, arena, child)?;
        children.push(id);
        states.extend(child_states);
    }

    let slot = setting.build(formula, &children)?;
    let stateful = matches!(slot, Slot::State(_));
    let id = arena.push(Entry {
        slot,
        children,
        kind: formula.kind(),
    });

    if stateful {
        states.push(id);
    }

    debug!("construct({}) => {} {}", formula.kind(), if stateful { "state" } else { "node" }, id);

    Ok((id, states))
}

/// Build a whole network, returning the root and the dependency-ordered states.
pub(crate) fn build<S: Setting>(
    setting: &mut S,
    formula: &Formula,
) -> Result<(Arena<S::Node, S::State>, NodeId, Vec<NodeId>), FormulaError> {
    let mut arena = Arena::new();
    let (root, states) = construct(setting, &mut arena, formula)?;

    debug_assert!(arena.is_dependency_ordered(&states));
    debug!("network of {} entries and {} states", arena.entries.len(), states.len());

    Ok((arena, root, states))
}

/// Stateless connective for a formula, if it is one.
pub(crate) fn connective<P, F>(formula: &Formula, mut project: F) -> Result<Option<Connective<P>>, FormulaError>
where
    F: FnMut(Quantifier, &[String]) -> Result<P, FormulaError>,
{
    let connective = match formula {
        Formula::Not(_) => Connective::Not,
        Formula::And(..) => Connective::And,
        Formula::Or(..) => Connective::Or,
        Formula::Implies(..) => Connective::Implies,
        Formula::Exists(variables, _) => Connective::Project(project(Quantifier::Exists, variables)?),
        Formula::Forall(variables, _) => Connective::Project(project(Quantifier::Forall, variables)?),
        _ => return Ok(None),
    };

    Ok(Some(connective))
}

fn check_bound(bound: &TimeBound) -> Result<(), FormulaError> {
    let upper = bound.upper.unwrap_or(f64::INFINITY);

    if bound.lower.is_nan() || upper.is_nan() || !bound.lower.is_finite() {
        return Err(FormulaError::invalid_bound(format!("{}: bounds must be numbers", bound)));
    }

    if bound.lower < 0.0 {
        return Err(FormulaError::invalid_bound(format!("{}: bounds must be non-negative", bound)));
    }

    if bound.lower > upper {
        return Err(FormulaError::invalid_bound(format!("{}: lower bound exceeds upper bound", bound)));
    }

    Ok(())
}

/// Time window of a bounded operator in discrete time. An infinite upper bound is `None`.
pub(crate) fn discrete_bound(bound: &TimeBound) -> Result<(i64, Option<i64>), FormulaError> {
    check_bound(bound)?;

    let integral = |value: f64| -> Result<i64, FormulaError> {
        if value.fract() != 0.0 || value >= i64::MAX as f64 {
            Err(FormulaError::invalid_bound(format!("{}: discrete bounds must be integers below 2^63", bound)))
        } else {
            Ok(value as i64)
        }
    };

    let lower = integral(bound.lower)?;
    let upper = match bound.upper {
        Some(upper) if upper.is_finite() => Some(integral(upper)?),
        _ => None,
    };

    Ok((lower, upper))
}

/// Time window of a bounded operator in dense time. An infinite upper bound is `None`.
pub(crate) fn dense_bound(bound: &TimeBound) -> Result<(f64, Option<f64>), FormulaError> {
    check_bound(bound)?;
    Ok((bound.lower, bound.upper.filter(|upper| upper.is_finite())))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Kinds;

    impl Setting for Kinds {
        type Node = ();
        type State = ();

        fn build(&mut self, formula: &Formula, _: &[NodeId]) -> Result<Slot<(), ()>, FormulaError> {
            match formula {
                Formula::Not(_) | Formula::And(..) | Formula::Or(..) => Ok(Slot::Node(())),
                _ => Ok(Slot::State(())),
            }
        }
    }

    #[test]
    fn states_follow_dependencies() -> Result<(), FormulaError> {
        let phi = Formula::prop("p")
            .once()
            .and(Formula::prop("q").not())
            .since(Formula::prop("r").historically());

        let (arena, root, states) = build(&mut Kinds, &phi)?;

        assert_eq!(arena.kind(root), Some("since"));
        assert_eq!(states.len(), 6);
        assert_eq!(states.last(), Some(&root));
        assert!(arena.is_dependency_ordered(&states));

        let reversed = states.iter().rev().copied().collect::<Vec<_>>();
        assert!(!arena.is_dependency_ordered(&reversed));

        Ok(())
    }

    #[test]
    fn bounds() -> Result<(), FormulaError> {
        assert_eq!(discrete_bound(&TimeBound::new(2.0, 4.0))?, (2, Some(4)));
        assert_eq!(discrete_bound(&TimeBound::at_least(1.0))?, (1, None));
        assert_eq!(dense_bound(&TimeBound::new(0.5, f64::INFINITY))?, (0.5, None));

        assert!(discrete_bound(&TimeBound::new(0.5, 4.0)).is_err());
        assert!(dense_bound(&TimeBound::new(3.0, 2.0)).is_err_and(|err| err.is_invalid_bound()));
        assert!(dense_bound(&TimeBound::new(-1.0, 2.0)).is_err());

        let limit = 2f64.powi(63);
        assert!(discrete_bound(&TimeBound::new(0.0, limit)).is_err_and(|err| err.is_invalid_bound()));
        assert!(discrete_bound(&TimeBound::at_least(limit)).is_err());
        assert_eq!(discrete_bound(&TimeBound::new(0.0, 2f64.powi(62)))?, (0, Some(1 << 62)));

        Ok(())
    }
}
