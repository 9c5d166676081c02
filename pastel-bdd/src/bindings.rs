use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use crate::bdd::{Bdd, Ref};

/// Default number of boolean variables backing each logical variable.
pub const DEFAULT_BITS: u32 = 12;

/// Error produced when a logical variable cannot bind another distinct value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Variable {name} cannot bind more than {capacity} distinct values")]
pub struct DomainExhausted {
    name: String,
    capacity: u64,
}

impl DomainExhausted {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }
}

#[derive(Debug, Clone)]
struct Variable {
    bits: Vec<u32>,
    cube: Ref,
    slots: HashMap<String, Ref>,
    order: Vec<String>,
}

impl Variable {
    fn allocate(bdd: &mut Bdd, bits: u32, name: &str) -> Self {
        let bits = (0..bits).map(|_| bdd.new_variable()).collect::<Vec<_>>();
        let cube = bdd.cube(bits.iter().map(|&v| v as i32));

        debug!("declare({}) => x{:?}", name, bits);

        Self {
            bits,
            cube,
            slots: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn capacity(&self) -> u64 {
        1u64 << self.bits.len()
    }

    fn encode(&self, index: u64) -> Vec<i32> {
        self.bits
            .iter()
            .enumerate()
            .map(|(bit, &v)| if (index >> bit) & 1 == 1 { v as i32 } else { -(v as i32) })
            .collect()
    }
}

/// Table of named logical variables encoded over a shared [`Bdd`].
///
/// Each logical variable owns a fixed block of boolean variables. The first time a value is
/// assigned to a variable it receives the next unused code in that block, and every later
/// assignment of the same value returns the same set. Sets produced by the manager are only
/// meaningful for the manager that created them.
///
/// # Examples
///
/// ```rust
/// use pastel_bdd::BindingManager;
///
/// let mut manager = BindingManager::default();
/// let alice = manager.assign("user", "alice").unwrap();
/// let bob = manager.assign("user", "bob").unwrap();
///
/// assert_ne!(alice, bob);
/// assert_eq!(manager.assign("user", "alice").unwrap(), alice);
///
/// let either = manager.or(alice, bob);
/// assert_eq!(manager.values(either, "user"), vec!["alice", "bob"]);
/// ```
#[derive(Debug, Clone)]
pub struct BindingManager {
    bdd: Bdd,
    bits: u32,
    variables: HashMap<String, Variable>,
}

impl Default for BindingManager {
    fn default() -> Self {
        Self::new(DEFAULT_BITS)
    }
}

impl BindingManager {
    /// Create a manager that backs every logical variable with `bits` boolean variables.
    pub fn new(bits: u32) -> Self {
        Self {
            bdd: Bdd::default(),
            bits: bits.clamp(1, 63),
            variables: HashMap::new(),
        }
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn one(&self) -> Ref {
        self.bdd.one()
    }

    pub fn zero(&self) -> Ref {
        self.bdd.zero()
    }

    fn variable(&mut self, name: &str) -> &mut Variable {
        let bits = self.bits;
        let bdd = &mut self.bdd;

        self.variables
            .entry(name.to_string())
            .or_insert_with(|| Variable::allocate(bdd, bits, name))
    }

    /// The set in which logical variable `name` is bound to `value`.
    pub fn assign(&mut self, name: &str, value: &str) -> Result<Ref, DomainExhausted> {
        let bits = self.bits;
        let bdd = &mut self.bdd;
        let variable = self
            .variables
            .entry(name.to_string())
            .or_insert_with(|| Variable::allocate(bdd, bits, name));

        if let Some(&slot) = variable.slots.get(value) {
            return Ok(slot);
        }

        let index = variable.order.len() as u64;

        if index >= variable.capacity() {
            return Err(DomainExhausted {
                name: name.to_string(),
                capacity: variable.capacity(),
            });
        }

        let slot = bdd.cube(variable.encode(index));

        debug!("assign({} = {:?}) => slot {}", name, value, index);

        variable.slots.insert(value.to_string(), slot);
        variable.order.push(value.to_string());

        Ok(slot)
    }

    /// Conjunction of the boolean blocks of the named variables.
    pub fn cube<S: AsRef<str>>(&mut self, names: &[S]) -> Ref {
        let mut cube = self.bdd.one();

        for name in names {
            let var_cube = self.variable(name.as_ref()).cube;
            cube = self.bdd.apply_and(cube, var_cube);
        }

        cube
    }

    pub fn and(&mut self, u: Ref, v: Ref) -> Ref {
        self.bdd.apply_and(u, v)
    }

    pub fn or(&mut self, u: Ref, v: Ref) -> Ref {
        self.bdd.apply_or(u, v)
    }

    pub fn not(&mut self, u: Ref) -> Ref {
        self.bdd.apply_not(u)
    }

    pub fn implies(&mut self, u: Ref, v: Ref) -> Ref {
        self.bdd.apply_imply(u, v)
    }

    pub fn exists(&mut self, set: Ref, cube: Ref) -> Ref {
        self.bdd.exists(set, cube)
    }

    pub fn forall(&mut self, set: Ref, cube: Ref) -> Ref {
        self.bdd.forall(set, cube)
    }

    /// Values of logical variable `name` that appear in some binding of `set`, in the order
    /// they were first assigned.
    pub fn values(&mut self, set: Ref, name: &str) -> Vec<String> {
        let Some(variable) = self.variables.get(name) else {
            return Vec::new();
        };

        let candidates = variable
            .order
            .iter()
            .filter_map(|value| variable.slots.get(value).map(|&slot| (value.clone(), slot)))
            .collect::<Vec<_>>();

        candidates
            .into_iter()
            .filter(|&(_, slot)| self.bdd.apply_and(set, slot) != Ref::ZERO)
            .map(|(value, _)| value)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn assign_is_idempotent() -> Result<(), DomainExhausted> {
        let mut manager = BindingManager::default();
        let first = manager.assign("file", "wonderland")?;
        let second = manager.assign("file", "wonderland")?;

        assert_eq!(first, second);
        assert_ne!(first, manager.zero());
        Ok(())
    }

    #[test]
    fn distinct_values_are_disjoint() -> Result<(), DomainExhausted> {
        let mut manager = BindingManager::default();
        let a = manager.assign("file", "wonderland")?;
        let b = manager.assign("file", "white_rabbit")?;

        assert_eq!(manager.and(a, b), manager.zero());
        Ok(())
    }

    #[test]
    fn exists_projects_variable_away() -> Result<(), DomainExhausted> {
        let mut manager = BindingManager::default();
        let alice = manager.assign("user", "alice")?;
        let file = manager.assign("file", "wonderland")?;
        let both = manager.and(alice, file);
        let cube = manager.cube(&["file"]);

        assert_eq!(manager.exists(both, cube), alice);
        assert_eq!(manager.forall(both, cube), manager.zero());
        Ok(())
    }

    #[test]
    fn values_lists_members() -> Result<(), DomainExhausted> {
        let mut manager = BindingManager::default();
        let alice = manager.assign("user", "alice")?;
        let _bob = manager.assign("user", "bob")?;
        let carol = manager.assign("user", "carol")?;
        let set = manager.or(alice, carol);

        assert_eq!(manager.values(set, "user"), vec!["alice", "carol"]);
        assert!(manager.values(set, "file").is_empty());
        Ok(())
    }

    #[test]
    fn exhaustion() {
        let mut manager = BindingManager::new(1);

        assert!(manager.assign("x", "a").is_ok());
        assert!(manager.assign("x", "b").is_ok());

        let error = manager.assign("x", "c").unwrap_err();
        assert_eq!(error.name(), "x");
        assert_eq!(error.capacity(), 2);
    }
}
