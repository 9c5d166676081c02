use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};

use log::{debug, trace};

/// Handle to a node owned by a [`Bdd`] manager.
///
/// Handles are only meaningful for the manager that created them. Two handles from the same
/// manager are equal exactly when they represent the same boolean function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ref(u32);

impl Ref {
    /// The constant false function.
    pub const ZERO: Ref = Ref(0);

    /// The constant true function.
    pub const ONE: Ref = Ref(1);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_terminal(self) -> bool {
        self == Self::ZERO || self == Self::ONE
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Node {
    variable: u32,
    low: Ref,
    high: Ref,
}

// Terminals sit below every variable in the order.
const TERMINAL: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum OpKey {
    Ite(Ref, Ref, Ref),
    Exists(Ref, Ref),
}

/// Manager for reduced ordered binary decision diagrams.
///
/// Every function created through the manager is hash-consed into a unique table, so
/// structural equality of [`Ref`] handles is semantic equality of functions. Variables are
/// 1-indexed and ordered by index, smaller indices closer to the root.
///
/// # Examples
///
/// ```rust
/// use pastel_bdd::Bdd;
///
/// let mut bdd = Bdd::default();
/// let x = bdd.new_variable();
/// let y = bdd.new_variable();
/// let fx = bdd.mk_var(x);
/// let fy = bdd.mk_var(y);
///
/// let f = bdd.apply_and(fx, fy);
/// let g = bdd.cube([x as i32, y as i32]);
/// assert_eq!(f, g);
/// ```
#[derive(Debug, Clone)]
pub struct Bdd {
    nodes: Vec<Node>,
    unique: HashMap<Node, Ref>,
    cache: HashMap<OpKey, Ref>,
    variables: u32,
}

impl Default for Bdd {
    fn default() -> Self {
        let terminal = |r: Ref| Node {
            variable: TERMINAL,
            low: r,
            high: r,
        };

        Self {
            nodes: vec![terminal(Ref::ZERO), terminal(Ref::ONE)],
            unique: HashMap::new(),
            cache: HashMap::new(),
            variables: 0,
        }
    }
}

impl Bdd {
    pub fn zero(&self) -> Ref {
        Ref::ZERO
    }

    pub fn one(&self) -> Ref {
        Ref::ONE
    }

    pub fn is_zero(&self, node: Ref) -> bool {
        node == Ref::ZERO
    }

    pub fn is_one(&self, node: Ref) -> bool {
        node == Ref::ONE
    }

    /// Number of nodes stored in the manager, terminals included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 2
    }

    /// Allocate a fresh variable and return its index.
    pub fn new_variable(&mut self) -> u32 {
        self.variables += 1;
        trace!("new_variable() => x{}", self.variables);
        self.variables
    }

    /// The decision variable of a node, `None` for terminals.
    pub fn variable(&self, node: Ref) -> Option<u32> {
        match self.nodes[node.index()].variable {
            TERMINAL => None,
            v => Some(v),
        }
    }

    pub fn low(&self, node: Ref) -> Ref {
        self.nodes[node.index()].low
    }

    pub fn high(&self, node: Ref) -> Ref {
        self.nodes[node.index()].high
    }

    fn level(&self, node: Ref) -> u32 {
        self.nodes[node.index()].variable
    }

    pub fn mk_node(&mut self, variable: u32, low: Ref, high: Ref) -> Ref {
        debug_assert_ne!(variable, 0, "Variable index should not be zero");

        if low == high {
            return low;
        }

        let node = Node { variable, low, high };

        if let Some(&existing) = self.unique.get(&node) {
            return existing;
        }

        let r = Ref(self.nodes.len() as u32);
        trace!("mk(v = {}, low = {}, high = {}) => {}", variable, low, high, r);
        self.nodes.push(node);
        self.unique.insert(node, r);
        r
    }

    /// The function that is true exactly when `variable` is true.
    pub fn mk_var(&mut self, variable: u32) -> Ref {
        self.mk_node(variable, Ref::ZERO, Ref::ONE)
    }

    /// Conjunction of literals, a negative literal `-v` standing for the negation of `v`.
    pub fn cube(&mut self, literals: impl IntoIterator<Item = i32>) -> Ref {
        let mut literals = literals.into_iter().collect::<Vec<_>>();
        literals.sort_by_key(|&v| std::cmp::Reverse(v.unsigned_abs()));
        debug!("cube(literals = {:?})", literals);

        let mut current = Ref::ONE;

        for literal in literals {
            let variable = literal.unsigned_abs();

            current = if literal < 0 {
                self.mk_node(variable, current, Ref::ZERO)
            } else {
                self.mk_node(variable, Ref::ZERO, current)
            };
        }

        current
    }

    fn cofactors(&self, node: Ref, variable: u32) -> (Ref, Ref) {
        if self.level(node) == variable {
            (self.low(node), self.high(node))
        } else {
            (node, node)
        }
    }

    /// Apply the ITE operation to the arguments.
    ///
    /// ```text
    /// ITE(f, g, h) = (f ∧ g) ∨ (¬f ∧ h)
    /// ```
    pub fn apply_ite(&mut self, f: Ref, g: Ref, h: Ref) -> Ref {
        // ite(1,G,H) => G, ite(0,G,H) => H
        if f == Ref::ONE {
            return g;
        }
        if f == Ref::ZERO {
            return h;
        }

        // ite(F,G,G) => G, ite(F,1,0) => F
        if g == h {
            return g;
        }
        if g == Ref::ONE && h == Ref::ZERO {
            return f;
        }

        let key = OpKey::Ite(f, g, h);

        if let Some(&cached) = self.cache.get(&key) {
            return cached;
        }

        let top = self.level(f).min(self.level(g)).min(self.level(h));
        let (f0, f1) = self.cofactors(f, top);
        let (g0, g1) = self.cofactors(g, top);
        let (h0, h1) = self.cofactors(h, top);

        let low = self.apply_ite(f0, g0, h0);
        let high = self.apply_ite(f1, g1, h1);
        let result = self.mk_node(top, low, high);

        self.cache.insert(key, result);
        result
    }

    pub fn apply_not(&mut self, f: Ref) -> Ref {
        self.apply_ite(f, Ref::ZERO, Ref::ONE)
    }

    pub fn apply_and(&mut self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, Ref::ZERO)
    }

    pub fn apply_or(&mut self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, Ref::ONE, v)
    }

    pub fn apply_imply(&mut self, u: Ref, v: Ref) -> Ref {
        self.apply_ite(u, v, Ref::ONE)
    }

    /// Existentially abstract the variables of a positive `cube` from `f`.
    pub fn exists(&mut self, f: Ref, cube: Ref) -> Ref {
        if f.is_terminal() || cube == Ref::ONE {
            return f;
        }

        let level = self.level(f);
        let mut cube = cube;

        while cube != Ref::ONE && self.level(cube) < level {
            cube = self.high(cube);
        }

        if cube == Ref::ONE {
            return f;
        }

        let key = OpKey::Exists(f, cube);

        if let Some(&cached) = self.cache.get(&key) {
            return cached;
        }

        let (low, high) = (self.low(f), self.high(f));

        let result = if self.level(cube) == level {
            let rest = self.high(cube);
            let low = self.exists(low, rest);

            if low == Ref::ONE {
                Ref::ONE
            } else {
                let high = self.exists(high, rest);
                self.apply_or(low, high)
            }
        } else {
            let low = self.exists(low, cube);
            let high = self.exists(high, cube);
            self.mk_node(level, low, high)
        };

        self.cache.insert(key, result);
        result
    }

    /// Universally abstract the variables of a positive `cube` from `f`.
    pub fn forall(&mut self, f: Ref, cube: Ref) -> Ref {
        let negated = self.apply_not(f);
        let abstracted = self.exists(negated, cube);
        self.apply_not(abstracted)
    }

    /// Evaluate `f` under a total assignment of its variables.
    pub fn eval(&self, f: Ref, assignment: impl Fn(u32) -> bool) -> bool {
        let mut node = f;

        while !node.is_terminal() {
            let variable = self.level(node);
            node = if assignment(variable) {
                self.high(node)
            } else {
                self.low(node)
            };
        }

        node == Ref::ONE
    }

    /// Number of distinct non-terminal nodes reachable from `f`.
    pub fn size(&self, f: Ref) -> usize {
        let mut seen = HashSet::new();
        let mut stack = vec![f];

        while let Some(node) = stack.pop() {
            if node.is_terminal() || !seen.insert(node) {
                continue;
            }

            stack.push(self.low(node));
            stack.push(self.high(node));
        }

        seen.len()
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn terminals() {
        let bdd = Bdd::default();

        assert!(bdd.is_zero(bdd.zero()));
        assert!(bdd.is_one(bdd.one()));
        assert_eq!(bdd.variable(bdd.one()), None);
        assert!(bdd.is_empty());
    }

    #[test]
    fn variables_are_one_indexed() {
        let mut bdd = Bdd::default();
        let x = bdd.new_variable();
        let fx = bdd.mk_var(x);

        assert_eq!(x, 1);
        assert_eq!(bdd.variable(fx), Some(1));
        assert_eq!(bdd.low(fx), bdd.zero());
        assert_eq!(bdd.high(fx), bdd.one());
    }

    #[test]
    fn hash_consing() {
        let mut bdd = Bdd::default();
        let x = bdd.new_variable();
        let a = bdd.mk_var(x);
        let b = bdd.mk_var(x);

        assert_eq!(a, b);
        assert_eq!(bdd.len(), 3);
    }

    #[test]
    fn de_morgan() {
        let mut bdd = Bdd::default();
        let x = bdd.new_variable();
        let y = bdd.new_variable();
        let fx = bdd.mk_var(x);
        let fy = bdd.mk_var(y);

        let and = bdd.apply_and(fx, fy);
        let lhs = bdd.apply_not(and);
        let nx = bdd.apply_not(fx);
        let ny = bdd.apply_not(fy);
        let rhs = bdd.apply_or(nx, ny);

        assert_eq!(lhs, rhs);
    }

    #[test]
    fn cube_with_negative_literals() {
        let mut bdd = Bdd::default();
        let x = bdd.new_variable();
        let y = bdd.new_variable();
        let fx = bdd.mk_var(x);
        let fy = bdd.mk_var(y);
        let ny = bdd.apply_not(fy);

        let expected = bdd.apply_and(fx, ny);
        let cube = bdd.cube([x as i32, -(y as i32)]);

        assert_eq!(cube, expected);
        assert!(bdd.eval(cube, |v| v == x));
        assert!(!bdd.eval(cube, |_| true));
    }

    #[test]
    fn exists_removes_variable() {
        let mut bdd = Bdd::default();
        let x = bdd.new_variable();
        let y = bdd.new_variable();
        let f = bdd.cube([x as i32, -(y as i32)]);
        let cube_y = bdd.cube([y as i32]);

        let projected = bdd.exists(f, cube_y);
        let fx = bdd.mk_var(x);

        assert_eq!(projected, fx);
    }

    #[test]
    fn forall_is_dual_of_exists() {
        let mut bdd = Bdd::default();
        let x = bdd.new_variable();
        let y = bdd.new_variable();
        let fx = bdd.mk_var(x);
        let fy = bdd.mk_var(y);
        let f = bdd.apply_or(fx, fy);
        let cube_y = bdd.cube([y as i32]);

        assert_eq!(bdd.forall(f, cube_y), fx);
        assert_eq!(bdd.exists(f, cube_y), bdd.one());
    }

    #[test]
    fn size_counts_shared_nodes_once() {
        let mut bdd = Bdd::default();
        let x = bdd.new_variable();
        let y = bdd.new_variable();
        let f = bdd.cube([x as i32, y as i32]);

        assert_eq!(bdd.size(f), 2);
        assert_eq!(bdd.size(bdd.one()), 0);
    }
}
