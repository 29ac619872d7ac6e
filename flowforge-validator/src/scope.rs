//! ABOUTME: Variable-scope tracking for the DFS traversal over `Node` (§3.5 invariants 3-5)
//! ABOUTME: A `Scope` is the set of names dominating the current point in the workflow tree

use std::collections::HashSet;

/// The set of variable names bound (by input declaration or `assigns_to`) at a
/// point in the tree. Cloned at every branch point so sibling branches never
/// observe each other's bindings mid-traversal (invariant 4).
#[derive(Debug, Clone, Default)]
pub struct Scope(HashSet<String>);

impl Scope {
    #[must_use]
    pub fn new() -> Self {
        Self(HashSet::new())
    }

    #[must_use]
    pub fn from_names<I: IntoIterator<Item = String>>(names: I) -> Self {
        Self(names.into_iter().collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn insert(&mut self, name: String) {
        self.0.insert(name);
    }

    pub fn extend(&mut self, other: &Scope) {
        self.0.extend(other.0.iter().cloned());
    }

    #[must_use]
    pub fn union(a: &Scope, b: &Scope) -> Scope {
        Scope(a.0.union(&b.0).cloned().collect())
    }

    /// Names present in both `a` and `b` — used to merge a conditional's two
    /// branches: only bindings both branches guarantee are visible downstream.
    #[must_use]
    pub fn intersection(a: &Scope, b: &Scope) -> Scope {
        Scope(a.0.intersection(&b.0).cloned().collect())
    }

    #[must_use]
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}
