//! Facet reconciliation against the facet universe.
//!
//! # Invariants
//! - Only facets in the universe are ever added or removed.
//! - Reconciling twice with the same desired set is a no-op the second time.
//! - Reconciling to B and back to A restores A's membership for every
//!   universe facet.

use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;

use ahash::AHashSet;

/// Mutable view over an entity's facet set.
pub trait FacetTarget {
    fn has_facet(&self, facet: &str) -> bool;
    fn add_facet(&mut self, facet: &str);
    fn remove_facet(&mut self, facet: &str);
}

/// Operations applied by one [`reconcile`] call, in universe order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FacetDelta {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl FacetDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Make `target` agree with `desired` on every facet of `universe`.
///
/// `desired` is expected to be a subset of `universe`; desired facets outside
/// the universe are ignored.
pub fn reconcile<T: FacetTarget + ?Sized>(
    target: &mut T,
    desired: &[String],
    universe: &[String],
) -> FacetDelta {
    let wanted: AHashSet<&str> = desired.iter().map(String::as_str).collect();
    let mut delta = FacetDelta::default();
    for facet in universe {
        let present = target.has_facet(facet);
        if wanted.contains(facet.as_str()) {
            if !present {
                target.add_facet(facet);
                delta.added.push(facet.clone());
            }
        } else if present {
            target.remove_facet(facet);
            delta.removed.push(facet.clone());
        }
    }
    delta
}

/// Insertion-ordered set of facet names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FacetSet {
    items: Vec<String>,
}

impl FacetSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, facet: &str) -> bool {
        self.items.iter().any(|f| f == facet)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FacetSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = FacetSet::new();
        for facet in iter {
            let facet: String = facet.into();
            set.add_facet(&facet);
        }
        set
    }
}

impl FacetTarget for FacetSet {
    fn has_facet(&self, facet: &str) -> bool {
        self.contains(facet)
    }

    fn add_facet(&mut self, facet: &str) {
        if !self.contains(facet) {
            self.items.push(facet.to_owned());
        }
    }

    fn remove_facet(&mut self, facet: &str) {
        self.items.retain(|f| f != facet);
    }
}

impl FacetTarget for BTreeSet<String> {
    fn has_facet(&self, facet: &str) -> bool {
        self.contains(facet)
    }

    fn add_facet(&mut self, facet: &str) {
        self.insert(facet.to_owned());
    }

    fn remove_facet(&mut self, facet: &str) {
        self.remove(facet);
    }
}

impl<S: BuildHasher> FacetTarget for HashSet<String, S> {
    fn has_facet(&self, facet: &str) -> bool {
        self.contains(facet)
    }

    fn add_facet(&mut self, facet: &str) {
        self.insert(facet.to_owned());
    }

    fn remove_facet(&mut self, facet: &str) {
        self.remove(facet);
    }
}
