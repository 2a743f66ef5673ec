// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Finding a handler for a type via its most specific ancestor that
//! has one.

//! Types are plain keys in a [TypeGraph](TypeGraph), each declared
//! with an ordered list of direct supertypes; all types share one
//! root. The ancestors of a type are ordered by C3 linearization (the
//! method resolution order of Python and Dylan): a type comes before
//! its supertypes, and the declared order of supertypes is kept. A
//! [Dispatch](Dispatch) table binds handlers to some of the types and
//! answers lookups for all of them, remembering the answers for types
//! without a binding of their own.

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("inconsistent ancestor order for type {ty}, can't merge {remaining}")]
    InconsistentOrder { ty: String, remaining: String },
    #[error("cyclic type hierarchy: {0}")]
    Cycle(String),
}

/// Explicit supertype graph.
#[derive(Debug, Clone)]
pub struct TypeGraph<K> {
    root: K,
    parents: HashMap<K, Vec<K>>,
}

#[derive(Debug)]
pub struct TypeGraphBuilder<K> {
    graph: TypeGraph<K>,
}

impl<K> TypeGraphBuilder<K>
    where K: Clone + Eq + Hash + Debug
{
    /// Declare `ty` with its direct supertypes in order of
    /// precedence. An empty list makes `ty` a direct child of the
    /// root. Declaring a type again replaces its supertypes.
    pub fn declare(mut self, ty: K, parents: Vec<K>) -> Self {
        self.declare_mut(ty, parents);
        self
    }

    pub fn declare_mut(&mut self, ty: K, parents: Vec<K>) {
        if ty == self.graph.root {
            return
        }
        let parents =
            if parents.is_empty() {
                vec![self.graph.root.clone()]
            } else {
                parents
            };
        self.graph.parents.insert(ty, parents);
    }

    pub fn build(self) -> TypeGraph<K> {
        self.graph
    }
}

impl<K> TypeGraph<K>
    where K: Clone + Eq + Hash + Debug
{
    pub fn builder(root: K) -> TypeGraphBuilder<K> {
        TypeGraphBuilder {
            graph: TypeGraph {
                root,
                parents: HashMap::new(),
            }
        }
    }

    pub fn root(&self) -> &K {
        &self.root
    }

    pub fn is_declared(&self, ty: &K) -> bool {
        ty == &self.root || self.parents.contains_key(ty)
    }

    /// Direct supertypes; undeclared types are taken to be direct
    /// children of the root.
    pub fn supertypes(&self, ty: &K) -> &[K] {
        if ty == &self.root {
            &[]
        } else {
            match self.parents.get(ty) {
                Some(ps) => ps,
                None => std::slice::from_ref(&self.root)
            }
        }
    }

    /// `ty` followed by all of its ancestors, most specific first,
    /// the root last.
    pub fn linearize(&self, ty: &K) -> Result<Vec<K>, DispatchError> {
        let mut visiting = Vec::new();
        self.linearize_inner(ty, &mut visiting)
    }

    fn linearize_inner(&self, ty: &K, visiting: &mut Vec<K>)
                       -> Result<Vec<K>, DispatchError> {
        if visiting.contains(ty) {
            visiting.push(ty.clone());
            return Err(DispatchError::Cycle(format!("{:?}", visiting)))
        }
        visiting.push(ty.clone());
        let supers = self.supertypes(ty);
        let mut seqs: Vec<VecDeque<K>> = Vec::with_capacity(supers.len() + 1);
        for s in supers {
            seqs.push(self.linearize_inner(s, visiting)?.into());
        }
        seqs.push(supers.iter().cloned().collect());
        visiting.pop();

        let mut result = vec![ty.clone()];
        merge(ty, seqs, &mut result)?;
        Ok(result)
    }
}

// The C3 merge: repeatedly take the first head that appears in no
// other sequence's tail.
fn merge<K>(ty: &K, mut seqs: Vec<VecDeque<K>>, out: &mut Vec<K>)
            -> Result<(), DispatchError>
    where K: Clone + Eq + Debug
{
    loop {
        seqs.retain(|s| ! s.is_empty());
        if seqs.is_empty() {
            return Ok(())
        }
        let candidate = seqs.iter()
            .map(|s| &s[0])
            .find(|head| {
                ! seqs.iter().any(|s| s.iter().skip(1).any(|x| x == *head))
            })
            .cloned();
        match candidate {
            None => {
                return Err(DispatchError::InconsistentOrder {
                    ty: format!("{:?}", ty),
                    remaining: format!("{:?}", seqs),
                })
            }
            Some(next) => {
                for s in seqs.iter_mut() {
                    if s.front() == Some(&next) {
                        s.pop_front();
                    }
                }
                out.push(next);
            }
        }
    }
}

/// Immutable after `build`, apart from the cache of resolved types,
/// which only ever gains entries; it can be shared between threads.
#[derive(Debug)]
pub struct Dispatch<K, H> {
    graph: TypeGraph<K>,
    bindings: HashMap<K, H>,
    nil: H,
    resolved: RwLock<HashMap<K, Option<H>>>,
}

#[derive(Debug)]
pub struct DispatchBuilder<K, H> {
    graph: TypeGraph<K>,
    bindings: HashMap<K, H>,
    nil: H,
}

impl<K, H> DispatchBuilder<K, H>
    where K: Clone + Eq + Hash + Debug,
          H: Clone
{
    pub fn bind(mut self, ty: K, handler: H) -> Self {
        self.bindings.insert(ty, handler);
        self
    }

    pub fn build(self) -> Dispatch<K, H> {
        log::debug!("dispatch table with {} bindings over {} types",
                    self.bindings.len(), self.graph.parents.len() + 1);
        Dispatch {
            graph: self.graph,
            bindings: self.bindings,
            nil: self.nil,
            resolved: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, H> Dispatch<K, H>
    where K: Clone + Eq + Hash + Debug,
          H: Clone
{
    pub fn builder(graph: TypeGraph<K>, nil: H) -> DispatchBuilder<K, H> {
        DispatchBuilder {
            graph,
            bindings: HashMap::new(),
            nil,
        }
    }

    pub fn graph(&self) -> &TypeGraph<K> {
        &self.graph
    }

    /// The handler for `ty`, or the nil handler for `None`. `Ok(None)`
    /// means neither `ty` nor any of its ancestors has a binding.
    pub fn lookup(&self, ty: Option<&K>) -> Result<Option<H>, DispatchError> {
        let ty = match ty {
            None => return Ok(Some(self.nil.clone())),
            Some(ty) => ty
        };
        if let Some(h) = self.bindings.get(ty) {
            return Ok(Some(h.clone()))
        }
        {
            let resolved = self.resolved.read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(r) = resolved.get(ty) {
                return Ok(r.clone())
            }
        }
        let order = self.graph.linearize(ty)?;
        let found = order.iter()
            .skip(1)
            .find_map(|ancestor| self.bindings.get(ancestor).map(|h| (ancestor, h)));
        match &found {
            Some((ancestor, _)) => log::debug!("{:?} dispatches via {:?}", ty, ancestor),
            None => log::debug!("{:?} has no handler in {:?}", ty, order),
        }
        let handler = found.map(|(_, h)| h.clone());
        // Another thread may have resolved `ty` meanwhile; both
        // computed the same answer, keep the first.
        let mut resolved = self.resolved.write()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(resolved.entry(ty.clone()).or_insert(handler).clone())
    }
}
