// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Accumulating the elements of a collection while reading it.

//! The reader creates one builder per collection it reads (none for
//! discarded collections), adds the elements left to right and
//! finishes with `build`. Map builders receive keys and values
//! alternately. Uniqueness is checked on `add`, so the error points
//! at the offending element.

use crate::value::Value;
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("duplicate key {0} in map")]
    DuplicateKey(Value),
    #[error("duplicate element {0} in set")]
    DuplicateElement(Value),
    #[error("map literal must contain an even number of forms, got {0}")]
    OddMapArity(usize),
    #[error("{0}")]
    Other(String),
}

pub trait CollectionBuilder {
    fn add(&mut self, v: Value) -> Result<(), BuildError>;
    fn build(self: Box<Self>) -> Result<Value, BuildError>;
}

pub type BuilderFactory = Arc<dyn Fn() -> Box<dyn CollectionBuilder> + Send + Sync>;

#[derive(Debug, Default)]
pub struct ListBuilder(Vec<Value>);

impl CollectionBuilder for ListBuilder {
    fn add(&mut self, v: Value) -> Result<(), BuildError> {
        self.0.push(v);
        Ok(())
    }
    fn build(self: Box<Self>) -> Result<Value, BuildError> {
        Ok(Value::List(self.0))
    }
}

#[derive(Debug, Default)]
pub struct VectorBuilder(Vec<Value>);

impl CollectionBuilder for VectorBuilder {
    fn add(&mut self, v: Value) -> Result<(), BuildError> {
        self.0.push(v);
        Ok(())
    }
    fn build(self: Box<Self>) -> Result<Value, BuildError> {
        Ok(Value::Vector(self.0))
    }
}

#[derive(Debug, Default)]
pub struct SetBuilder(IndexSet<Value>);

impl CollectionBuilder for SetBuilder {
    fn add(&mut self, v: Value) -> Result<(), BuildError> {
        if self.0.contains(&v) {
            return Err(BuildError::DuplicateElement(v))
        }
        self.0.insert(v);
        Ok(())
    }
    fn build(self: Box<Self>) -> Result<Value, BuildError> {
        Ok(Value::Set(self.0))
    }
}

#[derive(Debug, Default)]
pub struct MapBuilder {
    map: IndexMap<Value, Value>,
    pending_key: Option<Value>,
}

impl CollectionBuilder for MapBuilder {
    fn add(&mut self, v: Value) -> Result<(), BuildError> {
        match self.pending_key.take() {
            None => {
                if self.map.contains_key(&v) {
                    return Err(BuildError::DuplicateKey(v))
                }
                self.pending_key = Some(v);
            }
            Some(k) => {
                self.map.insert(k, v);
            }
        }
        Ok(())
    }
    fn build(self: Box<Self>) -> Result<Value, BuildError> {
        if self.pending_key.is_some() {
            return Err(BuildError::OddMapArity(self.map.len() * 2 + 1))
        }
        Ok(Value::Map(self.map))
    }
}

pub fn list_factory() -> BuilderFactory {
    Arc::new(|| Box::new(ListBuilder::default()) as Box<dyn CollectionBuilder>)
}

pub fn vector_factory() -> BuilderFactory {
    Arc::new(|| Box::new(VectorBuilder::default()) as Box<dyn CollectionBuilder>)
}

pub fn set_factory() -> BuilderFactory {
    Arc::new(|| Box::new(SetBuilder::default()) as Box<dyn CollectionBuilder>)
}

pub fn map_factory() -> BuilderFactory {
    Arc::new(|| Box::new(MapBuilder::default()) as Box<dyn CollectionBuilder>)
}
