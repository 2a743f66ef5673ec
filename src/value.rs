// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runtime data types representing an edn value.

//! [Value](Value) is an immutable tree; all equality is structural.
//! Sets and maps keep insertion order but compare (and hash)
//! independently of it. Doubles compare by bit pattern, so that
//! `Value` can be `Eq` and live in sets and map keys.

use crate::symbol::{Keyword, Symbol, Tag};
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset};
use indexmap::{IndexMap, IndexSet};
use kstring::KString;
use num::BigInt;
use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

/// Name of a node type in the printer's type graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(KString);

impl TypeName {
    pub fn new(s: &str) -> TypeName {
        TypeName(KString::from_ref(s))
    }
    pub fn from_static(s: &'static str) -> TypeName {
        TypeName(KString::from_static(s))
    }
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_str(&self.0)
    }
}

/// Names of the builtin node types and the interfaces they declare
/// (see `print::builtin_type_graph`).
pub mod types {
    pub const OBJECT: &str = "Object";
    pub const BOOLEAN: &str = "Boolean";
    pub const CHARACTER: &str = "Character";
    pub const CHAR_SEQUENCE: &str = "CharSequence";
    pub const STRING: &str = "String";
    pub const NAMED: &str = "Named";
    pub const SYMBOL: &str = "Symbol";
    pub const KEYWORD: &str = "Keyword";
    pub const NUMBER: &str = "Number";
    pub const LONG: &str = "Long";
    pub const BIG_INTEGER: &str = "BigInteger";
    pub const DOUBLE: &str = "Double";
    pub const BIG_DECIMAL: &str = "BigDecimal";
    pub const COLLECTION: &str = "Collection";
    pub const SEQUENTIAL: &str = "Sequential";
    pub const RANDOM_ACCESS: &str = "RandomAccess";
    pub const LIST: &str = "List";
    pub const VECTOR: &str = "Vector";
    pub const SET: &str = "Set";
    pub const MAP: &str = "Map";
    pub const TAGGED_VALUE: &str = "TaggedValue";
    pub const UUID: &str = "Uuid";
    pub const INSTANT: &str = "Instant";
}

/// A user type produced by a tag transform. It takes part in printer
/// dispatch through `type_name`, which has to be declared in the
/// printer's type graph (or it is treated as a direct child of the
/// root type).
pub trait CustomValue: Debug + Send + Sync + 'static {
    fn type_name(&self) -> TypeName;
    fn as_any(&self) -> &dyn Any;
    /// Structural equality with another custom value (which may be of
    /// a different type).
    fn eq_custom(&self, other: &dyn CustomValue) -> bool;
    fn hash_custom(&self, state: &mut dyn Hasher);
}

/// A value with a tag for which no transform was registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaggedValue {
    pub tag: Tag,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Char(char),
    String(KString),
    Integer(i64),
    BigInteger(BigInt),
    Double(f64),
    Decimal(BigDecimal),
    Symbol(Symbol),
    Keyword(Keyword),
    List(Vec<Value>),
    Vector(Vec<Value>),
    Set(IndexSet<Value>),
    Map(IndexMap<Value, Value>),
    Tagged(Box<TaggedValue>),
    Uuid(Uuid),
    Inst(DateTime<FixedOffset>),
    Custom(Arc<dyn CustomValue>),
}

impl Value {
    pub fn string(s: &str) -> Value {
        Value::String(KString::from_ref(s))
    }

    pub fn symbol(s: &str) -> Value {
        Value::Symbol(Symbol::simple(s))
    }

    pub fn keyword(s: &str) -> Value {
        Value::Keyword(Keyword::new("", s))
    }

    pub fn tagged(tag: Tag, value: Value) -> Value {
        Value::Tagged(Box::new(TaggedValue { tag, value }))
    }

    /// The dispatch type of this node, `None` for nil.
    pub fn type_name(&self) -> Option<TypeName> {
        let name = match self {
            Value::Nil => return None,
            Value::Custom(c) => return Some(c.type_name()),
            Value::Bool(_) => types::BOOLEAN,
            Value::Char(_) => types::CHARACTER,
            Value::String(_) => types::STRING,
            Value::Integer(_) => types::LONG,
            Value::BigInteger(_) => types::BIG_INTEGER,
            Value::Double(_) => types::DOUBLE,
            Value::Decimal(_) => types::BIG_DECIMAL,
            Value::Symbol(_) => types::SYMBOL,
            Value::Keyword(_) => types::KEYWORD,
            Value::List(_) => types::LIST,
            Value::Vector(_) => types::VECTOR,
            Value::Set(_) => types::SET,
            Value::Map(_) => types::MAP,
            Value::Tagged(_) => types::TAGGED_VALUE,
            Value::Uuid(_) => types::UUID,
            Value::Inst(_) => types::INSTANT,
        };
        Some(TypeName::from_static(name))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Only vectors support indexed access; lists are sequential only.
    pub fn is_random_access(&self) -> bool {
        matches!(self, Value::Vector(_))
    }

    /// Element `i` of a vector. `None` for lists, even though they
    /// are stored the same way.
    pub fn nth(&self, i: usize) -> Option<&Value> {
        match self {
            Value::Vector(v) => v.get(i),
            _ => None
        }
    }

    /// Elements of a list or vector, in order.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) | Value::Vector(v) => Some(v),
            _ => None
        }
    }

    pub fn as_custom<T: CustomValue>(&self) -> Option<&T> {
        match self {
            Value::Custom(c) => c.as_any().downcast_ref::<T>(),
            _ => None
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::BigInteger(a), Value::BigInteger(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Tagged(a), Value::Tagged(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::Inst(a), Value::Inst(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => a.eq_custom(b.as_ref()),
            _ => false
        }
    }
}

impl Eq for Value {}

fn standalone_hash<T: Hash + ?Sized>(v: &T) -> u64 {
    let mut h = DefaultHasher::new();
    v.hash(&mut h);
    h.finish()
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(b) => b.hash(state),
            Value::Char(c) => c.hash(state),
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::BigInteger(n) => n.hash(state),
            Value::Double(d) => d.to_bits().hash(state),
            Value::Decimal(d) => d.hash(state),
            Value::Symbol(s) => s.hash(state),
            Value::Keyword(k) => k.hash(state),
            Value::List(v) | Value::Vector(v) => v.hash(state),
            // Order independent, matching IndexSet/IndexMap equality.
            Value::Set(s) => {
                s.iter().map(|v| standalone_hash(v))
                    .fold(0u64, u64::wrapping_add)
                    .hash(state)
            }
            Value::Map(m) => {
                m.iter().map(|kv| standalone_hash(&kv))
                    .fold(0u64, u64::wrapping_add)
                    .hash(state)
            }
            Value::Tagged(t) => t.hash(state),
            Value::Uuid(u) => u.hash(state),
            Value::Inst(i) => i.hash(state),
            Value::Custom(c) => c.hash_custom(state),
        }
    }
}

/// Formats as edn via the default printer; values the default printer
/// has no handler for are shown in their Debug form instead.
impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self.to_edn() {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}
