// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Settings for reading: what the scanner accepts, how numbers,
//! tagged values and collections are turned into values.

//! A `ParserConfig` is put together with a `ParserConfigBuilder`,
//! which is consumed by `build`; the finished config is immutable and
//! can be shared between threads, each running its own parser.

use crate::builder::{list_factory, map_factory, set_factory, vector_factory,
                     BuilderFactory, CollectionBuilder};
use crate::number::NumberHooks;
use crate::scan::Collkind;
use crate::symbol::Tag;
use crate::tags::{inst_tag, read_inst, read_uuid, uuid_tag, TagError,
                  TagHandler};
use crate::value::Value;
use bigdecimal::BigDecimal;
use num::BigInt;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// The part of the settings used by the scanner.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Accept `\uXXXX` in strings and character literals.
    pub unicode_escapes: bool,
    pub numbers: NumberHooks,
}

impl Default for ScanSettings {
    fn default() -> Self {
        ScanSettings {
            unicode_escapes: true,
            numbers: NumberHooks::default(),
        }
    }
}

/// Open collections, discards and tags a single value may nest.
/// Parsing keeps them on the heap, so this bounds memory, not the
/// call stack.
pub const DEFAULT_MAX_DEPTH: u32 = 500;

pub struct ParserConfig {
    pub(crate) scan: ScanSettings,
    tag_handlers: HashMap<Tag, TagHandler>,
    list: BuilderFactory,
    vector: BuilderFactory,
    set: BuilderFactory,
    map: BuilderFactory,
    pub(crate) max_depth: u32,
}

impl ParserConfig {
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::new()
    }

    pub fn scan_settings(&self) -> &ScanSettings {
        &self.scan
    }

    pub fn tag_handler(&self, tag: &Tag) -> Option<&TagHandler> {
        self.tag_handlers.get(tag)
    }

    pub fn new_builder(&self, kind: Collkind) -> Box<dyn CollectionBuilder> {
        let factory = match kind {
            Collkind::List => &self.list,
            Collkind::Vector => &self.vector,
            Collkind::Set => &self.set,
            Collkind::Map => &self.map,
        };
        factory()
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfigBuilder::new().build()
    }
}

impl Debug for ParserConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        let mut tags: Vec<String> =
            self.tag_handlers.keys().map(|t| t.to_string()).collect();
        tags.sort();
        f.debug_struct("ParserConfig")
            .field("scan", &self.scan)
            .field("tag_handlers", &tags)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

static DEFAULT_PARSER_CONFIG: Lazy<ParserConfig> = Lazy::new(ParserConfig::default);

pub fn default_parser_config() -> &'static ParserConfig {
    &DEFAULT_PARSER_CONFIG
}

/// Starts out with the defaults: unicode escapes enabled, numbers
/// kept as read, `#uuid` and `#inst` handlers, vectors/sets/maps from
/// the [builder](../builder/index.html) module.
pub struct ParserConfigBuilder {
    config: ParserConfig,
}

impl ParserConfigBuilder {
    pub fn new() -> Self {
        let mut tag_handlers: HashMap<Tag, TagHandler> = HashMap::new();
        tag_handlers.insert(uuid_tag(), Arc::new(read_uuid));
        tag_handlers.insert(inst_tag(), Arc::new(read_inst));
        ParserConfigBuilder {
            config: ParserConfig {
                scan: ScanSettings::default(),
                tag_handlers,
                list: list_factory(),
                vector: vector_factory(),
                set: set_factory(),
                map: map_factory(),
                max_depth: DEFAULT_MAX_DEPTH,
            }
        }
    }

    pub fn unicode_escapes(mut self, enabled: bool) -> Self {
        self.config.scan.unicode_escapes = enabled;
        self
    }

    pub fn max_depth(mut self, depth: u32) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Replaces any handler already registered for `tag`, including
    /// the builtin ones.
    pub fn tag_handler(
        mut self,
        tag: Tag,
        handler: impl Fn(&Tag, Value) -> Result<Value, TagError> + Send + Sync + 'static
    ) -> Self {
        self.config.tag_handlers.insert(tag, Arc::new(handler));
        self
    }

    /// Values tagged with `tag` are then read as `TaggedValue`.
    pub fn without_tag_handler(mut self, tag: &Tag) -> Self {
        self.config.tag_handlers.remove(tag);
        self
    }

    pub fn integer_hook(mut self, hook: impl Fn(i64) -> Value + Send + Sync + 'static) -> Self {
        self.config.scan.numbers.integer = Arc::new(hook);
        self
    }

    pub fn big_integer_hook(mut self, hook: impl Fn(BigInt) -> Value + Send + Sync + 'static) -> Self {
        self.config.scan.numbers.big_integer = Arc::new(hook);
        self
    }

    pub fn double_hook(mut self, hook: impl Fn(f64) -> Value + Send + Sync + 'static) -> Self {
        self.config.scan.numbers.double = Arc::new(hook);
        self
    }

    pub fn decimal_hook(mut self, hook: impl Fn(BigDecimal) -> Value + Send + Sync + 'static) -> Self {
        self.config.scan.numbers.decimal = Arc::new(hook);
        self
    }

    pub fn number_hooks(mut self, hooks: NumberHooks) -> Self {
        self.config.scan.numbers = hooks;
        self
    }

    pub fn collection_factory(mut self, kind: Collkind, factory: BuilderFactory) -> Self {
        match kind {
            Collkind::List => self.config.list = factory,
            Collkind::Vector => self.config.vector = factory,
            Collkind::Set => self.config.set = factory,
            Collkind::Map => self.config.map = factory,
        }
        self
    }

    pub fn build(self) -> ParserConfig {
        log::debug!("built {:?}", self.config);
        self.config
    }
}

impl Default for ParserConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
