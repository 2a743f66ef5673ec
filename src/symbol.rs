// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Symbols and the things spelled like them: keywords (`:foo`) and
//! tags (`#foo`).
//!
//! A symbol has an optional prefix (its namespace), separated from
//! the name by a single `/`. The lone `/` is a symbol without prefix
//! named `/`, and `prefix//` is the symbol named `/` in `prefix`.
//! Equality is by content; `KString` keeps short names inline, which
//! is all the "interning" there is.

use crate::chars::{is_digit, is_symbol_start};
use kstring::KString;
use std::fmt::{Display, Formatter, Write};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("empty symbol")]
    Empty,
    #[error("symbol may not start with '{0}'")]
    InvalidStart(char),
    #[error("symbol may not start like a number")]
    LooksLikeNumber,
    #[error("misplaced '/' in symbol")]
    MisplacedSlash,
}

/// Ordered by prefix first, then name; a symbol without prefix has
/// the empty prefix and sorts first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    prefix: KString,
    name: KString,
}

impl Symbol {
    /// Construct without validation, e.g. for symbols coming from
    /// program code rather than from text.
    pub fn new(prefix: &str, name: &str) -> Symbol {
        Symbol {
            prefix: KString::from_ref(prefix),
            name: KString::from_ref(name),
        }
    }

    pub fn simple(name: &str) -> Symbol {
        Symbol::new("", name)
    }

    /// Validate and split `s` as read from edn text.
    pub fn parse(s: &str) -> Result<Symbol, SymbolError> {
        let mut cs = s.chars();
        let c0 = cs.next().ok_or(SymbolError::Empty)?;
        if ! is_symbol_start(c0) {
            return Err(SymbolError::InvalidStart(c0))
        }
        if matches!(c0, '-' | '+' | '.') {
            if let Some(c1) = cs.next() {
                if is_digit(c1) {
                    return Err(SymbolError::LooksLikeNumber)
                }
            }
        }
        if s == "/" {
            return Ok(Symbol::simple("/"))
        }
        if let Some(prefix) = s.strip_suffix("//") {
            if prefix.is_empty() || prefix.contains('/') {
                return Err(SymbolError::MisplacedSlash)
            }
            return Ok(Symbol::new(prefix, "/"))
        }
        match s.find('/') {
            None => Ok(Symbol::simple(s)),
            Some(i) => {
                let (prefix, rest) = (&s[..i], &s[i + 1..]);
                if prefix.is_empty() || rest.is_empty() || rest.contains('/') {
                    Err(SymbolError::MisplacedSlash)
                } else {
                    Ok(Symbol::new(prefix, rest))
                }
            }
        }
    }

    /// Empty if there is none.
    pub fn prefix(&self) -> &str {
        self.prefix.as_str()
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn has_prefix(&self) -> bool {
        ! self.prefix.is_empty()
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        if self.has_prefix() {
            f.write_str(&self.prefix)?;
            f.write_char('/')?;
        }
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keyword(pub Symbol);

impl Keyword {
    pub fn new(prefix: &str, name: &str) -> Keyword {
        Keyword(Symbol::new(prefix, name))
    }

    /// Validate `s`, which is the text after the colon. The bare `/`
    /// is not a keyword.
    pub fn parse(s: &str) -> Result<Keyword, SymbolError> {
        if s == "/" {
            return Err(SymbolError::MisplacedSlash)
        }
        Ok(Keyword(Symbol::parse(s)?))
    }

    pub fn symbol(&self) -> &Symbol {
        &self.0
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_char(':')?;
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub Symbol);

impl Tag {
    pub fn new(prefix: &str, name: &str) -> Tag {
        Tag(Symbol::new(prefix, name))
    }

    /// Validate `s`, the text after the `#`.
    pub fn parse(s: &str) -> Result<Tag, SymbolError> {
        Ok(Tag(Symbol::parse(s)?))
    }

    pub fn symbol(&self) -> &Symbol {
        &self.0
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_char('#')?;
        self.0.fmt(f)
    }
}
