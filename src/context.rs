// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Where edn text came from, other than the position within it. Used
//! to decorate errors from whole-file or whole-stream reads.

use crate::pos::Pos;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

pub trait Context: Debug + Send + Sync {
    /// With a position, the location goes *after* the error reason
    /// and a space, and includes "in" or "from". Without one, it goes
    /// *before* a colon and the reason.
    fn write_location(&self, pos: Option<Pos>, f: &mut Formatter<'_>)
                      -> Result<(), std::fmt::Error>;
}

/// Displays a context's location.
pub struct Located<'t>(pub &'t dyn Context, pub Option<Pos>);

impl<'t> Display for Located<'t> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        self.0.write_location(self.1, f)
    }
}

#[derive(Debug)]
pub struct FileContext {
    pub path: PathBuf
}

impl Context for FileContext {
    fn write_location(&self, pos: Option<Pos>, f: &mut Formatter<'_>)
                      -> Result<(), std::fmt::Error> {
        match pos {
            Some(pos) => write!(f, "in {:?}{}", self.path, pos),
            None => write!(f, "{:?}", self.path)
        }
    }
}

/// A stream without a path, e.g. "stdin".
#[derive(Debug)]
pub struct NamedContext {
    pub name: String
}

impl Context for NamedContext {
    fn write_location(&self, pos: Option<Pos>, f: &mut Formatter<'_>)
                      -> Result<(), std::fmt::Error> {
        match pos {
            Some(pos) => write!(f, "from ({}){}", self.name, pos),
            None => write!(f, "({})", self.name)
        }
    }
}
