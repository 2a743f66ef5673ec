// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Character sources with one character of pushback, as consumed by
//! the [scanner](../scan/index.html).

use crate::buffered_chars::{buffered_chars, str_chars};
use crate::pos::Pos;
use std::io::{self, Read};

pub trait CharSource {
    /// The next character, or `None` at the end of input. Once `None`
    /// has been returned, it is returned for all further calls.
    fn read(&mut self) -> io::Result<Option<char>>;

    /// Push back the character most recently returned by `read`. At
    /// most one character may be outstanding.
    fn unread(&mut self, c: char);

    /// Position of the character most recently returned by `read`.
    fn pos(&self) -> Pos;
}

/// Turns an iterator of positioned characters into a `CharSource`.
#[derive(Debug)]
pub struct Pushback<I> {
    chars: I,
    pending: Option<(char, Pos)>,
    last: Pos,
    exhausted: bool,
}

impl<I> Pushback<I>
    where I: Iterator<Item = io::Result<(char, Pos)>>
{
    pub fn new(chars: I) -> Self {
        Pushback {
            chars,
            pending: None,
            last: Pos::default(),
            exhausted: false,
        }
    }
}

impl<I> CharSource for Pushback<I>
    where I: Iterator<Item = io::Result<(char, Pos)>>
{
    fn read(&mut self) -> io::Result<Option<char>> {
        if let Some((c, pos)) = self.pending.take() {
            self.last = pos;
            return Ok(Some(c))
        }
        if self.exhausted {
            // avoid calling next() again on a finished generator
            return Ok(None)
        }
        match self.chars.next() {
            None => {
                self.exhausted = true;
                Ok(None)
            }
            Some(Err(e)) => Err(e),
            Some(Ok((c, pos))) => {
                self.last = pos;
                Ok(Some(c))
            }
        }
    }

    fn unread(&mut self, c: char) {
        debug_assert!(self.pending.is_none(), "unread called twice");
        self.pending = Some((c, self.last));
    }

    fn pos(&self) -> Pos {
        self.last
    }
}

pub fn str_source(s: &str)
                  -> Pushback<impl Iterator<Item = io::Result<(char, Pos)>> + '_> {
    Pushback::new(str_chars(s))
}

pub fn reader_source<R: Read>(fh: R)
                              -> Pushback<impl Iterator<Item = io::Result<(char, Pos)>>> {
    Pushback::new(buffered_chars(fh))
}
