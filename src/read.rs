// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Building value trees from the token stream.

use crate::builder::{BuildError, CollectionBuilder};
use crate::context::{Context, FileContext, Located, NamedContext};
use crate::pos::Pos;
use crate::scan::{Collkind, Parenkind, ScanError, ScanErrorWithPos, Scanner,
                  Token, TokenWithPos};
use crate::settings::{default_parser_config, ParserConfig};
use crate::source::{reader_source, str_source, CharSource};
use crate::symbol::Tag;
use crate::tags::TagError;
use crate::value::Value;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("{0}")]
    Scan(ScanError),
    #[error("{0}")]
    Build(BuildError),
    #[error("{tag}: {err}")]
    Tag { tag: Tag, err: TagError },
    #[error("nesting too deep")]
    NestingTooDeep,
    #[error("'{}' {1} expects '{}', got '{}'",
            .0.opening(), .0.closing(), .2.closing())]
    ParenMismatch(Collkind, Pos, Parenkind),
    #[error("unexpected closing character '{}'", .0.closing())]
    UnexpectedClosingParen(Parenkind),
    #[error("premature EOF while expecting closing character '{}' for '{}'",
            .0.closing(), .0.opening())]
    PrematureEofExpectingClosingParen(Collkind),
    #[error("missing value to discard after '#_'")]
    MissingDiscardOperand,
    #[error("missing value after tag {0}")]
    MissingTagOperand(Tag),
}

#[derive(Error, Debug)]
#[error("{err} {pos}")]
pub struct ReadErrorWithPos {
    pub err: ReadError,
    pub pos: Pos
}

impl ReadError {
    fn at(self, p: Pos) -> ReadErrorWithPos {
        ReadErrorWithPos {
            err: self,
            pos: p
        }
    }
}

impl ReadErrorWithPos {
    /// Whether the underlying character source failed, as opposed to
    /// the text being malformed.
    pub fn is_io(&self) -> bool {
        matches!(self.err, ReadError::Scan(ScanError::IO(_)))
    }
}

impl From<ScanErrorWithPos> for ReadErrorWithPos {
    fn from(ep: ScanErrorWithPos) -> ReadErrorWithPos {
        let ScanErrorWithPos { err, pos } = ep;
        ReadErrorWithPos {
            err: ReadError::Scan(err),
            pos
        }
    }
}

#[derive(Error, Debug)]
pub struct ReadErrorWithPosContext {
    err_with_pos: ReadErrorWithPos,
    container: Box<dyn Context>
}

impl Display for ReadErrorWithPosContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{} {}", self.err_with_pos.err,
               Located(self.container.as_ref(), Some(self.err_with_pos.pos)))
    }
}

#[derive(Error, Debug)]
pub enum ReadErrorWithContext {
    #[error("{}: {0}", Located(.1.as_ref(), None))]
    IO(std::io::Error, Box<dyn Context>)
}

#[derive(Error, Debug)]
pub enum ReadErrorWithLocation {
    #[error("{0}")]
    PC(Box<ReadErrorWithPosContext>),
    #[error("{0}")]
    IO(Box<ReadErrorWithContext>)
}

impl ReadErrorWithLocation {
    fn from_io(e: std::io::Error, container: Box<dyn Context>) -> Self {
        ReadErrorWithLocation::IO(Box::new(ReadErrorWithContext::IO(e, container)))
    }

    fn from_read(e: ReadErrorWithPos, container: Box<dyn Context>) -> Self {
        ReadErrorWithLocation::PC(Box::new(ReadErrorWithPosContext {
            err_with_pos: e,
            container
        }))
    }

    pub fn is_io(&self) -> bool {
        match self {
            ReadErrorWithLocation::IO(_) => true,
            ReadErrorWithLocation::PC(e) => e.err_with_pos.is_io(),
        }
    }
}

/// A finished item on its way up to the enclosing frame.
enum Item {
    Value(Value),
    /// Parsed, but under `#_`.
    Discarded,
    Close(Parenkind),
    Eof,
}

/// What an unfinished form is waiting for. The parser keeps these on
/// an explicit stack, so nesting depth costs heap, not call stack.
enum Frame {
    /// Elements up to the closing character; no builder when the
    /// collection is being discarded.
    Collection {
        kind: Collkind,
        startpos: Pos,
        builder: Option<Box<dyn CollectionBuilder>>,
    },
    /// The value following `#_`.
    Discard(Pos),
    /// The value following a tag.
    Tagged { tag: Tag, pos: Pos, discard: bool },
}

impl Frame {
    /// Whether the values read for this frame end up discarded.
    fn discarding(&self) -> bool {
        match self {
            Frame::Collection { builder, .. } => builder.is_none(),
            Frame::Discard(_) => true,
            Frame::Tagged { discard, .. } => *discard,
        }
    }
}

/// Reads values one by one from a character source. The parser owns
/// the source; after the end of input has been reached, `parse_next`
/// keeps returning `Ok(None)`.
pub struct Parser<'c, S> {
    scanner: Scanner<'c, S>,
    config: &'c ParserConfig,
}

impl<'c, S: CharSource> Parser<'c, S> {
    pub fn new(src: S, config: &'c ParserConfig) -> Self {
        Parser {
            scanner: Scanner::new(src, &config.scan),
            config,
        }
    }

    pub fn into_source(self) -> S {
        self.scanner.into_source()
    }

    /// The next top-level value, or `None` at the end of input.
    pub fn parse_next(&mut self) -> Result<Option<Value>, ReadErrorWithPos> {
        let mut stack: Vec<Frame> = Vec::new();
        loop {
            let discard = stack.last().map_or(false, Frame::discarding);
            let TokenWithPos(token, pos) = self.scanner.next_token()?;
            let item = match token {
                Token::Open(kind) => {
                    self.check_depth(&stack, pos)?;
                    let builder =
                        if discard { None } else { Some(self.config.new_builder(kind)) };
                    stack.push(Frame::Collection { kind, startpos: pos, builder });
                    continue
                }
                Token::Discard => {
                    self.check_depth(&stack, pos)?;
                    stack.push(Frame::Discard(pos));
                    continue
                }
                Token::Tag(tag) => {
                    self.check_depth(&stack, pos)?;
                    stack.push(Frame::Tagged { tag, pos, discard });
                    continue
                }
                Token::Close(pk) => Item::Close(pk),
                Token::Nil => Item::Value(Value::Nil),
                Token::Atom(v) => Item::Value(v),
                Token::EndOfInput => Item::Eof,
            };
            if let Some(v) = self.complete(&mut stack, item, pos)? {
                return Ok(v)
            }
        }
    }

    fn check_depth(&self, stack: &[Frame], pos: Pos) -> Result<(), ReadErrorWithPos> {
        if stack.len() >= self.config.max_depth as usize {
            return Err(ReadError::NestingTooDeep.at(pos))
        }
        Ok(())
    }

    // Hand `item` (which started at `pos`) to the innermost frame,
    // closing frames for as long as that finishes them. Returns
    // `Some` once a top-level result is known.
    fn complete(&self, stack: &mut Vec<Frame>, mut item: Item, mut pos: Pos)
                -> Result<Option<Option<Value>>, ReadErrorWithPos> {
        loop {
            let frame = match stack.pop() {
                Some(frame) => frame,
                None => return match item {
                    Item::Value(v) => Ok(Some(Some(v))),
                    Item::Eof => Ok(Some(None)),
                    Item::Close(pk) => Err(ReadError::UnexpectedClosingParen(pk).at(pos)),
                    Item::Discarded => Ok(None),
                }
            };
            match frame {
                Frame::Collection { kind, startpos, mut builder } => match item {
                    Item::Value(v) => {
                        if let Some(b) = builder.as_mut() {
                            b.add(v).map_err(|e| ReadError::Build(e).at(pos))?;
                        }
                        stack.push(Frame::Collection { kind, startpos, builder });
                        return Ok(None)
                    }
                    Item::Discarded => {
                        stack.push(Frame::Collection { kind, startpos, builder });
                        return Ok(None)
                    }
                    Item::Close(pk) => {
                        if pk != kind.parenkind() {
                            return Err(ReadError::ParenMismatch(kind, startpos, pk).at(pos))
                        }
                        item = match builder {
                            None => Item::Discarded,
                            Some(b) => Item::Value(
                                b.build().map_err(|e| ReadError::Build(e).at(startpos))?),
                        };
                        pos = startpos;
                    }
                    Item::Eof => {
                        return Err(ReadError::PrematureEofExpectingClosingParen(kind)
                                   .at(startpos))
                    }
                },
                // A discarded value leaves nothing behind; the enclosing
                // frame keeps waiting.
                Frame::Discard(dpos) => match item {
                    Item::Value(_) | Item::Discarded => return Ok(None),
                    Item::Close(_) | Item::Eof => {
                        return Err(ReadError::MissingDiscardOperand.at(dpos))
                    }
                },
                Frame::Tagged { tag, pos: tpos, discard } => {
                    item = match item {
                        Item::Value(_) if discard => Item::Discarded,
                        Item::Value(v) => Item::Value(self.apply_tag(tag, v, tpos)?),
                        Item::Discarded => Item::Discarded,
                        Item::Close(_) | Item::Eof => {
                            return Err(ReadError::MissingTagOperand(tag).at(tpos))
                        }
                    };
                    pos = tpos;
                }
            }
        }
    }

    fn apply_tag(&self, tag: Tag, v: Value, pos: Pos) -> Result<Value, ReadErrorWithPos> {
        match self.config.tag_handler(&tag) {
            Some(handler) => {
                handler(&tag, v).map_err(|err| ReadError::Tag { tag, err }.at(pos))
            }
            None => Ok(Value::tagged(tag, v))
        }
    }
}

impl<'c, S: CharSource> Iterator for Parser<'c, S> {
    type Item = Result<Value, ReadErrorWithPos>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_next().transpose()
    }
}

pub fn read_str_with(s: &str, config: &ParserConfig)
                     -> Result<Vec<Value>, ReadErrorWithPos> {
    Parser::new(str_source(s), config).collect()
}

pub fn read_str(s: &str) -> Result<Vec<Value>, ReadErrorWithPos> {
    read_str_with(s, default_parser_config())
}

/// The first value in `s`, if any; the rest of `s` is not looked at.
pub fn read_first(s: &str) -> Result<Option<Value>, ReadErrorWithPos> {
    Parser::new(str_source(s), default_parser_config()).parse_next()
}

pub fn read_all_with(fh: impl Read, config: &ParserConfig)
                     -> Result<Vec<Value>, ReadErrorWithPos> {
    Parser::new(reader_source(fh), config).collect()
}

pub fn read_all(fh: impl Read) -> Result<Vec<Value>, ReadErrorWithPos> {
    read_all_with(fh, default_parser_config())
}

/// Like `read_all_with`, with errors naming the stream, e.g. "stdin".
pub fn read_named_with(fh: impl Read, name: &str, config: &ParserConfig)
                       -> Result<Vec<Value>, ReadErrorWithLocation> {
    read_all_with(fh, config).map_err(|e| ReadErrorWithLocation::from_read(
        e, Box::new(NamedContext { name: name.to_string() })))
}

pub fn read_file_with(path: &Path, config: &ParserConfig)
                      -> Result<Vec<Value>, ReadErrorWithLocation> {
    let ctx = || Box::new(FileContext { path: path.to_path_buf() });
    let fh = File::open(path)
        .map_err(|e| ReadErrorWithLocation::from_io(e, ctx()))?;
    read_all_with(fh, config)
        .map_err(|e| ReadErrorWithLocation::from_read(e, ctx()))
}

pub fn read_file(path: &Path) -> Result<Vec<Value>, ReadErrorWithLocation> {
    read_file_with(path, default_parser_config())
}
